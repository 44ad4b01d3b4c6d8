pub mod bounding_box;
pub mod for_each_ref;
pub mod thread_dispatcher;
