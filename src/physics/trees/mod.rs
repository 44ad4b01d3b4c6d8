pub mod build_settings;
pub mod node;
pub mod tree;
pub mod tree_batch_build;
pub mod tree_builder;
pub mod tree_diagnostics;
pub mod tree_snapshot;
