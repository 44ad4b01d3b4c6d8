pub mod mesh;
pub mod triangle;
