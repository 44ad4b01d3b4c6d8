pub mod collidables;
pub mod trees;
