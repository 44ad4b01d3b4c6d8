//! Bounding volume hierarchy construction for static cloth colliders.
//!
//! A collider [`Mesh`] is flattened into [`Triangle`] records and organized into a binary [`Tree`] of
//! axis-aligned boxes using a sampled surface area heuristic. The finished tree is immutable and exposes its
//! nodes, triangles and permuted triangle indices to the collision solver.

pub mod error;
pub mod physics;
pub mod utilities;

pub use error::{MeshError, SettingsError};
pub use physics::collidables::mesh::Mesh;
pub use physics::collidables::triangle::Triangle;
pub use physics::trees::build_settings::BuildSettings;
pub use physics::trees::node::{Node, NodeKind, PackedNode};
pub use physics::trees::tree::Tree;
pub use physics::trees::tree_snapshot::{SharedTree, TreeSnapshot};
pub use utilities::bounding_box::BoundingBox;
