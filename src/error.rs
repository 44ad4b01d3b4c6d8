//! Error types for mesh input and build settings.

use thiserror::Error;

/// Error when mesh buffers can't describe a triangle list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshError {
    /// Index buffer length isn't a whole number of triangles.
    #[error("index count {count} is not a multiple of 3")]
    IndexCountNotMultipleOfThree {
        /// Length of the index buffer.
        count: usize,
    },

    /// An index refers past the end of the vertex buffers.
    #[error("vertex index {index} out of bounds for {vertex_count} vertices")]
    IndexOutOfBounds {
        /// Offending vertex index.
        index: u32,
        /// Number of vertices in the mesh.
        vertex_count: usize,
    },

    /// Position and normal buffers must be parallel.
    #[error("{positions} positions but {normals} normals")]
    NormalCountMismatch {
        /// Number of vertex positions.
        positions: usize,
        /// Number of vertex normals.
        normals: usize,
    },
}

/// Error when build tunables can't produce a valid tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SettingsError {
    /// At least two samples per axis are needed to span the node's extent.
    #[error("split sample count must be at least 2, got {count}")]
    TooFewSplitSamples {
        /// Requested sample count.
        count: usize,
    },

    /// Leaves must be allowed to hold at least one triangle.
    #[error("maximum leaf size must be nonzero")]
    ZeroLeafSize,

    /// The no-split cost scale must be a positive finite number.
    #[error("leaf cost scale must be finite and positive, got {scale}")]
    InvalidLeafCostScale {
        /// Requested scale.
        scale: f32,
    },
}
