use glam::Vec3;

use crate::error::MeshError;

use super::triangle::Triangle;

/// Indexed triangle list describing a static collider.
///
/// Positions and normals are parallel buffers addressed by the index buffer, three indices per
/// triangle. The checked constructor guarantees every index is in bounds, so extraction never has
/// to validate anything.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    indices: Vec<u32>,
}

impl Mesh {
    /// Creates a mesh from its vertex and index buffers.
    pub fn new(positions: Vec<Vec3>, normals: Vec<Vec3>, indices: Vec<u32>) -> Result<Self, MeshError> {
        if positions.len() != normals.len() {
            return Err(MeshError::NormalCountMismatch {
                positions: positions.len(),
                normals: normals.len(),
            });
        }
        if indices.len() % 3 != 0 {
            return Err(MeshError::IndexCountNotMultipleOfThree { count: indices.len() });
        }
        if let Some(&index) = indices.iter().find(|&&index| index as usize >= positions.len()) {
            return Err(MeshError::IndexOutOfBounds {
                index,
                vertex_count: positions.len(),
            });
        }
        Ok(Self {
            positions,
            normals,
            indices,
        })
    }

    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    #[inline]
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Gets the number of triangles described by the index buffer.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Converts the mesh into triangle records, in index order, along with the identity permutation
    /// over them.
    pub fn extract_primitives(&self) -> (Vec<Triangle>, Vec<u32>) {
        let triangles: Vec<Triangle> = self
            .indices
            .chunks_exact(3)
            .map(|chunk| {
                let [i0, i1, i2] = [chunk[0] as usize, chunk[1] as usize, chunk[2] as usize];
                Triangle::new(
                    [self.positions[i0], self.positions[i1], self.positions[i2]],
                    [self.normals[i0], self.normals[i1], self.normals[i2]],
                )
            })
            .collect();
        let triangle_indices = (0..triangles.len() as u32).collect();
        (triangles, triangle_indices)
    }

    /// Creates an axis-aligned box with two outward-wound triangles per face.
    pub fn create_box(center: Vec3, half_extents: Vec3) -> Self {
        // (normal, u, v) with u x v == normal.
        const FACES: [(Vec3, Vec3, Vec3); 6] = [
            (Vec3::X, Vec3::Y, Vec3::Z),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::Z, Vec3::X),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::Y, Vec3::X),
        ];
        let mut positions = Vec::with_capacity(24);
        let mut normals = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, u, v) in FACES {
            let base = positions.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                positions.push(center + half_extents * (normal + u * su + v * sv));
                normals.push(normal);
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        Self {
            positions,
            normals,
            indices,
        }
    }

    /// Creates a flat grid in the XZ plane centered on the origin, split into `columns` by `rows`
    /// quads of two triangles each.
    pub fn create_grid(width: f32, depth: f32, columns: u32, rows: u32) -> Self {
        if columns == 0 || rows == 0 {
            return Self::default();
        }
        let vertex_columns = columns + 1;
        let mut positions = Vec::with_capacity((vertex_columns * (rows + 1)) as usize);
        for row in 0..=rows {
            let z = depth * (row as f32 / rows as f32 - 0.5);
            for column in 0..=columns {
                let x = width * (column as f32 / columns as f32 - 0.5);
                positions.push(Vec3::new(x, 0.0, z));
            }
        }
        let normals = vec![Vec3::Y; positions.len()];
        let mut indices = Vec::with_capacity((columns * rows * 6) as usize);
        for row in 0..rows {
            for column in 0..columns {
                let i = row * vertex_columns + column;
                let below = i + vertex_columns;
                indices.extend_from_slice(&[i, below, i + 1, i + 1, below, below + 1]);
            }
        }
        Self {
            positions,
            normals,
            indices,
        }
    }
}
