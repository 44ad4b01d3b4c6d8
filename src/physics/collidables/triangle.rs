use glam::Vec3;

use crate::utilities::bounding_box::BoundingBox;

/// Per-primitive record extracted from a collider mesh.
///
/// Built once during extraction and never mutated afterward. The face normal is left unnormalized;
/// its length is twice the triangle's area, which collision code is free to use.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex of the triangle.
    pub a: Vec3,
    /// Second vertex of the triangle.
    pub b: Vec3,
    /// Third vertex of the triangle.
    pub c: Vec3,
    /// Mesh normal at `a`.
    pub normal_a: Vec3,
    /// Mesh normal at `b`.
    pub normal_b: Vec3,
    /// Mesh normal at `c`.
    pub normal_c: Vec3,
    /// `(b - a) x (c - a)`.
    pub face_normal: Vec3,
    /// Arithmetic mean of the three vertices.
    pub centroid: Vec3,
}

impl Triangle {
    /// Creates a triangle record, deriving its face normal and centroid.
    pub fn new(vertices: [Vec3; 3], normals: [Vec3; 3]) -> Self {
        let [a, b, c] = vertices;
        Self {
            a,
            b,
            c,
            normal_a: normals[0],
            normal_b: normals[1],
            normal_c: normals[2],
            face_normal: (b - a).cross(c - a),
            centroid: (a + b + c) / 3.0,
        }
    }

    #[inline(always)]
    pub fn vertices(&self) -> [Vec3; 3] {
        [self.a, self.b, self.c]
    }

    /// Computes the tight bounding box of the three vertices.
    #[inline]
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::new(self.a.min(self.b).min(self.c), self.a.max(self.b).max(self.c))
    }

    /// Extends `bounds` to cover this triangle's vertices.
    #[inline(always)]
    pub fn merge_into(&self, bounds: &mut BoundingBox) {
        bounds.merge_point(self.a);
        bounds.merge_point(self.b);
        bounds.merge_point(self.c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derived_values() {
        let triangle = Triangle::new(
            [Vec3::ZERO, Vec3::new(3.0, 0.0, 0.0), Vec3::new(0.0, 3.0, 0.0)],
            [Vec3::Z; 3],
        );
        assert_eq!(triangle.centroid, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(triangle.face_normal, Vec3::new(0.0, 0.0, 9.0));
        assert_eq!(triangle.normal_b, Vec3::Z);
    }

    #[test]
    fn test_bounds() {
        let triangle = Triangle::new(
            [Vec3::new(1.0, -2.0, 0.5), Vec3::new(-1.0, 4.0, 0.0), Vec3::new(0.0, 0.0, 2.0)],
            [Vec3::Y; 3],
        );
        let bounds = triangle.bounds();
        assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 4.0, 2.0));

        let mut merged = BoundingBox::EMPTY;
        triangle.merge_into(&mut merged);
        assert_eq!(merged, bounds);
    }
}
