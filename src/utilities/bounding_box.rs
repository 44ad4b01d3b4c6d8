use glam::Vec3;

/// Provides simple axis-aligned bounding box functionality.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    /// Location with the lowest X, Y, and Z coordinates in the axis-aligned bounding box.
    pub min: Vec3,
    /// Location with the highest X, Y, and Z coordinates in the axis-aligned bounding box.
    pub max: Vec3,
}

impl Default for BoundingBox {
    #[inline]
    fn default() -> Self {
        Self::EMPTY
    }
}

impl BoundingBox {
    /// The canonical empty box. Merging any point into it yields a box around that point.
    /// Its area is meaningless; it must never be treated as a real bound.
    pub const EMPTY: Self = Self {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Constructs a bounding box from the specified minimum and maximum.
    #[inline]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Computes the bounding box of a set of points. Returns the empty box for no points.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut bounds = Self::EMPTY;
        for point in points {
            bounds.merge_point(point);
        }
        bounds
    }

    /// True if nothing has been merged into the box yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    /// Extends the box to cover a point.
    #[inline]
    pub fn merge_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// Extends the box to cover another box.
    #[inline]
    pub fn merge(&mut self, other: &BoundingBox) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    /// Computes a bounding box which contains two other bounding boxes.
    #[inline]
    pub fn create_merged(a: &BoundingBox, b: &BoundingBox) -> Self {
        Self {
            min: a.min.min(b.min),
            max: a.max.max(b.max),
        }
    }

    /// Half of the surface area. Only proportional to surface area, which is all the SAH needs.
    #[inline]
    pub fn area(&self) -> f32 {
        let offset = self.max - self.min;
        offset.x * offset.y + offset.x * offset.z + offset.y * offset.z
    }

    /// Gets the size of the box along each axis.
    #[inline]
    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    /// Determines if two bounding boxes intersect. The empty box intersects nothing.
    #[inline]
    pub fn intersects(a: &BoundingBox, b: &BoundingBox) -> bool {
        let no_intersection_on_axes = a.max.cmplt(b.min) | b.max.cmplt(a.min);
        !no_intersection_on_axes.any() && !a.is_empty() && !b.is_empty()
    }

    /// True if the point lies inside or on the surface of the box.
    #[inline]
    pub fn contains_point(&self, point: Vec3) -> bool {
        self.min.cmple(point).all() && point.cmple(self.max).all()
    }

    /// True if `other` lies entirely inside this box. The empty box is contained by everything.
    #[inline]
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.is_empty() || (self.min.cmple(other.min).all() && other.max.cmple(self.max).all())
    }
}
