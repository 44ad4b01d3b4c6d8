use glam::Vec3;
use std::ops::Range;

use crate::utilities::bounding_box::BoundingBox;

/// What a node holds: a run of triangle references, or a pair of children.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Terminal node covering `count` consecutive entries of the permuted triangle index array,
    /// starting at `first_index`.
    Leaf { first_index: u32, count: u32 },
    /// Branching node. The right child always lives at `left_child + 1`.
    Internal { left_child: u32 },
}

/// Node of a binary bounding volume hierarchy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node {
    /// Bounds of every triangle in the node's subtree.
    pub bounds: BoundingBox,
    pub kind: NodeKind,
}

impl Node {
    /// Creates a leaf over a triangle index range. Bounds start empty and are filled in once the range is fixed.
    #[inline]
    pub fn leaf(first_index: u32, count: u32) -> Self {
        Self {
            bounds: BoundingBox::EMPTY,
            kind: NodeKind::Leaf { first_index, count },
        }
    }

    #[inline(always)]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// Gets the left and right child indices of an internal node.
    #[inline]
    pub fn children(&self) -> Option<(u32, u32)> {
        match self.kind {
            NodeKind::Internal { left_child } => Some((left_child, left_child + 1)),
            NodeKind::Leaf { .. } => None,
        }
    }

    /// Gets the range of the permuted triangle index array referenced by a leaf.
    #[inline]
    pub fn triangle_range(&self) -> Option<Range<usize>> {
        match self.kind {
            NodeKind::Leaf { first_index, count } => {
                Some(first_index as usize..(first_index + count) as usize)
            }
            NodeKind::Internal { .. } => None,
        }
    }

    /// Number of triangles held directly by the node. Zero for internal nodes.
    #[inline]
    pub fn triangle_count(&self) -> u32 {
        match self.kind {
            NodeKind::Leaf { count, .. } => count,
            NodeKind::Internal { .. } => 0,
        }
    }
}

/// Flat node layout for upload to a compute device.
///
/// `tri_count > 0` marks a leaf whose triangles start at `left_first` in the permuted index array;
/// `tri_count == 0` marks an internal node whose left child is `left_first` and right child
/// `left_first + 1`. The only leaf that can have zero triangles is the root of an empty tree, and its
/// bounds are empty so no query ever descends into it.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PackedNode {
    pub min: Vec3,
    pub left_first: u32,
    pub max: Vec3,
    pub tri_count: u32,
}

impl From<&Node> for PackedNode {
    fn from(node: &Node) -> Self {
        let (left_first, tri_count) = match node.kind {
            NodeKind::Leaf { first_index, count } => (first_index, count),
            NodeKind::Internal { left_child } => (left_child, 0),
        };
        Self {
            min: node.bounds.min,
            left_first,
            max: node.bounds.max,
            tri_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem;

    #[test]
    fn test_packed_layout() {
        assert_eq!(mem::size_of::<PackedNode>(), 32);
        assert_eq!(mem::align_of::<PackedNode>(), 4);
        assert_eq!(mem::offset_of!(PackedNode, min), 0);
        assert_eq!(mem::offset_of!(PackedNode, left_first), 12);
        assert_eq!(mem::offset_of!(PackedNode, max), 16);
        assert_eq!(mem::offset_of!(PackedNode, tri_count), 28);
    }

    #[test]
    fn test_leaf_accessors() {
        let leaf = Node::leaf(4, 3);
        assert!(leaf.is_leaf());
        assert!(leaf.bounds.is_empty());
        assert_eq!(leaf.triangle_range(), Some(4..7));
        assert_eq!(leaf.triangle_count(), 3);
        assert_eq!(leaf.children(), None);
    }

    #[test]
    fn test_internal_accessors() {
        let node = Node {
            bounds: BoundingBox::new(Vec3::ZERO, Vec3::ONE),
            kind: NodeKind::Internal { left_child: 5 },
        };
        assert!(!node.is_leaf());
        assert_eq!(node.children(), Some((5, 6)));
        assert_eq!(node.triangle_range(), None);
        assert_eq!(node.triangle_count(), 0);

        let packed = PackedNode::from(&node);
        assert_eq!(packed.left_first, 5);
        assert_eq!(packed.tri_count, 0);
        assert_eq!(packed.max, Vec3::ONE);
    }
}
