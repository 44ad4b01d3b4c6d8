use crate::physics::collidables::triangle::Triangle;
use crate::utilities::for_each_ref::IBreakableForEach;

use super::node::{Node, PackedNode};

/// A binary bounding volume hierarchy over the triangles of one collider mesh.
///
/// Built once and immutable afterward; any number of threads may read it at the same time. The tree is spread
/// across several files: construction lives in `tree_builder`, invariant checks and metrics in
/// `tree_diagnostics`, parallel construction in `tree_batch_build`.
///
/// Node 0 is the root. Internal nodes reference a contiguous pair of children; leaves reference a range of
/// `triangle_indices`, whose entries are original triangle ordinals into `triangles`.
#[derive(Clone, Debug)]
pub struct Tree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) node_capacity: usize,
    pub(crate) triangles: Vec<Triangle>,
    pub(crate) triangle_indices: Vec<u32>,
}

impl Tree {
    /// Gets the populated nodes of the tree, root first.
    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of nodes in the tree.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Size of the node pool reserved at construction. The node count never exceeds it.
    #[inline]
    pub fn node_capacity(&self) -> usize {
        self.node_capacity
    }

    #[inline]
    pub fn root(&self) -> &Node {
        &self.nodes[0]
    }

    /// Gets the triangle records in original mesh order.
    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Gets the permuted triangle index array. Leaves reference ranges of this array.
    #[inline]
    pub fn triangle_indices(&self) -> &[u32] {
        &self.triangle_indices
    }

    #[inline]
    pub fn triangle_index_count(&self) -> usize {
        self.triangle_indices.len()
    }

    /// Gets the child indices of the node at `node_index`, if it is internal.
    #[inline]
    pub fn children(&self, node_index: usize) -> Option<(usize, usize)> {
        self.nodes[node_index]
            .children()
            .map(|(left, right)| (left as usize, right as usize))
    }

    /// Enumerates the triangles referenced by a leaf as `(original index, triangle)` pairs.
    /// Internal nodes yield nothing.
    pub fn leaf_triangles(&self, node_index: usize) -> impl Iterator<Item = (u32, &Triangle)> + '_ {
        let range = self.nodes[node_index].triangle_range().unwrap_or(0..0);
        self.triangle_indices[range]
            .iter()
            .map(move |&triangle_index| (triangle_index, &self.triangles[triangle_index as usize]))
    }

    /// Gets the permuted triangle indices covered by a node's whole subtree. Subtrees always own one contiguous
    /// range, bounded by their leftmost and rightmost leaves.
    pub fn subtree_triangle_indices(&self, node_index: usize) -> &[u32] {
        let mut leftmost = node_index;
        while let Some((left, _)) = self.children(leftmost) {
            leftmost = left;
        }
        let mut rightmost = node_index;
        while let Some((_, right)) = self.children(rightmost) {
            rightmost = right;
        }
        let start = self.nodes[leftmost].triangle_range().map_or(0, |range| range.start);
        let end = self.nodes[rightmost].triangle_range().map_or(0, |range| range.end);
        &self.triangle_indices[start..end]
    }

    /// Visits every leaf node index in depth-first, left-to-right order until the enumerator asks to stop.
    pub fn enumerate_leaves<TEnumerator: IBreakableForEach<usize>>(&self, leaf_enumerator: &mut TEnumerator) {
        let mut stack = vec![0usize];
        while let Some(node_index) = stack.pop() {
            match self.children(node_index) {
                Some((left, right)) => {
                    stack.push(right);
                    stack.push(left);
                }
                None => {
                    if !leaf_enumerator.loop_body(node_index) {
                        return;
                    }
                }
            }
        }
    }

    /// Converts the nodes into the flat layout consumed by device-side traversal.
    pub fn pack_nodes(&self) -> Vec<PackedNode> {
        self.nodes.iter().map(PackedNode::from).collect()
    }
}
