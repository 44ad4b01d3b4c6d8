// Binned SAH construction of the collider tree.

use std::time::Instant;
use tracing::{debug, trace};

use crate::error::SettingsError;
use crate::physics::collidables::mesh::Mesh;
use crate::physics::collidables::triangle::Triangle;
use crate::utilities::bounding_box::BoundingBox;

use super::build_settings::BuildSettings;
use super::node::{Node, NodeKind};
use super::tree::Tree;

/// Cost assigned to split candidates that would leave one side empty or have no area.
/// Large enough that no real candidate ever loses to it.
const REJECTED_SPLIT_COST: f32 = 1e30;

#[derive(Clone, Copy, Debug, PartialEq)]
struct SplitCandidate {
    axis: usize,
    position: f32,
    cost: f32,
}

/// Single-owner state for one construction. The node pool's length doubles as the allocation counter and
/// does not outlive the build.
struct TreeBuilder<'a> {
    triangles: &'a [Triangle],
    triangle_indices: Vec<u32>,
    nodes: Vec<Node>,
    node_capacity: usize,
    settings: &'a BuildSettings,
}

impl<'a> TreeBuilder<'a> {
    fn new(triangles: &'a [Triangle], triangle_indices: Vec<u32>, settings: &'a BuildSettings) -> Self {
        debug_assert_eq!(triangles.len(), triangle_indices.len());
        // A binary tree with at most n leaves has at most 2n - 1 nodes. The root exists even for empty input.
        let node_capacity = (2 * triangles.len()).max(1);
        let mut nodes = Vec::with_capacity(node_capacity);
        nodes.push(Node::leaf(0, triangles.len() as u32));
        Self {
            triangles,
            triangle_indices,
            nodes,
            node_capacity,
            settings,
        }
    }

    #[inline(always)]
    fn triangle_at(&self, slot: usize) -> &'a Triangle {
        let triangles = self.triangles;
        &triangles[self.triangle_indices[slot] as usize]
    }

    /// Recomputes a node's bounds from the triangles in its range.
    fn update_node_bounds(&mut self, node_index: usize) {
        let mut bounds = BoundingBox::EMPTY;
        if let Some(range) = self.nodes[node_index].triangle_range() {
            for slot in range {
                self.triangle_at(slot).merge_into(&mut bounds);
            }
        }
        self.nodes[node_index].bounds = bounds;
    }

    /// Computes the SAH cost of splitting `[first, first + count)` at `position` along `axis`.
    fn evaluate_cost(&self, first: usize, count: usize, axis: usize, position: f32) -> f32 {
        let mut left_bounds = BoundingBox::EMPTY;
        let mut right_bounds = BoundingBox::EMPTY;
        let mut left_count = 0usize;
        let mut right_count = 0usize;
        for slot in first..first + count {
            let triangle = self.triangle_at(slot);
            if triangle.centroid[axis] < position {
                triangle.merge_into(&mut left_bounds);
                left_count += 1;
            } else {
                triangle.merge_into(&mut right_bounds);
                right_count += 1;
            }
        }
        // An empty side has no meaningful area, and would otherwise always look like the cheapest split.
        if left_count == 0 || right_count == 0 {
            return REJECTED_SPLIT_COST;
        }
        let cost = left_count as f32 * left_bounds.area() + right_count as f32 * right_bounds.area();
        if cost > 0.0 {
            cost
        } else {
            REJECTED_SPLIT_COST
        }
    }

    /// Samples evenly spaced split positions across the node's bounds on every axis and returns the cheapest.
    /// Ties keep the earliest candidate, so the result is deterministic.
    fn find_best_split(&self, bounds: &BoundingBox, first: usize, count: usize) -> Option<SplitCandidate> {
        let sample_count = self.settings.split_sample_count;
        let mut best: Option<SplitCandidate> = None;
        let mut best_cost = REJECTED_SPLIT_COST;
        for axis in 0..3 {
            let axis_min = bounds.min[axis];
            let step = (bounds.max[axis] - axis_min) / (sample_count - 1) as f32;
            for k in 0..sample_count {
                let position = axis_min + k as f32 * step;
                let cost = self.evaluate_cost(first, count, axis, position);
                if cost < best_cost {
                    best_cost = cost;
                    best = Some(SplitCandidate { axis, position, cost });
                }
            }
        }
        best
    }

    /// Reorders `[first, first + count)` so triangles with centroids below `position` come first.
    /// Returns how many ended up on the left.
    fn partition(&mut self, first: usize, count: usize, axis: usize, position: f32) -> usize {
        let mut cursor = first;
        let mut end = first + count;
        while cursor < end {
            if self.triangle_at(cursor).centroid[axis] < position {
                cursor += 1;
            } else {
                // The swapped-in element hasn't been examined yet, so the cursor stays put.
                end -= 1;
                self.triangle_indices.swap(cursor, end);
            }
        }
        cursor - first
    }

    /// Reserves two adjacent nodes and returns the index of the first.
    fn allocate_node_pair(&mut self, left: Node, right: Node) -> usize {
        assert!(
            self.nodes.len() + 2 <= self.node_capacity,
            "Any attempt to allocate a node pair should not overrun the node pool."
        );
        let index = self.nodes.len();
        self.nodes.push(left);
        self.nodes.push(right);
        index
    }

    /// Tries to split a leaf in two. On success the node becomes internal and the left child's index is returned.
    fn subdivide(&mut self, node_index: usize) -> Option<usize> {
        let node = self.nodes[node_index];
        let NodeKind::Leaf { first_index, count } = node.kind else {
            return None;
        };
        let (first, count) = (first_index as usize, count as usize);
        if count <= self.settings.maximum_leaf_size {
            return None;
        }

        let split = self.find_best_split(&node.bounds, first, count)?;
        let leaf_cost = node.bounds.area() * count as f32 * self.settings.leaf_cost_scale;
        if leaf_cost <= split.cost {
            return None;
        }

        let left_count = self.partition(first, count, split.axis, split.position);
        if left_count == 0 || left_count == count {
            trace!(node_index, count, "split did not separate triangles; keeping leaf");
            return None;
        }

        let left_child = self.allocate_node_pair(
            Node::leaf(first as u32, left_count as u32),
            Node::leaf((first + left_count) as u32, (count - left_count) as u32),
        );
        self.update_node_bounds(left_child);
        self.update_node_bounds(left_child + 1);
        self.nodes[node_index].kind = NodeKind::Internal {
            left_child: left_child as u32,
        };
        Some(left_child)
    }

    /// Subdivides from the root until every node is a leaf or internal. The left subtree is always finished
    /// before the right one starts, so children are allocated in pre-order.
    fn build(&mut self) {
        self.update_node_bounds(0);
        let mut stack = vec![0usize];
        while let Some(node_index) = stack.pop() {
            if let Some(left_child) = self.subdivide(node_index) {
                stack.push(left_child + 1);
                stack.push(left_child);
            }
        }
    }
}

impl Tree {
    /// Builds a tree over a mesh's triangles with the default settings.
    pub fn build(mesh: &Mesh) -> Self {
        let (triangles, triangle_indices) = mesh.extract_primitives();
        Self::build_from_primitives(triangles, triangle_indices, &BuildSettings::default())
    }

    /// Builds a tree over a mesh's triangles.
    pub fn build_with_settings(mesh: &Mesh, settings: &BuildSettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        let (triangles, triangle_indices) = mesh.extract_primitives();
        Ok(Self::build_from_primitives(triangles, triangle_indices, settings))
    }

    /// Builds a tree over already extracted triangles. The tree takes ownership of them.
    pub fn from_triangles(triangles: Vec<Triangle>, settings: &BuildSettings) -> Result<Self, SettingsError> {
        settings.validate()?;
        let triangle_indices = (0..triangles.len() as u32).collect();
        Ok(Self::build_from_primitives(triangles, triangle_indices, settings))
    }

    /// Settings must already be validated.
    #[tracing::instrument(skip_all, fields(triangle_count = triangles.len()))]
    pub(crate) fn build_from_primitives(
        triangles: Vec<Triangle>,
        triangle_indices: Vec<u32>,
        settings: &BuildSettings,
    ) -> Self {
        let start = Instant::now();
        let mut builder = TreeBuilder::new(&triangles, triangle_indices, settings);
        debug!(node_capacity = builder.node_capacity, "allocated node pool");
        builder.build();

        let TreeBuilder {
            triangle_indices,
            nodes,
            node_capacity,
            ..
        } = builder;
        let leaf_count = nodes.iter().filter(|node| node.is_leaf()).count();
        debug!(
            elapsed_seconds = start.elapsed().as_secs_f64(),
            node_count = nodes.len(),
            leaf_count,
            "built tree"
        );
        Self {
            nodes,
            node_capacity,
            triangles,
            triangle_indices,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn triangle_at_centroid(centroid: Vec3, size: f32) -> Triangle {
        Triangle::new(
            [
                centroid + Vec3::new(-size, -size, 0.0),
                centroid + Vec3::new(size, -size, 0.0),
                centroid + Vec3::new(0.0, 2.0 * size, 0.0),
            ],
            [Vec3::Z; 3],
        )
    }

    fn build(triangles: Vec<Triangle>) -> Tree {
        Tree::from_triangles(triangles, &BuildSettings::default()).unwrap()
    }

    #[test]
    fn test_empty_mesh() {
        let tree = Tree::build(&Mesh::default());
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.node_capacity(), 1);
        assert_eq!(tree.root().kind, NodeKind::Leaf { first_index: 0, count: 0 });
        assert!(tree.root().bounds.is_empty());
        assert!(!BoundingBox::intersects(
            &tree.root().bounds,
            &BoundingBox::new(Vec3::splat(-1e9), Vec3::splat(1e9))
        ));
        tree.validate();
    }

    #[test]
    fn test_single_triangle() {
        let tree = build(vec![triangle_at_centroid(Vec3::ZERO, 1.0)]);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.root().kind, NodeKind::Leaf { first_index: 0, count: 1 });
        assert_eq!(tree.root().bounds, tree.triangles()[0].bounds());
    }

    #[test]
    fn test_two_triangles_never_split() {
        let tree = build(vec![
            triangle_at_centroid(Vec3::new(-100.0, 0.0, 0.0), 0.1),
            triangle_at_centroid(Vec3::new(100.0, 0.0, 0.0), 0.1),
        ]);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.root().kind, NodeKind::Leaf { first_index: 0, count: 2 });
        assert_eq!(tree.triangle_indices(), &[0, 1]);
    }

    #[test]
    fn test_box_leaves_are_faces() {
        let tree = Tree::build(&Mesh::create_box(Vec3::ZERO, Vec3::ONE));
        tree.validate();
        assert_eq!(tree.node_count(), 11);
        assert_eq!(tree.leaf_count(), 6);
        tree.enumerate_leaves(&mut |leaf_index: usize| {
            let normals: Vec<Vec3> = tree
                .leaf_triangles(leaf_index)
                .map(|(_, triangle)| triangle.face_normal.normalize())
                .collect();
            assert_eq!(normals.len(), 2);
            assert!(normals[0].abs_diff_eq(normals[1], 1e-6));
            true
        });
    }

    #[test]
    fn test_coincident_triangles_stay_in_one_leaf() {
        let point = Vec3::new(1.0, 2.0, 3.0);
        let triangles = vec![Triangle::new([point; 3], [Vec3::Y; 3]); 5];
        let tree = build(triangles);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.root().kind, NodeKind::Leaf { first_index: 0, count: 5 });
        assert_eq!(tree.root().bounds, BoundingBox::new(point, point));
    }

    #[test]
    fn test_identical_triangles_are_not_split() {
        // Nonzero area, but every centroid coincides so no sample can separate them.
        let triangles = vec![triangle_at_centroid(Vec3::ZERO, 1.0); 7];
        let tree = build(triangles);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.root().triangle_count(), 7);
    }

    #[test]
    fn test_collinear_triangles() {
        // Zero-area triangles strung along X. Every split has zero cost and is rejected.
        let triangles: Vec<Triangle> = (0..6)
            .map(|i| {
                let x = i as f32;
                Triangle::new(
                    [Vec3::new(x, 0.0, 0.0), Vec3::new(x + 0.5, 0.0, 0.0), Vec3::new(x + 0.25, 0.0, 0.0)],
                    [Vec3::Y; 3],
                )
            })
            .collect();
        let tree = build(triangles);
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.root().triangle_count(), 6);
    }

    #[test]
    fn test_separated_clusters() {
        let mut triangles = Vec::new();
        for i in 0..4 {
            triangles.push(triangle_at_centroid(Vec3::new(i as f32 * 0.01, 0.0, 0.0), 0.1));
            triangles.push(triangle_at_centroid(Vec3::new(50.0 + i as f32 * 0.01, 0.0, 0.0), 0.1));
        }
        let tree = build(triangles);
        tree.validate();
        let (left, right) = tree.children(0).unwrap();
        let left_indices = tree.subtree_triangle_indices(left);
        let right_indices = tree.subtree_triangle_indices(right);
        assert_eq!(left_indices.len(), 4);
        assert_eq!(right_indices.len(), 4);
        assert!(left_indices.iter().all(|&index| index % 2 == 0));
        assert!(right_indices.iter().all(|&index| index % 2 == 1));
    }

    #[test]
    fn test_partition_with_repeated_centroids_at_split() {
        let centroids_x = [1.0, 0.0, 1.0, 2.0, 1.0, 0.5, 1.0];
        let triangles: Vec<Triangle> = centroids_x
            .iter()
            .map(|&x| triangle_at_centroid(Vec3::new(x, 0.0, 0.0), 0.1))
            .collect();
        let settings = BuildSettings::default();
        let mut builder = TreeBuilder::new(&triangles, (0..7).collect(), &settings);

        let left_count = builder.partition(0, 7, 0, 1.0);
        assert_eq!(left_count, 2);
        for slot in 0..7 {
            let below = builder.triangle_at(slot).centroid.x < 1.0;
            assert_eq!(below, slot < left_count);
        }
        let mut sorted = builder.triangle_indices.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..7).collect::<Vec<u32>>());

        // Partitioning a subrange leaves everything outside it alone.
        let before = builder.triangle_indices.clone();
        let left_count = builder.partition(2, 5, 0, 1.5);
        assert_eq!(left_count, 4);
        assert_eq!(&builder.triangle_indices[..2], &before[..2]);
        let everything_left = builder.partition(0, 7, 0, 10.0);
        assert_eq!(everything_left, 7);
        let nothing_left = builder.partition(0, 7, 0, -10.0);
        assert_eq!(nothing_left, 0);
    }

    #[test]
    fn test_evaluate_cost_rejects_empty_sides() {
        let triangles = vec![
            triangle_at_centroid(Vec3::new(0.0, 0.0, 0.0), 0.5),
            triangle_at_centroid(Vec3::new(4.0, 0.0, 0.0), 0.5),
        ];
        let settings = BuildSettings::default();
        let builder = TreeBuilder::new(&triangles, vec![0, 1], &settings);
        assert_eq!(builder.evaluate_cost(0, 2, 0, -1.0), REJECTED_SPLIT_COST);
        assert_eq!(builder.evaluate_cost(0, 2, 0, 10.0), REJECTED_SPLIT_COST);
        let cost = builder.evaluate_cost(0, 2, 0, 2.0);
        let expected = triangles[0].bounds().area() + triangles[1].bounds().area();
        assert!((cost - expected).abs() < 1e-5);
    }

    #[test]
    fn test_find_best_split_prefers_gap() {
        let triangles: Vec<Triangle> = [0.0, 0.1, 0.2, 10.0, 10.1, 10.2]
            .iter()
            .map(|&y| triangle_at_centroid(Vec3::new(0.0, y, 0.0), 0.05))
            .collect();
        let settings = BuildSettings::default();
        let mut builder = TreeBuilder::new(&triangles, (0..6).collect(), &settings);
        builder.update_node_bounds(0);
        let bounds = builder.nodes[0].bounds;
        let split = builder.find_best_split(&bounds, 0, 6).unwrap();
        assert_eq!(split.axis, 1);
        assert!(split.position > 0.2 && split.position <= 10.0);
    }

    #[test]
    #[should_panic(expected = "Any attempt to allocate a node pair should not overrun the node pool.")]
    fn test_node_pool_overrun_panics() {
        let triangles = vec![triangle_at_centroid(Vec3::ZERO, 1.0)];
        let settings = BuildSettings::default();
        let mut builder = TreeBuilder::new(&triangles, vec![0], &settings);
        builder.allocate_node_pair(Node::leaf(0, 1), Node::leaf(0, 0));
    }

    #[test]
    fn test_leaf_size_setting() {
        let mesh = Mesh::create_box(Vec3::ZERO, Vec3::ONE);
        let settings = BuildSettings {
            maximum_leaf_size: 12,
            ..Default::default()
        };
        let tree = Tree::build_with_settings(&mesh, &settings).unwrap();
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.root().triangle_count(), 12);
    }

    #[test]
    fn test_invalid_settings_are_reported() {
        let settings = BuildSettings {
            split_sample_count: 0,
            ..Default::default()
        };
        assert_eq!(
            Tree::build_with_settings(&Mesh::default(), &settings).err(),
            Some(SettingsError::TooFewSplitSamples { count: 0 })
        );
        assert!(Tree::from_triangles(Vec::new(), &settings).is_err());
    }

    #[test]
    fn test_deterministic() {
        let mesh = Mesh::create_grid(3.0, 5.0, 17, 11);
        let a = Tree::build(&mesh);
        let b = Tree::build(&mesh);
        assert_eq!(a.nodes(), b.nodes());
        assert_eq!(a.triangle_indices(), b.triangle_indices());
    }

    #[test]
    fn test_grid_invariants() {
        let mesh = Mesh::create_grid(10.0, 10.0, 32, 32);
        let tree = Tree::build(&mesh);
        tree.validate();
        assert!(tree.node_count() <= 2 * mesh.triangle_count());
        let depth_bound = 4 * ((mesh.triangle_count() as f32).log2().ceil() as usize) + 4;
        assert!(tree.compute_maximum_depth() <= depth_bound);
        // Flat, evenly spaced geometry always has a profitable split down to the leaf floor.
        tree.enumerate_leaves(&mut |leaf_index: usize| {
            assert!(tree.nodes()[leaf_index].triangle_count() <= 2);
            true
        });
    }

    #[test]
    fn test_children_allocated_in_preorder() {
        let tree = Tree::build(&Mesh::create_grid(4.0, 4.0, 6, 6));
        // In pre-order allocation, the left child's pair follows every node allocated for earlier subtrees,
        // so child indices strictly increase along any root-to-leaf path.
        for (node_index, node) in tree.nodes().iter().enumerate() {
            if let Some((left, right)) = node.children() {
                assert!(left as usize > node_index);
                assert_eq!(right, left + 1);
                assert_eq!(left % 2, 1);
            }
        }
    }
}
