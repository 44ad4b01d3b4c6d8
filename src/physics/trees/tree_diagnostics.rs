use std::fmt;

use crate::utilities::bounding_box::BoundingBox;

use super::node::NodeKind;
use super::tree::Tree;

impl Tree {
    /// Measures the SAH cost metric of the tree relative to its root's area. Lower is better.
    ///
    /// Internal nodes cost their area, leaves cost their area times their triangle count. A tree that is a single
    /// leaf therefore measures exactly its triangle count. Trees without any extent measure zero.
    pub fn measure_cost_metric(&self) -> f32 {
        let root = self.root();
        if root.bounds.is_empty() {
            return 0.0;
        }
        let root_metric = root.bounds.area();
        if root_metric <= 0.0 {
            return 0.0;
        }
        let total_cost: f32 = self
            .nodes
            .iter()
            .map(|node| match node.kind {
                NodeKind::Leaf { count, .. } => node.bounds.area() * count as f32,
                NodeKind::Internal { .. } => node.bounds.area(),
            })
            .sum();
        total_cost / root_metric
    }

    /// Counts the leaves of the tree.
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }

    fn compute_maximum_depth_recursive(&self, node_index: usize, current_depth: usize) -> usize {
        match self.children(node_index) {
            Some((left, right)) => self
                .compute_maximum_depth_recursive(left, current_depth + 1)
                .max(self.compute_maximum_depth_recursive(right, current_depth + 1)),
            None => current_depth,
        }
    }

    /// Computes the maximum depth of the tree. A lone root has depth zero.
    pub fn compute_maximum_depth(&self) -> usize {
        self.compute_maximum_depth_recursive(0, 0)
    }

    fn validate_node(
        &self,
        node_index: usize,
        expected_first: usize,
        visited: &mut [bool],
        parent_bounds: Option<&BoundingBox>,
    ) -> usize {
        assert!(
            node_index < self.nodes.len(),
            "Implied existence of node {node_index} is outside of count {}.",
            self.nodes.len()
        );
        assert!(!visited[node_index], "Node {node_index} is reachable more than once.");
        visited[node_index] = true;

        let node = &self.nodes[node_index];
        if let Some(parent_bounds) = parent_bounds {
            assert!(
                parent_bounds.contains(&node.bounds),
                "Node {node_index} bounds {:?} escape its parent's bounds {parent_bounds:?}.",
                node.bounds
            );
        }

        match node.kind {
            NodeKind::Leaf { first_index, count } => {
                let first = first_index as usize;
                let count = count as usize;
                assert_eq!(
                    first, expected_first,
                    "Leaf {node_index} starts at {first}, expected {expected_first}."
                );
                assert!(
                    count > 0 || self.triangles.is_empty(),
                    "Leaf {node_index} is empty in a tree with triangles."
                );
                assert!(
                    first + count <= self.triangle_indices.len(),
                    "Leaf {node_index} range runs past the triangle index array."
                );
                let mut expected_bounds = BoundingBox::EMPTY;
                for &triangle_index in &self.triangle_indices[first..first + count] {
                    self.triangles[triangle_index as usize].merge_into(&mut expected_bounds);
                }
                assert_eq!(
                    node.bounds, expected_bounds,
                    "Leaf {node_index} bounds don't match its triangles."
                );
                count
            }
            NodeKind::Internal { left_child } => {
                let left = left_child as usize;
                assert!(
                    left > node_index,
                    "Node {node_index} points back to earlier node {left}."
                );
                let left_count = self.validate_node(left, expected_first, visited, Some(&node.bounds));
                let right_count =
                    self.validate_node(left + 1, expected_first + left_count, visited, Some(&node.bounds));
                assert!(
                    left_count > 0 && right_count > 0,
                    "Node {node_index} has an empty child."
                );
                let merged = BoundingBox::create_merged(&self.nodes[left].bounds, &self.nodes[left + 1].bounds);
                assert_eq!(
                    node.bounds, merged,
                    "Node {node_index} bounds don't match the union of its children."
                );
                left_count + right_count
            }
        }
    }

    /// Validates the tree structure, panicking on any inconsistency.
    ///
    /// Checks that the index array is a permutation, that every node is reachable exactly once, that each subtree
    /// owns one contiguous index range, and that every box tightly bounds its contents.
    pub fn validate(&self) {
        assert!(!self.nodes.is_empty(), "Tree has no root.");
        assert!(
            self.nodes.len() <= self.node_capacity,
            "Invalid node count of {}, larger than node pool capacity {}.",
            self.nodes.len(),
            self.node_capacity
        );
        assert_eq!(
            self.triangle_indices.len(),
            self.triangles.len(),
            "Triangle index array length doesn't match triangle count."
        );

        let mut referenced = vec![false; self.triangles.len()];
        for &triangle_index in &self.triangle_indices {
            let triangle_index = triangle_index as usize;
            assert!(
                triangle_index < self.triangles.len(),
                "Triangle index {triangle_index} is outside of count {}.",
                self.triangles.len()
            );
            assert!(
                !referenced[triangle_index],
                "Triangle {triangle_index} is referenced more than once."
            );
            referenced[triangle_index] = true;
        }

        let mut visited = vec![false; self.nodes.len()];
        let covered = self.validate_node(0, 0, &mut visited, None);
        assert_eq!(
            covered,
            self.triangles.len(),
            "{covered} triangles found in tree, expected {}.",
            self.triangles.len()
        );
        if let Some(orphan) = visited.iter().position(|&was_visited| !was_visited) {
            panic!("Node {orphan} is not reachable from the root.");
        }
    }

    fn write_node(&self, f: &mut fmt::Formatter<'_>, node_index: usize, depth: usize) -> fmt::Result {
        let indent = depth * 2;
        let node = &self.nodes[node_index];
        match node.kind {
            NodeKind::Internal { left_child } => {
                writeln!(
                    f,
                    "{:indent$}node {node_index}: children {left_child} {}",
                    "",
                    left_child + 1
                )?;
                self.write_node(f, left_child as usize, depth + 1)?;
                self.write_node(f, left_child as usize + 1, depth + 1)
            }
            NodeKind::Leaf { first_index, count } => {
                writeln!(
                    f,
                    "{:indent$}leaf {node_index}: {count} triangles from {first_index}",
                    ""
                )?;
                for (triangle_index, triangle) in self.leaf_triangles(node_index) {
                    writeln!(
                        f,
                        "{:indent$}  triangle {triangle_index} at centroid {}",
                        "", triangle.centroid
                    )?;
                }
                Ok(())
            }
        }
    }
}

/// Dumps the tree shape, one line per node, with each leaf's triangles listed beneath it.
impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_node(f, 0, 0)
    }
}
