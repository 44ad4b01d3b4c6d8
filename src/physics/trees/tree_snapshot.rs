use crossbeam_utils::sync::ShardedLock;
use std::ops::Deref;
use std::sync::{Arc, PoisonError};
use tracing::debug;

use crate::error::SettingsError;
use crate::physics::collidables::mesh::Mesh;

use super::build_settings::BuildSettings;
use super::tree::Tree;

/// An immutable tree tagged with the rebuild generation that produced it.
#[derive(Debug)]
pub struct TreeSnapshot {
    version: u64,
    tree: Tree,
}

impl TreeSnapshot {
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }
}

impl Deref for TreeSnapshot {
    type Target = Tree;

    #[inline]
    fn deref(&self) -> &Tree {
        &self.tree
    }
}

/// Shares a collider tree between query threads while allowing it to be rebuilt.
///
/// Rebuilds construct a complete new tree off to the side and then swap it in. Readers holding a snapshot from
/// [`SharedTree::load`] keep traversing the old tree until they drop it; nothing they hold is ever mutated.
#[derive(Debug)]
pub struct SharedTree {
    current: ShardedLock<Arc<TreeSnapshot>>,
}

impl SharedTree {
    /// Wraps an already built tree as version 0.
    pub fn new(tree: Tree) -> Self {
        Self {
            current: ShardedLock::new(Arc::new(TreeSnapshot { version: 0, tree })),
        }
    }

    /// Gets the most recently published tree.
    pub fn load(&self) -> Arc<TreeSnapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Publishes a new tree and returns its version.
    pub fn replace(&self, tree: Tree) -> u64 {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let version = current.version + 1;
        *current = Arc::new(TreeSnapshot { version, tree });
        debug!(version, node_count = current.node_count(), "published rebuilt tree");
        version
    }

    /// Builds a fresh tree from a new mesh snapshot and publishes it. The lock is only held for the swap.
    pub fn rebuild(&self, mesh: &Mesh, settings: &BuildSettings) -> Result<u64, SettingsError> {
        let tree = Tree::build_with_settings(mesh, settings)?;
        Ok(self.replace(tree))
    }
}
