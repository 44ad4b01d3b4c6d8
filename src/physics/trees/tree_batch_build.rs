use crossbeam_utils::CachePadded;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

use crate::error::SettingsError;
use crate::physics::collidables::mesh::Mesh;
use crate::utilities::thread_dispatcher::IThreadDispatcher;

use super::build_settings::BuildSettings;
use super::tree::Tree;

impl Tree {
    /// Builds one tree per mesh using the dispatcher's workers.
    ///
    /// Each tree is still built by a single thread; parallelism is only across meshes, which share no state.
    /// Workers claim meshes one at a time so a few large meshes don't leave other workers idle.
    /// The returned trees are in the same order as `meshes` and identical to what [`Tree::build_with_settings`]
    /// produces.
    pub fn build_batch<TDispatcher: IThreadDispatcher>(
        meshes: &[Mesh],
        settings: &BuildSettings,
        dispatcher: &TDispatcher,
    ) -> Result<Vec<Tree>, SettingsError> {
        settings.validate()?;
        let next_mesh = CachePadded::new(AtomicUsize::new(0));
        let built = Mutex::new(Vec::with_capacity(meshes.len()));

        dispatcher.dispatch_workers(
            |worker_index| {
                let mut worker_trees = Vec::new();
                loop {
                    let mesh_index = next_mesh.fetch_add(1, Ordering::Relaxed);
                    let Some(mesh) = meshes.get(mesh_index) else {
                        break;
                    };
                    let (triangles, triangle_indices) = mesh.extract_primitives();
                    worker_trees.push((
                        mesh_index,
                        Tree::build_from_primitives(triangles, triangle_indices, settings),
                    ));
                }
                debug!(worker_index, tree_count = worker_trees.len(), "batch worker finished");
                built
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .extend(worker_trees);
            },
            meshes.len(),
        );

        let mut built = built.into_inner().unwrap_or_else(PoisonError::into_inner);
        debug_assert_eq!(built.len(), meshes.len());
        built.sort_unstable_by_key(|(mesh_index, _)| *mesh_index);
        Ok(built.into_iter().map(|(_, tree)| tree).collect())
    }
}
