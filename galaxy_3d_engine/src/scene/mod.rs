//! Scene management module
//!
//! Provides scene and render instance management.

mod culler;
mod drawer;
mod octree_scene_index;
mod render_instance;
mod scene;
mod scene_index;
mod scene_manager;
mod sorted_drawer;
mod updater;

pub use culler::{CameraCuller, BruteForceCuller, FrustumCuller};
pub use drawer::{Drawer, ForwardDrawer};
pub use octree_scene_index::OctreeSceneIndex;
pub use render_instance::{
    RenderInstance, RenderInstanceKey, RenderLOD, RenderSubMesh,
    RenderPass, AABB, FLAG_VISIBLE, FLAG_CAST_SHADOW, FLAG_RECEIVE_SHADOW,
};
pub use scene::Scene;
pub use scene_index::SceneIndex;
pub use scene_manager::SceneManager;
pub use sorted_drawer::SortedDrawer;
pub use updater::{Updater, NoOpUpdater, DefaultUpdater};
