/// A drawer that batches submeshes by shader before recording draw calls.
///
/// Mirrors `ForwardDrawer`'s per-instance draw sequence, but first collects
/// every visible (instance, LOD-0 submesh) pair and stably sorts by pipeline
/// identity so submeshes sharing a shader draw consecutively — insertion
/// order (i.e. scene add order) is the tie-breaker within a shader run,
/// matching `renderOrder` acting only to break ties between buckets.

use std::sync::Arc;

use crate::error::Result;
use crate::graphics_device::{CommandList, ShaderStage};
use crate::camera::RenderView;
use crate::graphics_device::Pipeline as GraphicsDevicePipeline;
use super::render_instance::RenderInstanceKey;
use super::scene::Scene;
use super::drawer::Drawer;

struct Batched<'a> {
    instance_key: RenderInstanceKey,
    pipeline: &'a Arc<dyn GraphicsDevicePipeline>,
    sub_mesh_index: usize,
}

pub struct SortedDrawer;

impl SortedDrawer {
    pub fn new() -> Self {
        Self
    }
}

impl Drawer for SortedDrawer {
    fn draw(&self, scene: &Scene, view: &RenderView, cmd: &mut dyn CommandList) -> Result<()> {
        let camera = view.camera();
        cmd.set_viewport(*camera.viewport())?;
        cmd.set_scissor(camera.effective_scissor())?;

        let mut batched = Vec::new();
        for &key in view.visible_instances() {
            let Some(instance) = scene.render_instance(key) else { continue };
            let Some(lod) = instance.lod(0) else { continue };
            for sm_idx in 0..lod.sub_mesh_count() {
                let Some(sub_mesh) = lod.sub_mesh(sm_idx) else { continue };
                let Some(pass) = sub_mesh.passes().first() else { continue };
                batched.push(Batched {
                    instance_key: key,
                    pipeline: pass.pipeline(),
                    sub_mesh_index: sm_idx,
                });
            }
        }

        // Stable sort: equal pipeline-identity entries keep their original
        // (scene insertion) relative order.
        batched.sort_by_key(|b| Arc::as_ptr(b.pipeline) as *const () as usize);

        let mut current_pipeline: Option<*const ()> = None;
        let mut current_material: Option<u32> = None;
        let mut global_bound = false;
        for entry in &batched {
            let instance = match scene.render_instance(entry.instance_key) {
                Some(inst) => inst,
                None => continue,
            };
            let lod = match instance.lod(0) {
                Some(lod) => lod,
                None => continue,
            };
            let sub_mesh = match lod.sub_mesh(entry.sub_mesh_index) {
                Some(sm) => sm,
                None => continue,
            };

            cmd.bind_vertex_buffer(instance.vertex_buffer(), 0)?;
            if let Some(ib) = instance.index_buffer() {
                cmd.bind_index_buffer(ib, 0, instance.index_type())?;
            }

            for pass in sub_mesh.passes() {
                let pipeline_identity = Arc::as_ptr(pass.pipeline()) as *const ();
                let pipeline_changed = current_pipeline != Some(pipeline_identity);
                if pipeline_changed {
                    cmd.bind_pipeline(pass.pipeline())?;
                    current_pipeline = Some(pipeline_identity);
                }

                if !global_bound {
                    if let Some(global_bg) = scene.global_binding_group() {
                        cmd.bind_binding_group(pass.pipeline(), global_bg.set_index(), global_bg)?;
                    }
                    global_bound = true;
                }

                // Same material as the previous draw on the same pipeline:
                // the texture binding groups are already bound, skip the
                // redundant rebind.
                let material_slot = sub_mesh.material_slot_id();
                if pipeline_changed || current_material != Some(material_slot) {
                    for bg in pass.texture_binding_groups() {
                        cmd.bind_binding_group(pass.pipeline(), bg.set_index(), bg)?;
                    }
                    current_material = Some(material_slot);
                }

                let draw_slot = sub_mesh.draw_slot();
                cmd.push_constants(&[ShaderStage::Vertex], 0, bytemuck::bytes_of(&draw_slot))?;

                if sub_mesh.index_count() > 0 {
                    cmd.draw_indexed(sub_mesh.index_count(), sub_mesh.index_offset(), sub_mesh.vertex_offset() as i32)?;
                } else {
                    cmd.draw(sub_mesh.vertex_count(), sub_mesh.vertex_offset())?;
                }
            }
        }

        Ok(())
    }
}
