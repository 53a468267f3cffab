/// Render target edge in a render graph.
///
/// High-level description of a rendering surface that connects passes in
/// the DAG: either the current swapchain image, or a specific view (layer
/// + mip) of a resource texture. Resolving these into actual
/// `graphics_device::Framebuffer`/`RenderPass` objects is the job of a
/// future compile step; at this layer a target is pure topology.
///
/// A render target can be written by at most one pass (single writer)
/// and read by multiple passes (multiple readers).

use std::sync::{Arc, Mutex};
use crate::graphics_device;
use crate::resource;

/// A specific view (array layer + mip level) of a resource texture.
pub struct TextureTargetView {
    /// The resource texture this view references
    pub texture: Arc<resource::Texture>,
    /// Array layer index (0 for simple textures)
    pub layer: u32,
    /// Mip level (0 for full resolution)
    pub mip_level: u32,
}

/// What a render target actually refers to.
pub enum RenderTargetKind {
    /// The window's swapchain, acquired fresh each frame
    Swapchain(Arc<Mutex<dyn graphics_device::Swapchain>>),
    /// A specific view of a resource texture
    Texture(TextureTargetView),
}

pub struct RenderTarget {
    kind: RenderTargetKind,
    /// Pass index that writes to this target (at most one)
    written_by: Option<usize>,
}

impl RenderTarget {
    pub(crate) fn new(kind: RenderTargetKind) -> Self {
        Self { kind, written_by: None }
    }

    /// Get what this target refers to
    pub fn kind(&self) -> &RenderTargetKind {
        &self.kind
    }

    /// Get the pass index that writes to this target
    pub fn written_by(&self) -> Option<usize> {
        self.written_by
    }

    /// Set the writer pass index
    pub(crate) fn set_written_by(&mut self, pass_id: usize) {
        self.written_by = Some(pass_id);
    }
}
