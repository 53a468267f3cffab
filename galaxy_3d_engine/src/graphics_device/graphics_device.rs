/// GraphicsDevice trait - main device interface for creating resources and submitting commands

use std::sync::Arc;
use winit::window::Window;

use crate::error::Result;
use crate::graphics_device::{
    CommandList, RenderPass, Framebuffer, Swapchain,
    Texture, Buffer, Shader, Pipeline, BindingGroup, BindingResource,
    TextureDesc, BufferDesc, ShaderDesc, PipelineDesc,
    RenderPassDesc, FramebufferDesc,
};

/// Graphics device statistics, reset at the start of each frame by the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphicsDeviceStats {
    /// Number of draw calls this frame
    pub draw_calls: u32,
    /// Number of triangles drawn this frame
    pub triangles: u32,
    /// GPU memory used (bytes)
    pub gpu_memory_used: u64,
}

/// Main graphics device trait
///
/// This is the central factory interface for creating GPU resources and submitting commands.
/// Implemented by backend-specific devices (e.g., a Vulkan device in the renderer backend crate).
pub trait GraphicsDevice: Send + Sync {
    /// Create a command list for recording rendering commands
    fn create_command_list(&self) -> Result<Box<dyn CommandList>>;

    /// Create a render pass
    fn create_render_pass(&self, desc: &RenderPassDesc) -> Result<Arc<dyn RenderPass>>;

    /// Create a framebuffer binding together render target attachments
    fn create_framebuffer(&self, desc: &FramebufferDesc) -> Result<Arc<dyn Framebuffer>>;

    /// Create a swapchain for window presentation
    fn create_swapchain(&self, window: &Window) -> Result<Box<dyn Swapchain>>;

    /// Create a texture
    fn create_texture(&mut self, desc: TextureDesc) -> Result<Arc<dyn Texture>>;

    /// Create a buffer
    fn create_buffer(&mut self, desc: BufferDesc) -> Result<Arc<dyn Buffer>>;

    /// Create a shader
    fn create_shader(&mut self, desc: ShaderDesc) -> Result<Arc<dyn Shader>>;

    /// Create a graphics pipeline
    fn create_pipeline(&mut self, desc: PipelineDesc) -> Result<Arc<dyn Pipeline>>;

    /// Create a binding group for the given pipeline and set index
    ///
    /// The layout is deduced from the pipeline's shader reflection; the caller
    /// never declares a descriptor set layout by hand.
    fn create_binding_group(
        &self,
        pipeline: &Arc<dyn Pipeline>,
        set_index: u32,
        resources: &[BindingResource],
    ) -> Result<Arc<dyn BindingGroup>>;

    /// Submit command lists for execution on the GPU
    fn submit(&self, commands: &[&dyn CommandList]) -> Result<()>;

    /// Submit command lists and present the given swapchain image afterwards
    fn submit_with_swapchain(
        &self,
        commands: &[&dyn CommandList],
        swapchain: &dyn Swapchain,
        image_index: u32,
    ) -> Result<()>;

    /// Wait for all GPU operations to complete
    fn wait_idle(&self) -> Result<()>;

    /// Get statistics about the graphics device
    fn stats(&self) -> GraphicsDeviceStats;

    /// Notify the device that the window has been resized
    fn resize(&mut self, width: u32, height: u32);
}
