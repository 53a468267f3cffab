/// Shader - Vulkan implementation of RendererShader trait

use galaxy_3d_engine::galaxy3d::render::Shader as RendererShader;
use galaxy_3d_engine::graphics_device::ShaderStage;
use ash::vk;

/// Vulkan shader implementation
pub struct Shader {
    /// Vulkan shader module
    pub(crate) module: vk::ShaderModule,
    /// Shader stage flags
    pub(crate) stage: vk::ShaderStageFlags,
    /// Entry point name
    pub(crate) entry_point: String,
    /// Vulkan device (for cleanup)
    pub(crate) device: ash::Device,
    /// Shader stage as the core crate's enum, kept alongside the raw SPIR-V
    /// so `create_pipeline` can re-reflect the combined vertex+fragment
    /// module set through `graphics_device::reflect::reflect_spirv` without
    /// each shader carrying its own half-reflected duplicate.
    pub(crate) shader_stage: ShaderStage,
    /// Raw SPIR-V bytecode this module was created from
    pub(crate) code: Vec<u8>,
}

impl RendererShader for Shader {
    // No public methods
}

impl Drop for Shader {
    fn drop(&mut self) {
        unsafe {
            // Destroy shader module
            self.device.destroy_shader_module(self.module, None);
        }
    }
}
