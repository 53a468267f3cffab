/// Resource-level texture type.
///
/// Wraps a low-level `graphics_device::Texture` with layer/atlas metadata.
/// A texture is either:
///
/// - **simple**: a single 2D image (`array_layers == 1`), optionally carrying
///   named atlas regions over that one layer.
/// - **indexed**: a texture array (`array_layers > 1`) where each populated
///   layer is given a name and may itself carry named atlas regions.
///
/// Layers and regions can be supplied at creation time and/or added later.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use crate::error::Result;
use crate::{engine_bail, engine_err};
use crate::graphics_device::{self, Texture as GraphicsDeviceTexture};

fn bytes_per_pixel(format: graphics_device::TextureFormat) -> u32 {
    use graphics_device::TextureFormat::*;
    match format {
        R8G8B8A8_SRGB | R8G8B8A8_UNORM | B8G8R8A8_SRGB | B8G8R8A8_UNORM => 4,
        D16_UNORM => 2,
        D32_FLOAT | D24_UNORM_S8_UINT => 4,
        R32_SFLOAT => 4,
        R32G32_SFLOAT => 8,
        R32G32B32_SFLOAT => 12,
        R32G32B32A32_SFLOAT => 16,
    }
}

// ===== ATLAS REGION =====

/// Pixel-space UV region within a texture layer
#[derive(Debug, Clone, Copy)]
pub struct AtlasRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Descriptor for adding a named region to a layer
#[derive(Debug, Clone)]
pub struct AtlasRegionDesc {
    pub name: String,
    pub region: AtlasRegion,
}

// ===== TEXTURE LAYER =====

/// A single named layer of a texture, with optional atlas regions
pub struct TextureLayer {
    name: String,
    layer_index: u32,
    regions: Vec<AtlasRegion>,
    region_names: HashMap<String, usize>,
}

impl TextureLayer {
    /// Get the layer name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the layer index within the texture array
    pub fn layer_index(&self) -> u32 {
        self.layer_index
    }

    /// Whether this layer has any atlas regions
    pub fn is_atlas(&self) -> bool {
        !self.regions.is_empty()
    }

    /// Get number of regions
    pub fn region_count(&self) -> usize {
        self.regions.len()
    }

    /// Get region by index
    pub fn region(&self, index: usize) -> Option<&AtlasRegion> {
        self.regions.get(index)
    }

    /// Get region by name
    pub fn region_by_name(&self, name: &str) -> Option<&AtlasRegion> {
        let idx = self.region_names.get(name)?;
        self.regions.get(*idx)
    }

    /// Get region index by name
    pub fn region_index_by_name(&self, name: &str) -> Option<u32> {
        self.region_names.get(name).map(|&i| i as u32)
    }

    fn add_region(&mut self, desc: AtlasRegionDesc, texture_width: u32, texture_height: u32) -> Result<()> {
        if self.region_names.contains_key(&desc.name) {
            engine_bail!("galaxy3d::Texture",
                "Layer '{}': region name '{}' already exists", self.name, desc.name);
        }
        if desc.region.width == 0 || desc.region.height == 0 {
            engine_bail!("galaxy3d::Texture",
                "Layer '{}': region '{}' has zero width or height", self.name, desc.name);
        }
        if desc.region.x + desc.region.width > texture_width
            || desc.region.y + desc.region.height > texture_height
        {
            engine_bail!("galaxy3d::Texture",
                "Layer '{}': region '{}' exceeds texture bounds ({}x{})",
                self.name, desc.name, texture_width, texture_height);
        }

        let index = self.regions.len();
        self.region_names.insert(desc.name, index);
        self.regions.push(desc.region);
        Ok(())
    }
}

// ===== DESCRIPTORS =====

/// Descriptor for a single layer at creation time (or when added later)
pub struct LayerDesc {
    pub name: String,
    pub layer_index: u32,
    pub data: Option<Vec<u8>>,
    pub regions: Vec<AtlasRegionDesc>,
}

/// Texture creation descriptor
pub struct TextureDesc {
    pub graphics_device: Arc<Mutex<dyn graphics_device::GraphicsDevice>>,
    pub texture: graphics_device::TextureDesc,
    pub layers: Vec<LayerDesc>,
}

// ===== TEXTURE =====

/// Texture resource: a GPU texture plus named layer/atlas-region metadata
pub struct Texture {
    graphics_device_texture: Arc<dyn GraphicsDeviceTexture>,
    layers: Vec<TextureLayer>,
    layer_names: HashMap<String, usize>,
    is_simple: bool,
}

impl Texture {
    /// Create texture from descriptor (internal use by ResourceManager)
    pub(crate) fn from_desc(desc: TextureDesc) -> Result<Self> {
        let array_layers = desc.texture.array_layers;
        let is_simple = array_layers == 1;

        // ========== VALIDATION: simple textures must have exactly one layer at index 0 ==========
        if is_simple && desc.layers.len() != 1 {
            engine_bail!("galaxy3d::Texture",
                "Simple texture (array_layers = 1) must have exactly one layer, got {}",
                desc.layers.len());
        }
        if is_simple && desc.layers[0].layer_index != 0 {
            engine_bail!("galaxy3d::Texture",
                "Simple texture's single layer must have layer_index 0, got {}",
                desc.layers[0].layer_index);
        }

        // ========== VALIDATION: no duplicate layer names or indices ==========
        let mut seen_names = std::collections::HashSet::new();
        let mut seen_indices = std::collections::HashSet::new();
        for layer_desc in &desc.layers {
            if !seen_names.insert(&layer_desc.name) {
                engine_bail!("galaxy3d::Texture",
                    "Duplicate layer name '{}'", layer_desc.name);
            }
            if !seen_indices.insert(layer_desc.layer_index) {
                engine_bail!("galaxy3d::Texture",
                    "Duplicate layer index {}", layer_desc.layer_index);
            }
            if layer_desc.layer_index >= array_layers {
                engine_bail!("galaxy3d::Texture",
                    "Layer '{}': layer_index {} out of bounds (array_layers: {})",
                    layer_desc.name, layer_desc.layer_index, array_layers);
            }
        }

        // ========== VALIDATION: per-layer data size ==========
        let expected_layer_size =
            (desc.texture.width * desc.texture.height * bytes_per_pixel(desc.texture.format)) as usize;
        for layer_desc in &desc.layers {
            if let Some(data) = &layer_desc.data {
                if data.len() != expected_layer_size {
                    engine_bail!("galaxy3d::Texture",
                        "Layer '{}': data size {} doesn't match expected size {} ({}x{} @ {} bytes/px)",
                        layer_desc.name, data.len(), expected_layer_size,
                        desc.texture.width, desc.texture.height, bytes_per_pixel(desc.texture.format));
                }
            }
        }

        // ========== VALIDATION: region bounds and duplicate names (per layer) ==========
        for layer_desc in &desc.layers {
            let mut seen_region_names = std::collections::HashSet::new();
            for region_desc in &layer_desc.regions {
                if !seen_region_names.insert(&region_desc.name) {
                    engine_bail!("galaxy3d::Texture",
                        "Layer '{}': duplicate region name '{}'", layer_desc.name, region_desc.name);
                }
                if region_desc.region.width == 0 || region_desc.region.height == 0 {
                    engine_bail!("galaxy3d::Texture",
                        "Layer '{}': region '{}' has zero width or height",
                        layer_desc.name, region_desc.name);
                }
                if region_desc.region.x + region_desc.region.width > desc.texture.width
                    || region_desc.region.y + region_desc.region.height > desc.texture.height
                {
                    engine_bail!("galaxy3d::Texture",
                        "Layer '{}': region '{}' exceeds texture bounds ({}x{})",
                        layer_desc.name, region_desc.name, desc.texture.width, desc.texture.height);
                }
            }
        }

        // ========== BUILD UPLOAD DATA ==========
        let layer_uploads: Vec<graphics_device::TextureLayerData> = desc.layers.iter()
            .filter_map(|l| l.data.as_ref().map(|data| graphics_device::TextureLayerData {
                layer: l.layer_index,
                data: data.clone(),
            }))
            .collect();

        let mut texture_desc = desc.texture;
        if !layer_uploads.is_empty() {
            texture_desc.data = Some(graphics_device::TextureData::Layers(layer_uploads));
        }

        // ========== CREATE GPU TEXTURE ==========
        let graphics_device_texture = desc.graphics_device.lock().unwrap()
            .create_texture(texture_desc)?;

        // ========== BUILD LAYER METADATA ==========
        let mut layers = Vec::with_capacity(desc.layers.len());
        let mut layer_names = HashMap::new();

        for (vec_index, layer_desc) in desc.layers.into_iter().enumerate() {
            let mut regions = Vec::with_capacity(layer_desc.regions.len());
            let mut region_names = HashMap::new();
            for region_desc in layer_desc.regions {
                region_names.insert(region_desc.name, regions.len());
                regions.push(region_desc.region);
            }

            layer_names.insert(layer_desc.name.clone(), vec_index);
            layers.push(TextureLayer {
                name: layer_desc.name,
                layer_index: layer_desc.layer_index,
                regions,
                region_names,
            });
        }

        Ok(Self {
            graphics_device_texture,
            layers,
            layer_names,
            is_simple,
        })
    }

    // ===== KIND =====

    /// True if this is a simple (single-layer) texture
    pub fn is_simple(&self) -> bool {
        self.is_simple
    }

    /// True if this is an indexed texture (array_layers > 1)
    pub fn is_indexed(&self) -> bool {
        !self.is_simple
    }

    // ===== GPU RESOURCE ACCESS =====

    /// Get the underlying GPU texture
    pub fn graphics_device_texture(&self) -> &Arc<dyn GraphicsDeviceTexture> {
        &self.graphics_device_texture
    }

    // ===== LAYER ACCESS =====

    /// Get number of populated layers
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Get layer by vector position
    pub fn layer(&self, index: u32) -> Option<&TextureLayer> {
        self.layers.get(index as usize)
    }

    /// Get layer by name
    pub fn layer_by_name(&self, name: &str) -> Option<&TextureLayer> {
        let idx = self.layer_names.get(name)?;
        self.layers.get(*idx)
    }

    /// Get layer vector position by name
    pub fn layer_index_by_name(&self, name: &str) -> Option<u32> {
        self.layer_names.get(name).map(|&i| i as u32)
    }

    /// Convenience lookup: region by layer name and region name
    pub fn region(&self, layer_name: &str, region_name: &str) -> Option<&AtlasRegion> {
        self.layer_by_name(layer_name)?.region_by_name(region_name)
    }

    // ===== MODIFICATION =====

    /// Add a new layer to an indexed texture
    ///
    /// Fails for simple textures -- their single layer is fixed at creation.
    pub fn add_layer(&mut self, desc: LayerDesc) -> Result<()> {
        if self.is_simple {
            engine_bail!("galaxy3d::Texture", "Cannot add a layer to a simple texture");
        }
        if self.layer_names.contains_key(&desc.name) {
            engine_bail!("galaxy3d::Texture", "Layer name '{}' already exists", desc.name);
        }
        if self.layers.iter().any(|l| l.layer_index == desc.layer_index) {
            engine_bail!("galaxy3d::Texture", "Layer index {} already in use", desc.layer_index);
        }
        let array_layers = self.graphics_device_texture.info().array_layers;
        if desc.layer_index >= array_layers {
            engine_bail!("galaxy3d::Texture",
                "Layer index {} out of bounds (array_layers: {})", desc.layer_index, array_layers);
        }

        let info = self.graphics_device_texture.info();
        let expected_layer_size = (info.width * info.height * bytes_per_pixel(info.format)) as usize;
        if let Some(data) = &desc.data {
            if data.len() != expected_layer_size {
                engine_bail!("galaxy3d::Texture",
                    "Layer '{}': data size {} doesn't match expected size {}",
                    desc.name, data.len(), expected_layer_size);
            }
        }

        let mut regions = Vec::with_capacity(desc.regions.len());
        let mut region_names = HashMap::new();
        let mut seen_region_names = std::collections::HashSet::new();
        for region_desc in desc.regions {
            if !seen_region_names.insert(region_desc.name.clone()) {
                engine_bail!("galaxy3d::Texture",
                    "Layer '{}': duplicate region name '{}'", desc.name, region_desc.name);
            }
            if region_desc.region.x + region_desc.region.width > info.width
                || region_desc.region.y + region_desc.region.height > info.height
            {
                engine_bail!("galaxy3d::Texture",
                    "Layer '{}': region '{}' exceeds texture bounds", desc.name, region_desc.name);
            }
            region_names.insert(region_desc.name, regions.len());
            regions.push(region_desc.region);
        }

        let vec_index = self.layers.len();
        self.layer_names.insert(desc.name.clone(), vec_index);
        self.layers.push(TextureLayer {
            name: desc.name,
            layer_index: desc.layer_index,
            regions,
            region_names,
        });

        Ok(())
    }

    /// Add a named atlas region to an existing layer
    pub fn add_region(&mut self, layer_name: &str, desc: AtlasRegionDesc) -> Result<()> {
        let info = self.graphics_device_texture.info();
        let (width, height) = (info.width, info.height);

        let idx = *self.layer_names.get(layer_name)
            .ok_or_else(|| engine_err!("galaxy3d::Texture", "Layer '{}' not found", layer_name))?;
        self.layers[idx].add_region(desc, width, height)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
