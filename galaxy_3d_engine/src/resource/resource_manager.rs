//! Central resource manager for the engine.
//!
//! Stores and provides access to all engine resources (textures, geometries,
//! pipelines, materials, meshes, buffers) by name. Each resource type owns its
//! own validation and GPU resource creation via `from_desc`; the manager's job
//! is name-keyed storage, duplicate/not-found checks, and the few cross-cutting
//! concerns that span resource types (the material slot allocator, syncing
//! material parameters into a GPU-visible buffer).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use crate::error::Result;
use crate::{engine_bail, engine_err, engine_info};
use crate::graphics_device;
use crate::resource::texture::{Texture, TextureDesc, LayerDesc, AtlasRegionDesc};
use crate::resource::geometry::{Geometry, GeometryDesc, GeometryMeshDesc, GeometryLODDesc, GeometrySubMeshDesc};
use crate::resource::pipeline::{Pipeline, PipelineDesc, PipelineVariantDesc};
use crate::resource::material::{Material, MaterialDesc, ParamValue};
use crate::resource::mesh::{Mesh, MeshDesc};
use crate::resource::buffer::{Buffer, BufferDesc, BufferKind, FieldDesc, FieldType};
use crate::resource::loader::{self, FontAsset};
use crate::utils::SlotAllocator;

pub struct ResourceManager {
    textures: HashMap<String, Arc<Texture>>,
    geometries: HashMap<String, Arc<Geometry>>,
    pipelines: HashMap<String, Arc<Pipeline>>,
    materials: HashMap<String, Arc<Material>>,
    meshes: HashMap<String, Arc<Mesh>>,
    buffers: HashMap<String, Arc<Buffer>>,
    fonts: HashMap<String, Arc<FontAsset>>,

    material_slots: SlotAllocator,
}

impl ResourceManager {
    /// Create a new empty resource manager
    pub fn new() -> Self {
        Self {
            textures: HashMap::new(),
            geometries: HashMap::new(),
            pipelines: HashMap::new(),
            materials: HashMap::new(),
            meshes: HashMap::new(),
            buffers: HashMap::new(),
            fonts: HashMap::new(),
            material_slots: SlotAllocator::new(),
        }
    }

    /// Create a resource manager pre-populated with the engine's default
    /// assets: a 1x1 opaque white texture and an unlit default material
    /// built on the caller-supplied pipeline (shader bytecode is an
    /// asset-pipeline concern, so the pipeline itself is supplied rather
    /// than baked in here).
    pub fn new_with_defaults(
        graphics_device: Arc<Mutex<dyn graphics_device::GraphicsDevice>>,
        default_pipeline: PipelineDesc,
    ) -> Result<Self> {
        let mut manager = Self::new();

        manager.create_texture("default_white".to_string(), TextureDesc {
            graphics_device,
            texture: graphics_device::TextureDesc {
                width: 1,
                height: 1,
                format: graphics_device::TextureFormat::R8G8B8A8_UNORM,
                usage: graphics_device::TextureUsage::Sampled,
                array_layers: 1,
                mipmap: graphics_device::MipmapMode::None,
                data: Some(graphics_device::TextureData::Single(vec![255, 255, 255, 255])),
                texture_type: graphics_device::TextureType::Tex2D,
            },
            layers: vec![],
        })?;

        let pipeline = manager.create_pipeline("default".to_string(), default_pipeline)?;

        manager.create_material("default".to_string(), MaterialDesc {
            pipeline,
            textures: vec![],
            params: vec![
                ("baseColor".to_string(), ParamValue::Vec4([1.0, 1.0, 1.0, 1.0])),
                ("metallic".to_string(), ParamValue::Float(0.0)),
                ("roughness".to_string(), ParamValue::Float(1.0)),
            ],
        })?;

        Ok(manager)
    }

    // ============================================================================
    // FONT
    // ============================================================================

    /// Return the named font, parsing it from disk on first request. A
    /// later call with the same name returns the cached `Arc` without
    /// re-reading the file.
    pub fn font_or_load(&mut self, name: &str, path: &std::path::Path) -> Result<Arc<FontAsset>> {
        if let Some(existing) = self.fonts.get(name) {
            return Ok(Arc::clone(existing));
        }

        let font = Arc::new(FontAsset::from_file(path)?);
        self.fonts.insert(name.to_string(), Arc::clone(&font));
        engine_info!("galaxy3d::ResourceManager", "Loaded Font resource '{}'", name);
        Ok(font)
    }

    pub fn font(&self, name: &str) -> Option<&Arc<FontAsset>> {
        self.fonts.get(name)
    }

    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    pub fn release_font(&mut self, name: &str) -> Result<bool> {
        release_named(&mut self.fonts, "Font", name)
    }

    // ============================================================================
    // TEXTURE
    // ============================================================================

    pub fn create_texture(&mut self, name: String, desc: TextureDesc) -> Result<Arc<Texture>> {
        if self.textures.contains_key(&name) {
            engine_bail!("galaxy3d::ResourceManager", "Texture '{}' already exists", name);
        }
        let texture = Arc::new(Texture::from_desc(desc)?);
        self.textures.insert(name.clone(), Arc::clone(&texture));
        engine_info!("galaxy3d::ResourceManager", "Created Texture resource '{}'", name);
        Ok(texture)
    }

    pub fn texture(&self, name: &str) -> Option<&Arc<Texture>> {
        self.textures.get(name)
    }

    pub fn remove_texture(&mut self, name: &str) -> bool {
        if self.textures.remove(name).is_some() {
            engine_info!("galaxy3d::ResourceManager", "Removed Texture resource '{}'", name);
            true
        } else {
            false
        }
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Return the named texture, decoding and creating it on first request.
    /// A later call with the same name returns the cached `Arc` without
    /// touching the filesystem again.
    pub fn texture_or_load(
        &mut self,
        name: &str,
        graphics_device: Arc<Mutex<dyn graphics_device::GraphicsDevice>>,
        path: &std::path::Path,
    ) -> Result<Arc<Texture>> {
        if let Some(existing) = self.textures.get(name) {
            return Ok(Arc::clone(existing));
        }

        let decoded = loader::decode_image_file(path)?;
        let desc = TextureDesc {
            graphics_device,
            texture: graphics_device::TextureDesc {
                width: decoded.width,
                height: decoded.height,
                format: graphics_device::TextureFormat::R8G8B8A8_UNORM,
                usage: graphics_device::TextureUsage::Sampled,
                array_layers: 1,
                mipmap: graphics_device::MipmapMode::Generate,
                data: Some(graphics_device::TextureData::Single(decoded.rgba)),
                texture_type: graphics_device::TextureType::Tex2D,
            },
            layers: vec![],
        };
        self.create_texture(name.to_string(), desc)
    }

    /// Release the named texture if this call drops its last strong
    /// reference. Returns `Ok(false)` if no texture with that name exists.
    ///
    /// # Errors
    ///
    /// Returns an error if other `Arc<Texture>` clones are still held
    /// elsewhere — releasing would silently leave a dangling GPU resource
    /// behind those references.
    pub fn release_texture(&mut self, name: &str) -> Result<bool> {
        release_named(&mut self.textures, "Texture", name)
    }

    pub fn add_texture_layer(&mut self, texture_name: &str, desc: LayerDesc) -> Result<()> {
        let arc = self.textures.get_mut(texture_name)
            .ok_or_else(|| engine_err!("galaxy3d::ResourceManager", "Texture '{}' not found", texture_name))?;
        let texture = Arc::get_mut(arc)
            .ok_or_else(|| engine_err!("galaxy3d::ResourceManager", "Cannot mutate Texture '{}': other references exist", texture_name))?;
        texture.add_layer(desc)
    }

    pub fn add_texture_region(&mut self, texture_name: &str, layer_name: &str, desc: AtlasRegionDesc) -> Result<()> {
        let arc = self.textures.get_mut(texture_name)
            .ok_or_else(|| engine_err!("galaxy3d::ResourceManager", "Texture '{}' not found", texture_name))?;
        let texture = Arc::get_mut(arc)
            .ok_or_else(|| engine_err!("galaxy3d::ResourceManager", "Cannot mutate Texture '{}': other references exist", texture_name))?;
        texture.add_region(layer_name, desc)
    }

    // ============================================================================
    // GEOMETRY
    // ============================================================================

    pub fn create_geometry(&mut self, name: String, desc: GeometryDesc) -> Result<Arc<Geometry>> {
        if self.geometries.contains_key(&name) {
            engine_bail!("galaxy3d::ResourceManager", "Geometry '{}' already exists", name);
        }
        let geometry = Arc::new(Geometry::from_desc(desc)?);
        self.geometries.insert(name.clone(), Arc::clone(&geometry));
        engine_info!("galaxy3d::ResourceManager", "Created Geometry resource '{}'", name);
        Ok(geometry)
    }

    pub fn geometry(&self, name: &str) -> Option<&Arc<Geometry>> {
        self.geometries.get(name)
    }

    pub fn remove_geometry(&mut self, name: &str) -> bool {
        if self.geometries.remove(name).is_some() {
            engine_info!("galaxy3d::ResourceManager", "Removed Geometry resource '{}'", name);
            true
        } else {
            false
        }
    }

    pub fn release_geometry(&mut self, name: &str) -> Result<bool> {
        release_named(&mut self.geometries, "Geometry", name)
    }

    pub fn geometry_count(&self) -> usize {
        self.geometries.len()
    }

    pub fn add_geometry_mesh(&mut self, geometry_name: &str, desc: GeometryMeshDesc) -> Result<usize> {
        let arc = self.geometries.get_mut(geometry_name)
            .ok_or_else(|| engine_err!("galaxy3d::ResourceManager", "Geometry '{}' not found", geometry_name))?;
        let geometry = Arc::get_mut(arc)
            .ok_or_else(|| engine_err!("galaxy3d::ResourceManager", "Cannot mutate Geometry '{}': other references exist", geometry_name))?;
        geometry.add_mesh(desc)
    }

    pub fn add_geometry_lod(&mut self, geometry_name: &str, mesh_id: usize, desc: GeometryLODDesc) -> Result<usize> {
        let arc = self.geometries.get_mut(geometry_name)
            .ok_or_else(|| engine_err!("galaxy3d::ResourceManager", "Geometry '{}' not found", geometry_name))?;
        let geometry = Arc::get_mut(arc)
            .ok_or_else(|| engine_err!("galaxy3d::ResourceManager", "Cannot mutate Geometry '{}': other references exist", geometry_name))?;
        geometry.add_lod(mesh_id, desc)
    }

    pub fn add_geometry_submesh(
        &mut self,
        geometry_name: &str,
        mesh_id: usize,
        lod_index: usize,
        desc: GeometrySubMeshDesc,
    ) -> Result<usize> {
        let arc = self.geometries.get_mut(geometry_name)
            .ok_or_else(|| engine_err!("galaxy3d::ResourceManager", "Geometry '{}' not found", geometry_name))?;
        let geometry = Arc::get_mut(arc)
            .ok_or_else(|| engine_err!("galaxy3d::ResourceManager", "Cannot mutate Geometry '{}': other references exist", geometry_name))?;
        geometry.add_submesh(mesh_id, lod_index, desc)
    }

    // ============================================================================
    // PIPELINE
    // ============================================================================

    pub fn create_pipeline(&mut self, name: String, desc: PipelineDesc) -> Result<Arc<Pipeline>> {
        if self.pipelines.contains_key(&name) {
            engine_bail!("galaxy3d::ResourceManager", "Pipeline '{}' already exists", name);
        }
        let pipeline = Arc::new(Pipeline::from_desc(desc)?);
        self.pipelines.insert(name.clone(), Arc::clone(&pipeline));
        engine_info!("galaxy3d::ResourceManager", "Created Pipeline resource '{}'", name);
        Ok(pipeline)
    }

    pub fn pipeline(&self, name: &str) -> Option<&Arc<Pipeline>> {
        self.pipelines.get(name)
    }

    pub fn remove_pipeline(&mut self, name: &str) -> bool {
        if self.pipelines.remove(name).is_some() {
            engine_info!("galaxy3d::ResourceManager", "Removed Pipeline resource '{}'", name);
            true
        } else {
            false
        }
    }

    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    pub fn release_pipeline(&mut self, name: &str) -> Result<bool> {
        release_named(&mut self.pipelines, "Pipeline", name)
    }

    pub fn add_pipeline_variant(&mut self, pipeline_name: &str, desc: PipelineVariantDesc) -> Result<u32> {
        let arc = self.pipelines.get_mut(pipeline_name)
            .ok_or_else(|| engine_err!("galaxy3d::ResourceManager", "Pipeline '{}' not found", pipeline_name))?;
        let pipeline = Arc::get_mut(arc)
            .ok_or_else(|| engine_err!("galaxy3d::ResourceManager", "Cannot mutate Pipeline '{}': other references exist", pipeline_name))?;
        pipeline.add_variant(desc)
    }

    // ============================================================================
    // MATERIAL
    // ============================================================================

    pub fn create_material(&mut self, name: String, desc: MaterialDesc) -> Result<Arc<Material>> {
        if self.materials.contains_key(&name) {
            engine_bail!("galaxy3d::ResourceManager", "Material '{}' already exists", name);
        }

        let slot_id = self.material_slots.alloc();
        let material = match Material::from_desc(slot_id, desc) {
            Ok(material) => material,
            Err(err) => {
                self.material_slots.free(slot_id);
                return Err(err);
            }
        };

        let material = Arc::new(material);
        self.materials.insert(name.clone(), Arc::clone(&material));
        engine_info!("galaxy3d::ResourceManager", "Created Material resource '{}' (slot {})", name, slot_id);
        Ok(material)
    }

    pub fn material(&self, name: &str) -> Option<&Arc<Material>> {
        self.materials.get(name)
    }

    pub fn remove_material(&mut self, name: &str) -> bool {
        if let Some(material) = self.materials.remove(name) {
            self.material_slots.free(material.slot_id());
            engine_info!("galaxy3d::ResourceManager", "Removed Material resource '{}'", name);
            true
        } else {
            false
        }
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    /// Release the named material if this call drops its last strong
    /// reference, freeing its material slot back to the allocator.
    pub fn release_material(&mut self, name: &str) -> Result<bool> {
        match self.materials.get(name) {
            Some(arc) if Arc::strong_count(arc) > 1 => {
                engine_bail!("galaxy3d::ResourceManager",
                    "Cannot release Material '{}': {} outstanding reference(s)",
                    name, Arc::strong_count(arc) - 1);
            }
            Some(_) => {
                let material = self.materials.remove(name).unwrap();
                self.material_slots.free(material.slot_id());
                engine_info!("galaxy3d::ResourceManager", "Released Material resource '{}'", name);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// One past the highest material slot id ever handed out. Never shrinks.
    pub fn material_slot_high_water_mark(&self) -> u32 {
        self.material_slots.high_water_mark()
    }

    /// Number of material slots currently occupied (== material_count()).
    pub fn material_slot_count(&self) -> usize {
        self.material_slots.len() as usize
    }

    // ============================================================================
    // MESH
    // ============================================================================

    pub fn create_mesh(&mut self, name: String, desc: MeshDesc) -> Result<Arc<Mesh>> {
        if self.meshes.contains_key(&name) {
            engine_bail!("galaxy3d::ResourceManager", "Mesh '{}' already exists", name);
        }
        let mesh = Arc::new(Mesh::from_desc(desc)?);
        self.meshes.insert(name.clone(), Arc::clone(&mesh));
        engine_info!("galaxy3d::ResourceManager", "Created Mesh resource '{}'", name);
        Ok(mesh)
    }

    pub fn mesh(&self, name: &str) -> Option<&Arc<Mesh>> {
        self.meshes.get(name)
    }

    pub fn remove_mesh(&mut self, name: &str) -> bool {
        if self.meshes.remove(name).is_some() {
            engine_info!("galaxy3d::ResourceManager", "Removed Mesh resource '{}'", name);
            true
        } else {
            false
        }
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn release_mesh(&mut self, name: &str) -> Result<bool> {
        release_named(&mut self.meshes, "Mesh", name)
    }

    // ============================================================================
    // BUFFER
    // ============================================================================

    pub fn create_buffer(&mut self, name: String, desc: BufferDesc) -> Result<Arc<Buffer>> {
        if self.buffers.contains_key(&name) {
            engine_bail!("galaxy3d::ResourceManager", "Buffer '{}' already exists", name);
        }
        let buffer = Arc::new(Buffer::from_desc(desc)?);
        self.buffers.insert(name.clone(), Arc::clone(&buffer));
        engine_info!("galaxy3d::ResourceManager", "Created Buffer resource '{}'", name);
        Ok(buffer)
    }

    pub fn buffer(&self, name: &str) -> Option<&Arc<Buffer>> {
        self.buffers.get(name)
    }

    pub fn remove_buffer(&mut self, name: &str) -> bool {
        if self.buffers.remove(name).is_some() {
            engine_info!("galaxy3d::ResourceManager", "Removed Buffer resource '{}'", name);
            true
        } else {
            false
        }
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn release_buffer(&mut self, name: &str) -> Result<bool> {
        release_named(&mut self.buffers, "Buffer", name)
    }

    /// Create the engine's standard per-material storage buffer layout
    /// (the fields every built-in PBR shader expects to find at a material's
    /// slot index) and populate every slot with sane defaults.
    pub fn create_default_material_buffer(
        &mut self,
        name: String,
        graphics_device: Arc<Mutex<dyn graphics_device::GraphicsDevice>>,
        count: u32,
    ) -> Result<Arc<Buffer>> {
        let fields = vec![
            FieldDesc { name: "baseColor".to_string(), field_type: FieldType::Vec4 },
            FieldDesc { name: "emissiveColor".to_string(), field_type: FieldType::Vec4 },
            FieldDesc { name: "metallic".to_string(), field_type: FieldType::Float },
            FieldDesc { name: "roughness".to_string(), field_type: FieldType::Float },
            FieldDesc { name: "normalScale".to_string(), field_type: FieldType::Float },
            FieldDesc { name: "ao".to_string(), field_type: FieldType::Float },
            FieldDesc { name: "alphaCutoff".to_string(), field_type: FieldType::Float },
            FieldDesc { name: "ior".to_string(), field_type: FieldType::Float },
            FieldDesc { name: "albedoTexture".to_string(), field_type: FieldType::UInt },
            FieldDesc { name: "normalTexture".to_string(), field_type: FieldType::UInt },
            FieldDesc { name: "metallicRoughnessTexture".to_string(), field_type: FieldType::UInt },
            FieldDesc { name: "emissiveTexture".to_string(), field_type: FieldType::UInt },
            FieldDesc { name: "aoTexture".to_string(), field_type: FieldType::UInt },
            FieldDesc { name: "flags".to_string(), field_type: FieldType::UInt },
        ];

        let buffer = self.create_buffer(name, BufferDesc {
            graphics_device,
            kind: BufferKind::Storage,
            fields,
            count,
        })?;

        const NO_TEXTURE: u32 = u32::MAX;

        for index in 0..count {
            buffer.update_field(index, buffer.field_id("baseColor").unwrap(), &param_to_padded_bytes(&ParamValue::Vec4([1.0, 1.0, 1.0, 1.0])))?;
            buffer.update_field(index, buffer.field_id("emissiveColor").unwrap(), &param_to_padded_bytes(&ParamValue::Vec4([0.0, 0.0, 0.0, 0.0])))?;
            buffer.update_field(index, buffer.field_id("metallic").unwrap(), &0.0f32.to_ne_bytes())?;
            buffer.update_field(index, buffer.field_id("roughness").unwrap(), &1.0f32.to_ne_bytes())?;
            buffer.update_field(index, buffer.field_id("normalScale").unwrap(), &1.0f32.to_ne_bytes())?;
            buffer.update_field(index, buffer.field_id("ao").unwrap(), &1.0f32.to_ne_bytes())?;
            buffer.update_field(index, buffer.field_id("alphaCutoff").unwrap(), &0.0f32.to_ne_bytes())?;
            buffer.update_field(index, buffer.field_id("ior").unwrap(), &1.5f32.to_ne_bytes())?;
            buffer.update_field(index, buffer.field_id("albedoTexture").unwrap(), &NO_TEXTURE.to_ne_bytes())?;
            buffer.update_field(index, buffer.field_id("normalTexture").unwrap(), &NO_TEXTURE.to_ne_bytes())?;
            buffer.update_field(index, buffer.field_id("metallicRoughnessTexture").unwrap(), &NO_TEXTURE.to_ne_bytes())?;
            buffer.update_field(index, buffer.field_id("emissiveTexture").unwrap(), &NO_TEXTURE.to_ne_bytes())?;
            buffer.update_field(index, buffer.field_id("aoTexture").unwrap(), &NO_TEXTURE.to_ne_bytes())?;
            buffer.update_field(index, buffer.field_id("flags").unwrap(), &0u32.to_ne_bytes())?;
        }

        Ok(buffer)
    }

    /// Write every material's params and texture slots into `buffer`, keyed by
    /// each material's `slot_id`.
    ///
    /// This is best-effort: a material whose slot exceeds the buffer's
    /// element count, or a param/texture slot with no matching (or
    /// type-compatible) field in `buffer`, is silently skipped rather than
    /// failing the whole sync. Shader-facing buffer layouts evolve
    /// independently of material authoring, so partial coverage is normal.
    pub fn sync_materials_to_buffer(&self, buffer: &Arc<Buffer>) -> Result<()> {
        for material in self.materials.values() {
            let slot = material.slot_id();
            if slot >= buffer.count() {
                engine_info!("galaxy3d::ResourceManager",
                    "Material slot {} exceeds buffer element count {}, skipping sync", slot, buffer.count());
                continue;
            }

            for param in material.params() {
                let Some(field_id) = buffer.field_id(param.name()) else {
                    continue;
                };
                if buffer.fields()[field_id].field_type != compatible_field_type(param.value()) {
                    continue;
                }
                let bytes = param_to_padded_bytes(param.value());
                buffer.update_field(slot, field_id, &bytes)?;
            }

            for texture_slot in material.texture_slots() {
                let Some(field_id) = buffer.field_id(texture_slot.name()) else {
                    continue;
                };
                if buffer.fields()[field_id].field_type != FieldType::UInt {
                    continue;
                }
                let value: u32 = texture_slot.layer().unwrap_or(0);
                buffer.update_field(slot, field_id, &value.to_ne_bytes())?;
            }
        }

        Ok(())
    }
}

/// Remove a named resource from `map`, but only once this call drops its
/// last strong reference. Shared by every `release_*` entry point so the
/// "outstanding reference" error message stays consistent across resource
/// kinds.
fn release_named<T>(map: &mut HashMap<String, Arc<T>>, kind: &str, name: &str) -> Result<bool> {
    match map.get(name) {
        Some(arc) if Arc::strong_count(arc) > 1 => {
            engine_bail!("galaxy3d::ResourceManager",
                "Cannot release {} '{}': {} outstanding reference(s)",
                kind, name, Arc::strong_count(arc) - 1);
        }
        Some(_) => {
            map.remove(name);
            engine_info!("galaxy3d::ResourceManager", "Released {} resource '{}'", kind, name);
            Ok(true)
        }
        None => Ok(false),
    }
}

/// The buffer FieldType a material ParamValue would need to be written into.
fn compatible_field_type(value: &ParamValue) -> FieldType {
    match value {
        ParamValue::Float(_) => FieldType::Float,
        ParamValue::Vec2(_) => FieldType::Vec2,
        ParamValue::Vec3(_) => FieldType::Vec3,
        ParamValue::Vec4(_) => FieldType::Vec4,
        ParamValue::Int(_) => FieldType::Int,
        ParamValue::UInt(_) => FieldType::UInt,
        ParamValue::Bool(_) => FieldType::UInt,
        ParamValue::Mat3(_) => FieldType::Mat3,
        ParamValue::Mat4(_) => FieldType::Mat4,
    }
}

/// Raw bytes for a param value, padded to match std140/std430 field sizes.
///
/// Vec3 and Mat3 need 4 bytes of trailing padding per row; every other
/// variant's native byte representation already matches its FieldType size.
fn param_to_padded_bytes(value: &ParamValue) -> Vec<u8> {
    match value {
        ParamValue::Vec3(v) => {
            let mut bytes = Vec::with_capacity(16);
            bytes.extend_from_slice(&v[0].to_ne_bytes());
            bytes.extend_from_slice(&v[1].to_ne_bytes());
            bytes.extend_from_slice(&v[2].to_ne_bytes());
            bytes.extend_from_slice(&[0u8; 4]);
            bytes
        }
        ParamValue::Mat3(rows) => {
            let mut bytes = Vec::with_capacity(48);
            for row in rows {
                for f in row {
                    bytes.extend_from_slice(&f.to_ne_bytes());
                }
                bytes.extend_from_slice(&[0u8; 4]);
            }
            bytes
        }
        other => other.as_bytes(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "resource_manager_tests.rs"]
mod tests;
