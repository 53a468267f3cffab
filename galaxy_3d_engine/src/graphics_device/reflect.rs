/// SPIR-V shader reflection
///
/// Pipelines are built from raw SPIR-V bytecode; Galaxy3D never hand-declares
/// descriptor set layouts or vertex attribute bindings. Instead, at pipeline
/// creation time every shader stage's SPIR-V module is introspected with
/// `spirq` to recover the set of uniform/storage/sampler bindings, vertex
/// input locations, and push constant ranges the shader actually uses. The
/// result is stored alongside the pipeline and consulted later (by Material,
/// by Scene) to build matching BindingGroups without the caller ever naming
/// a `set`/`binding` number by hand.
///
/// This is the single place that walks SPIR-V reflection data; backends only
/// turn the result into their own descriptor-set-layout/pipeline-layout
/// objects, they never re-derive bindings from bytecode themselves.

use std::collections::{BTreeMap, HashSet};
use spirq::prelude::*;
use crate::error::{Error, Result};
use crate::graphics_device::binding_group::BindingType;
use crate::graphics_device::shader::ShaderStage;

/// Vertex attributes whose name carries this prefix are assumed to come from
/// a per-instance vertex buffer (binding 1) rather than the per-vertex one
/// (binding 0) — the same convention the scene's instanced draw path uses
/// when laying out its instance buffers.
const INSTANCE_ATTRIBUTE_PREFIX: &str = "i_";

/// Set/binding Galaxy3D reserves for the bindless texture table.
const BINDLESS_TABLE_SET: u32 = 1;
const BINDLESS_TABLE_BINDING: u32 = 10;

/// Reflected descriptor binding (uniform buffer, storage buffer, storage
/// image, combined image sampler, or input attachment)
#[derive(Debug, Clone)]
pub struct BindingReflection {
    pub set: u32,
    pub binding: u32,
    pub name: String,
    pub binding_type: BindingType,
    pub count: u32,
}

/// Reflected vertex shader input, grouped onto a vertex buffer binding with
/// its byte offset already resolved within that binding's stride.
#[derive(Debug, Clone)]
pub struct VertexAttributeReflection {
    pub location: u32,
    pub name: String,
    /// Vertex buffer binding this attribute is read from (0 = per-vertex, 1 = per-instance)
    pub binding: u32,
    /// Byte offset within `binding`'s vertex stride
    pub offset: u32,
    /// Size in bytes of this attribute's type
    pub size: u32,
}

/// Reflected push constant range
#[derive(Debug, Clone)]
pub struct PushConstantReflection {
    pub offset: u32,
    pub size: u32,
    pub name: String,
}

/// Aggregated reflection data for every stage of a pipeline
#[derive(Debug, Clone, Default)]
pub struct PipelineReflection {
    bindings: Vec<BindingReflection>,
    vertex_attributes: Vec<VertexAttributeReflection>,
    push_constants: Vec<PushConstantReflection>,
    has_bindless_table: bool,
    compute_local_size: Option<(u32, u32, u32)>,
}

impl PipelineReflection {
    /// Reflection data for a pipeline with no shader stages (used by mocks/tests)
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    pub fn binding(&self, index: usize) -> Option<&BindingReflection> {
        self.bindings.get(index)
    }

    pub fn bindings(&self) -> &[BindingReflection] {
        &self.bindings
    }

    pub fn vertex_attribute_count(&self) -> usize {
        self.vertex_attributes.len()
    }

    pub fn vertex_attribute(&self, index: usize) -> Option<&VertexAttributeReflection> {
        self.vertex_attributes.get(index)
    }

    pub fn vertex_attributes(&self) -> &[VertexAttributeReflection] {
        &self.vertex_attributes
    }

    /// Total byte stride of `binding` (the sum of every attribute assigned to it).
    pub fn vertex_binding_stride(&self, binding: u32) -> u32 {
        self.vertex_attributes.iter()
            .filter(|a| a.binding == binding)
            .map(|a| a.size)
            .sum()
    }

    pub fn push_constant_count(&self) -> usize {
        self.push_constants.len()
    }

    pub fn push_constant(&self, index: usize) -> Option<&PushConstantReflection> {
        self.push_constants.get(index)
    }

    /// `true` if this pipeline declares a binding at the reserved bindless
    /// texture table slot (set 1, binding 10).
    pub fn has_bindless_table(&self) -> bool {
        self.has_bindless_table
    }

    /// Local workgroup size (`local_size_x/y/z`) for a compute pipeline, if any.
    pub fn compute_local_size(&self) -> Option<(u32, u32, u32)> {
        self.compute_local_size
    }
}

/// Reflect every shader stage's SPIR-V bytecode and merge the results into a
/// single `PipelineReflection`.
///
/// Descriptor bindings that appear in more than one stage (e.g. a uniform
/// buffer read by both the vertex and fragment shader) are merged into a
/// single entry keyed by (set, binding). Push constants are merged by name,
/// with real offsets computed by packing each distinct block back-to-back
/// and rounding up to 4-byte alignment, since shared blocks are declared
/// independently (and at offset 0) in each stage's own module.
pub fn reflect_spirv(stages: &[(ShaderStage, &[u8])]) -> Result<PipelineReflection> {
    let mut bindings: BTreeMap<(u32, u32), BindingReflection> = BTreeMap::new();
    let mut vertex_attributes = Vec::new();
    let mut push_constants = Vec::new();
    let mut push_constant_names = HashSet::new();
    let mut next_push_constant_offset = 0u32;
    let mut compute_local_size = None;

    for (stage, code) in stages {
        let entry_points = ReflectConfig::new()
            .spv(*code)
            .ref_all_rscs(true)
            .reflect()
            .map_err(|e| Error::ReflectionFailed(format!("spirq reflection failed: {}", e)))?;

        if *stage == ShaderStage::Compute {
            compute_local_size = compute_local_size.or_else(|| local_size_from_module(code));
        }

        for entry in entry_points {
            for var in entry.vars {
                match var {
                    Variable::Descriptor { name, desc_bind, desc_ty, nbind, .. } => {
                        let binding_type = match desc_ty {
                            DescriptorType::UniformBuffer(..) => BindingType::UniformBuffer,
                            DescriptorType::StorageBuffer(..) => BindingType::StorageBuffer,
                            DescriptorType::CombinedImageSampler(..) => BindingType::CombinedImageSampler,
                            DescriptorType::StorageImage(..) => BindingType::StorageImage,
                            DescriptorType::InputAttachment(..) => BindingType::InputAttachment,
                            _ => continue,
                        };
                        let key = (desc_bind.set(), desc_bind.bind());
                        bindings.entry(key).or_insert(BindingReflection {
                            set: desc_bind.set(),
                            binding: desc_bind.bind(),
                            name: name.unwrap_or_default(),
                            binding_type,
                            count: nbind.max(1),
                        });
                    }
                    Variable::Input { name, location, ty, .. } if *stage == ShaderStage::Vertex => {
                        let name = name.unwrap_or_default();
                        let binding = if name.starts_with(INSTANCE_ATTRIBUTE_PREFIX) { 1 } else { 0 };
                        vertex_attributes.push(VertexAttributeReflection {
                            location: location.loc(),
                            name,
                            binding,
                            offset: 0, // resolved below, once every attribute of the stage is known
                            size: ty.nbyte().unwrap_or(0) as u32,
                        });
                    }
                    Variable::PushConstant { name, ty, .. } => {
                        let name = name.unwrap_or_default();
                        if push_constant_names.insert(name.clone()) {
                            let size = ty.nbyte().unwrap_or(0) as u32;
                            push_constants.push(PushConstantReflection {
                                offset: next_push_constant_offset,
                                size,
                                name,
                            });
                            next_push_constant_offset += (size + 3) & !3;
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    // Stable order within each binding (location ascending), then pack each
    // binding's attributes back-to-back to get per-binding byte offsets.
    vertex_attributes.sort_by_key(|a| (a.binding, a.location));
    let mut binding_cursor: BTreeMap<u32, u32> = BTreeMap::new();
    for attr in &mut vertex_attributes {
        let cursor = binding_cursor.entry(attr.binding).or_insert(0);
        attr.offset = *cursor;
        *cursor += attr.size;
    }

    let has_bindless_table = bindings.keys()
        .any(|&(set, binding)| set == BINDLESS_TABLE_SET && binding == BINDLESS_TABLE_BINDING);

    Ok(PipelineReflection {
        bindings: bindings.into_values().collect(),
        vertex_attributes,
        push_constants,
        has_bindless_table,
        compute_local_size,
    })
}

/// SPIR-V opcode/execution-mode numbers from the spec (section 3.32.1/3.22).
const OP_EXECUTION_MODE: u32 = 16;
const EXECUTION_MODE_LOCAL_SIZE: u32 = 17;

/// Read `OpExecutionMode %entry LocalSize x y z` straight off the module's
/// word stream. spirq's variable/resource reflection doesn't surface
/// execution modes, so workgroup size is recovered from the raw binary
/// instead of asking spirq for something it doesn't expose.
fn local_size_from_module(code: &[u8]) -> Option<(u32, u32, u32)> {
    if code.len() % 4 != 0 || code.len() < 20 {
        return None;
    }
    let word_count = code.len() / 4;
    let word = |i: usize| -> u32 {
        u32::from_le_bytes([code[i * 4], code[i * 4 + 1], code[i * 4 + 2], code[i * 4 + 3]])
    };

    let mut i = 5; // skip the fixed 5-word module header
    while i < word_count {
        let first = word(i);
        let instr_words = (first >> 16) as usize;
        let opcode = first & 0xffff;
        if instr_words == 0 || i + instr_words > word_count {
            break;
        }
        if opcode == OP_EXECUTION_MODE && instr_words >= 6 && word(i + 2) == EXECUTION_MODE_LOCAL_SIZE {
            return Some((word(i + 3), word(i + 4), word(i + 5)));
        }
        i += instr_words;
    }
    None
}

#[cfg(test)]
#[path = "reflect_tests.rs"]
mod tests;
