//! Resource-level mesh type: binds Materials to a Geometry's submeshes.
//!
//! A `Geometry` describes shape (vertex/index buffers, LODs, submeshes). A
//! `Mesh` selects one `GeometryMesh` within a `Geometry` and assigns a
//! `Material` to every submesh of every LOD, producing a renderable entity.
//! Multiple `Mesh`es can reference the same `GeometryMesh` with different
//! material sets (e.g. "hero_default_skin" and "hero_golden_skin").
//!
//! # Hierarchy
//!
//! ```text
//! Mesh
//! ├── geometry (shared Geometry resource)
//! ├── geometry_mesh_id (which GeometryMesh within it)
//! └── lods[0..N] → MeshLOD
//!     └── submeshes[0..M] → SubMesh
//!         └── material: Arc<Material>
//! ```
//!
//! Every LOD and every submesh of the referenced `GeometryMesh` must be
//! covered exactly once; a `Mesh` cannot omit or duplicate coverage.

use rustc_hash::FxHashMap;
use std::sync::Arc;
use crate::error::Result;
use crate::{engine_bail, engine_err};
use crate::resource::geometry::{Geometry, GeometryMesh};
use crate::resource::material::Material;

// ============================================================================
// REFERENCE TYPES
// ============================================================================

/// Reference to a `GeometryMesh` within a `Geometry`, by name or index.
pub enum GeometryMeshRef {
    Index(usize),
    Name(String),
}

/// Reference to a `GeometrySubMesh` within a `GeometryLOD`, by name or index.
pub enum GeometrySubMeshRef {
    Index(usize),
    Name(String),
}

// ============================================================================
// SUBMESH
// ============================================================================

/// A submesh with its assigned material.
pub struct SubMesh {
    submesh_id: usize,
    material: Arc<Material>,
}

impl SubMesh {
    /// Get the id (index) of the underlying GeometrySubMesh
    pub fn submesh_id(&self) -> usize {
        self.submesh_id
    }

    /// Get the assigned material
    pub fn material(&self) -> &Arc<Material> {
        &self.material
    }
}

// ============================================================================
// MESH LOD
// ============================================================================

/// A level of detail, holding one material-assigned submesh per
/// GeometrySubMesh in the corresponding GeometryLOD.
pub struct MeshLOD {
    /// Submeshes stored by id (matches GeometryLOD submesh ids)
    submeshes: Vec<SubMesh>,
}

impl MeshLOD {
    /// Get a submesh by id (index)
    pub fn submesh(&self, id: usize) -> Option<&SubMesh> {
        self.submeshes.get(id)
    }

    /// Get the number of submeshes
    pub fn submesh_count(&self) -> usize {
        self.submeshes.len()
    }
}

// ============================================================================
// MESH
// ============================================================================

/// A renderable mesh: a GeometryMesh with materials assigned to every
/// submesh of every LOD.
pub struct Mesh {
    /// The Geometry resource this mesh draws from
    geometry: Arc<Geometry>,

    /// Id of the GeometryMesh within `geometry`
    geometry_mesh_id: usize,

    /// LODs stored by index (matches GeometryMesh LOD indices)
    lods: Vec<MeshLOD>,
}

impl Mesh {
    /// Create a Mesh from a descriptor
    ///
    /// Resolves the GeometryMesh and GeometrySubMesh references, validates
    /// that every LOD and every submesh is covered exactly once, and
    /// reorders submeshes to match the GeometryLOD's canonical ordering.
    pub(crate) fn from_desc(desc: MeshDesc) -> Result<Self> {
        let geometry_mesh_id = resolve_geometry_mesh_ref(&desc.geometry, &desc.geometry_mesh)?;
        let geometry_mesh = desc.geometry.mesh(geometry_mesh_id)
            .expect("geometry_mesh_id was just resolved against this geometry");

        let expected_lod_count = geometry_mesh.lod_count();
        let mut lods: Vec<Option<MeshLOD>> = (0..expected_lod_count).map(|_| None).collect();

        for lod_desc in desc.lods {
            if lod_desc.lod_index >= expected_lod_count {
                engine_bail!("galaxy3d::Mesh", "LOD index {} out of range (GeometryMesh has {} LODs)",
                    lod_desc.lod_index, expected_lod_count);
            }

            if lods[lod_desc.lod_index].is_some() {
                engine_bail!("galaxy3d::Mesh", "Duplicate LOD index {}", lod_desc.lod_index);
            }

            let geometry_lod = geometry_mesh.lod(lod_desc.lod_index)
                .expect("lod_index validated above");

            let expected_submesh_count = geometry_lod.submesh_count();
            let mut submeshes: Vec<Option<SubMesh>> = (0..expected_submesh_count).map(|_| None).collect();

            for submesh_desc in lod_desc.submeshes {
                let submesh_id = match submesh_desc.submesh {
                    GeometrySubMeshRef::Index(i) => {
                        if geometry_lod.submesh(i).is_none() {
                            engine_bail!("galaxy3d::Mesh", "GeometrySubMesh index {} not found in LOD {}",
                                i, lod_desc.lod_index);
                        }
                        i
                    }
                    GeometrySubMeshRef::Name(ref name) => {
                        geometry_lod.submesh_id(name)
                            .ok_or_else(|| engine_err!("galaxy3d::Mesh",
                                "GeometrySubMesh '{}' not found in LOD {}", name, lod_desc.lod_index))?
                    }
                };

                if submeshes[submesh_id].is_some() {
                    engine_bail!("galaxy3d::Mesh", "Duplicate submesh id {} in LOD {}",
                        submesh_id, lod_desc.lod_index);
                }

                submeshes[submesh_id] = Some(SubMesh { submesh_id, material: submesh_desc.material });
            }

            if submeshes.iter().any(Option::is_none) {
                engine_bail!("galaxy3d::Mesh", "Incomplete submesh coverage in LOD {}: expected {} submeshes",
                    lod_desc.lod_index, expected_submesh_count);
            }

            lods[lod_desc.lod_index] = Some(MeshLOD {
                submeshes: submeshes.into_iter().map(Option::unwrap).collect(),
            });
        }

        if lods.iter().any(Option::is_none) {
            engine_bail!("galaxy3d::Mesh", "Incomplete LOD coverage: expected {} LODs", expected_lod_count);
        }

        Ok(Self {
            geometry: desc.geometry,
            geometry_mesh_id,
            lods: lods.into_iter().map(Option::unwrap).collect(),
        })
    }

    // ===== ACCESSORS =====

    /// Get the underlying Geometry resource
    pub fn geometry(&self) -> &Arc<Geometry> {
        &self.geometry
    }

    /// Get the id of the GeometryMesh within `geometry()`
    pub fn geometry_mesh_id(&self) -> usize {
        self.geometry_mesh_id
    }

    /// Get the underlying GeometryMesh
    pub fn geometry_mesh(&self) -> &GeometryMesh {
        self.geometry.mesh(self.geometry_mesh_id)
            .expect("geometry_mesh_id is always valid for the lifetime of this Mesh")
    }

    /// Get the number of LODs
    pub fn lod_count(&self) -> usize {
        self.lods.len()
    }

    /// Get a LOD by index (0 = most detailed)
    pub fn lod(&self, index: usize) -> Option<&MeshLOD> {
        self.lods.get(index)
    }
}

/// Resolve a GeometryMeshRef against a Geometry, validating it exists.
fn resolve_geometry_mesh_ref(geometry: &Arc<Geometry>, geometry_mesh: &GeometryMeshRef) -> Result<usize> {
    match geometry_mesh {
        GeometryMeshRef::Index(i) => {
            if geometry.mesh(*i).is_none() {
                engine_bail!("galaxy3d::Mesh", "GeometryMesh index {} not found", i);
            }
            Ok(*i)
        }
        GeometryMeshRef::Name(name) => {
            geometry.mesh_id(name)
                .ok_or_else(|| engine_err!("galaxy3d::Mesh", "GeometryMesh '{}' not found", name))
        }
    }
}

// ============================================================================
// DESCRIPTORS
// ============================================================================

/// Descriptor for a material-assigned submesh
pub struct SubMeshDesc {
    /// Which GeometrySubMesh to assign a material to
    pub submesh: GeometrySubMeshRef,
    /// Material for this submesh
    pub material: Arc<Material>,
}

/// Descriptor for a material-assigned LOD
pub struct MeshLODDesc {
    /// Which GeometryLOD this covers (must match a LOD of the referenced GeometryMesh)
    pub lod_index: usize,
    /// Material assignment for every submesh in this LOD
    pub submeshes: Vec<SubMeshDesc>,
}

/// Descriptor for creating a Mesh
pub struct MeshDesc {
    /// Geometry resource to draw from
    pub geometry: Arc<Geometry>,
    /// Which GeometryMesh within `geometry` this Mesh renders
    pub geometry_mesh: GeometryMeshRef,
    /// Material assignment for every LOD of the referenced GeometryMesh
    pub lods: Vec<MeshLODDesc>,
}

// ============================================================================
// HELPERS
// ============================================================================

/// Build a MeshDesc by assigning materials to submeshes purely by name.
///
/// Looks up every submesh name across every LOD of the referenced
/// GeometryMesh in `mapping`, failing if any name has no entry. Convenient
/// when a single named material set (e.g. loaded from a material library)
/// applies uniformly across all LODs.
pub fn mesh_desc_from_name_mapping(
    geometry: &Arc<Geometry>,
    geometry_mesh: GeometryMeshRef,
    mapping: &FxHashMap<String, Arc<Material>>,
) -> Result<MeshDesc> {
    let geometry_mesh_id = resolve_geometry_mesh_ref(geometry, &geometry_mesh)?;
    let gmesh = geometry.mesh(geometry_mesh_id)
        .expect("geometry_mesh_id was just resolved against this geometry");

    let mut lods = Vec::with_capacity(gmesh.lod_count());

    for lod_index in 0..gmesh.lod_count() {
        let glod = gmesh.lod(lod_index).expect("lod_index within range");
        let mut submeshes = Vec::with_capacity(glod.submesh_count());

        for (name, _submesh) in glod.submeshes() {
            let material = mapping.get(name)
                .ok_or_else(|| engine_err!("galaxy3d::Mesh",
                    "No material provided for submesh '{}' in LOD {}", name, lod_index))?;

            submeshes.push(SubMeshDesc {
                submesh: GeometrySubMeshRef::Name(name.to_string()),
                material: material.clone(),
            });
        }

        lods.push(MeshLODDesc { lod_index, submeshes });
    }

    Ok(MeshDesc {
        geometry: geometry.clone(),
        geometry_mesh: GeometryMeshRef::Index(geometry_mesh_id),
        lods,
    })
}

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod tests;
