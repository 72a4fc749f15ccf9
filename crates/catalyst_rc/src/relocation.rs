//! Mapping from a node's local material slots to indices in the group's material file.

use catalyst_assets::{
    MaterialGroup, NodeIndex, SceneGraph,
    cgf::{CgfContent, Mesh, MeshSubset},
};
use catalyst_core::{PHYSICS_NO_DRAW, PhysicalizeType, ProcessingResult, ProcessingResultCombiner};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RelocationError {
    #[error("Material '{0}' reserved for physics proxies is missing from the material file")]
    MissingPhysicsMaterial(String),

    #[error("Materials not found in the material file: {}", .0.join(", "))]
    MissingMaterials(Vec<String>),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PaddingError {
    #[error("Materials addition order broken, subset {position} has material {found}")]
    BrokenOrder { position: usize, found: usize },
}

/// Entry `i` is the material-file index of the node's `i`-th material slot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelocationTable(Vec<usize>);

impl RelocationTable {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<usize> {
        self.0.get(slot).copied()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Builds the table for one scene node.
    ///
    /// Default proxies always map their single slot to the no-draw material. Other nodes map
    /// their material end points in stored order; every missing name is reported before the
    /// table is rejected.
    pub fn build(
        materials: &MaterialGroup,
        graph: &SceneGraph,
        node: NodeIndex,
        physicalize_type: PhysicalizeType,
    ) -> Result<Self, RelocationError> {
        if physicalize_type.is_default_proxy() {
            return match materials.find_material_index(PHYSICS_NO_DRAW) {
                Some(index) => Ok(Self(vec![index])),
                None => {
                    log::error!("Unable to find physics material '{PHYSICS_NO_DRAW}'");
                    Err(RelocationError::MissingPhysicsMaterial(PHYSICS_NO_DRAW.to_string()))
                }
            };
        }

        let mut combiner = ProcessingResultCombiner::new();
        let mut table = Vec::new();
        let mut missing = Vec::new();

        for (name, _) in graph.material_children(node) {
            match materials.find_material_index(name) {
                Some(index) => {
                    table.push(index);
                    combiner += ProcessingResult::Success;
                }
                None => {
                    log::error!("Unable to find material named '{name}' in the material file");
                    // The slot still exists, so later slots keep their position
                    table.push(0);
                    missing.push(name.to_string());
                    combiner += ProcessingResult::Failure;
                }
            }
        }

        if combiner.result().is_failure() {
            return Err(RelocationError::MissingMaterials(missing));
        }
        Ok(Self(table))
    }

    /// Rewrites a mesh's material references through the table.
    ///
    /// Meshes absorbed by the merge carry material indices on faces; every other mesh
    /// carries them on its subsets. Every index must be inside the table.
    pub fn apply(&self, mesh: &mut Mesh, faces_carry_materials: bool) {
        if faces_carry_materials {
            for face in &mut mesh.faces {
                face.subset = self.0[face.subset];
            }
        } else {
            for subset in &mut mesh.subsets {
                subset.mat_id = self.0[subset.mat_id];
            }
        }
    }
}

/// Grows the first real mesh's subset list so it has one subset per material.
///
/// The downstream merge takes this list as the subset layout of the whole container. Its
/// subsets must be the identity prefix `0..n`. Returns how many subsets were added.
pub fn pad_first_mesh_subsets(
    container: &mut CgfContent,
    material_count: usize,
) -> Result<usize, PaddingError> {
    let Some(mesh) = container
        .nodes_mut()
        .iter_mut()
        .find(|node| node.is_real_mesh())
        .and_then(|node| node.mesh.as_mut())
    else {
        return Ok(0);
    };

    if let Some((position, subset)) = mesh
        .subsets
        .iter()
        .enumerate()
        .find(|(position, subset)| subset.mat_id != *position)
    {
        return Err(PaddingError::BrokenOrder {
            position,
            found: subset.mat_id,
        });
    }

    let count = mesh.subsets.len();
    mesh.subsets.extend((count..material_count).map(MeshSubset::new));
    Ok(material_count.saturating_sub(count))
}
