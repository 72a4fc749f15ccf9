//! Compiled geometry container: the output aggregate produced for one group.

use catalyst_core::PhysicalizeType;
use glam::Vec3;
use serde::Serialize;

use crate::assets::Handle;

/// Material names are stored in fixed 128 byte slots by the runtime.
pub const MAX_MATERIAL_NAME_LEN: usize = 127;

fn truncate_name(name: &str) -> String {
    if name.len() <= MAX_MATERIAL_NAME_LEN {
        return name.to_string();
    }
    let mut end = MAX_MATERIAL_NAME_LEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].to_string()
}

#[derive(Serialize, Debug, Clone)]
pub struct CgfMaterial {
    pub handle: Handle<CgfMaterial>,
    pub name: String,
    pub physicalize: PhysicalizeType,
    pub sub_materials: Vec<Option<CgfMaterial>>,
}

impl CgfMaterial {
    pub fn new(name: &str, physicalize: PhysicalizeType) -> Self {
        Self {
            handle: Handle::new(),
            name: truncate_name(name),
            physicalize,
            sub_materials: Vec::new(),
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshSubset {
    pub mat_id: usize,
    pub physicalize: PhysicalizeType,
}

impl MeshSubset {
    pub fn new(mat_id: usize) -> Self {
        Self {
            mat_id,
            physicalize: PhysicalizeType::None,
        }
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshFace {
    pub indices: [u32; 3],
    pub subset: usize,
}

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub positions: Vec<Vec3>,
    pub faces: Vec<MeshFace>,
    pub subsets: Vec<MeshSubset>,
}

impl Mesh {
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn subset_count(&self) -> usize {
        self.subsets.len()
    }
}

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CgfNodeType {
    Mesh,
    Helper,
}

#[derive(Serialize, Debug, Clone)]
pub struct CgfNode {
    pub name: String,
    pub node_type: CgfNodeType,
    pub physics_proxy: bool,
    pub mesh: Option<Mesh>,
    // Points into the container's common material, never a copy of it
    pub material: Option<Handle<CgfMaterial>>,
}

impl CgfNode {
    pub fn new(name: impl Into<String>, node_type: CgfNodeType) -> Self {
        Self {
            name: name.into(),
            node_type,
            physics_proxy: false,
            mesh: None,
            material: None,
        }
    }

    /// A node the downstream merge treats as renderable geometry.
    pub fn is_real_mesh(&self) -> bool {
        self.mesh.is_some() && !self.physics_proxy && self.node_type == CgfNodeType::Mesh
    }
}

#[derive(Serialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportInfo {
    pub merge_all_nodes: bool,
}

#[derive(Serialize, Debug, Clone, Default)]
pub struct CgfContent {
    pub name: String,
    pub export_info: ExportInfo,
    nodes: Vec<CgfNode>,
    common_material: Option<CgfMaterial>,
}

impl CgfContent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn add_node(&mut self, node: CgfNode) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, index: usize) -> Option<&CgfNode> {
        self.nodes.get(index)
    }

    pub fn nodes(&self) -> &[CgfNode] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [CgfNode] {
        &mut self.nodes
    }

    pub fn replace_nodes(&mut self, nodes: Vec<CgfNode>) {
        self.nodes = nodes;
    }

    pub fn common_material(&self) -> Option<&CgfMaterial> {
        self.common_material.as_ref()
    }

    pub fn common_material_mut(&mut self) -> Option<&mut CgfMaterial> {
        self.common_material.as_mut()
    }

    /// Takes ownership of the shared material and returns the handle nodes refer to it by.
    pub fn set_common_material(&mut self, material: CgfMaterial) -> Handle<CgfMaterial> {
        let handle = material.handle.clone();
        self.common_material = Some(material);
        handle
    }

    /// Follows a node's material reference.
    pub fn resolve_material(&self, handle: &Handle<CgfMaterial>) -> Option<&CgfMaterial> {
        self.common_material
            .as_ref()
            .filter(|material| &material.handle == handle)
    }
}
