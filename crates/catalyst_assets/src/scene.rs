use std::path::PathBuf;

use catalyst_core::{MeshGroup, PhysicalizeType};
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::{error::AssetError, material::MaterialData, physics::PhysicsExtras};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NodeIndex(pub usize);

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneFace {
    pub indices: [u32; 3],
    // Index into the node's own material children
    #[serde(default)]
    pub material_slot: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub faces: Vec<SceneFace>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeContent {
    #[default]
    Empty,
    Mesh(MeshData),
    Material(MaterialData),
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SceneNode {
    pub name: String,
    #[serde(default, skip_serializing)]
    pub parent: Option<NodeIndex>,
    #[serde(default)]
    pub children: Vec<NodeIndex>,
    #[serde(default)]
    pub content: NodeContent,
    #[serde(default)]
    pub end_point: bool,
    #[serde(default)]
    pub physics: Option<PhysicsExtras>,
}

impl SceneNode {
    pub fn mesh(&self) -> Option<&MeshData> {
        match &self.content {
            NodeContent::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn material(&self) -> Option<&MaterialData> {
        match &self.content {
            NodeContent::Material(material) => Some(material),
            _ => None,
        }
    }
}

/// Authored node hierarchy. Node 0 is always the root and insertion
/// order is the traversal order every consumer relies on.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: vec![SceneNode {
                name: "RootNode".to_string(),
                parent: None,
                children: Vec::new(),
                content: NodeContent::Empty,
                end_point: false,
                physics: None,
            }],
        }
    }

    pub fn root(&self) -> NodeIndex {
        NodeIndex(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_child(
        &mut self,
        parent: NodeIndex,
        name: impl Into<String>,
        content: NodeContent,
    ) -> NodeIndex {
        self.insert(parent, name.into(), content, false)
    }

    /// Adds a leaf that can never get children of its own.
    pub fn add_end_point(
        &mut self,
        parent: NodeIndex,
        name: impl Into<String>,
        content: NodeContent,
    ) -> NodeIndex {
        self.insert(parent, name.into(), content, true)
    }

    fn insert(
        &mut self,
        parent: NodeIndex,
        name: String,
        content: NodeContent,
        end_point: bool,
    ) -> NodeIndex {
        debug_assert!(
            !self.nodes[parent.0].end_point,
            "Cannot add children to end point '{}'",
            self.nodes[parent.0].name
        );

        let index = NodeIndex(self.nodes.len());
        self.nodes.push(SceneNode {
            name,
            parent: Some(parent),
            children: Vec::new(),
            content,
            end_point,
            physics: None,
        });
        self.nodes[parent.0].children.push(index);
        index
    }

    pub fn node(&self, index: NodeIndex) -> Option<&SceneNode> {
        self.nodes.get(index.0)
    }

    pub fn node_mut(&mut self, index: NodeIndex) -> Option<&mut SceneNode> {
        self.nodes.get_mut(index.0)
    }

    pub fn find(&self, name: &str) -> Option<NodeIndex> {
        self.nodes
            .iter()
            .position(|node| node.name == name)
            .map(NodeIndex)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &SceneNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeIndex(i), node))
    }

    pub fn child_view(&self, index: NodeIndex) -> ChildView<'_> {
        let children = self
            .nodes
            .get(index.0)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[]);
        ChildView {
            graph: self,
            children,
        }
    }

    /// Material end points directly below `index`, in stored order.
    pub fn material_children(
        &self,
        index: NodeIndex,
    ) -> impl Iterator<Item = (&str, &MaterialData)> {
        self.child_view(index)
            .end_points_only()
            .filter_map(|(_, node)| node.material().map(|m| (node.name.as_str(), m)))
    }

    /// Physicalization of a node: group rules win over authored hints.
    pub fn physicalize_type(&self, index: NodeIndex, group: &MeshGroup) -> PhysicalizeType {
        let Some(node) = self.node(index) else {
            return PhysicalizeType::None;
        };

        if group.rules.is_physics_proxy(&node.name) {
            return PhysicalizeType::DefaultProxy;
        }

        node.physics
            .as_ref()
            .and_then(|p| p.physicalize)
            .unwrap_or_default()
    }

    /// Rebuilds parent links from the children lists and checks the hierarchy.
    pub fn from_json(json: &str) -> Result<Self, AssetError> {
        let mut graph: SceneGraph = serde_json::from_str(json)?;
        graph.link()?;
        Ok(graph)
    }

    fn link(&mut self) -> Result<(), AssetError> {
        if self.nodes.is_empty() {
            return Err(AssetError::InvalidGraph("graph has no root node".to_string()));
        }

        for node in &mut self.nodes {
            node.parent = None;
        }

        for i in 0..self.nodes.len() {
            let children = self.nodes[i].children.clone();
            if !children.is_empty() && self.nodes[i].end_point {
                return Err(AssetError::InvalidGraph(format!(
                    "end point '{}' has children",
                    self.nodes[i].name
                )));
            }

            for child in children {
                if child.0 == 0 || child.0 >= self.nodes.len() {
                    return Err(AssetError::InvalidGraph(format!(
                        "node '{}' references invalid child {}",
                        self.nodes[i].name, child.0
                    )));
                }
                let slot = &mut self.nodes[child.0].parent;
                if slot.is_some() {
                    return Err(AssetError::InvalidGraph(format!(
                        "node {} has more than one parent",
                        child.0
                    )));
                }
                *slot = Some(NodeIndex(i));
            }
        }

        // Every node must be reachable from the root, which also rules out cycles
        let mut reached = vec![false; self.nodes.len()];
        let mut pending = vec![0usize];
        while let Some(i) = pending.pop() {
            reached[i] = true;
            pending.extend(self.nodes[i].children.iter().map(|c| c.0));
        }

        if let Some(i) = reached.iter().position(|r| !r) {
            return Err(AssetError::InvalidGraph(format!(
                "node {} ('{}') is not attached to the hierarchy",
                i, self.nodes[i].name
            )));
        }

        Ok(())
    }
}

/// Immediate children of one node.
#[derive(Clone, Copy)]
pub struct ChildView<'a> {
    graph: &'a SceneGraph,
    children: &'a [NodeIndex],
}

impl<'a> ChildView<'a> {
    pub fn iter(self) -> impl Iterator<Item = (NodeIndex, &'a SceneNode)> {
        let graph = self.graph;
        self.children
            .iter()
            .filter_map(move |&index| graph.node(index).map(|node| (index, node)))
    }

    pub fn end_points_only(self) -> impl Iterator<Item = (NodeIndex, &'a SceneNode)> {
        self.iter().filter(|(_, node)| node.end_point)
    }
}

#[derive(Clone, Debug)]
pub struct Scene {
    pub name: String,
    pub source_path: PathBuf,
    pub graph: SceneGraph,
}

impl Scene {
    pub fn new(name: impl Into<String>, source_path: impl Into<PathBuf>, graph: SceneGraph) -> Self {
        Self {
            name: name.into(),
            source_path: source_path.into(),
            graph,
        }
    }
}
