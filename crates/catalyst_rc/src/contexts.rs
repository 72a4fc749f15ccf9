//! Units of work handed to export plugins, one variant per kind of unit.

use std::path::Path;

use catalyst_assets::{
    NodeIndex, Scene,
    cgf::{CgfContent, CgfNode, Mesh},
};
use catalyst_core::{MeshGroup, Phase, PhysicalizeType};

/// A mesh group as a whole.
pub struct GroupExportContext<'a> {
    pub scene: &'a Scene,
    pub group: &'a MeshGroup,
    pub output_directory: &'a Path,
    pub phase: Phase,
}

/// The compiled container built for a group.
pub struct ContainerExportContext<'a> {
    pub scene: &'a Scene,
    pub group: &'a MeshGroup,
    pub output_directory: &'a Path,
    pub container: &'a mut CgfContent,
    pub phase: Phase,
}

impl<'a> ContainerExportContext<'a> {
    /// The group view of the same unit, used where group and container share work.
    pub fn group_context(&self) -> GroupExportContext<'a> {
        GroupExportContext {
            scene: self.scene,
            group: self.group,
            output_directory: self.output_directory,
            phase: self.phase,
        }
    }
}

/// One compiled node, before it is added to its container.
pub struct NodeExportContext<'a> {
    pub scene: &'a Scene,
    pub group: &'a MeshGroup,
    pub container: &'a CgfContent,
    pub node: &'a mut CgfNode,
    pub node_index: NodeIndex,
    pub physicalize_type: PhysicalizeType,
    pub phase: Phase,
}

/// The geometry of one compiled node.
pub struct MeshNodeExportContext<'a> {
    pub scene: &'a Scene,
    pub group: &'a MeshGroup,
    pub container: &'a CgfContent,
    pub mesh: &'a mut Mesh,
    pub node_index: NodeIndex,
    pub physicalize_type: PhysicalizeType,
    pub phase: Phase,
}

pub enum ExportContext<'a> {
    Group(GroupExportContext<'a>),
    Container(ContainerExportContext<'a>),
    Node(NodeExportContext<'a>),
    MeshNode(MeshNodeExportContext<'a>),
}

impl ExportContext<'_> {
    pub fn phase(&self) -> Phase {
        match self {
            ExportContext::Group(context) => context.phase,
            ExportContext::Container(context) => context.phase,
            ExportContext::Node(context) => context.phase,
            ExportContext::MeshNode(context) => context.phase,
        }
    }

    pub fn group(&self) -> &MeshGroup {
        match self {
            ExportContext::Group(context) => context.group,
            ExportContext::Container(context) => context.group,
            ExportContext::Node(context) => context.group,
            ExportContext::MeshNode(context) => context.group,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ExportContext::Group(_) => "group",
            ExportContext::Container(_) => "container",
            ExportContext::Node(_) => "node",
            ExportContext::MeshNode(_) => "mesh node",
        }
    }
}
