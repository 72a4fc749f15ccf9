use catalyst_core::{Phase, ProcessingResult};

use crate::{contexts::ExportContext, pipeline::ExportPlugin};

/// Copies group-level export options onto the container before anything is added to it.
#[derive(Default)]
pub struct ContainerSettingsExporter;

impl ContainerSettingsExporter {
    pub fn new() -> Self {
        Self
    }
}

impl ExportPlugin for ContainerSettingsExporter {
    fn name(&self) -> &'static str {
        "container settings"
    }

    fn process(&mut self, context: &mut ExportContext<'_>) -> ProcessingResult {
        let ExportContext::Container(context) = context else {
            return ProcessingResult::Ignored;
        };
        if context.phase != Phase::Construction {
            return ProcessingResult::Ignored;
        }

        let merge_all_nodes = context.group.rules.merges_all_nodes();
        context.container.export_info.merge_all_nodes = merge_all_nodes;
        log::debug!(
            "Container '{}' merges all nodes: {merge_all_nodes}",
            context.container.name
        );
        ProcessingResult::Success
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use catalyst_assets::{Scene, SceneGraph, cgf::CgfContent};
    use catalyst_core::{MeshGroup, Rule};

    use super::*;
    use crate::contexts::ContainerExportContext;

    fn configure(group: &MeshGroup, phase: Phase) -> (ProcessingResult, CgfContent) {
        let scene = Scene::new("ship", "ship.gltf", SceneGraph::new());
        let mut container = CgfContent::new("ship");
        let mut context = ExportContext::Container(ContainerExportContext {
            scene: &scene,
            group,
            output_directory: Path::new("out"),
            container: &mut container,
            phase,
        });
        let result = ContainerSettingsExporter::new().process(&mut context);
        (result, container)
    }

    #[test]
    fn merge_rule_reaches_the_container() {
        let group = MeshGroup::new("ship").with_rule(Rule::MergeAllNodes);
        let (result, container) = configure(&group, Phase::Construction);
        assert_eq!(result, ProcessingResult::Success);
        assert!(container.export_info.merge_all_nodes);
    }

    #[test]
    fn separate_nodes_by_default() {
        let (result, container) = configure(&MeshGroup::new("ship"), Phase::Construction);
        assert_eq!(result, ProcessingResult::Success);
        assert!(!container.export_info.merge_all_nodes);
    }

    #[test]
    fn later_phases_are_ignored() {
        let group = MeshGroup::new("ship").with_rule(Rule::MergeAllNodes);
        let (result, container) = configure(&group, Phase::Finalizing);
        assert_eq!(result, ProcessingResult::Ignored);
        assert!(!container.export_info.merge_all_nodes);
    }
}
