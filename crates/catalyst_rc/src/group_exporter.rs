use std::path::PathBuf;

use catalyst_assets::{
    NodeIndex, Scene,
    cgf::{CgfContent, CgfNode},
};
use catalyst_core::{MeshGroup, Phase, PhysicalizeType, ProcessingResult, ProcessingResultCombiner};

use crate::{
    config::ConvertContext,
    container_settings::ContainerSettingsExporter,
    contexts::{
        ContainerExportContext, ExportContext, GroupExportContext, MeshNodeExportContext,
        NodeExportContext,
    },
    error::{RcError, RcResult},
    material_exporter::MaterialExporter,
    mesh_builder::{BuiltNode, build_node},
    node_merger::merge_nodes,
    pipeline::ExportPipeline,
};

const PHASES: [Phase; 3] = [Phase::Construction, Phase::Filling, Phase::Finalizing];

/// Outcome of one exported group.
#[derive(Debug, Clone)]
pub struct GroupReport {
    pub group: String,
    pub output: PathBuf,
    pub node_count: usize,
    pub material_count: usize,
}

/// Drives every group of a scene through the export pipeline and writes the result.
pub struct GroupExporter {
    convert_context: ConvertContext,
    pipeline: ExportPipeline,
}

impl GroupExporter {
    pub fn new(convert_context: ConvertContext) -> Self {
        let mut pipeline = ExportPipeline::new();
        pipeline
            .add_plugin(ContainerSettingsExporter::new())
            .add_plugin(MaterialExporter::new(convert_context.clone()));
        Self::with_pipeline(convert_context, pipeline)
    }

    pub fn with_pipeline(convert_context: ConvertContext, pipeline: ExportPipeline) -> Self {
        Self {
            convert_context,
            pipeline,
        }
    }

    pub fn convert_context(&self) -> &ConvertContext {
        &self.convert_context
    }

    /// Builds, post-processes and writes the container of one group.
    pub fn export_group(&mut self, scene: &Scene, group: &MeshGroup) -> RcResult<GroupReport> {
        let mut container = self.build_container(scene, group)?;

        if container.export_info.merge_all_nodes {
            merge_nodes(&mut container)?;
        }
        apply_sub_material_physicalization(&mut container)?;

        let output = self.write_container(&container)?;
        let report = GroupReport {
            group: group.name.clone(),
            output,
            node_count: container.node_count(),
            material_count: container
                .common_material()
                .map_or(0, |material| material.sub_materials.len()),
        };
        log::info!(
            "Exported group '{}': {} nodes, {} materials -> {}",
            report.group,
            report.node_count,
            report.material_count,
            report.output.display()
        );
        Ok(report)
    }

    /// Runs every phase for one group and returns the compiled container.
    ///
    /// Container finalizing is dispatched even when an earlier step failed, so plugins can
    /// drop what they cached for the group.
    pub fn build_container(&mut self, scene: &Scene, group: &MeshGroup) -> RcResult<CgfContent> {
        log::info!("Exporting group '{}' of scene '{}'", group.name, scene.name);

        if self.process_group(scene, group, Phase::Construction).is_failure() {
            return Err(failed(group, "group construction"));
        }

        let mut container = CgfContent::new(group.name.clone());
        let construction = self.process_container(scene, group, &mut container, Phase::Construction);
        let filled = if construction.is_failure() {
            Ok(ProcessingResult::Failure)
        } else {
            self.fill_container(scene, group, &mut container)
        };
        let finalizing = self.process_container(scene, group, &mut container, Phase::Finalizing);

        let filled = filled?;
        if construction.is_failure() {
            return Err(failed(group, "container construction"));
        }
        if filled.is_failure() {
            return Err(failed(group, "node filling"));
        }
        if finalizing.is_failure() {
            return Err(failed(group, "container finalizing"));
        }

        let mut combiner = ProcessingResultCombiner::new();
        combiner += self.process_group(scene, group, Phase::Filling);
        combiner += self.process_group(scene, group, Phase::Finalizing);
        if combiner.result().is_failure() {
            return Err(failed(group, "group finalizing"));
        }

        Ok(container)
    }

    fn fill_container(
        &mut self,
        scene: &Scene,
        group: &MeshGroup,
        container: &mut CgfContent,
    ) -> RcResult<ProcessingResult> {
        for name in &group.node_selection {
            if scene.graph.find(name).is_none() {
                log::warn!("Node '{name}' selected by group '{}' is not in the scene", group.name);
            }
        }

        let selected: Vec<NodeIndex> = scene
            .graph
            .iter()
            .filter(|(_, node)| !node.end_point && group.is_selected(&node.name))
            .map(|(index, _)| index)
            .collect();

        let mut combiner = ProcessingResultCombiner::new();
        for index in selected {
            let Some(BuiltNode {
                mut node,
                physicalize_type,
            }) = build_node(scene, group, index)?
            else {
                continue;
            };

            let result = self.process_node(scene, group, container, &mut node, index, physicalize_type);
            combiner += result;
            if result.is_failure() {
                return Ok(ProcessingResult::Failure);
            }
            container.add_node(node);
        }

        combiner += self.process_container(scene, group, container, Phase::Filling);
        Ok(combiner.result())
    }

    fn process_group(&mut self, scene: &Scene, group: &MeshGroup, phase: Phase) -> ProcessingResult {
        let mut context = ExportContext::Group(GroupExportContext {
            scene,
            group,
            output_directory: &self.convert_context.output_directory,
            phase,
        });
        self.pipeline.process(&mut context)
    }

    fn process_container(
        &mut self,
        scene: &Scene,
        group: &MeshGroup,
        container: &mut CgfContent,
        phase: Phase,
    ) -> ProcessingResult {
        let mut context = ExportContext::Container(ContainerExportContext {
            scene,
            group,
            output_directory: &self.convert_context.output_directory,
            container,
            phase,
        });
        self.pipeline.process(&mut context)
    }

    fn process_node(
        &mut self,
        scene: &Scene,
        group: &MeshGroup,
        container: &CgfContent,
        node: &mut CgfNode,
        node_index: NodeIndex,
        physicalize_type: PhysicalizeType,
    ) -> ProcessingResult {
        let mut combiner = ProcessingResultCombiner::new();

        for phase in PHASES {
            let mut context = ExportContext::Node(NodeExportContext {
                scene,
                group,
                container,
                node: &mut *node,
                node_index,
                physicalize_type,
                phase,
            });
            combiner += self.pipeline.process(&mut context);
        }

        if let Some(mesh) = node.mesh.as_mut() {
            for phase in PHASES {
                let mut context = ExportContext::MeshNode(MeshNodeExportContext {
                    scene,
                    group,
                    container,
                    mesh: &mut *mesh,
                    node_index,
                    physicalize_type,
                    phase,
                });
                combiner += self.pipeline.process(&mut context);
            }
        }

        combiner.result()
    }

    fn write_container(&self, container: &CgfContent) -> RcResult<PathBuf> {
        let directory = &self.convert_context.output_directory;
        std::fs::create_dir_all(directory).map_err(|source| RcError::Io {
            path: directory.clone(),
            source,
        })?;

        let path = directory.join(format!("{}.cgf.json", container.name));
        let json = serde_json::to_string_pretty(container)?;
        std::fs::write(&path, json).map_err(|source| RcError::Io {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

fn failed(group: &MeshGroup, stage: &'static str) -> RcError {
    RcError::ProcessingFailed {
        group: group.name.clone(),
        stage,
    }
}

/// Every subset inherits the physicalization of the sub-material its `mat_id` points at.
pub fn apply_sub_material_physicalization(container: &mut CgfContent) -> RcResult<()> {
    let kinds: Vec<Option<PhysicalizeType>> = match container.common_material() {
        Some(root) => root
            .sub_materials
            .iter()
            .map(|material| material.as_ref().map(|m| m.physicalize))
            .collect(),
        None => return Ok(()),
    };
    if kinds.is_empty() {
        return Ok(());
    }

    for node in container.nodes_mut() {
        let Some(mesh) = node.mesh.as_mut() else {
            continue;
        };
        for subset in &mut mesh.subsets {
            match kinds.get(subset.mat_id) {
                Some(Some(kind)) => subset.physicalize = *kind,
                Some(None) => {}
                None => {
                    return Err(RcError::MaterialOutOfRange {
                        node: node.name.clone(),
                        mat_id: subset.mat_id,
                        count: kinds.len(),
                    });
                }
            }
        }
    }
    Ok(())
}
