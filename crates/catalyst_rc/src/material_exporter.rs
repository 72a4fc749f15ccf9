use catalyst_assets::{
    AssetError, MaterialGroup,
    cgf::CgfMaterial,
    mtl::{MtlMaterialExporter, SaveMaterialResult, normalize_path},
};
use catalyst_core::{MTL_EXTENSION, MeshGroup, Phase, PhysicalizeType, ProcessingResult, ProcessingResultCombiner};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    config::ConvertContext,
    contexts::{
        ContainerExportContext, ExportContext, GroupExportContext, MeshNodeExportContext,
        NodeExportContext,
    },
    pipeline::ExportPlugin,
    relocation::{RelocationError, RelocationTable, pad_first_mesh_subsets},
};

#[derive(Debug, Error)]
pub enum MaterialFileError {
    #[error("Group '{0}' selects nothing to derive materials from")]
    NothingToDerive(String),

    #[error("Failed to derive materials for group '{0}' from the scene")]
    Derivation(String),

    #[error(transparent)]
    Asset(#[from] AssetError),
}

/// Resolves the material file of each group and rewrites the compiled geometry so it refers
/// to materials by their index in that file.
///
/// State is carried from group construction to container finalizing and is cleared at the
/// end of every container, whatever the outcome.
pub struct MaterialExporter {
    convert_context: ConvertContext,
    material_group: Option<MaterialGroup>,
    cached_group: Option<Uuid>,
    export_material: bool,
}

impl MaterialExporter {
    pub fn new(convert_context: ConvertContext) -> Self {
        Self {
            convert_context,
            material_group: None,
            cached_group: None,
            export_material: true,
        }
    }

    pub fn material_group(&self) -> Option<&MaterialGroup> {
        self.material_group.as_ref()
    }

    pub fn cached_group(&self) -> Option<Uuid> {
        self.cached_group
    }

    pub fn is_exporting_materials(&self) -> bool {
        self.export_material
    }

    pub fn reset(&mut self) {
        self.material_group = None;
        self.cached_group = None;
        self.export_material = true;
    }

    fn setup_material(&mut self, context: &GroupExportContext) -> ProcessingResult {
        match context.phase {
            Phase::Construction => self.handle_material_file_loading_and_creation(context),
            _ => ProcessingResult::Ignored,
        }
    }

    fn configure_container(&mut self, context: &mut ContainerExportContext) -> ProcessingResult {
        match context.phase {
            Phase::Construction => {
                // Already resolved for this group at group construction
                let loaded = self.cached_group == Some(context.group.id)
                    && self.material_group.is_some();
                if !loaded {
                    let result =
                        self.handle_material_file_loading_and_creation(&context.group_context());
                    if result != ProcessingResult::Success {
                        return result;
                    }
                }
                self.setup_global_material(context)
            }
            Phase::Finalizing => {
                if !self.export_material || self.material_group.is_none() {
                    self.reset();
                    return ProcessingResult::Ignored;
                }

                let mut combiner = ProcessingResultCombiner::new();
                combiner += self.patch_submeshes(context);
                combiner += self.create_sub_materials(context);
                self.reset();
                combiner.result()
            }
            Phase::Filling => ProcessingResult::Ignored,
        }
    }

    fn process_node(&mut self, context: &mut NodeExportContext) -> ProcessingResult {
        if context.phase != Phase::Filling || !self.export_material {
            return ProcessingResult::Ignored;
        }
        self.assign_common_material(context)
    }

    fn patch_mesh(&mut self, context: &mut MeshNodeExportContext) -> ProcessingResult {
        if context.phase != Phase::Filling || !self.export_material {
            return ProcessingResult::Ignored;
        }
        self.patch_materials(context)
    }

    fn handle_material_file_loading_and_creation(
        &mut self,
        context: &GroupExportContext,
    ) -> ProcessingResult {
        if !context.group.rules.has_material_rule() {
            log::info!(
                "Group '{}' has no material rule, materials are not exported",
                context.group.name
            );
            self.export_material = false;
            return ProcessingResult::Ignored;
        }

        match self.load_material_file(context) {
            Ok(material_group) => {
                log::debug!(
                    "Group '{}' uses {} materials",
                    context.group.name,
                    material_group.material_count()
                );
                self.material_group = Some(material_group);
                self.cached_group = Some(context.group.id);
                ProcessingResult::Success
            }
            Err(err) => {
                log::error!("No material file for group '{}': {err}", context.group.name);
                self.reset();
                ProcessingResult::Failure
            }
        }
    }

    /// Prefers the `.mtl` next to the source scene and otherwise derives one from the
    /// scene's own materials into the output directory.
    fn load_material_file(
        &self,
        context: &GroupExportContext,
    ) -> Result<MaterialGroup, MaterialFileError> {
        let file_name = format!("{}{}", context.group.name, MTL_EXTENSION);

        let source_file = self.convert_context.source_directory().join(&file_name);
        match MaterialGroup::read_mtl_file(&source_file) {
            Ok(material_group) => {
                log::info!("Using material file {}", source_file.display());
                return Ok(material_group);
            }
            Err(AssetError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No material file at {}", source_file.display());
            }
            Err(err) => log::warn!(
                "Unable to load material file {}, deriving one from the scene: {err}",
                source_file.display()
            ),
        }

        let texture_root = match &self.convert_context.game_folder {
            Some(folder) => normalize_path(&folder.to_string_lossy()),
            None => {
                log::warn!(
                    "No game folder set, texture paths in '{file_name}' are kept as authored"
                );
                String::new()
            }
        };

        let mut exporter = MtlMaterialExporter::new();
        match exporter.save_material_group(context.group, context.scene, &texture_root) {
            SaveMaterialResult::Success => {
                let target = context.output_directory.join(&file_name);
                exporter.write_to_file(&target)?;
                Ok(MaterialGroup::read_mtl_file(&target)?)
            }
            SaveMaterialResult::Skipped => {
                Err(MaterialFileError::NothingToDerive(context.group.name.clone()))
            }
            SaveMaterialResult::Failure => {
                Err(MaterialFileError::Derivation(context.group.name.clone()))
            }
        }
    }

    fn is_cached_group(&self, group: &MeshGroup, unit: &str) -> bool {
        let matches = self.cached_group == Some(group.id);
        debug_assert!(
            matches,
            "{unit} of group '{}' doesn't belong to the previously configured container",
            group.name
        );
        if !matches {
            log::error!(
                "{unit} of group '{}' doesn't belong to the previously configured container",
                group.name
            );
        }
        matches
    }

    fn setup_global_material(&self, context: &mut ContainerExportContext) -> ProcessingResult {
        if !self.is_cached_group(context.group, "Container") {
            return ProcessingResult::Failure;
        }

        if context.container.common_material().is_none() {
            context
                .container
                .set_common_material(CgfMaterial::new(&context.group.name, PhysicalizeType::None));
        }
        ProcessingResult::Success
    }

    fn assign_common_material(&self, context: &mut NodeExportContext) -> ProcessingResult {
        if !self.is_cached_group(context.group, "Node") {
            return ProcessingResult::Failure;
        }

        let root = context.container.common_material();
        debug_assert!(root.is_some(), "Container of group '{}' has no root material", context.group.name);
        let Some(root) = root else {
            log::error!("Container of group '{}' has no root material", context.group.name);
            return ProcessingResult::Failure;
        };

        context.node.material = Some(root.handle.clone());
        ProcessingResult::Success
    }

    pub fn build_relocation_table(
        &self,
        context: &MeshNodeExportContext,
    ) -> Result<RelocationTable, RelocationError> {
        match &self.material_group {
            Some(materials) => RelocationTable::build(
                materials,
                &context.scene.graph,
                context.node_index,
                context.physicalize_type,
            ),
            None => Ok(RelocationTable::default()),
        }
    }

    fn patch_materials(&self, context: &mut MeshNodeExportContext) -> ProcessingResult {
        if !self.is_cached_group(context.group, "Mesh") {
            return ProcessingResult::Failure;
        }

        let table = match self.build_relocation_table(context) {
            Ok(table) => table,
            Err(err) => {
                log::error!(
                    "Failed to relocate materials of node {:?} in group '{}': {err}",
                    context.node_index,
                    context.group.name
                );
                return ProcessingResult::Failure;
            }
        };

        if table.is_empty() {
            log::debug!("Node {:?} references no materials", context.node_index);
            return ProcessingResult::Ignored;
        }

        // Proxies survive the merge as separate nodes and keep their own subset list
        let faces_carry_materials = context.container.export_info.merge_all_nodes
            && !context.physicalize_type.is_default_proxy();
        table.apply(context.mesh, faces_carry_materials);
        ProcessingResult::Success
    }

    fn patch_submeshes(&self, context: &mut ContainerExportContext) -> ProcessingResult {
        if !context.container.export_info.merge_all_nodes {
            return ProcessingResult::Ignored;
        }
        if !self.is_cached_group(context.group, "Container") {
            return ProcessingResult::Failure;
        }
        let Some(materials) = &self.material_group else {
            return ProcessingResult::Ignored;
        };

        let padded = pad_first_mesh_subsets(context.container, materials.material_count());
        debug_assert!(padded.is_ok(), "{padded:?}");
        match padded {
            Ok(added) => {
                log::debug!(
                    "Padded {added} subsets for the merged container of group '{}'",
                    context.group.name
                );
                ProcessingResult::Success
            }
            Err(err) => {
                log::error!("Cannot pad subsets of group '{}': {err}", context.group.name);
                ProcessingResult::Failure
            }
        }
    }

    fn create_sub_materials(&self, context: &mut ContainerExportContext) -> ProcessingResult {
        if !self.is_cached_group(context.group, "Container") {
            return ProcessingResult::Failure;
        }
        let Some(materials) = &self.material_group else {
            return ProcessingResult::Ignored;
        };

        let root = context.container.common_material_mut();
        debug_assert!(root.is_some(), "Root material not set before finalizing");
        let Some(root) = root else {
            log::error!(
                "Container of group '{}' has no root material to attach sub-materials to",
                context.group.name
            );
            return ProcessingResult::Failure;
        };

        root.sub_materials = materials
            .iter()
            .map(|material| {
                let physicalize = if material.is_physical_material() {
                    PhysicalizeType::DefaultProxy
                } else {
                    PhysicalizeType::None
                };
                Some(CgfMaterial::new(&material.name, physicalize))
            })
            .collect();
        ProcessingResult::Success
    }
}

impl ExportPlugin for MaterialExporter {
    fn name(&self) -> &'static str {
        "material"
    }

    fn process(&mut self, context: &mut ExportContext<'_>) -> ProcessingResult {
        match context {
            ExportContext::Group(context) => self.setup_material(context),
            ExportContext::Container(context) => self.configure_container(context),
            ExportContext::Node(context) => self.process_node(context),
            ExportContext::MeshNode(context) => self.patch_mesh(context),
        }
    }
}
