use std::path::{Component, Path, PathBuf};

use catalyst_core::MeshGroup;

use super::{Material, MaterialGroup, MaterialTexture};
use crate::error::AssetResult;
use crate::material::MaterialData;
use crate::scene::Scene;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveMaterialResult {
    Success,
    Failure,
    Skipped,
}

/// Forward slashes, no trailing separator.
pub fn normalize_path(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    match normalized.trim_end_matches('/') {
        "" if normalized.starts_with('/') => "/".to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// Derives a material definition file from the materials authored in a scene.
#[derive(Default)]
pub struct MtlMaterialExporter {
    group: MaterialGroup,
}

impl MtlMaterialExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn material_group(&self) -> &MaterialGroup {
        &self.group
    }

    /// Collects the materials of every selected node in scene order.
    /// `texture_root` is the folder texture paths are made relative to.
    pub fn save_material_group(
        &mut self,
        mesh_group: &MeshGroup,
        scene: &Scene,
        texture_root: &str,
    ) -> SaveMaterialResult {
        self.group = MaterialGroup::new();

        let graph = &scene.graph;
        let selected: Vec<_> = graph
            .iter()
            .filter(|(_, node)| mesh_group.is_selected(&node.name))
            .map(|(index, _)| index)
            .collect();

        if selected.is_empty() {
            log::info!(
                "Group '{}' selects no nodes present in the scene, no materials to derive",
                mesh_group.name
            );
            return SaveMaterialResult::Skipped;
        }

        let source_dir = scene.source_path.parent().unwrap_or(Path::new(""));
        let mut needs_no_draw = false;

        for &index in &selected {
            if graph.physicalize_type(index, mesh_group).is_default_proxy() {
                needs_no_draw = true;
                continue;
            }

            for (name, data) in graph.material_children(index) {
                if name.is_empty() {
                    log::error!("Material without a name below node {:?}", index);
                    return SaveMaterialResult::Failure;
                }
                if self.group.find_material_index(name).is_some() {
                    continue;
                }

                let material = material_from_scene(name, data, source_dir, texture_root);
                if self.group.add_material(material).is_err() {
                    return SaveMaterialResult::Failure;
                }
            }
        }

        if needs_no_draw && self.group.find_material_index(catalyst_core::PHYSICS_NO_DRAW).is_none() {
            if self.group.add_material(Material::physics_no_draw()).is_err() {
                return SaveMaterialResult::Failure;
            }
        }

        log::debug!(
            "Derived {} materials for group '{}'",
            self.group.material_count(),
            mesh_group.name
        );
        SaveMaterialResult::Success
    }

    pub fn write_to_file(&self, path: &Path) -> AssetResult<()> {
        self.group.write_mtl_file(path)?;
        log::info!("Wrote material file {}", path.display());
        Ok(())
    }
}

fn material_from_scene(
    name: &str,
    data: &MaterialData,
    source_dir: &Path,
    texture_root: &str,
) -> Material {
    let mut material = Material::new(name);
    let [r, g, b, a] = data.base_color;
    material.diffuse = [r, g, b];
    material.opacity = a;
    material.specular = [data.metallic; 3];
    material.shininess = ((1.0 - data.roughness).clamp(0.0, 1.0) * 255.0).round();

    let maps = [
        ("Diffuse", data.diffuse_texture.as_deref()),
        ("Bumpmap", data.normal_texture.as_deref()),
    ];
    for (map, file) in maps {
        if let Some(file) = file {
            material.textures.push(MaterialTexture {
                map: map.to_string(),
                file: resolve_texture_path(file, source_dir, texture_root),
            });
        }
    }

    material
}

// Best effort: relative to the texture root when the file lives below it,
// otherwise the normalized path as authored.
fn resolve_texture_path(file: &str, source_dir: &Path, texture_root: &str) -> String {
    let authored = PathBuf::from(normalize_path(file));
    let absolute = if authored.is_absolute() {
        collapse_dots(&authored)
    } else {
        collapse_dots(&source_dir.join(&authored))
    };

    if !texture_root.is_empty() {
        let root = PathBuf::from(normalize_path(texture_root));
        if let Ok(relative) = absolute.strip_prefix(&root) {
            return normalize_path(&relative.to_string_lossy());
        }
    }

    normalize_path(&authored.to_string_lossy())
}

/// Folds `.` and `..` components without touching the filesystem. Leading `..` that
/// cannot be folded are kept.
fn collapse_dots(path: &Path) -> PathBuf {
    let mut parts: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            _ => parts.push(component),
        }
    }
    parts.iter().collect()
}
