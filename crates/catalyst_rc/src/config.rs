use std::path::{Path, PathBuf};

use catalyst_assets::Scene;
use catalyst_core::{MeshGroup, Rule};
use serde::Deserialize;

use crate::error::{RcError, RcResult};

/// Where one compile job reads from and writes to.
#[derive(Clone, Debug)]
pub struct ConvertContext {
    pub source_path: PathBuf,
    pub output_directory: PathBuf,
    /// Root of the game data; texture paths in material files are relative to it.
    pub game_folder: Option<PathBuf>,
}

impl ConvertContext {
    pub fn new(source_path: impl Into<PathBuf>, output_directory: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            output_directory: output_directory.into(),
            game_folder: None,
        }
    }

    pub fn with_game_folder(mut self, game_folder: impl Into<PathBuf>) -> Self {
        self.game_folder = Some(game_folder.into());
        self
    }

    pub fn source_directory(&self) -> &Path {
        self.source_path.parent().unwrap_or(Path::new(""))
    }
}

/// The mesh groups authored for one source scene.
#[derive(Deserialize, Debug, Default)]
pub struct SceneManifest {
    #[serde(default)]
    pub groups: Vec<MeshGroup>,
}

impl SceneManifest {
    /// `<source>.assetinfo`, next to the source file.
    pub fn default_path(source_path: &Path) -> PathBuf {
        let mut path = source_path.as_os_str().to_owned();
        path.push(".assetinfo");
        PathBuf::from(path)
    }

    pub fn from_json(json: &str, path: &Path) -> RcResult<Self> {
        serde_json::from_str(json).map_err(|source| RcError::Manifest {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> RcResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| RcError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let manifest = Self::from_json(&json, path)?;
        log::info!(
            "Loaded {} mesh groups from {}",
            manifest.groups.len(),
            path.display()
        );
        Ok(manifest)
    }

    /// One group named after the scene selecting every mesh node, with materials exported.
    pub fn default_for(scene: &Scene) -> Self {
        let nodes = scene
            .graph
            .iter()
            .filter(|(_, node)| node.mesh().is_some())
            .map(|(_, node)| node.name.clone());

        let group = MeshGroup::new(scene.name.clone())
            .with_nodes(nodes)
            .with_rule(Rule::Material);
        Self {
            groups: vec![group],
        }
    }

    /// Loads `path` when it exists, otherwise falls back to [`SceneManifest::default_for`].
    pub fn load_or_default(path: &Path, scene: &Scene) -> RcResult<Self> {
        if path.exists() {
            return Self::load(path);
        }
        log::warn!(
            "No manifest at {}, exporting every mesh of '{}' as one group",
            path.display(),
            scene.name
        );
        Ok(Self::default_for(scene))
    }
}

#[cfg(test)]
mod tests {
    use catalyst_assets::{SceneGraph, scene::NodeContent};

    use super::*;

    #[test]
    fn manifest_sits_next_to_the_source() {
        assert_eq!(
            SceneManifest::default_path(Path::new("objects/ship.gltf")),
            PathBuf::from("objects/ship.gltf.assetinfo")
        );
    }

    #[test]
    fn source_directory_of_a_bare_file_is_empty() {
        let context = ConvertContext::new("ship.gltf", "out");
        assert_eq!(context.source_directory(), Path::new(""));
        assert!(context.game_folder.is_none());
    }

    #[test]
    fn parses_groups_with_rules() {
        let json = r#"{
            "groups": [
                {
                    "name": "ship",
                    "node_selection": ["hull", "hull_proxy"],
                    "rules": [
                        { "type": "material" },
                        { "type": "merge_all_nodes" },
                        { "type": "physics_proxy", "nodes": ["hull_proxy"] }
                    ]
                }
            ]
        }"#;

        let manifest = SceneManifest::from_json(json, Path::new("ship.assetinfo")).unwrap();
        let group = &manifest.groups[0];
        assert_eq!(group.name, "ship");
        assert!(group.rules.has_material_rule());
        assert!(group.rules.merges_all_nodes());
        assert!(group.rules.is_physics_proxy("hull_proxy"));
    }

    #[test]
    fn malformed_manifest_names_the_file() {
        let result = SceneManifest::from_json("{ groups: ", Path::new("ship.assetinfo"));
        match result {
            Err(RcError::Manifest { path, .. }) => assert_eq!(path, PathBuf::from("ship.assetinfo")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn default_manifest_selects_every_mesh() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        graph.add_child(root, "hull", NodeContent::Mesh(Default::default()));
        graph.add_child(root, "locator", NodeContent::Empty);
        let scene = Scene::new("ship", "ship.gltf", graph);

        let manifest = SceneManifest::default_for(&scene);
        let group = &manifest.groups[0];
        assert_eq!(group.name, "ship");
        assert!(group.is_selected("hull"));
        assert!(!group.is_selected("locator"));
        assert!(group.rules.has_material_rule());
    }
}
