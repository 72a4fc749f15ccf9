use std::path::Path;

use crate::error::{AssetError, AssetResult};
use crate::scene::{Scene, SceneGraph};

pub mod gltf_parser;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneFormat {
    Gltf,
    Json,
}

impl SceneFormat {
    /// Detect format from file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
            .and_then(|ext| match ext.as_str() {
                "gltf" | "glb" => Some(SceneFormat::Gltf),
                "json" => Some(SceneFormat::Json),
                _ => None,
            })
    }
}

/// Loads authored scenes for the compiler. Loading is synchronous; the
/// compiler processes one scene at a time.
#[derive(Clone, Debug, Default)]
pub struct AssetServer;

impl AssetServer {
    pub fn new() -> Self {
        Self
    }

    pub fn load_scene(&self, path: &Path) -> AssetResult<Scene> {
        let format = SceneFormat::from_path(path)
            .ok_or_else(|| AssetError::UnsupportedFormat(path.to_path_buf()))?;

        log::info!("Loading scene {}", path.display());

        match format {
            SceneFormat::Gltf => gltf_parser::parse_gltf(path),
            SceneFormat::Json => {
                let json = std::fs::read_to_string(path).map_err(|source| AssetError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                let graph = SceneGraph::from_json(&json)?;
                let name = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .map(|s| s.trim_end_matches(".scene").to_string())
                    .unwrap_or_else(|| "scene".to_string());
                Ok(Scene::new(name, path, graph))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_formats_case_insensitively() {
        assert_eq!(SceneFormat::from_path(Path::new("a/ship.GLB")), Some(SceneFormat::Gltf));
        assert_eq!(SceneFormat::from_path(Path::new("ship.scene.json")), Some(SceneFormat::Json));
        assert_eq!(SceneFormat::from_path(Path::new("ship.fbx")), None);
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let result = AssetServer::new().load_scene(Path::new("ship.fbx"));
        assert!(matches!(result, Err(AssetError::UnsupportedFormat(_))));
    }

    #[test]
    fn loads_json_scene_description() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crate.scene.json");
        std::fs::write(
            &path,
            r#"{ "nodes": [ { "name": "RootNode", "children": [1] }, { "name": "box" } ] }"#,
        )
        .unwrap();

        let scene = AssetServer::new().load_scene(&path).unwrap();
        assert_eq!(scene.name, "crate");
        assert!(scene.graph.find("box").is_some());
    }
}
