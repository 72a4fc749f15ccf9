use serde::{Deserialize, Serialize};

/// Material as authored in the source scene.
/// The material's name is the name of the scene node carrying it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct MaterialData {
    pub base_color: [f32; 4],
    pub roughness: f32,
    pub metallic: f32,
    // Texture paths exactly as the source file references them
    pub diffuse_texture: Option<String>,
    pub normal_texture: Option<String>,
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            base_color: [1.0, 1.0, 1.0, 1.0],
            roughness: 0.5,
            metallic: 0.0,
            diffuse_texture: None,
            normal_texture: None,
        }
    }
}
