use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed material file {}: {details}", path.display())]
    Mtl { path: PathBuf, details: String },

    #[error("glTF import failed: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("Scene description error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported scene format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Material '{0}' is defined more than once")]
    DuplicateMaterial(String),

    #[error("Invalid scene graph: {0}")]
    InvalidGraph(String),

    #[error("Mesh '{mesh}' has {vertices} vertices, more than 32-bit indices can address")]
    MeshTooLarge { mesh: String, vertices: usize },
}

pub type AssetResult<T> = Result<T, AssetError>;
