use std::path::PathBuf;

use catalyst_assets::AssetError;
use thiserror::Error;

use crate::node_merger::MergeError;

#[derive(Debug, Error)]
pub enum RcError {
    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error("Malformed manifest {}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Group '{group}' failed during {stage}")]
    ProcessingFailed { group: String, stage: &'static str },

    #[error("Node '{node}' face {face} uses material slot {slot} but the node only has {count}")]
    InvalidMesh {
        node: String,
        face: usize,
        slot: usize,
        count: usize,
    },

    #[error("Node '{node}' references material {mat_id} but only {count} sub-materials exist")]
    MaterialOutOfRange {
        node: String,
        mat_id: usize,
        count: usize,
    },

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error("Failed to serialize compiled container: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type RcResult<T> = Result<T, RcError>;
