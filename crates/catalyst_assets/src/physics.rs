use catalyst_core::PhysicalizeType;
use serde::{Deserialize, Serialize};

/// Physics hints authored on a scene node (glTF node `extras`).
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PhysicsExtras {
    pub physicalize: Option<PhysicalizeType>,
}

impl PhysicsExtras {
    pub fn from_extras_json(raw: &str) -> Option<Self> {
        match serde_json::from_str::<PhysicsExtras>(raw) {
            Ok(extras) => Some(extras),
            Err(e) => {
                log::debug!("Ignoring node extras without physics hints: {}", e);
                None
            }
        }
    }
}
