use serde::{Deserialize, Serialize};

/// How a piece of compiled geometry takes part in collision.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PhysicalizeType {
    #[default]
    None,
    DefaultProxy,
    NoCollide,
    Obstruct,
}

impl PhysicalizeType {
    pub fn is_default_proxy(self) -> bool {
        self == PhysicalizeType::DefaultProxy
    }
}
