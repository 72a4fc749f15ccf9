pub mod group;
pub mod physics;
pub mod pipeline;

pub use group::{MeshGroup, Rule, RuleContainer};
pub use physics::PhysicalizeType;
pub use pipeline::{Phase, ProcessingResult, ProcessingResultCombiner};

/// File extension of material definition files.
pub const MTL_EXTENSION: &str = ".mtl";

/// Reserved material assigned to default physics proxies.
pub const PHYSICS_NO_DRAW: &str = "physProxyNoDraw";
