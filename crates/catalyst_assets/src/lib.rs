pub mod asset_server;
pub mod assets;
pub mod cgf;
pub mod error;
pub mod material;
pub mod mtl;
pub mod physics;
pub mod scene;

pub use asset_server::AssetServer;
pub use assets::Handle;
pub use error::{AssetError, AssetResult};
pub use mtl::{Material, MaterialGroup};
pub use scene::{NodeIndex, Scene, SceneGraph};
