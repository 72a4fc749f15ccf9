//! Resource compiler: turns authored scenes into compiled geometry containers.

pub mod config;
pub mod container_settings;
pub mod contexts;
pub mod error;
pub mod group_exporter;
pub mod material_exporter;
pub mod mesh_builder;
pub mod node_merger;
pub mod pipeline;
pub mod relocation;

pub use config::{ConvertContext, SceneManifest};
pub use container_settings::ContainerSettingsExporter;
pub use contexts::ExportContext;
pub use error::{RcError, RcResult};
pub use group_exporter::{GroupExporter, GroupReport};
pub use material_exporter::MaterialExporter;
pub use pipeline::{ExportPipeline, ExportPlugin};
pub use relocation::{PaddingError, RelocationError, RelocationTable};
