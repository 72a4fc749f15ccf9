//! Material definition files (`.mtl`) and the ordered material groups they hold.

use std::path::Path;

use crate::error::{AssetError, AssetResult};

mod exporter;
mod reader;
mod writer;

pub use exporter::{MtlMaterialExporter, SaveMaterialResult, normalize_path};

pub const MTL_FLAG_PURE_CHILD: u32 = 0x0080;
pub const MTL_FLAG_MULTI_SUBMTL: u32 = 0x0100;
pub const MTL_FLAG_NODRAW: u32 = 0x0400;
pub const MTL_64BIT_SHADOWMAP: u32 = 0x8_0000;

#[derive(Clone, Debug, PartialEq)]
pub struct MaterialTexture {
    pub map: String,
    pub file: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub flags: u32,
    pub shader: String,
    pub surface_type: String,
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub opacity: f32,
    pub shininess: f32,
    pub textures: Vec<MaterialTexture>,
}

impl Material {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flags: MTL_FLAG_PURE_CHILD | MTL_64BIT_SHADOWMAP,
            shader: "Illum".to_string(),
            surface_type: String::new(),
            diffuse: [1.0, 1.0, 1.0],
            specular: [0.0, 0.0, 0.0],
            opacity: 1.0,
            shininess: 10.0,
            textures: Vec::new(),
        }
    }

    /// The material compiled onto default physics proxies.
    pub fn physics_no_draw() -> Self {
        Self {
            flags: MTL_FLAG_PURE_CHILD | MTL_FLAG_NODRAW | MTL_64BIT_SHADOWMAP,
            shader: "Nodraw".to_string(),
            surface_type: "mat_default".to_string(),
            ..Self::new(catalyst_core::PHYSICS_NO_DRAW)
        }
    }

    pub fn is_physical_material(&self) -> bool {
        self.flags & MTL_FLAG_NODRAW != 0
    }

    pub fn texture(&self, map: &str) -> Option<&str> {
        self.textures
            .iter()
            .find(|t| t.map == map)
            .map(|t| t.file.as_str())
    }
}

/// Ordered, name-indexed set of materials. The position of a material is its
/// index everywhere else in the compiler.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialGroup {
    pub flags: u32,
    materials: Vec<Material>,
}

impl Default for MaterialGroup {
    fn default() -> Self {
        Self {
            flags: MTL_FLAG_MULTI_SUBMTL,
            materials: Vec::new(),
        }
    }
}

impl MaterialGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_material(&mut self, material: Material) -> AssetResult<usize> {
        if self.find_material_index(&material.name).is_some() {
            return Err(AssetError::DuplicateMaterial(material.name));
        }
        self.materials.push(material);
        Ok(self.materials.len() - 1)
    }

    /// Exact-name lookup. `None` is the not-found sentinel.
    pub fn find_material_index(&self, name: &str) -> Option<usize> {
        self.materials.iter().position(|m| m.name == name)
    }

    pub fn material(&self, index: usize) -> Option<&Material> {
        self.materials.get(index)
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Material> {
        self.materials.iter()
    }

    pub fn read_mtl_file(path: &Path) -> AssetResult<Self> {
        let xml = std::fs::read_to_string(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let group = reader::parse_mtl(&xml, path)?;
        log::debug!(
            "Read {} materials from {}",
            group.material_count(),
            path.display()
        );
        Ok(group)
    }

    pub fn from_xml_str(xml: &str) -> AssetResult<Self> {
        reader::parse_mtl(xml, Path::new("<memory>"))
    }

    pub fn to_xml_string(&self) -> String {
        writer::generate_mtl_xml(self)
    }

    pub fn write_mtl_file(&self, path: &Path) -> AssetResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| AssetError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, self.to_xml_string()).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
