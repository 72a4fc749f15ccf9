use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::{Material, MaterialGroup, MaterialTexture};
use crate::error::{AssetError, AssetResult};

fn malformed(path: &Path, details: impl Into<String>) -> AssetError {
    AssetError::Mtl {
        path: path.to_path_buf(),
        details: details.into(),
    }
}

fn parse_color(value: &str, path: &Path) -> AssetResult<[f32; 3]> {
    let parts: Vec<f32> = value
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .map_err(|e| malformed(path, format!("bad color '{}': {}", value, e)))?;

    match parts.as_slice() {
        [r, g, b] => Ok([*r, *g, *b]),
        _ => Err(malformed(path, format!("expected 3 color channels in '{}'", value))),
    }
}

fn parse_material(e: &BytesStart, path: &Path) -> AssetResult<Material> {
    let mut material = Material::new("");

    for attr in e.attributes().flatten() {
        let value = attr
            .unescape_value()
            .map_err(|err| malformed(path, err.to_string()))?;
        let value = value.as_ref();

        match attr.key.local_name().as_ref() {
            b"Name" => material.name = value.to_string(),
            b"MtlFlags" => {
                material.flags = value
                    .parse()
                    .map_err(|_| malformed(path, format!("bad MtlFlags '{}'", value)))?
            }
            b"Shader" => material.shader = value.to_string(),
            b"SurfaceType" => material.surface_type = value.to_string(),
            b"Diffuse" => material.diffuse = parse_color(value, path)?,
            b"Specular" => material.specular = parse_color(value, path)?,
            b"Opacity" => {
                material.opacity = value
                    .parse()
                    .map_err(|_| malformed(path, format!("bad Opacity '{}'", value)))?
            }
            b"Shininess" => {
                material.shininess = value
                    .parse()
                    .map_err(|_| malformed(path, format!("bad Shininess '{}'", value)))?
            }
            _ => {}
        }
    }

    Ok(material)
}

fn parse_texture(e: &BytesStart, path: &Path) -> AssetResult<MaterialTexture> {
    let mut texture = MaterialTexture {
        map: String::new(),
        file: String::new(),
    };

    for attr in e.attributes().flatten() {
        let value = attr
            .unescape_value()
            .map_err(|err| malformed(path, err.to_string()))?;
        match attr.key.local_name().as_ref() {
            b"Map" => texture.map = value.into_owned(),
            b"File" => texture.file = value.into_owned(),
            _ => {}
        }
    }

    Ok(texture)
}

struct MtlParser<'p> {
    path: &'p Path,
    stack: Vec<Vec<u8>>,
    root: Option<Material>,
    has_sub_materials: bool,
    group: MaterialGroup,
}

impl MtlParser<'_> {
    fn parent_is(&self, name: &[u8]) -> bool {
        self.stack.last().is_some_and(|p| p.as_slice() == name)
    }

    fn inside(&self, name: &[u8]) -> bool {
        self.stack.iter().any(|p| p.as_slice() == name)
    }

    fn element(&mut self, e: &BytesStart) -> AssetResult<()> {
        match e.local_name().as_ref() {
            b"Material" if self.stack.is_empty() => {
                let root = parse_material(e, self.path)?;
                self.group.flags = root.flags;
                self.root = Some(root);
            }
            b"Material" if self.parent_is(b"SubMaterials") => {
                let material = parse_material(e, self.path)?;
                if material.name.is_empty() {
                    return Err(malformed(self.path, "sub-material without a name"));
                }
                self.group.add_material(material)?;
            }
            b"SubMaterials" if self.stack.len() == 1 => self.has_sub_materials = true,
            b"Texture" if self.parent_is(b"Textures") => {
                let texture = parse_texture(e, self.path)?;
                let target = if self.inside(b"SubMaterials") {
                    self.group.materials.last_mut()
                } else {
                    self.root.as_mut()
                };
                if let Some(material) = target {
                    material.textures.push(texture);
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(mut self) -> AssetResult<MaterialGroup> {
        let Some(root) = self.root.take() else {
            return Err(malformed(self.path, "no <Material> element"));
        };

        // A file without sub-materials describes exactly one material
        if !self.has_sub_materials {
            if root.name.is_empty() {
                return Err(malformed(self.path, "single material without a name"));
            }
            self.group.add_material(root)?;
        }

        Ok(self.group)
    }
}

pub(super) fn parse_mtl(xml: &str, path: &Path) -> AssetResult<MaterialGroup> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut parser = MtlParser {
        path,
        stack: Vec::new(),
        root: None,
        has_sub_materials: false,
        group: MaterialGroup::new(),
    };

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                parser.element(e)?;
                parser.stack.push(e.local_name().as_ref().to_vec());
            }
            Ok(Event::Empty(ref e)) => parser.element(e)?,
            Ok(Event::End(_)) => {
                parser.stack.pop();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(malformed(
                    path,
                    format!(
                        "XML error at position {}: {}",
                        reader.buffer_position(),
                        e
                    ),
                ));
            }
            _ => {}
        }
    }

    parser.finish()
}
