use quick_xml::escape::escape;

use super::{Material, MaterialGroup};

fn color(c: &[f32; 3]) -> String {
    format!("{},{},{}", c[0], c[1], c[2])
}

fn push_material(xml: &mut String, material: &Material, indent: &str) {
    xml.push_str(&format!(
        "{indent}<Material Name=\"{}\" MtlFlags=\"{}\" Shader=\"{}\" SurfaceType=\"{}\" Diffuse=\"{}\" Specular=\"{}\" Opacity=\"{}\" Shininess=\"{}\"",
        escape(material.name.as_str()),
        material.flags,
        escape(material.shader.as_str()),
        escape(material.surface_type.as_str()),
        color(&material.diffuse),
        color(&material.specular),
        material.opacity,
        material.shininess,
    ));

    if material.textures.is_empty() {
        xml.push_str("/>\n");
        return;
    }

    xml.push_str(">\n");
    xml.push_str(&format!("{indent} <Textures>\n"));
    for texture in &material.textures {
        xml.push_str(&format!(
            "{indent}  <Texture Map=\"{}\" File=\"{}\"/>\n",
            escape(texture.map.as_str()),
            escape(texture.file.as_str()),
        ));
    }
    xml.push_str(&format!("{indent} </Textures>\n"));
    xml.push_str(&format!("{indent}</Material>\n"));
}

/// Multi-material layout: one root `<Material>` whose `<SubMaterials>` hold
/// the group in index order.
pub(super) fn generate_mtl_xml(group: &MaterialGroup) -> String {
    let mut xml = String::with_capacity(128 + group.material_count() * 200);

    xml.push_str(&format!("<Material MtlFlags=\"{}\">\n", group.flags));
    xml.push_str(" <SubMaterials>\n");
    for material in group.iter() {
        push_material(&mut xml, material, "  ");
    }
    xml.push_str(" </SubMaterials>\n");
    xml.push_str("</Material>\n");

    xml
}
