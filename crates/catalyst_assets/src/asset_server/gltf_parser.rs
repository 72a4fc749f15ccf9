use std::path::Path;

use glam::Vec3;

use crate::{
    error::{AssetError, AssetResult},
    material::MaterialData,
    physics::PhysicsExtras,
    scene::{MeshData, NodeContent, NodeIndex, Scene, SceneFace, SceneGraph},
};

pub fn parse_gltf(path: &Path) -> AssetResult<Scene> {
    // A. Load Document & Buffers
    let (document, buffers, _images) = gltf::import(path)?;
    build_scene(&document, &buffers, path)
}

pub fn parse_gltf_slice(bytes: &[u8], source_path: &Path) -> AssetResult<Scene> {
    let (document, buffers, _images) = gltf::import_slice(bytes)?;
    build_scene(&document, &buffers, source_path)
}

fn build_scene(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    path: &Path,
) -> AssetResult<Scene> {
    let mut graph = SceneGraph::new();
    let root = graph.root();

    // --- STEP 1: ROOTS ---
    // The default scene when there is one, otherwise every parentless node.
    let roots: Vec<gltf::Node> = match document.default_scene().or_else(|| document.scenes().next()) {
        Some(scene) => scene.nodes().collect(),
        None => {
            let mut has_parent = vec![false; document.nodes().count()];
            for node in document.nodes() {
                for child in node.children() {
                    has_parent[child.index()] = true;
                }
            }
            document
                .nodes()
                .filter(|n| !has_parent[n.index()])
                .collect()
        }
    };

    // --- STEP 2: NODES (The Hierarchy) ---
    for node in roots {
        add_node(&mut graph, root, &node, buffers)?;
    }

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "scene".to_string());

    log::debug!("Imported {} scene nodes from {}", graph.len(), path.display());
    Ok(Scene::new(name, path, graph))
}

fn add_node(
    graph: &mut SceneGraph,
    parent: NodeIndex,
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
) -> AssetResult<()> {
    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Node_{}", node.index()));

    let (content, materials) = match node.mesh() {
        Some(mesh) => {
            let (data, materials) = read_mesh(&mesh, buffers)?;
            (NodeContent::Mesh(data), materials)
        }
        None => (NodeContent::Empty, Vec::new()),
    };

    let index = graph.add_child(parent, name, content);

    if let Some(raw) = node.extras() {
        if let Some(node_data) = graph.node_mut(index) {
            node_data.physics = PhysicsExtras::from_extras_json(raw.get());
        }
    }

    // Materials hang below the mesh as end points, in first-use order
    for (material_name, data) in materials {
        graph.add_end_point(index, material_name, NodeContent::Material(data));
    }

    for child in node.children() {
        add_node(graph, index, &child, buffers)?;
    }
    Ok(())
}

fn read_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
) -> AssetResult<(MeshData, Vec<(String, MaterialData)>)> {
    let mut data = MeshData::default();
    let mut materials: Vec<(String, MaterialData)> = Vec::new();

    for primitive in mesh.primitives() {
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        let Some(positions) = reader.read_positions() else {
            log::warn!("Skipping primitive without positions in mesh {:?}", mesh.name());
            continue;
        };

        let before = data.positions.len();
        data.positions.extend(positions.map(Vec3::from));
        let (base, count) = vertex_range(mesh, before, data.positions.len())?;

        let indices: Vec<u32> = reader
            .read_indices()
            .map(|read| read.into_u32().collect())
            .unwrap_or_else(|| (0..count).collect());

        // Primitives without a material share the first slot
        let material_slot = match primitive.material().index() {
            Some(_) => {
                let material = primitive.material();
                let name = material
                    .name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("Material_{}", material.index().unwrap_or(0)));
                match materials.iter().position(|(n, _)| *n == name) {
                    Some(slot) => slot,
                    None => {
                        materials.push((name, material_data(&material)));
                        materials.len() - 1
                    }
                }
            }
            None => 0,
        };

        for tri in indices.chunks_exact(3) {
            data.faces.push(SceneFace {
                indices: [base + tri[0], base + tri[1], base + tri[2]],
                material_slot,
            });
        }
    }

    Ok((data, materials))
}

/// First index and vertex count of a primitive occupying `before..after` in the mesh.
fn vertex_range(mesh: &gltf::Mesh, before: usize, after: usize) -> AssetResult<(u32, u32)> {
    checked_vertex_range(before, after).ok_or_else(|| AssetError::MeshTooLarge {
        mesh: mesh
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("Mesh_{}", mesh.index())),
        vertices: after,
    })
}

fn checked_vertex_range(before: usize, after: usize) -> Option<(u32, u32)> {
    let end = u32::try_from(after).ok()?;
    let base = u32::try_from(before).ok()?;
    Some((base, end.checked_sub(base)?))
}

fn texture_uri(texture: gltf::Texture) -> Option<String> {
    match texture.source().source() {
        gltf::image::Source::Uri { uri, .. } => Some(uri.to_string()),
        gltf::image::Source::View { .. } => None,
    }
}

fn material_data(material: &gltf::Material) -> MaterialData {
    let pbr = material.pbr_metallic_roughness();

    MaterialData {
        base_color: pbr.base_color_factor(),
        roughness: pbr.roughness_factor(),
        metallic: pbr.metallic_factor(),
        diffuse_texture: pbr.base_color_texture().and_then(|info| texture_uri(info.texture())),
        normal_texture: material.normal_texture().and_then(|info| texture_uri(info.texture())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalyst_core::PhysicalizeType;

    // Two triangles over one buffer: 4 positions (48 bytes) followed by 6 u16 indices (12 bytes)
    const BUFFER: &str = "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAACAPwAAgD8AAAAAAAABAAIAAQADAAIA";

    fn document() -> String {
        format!(
            r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [ {{ "nodes": [0, 2] }} ],
  "nodes": [
    {{ "name": "hull", "mesh": 0, "children": [1] }},
    {{ "name": "turret" }},
    {{ "name": "hull_proxy", "mesh": 1, "extras": {{ "physicalize": "default_proxy" }} }}
  ],
  "materials": [ {{ "name": "metal" }}, {{ "name": "glass" }} ],
  "meshes": [
    {{ "primitives": [
        {{ "attributes": {{ "POSITION": 0 }}, "indices": 1, "material": 1 }},
        {{ "attributes": {{ "POSITION": 0 }}, "indices": 1, "material": 0 }},
        {{ "attributes": {{ "POSITION": 0 }}, "indices": 1, "material": 1 }}
    ] }},
    {{ "primitives": [ {{ "attributes": {{ "POSITION": 0 }}, "indices": 1 }} ] }}
  ],
  "accessors": [
    {{ "bufferView": 0, "componentType": 5126, "count": 4, "type": "VEC3",
       "min": [0, 0, 0], "max": [1, 1, 0] }},
    {{ "bufferView": 1, "componentType": 5123, "count": 6, "type": "SCALAR" }}
  ],
  "bufferViews": [
    {{ "buffer": 0, "byteOffset": 0, "byteLength": 48 }},
    {{ "buffer": 0, "byteOffset": 48, "byteLength": 12 }}
  ],
  "buffers": [ {{ "byteLength": 60, "uri": "{BUFFER}" }} ]
}}"#
        )
    }

    fn scene() -> Scene {
        parse_gltf_slice(document().as_bytes(), Path::new("/game/objects/ship.gltf")).unwrap()
    }

    #[test]
    fn builds_hierarchy_from_default_scene() {
        let scene = scene();
        assert_eq!(scene.name, "ship");

        let graph = &scene.graph;
        let hull = graph.find("hull").unwrap();
        let turret = graph.find("turret").unwrap();
        assert_eq!(graph.node(turret).unwrap().parent, Some(hull));
        assert_eq!(graph.node(hull).unwrap().parent, Some(graph.root()));
    }

    #[test]
    fn materials_become_end_points_in_first_use_order() {
        let scene = scene();
        let graph = &scene.graph;
        let hull = graph.find("hull").unwrap();

        let names: Vec<&str> = graph.material_children(hull).map(|(n, _)| n).collect();
        assert_eq!(names, vec!["glass", "metal"]);

        let mesh = graph.node(hull).unwrap().mesh().unwrap();
        assert_eq!(mesh.positions.len(), 12);
        assert_eq!(mesh.faces.len(), 6);
        let slots: Vec<usize> = mesh.faces.iter().map(|f| f.material_slot).collect();
        assert_eq!(slots, vec![0, 0, 1, 1, 0, 0]);
        // Second primitive is offset past the first one's vertices
        assert_eq!(mesh.faces[2].indices, [4, 5, 6]);
    }

    #[test]
    fn node_extras_carry_physicalization() {
        let scene = scene();
        let graph = &scene.graph;
        let proxy = graph.find("hull_proxy").unwrap();

        let physics = graph.node(proxy).unwrap().physics.as_ref().unwrap();
        assert_eq!(physics.physicalize, Some(PhysicalizeType::DefaultProxy));
        assert_eq!(graph.material_children(proxy).count(), 0);
    }

    #[test]
    fn vertex_range_covers_the_appended_primitive() {
        assert_eq!(checked_vertex_range(4, 12), Some((4, 8)));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn vertex_range_rejects_meshes_past_32_bit_indices() {
        let limit = u32::MAX as usize;
        assert_eq!(checked_vertex_range(0, limit), Some((0, u32::MAX)));
        assert_eq!(checked_vertex_range(limit - 2, limit + 1), None);
    }
}
