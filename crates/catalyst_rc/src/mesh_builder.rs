use catalyst_assets::{
    NodeIndex, Scene,
    cgf::{CgfNode, CgfNodeType, Mesh, MeshFace, MeshSubset},
    scene::MeshData,
};
use catalyst_core::{MeshGroup, PhysicalizeType};

use crate::error::{RcError, RcResult};

pub struct BuiltNode {
    pub node: CgfNode,
    pub physicalize_type: PhysicalizeType,
}

/// Compiles one scene node. Material references stay local to the node: faces carry the
/// node's material slot and there is one identity subset per slot.
pub fn build_node(scene: &Scene, group: &MeshGroup, index: NodeIndex) -> RcResult<Option<BuiltNode>> {
    let graph = &scene.graph;
    let Some(source) = graph.node(index) else {
        return Ok(None);
    };

    let physicalize_type = graph.physicalize_type(index, group);
    let node_type = match source.mesh() {
        Some(_) => CgfNodeType::Mesh,
        None => CgfNodeType::Helper,
    };

    let mut node = CgfNode::new(source.name.clone(), node_type);
    node.physics_proxy = physicalize_type.is_default_proxy();

    if let Some(data) = source.mesh() {
        // Proxies are drawn with a single material whatever was authored
        let slot_count = if node.physics_proxy {
            1
        } else {
            graph.material_children(index).count().max(1)
        };
        node.mesh = Some(build_mesh(&source.name, data, slot_count, node.physics_proxy)?);
    }

    log::debug!(
        "Built node '{}' ({:?}, {:?})",
        node.name,
        node.node_type,
        physicalize_type
    );
    Ok(Some(BuiltNode {
        node,
        physicalize_type,
    }))
}

fn build_mesh(name: &str, data: &MeshData, slot_count: usize, single_slot: bool) -> RcResult<Mesh> {
    let mut faces = Vec::with_capacity(data.faces.len());
    for (i, face) in data.faces.iter().enumerate() {
        let subset = if single_slot { 0 } else { face.material_slot };
        if subset >= slot_count {
            return Err(RcError::InvalidMesh {
                node: name.to_string(),
                face: i,
                slot: subset,
                count: slot_count,
            });
        }
        faces.push(MeshFace {
            indices: face.indices,
            subset,
        });
    }

    Ok(Mesh {
        positions: data.positions.clone(),
        faces,
        subsets: (0..slot_count).map(MeshSubset::new).collect(),
    })
}

#[cfg(test)]
mod tests {
    use catalyst_assets::{
        SceneGraph,
        material::MaterialData,
        scene::{NodeContent, SceneFace},
    };
    use catalyst_core::Rule;
    use glam::Vec3;

    use super::*;

    fn mesh_data(slots: &[usize]) -> MeshData {
        MeshData {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            faces: slots
                .iter()
                .map(|&material_slot| SceneFace {
                    indices: [0, 1, 2],
                    material_slot,
                })
                .collect(),
        }
    }

    fn scene(slots: &[usize], materials: &[&str]) -> (Scene, NodeIndex) {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let hull = graph.add_child(root, "hull", NodeContent::Mesh(mesh_data(slots)));
        for name in materials {
            graph.add_end_point(hull, *name, NodeContent::Material(MaterialData::default()));
        }
        (Scene::new("ship", "ship.gltf", graph), hull)
    }

    #[test]
    fn one_identity_subset_per_material_slot() {
        let (scene, hull) = scene(&[0, 1, 1], &["glass", "metal"]);
        let built = build_node(&scene, &MeshGroup::new("ship"), hull).unwrap().unwrap();

        let mesh = built.node.mesh.unwrap();
        let ids: Vec<usize> = mesh.subsets.iter().map(|s| s.mat_id).collect();
        let faces: Vec<usize> = mesh.faces.iter().map(|f| f.subset).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(faces, vec![0, 1, 1]);
        assert_eq!(built.node.node_type, CgfNodeType::Mesh);
        assert_eq!(built.physicalize_type, PhysicalizeType::None);
    }

    #[test]
    fn node_without_materials_gets_one_subset() {
        let (scene, hull) = scene(&[0], &[]);
        let built = build_node(&scene, &MeshGroup::new("ship"), hull).unwrap().unwrap();
        assert_eq!(built.node.mesh.unwrap().subset_count(), 1);
    }

    #[test]
    fn proxies_collapse_to_a_single_slot() {
        let (scene, hull) = scene(&[0, 1], &["glass", "metal"]);
        let group = MeshGroup::new("ship").with_rule(Rule::PhysicsProxy {
            nodes: vec!["hull".to_string()],
        });

        let built = build_node(&scene, &group, hull).unwrap().unwrap();
        assert!(built.node.physics_proxy);
        assert!(!built.node.is_real_mesh());
        assert_eq!(built.physicalize_type, PhysicalizeType::DefaultProxy);

        let mesh = built.node.mesh.unwrap();
        assert_eq!(mesh.subset_count(), 1);
        assert!(mesh.faces.iter().all(|f| f.subset == 0));
    }

    #[test]
    fn slot_without_material_is_rejected() {
        let (scene, hull) = scene(&[0, 2], &["glass", "metal"]);
        let result = build_node(&scene, &MeshGroup::new("ship"), hull);
        assert!(matches!(
            result,
            Err(RcError::InvalidMesh { face: 1, slot: 2, count: 2, .. })
        ));
    }

    #[test]
    fn empty_nodes_become_helpers() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let locator = graph.add_child(root, "locator", NodeContent::Empty);
        let scene = Scene::new("ship", "ship.gltf", graph);

        let built = build_node(&scene, &MeshGroup::new("ship"), locator).unwrap().unwrap();
        assert_eq!(built.node.node_type, CgfNodeType::Helper);
        assert!(built.node.mesh.is_none());
    }
}
