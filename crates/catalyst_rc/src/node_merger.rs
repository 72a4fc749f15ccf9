//! Collapses the real meshes of a container into one node.

use catalyst_assets::cgf::{CgfContent, CgfNode, CgfNodeType, Mesh, MeshFace};
use thiserror::Error;

pub const MERGED_NODE_NAME: &str = "Merged";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MergeError {
    #[error("Face {face} of node '{node}' uses subset {subset} but the merged mesh has {count}")]
    SubsetOutOfRange {
        node: String,
        face: usize,
        subset: usize,
        count: usize,
    },

    #[error("Merging node '{node}' needs {vertices} vertices, more than 32-bit indices can address")]
    TooManyVertices { node: String, vertices: usize },
}

/// Merges every real mesh into a single node placed first in the container.
///
/// The merged mesh takes its subset list from the first real mesh as is, so that list has to
/// cover every material index used by any face. Physics proxies and helpers are kept as
/// separate nodes after it.
pub fn merge_nodes(container: &mut CgfContent) -> Result<(), MergeError> {
    let (real, other): (Vec<CgfNode>, Vec<CgfNode>) = container
        .nodes()
        .iter()
        .cloned()
        .partition(|node| node.is_real_mesh());

    let Some(first) = real.first() else {
        log::debug!("Container '{}' has no mesh to merge", container.name);
        return Ok(());
    };

    let mut mesh = Mesh {
        subsets: first.mesh.as_ref().map(|m| m.subsets.clone()).unwrap_or_default(),
        ..Default::default()
    };
    let mut merged = CgfNode::new(MERGED_NODE_NAME, CgfNodeType::Mesh);
    merged.material = first.material.clone();

    for node in &real {
        let Some(source) = &node.mesh else {
            continue;
        };

        let base = vertex_offset(&node.name, mesh.positions.len(), source.positions.len())?;
        mesh.positions.extend_from_slice(&source.positions);

        for (i, face) in source.faces.iter().enumerate() {
            if face.subset >= mesh.subsets.len() {
                return Err(MergeError::SubsetOutOfRange {
                    node: node.name.clone(),
                    face: i,
                    subset: face.subset,
                    count: mesh.subsets.len(),
                });
            }
            mesh.faces.push(MeshFace {
                indices: face.indices.map(|index| index + base),
                subset: face.subset,
            });
        }
    }

    log::debug!(
        "Merged {} meshes of '{}' into {} faces",
        real.len(),
        container.name,
        mesh.face_count()
    );

    merged.mesh = Some(mesh);
    let mut nodes = Vec::with_capacity(other.len() + 1);
    nodes.push(merged);
    nodes.extend(other);
    container.replace_nodes(nodes);
    Ok(())
}

/// Index of the first vertex appended from `node`, provided the grown mesh stays addressable.
fn vertex_offset(node: &str, merged: usize, added: usize) -> Result<u32, MergeError> {
    let vertices = merged.saturating_add(added);
    u32::try_from(vertices)
        .and_then(|_| u32::try_from(merged))
        .map_err(|_| MergeError::TooManyVertices {
            node: node.to_string(),
            vertices,
        })
}

#[cfg(test)]
mod tests {
    use catalyst_assets::cgf::MeshSubset;
    use glam::Vec3;

    use super::*;

    fn mesh_node(name: &str, face_subsets: &[usize], subsets: usize) -> CgfNode {
        let mut node = CgfNode::new(name, CgfNodeType::Mesh);
        node.mesh = Some(Mesh {
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            faces: face_subsets
                .iter()
                .map(|&subset| MeshFace {
                    indices: [0, 1, 2],
                    subset,
                })
                .collect(),
            subsets: (0..subsets).map(MeshSubset::new).collect(),
        });
        node
    }

    #[test]
    fn merges_real_meshes_and_keeps_proxies() {
        let mut proxy = mesh_node("proxy", &[0], 1);
        proxy.physics_proxy = true;

        let mut container = CgfContent::new("ship");
        container.add_node(mesh_node("hull", &[0, 1], 3));
        container.add_node(proxy);
        container.add_node(mesh_node("turret", &[2], 1));

        merge_nodes(&mut container).unwrap();

        assert_eq!(container.node_count(), 2);
        let merged = container.node(0).unwrap();
        assert_eq!(merged.name, MERGED_NODE_NAME);
        let mesh = merged.mesh.as_ref().unwrap();
        assert_eq!(mesh.positions.len(), 6);
        assert_eq!(mesh.subset_count(), 3);
        assert_eq!(mesh.faces[2].indices, [3, 4, 5]);
        assert_eq!(mesh.faces[2].subset, 2);
        assert_eq!(container.node(1).unwrap().name, "proxy");
    }

    #[test]
    fn first_mesh_subsets_must_cover_every_face() {
        let mut container = CgfContent::new("ship");
        container.add_node(mesh_node("hull", &[0], 1));
        container.add_node(mesh_node("turret", &[1], 2));

        assert_eq!(
            merge_nodes(&mut container),
            Err(MergeError::SubsetOutOfRange {
                node: "turret".to_string(),
                face: 0,
                subset: 1,
                count: 1,
            })
        );
    }

    #[test]
    fn container_without_meshes_is_left_alone() {
        let mut container = CgfContent::new("ship");
        container.add_node(CgfNode::new("locator", CgfNodeType::Helper));

        merge_nodes(&mut container).unwrap();
        assert_eq!(container.node(0).unwrap().name, "locator");
    }

    #[test]
    fn vertex_offset_starts_after_merged_vertices() {
        assert_eq!(vertex_offset("turret", 6, 3), Ok(6));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn vertex_offset_rejects_meshes_past_32_bit_indices() {
        let merged = u32::MAX as usize;
        assert_eq!(
            vertex_offset("turret", merged, 1),
            Err(MergeError::TooManyVertices {
                node: "turret".to_string(),
                vertices: merged + 1,
            })
        );
    }
}
