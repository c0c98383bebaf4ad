//! Object and part affordances, part trees, and mesh caching.

use std::sync::Arc;

use oakink2_toolkit::mesh::MeshDecoder;
use oakink2_toolkit::{AffordanceMesh, Error, Mesh};

use crate::fixtures::TestDataset;

#[test]
fn test_whole_object_affordance() {
    let fixture = TestDataset::new();
    let mut dataset = fixture.open();
    let mug = dataset.load_affordance("O1", false).unwrap();

    assert_eq!(mug.obj_name, "mug");
    assert!(mug.has_model);
    assert_eq!(mug.obj_instance_id, "O1");
    assert!(mug.is_part());
    assert_eq!(mug.affordance_list, vec!["contain"]);
    assert_eq!(mug.affordance_instantiation_list, vec!["contain_water"]);
    assert!(!mug.is_instantiated());
    assert!(dataset.mesh_cache().is_empty());
}

#[test]
fn test_part_resolves_to_instance_root() {
    let fixture = TestDataset::new();
    let mut dataset = fixture.open();
    let handle = dataset.load_affordance("P1", false).unwrap();

    assert_eq!(handle.obj_name, "kettle handle");
    assert_eq!(handle.obj_instance_id, "O2");
    assert!(handle.is_part());
    assert_eq!(dataset.part_tree().parent_of("P1"), Some("O2"));
    assert_eq!(dataset.part_tree().root_of("P2"), "O2");
}

#[test]
fn test_object_without_model_hydrates_parts() {
    let fixture = TestDataset::new();
    let mut dataset = fixture.open();
    let kettle = dataset.load_affordance("O2", true).unwrap();

    assert!(!kettle.has_model);
    assert!(!kettle.is_part());
    assert_eq!(kettle.obj_part_id, vec!["P1", "P2"]);
    match kettle.mesh() {
        Some(AffordanceMesh::Parts(parts)) => {
            assert_eq!(parts.keys().collect::<Vec<_>>(), vec!["P1", "P2"]);
            assert_eq!(parts["P1"].face_count(), 1);
            // The quad is fan-triangulated.
            assert_eq!(parts["P2"].face_count(), 2);
        }
        other => panic!("expected part meshes, got {:?}", other),
    }
}

#[test]
fn test_load_affordance_part_expands_parents() {
    let fixture = TestDataset::new();
    let mut dataset = fixture.open();

    let kettle = dataset.load_affordance("O2", false).unwrap();
    let parts = dataset.load_affordance_part(kettle, true).unwrap();
    let ids: Vec<&str> = parts.iter().map(|p| p.obj_id.as_str()).collect();
    assert_eq!(ids, vec!["P1", "P2"]);
    assert!(parts.iter().all(|p| p.is_instantiated()));
    assert!(parts.iter().all(|p| p.obj_instance_id == "O2"));

    let mug = dataset.load_affordance("O1", false).unwrap();
    let itself = dataset.load_affordance_part(mug, false).unwrap();
    assert_eq!(itself.len(), 1);
    assert_eq!(itself[0].obj_id, "O1");
    assert!(!itself[0].is_instantiated());
}

#[test]
fn test_mesh_cache_is_shared_across_records() {
    let fixture = TestDataset::new();
    let mut dataset = fixture.open();

    let first = dataset.load_affordance("P1", true).unwrap();
    let second = dataset.load_affordance("P1", true).unwrap();
    let kettle = dataset.load_affordance("O2", true).unwrap();

    let cache = dataset.mesh_cache();
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.misses(), 2);
    assert_eq!(cache.hits(), 2);

    let single = |aff: &oakink2_toolkit::Affordance| match aff.mesh() {
        Some(AffordanceMesh::Single(mesh)) => Arc::clone(mesh),
        other => panic!("expected a single mesh, got {:?}", other),
    };
    assert!(Arc::ptr_eq(&single(&first), &single(&second)));
    match kettle.mesh() {
        Some(AffordanceMesh::Parts(parts)) => {
            assert!(Arc::ptr_eq(&parts["P1"], &single(&first)));
        }
        other => panic!("expected part meshes, got {:?}", other),
    }

    dataset.mesh_cache_mut().clear();
    assert!(dataset.mesh_cache().is_empty());
}

#[derive(Debug)]
struct PointDecoder;

impl MeshDecoder for PointDecoder {
    fn decode(&self, _path: &std::path::Path) -> oakink2_toolkit::Result<Mesh> {
        Ok(Mesh {
            vertices: vec![[0.0, 0.0, 0.0]],
            faces: Vec::new(),
        })
    }
}

#[test]
fn test_custom_mesh_decoder() {
    let fixture = TestDataset::new();
    let mut dataset = fixture.open().with_mesh_decoder(Box::new(PointDecoder));
    let mug = dataset.load_affordance("O1", true).unwrap();
    match mug.mesh() {
        Some(AffordanceMesh::Single(mesh)) => assert_eq!(mesh.vertex_count(), 1),
        other => panic!("expected a single mesh, got {:?}", other),
    }
}

#[test]
fn test_ply_model_is_hydrated_by_default() {
    let fixture = TestDataset::new();
    fixture.remove("object_raw/align_ds/O1/model.obj");
    fixture.write_file(
        "object_raw/align_ds/O1/model.ply",
        "ply\nformat ascii 1.0\nelement vertex 4\nproperty float x\nproperty float y\n\
         property float z\nelement face 1\nproperty list uchar int vertex_indices\n\
         end_header\n0 0 0\n1 0 0\n1 1 0\n0 1 0\n4 0 1 2 3\n",
    );
    let mut dataset = fixture.open();
    let mug = dataset.load_affordance("O1", true).unwrap();
    match mug.mesh() {
        Some(AffordanceMesh::Single(mesh)) => {
            assert_eq!(mesh.vertex_count(), 4);
            assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
        }
        other => panic!("expected a single mesh, got {:?}", other),
    }
}

#[test]
fn test_ambiguous_model_directory() {
    let fixture = TestDataset::new();
    fixture.write_file("object_raw/align_ds/O1/model_v2.obj", "v 0 0 0\n");
    let mut dataset = fixture.open();

    let err = dataset.load_affordance("O1", true).unwrap_err();
    assert!(matches!(err, Error::MeshSource { found: 2, .. }));

    let mut mug = dataset.load_affordance("O1", false).unwrap();
    assert!(dataset.instantiate_affordance(&mut mug).is_err());
    assert!(!mug.is_instantiated());
    assert!(dataset.mesh_cache().is_empty());
}

#[test]
fn test_unknown_object() {
    let fixture = TestDataset::new();
    let mut dataset = fixture.open();
    let err = dataset.load_affordance("O404", false).unwrap_err();
    assert!(matches!(err, Error::ObjectNotFound(_)));
}
