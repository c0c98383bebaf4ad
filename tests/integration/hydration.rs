//! Hydrating complex and primitive tasks with per-frame tensors.

use oakink2_toolkit::dataset::slice_primitive_task;
use oakink2_toolkit::{Error, TaskSelector};

use crate::fixtures::{default_blob, TestDataset, SEQ};

#[test]
fn test_complex_task_tensors() {
    let fixture = TestDataset::new();
    let dataset = fixture.open();
    let mut task = dataset.load_complex_task(SEQ, false).unwrap();
    dataset.instantiate_complex_task(&mut task).unwrap();

    let data = task.data().unwrap();
    assert_eq!(data.frames.len(), 30);
    assert_eq!(data.frames.frame_ids()[0], 0);
    assert_eq!(data.smplx_param["body_pose"].shape(), &[30, 2]);
    // Rows follow ascending frame ids even though the blob lists them reversed.
    assert_eq!(data.smplx_param["body_pose"][[7, 1]], 14.0);
    assert_eq!(data.lh_param["hand_pose"][[3, 0]], 103.0);
    assert_eq!(data.rh_param["hand_pose"][[3, 0]], -3.0);
    assert_eq!(data.obj_transf["O2"].shape(), &[30, 4, 4]);
    assert_eq!(data.obj_transf["O2"][[5, 0, 3]], 5.0);
    assert_eq!(data.obj_transf["O2"][[5, 1, 3]], 1.0);
}

#[test]
fn test_left_hand_window_is_padded_and_masked() {
    let fixture = TestDataset::new();
    let dataset = fixture.open();
    let mut complex = dataset.load_complex_task(SEQ, false).unwrap();
    let pour = dataset.load_primitive_task(&mut complex, "pour", true).unwrap();
    assert!(complex.is_instantiated());

    let data = pour.data().unwrap();
    assert_eq!(data.smplx_param["body_pose"].shape(), &[10, 2]);
    assert_eq!(data.smplx_param["body_pose"][[9, 0]], 9.0);

    let lh = &data.lh_param["hand_pose"];
    assert_eq!(lh.shape(), &[10, 1]);
    let expected_mask: Vec<bool> = (0..10).map(|i| (2..8).contains(&i)).collect();
    assert_eq!(data.lh_in_range_mask.to_vec(), expected_mask);
    assert_eq!(lh[[0, 0]], 0.0);
    assert_eq!(lh[[1, 0]], 0.0);
    assert_eq!(lh[[2, 0]], 102.0);
    assert_eq!(lh[[7, 0]], 107.0);
    assert_eq!(lh[[8, 0]], 0.0);

    // No right-hand window: zeros over the whole range, nothing in range.
    let rh = &data.rh_param["hand_pose"];
    assert_eq!(rh.shape(), &[10, 1]);
    assert!(rh.iter().all(|v| *v == 0.0));
    assert!(data.rh_in_range_mask.iter().all(|m| !m));
}

#[test]
fn test_hand_windows_overhanging_whole_range_are_clipped() {
    let fixture = TestDataset::new();
    let dataset = fixture.open();
    let mut complex = dataset.load_complex_task(SEQ, true).unwrap();
    let mut task = dataset.load_primitive_task(&mut complex, "pour", false).unwrap();
    task.frame_range_def = "((2, 6), (0, 4), (5, 9))".parse().unwrap();
    slice_primitive_task(&mut task, &complex).unwrap();

    let data = task.data().unwrap();
    assert_eq!(data.smplx_param["body_pose"].shape(), &[4, 2]);
    assert_eq!(data.smplx_param["body_pose"].row(0).to_vec(), vec![2.0, 4.0]);

    // Left window starts before the task: frames 2 and 3 survive, padded right.
    assert_eq!(data.lh_in_range_mask.to_vec(), vec![true, true, false, false]);
    let lh = &data.lh_param["hand_pose"];
    assert_eq!(lh.shape(), &[4, 1]);
    assert_eq!(lh.column(0).to_vec(), vec![102.0, 103.0, 0.0, 0.0]);

    // Right window runs past the task: only frame 5 survives, padded left.
    assert_eq!(data.rh_in_range_mask.to_vec(), vec![false, false, false, true]);
    let rh = &data.rh_param["hand_pose"];
    assert_eq!(rh.shape(), &[4, 1]);
    assert_eq!(rh.column(0).to_vec(), vec![0.0, 0.0, 0.0, -5.0]);
}

#[test]
fn test_object_lists_are_pruned_to_known_objects() {
    let fixture = TestDataset::new();
    let dataset = fixture.open();
    let mut complex = dataset.load_complex_task(SEQ, false).unwrap();
    let again = dataset.load_primitive_task(&mut complex, "pour#1", true).unwrap();

    assert_eq!(again.task_obj_list, vec!["O2"]);
    assert_eq!(again.rh_obj_list, Some(vec!["O2".to_string()]));
    assert_eq!(again.lh_obj_list, None);

    let data = again.data().unwrap();
    assert_eq!(data.obj_transf.keys().collect::<Vec<_>>(), vec!["O2"]);
    assert_eq!(data.obj_transf["O2"].shape(), &[10, 4, 4]);
    assert_eq!(data.obj_transf["O2"][[0, 0, 3]], 14.0);

    let expected_mask: Vec<bool> = (14..24).map(|f| (16..22).contains(&f)).collect();
    assert_eq!(data.rh_in_range_mask.to_vec(), expected_mask);
    assert_eq!(data.rh_param["hand_pose"][[2, 0]], -16.0);
    assert!(data.lh_in_range_mask.iter().all(|m| !m));
}

#[test]
fn test_hydration_is_idempotent() {
    let fixture = TestDataset::new();
    let dataset = fixture.open();
    let mut complex = dataset.load_complex_task(SEQ, true).unwrap();
    let before = complex.clone();
    dataset.instantiate_complex_task(&mut complex).unwrap();
    assert_eq!(complex, before);

    let mut place = dataset.load_primitive_task(&mut complex, "place", true).unwrap();
    let place_before = place.clone();
    dataset
        .instantiate_primitive_task(&mut place, Some(&mut complex))
        .unwrap();
    dataset.instantiate_primitive_task(&mut place, None).unwrap();
    assert_eq!(place, place_before);

    let mut aff_dataset = fixture.open();
    let mut mug = aff_dataset.load_affordance("O1", true).unwrap();
    let mug_before = mug.clone();
    aff_dataset.instantiate_affordance(&mut mug).unwrap();
    assert_eq!(mug, mug_before);
    assert_eq!(aff_dataset.mesh_cache().misses(), 1);
}

#[test]
fn test_primitive_without_parent_loads_sequence() {
    let fixture = TestDataset::new();
    let dataset = fixture.open();
    let mut complex = dataset.load_complex_task(SEQ, false).unwrap();
    let mut place = dataset.load_primitive_task(&mut complex, "place", false).unwrap();

    dataset.instantiate_primitive_task(&mut place, None).unwrap();
    assert!(place.is_instantiated());
    assert!(!complex.is_instantiated());
    assert_eq!(place.data().unwrap().lh_in_range_mask.len(), 6);
}

#[test]
fn test_parent_is_hydrated_in_place() {
    let fixture = TestDataset::new();
    let dataset = fixture.open();
    let mut complex = dataset.load_complex_task(SEQ, false).unwrap();
    let mut tasks = dataset
        .load_primitive_tasks(&mut complex, TaskSelector::All, false)
        .unwrap();

    dataset
        .instantiate_primitive_task(&mut tasks[0], Some(&mut complex))
        .unwrap();
    assert!(complex.is_instantiated());
    assert_eq!(complex.frame_range, Some((0, 29)));

    for task in &mut tasks[1..] {
        slice_primitive_task(task, &complex).unwrap();
    }
    assert!(tasks.iter().all(|t| t.is_instantiated()));
    assert!(tasks
        .iter()
        .all(|t| t.scene_obj_list == complex.scene_obj_list));
}

#[test]
fn test_slice_requires_hydrated_parent() {
    let fixture = TestDataset::new();
    let dataset = fixture.open();
    let mut complex = dataset.load_complex_task(SEQ, false).unwrap();
    let mut pour = dataset.load_primitive_task(&mut complex, "pour", false).unwrap();

    let err = slice_primitive_task(&mut pour, &complex).unwrap_err();
    assert!(matches!(err, Error::MissingEntry { .. }));
    assert!(!pour.is_instantiated());
}

#[test]
fn test_unrecorded_frame_fails_without_hydrating() {
    let fixture = TestDataset::new();
    let mut blob = default_blob();
    // Drop frame 5, which lies inside the first task.
    blob.mocap_frame_id_list.retain(|f| *f != 5);
    fixture.write_annotation(&blob);

    let dataset = fixture.open();
    let mut complex = dataset.load_complex_task(SEQ, true).unwrap();
    let err = dataset
        .load_primitive_task(&mut complex, "pour", true)
        .unwrap_err();
    assert!(matches!(err, Error::FrameNotRecorded { frame: 5, .. }));

    let mut pour = dataset.load_primitive_task(&mut complex, "pour", false).unwrap();
    assert!(dataset
        .instantiate_primitive_task(&mut pour, Some(&mut complex))
        .is_err());
    assert!(!pour.is_instantiated());
}

#[test]
fn test_empty_sequence_is_an_error() {
    let fixture = TestDataset::new();
    fixture.write_annotation(&oakink2_toolkit::storage::AnnotationBlob::default());
    let dataset = fixture.open();
    let mut complex = dataset.load_complex_task(SEQ, false).unwrap();
    let err = dataset.instantiate_complex_task(&mut complex).unwrap_err();
    assert!(matches!(err, Error::EmptySequence(_)));
    assert!(!complex.is_instantiated());
}
