//! Task assembly from program metadata.

use oakink2_toolkit::{FrameRangeDef, HandInvolved, TaskSelector, TransientPrimitives};

use crate::fixtures::{TestDataset, APPROACH, PLACE, POUR, POUR_AGAIN, SEQ, SEQ_NO_PROGRAM, SEQ_TOKEN};

fn def(s: &str) -> FrameRangeDef {
    s.parse().unwrap()
}

#[test]
fn test_dataset_index() {
    let fixture = TestDataset::new();
    let dataset = fixture.open();
    assert_eq!(dataset.len(), 2);
    assert!(!dataset.is_empty());
    assert_eq!(dataset.seq_keys().collect::<Vec<_>>(), vec![SEQ, SEQ_NO_PROGRAM]);
    assert_eq!(dataset.instance_ids(), &["O1".to_string(), "O2".to_string()]);
}

#[test]
fn test_complex_task_assembly() {
    let fixture = TestDataset::new();
    let dataset = fixture.open();
    let task = dataset.load_complex_task(SEQ, false).unwrap();

    assert_eq!(task.seq_key, SEQ);
    assert_eq!(task.seq_token, SEQ_TOKEN);
    assert!(task.is_complex);
    assert!(!task.is_instantiated());
    assert_eq!(task.exec_path, vec!["pour", "approach", "pour#1", "place"]);
    assert_eq!(task.exec_path_affordance, vec!["pour", "pour#1", "place"]);
    assert_eq!(task.frame_range_def("pour#1"), Some(&def(POUR_AGAIN)));
    assert_eq!(task.frame_range_def("approach"), Some(&def(APPROACH)));
    assert_eq!(task.task_target, "pour water from the kettle into the mug");
    assert_eq!(task.scene_desc.as_deref(), Some("a kettle and a mug on the table"));
    assert_eq!(task.recipe.as_ref().unwrap()["O2"], "kettle");
}

#[test]
fn test_pdg_contracts_transient_tasks() {
    let fixture = TestDataset::new();
    let dataset = fixture.open();
    let task = dataset.load_complex_task(SEQ, false).unwrap();

    let mut tasks = task.pdg.tasks();
    tasks.sort_unstable();
    assert_eq!(tasks, vec!["place", "pour", "pour#1"]);
    assert!(!task.pdg.contains_task("approach"));
    assert!(task.pdg.has_dependency("pour", "pour#1"));
    assert!(task.pdg.has_dependency("pour#1", "place"));
    assert_eq!(task.pdg.dependency_count(), 2);
    assert_eq!(
        task.pdg.topological_order().unwrap(),
        vec!["pour", "pour#1", "place"]
    );
}

#[test]
fn test_side_caches_fill_lazy_record() {
    let fixture = TestDataset::new();
    let dataset = fixture.open();
    let task = dataset.load_complex_task(SEQ, false).unwrap();
    assert_eq!(task.frame_range, Some((0, 29)));
    assert_eq!(
        task.scene_obj_list,
        Some(vec!["O1".to_string(), "O2".to_string()])
    );
}

#[test]
fn test_missing_side_caches_leave_fields_empty() {
    let fixture = TestDataset::bare();
    let dataset = fixture.open();
    let task = dataset.load_complex_task(SEQ, false).unwrap();
    assert_eq!(task.frame_range, None);
    assert_eq!(task.scene_obj_list, None);
}

#[test]
fn test_instantiated_load_ignores_side_caches() {
    let fixture = TestDataset::new();
    // A stale cache must not leak into a hydrated record.
    fixture.write_json(
        &format!("program_extension/obj_list/{SEQ_TOKEN}.json"),
        &serde_json::json!(["STALE"]),
    );
    let dataset = fixture.open();
    let task = dataset.load_complex_task(SEQ, true).unwrap();
    assert!(task.is_instantiated());
    assert_eq!(task.frame_range, Some((0, 29)));
    assert_eq!(
        task.scene_obj_list,
        Some(vec!["O1".to_string(), "O2".to_string()])
    );
}

#[test]
fn test_get_follows_config() {
    let fixture = TestDataset::new();
    let lazy = fixture.open();
    assert!(!lazy.get(0).unwrap().is_instantiated());

    let eager = oakink2_toolkit::Dataset::open(fixture.config().with_instantiated(true)).unwrap();
    assert!(eager.get(0).unwrap().is_instantiated());
    assert!(eager.get(5).is_err());
}

#[test]
fn test_primitive_task_assembly() {
    let fixture = TestDataset::new();
    let dataset = fixture.open();
    let mut complex = dataset.load_complex_task(SEQ, false).unwrap();

    let pour = dataset.load_primitive_task(&mut complex, "pour", false).unwrap();
    assert_eq!(pour.frame_range_def, def(POUR));
    assert_eq!(pour.primitive_task, "pour");
    assert_eq!(pour.task_desc, "pour water into the mug");
    assert!(!pour.transient);
    assert_eq!(pour.hand_involved, HandInvolved::Left);
    assert_eq!(pour.interaction_mode.as_deref(), Some("lh_main"));
    assert_eq!(pour.task_obj_list, vec!["O1", "O2"]);
    assert_eq!(pour.lh_obj_list, Some(vec!["O1".to_string()]));
    assert_eq!(pour.rh_obj_list, None);
    assert_eq!(pour.scene_obj_list, complex.scene_obj_list);
    assert!(!pour.is_instantiated());

    let approach = dataset.load_primitive_task(&mut complex, "approach", false).unwrap();
    assert!(approach.transient);
    assert_eq!(approach.hand_involved, HandInvolved::Both);

    let again = dataset.load_primitive_task(&mut complex, "pour#1", false).unwrap();
    assert_eq!(again.hand_involved, HandInvolved::Right);
    assert_eq!(again.task_desc, "pour the rest of the water");
}

#[test]
fn test_batch_selectors() {
    let fixture = TestDataset::new();
    let dataset = fixture.open();
    let mut complex = dataset.load_complex_task(SEQ, false).unwrap();

    let all = dataset
        .load_primitive_tasks(&mut complex, TaskSelector::All, false)
        .unwrap();
    let primitives: Vec<&str> = all.iter().map(|t| t.primitive_task.as_str()).collect();
    assert_eq!(primitives, vec!["pour", "approach", "pour", "place"]);

    let picked = vec!["place".to_string(), "pour".to_string()];
    let many = dataset
        .load_primitive_tasks(&mut complex, TaskSelector::Many(&picked), false)
        .unwrap();
    assert_eq!(many.len(), 2);
    assert_eq!(many[0].frame_range_def, def(PLACE));
    assert_eq!(many[1].frame_range_def, def(POUR));
}

#[test]
fn test_load_primitive_task_from_def() {
    let fixture = TestDataset::new();
    let dataset = fixture.open();
    let task = dataset
        .load_primitive_task_from_def(SEQ, &def(PLACE), false)
        .unwrap();
    assert_eq!(task.primitive_task, "place");
    assert_eq!(task.task_desc, "put the mug down");

    let hydrated = dataset
        .load_primitive_task_from_def(SEQ, &def(PLACE), true)
        .unwrap();
    assert!(hydrated.is_instantiated());
}

#[test]
fn test_custom_classifier_changes_task_kinds() {
    let fixture = TestDataset::new();
    let dataset = fixture
        .open()
        .with_classifier(Box::new(TransientPrimitives::new(["retreat"])));
    let mut task = dataset.load_complex_task(SEQ, false).unwrap();

    assert_eq!(task.exec_path, vec!["pour", "approach", "pour#1", "place"]);
    assert_eq!(task.exec_path_affordance, task.exec_path);
    assert!(task.pdg.contains_task("approach"));
    assert!(task.pdg.has_dependency("pour", "approach"));
    assert!(task.pdg.has_dependency("approach", "pour#1"));

    let approach = dataset
        .load_primitive_task(&mut task, "approach", false)
        .unwrap();
    assert!(!approach.transient);
}
