use lifttrack_core::{
    default_dataset, load_dataset, parse_dataset, DatasetError, Engine, Exercise,
    ExerciseCreate, ExerciseListQuery, ExerciseRepository, SeedError, SeedReport, Seeder,
    SqliteExerciseRepository,
};
use serde_json::json;

type Tuple = (
    String,
    String,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

fn stored(engine: &Engine) -> Vec<Exercise> {
    let session = engine.open_session().unwrap();
    let repo = SqliteExerciseRepository::new(session.connection());
    repo.list_exercises(&ExerciseListQuery::default()).unwrap()
}

fn tuples_of_stored(exercises: &[Exercise]) -> Vec<Tuple> {
    exercises
        .iter()
        .map(|exercise| {
            (
                exercise.name.clone(),
                exercise.category.clone(),
                exercise.specific_target.clone(),
                exercise.mechanics.clone(),
                exercise.exercise_type.clone(),
                exercise.description.clone(),
            )
        })
        .collect()
}

fn tuples_of_input(records: &[ExerciseCreate]) -> Vec<Tuple> {
    records
        .iter()
        .map(|record| {
            (
                record.name.clone(),
                record.category.clone(),
                record.specific_target.clone(),
                record.mechanics.clone(),
                record.exercise_type.clone(),
                record.description.clone(),
            )
        })
        .collect()
}

fn example_dataset() -> Vec<ExerciseCreate> {
    parse_dataset(
        &json!([
            { "name": "Bench Press", "category": "Chest" },
            { "name": "Squat", "category": "Legs", "mechanics": "Compound" }
        ])
        .to_string(),
    )
    .unwrap()
}

#[test]
fn seeding_the_example_dataset_stores_both_rows() {
    let engine = Engine::connect_in_memory().unwrap();

    let report = Seeder::new(&engine).seed(&example_dataset()).unwrap();
    assert_eq!(
        report,
        SeedReport {
            removed: 0,
            seeded: 2
        }
    );

    let rows = stored(&engine);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].name, "Bench Press");
    assert_eq!(rows[0].specific_target, None);
    assert_eq!(rows[0].exercise_type, None);
    assert_eq!(rows[1].name, "Squat");
    assert_eq!(rows[1].mechanics.as_deref(), Some("Compound"));
    assert_ne!(rows[0].id, rows[1].id);
    assert!(rows.iter().all(|row| row.created_at > 0));
}

#[test]
fn seeding_the_bundled_dataset_stores_every_record_in_order() {
    let engine = Engine::connect_in_memory().unwrap();
    let records = default_dataset().unwrap();
    assert!(!records.is_empty());

    let report = Seeder::new(&engine).seed(&records).unwrap();
    assert_eq!(report.seeded, records.len());

    let rows = stored(&engine);
    assert_eq!(tuples_of_stored(&rows), tuples_of_input(&records));
    assert!(rows.iter().all(|row| row.updated_at.is_none()));
}

#[test]
fn reseeding_replaces_rows_with_the_same_end_state() {
    let engine = Engine::connect_in_memory().unwrap();
    let records = example_dataset();
    let seeder = Seeder::new(&engine);

    seeder.seed(&records).unwrap();
    let first = stored(&engine);

    let report = seeder.seed(&records).unwrap();
    assert_eq!(report.removed, 2);
    assert_eq!(report.seeded, 2);

    let second = stored(&engine);
    assert_eq!(tuples_of_stored(&second), tuples_of_stored(&first));
    // Full replacement: rows are reinserted, never merged.
    assert!(second
        .iter()
        .all(|row| first.iter().all(|old| old.id != row.id)));
}

#[test]
fn seeding_an_empty_dataset_leaves_no_rows() {
    let engine = Engine::connect_in_memory().unwrap();
    let seeder = Seeder::new(&engine);
    seeder.seed(&example_dataset()).unwrap();

    let report = seeder.seed(&[]).unwrap();

    assert_eq!(
        report,
        SeedReport {
            removed: 2,
            seeded: 0
        }
    );
    assert!(stored(&engine).is_empty());
}

#[test]
fn failure_mid_seed_restores_the_previous_baseline() {
    let engine = Engine::connect_in_memory().unwrap();
    let seeder = Seeder::new(&engine);
    seeder.seed(&example_dataset()).unwrap();
    let before = stored(&engine);

    let session = engine.open_session().unwrap();
    session
        .connection()
        .execute_batch(
            "CREATE TRIGGER reject_broken_record
             BEFORE INSERT ON exercises
             WHEN NEW.name = 'Broken Record'
             BEGIN
                 SELECT RAISE(ABORT, 'rejected broken record');
             END;",
        )
        .unwrap();
    session.commit().unwrap();

    let records = vec![
        ExerciseCreate::new("Deadlift", "Back"),
        ExerciseCreate::new("Broken Record", "Back"),
        ExerciseCreate::new("Plank", "Core"),
    ];
    let err = seeder.seed(&records).unwrap_err();
    match &err {
        SeedError::Record { index, name, .. } => {
            assert_eq!(*index, 1);
            assert_eq!(name, "Broken Record");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("rejected broken record"));

    assert_eq!(stored(&engine), before);
}

#[test]
fn dataset_errors_identify_the_offending_record() {
    let err = parse_dataset(
        &json!([
            { "name": "Squat", "category": "Legs" },
            { "name": "Lunge" }
        ])
        .to_string(),
    )
    .unwrap_err();

    match err {
        DatasetError::Record { index, source } => {
            assert_eq!(index, 1);
            assert_eq!(source.fields(), vec!["category"]);
        }
        other => panic!("unexpected error: {other}"),
    }

    assert!(matches!(
        parse_dataset(r#"{"name": "Squat"}"#),
        Err(DatasetError::NotArray)
    ));
    assert!(matches!(parse_dataset("[{"), Err(DatasetError::Json(_))));
}

#[test]
fn load_dataset_reads_files_and_reports_missing_ones() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exercises.json");
    std::fs::write(
        &path,
        r#"[{"name": "Face Pull", "category": "Shoulders", "exercise_type": "Cable"}]"#,
    )
    .unwrap();

    let records = load_dataset(&path).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].exercise_type.as_deref(), Some("Cable"));

    let err = load_dataset(dir.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, DatasetError::Io { .. }));
}
