use lifttrack_core::{
    Engine, ExerciseCreate, ExerciseRepository, Seeder, SqliteExerciseRepository, StorageConfig,
    StorageError, StorageTarget,
};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

fn ready_engine() -> Engine {
    let engine = Engine::connect_in_memory().unwrap();
    engine.initialize_schema().unwrap();
    engine
}

fn file_engine(dir: &Path) -> Engine {
    let config = StorageConfig::new(StorageTarget::File(dir.join("lifttrack.db")));
    let engine = Engine::connect(&config).unwrap();
    engine.initialize_schema().unwrap();
    engine
}

fn count(engine: &Engine) -> u64 {
    let session = engine.open_session().unwrap();
    let repo = SqliteExerciseRepository::new(session.connection());
    repo.count_exercises().unwrap()
}

#[test]
fn commit_persists_staged_work() {
    let engine = ready_engine();

    let session = engine.open_session().unwrap();
    let created = SqliteExerciseRepository::new(session.connection())
        .create_exercise(&ExerciseCreate::new("Bench Press", "Chest"))
        .unwrap();
    session.commit().unwrap();

    let session = engine.open_session().unwrap();
    let loaded = SqliteExerciseRepository::new(session.connection())
        .get_exercise(created.id)
        .unwrap()
        .unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn dropping_a_session_without_commit_discards_work() {
    let engine = ready_engine();

    {
        let session = engine.open_session().unwrap();
        SqliteExerciseRepository::new(session.connection())
            .create_exercise(&ExerciseCreate::new("Squat", "Legs"))
            .unwrap();
    }

    assert_eq!(count(&engine), 0);
}

#[test]
fn explicit_rollback_discards_work() {
    let engine = ready_engine();

    let session = engine.open_session().unwrap();
    SqliteExerciseRepository::new(session.connection())
        .create_exercise(&ExerciseCreate::new("Squat", "Legs"))
        .unwrap();
    session.rollback().unwrap();

    assert_eq!(count(&engine), 0);
}

#[test]
fn session_is_released_when_work_fails() {
    let engine = ready_engine();

    let outcome = (|| -> Result<(), StorageError> {
        let session = engine.open_session()?;
        SqliteExerciseRepository::new(session.connection())
            .create_exercise(&ExerciseCreate::new("Plank", "Core"))
            .unwrap();
        session
            .connection()
            .execute_batch("INSERT INTO missing_table VALUES (1);")?;
        session.commit()
    })();
    assert!(outcome.is_err());

    assert_eq!(count(&engine), 0);
}

#[test]
fn session_is_released_after_a_panic() {
    let engine = ready_engine();

    let result = catch_unwind(AssertUnwindSafe(|| {
        let session = engine.open_session().unwrap();
        SqliteExerciseRepository::new(session.connection())
            .create_exercise(&ExerciseCreate::new("Face Pull", "Shoulders"))
            .unwrap();
        panic!("caller failed mid unit-of-work");
    }));
    assert!(result.is_err());

    assert_eq!(count(&engine), 0);
}

#[test]
fn concurrent_readers_do_not_wait_for_each_other() {
    let dir = tempfile::tempdir().unwrap();
    let engine = file_engine(dir.path());
    let session = engine.open_write_session().unwrap();
    SqliteExerciseRepository::new(session.connection())
        .create_exercise(&ExerciseCreate::new("Pull Up", "Back"))
        .unwrap();
    session.commit().unwrap();

    let reader = engine.open_session().unwrap();
    let reader_repo = SqliteExerciseRepository::new(reader.connection());
    assert_eq!(reader_repo.count_exercises().unwrap(), 1);

    let (sender, receiver) = mpsc::channel();
    std::thread::scope(|scope| {
        let engine = &engine;
        scope.spawn(move || {
            let session = engine.open_session().unwrap();
            let count = SqliteExerciseRepository::new(session.connection()).count_exercises();
            sender.send(count.map_err(|err| err.to_string())).unwrap();
        });

        let second = receiver
            .recv_timeout(Duration::from_secs(2))
            .expect("second reader should not block on the first");
        assert_eq!(second, Ok(1));
    });

    assert_eq!(reader_repo.count_exercises().unwrap(), 1);
}

#[test]
fn holding_a_session_does_not_block_other_engine_calls_on_the_same_thread() {
    let dir = tempfile::tempdir().unwrap();
    let engine = file_engine(dir.path());

    let held = engine.open_session().unwrap();
    SqliteExerciseRepository::new(held.connection())
        .count_exercises()
        .unwrap();

    engine.initialize_schema().unwrap();
    let report = Seeder::new(&engine)
        .seed(&[ExerciseCreate::new("Squat", "Legs")])
        .unwrap();
    assert_eq!(report.seeded, 1);

    let other = engine.open_session().unwrap();
    assert_eq!(
        SqliteExerciseRepository::new(other.connection())
            .count_exercises()
            .unwrap(),
        1
    );
    drop(held);
}

#[test]
fn concurrent_write_sessions_all_commit() {
    let dir = tempfile::tempdir().unwrap();
    let engine = file_engine(dir.path());

    std::thread::scope(|scope| {
        for index in 0..4 {
            let engine = &engine;
            scope.spawn(move || {
                let session = engine.open_write_session().unwrap();
                SqliteExerciseRepository::new(session.connection())
                    .create_exercise(&ExerciseCreate::new(format!("Row {index}"), "Back"))
                    .unwrap();
                session.commit().unwrap();
            });
        }
    });

    assert_eq!(count(&engine), 4);
}

#[test]
fn committed_work_is_visible_to_a_new_engine_on_the_same_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = StorageConfig::new(StorageTarget::File(dir.path().join("lifttrack.db")));

    let engine = Engine::connect(&config).unwrap();
    engine.initialize_schema().unwrap();
    let session = engine.open_session().unwrap();
    SqliteExerciseRepository::new(session.connection())
        .create_exercise(&ExerciseCreate::new("Lat Pulldown", "Back"))
        .unwrap();
    session.commit().unwrap();
    drop(engine);

    let reopened = Engine::connect(&config).unwrap();
    reopened.initialize_schema().unwrap();
    assert_eq!(count(&reopened), 1);
}
