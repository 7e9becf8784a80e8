use kanban::drag::{handle_drag_end, DragEnd, DropOutcome};
use kanban::id_gen::{SequentialIdGenerator, TimestampIdGenerator};
use kanban::storage::{BlobStore, FileBlobStore, TaskRepository, STORAGE_KEY};
use kanban::{App, KanbanBoard, TaskPriority, TaskStatus};
use rstest::{fixture, rstest};
use tempfile::TempDir;

#[fixture]
fn data_dir() -> TempDir {
    tempfile::tempdir().expect("temp dir")
}

#[rstest]
fn buy_milk_then_done(data_dir: TempDir) {
    let mut repo = TaskRepository::new(FileBlobStore::new(data_dir.path()));
    let mut board = KanbanBoard::with_ids(SequentialIdGenerator::new());

    let id = board
        .add_task("Buy milk", TaskPriority::High)
        .expect("valid task")
        .id
        .clone();
    repo.save(board.tasks()).expect("save");

    let outcome = handle_drag_end(
        &mut board,
        DragEnd {
            dragged: id.clone(),
            over: Some("done".to_string()),
        },
    );
    repo.save(board.tasks()).expect("save");

    assert_eq!(
        outcome,
        DropOutcome::Moved {
            from: TaskStatus::Todo,
            to: TaskStatus::Done
        }
    );
    let views = board.views("");
    assert_eq!(views.done.len(), 1);
    assert!(views.todo.is_empty() && views.in_progress.is_empty());

    let reloaded = repo.load().expect("load");
    assert_eq!(reloaded, board.tasks());
    assert_eq!(reloaded[0].priority, TaskPriority::High);
}

#[rstest]
fn board_survives_restart(data_dir: TempDir) {
    {
        let repo = TaskRepository::new(FileBlobStore::new(data_dir.path()));
        let mut app = App::open(repo, TimestampIdGenerator::new()).expect("open");
        app.draft = "first".into();
        app.submit_draft();
        app.draft = "second".into();
        app.draft_priority = TaskPriority::Low;
        app.submit_draft();
        app.move_selected(0);
    }

    let repo = TaskRepository::new(FileBlobStore::new(data_dir.path()));
    let app = App::open(repo, TimestampIdGenerator::new()).expect("reopen");
    let tasks = app.board().tasks();

    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].text, "first");
    assert_eq!(tasks[0].status, TaskStatus::Todo);
    assert_eq!(tasks[1].text, "second");
    assert_eq!(tasks[1].priority, TaskPriority::Low);
    assert_eq!(tasks[1].status, TaskStatus::InProgress);
    assert_ne!(tasks[0].id, tasks[1].id);
}

#[rstest]
fn corrupt_file_is_kept_aside(data_dir: TempDir) {
    let mut store = FileBlobStore::new(data_dir.path());
    store.write(STORAGE_KEY, b"[{\"id\":").expect("seed");

    let app = App::open(TaskRepository::new(store.clone()), TimestampIdGenerator::new())
        .expect("open despite corrupt blob");

    assert!(app.board().is_empty());
    assert_eq!(
        store.read("kanbanTasks.corrupt").expect("read backup").as_deref(),
        Some(&b"[{\"id\":"[..])
    );
}

#[rstest]
fn non_utf8_file_is_kept_aside(data_dir: TempDir) {
    let bytes = [0xff, 0xfe, b'[', b']'];
    std::fs::write(data_dir.path().join("kanbanTasks.json"), bytes).expect("seed");
    let store = FileBlobStore::new(data_dir.path());

    let app = App::open(TaskRepository::new(store.clone()), TimestampIdGenerator::new())
        .expect("open despite undecodable file");

    assert!(app.board().is_empty());
    assert_eq!(
        store.read("kanbanTasks.corrupt").expect("read backup").as_deref(),
        Some(&bytes[..])
    );
}

#[rstest]
fn repeated_corruption_keeps_every_backup(data_dir: TempDir) {
    let mut store = FileBlobStore::new(data_dir.path());

    store.write(STORAGE_KEY, b"first").expect("seed");
    App::open(TaskRepository::new(store.clone()), TimestampIdGenerator::new()).expect("open");
    store.write(STORAGE_KEY, b"second").expect("seed");
    let app = App::open(TaskRepository::new(store.clone()), TimestampIdGenerator::new())
        .expect("reopen");

    assert!(app.board().is_empty());
    assert_eq!(
        store.read("kanbanTasks.corrupt").expect("read").as_deref(),
        Some(&b"first"[..])
    );
    assert_eq!(
        store.read("kanbanTasks.corrupt.1").expect("read").as_deref(),
        Some(&b"second"[..])
    );
}
