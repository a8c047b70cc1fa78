use claudes_steward::db;
use tempfile::TempDir;

#[test]
fn test_fresh_db_creates_sessions_table() {
    let tmp = TempDir::new().unwrap();
    let conn = db::open(&tmp.path().join("test.db")).unwrap();

    let count: i32 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='sessions'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(count, 1, "sessions table should exist");
}

#[test]
fn test_sessions_table_has_secondary_indexes() {
    let tmp = TempDir::new().unwrap();
    let conn = db::open(&tmp.path().join("test.db")).unwrap();

    let indexes: Vec<String> = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='index' AND tbl_name='sessions'")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert!(indexes.iter().any(|n| n.contains("session_id")));
    assert!(indexes.iter().any(|n| n.contains("state")));
}

#[test]
fn test_migration_sets_user_version() {
    let tmp = TempDir::new().unwrap();
    let conn = db::open(&tmp.path().join("test.db")).unwrap();
    let version: u32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .unwrap();
    assert_eq!(version, 1);
}

#[test]
fn test_reopening_an_existing_db_does_not_reapply_migrations_destructively() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("test.db");

    let conn1 = db::open(&path).unwrap();
    conn1
        .execute(
            "INSERT INTO sessions (pane_id, tmux_session, tmux_window, tmux_pane, tmux_location,
                session_id, cwd, transcript_path, state, first_seen, last_updated)
             VALUES ('%1','dev',0,0,'dev:0.0','s1','/x','/t.jsonl','working','now','now')",
            [],
        )
        .unwrap();
    drop(conn1);

    let conn2 = db::open(&path).unwrap();
    let count: i32 = conn2
        .query_row("SELECT COUNT(*) FROM sessions", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_default_db_path_under_dotfile_directory() {
    let path = db::default_db_path();
    assert!(path.to_string_lossy().ends_with(".steward/steward.db"));
}
