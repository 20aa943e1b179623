use super::*;
use crate::provider::test_helpers::test_session;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("todo-client-{name}-{}.json", uuid::Uuid::new_v4()))
}

// =============================================================================
// FileSessionStore
// =============================================================================

#[test]
fn file_store_missing_file_loads_none() {
    let store = FileSessionStore::new(temp_path("missing"));
    assert!(store.load().unwrap().is_none());
}

#[test]
fn file_store_save_then_load() {
    let path = temp_path("save");
    let store = FileSessionStore::new(&path);
    let session = test_session();

    store.save(&session).unwrap();
    assert_eq!(store.load().unwrap(), Some(session));

    store.clear().unwrap();
    assert!(!path.exists());
}

#[test]
fn file_store_clear_without_file_is_ok() {
    let store = FileSessionStore::new(temp_path("clear"));
    store.clear().unwrap();
}

#[test]
fn file_store_corrupt_file_errors() {
    let path = temp_path("corrupt");
    std::fs::write(&path, "not json").unwrap();
    let store = FileSessionStore::new(&path);

    assert!(matches!(store.load(), Err(StoreError::Json(_))));

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn file_store_creates_parent_dirs() {
    let dir = std::env::temp_dir().join(format!("todo-client-dir-{}", uuid::Uuid::new_v4()));
    let store = FileSessionStore::new(dir.join("nested").join("session.json"));

    store.save(&test_session()).unwrap();
    assert!(store.path().exists());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[cfg(unix)]
#[test]
fn file_store_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let path = temp_path("mode");
    let store = FileSessionStore::new(&path);

    store.save(&test_session()).unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o077, 0, "session file mode {mode:o}");
    std::fs::remove_file(&path).unwrap();
}

#[cfg(unix)]
#[test]
fn file_store_narrows_existing_world_readable_file() {
    use std::os::unix::fs::PermissionsExt;

    let path = temp_path("narrow");
    std::fs::write(&path, "{}").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
    let store = FileSessionStore::new(&path);

    store.save(&test_session()).unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
    assert_eq!(store.load().unwrap(), Some(test_session()));
    std::fs::remove_file(&path).unwrap();
}

// =============================================================================
// MemorySessionStore
// =============================================================================

#[test]
fn memory_store_round_trip_and_clear() {
    let store = MemorySessionStore::new();
    assert!(store.load().unwrap().is_none());

    store.save(&test_session()).unwrap();
    assert!(store.load().unwrap().is_some());

    store.clear().unwrap();
    assert!(store.load().unwrap().is_none());
}

#[test]
fn memory_store_with_session_starts_populated() {
    let store = MemorySessionStore::with_session(test_session());
    assert_eq!(store.load().unwrap(), Some(test_session()));
}
