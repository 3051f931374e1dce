use std::cell::{Cell, RefCell};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::tempdir;
use uniqwalk::scanner::{find_unique_files, FindConfig, StatefulWalker};
use uniqwalk::WalkError;

fn write(path: &Path, content: &[u8]) {
    File::create(path).unwrap().write_all(content).unwrap();
}

#[test]
fn test_callback_error_stops_walk() {
    let dir = tempdir().unwrap();
    for i in 0..5 {
        write(&dir.path().join(format!("f{}.txt", i)), format!("{}", i).as_bytes());
    }

    let calls = Cell::new(0);
    let config = FindConfig::new(dir.path())
        .include_file_fn(|_| true)
        .found_file_fn(|info| {
            calls.set(calls.get() + 1);
            anyhow::bail!("refusing {}", info.file_path.display())
        });

    let result = find_unique_files(config);

    assert_eq!(calls.get(), 1);
    match result {
        Err(WalkError::Callback(e)) => assert!(e.to_string().starts_with("refusing ")),
        other => panic!("Expected Callback error, got {:?}", other),
    }
}

#[derive(Debug, thiserror::Error)]
#[error("quota exceeded")]
struct QuotaExceeded;

#[test]
fn test_callback_error_is_propagated_unchanged() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"a");

    let config = FindConfig::new(dir.path())
        .include_file_fn(|_| true)
        .found_file_fn(|_| Err(QuotaExceeded.into()));

    match find_unique_files(config) {
        Err(WalkError::Callback(e)) => assert!(e.downcast_ref::<QuotaExceeded>().is_some()),
        other => panic!("Expected Callback error, got {:?}", other),
    }
}

#[test]
fn test_missing_include_fn_fails_before_filesystem_access() {
    // The directory does not exist; validation must fail first.
    let config = FindConfig::new("/nonexistent/path/12345").found_file_fn(|_| Ok(()));

    match StatefulWalker::new(config) {
        Err(WalkError::Validation(msg)) => assert!(msg.contains("include_file_fn")),
        other => panic!("Expected Validation error, got {:?}", other),
    }
}

#[test]
fn test_missing_found_fn_fails_validation() {
    let dir = tempdir().unwrap();
    let included = Cell::new(false);
    let config = FindConfig::new(dir.path()).include_file_fn(|_| {
        included.set(true);
        true
    });

    match find_unique_files(config) {
        Err(WalkError::Validation(msg)) => assert!(msg.contains("found_file_fn")),
        other => panic!("Expected Validation error, got {:?}", other),
    }
    assert!(!included.get());
}

#[test]
fn test_empty_path_fails_resolution() {
    let config = FindConfig::new("")
        .include_file_fn(|_| true)
        .found_file_fn(|_| Ok(()));

    assert!(matches!(
        find_unique_files(config),
        Err(WalkError::PathResolution { .. })
    ));
}

#[test]
fn test_nonexistent_root_is_traversal_error() {
    let config = FindConfig::new("/nonexistent/path/12345")
        .include_file_fn(|_| true)
        .found_file_fn(|_| Ok(()));

    match find_unique_files(config) {
        Err(WalkError::Traversal(e)) => {
            assert_eq!(e.path(), Some(Path::new("/nonexistent/path/12345")));
            assert_eq!(
                e.io_error().map(std::io::Error::kind),
                Some(std::io::ErrorKind::NotFound)
            );
        }
        other => panic!("Expected Traversal error, got {:?}", other),
    }
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_aborts_walk() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    write(&locked.join("secret.txt"), b"secret");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root can read anything; nothing to test in that case.
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        return;
    }

    let config = FindConfig::new(dir.path())
        .recursive(true)
        .include_file_fn(|_| true)
        .found_file_fn(|_| Ok(()));
    let result = find_unique_files(config);

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    match result {
        Err(WalkError::Traversal(e)) => assert_eq!(e.path(), Some(locked.as_path())),
        other => panic!("Expected Traversal error, got {:?}", other),
    }
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_fine_when_not_recursive() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
    write(&dir.path().join("ok.txt"), b"ok");

    let found = RefCell::new(Vec::new());
    let config = FindConfig::new(dir.path())
        .include_file_fn(|_| true)
        .found_file_fn(|info| {
            found.borrow_mut().push(info.file_path);
            Ok(())
        });
    let result = find_unique_files(config);

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    result.unwrap();
    assert_eq!(found.into_inner(), vec![dir.path().join("ok.txt")]);
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_io_error() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let secret = dir.path().join("secret.txt");
    write(&secret, b"secret");
    fs::set_permissions(&secret, fs::Permissions::from_mode(0o000)).unwrap();

    if File::open(&secret).is_ok() {
        return;
    }

    let config = FindConfig::new(dir.path())
        .include_file_fn(|_| true)
        .found_file_fn(|_| Ok(()));

    match find_unique_files(config) {
        Err(WalkError::Io { path, source }) => {
            assert_eq!(path, secret);
            assert_eq!(source.kind(), std::io::ErrorKind::PermissionDenied);
        }
        other => panic!("Expected Io error, got {:?}", other),
    }
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_fine_with_allow_dupes() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let secret = dir.path().join("secret.txt");
    write(&secret, b"secret");
    fs::set_permissions(&secret, fs::Permissions::from_mode(0o000)).unwrap();

    let found: RefCell<Vec<PathBuf>> = RefCell::new(Vec::new());
    let config = FindConfig::new(dir.path())
        .allow_dupes(true)
        .include_file_fn(|_| true)
        .found_file_fn(|info| {
            found.borrow_mut().push(info.file_path);
            Ok(())
        });

    find_unique_files(config).unwrap();
    assert_eq!(found.into_inner(), vec![secret]);
}

#[cfg(target_os = "linux")]
#[test]
fn test_file_replaced_by_directory_is_io_error() {
    use std::fs;

    let dir = tempdir().unwrap();
    let first = dir.path().join("a.txt");
    write(&first, b"first");
    write(&dir.path().join("b.txt"), b"second");

    let calls = RefCell::new(0);
    let config = FindConfig::new(dir.path())
        .sort_entries(true)
        .include_file_fn(|path| {
            if path == first {
                fs::remove_file(path).unwrap();
                fs::create_dir(path).unwrap();
            }
            true
        })
        .found_file_fn(|_| {
            *calls.borrow_mut() += 1;
            Ok(())
        });

    match find_unique_files(config) {
        Err(WalkError::Io { path, source }) => {
            assert_eq!(path, first);
            assert_eq!(source.kind(), std::io::ErrorKind::IsADirectory);
        }
        other => panic!("Expected Io error, got {:?}", other),
    }
    assert_eq!(*calls.borrow(), 0);
}

#[test]
fn test_directory_removed_mid_walk_aborts_with_traversal_error() {
    use std::fs;

    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"first");
    let sub = dir.path().join("sub");
    fs::create_dir(&sub).unwrap();
    write(&sub.join("c.txt"), b"nested");

    let found = RefCell::new(Vec::new());
    let config = FindConfig::new(dir.path())
        .recursive(true)
        .sort_entries(true)
        .include_file_fn(|_| {
            if sub.exists() {
                fs::remove_dir_all(&sub).unwrap();
            }
            true
        })
        .found_file_fn(|info| {
            found.borrow_mut().push(info.file_path);
            Ok(())
        });

    match find_unique_files(config) {
        Err(WalkError::Traversal(e)) => {
            assert_eq!(e.path(), Some(sub.as_path()));
            assert_eq!(
                e.io_error().map(std::io::Error::kind),
                Some(std::io::ErrorKind::NotFound)
            );
        }
        other => panic!("Expected Traversal error, got {:?}", other),
    }
    assert_eq!(found.into_inner(), vec![dir.path().join("a.txt")]);
}
