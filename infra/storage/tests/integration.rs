use catalog_storage::*;
use tempfile::TempDir;

async fn open(temp: &TempDir) -> Storage {
    Storage::builder().root(temp.path()).connect().await.unwrap()
}

#[tokio::test]
async fn path_traversal_is_blocked() {
    let temp = TempDir::new().unwrap();
    let storage = open(&temp).await;

    assert!(storage.resolve("../etc/passwd").is_err());
    assert!(storage.resolve("metadata/../../outside").is_err());
    assert!(storage.resolve("/etc/passwd").is_err());
}

#[tokio::test]
async fn plain_write_read_roundtrip() {
    let temp = TempDir::new().unwrap();
    let storage = open(&temp).await;

    storage.write("assets/app.js", b"console.log(1)").await.unwrap();
    assert!(storage.exists("assets/app.js").unwrap());
    assert!(temp.path().join("assets/app.js").is_file(), "root writes must not be sharded");
    assert_eq!(storage.read("assets/app.js").await.unwrap(), b"console.log(1)");
}

#[tokio::test]
async fn overwrite_replaces_content() {
    let temp = TempDir::new().unwrap();
    let storage = open(&temp).await;

    storage.write("config.json", b"{\"a\":1}").await.unwrap();
    storage.write("config.json", b"{}").await.unwrap();
    assert_eq!(storage.read("config.json").await.unwrap(), b"{}");
}

#[tokio::test]
async fn namespaces_shard_by_prefix() {
    let temp = TempDir::new().unwrap();
    let storage = open(&temp).await;

    let ds = storage.namespace("metadata").unwrap().namespace("ds-1").unwrap();
    let v1 = ds.namespace("v1").unwrap();
    let v2 = ds.namespace("v2").unwrap();

    v1.write("abcdef.json", b"1").await.unwrap();
    v2.write("abcdef.json", b"2").await.unwrap();

    assert!(temp.path().join("metadata/ds-1/v1/abc/def.json").is_file());
    assert!(temp.path().join("metadata/ds-1/v2/abc/def.json").is_file());
    assert_eq!(v1.read("abcdef.json").await.unwrap(), b"1");
    assert_eq!(v2.read("abcdef.json").await.unwrap(), b"2");
}

#[tokio::test]
async fn invalid_namespace_names_are_rejected() {
    let temp = TempDir::new().unwrap();
    let storage = open(&temp).await;

    for bad in ["", ".", "..", "a/b", "a b"] {
        let err = storage.namespace(bad).expect_err("namespace must be rejected");
        assert!(matches!(err, StorageError::InvalidNamespace { .. }), "{bad:?}: {err:?}");
    }
    assert!(storage.namespace("5df8eb3a-95c5-11ea-b4b9-a0369f287950").is_ok());
}

#[tokio::test]
async fn removing_a_namespace_drops_all_files() {
    let temp = TempDir::new().unwrap();
    let storage = open(&temp).await;

    let version = storage.namespace("metadata").unwrap().namespace("ds").unwrap().namespace("v1").unwrap();
    version.write("0123456.json", b"{}").await.unwrap();
    version.write("abcdefg.json", b"{}").await.unwrap();

    assert!(version.remove().await.unwrap());
    assert!(!version.exists("0123456.json").unwrap());
    assert!(!version.remove().await.unwrap(), "second removal has nothing to do");
    assert!(temp.path().join("metadata/ds").is_dir(), "parent namespace is kept");
}

#[tokio::test]
async fn root_cannot_be_removed() {
    let temp = TempDir::new().unwrap();
    let storage = open(&temp).await;

    let err = storage.remove_dir(".").await.expect_err("root removal must fail");
    assert!(matches!(err, StorageError::PathTraversalAttempt { .. }));
}

#[tokio::test]
async fn connect_without_create_requires_existing_root() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope");

    let err = Storage::builder().root(&missing).create(false).connect().await.expect_err("missing");
    assert!(matches!(err, StorageError::DirectoryNotFound { .. }));
    assert!(!missing.exists());
}

#[tokio::test]
async fn missing_files_report_file_not_found() {
    let temp = TempDir::new().unwrap();
    let storage = open(&temp).await;

    match storage.read("missing.json").await.expect_err("expected error") {
        StorageError::FileNotFound { .. } => {},
        other => panic!("unexpected error: {other:?}"),
    }
    let nodes = storage.namespace("metadata").unwrap();
    match nodes.read("abcdef.json").await.expect_err("expected error") {
        StorageError::FileNotFound { .. } => {},
        other => panic!("unexpected error: {other:?}"),
    }
}
