use catalog_storage::Storage;
use proptest::prelude::*;
use std::path::PathBuf;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap()
}

proptest! {
    #[test]
    fn resolved_paths_never_leave_the_root(segments in proptest::collection::vec("(\\.\\.|\\.|[a-z0-9]{1,6})", 1..8)) {
        let temp = tempfile::tempdir().unwrap();
        let storage = runtime().block_on(Storage::builder().root(temp.path()).connect()).unwrap();
        let relative: PathBuf = segments.iter().collect();

        if let Ok(resolved) = storage.resolve(&relative) {
            prop_assert!(resolved.starts_with(storage.root()));
        }
    }

    #[test]
    fn sharded_names_keep_every_character(name in "[0-9a-f]{4,32}") {
        let temp = tempfile::tempdir().unwrap();
        let storage = runtime().block_on(Storage::builder().root(temp.path()).connect()).unwrap();
        let ns = storage.namespace("metadata").unwrap();

        let file = format!("{name}.json");
        let resolved = ns.resolve(&file).unwrap();
        let shard = resolved.parent().and_then(|p| p.file_name()).unwrap().to_string_lossy().into_owned();
        let rest = resolved.file_name().unwrap().to_string_lossy().into_owned();

        prop_assert_eq!(shard.len(), 3);
        prop_assert_eq!(format!("{shard}{rest}"), file);
    }
}
