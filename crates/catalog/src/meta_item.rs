//! Translation of validated metadata items into catalog nodes.
//!
//! * A **dataset** item sets the attributes of its dataset node and links every
//!   listed subdataset into the directory tree of that node.
//! * A **file** item adds a file record to the directory that contains it,
//!   creating the directory chain from the dataset node downwards.

use crate::error::{CatalogError, CatalogErrorExt};
use crate::node::{NodeKey, NodeRegistry, last_component};
use catalog_domain::node::NodeKind;
use serde_json::{Map, Value};
use std::str::FromStr;
use tracing::trace;

/// Dataset item keys that are not copied onto the dataset node.
const DATASET_SKIPPED: [&str; 3] = ["type", "children", "metadata_sources"];
/// File item keys that are not copied into the file record.
const FILE_SKIPPED: [&str; 4] = ["type", "dataset_id", "dataset_version", "metadata_sources"];

/// Non-blank lines of a JSON-lines document, numbered from 1.
pub fn lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

/// Parses one line into JSON.
///
/// # Errors
/// Returns [`CatalogError::Json`] naming the line when it is not valid JSON.
pub fn parse_line(number: usize, line: &str) -> Result<Value, CatalogError> {
    serde_json::from_str(line).context(format!("Invalid JSON in LINE {number}"))
}

/// Adds one validated item to the registry.
///
/// # Errors
/// Returns [`CatalogError::InvalidMetadata`] when the item type is unknown, a
/// required identifier is missing, or a path escapes the dataset.
pub async fn translate(
    registry: &mut NodeRegistry,
    item: &Map<String, Value>,
) -> Result<(), CatalogError> {
    let kind = item
        .get("type")
        .and_then(Value::as_str)
        .and_then(|t| NodeKind::from_str(t).ok())
        .ok_or_else(|| CatalogError::InvalidMetadata {
            message: format!("unsupported item type: {}", item.get("type").unwrap_or(&Value::Null))
                .into(),
            context: None,
        })?;

    match kind {
        NodeKind::Dataset => translate_dataset(registry, item).await,
        NodeKind::File => translate_file(registry, item).await,
        NodeKind::Directory => Err(CatalogError::InvalidMetadata {
            message: "directory items are derived from file paths".into(),
            context: None,
        }),
    }
}

async fn translate_dataset(
    registry: &mut NodeRegistry,
    item: &Map<String, Value>,
) -> Result<(), CatalogError> {
    let dataset_id = required_str(item, "dataset_id")?;
    let dataset_version = required_str(item, "dataset_version")?;
    let key = NodeKey::dataset(dataset_id, dataset_version);

    let node = registry.node_mut(&key).await?;
    for (name, value) in item.iter().filter(|(name, _)| !DATASET_SKIPPED.contains(&name.as_str())) {
        node.set_attribute(name, value.clone());
    }
    if let Some(Value::Object(sources)) = item.get("metadata_sources") {
        node.merge_sources(sources);
    }

    let subdatasets = item.get("subdatasets").and_then(Value::as_array).into_iter().flatten();
    for subdataset in subdatasets.filter_map(Value::as_object) {
        let path = normalize_path(required_str(subdataset, "dataset_path")?)?;
        let mut record = Map::new();
        record.insert("type".to_owned(), Value::String(NodeKind::Dataset.to_string()));
        record.insert("name".to_owned(), Value::String(last_component(&path).to_owned()));
        record.insert("path".to_owned(), Value::String(path.clone()));
        record.insert(
            "dataset_id".to_owned(),
            Value::String(required_str(subdataset, "dataset_id")?.to_owned()),
        );
        record.insert(
            "dataset_version".to_owned(),
            Value::String(required_str(subdataset, "dataset_version")?.to_owned()),
        );

        link(registry, dataset_id, dataset_version, &path, record).await?;
    }

    trace!(dataset_id, dataset_version, "Dataset item translated");
    Ok(())
}

async fn translate_file(
    registry: &mut NodeRegistry,
    item: &Map<String, Value>,
) -> Result<(), CatalogError> {
    let dataset_id = required_str(item, "dataset_id")?;
    let dataset_version = required_str(item, "dataset_version")?;
    let path = normalize_path(required_str(item, "path")?)?;

    let mut record = Map::new();
    record.insert("type".to_owned(), Value::String(NodeKind::File.to_string()));
    record.insert("name".to_owned(), Value::String(last_component(&path).to_owned()));
    for (name, value) in item.iter().filter(|(name, _)| !FILE_SKIPPED.contains(&name.as_str())) {
        record.insert(name.clone(), value.clone());
    }
    record.insert("path".to_owned(), Value::String(path.clone()));

    link(registry, dataset_id, dataset_version, &path, record).await?;

    if let Some(Value::Object(sources)) = item.get("metadata_sources") {
        registry.node_mut(&NodeKey::dataset(dataset_id, dataset_version)).await?.merge_sources(sources);
    }

    trace!(dataset_id, dataset_version, path, "File item translated");
    Ok(())
}

/// Places `record` under the directory containing `path`, creating the
/// directory nodes between the dataset node and that directory.
async fn link(
    registry: &mut NodeRegistry,
    dataset_id: &str,
    dataset_version: &str,
    path: &str,
    record: Map<String, Value>,
) -> Result<(), CatalogError> {
    let mut parent = NodeKey::dataset(dataset_id, dataset_version);
    registry.node_mut(&parent).await?;

    for directory in parent_directories(path) {
        let key = NodeKey::directory(dataset_id, dataset_version, directory);
        registry.node_mut(&key).await?;

        let mut entry = Map::new();
        entry.insert("type".to_owned(), Value::String(NodeKind::Directory.to_string()));
        entry.insert("name".to_owned(), Value::String(last_component(directory).to_owned()));
        entry.insert("path".to_owned(), Value::String(directory.to_owned()));
        registry.node_mut(&parent).await?.add_child(entry);

        parent = key;
    }

    registry.node_mut(&parent).await?.add_child(record);
    Ok(())
}

/// `a/b/c.txt` yields `a` and `a/b`.
fn parent_directories(path: &str) -> impl Iterator<Item = &str> {
    path.match_indices('/').map(move |(index, _)| &path[..index])
}

/// Canonical slash-separated relative path: empty and `.` segments dropped.
fn normalize_path(raw: &str) -> Result<String, CatalogError> {
    let segments: Vec<&str> =
        raw.split('/').filter(|segment| !segment.is_empty() && *segment != ".").collect();

    if segments.contains(&"..") || raw.starts_with('/') {
        return Err(CatalogError::InvalidMetadata {
            message: format!("path must stay inside the dataset: {raw}").into(),
            context: None,
        });
    }
    if segments.is_empty() {
        return Err(CatalogError::InvalidMetadata {
            message: format!("path is empty: {raw:?}").into(),
            context: None,
        });
    }

    Ok(segments.join("/"))
}

fn required_str<'a>(item: &'a Map<String, Value>, name: &str) -> Result<&'a str, CatalogError> {
    item.get(name).and_then(Value::as_str).filter(|v| !v.is_empty()).ok_or_else(|| {
        CatalogError::InvalidMetadata {
            message: format!("missing `{name}`").into(),
            context: None,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeStore;
    use catalog_storage::Storage;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!("test items are objects"),
        }
    }

    async fn registry() -> (tempfile::TempDir, NodeRegistry) {
        let tmp = tempfile::tempdir().unwrap();
        let storage = Storage::builder().root(tmp.path()).connect().await.unwrap();
        (tmp, NodeRegistry::new(NodeStore::new(storage)))
    }

    #[test]
    fn blank_lines_are_skipped() {
        let numbered: Vec<_> = lines("{}\n\n  \n{\"a\":1}\n").collect();
        assert_eq!(numbered, vec![(1, "{}"), (4, "{\"a\":1}")]);
    }

    #[test]
    fn invalid_json_names_the_line() {
        let err = parse_line(7, "{nope").unwrap_err();
        assert!(err.to_string().contains("LINE 7"), "{err}");
    }

    #[test]
    fn paths_are_normalized() {
        assert_eq!(normalize_path("./code//src/main.rs").unwrap(), "code/src/main.rs");
        assert!(normalize_path("../escape").is_err());
        assert!(normalize_path("/abs/path").is_err());
        assert!(normalize_path("./").is_err());
        assert_eq!(parent_directories("a/b/c.txt").collect::<Vec<_>>(), vec!["a", "a/b"]);
        assert_eq!(parent_directories("top.txt").count(), 0);
    }

    #[tokio::test]
    async fn dataset_item_sets_attributes() {
        let (_tmp, mut registry) = registry().await;
        let item = object(json!({
            "type": "dataset",
            "dataset_id": "ds",
            "dataset_version": "v1",
            "name": "Example",
            "children": [{ "ignored": true }],
            "metadata_sources": { "sources": [{ "source_name": "core", "source_version": "1" }] }
        }));

        translate(&mut registry, &item).await.unwrap();

        let node = registry.get(&NodeKey::dataset("ds", "v1")).unwrap();
        assert_eq!(node.attribute("name"), Some(&json!("Example")));
        assert!(node.attribute("children").is_none());
        assert!(node.children().is_empty());
        assert_eq!(node.metadata_sources()["sources"][0]["source_name"], "core");
    }

    #[tokio::test]
    async fn subdatasets_are_linked_through_directories() {
        let (_tmp, mut registry) = registry().await;
        let item = object(json!({
            "type": "dataset",
            "dataset_id": "super",
            "dataset_version": "v1",
            "subdatasets": [
                { "dataset_id": "sub", "dataset_version": "s1", "dataset_path": "inputs/raw" },
                { "dataset_id": "top", "dataset_version": "t1", "dataset_path": "code" }
            ]
        }));

        translate(&mut registry, &item).await.unwrap();

        let root = registry.get(&NodeKey::dataset("super", "v1")).unwrap();
        let kinds: Vec<_> = root.children().iter().map(|c| (c["type"].clone(), c["path"].clone())).collect();
        assert!(kinds.contains(&(json!("directory"), json!("inputs"))));
        assert!(kinds.contains(&(json!("dataset"), json!("code"))));

        let inputs = registry.get(&NodeKey::directory("super", "v1", "inputs")).unwrap();
        assert_eq!(inputs.children().len(), 1);
        assert_eq!(inputs.children()[0]["dataset_id"], "sub");
        assert_eq!(inputs.children()[0]["name"], "raw");
        assert_eq!(registry.len(), 2);
    }

    #[tokio::test]
    async fn file_item_builds_directory_chain() {
        let (_tmp, mut registry) = registry().await;
        let item = object(json!({
            "type": "file",
            "dataset_id": "ds",
            "dataset_version": "v1",
            "path": "data/sub-01/anat.nii.gz",
            "contentbytesize": 2048,
            "url": ["https://example.org/anat.nii.gz"],
            "metadata_sources": { "sources": [{ "source_name": "files", "source_version": "1" }] }
        }));

        translate(&mut registry, &item).await.unwrap();

        let dataset = registry.get(&NodeKey::dataset("ds", "v1")).unwrap();
        assert_eq!(dataset.children()[0]["path"], "data");
        assert_eq!(dataset.metadata_sources()["sources"][0]["source_name"], "files");

        let data = registry.get(&NodeKey::directory("ds", "v1", "data")).unwrap();
        assert_eq!(data.children()[0]["path"], "data/sub-01");

        let leaf = registry.get(&NodeKey::directory("ds", "v1", "data/sub-01")).unwrap();
        let record = &leaf.children()[0];
        assert_eq!(record["type"], "file");
        assert_eq!(record["name"], "anat.nii.gz");
        assert_eq!(record["contentbytesize"], 2048);
        assert!(record.get("dataset_id").is_none());
        assert!(record.get("metadata_sources").is_none());
    }

    #[tokio::test]
    async fn top_level_files_attach_to_dataset() {
        let (_tmp, mut registry) = registry().await;
        let item = object(json!({
            "type": "file", "dataset_id": "ds", "dataset_version": "v1", "path": "README.md"
        }));

        translate(&mut registry, &item).await.unwrap();

        assert_eq!(registry.len(), 1);
        let dataset = registry.get(&NodeKey::dataset("ds", "v1")).unwrap();
        assert_eq!(dataset.children()[0]["name"], "README.md");
    }

    #[tokio::test]
    async fn repeated_files_replace_their_record() {
        let (_tmp, mut registry) = registry().await;
        for size in [1, 2] {
            let item = object(json!({
                "type": "file", "dataset_id": "ds", "dataset_version": "v1",
                "path": "a/b.txt", "contentbytesize": size
            }));
            translate(&mut registry, &item).await.unwrap();
        }

        let dataset = registry.get(&NodeKey::dataset("ds", "v1")).unwrap();
        assert_eq!(dataset.children().len(), 1);
        let dir = registry.get(&NodeKey::directory("ds", "v1", "a")).unwrap();
        assert_eq!(dir.children().len(), 1);
        assert_eq!(dir.children()[0]["contentbytesize"], 2);
    }

    #[tokio::test]
    async fn unknown_types_are_rejected() {
        let (_tmp, mut registry) = registry().await;
        let item = object(json!({ "type": "collection" }));
        let err = translate(&mut registry, &item).await.unwrap_err();
        assert!(matches!(err, CatalogError::InvalidMetadata { .. }));
    }
}
