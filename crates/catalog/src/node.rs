//! Catalog nodes: the JSON documents the web UI loads, one per dataset version
//! and one per directory inside it.
//!
//! A node is addressed by `(kind, dataset_id, dataset_version, path)`. Its file
//! name is the MD5 of the long name `"<id>-<version>[-<path>]"`, stored sharded
//! below `metadata/<id>/<version>/`.

use crate::error::{CatalogError, CatalogErrorExt};
use catalog_domain::constants::{METADATA_DIR, NODE_FILE_EXTENSION};
use catalog_domain::node::NodeKind;
use catalog_storage::{NamespacedStorage, Storage, StorageError};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Keys computed from the node address, never kept as attributes.
const ADDRESS_KEYS: [&str; 4] = ["type", "dataset_id", "dataset_version", "path"];
const CHILDREN: &str = "children";
const METADATA_SOURCES: &str = "metadata_sources";
const SOURCES: &str = "sources";

/// Address of a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey {
    pub kind: NodeKind,
    pub dataset_id: String,
    pub dataset_version: String,
    /// Slash-separated path inside the dataset; `None` for dataset nodes.
    pub path: Option<String>,
}

impl NodeKey {
    pub fn dataset(dataset_id: impl Into<String>, dataset_version: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Dataset,
            dataset_id: dataset_id.into(),
            dataset_version: dataset_version.into(),
            path: None,
        }
    }

    pub fn directory(
        dataset_id: impl Into<String>,
        dataset_version: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            kind: NodeKind::Directory,
            dataset_id: dataset_id.into(),
            dataset_version: dataset_version.into(),
            path: Some(path.into()),
        }
    }

    #[must_use]
    pub fn long_name(&self) -> String {
        match &self.path {
            Some(path) => format!("{}-{}-{path}", self.dataset_id, self.dataset_version),
            None => format!("{}-{}", self.dataset_id, self.dataset_version),
        }
    }

    /// Lowercase hex MD5 of the long name.
    #[must_use]
    pub fn md5_hash(&self) -> String {
        format!("{:x}", md5::compute(self.long_name()))
    }

    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.{NODE_FILE_EXTENSION}", self.md5_hash())
    }

    /// Last path component, used as the display name of directories.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.path.as_deref().map(last_component)
    }
}

/// In-memory state of one node file.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    key: NodeKey,
    attributes: Map<String, Value>,
    children: Vec<Map<String, Value>>,
    metadata_sources: Map<String, Value>,
}

impl Node {
    #[must_use]
    pub fn new(key: NodeKey) -> Self {
        Self { key, attributes: Map::new(), children: Vec::new(), metadata_sources: Map::new() }
    }

    /// Rebuilds a node from its stored JSON so later additions accumulate.
    #[must_use]
    pub fn from_stored(key: NodeKey, stored: Value) -> Self {
        let mut node = Self::new(key);
        let Value::Object(object) = stored else {
            return node;
        };

        for (name, value) in object {
            match (name.as_str(), value) {
                (CHILDREN, Value::Array(children)) => {
                    node.children = children
                        .into_iter()
                        .filter_map(|c| match c {
                            Value::Object(record) => Some(record),
                            _ => None,
                        })
                        .collect();
                },
                (METADATA_SOURCES, Value::Object(sources)) => node.metadata_sources = sources,
                ("name", _) if node.key.kind == NodeKind::Directory => {},
                (key, value) => node.set_attribute(key, value),
            }
        }
        node
    }

    #[must_use]
    pub const fn key(&self) -> &NodeKey {
        &self.key
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Sets an attribute, last write wins. Address keys and the structural
    /// `children`/`metadata_sources` keys are ignored.
    pub fn set_attribute(&mut self, name: &str, value: Value) {
        if ADDRESS_KEYS.contains(&name) || name == CHILDREN || name == METADATA_SOURCES {
            return;
        }
        self.attributes.insert(name.to_owned(), value);
    }

    #[must_use]
    pub fn children(&self) -> &[Map<String, Value>] {
        &self.children
    }

    /// Adds a child record. A record with the same `(type, path)` is replaced in place.
    pub fn add_child(&mut self, record: Map<String, Value>) {
        let identity = child_identity(&record);
        match self.children.iter_mut().find(|existing| child_identity(existing) == identity) {
            Some(existing) => *existing = record,
            None => self.children.push(record),
        }
    }

    #[must_use]
    pub const fn metadata_sources(&self) -> &Map<String, Value> {
        &self.metadata_sources
    }

    /// Merges a `metadata_sources` object: `sources` entries are appended unless
    /// already present, nested objects are merged key by key, anything else is replaced.
    pub fn merge_sources(&mut self, incoming: &Map<String, Value>) {
        for (name, value) in incoming {
            match (self.metadata_sources.get_mut(name), value) {
                (Some(Value::Array(existing)), Value::Array(new)) if name == SOURCES => {
                    for source in new {
                        if !existing.contains(source) {
                            existing.push(source.clone());
                        }
                    }
                },
                (Some(Value::Object(existing)), Value::Object(new)) => {
                    existing.extend(new.iter().map(|(k, v)| (k.clone(), v.clone())));
                },
                _ => {
                    self.metadata_sources.insert(name.clone(), value.clone());
                },
            }
        }
    }

    /// The document written to disk.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".to_owned(), Value::String(self.key.kind.to_string()));
        out.insert("dataset_id".to_owned(), Value::String(self.key.dataset_id.clone()));
        out.insert("dataset_version".to_owned(), Value::String(self.key.dataset_version.clone()));
        if let Some(path) = &self.key.path {
            out.insert("path".to_owned(), Value::String(path.clone()));
        }
        if self.key.kind == NodeKind::Directory
            && let Some(name) = self.key.name()
        {
            out.insert("name".to_owned(), Value::String(name.to_owned()));
        }

        out.extend(self.attributes.iter().map(|(k, v)| (k.clone(), v.clone())));
        out.insert(
            CHILDREN.to_owned(),
            Value::Array(self.children.iter().cloned().map(Value::Object).collect()),
        );
        if !self.metadata_sources.is_empty() {
            out.insert(METADATA_SOURCES.to_owned(), Value::Object(self.metadata_sources.clone()));
        }

        Value::Object(out)
    }
}

fn child_identity(record: &Map<String, Value>) -> (Option<&Value>, Option<&Value>) {
    (record.get("type"), record.get("path"))
}

pub(crate) fn last_component(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Reads and writes node files below `metadata/`.
#[derive(Debug, Clone)]
pub struct NodeStore {
    storage: Storage,
}

impl NodeStore {
    #[must_use]
    pub const fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// The sharded `metadata/<id>/<version>` view.
    ///
    /// # Errors
    /// Returns [`CatalogError::Storage`] if the id or version is not a valid path segment.
    pub fn dataset_namespace(
        &self,
        dataset_id: &str,
        dataset_version: &str,
    ) -> Result<NamespacedStorage, CatalogError> {
        let namespace = self
            .storage
            .namespace(METADATA_DIR)?
            .namespace(dataset_id)?
            .namespace(dataset_version)
            .context(format!("Dataset {dataset_id}@{dataset_version} cannot be stored"))?;
        Ok(namespace)
    }

    /// Whether a node file exists for `key`.
    ///
    /// # Errors
    /// Returns [`CatalogError::Storage`] if the key cannot be mapped to a path.
    pub fn exists(&self, key: &NodeKey) -> Result<bool, CatalogError> {
        let namespace = self.dataset_namespace(&key.dataset_id, &key.dataset_version)?;
        Ok(namespace.exists(key.file_name())?)
    }

    /// Loads the stored node for `key`, if any.
    ///
    /// # Errors
    /// Returns [`CatalogError::Json`] if the stored file is not valid JSON.
    pub async fn load(&self, key: &NodeKey) -> Result<Option<Node>, CatalogError> {
        let namespace = self.dataset_namespace(&key.dataset_id, &key.dataset_version)?;
        let bytes = match namespace.read(key.file_name()).await {
            Ok(bytes) => bytes,
            Err(StorageError::FileNotFound { .. }) => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        let stored: Value = serde_json::from_slice(&bytes)
            .context(format!("Stored node is corrupt: {}", key.long_name()))?;
        Ok(Some(Node::from_stored(key.clone(), stored)))
    }

    /// Writes `node` atomically, replacing any previous version.
    ///
    /// # Errors
    /// Returns [`CatalogError::Storage`] on filesystem failures.
    pub async fn save(&self, node: &Node) -> Result<(), CatalogError> {
        let key = node.key();
        let namespace = self.dataset_namespace(&key.dataset_id, &key.dataset_version)?;
        let bytes = serde_json::to_vec(&node.to_json())?;
        namespace.write(key.file_name(), &bytes).await?;
        debug!(long_name = %key.long_name(), kind = %key.kind, "Node written");
        Ok(())
    }
}

/// All nodes touched during one `add` run, one per key.
///
/// Nodes are seeded from disk on first access so that repeated runs extend
/// rather than overwrite what is already in the catalog.
#[derive(Debug)]
pub struct NodeRegistry {
    store: NodeStore,
    nodes: BTreeMap<NodeKey, Node>,
}

impl NodeRegistry {
    #[must_use]
    pub const fn new(store: NodeStore) -> Self {
        Self { store, nodes: BTreeMap::new() }
    }

    /// Returns the node for `key`, loading or creating it on first access.
    ///
    /// # Errors
    /// Returns an error if an existing node file cannot be read.
    pub async fn node_mut(&mut self, key: &NodeKey) -> Result<&mut Node, CatalogError> {
        if !self.nodes.contains_key(key) {
            let node = self.store.load(key).await?.unwrap_or_else(|| Node::new(key.clone()));
            self.nodes.insert(key.clone(), node);
        }

        self.nodes.get_mut(key).ok_or_else(|| CatalogError::Internal {
            message: key.long_name().into(),
            context: Some("Node vanished from registry".into()),
        })
    }

    #[must_use]
    pub fn get(&self, key: &NodeKey) -> Option<&Node> {
        self.nodes.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Writes every node and returns how many were written.
    ///
    /// # Errors
    /// Stops at the first node that cannot be written.
    pub async fn flush(&self) -> Result<usize, CatalogError> {
        for node in self.nodes.values() {
            self.store.save(node).await?;
        }
        info!(nodes = self.nodes.len(), "Catalog nodes written");
        Ok(self.nodes.len())
    }
}
