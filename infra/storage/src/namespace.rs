use crate::engine::Storage;
use crate::error::StorageError;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A single validated path segment used as a namespace.
///
/// Dataset ids and versions are used verbatim, so case is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NamespaceName(String);

impl TryFrom<String> for NamespaceName {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, StorageError> {
        Self::try_from(value.as_str())
    }
}

impl TryFrom<&String> for NamespaceName {
    type Error = StorageError;

    fn try_from(value: &String) -> Result<Self, StorageError> {
        Self::try_from(value.as_str())
    }
}

impl TryFrom<&str> for NamespaceName {
    type Error = StorageError;

    fn try_from(value: &str) -> Result<Self, StorageError> {
        if value.is_empty() {
            return Err(StorageError::InvalidNamespace {
                message: "EMPTY".into(),
                context: Some("Namespace cannot be empty".into()),
            });
        }

        if value == "." || value == ".." {
            return Err(StorageError::InvalidNamespace {
                message: value.to_owned().into(),
                context: Some("Namespace cannot be a relative directory marker".into()),
            });
        }

        if !value.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')) {
            return Err(StorageError::InvalidNamespace {
                message: value.to_owned().into(),
                context: Some("Namespace contains illegal characters".into()),
            });
        }

        Ok(Self(value.to_owned()))
    }
}

impl AsRef<str> for NamespaceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NamespaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A namespaced, sharded view of the storage engine.
///
/// Every file path handed to this view is placed below the namespace directory
/// and its file name is split by the configured shard width, so
/// `ns.write("0a1b2c.json", ..)` lands at `<root>/<ns>/0a1/b2c.json`.
#[derive(Debug, Clone)]
pub struct NamespacedStorage {
    storage: Storage,
    namespace: Arc<PathBuf>,
}

impl NamespacedStorage {
    pub(crate) fn new(storage: Storage, namespace: PathBuf) -> Self {
        Self { storage, namespace: Arc::new(namespace) }
    }

    /// Returns a nested namespace below this one.
    ///
    /// # Errors
    /// Returns [`StorageError::InvalidNamespace`] for illegal names.
    pub fn namespace<N>(&self, name: N) -> Result<Self, StorageError>
    where
        N: TryInto<NamespaceName, Error = StorageError>,
    {
        let ns = name.try_into()?;
        Ok(Self::new(self.storage.clone(), self.namespace.join(ns.as_ref())))
    }

    /// Resolves a file path to its sharded physical location.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::PathTraversalAttempt`] if the path tries to escape the sandbox.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        self.storage.resolve_sharded(&self.namespace, path)
    }

    /// Reads a sharded file.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::FileNotFound`] if the path does not exist.
    pub async fn read(&self, path: impl AsRef<Path>) -> Result<Vec<u8>, StorageError> {
        let resolved = self.resolve(path)?;
        Storage::read_resolved(&resolved).await
    }

    /// Writes a sharded file atomically.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if disk space is full or hardware failure occurs.
    pub async fn write(&self, path: impl AsRef<Path>, data: &[u8]) -> Result<(), StorageError> {
        let resolved = self.resolve(path)?;
        self.storage.write_resolved(&resolved, data).await
    }

    /// Checks if a sharded file exists.
    ///
    /// # Errors
    ///
    /// Returns an `Err` only if path resolution fails.
    pub fn exists(&self, path: impl AsRef<Path>) -> Result<bool, StorageError> {
        Ok(self.resolve(path)?.exists())
    }

    /// Removes the whole namespace directory. Returns `Ok(false)` if it was absent.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] on filesystem failures.
    pub async fn remove(&self) -> Result<bool, StorageError> {
        self.storage.remove_dir(self.namespace.as_path()).await
    }
}
