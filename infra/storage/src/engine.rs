//! Core storage engine: sandboxed, atomic file I/O rooted at a catalog directory.
//!
//! [`Storage`] owns the canonical root and exposes plain (unsharded) access for
//! site content, while [`NamespacedStorage`] views add the hash-prefix sharding
//! used for node files.

use crate::builder::StorageBuilder;
use crate::error::{StorageError, StorageErrorExt};
use crate::maintenance;
use crate::namespace::{NamespaceName, NamespacedStorage};
use crate::security;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

pub(crate) const TMP_MARKER: &str = ".catalogtmp.";

/// The internal shared state of a [`Storage`] instance.
#[derive(Debug)]
pub struct StorageInner {
    /// The canonicalized physical path of the catalog root.
    pub(crate) root: PathBuf,
    /// Number of leading file-name characters moved into a shard directory.
    pub(crate) shard_width: usize,
    /// A unique counter used to generate temporary file names.
    pub(crate) tmp_counter: AtomicU64,
}

/// A thread-safe handle to the storage engine.
///
/// - **Sandboxing**: every path is resolved against the canonical root; `..`
///   escapes, absolute paths and symlinks leading outside are rejected.
/// - **Atomic Writes**: unique temp file, `fsync`, then `rename`.
/// - **Namespaces**: nested views such as `metadata/<dataset>/<version>` whose
///   file names are sharded by prefix.
/// - **Self-Healing**: stale temp files are purged on connect.
///
/// Cloning is cheap; the state is reference counted.
///
/// # Example
///
/// ```rust
/// use catalog_storage::{Storage, StorageError};
///
/// #[tokio::main]
/// async fn main() -> Result<(), StorageError> {
///     # let tmp = tempfile::tempdir().unwrap();
///     let storage = Storage::builder().root(tmp.path().join("catalog")).connect().await?;
///
///     storage.write("config.json", br#"{"catalog_name":"DataCat"}"#).await?;
///
///     let nodes = storage.namespace("metadata")?.namespace("ds-1")?.namespace("v1")?;
///     nodes.write("0a1b2c3d.json", b"{}").await?;
///     assert!(nodes.resolve("0a1b2c3d.json")?.ends_with("metadata/ds-1/v1/0a1/b2c3d.json"));
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Storage {
    pub(crate) inner: Arc<StorageInner>,
}

impl Deref for Storage {
    type Target = StorageInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl Storage {
    #[must_use = "The storage engine is not initialized until you call .connect()"]
    pub fn builder() -> StorageBuilder {
        StorageBuilder::new()
    }

    /// The canonical root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// Returns a namespaced (and sharded) view below the root.
    ///
    /// # Errors
    /// Returns [`StorageError::InvalidNamespace`] for empty names, `.`/`..`, or
    /// characters outside `[A-Za-z0-9._-]`.
    pub fn namespace<N>(&self, name: N) -> Result<NamespacedStorage, StorageError>
    where
        N: TryInto<NamespaceName, Error = StorageError>,
    {
        let ns = name.try_into()?;
        Ok(NamespacedStorage::new(self.clone(), PathBuf::from(ns.as_ref())))
    }

    /// Resolves a relative path to a physical path inside the root (no sharding).
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::PathTraversalAttempt`] if the path tries to escape the sandbox.
    /// Returns [`StorageError::Io`] if the path or its parent cannot be verified on the filesystem.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, StorageError> {
        security::resolve_path(&self.root, path)
    }

    pub(crate) fn resolve_sharded(
        &self,
        namespace: &Path,
        path: impl AsRef<Path>,
    ) -> Result<PathBuf, StorageError> {
        let sharded = security::shard_relative(path.as_ref(), self.shard_width)?;
        security::resolve_path(&self.root, namespace.join(sharded))
    }

    /// Reads the entire contents of a file.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::FileNotFound`] if the path does not exist.
    pub async fn read(&self, path: impl AsRef<Path>) -> Result<Vec<u8>, StorageError> {
        let resolved = self.resolve(path)?;
        Self::read_resolved(&resolved).await
    }

    /// Writes data atomically, creating parent directories as needed.
    ///
    /// The target is never observed half-written: data goes to a unique
    /// `<name>.catalogtmp.<n>` sibling, is synced, then renamed into place.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::PathTraversalAttempt`] if the path escapes the sandbox.
    /// Returns [`StorageError::Io`] if disk space is full or hardware failure occurs.
    pub async fn write(&self, path: impl AsRef<Path>, data: &[u8]) -> Result<(), StorageError> {
        let resolved = self.resolve(path)?;
        self.write_resolved(&resolved, data).await
    }

    /// Recursively removes a directory inside the sandbox.
    ///
    /// Returns `Ok(false)` when there was nothing to remove. The root itself
    /// cannot be removed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::PathTraversalAttempt`] when targeting the root or
    /// escaping it, and [`StorageError::Io`] on filesystem failures.
    pub async fn remove_dir(&self, path: impl AsRef<Path>) -> Result<bool, StorageError> {
        let resolved = self.resolve(path)?;
        if resolved == self.root {
            return Err(StorageError::PathTraversalAttempt {
                message: resolved.display().to_string().into(),
                context: Some("Refusing to remove the storage root".into()),
            });
        }

        match fs::remove_dir_all(&resolved).await {
            Ok(()) => {
                debug!(path = %resolved.display(), "Directory removed");
                Ok(true)
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Failed to remove {}", resolved.display()).into()),
            }),
        }
    }

    /// Checks if a file or directory exists within the sandbox.
    ///
    /// # Errors
    ///
    /// Returns an `Err` only if path resolution fails.
    pub fn exists(&self, path: impl AsRef<Path>) -> Result<bool, StorageError> {
        Ok(self.resolve(path)?.exists())
    }

    pub async fn purge_tmp(&self) {
        maintenance::purge_tmp(&self.root).await;
    }

    pub(crate) async fn read_resolved(resolved: &Path) -> Result<Vec<u8>, StorageError> {
        match fs::read(resolved).await {
            Ok(data) => Ok(data),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::FileNotFound {
                    message: resolved.display().to_string().into(),
                    context: None,
                })
            },
            Err(err) => Err(StorageError::Io {
                source: err,
                context: Some(format!("Read failed: {}", resolved.display()).into()),
            }),
        }
    }

    pub(crate) async fn write_resolved(
        &self,
        resolved: &Path,
        data: &[u8],
    ) -> Result<(), StorageError> {
        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent)
                .await
                .context(format!("Failed to create directories for {}", resolved.display()))?;
        }

        let temp = unique_tmp_path(resolved, &self.tmp_counter);

        {
            let mut file = fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&temp)
                .await
                .context(format!("Temp creation failed: {}", temp.display()))?;
            file.write_all(data).await.context("Write failed")?;
            file.sync_all().await.context("Hardware sync failed")?;
        }

        if let Err(err) = fs::rename(&temp, resolved).await {
            if err.kind() == std::io::ErrorKind::AlreadyExists {
                fs::remove_file(resolved)
                    .await
                    .context(format!("Failed to replace existing file: {}", resolved.display()))?;
                fs::rename(&temp, resolved).await.context(format!(
                    "Atomic swap failed: {} -> {}",
                    temp.display(),
                    resolved.display()
                ))?;
            } else {
                let _ = fs::remove_file(&temp).await;
                return Err(StorageError::Io {
                    source: err,
                    context: Some(
                        format!("Atomic swap failed: {} -> {}", temp.display(), resolved.display())
                            .into(),
                    ),
                });
            }
        }

        debug!(path = %resolved.display(), bytes = data.len(), "File saved atomically");
        Ok(())
    }
}

fn unique_tmp_path(target: &Path, counter: &AtomicU64) -> PathBuf {
    let counter = counter.fetch_add(1, Ordering::Relaxed);
    let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("storage");
    target.with_file_name(format!("{file_name}{TMP_MARKER}{}.{counter}", std::process::id()))
}
