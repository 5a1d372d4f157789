//! A catalog directory on disk.
//!
//! ```text
//! <catalog>/
//!   index.html, assets/, artwork/     bundled web UI
//!   config.json                       site configuration
//!   metadata/super.json               home dataset
//!   metadata/<id>/<version>/<h3>/<h29>.json
//! ```

use crate::error::{CatalogError, CatalogErrorExt};
use crate::meta_item;
use crate::node::{NodeKey, NodeRegistry, NodeStore};
use crate::schema::CatalogSchema;
use crate::templates::SITE;
use catalog_domain::config::CatalogConfig;
use catalog_domain::constants::{
    CATALOG_MARKERS, CONFIG_FILE, METADATA_DIR, NODE_SHARD_WIDTH, SUPER_FILE,
};
use catalog_kernel::server::StaticServer;
use catalog_storage::{Storage, StorageError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// The dataset the catalog opens on, stored in `metadata/super.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuperDataset {
    pub dataset_id: String,
    pub dataset_version: String,
}

/// Outcome of [`WebCatalog::create`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateSummary {
    pub written: usize,
    pub skipped: usize,
}

/// Outcome of [`WebCatalog::add_metadata`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddSummary {
    pub items: usize,
    pub skipped: usize,
    pub nodes: usize,
}

#[derive(Debug, Clone)]
pub struct WebCatalog {
    location: PathBuf,
    config: CatalogConfig,
    /// Connected on first use and shared by every later operation.
    storage: OnceCell<Storage>,
}

impl WebCatalog {
    /// A catalog rooted at `location`; relative paths are made absolute.
    pub fn new(location: impl AsRef<Path>, config: CatalogConfig) -> Self {
        Self { location: absolute(location.as_ref()), config, storage: OnceCell::new() }
    }

    #[must_use]
    pub fn with_config(mut self, config: CatalogConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// The location exists and is a directory.
    #[must_use]
    pub fn path_exists(&self) -> bool {
        self.location.is_dir()
    }

    /// The location holds the web UI entries of a created catalog.
    #[must_use]
    pub fn is_created(&self) -> bool {
        self.path_exists() && CATALOG_MARKERS.iter().all(|marker| self.location.join(marker).exists())
    }

    /// The catalog's storage handle. The root must exist.
    async fn storage(&self) -> Result<&Storage, CatalogError> {
        self.storage
            .get_or_try_init(|| async {
                Storage::builder()
                    .root(&self.location)
                    .create(false)
                    .shard_width(NODE_SHARD_WIDTH)
                    .connect()
                    .await
                    .context(format!("Failed to open catalog at {}", self.location.display()))
            })
            .await
    }

    /// Creates the catalog layout, or refreshes the bundled content with `force`.
    ///
    /// Existing files are kept unless `force` is set. `metadata/` is created
    /// when missing and never touched otherwise.
    ///
    /// # Errors
    /// Returns [`CatalogError::Storage`] if the directory cannot be written.
    pub async fn create(&self, force: bool) -> Result<CreateSummary, CatalogError> {
        tokio::fs::create_dir_all(&self.location)
            .await
            .context(format!("Failed to create {}", self.location.display()))?;
        let storage = self.storage().await?;
        let mut summary = CreateSummary { written: 0, skipped: 0 };

        let metadata = storage.resolve(METADATA_DIR)?;
        tokio::fs::create_dir_all(&metadata)
            .await
            .context(format!("Failed to create {}", metadata.display()))?;

        for template in &SITE {
            if !force && storage.exists(template.path)? {
                debug!(path = template.path, "Keeping existing file");
                summary.skipped += 1;
                continue;
            }
            storage.write(template.path, template.contents.as_bytes()).await?;
            summary.written += 1;
        }

        if force || !storage.exists(CONFIG_FILE)? {
            let config = serde_json::to_vec_pretty(&self.config)
                .context("Failed to serialize catalog config")?;
            storage.write(CONFIG_FILE, &config).await?;
            summary.written += 1;
        } else {
            summary.skipped += 1;
        }

        info!(
            location = %self.location.display(),
            written = summary.written,
            skipped = summary.skipped,
            "Catalog content in place"
        );
        Ok(summary)
    }

    /// Validates and adds every item of a JSON-lines file.
    ///
    /// Nothing is written unless every line validates. Lines that are valid
    /// JSON but not objects are skipped with a warning.
    ///
    /// # Errors
    /// Returns [`CatalogError::Validation`] naming the first failing line,
    /// [`CatalogError::Json`] for unparsable lines, and storage errors on write.
    pub async fn add_metadata(&self, path: &Path) -> Result<AddSummary, CatalogError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .context(format!("Failed to read metadata file {}", path.display()))?;
        let schema = CatalogSchema::bundled()?;
        let storage = self.storage().await?;
        let mut registry = NodeRegistry::new(NodeStore::new(storage.clone()));
        let mut summary = AddSummary { items: 0, skipped: 0, nodes: 0 };

        for (number, line) in meta_item::lines(&content) {
            let value = meta_item::parse_line(number, line)?;
            let serde_json::Value::Object(item) = &value else {
                warn!(
                    line = number,
                    "Metadata item not of type dict: metadata items should be passed to the catalog as JSON objects adhering to the catalog schema"
                );
                summary.skipped += 1;
                continue;
            };

            schema.validate(&value).map_err(|errors| CatalogError::Validation {
                message: format!("LINE {number}: {}", errors.join("; ")).into(),
                context: None,
            })?;

            meta_item::translate(&mut registry, item)
                .await
                .context(format!("LINE {number}"))?;
            summary.items += 1;
        }

        summary.nodes = registry.flush().await?;
        info!(items = summary.items, nodes = summary.nodes, "Metadata added to catalog");
        Ok(summary)
    }

    /// Removes every node of one dataset version. Returns `false` if there was none.
    ///
    /// Only `metadata/<id>/<version>/` is deleted. Child records that other
    /// datasets hold for it as a subdataset are left in place and keep
    /// linking to it until those datasets are added again.
    ///
    /// # Errors
    /// Returns [`CatalogError::Storage`] if the id or version is not a valid
    /// path segment or the directory cannot be removed.
    pub async fn remove_dataset(
        &self,
        dataset_id: &str,
        dataset_version: &str,
    ) -> Result<bool, CatalogError> {
        let store = NodeStore::new(self.storage().await?.clone());
        let removed = store.dataset_namespace(dataset_id, dataset_version)?.remove().await?;

        if removed {
            info!(dataset_id, dataset_version, "Dataset removed from catalog");
            if self.super_dataset().await?.is_some_and(|s| {
                s.dataset_id == dataset_id && s.dataset_version == dataset_version
            }) {
                warn!(
                    dataset_id,
                    dataset_version,
                    "The removed dataset is the catalog's super dataset; set a new one with set-super"
                );
            }
        }
        Ok(removed)
    }

    /// Makes a dataset the catalog's home page.
    ///
    /// # Errors
    /// Returns [`CatalogError::Storage`] if `metadata/super.json` cannot be written.
    pub async fn set_super(
        &self,
        dataset_id: &str,
        dataset_version: &str,
    ) -> Result<SuperDataset, CatalogError> {
        if !self.has_dataset(dataset_id, dataset_version).await? {
            warn!(
                dataset_id,
                dataset_version,
                "Super dataset has no metadata in the catalog yet; add it before browsing"
            );
        }

        let super_dataset = SuperDataset {
            dataset_id: dataset_id.to_owned(),
            dataset_version: dataset_version.to_owned(),
        };
        let bytes = serde_json::to_vec(&super_dataset)?;
        self.storage().await?.write(super_path(), &bytes).await?;

        info!(dataset_id, dataset_version, "Super dataset set");
        Ok(super_dataset)
    }

    /// Reads `metadata/super.json`, if present.
    ///
    /// # Errors
    /// Returns [`CatalogError::Json`] if the file is malformed.
    pub async fn super_dataset(&self) -> Result<Option<SuperDataset>, CatalogError> {
        match self.storage().await?.read(super_path()).await {
            Ok(bytes) => Ok(Some(
                serde_json::from_slice(&bytes).context("Malformed metadata/super.json")?,
            )),
            Err(StorageError::FileNotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Whether the catalog holds a dataset node for `dataset_id`@`dataset_version`.
    ///
    /// # Errors
    /// Returns [`CatalogError::Storage`] if the catalog cannot be opened.
    pub async fn has_dataset(
        &self,
        dataset_id: &str,
        dataset_version: &str,
    ) -> Result<bool, CatalogError> {
        let store = NodeStore::new(self.storage().await?.clone());
        store.exists(&NodeKey::dataset(dataset_id, dataset_version))
    }

    /// Serves the catalog over HTTP until interrupted.
    ///
    /// # Errors
    /// Returns [`CatalogError::Server`] if the address cannot be bound.
    pub async fn serve(&self) -> Result<(), CatalogError> {
        let server = StaticServer::builder()
            .config(self.config.server.clone())
            .root(&self.location)
            .build()?;
        server.run().await?;
        Ok(())
    }
}

fn super_path() -> PathBuf {
    Path::new(METADATA_DIR).join(SUPER_FILE)
}

/// `path` made absolute against the working directory, unchanged if that fails.
pub(crate) fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(tmp: &tempfile::TempDir) -> WebCatalog {
        WebCatalog::new(tmp.path().join("catalog"), CatalogConfig::default())
    }

    #[test]
    fn relative_locations_become_absolute() {
        let path = absolute(Path::new("site/catalog"));
        assert!(path.is_absolute());
        assert!(path.ends_with("site/catalog"));
        assert_eq!(WebCatalog::new("site/catalog", CatalogConfig::default()).location(), path);
    }

    #[tokio::test]
    async fn storage_is_connected_once() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = catalog(&tmp);
        catalog.create(false).await.unwrap();

        let first: *const Storage = catalog.storage().await.unwrap();
        catalog.set_super("ds", "v1").await.unwrap();
        catalog.remove_dataset("ds", "v1").await.unwrap();
        let last: *const Storage = catalog.storage().await.unwrap();
        assert!(std::ptr::eq(first, last));
    }

    #[tokio::test]
    async fn storage_needs_an_existing_root() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = catalog(&tmp);

        assert!(catalog.super_dataset().await.is_err());
        assert!(!tmp.path().join("catalog").exists());

        catalog.create(false).await.unwrap();
        assert_eq!(catalog.super_dataset().await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_super_accepts_datasets_not_yet_added() {
        let tmp = tempfile::tempdir().unwrap();
        let catalog = catalog(&tmp);
        catalog.create(false).await.unwrap();

        assert!(!catalog.has_dataset("ds", "v1").await.unwrap());
        let chosen = catalog.set_super("ds", "v1").await.unwrap();
        assert_eq!(catalog.super_dataset().await.unwrap(), Some(chosen));
    }
}
