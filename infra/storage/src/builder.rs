use crate::engine::{Storage, StorageInner};
use crate::error::{StorageError, StorageErrorExt};
use private::Sealed;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use tokio::fs;
use tracing::{debug, info};

/// Three hex characters of an MD5 digest, as the catalog web UI expects.
const DEFAULT_SHARD_WIDTH: usize = 3;

#[derive(Debug, Clone)]
struct StorageConfig {
    create: bool,
    shard_width: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { create: true, shard_width: DEFAULT_SHARD_WIDTH }
    }
}

#[derive(Debug, Default)]
pub struct NoRoot;
#[derive(Debug)]
pub struct WithRoot(PathBuf);

mod private {
    pub(super) trait Sealed {}
}
impl Sealed for NoRoot {}
impl Sealed for WithRoot {}

#[allow(private_bounds)]
#[derive(Debug, Default)]
pub struct StorageBuilder<S: Sealed = NoRoot> {
    state: S,
    config: StorageConfig,
}

#[allow(private_bounds)]
impl<S: Sealed> StorageBuilder<S> {
    /// Whether a missing root directory should be created on connect.
    #[must_use]
    pub const fn create(mut self, enable: bool) -> Self {
        self.config.create = enable;
        self
    }

    /// Number of file-name characters moved into the shard directory; `0` disables sharding.
    #[must_use]
    pub const fn shard_width(mut self, width: usize) -> Self {
        self.config.shard_width = width;
        self
    }

    fn transition<N: Sealed>(self, state: N) -> StorageBuilder<N> {
        StorageBuilder { state, config: self.config }
    }
}

impl StorageBuilder<NoRoot> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn root(self, path: impl Into<PathBuf>) -> StorageBuilder<WithRoot> {
        self.transition(WithRoot(path.into()))
    }
}

impl StorageBuilder<WithRoot> {
    /// Consumes the configuration and initializes the storage engine.
    ///
    /// 1. Creates the root directory if `create(true)` was set.
    /// 2. Canonicalizes the root so later sandbox checks compare physical paths.
    /// 3. Purges stale temp files left behind by interrupted writes.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::DirectoryNotFound`] if the root does not exist and
    /// `create` is false, or [`StorageError::Io`] if it cannot be created or resolved.
    pub async fn connect(self) -> Result<Storage, StorageError> {
        let root = &self.state.0;

        if self.config.create {
            fs::create_dir_all(root)
                .await
                .context(format!("Failed to bootstrap storage root: {}", root.display()))?;
            debug!(path = %root.display(), "Storage root ready");
        } else if !fs::try_exists(root).await.unwrap_or(false) {
            return Err(StorageError::DirectoryNotFound {
                message: root.display().to_string().into(),
                context: Some("Storage root does not exist".into()),
            });
        }

        let canonical = fs::canonicalize(root)
            .await
            .context(format!("Failed to resolve storage root: {}", root.display()))?;

        info!(path = %canonical.display(), shard_width = self.config.shard_width, "Storage connected");

        let storage = Storage {
            inner: Arc::new(StorageInner {
                root: canonical,
                shard_width: self.config.shard_width,
                tmp_counter: AtomicU64::new(1),
            }),
        };

        storage.purge_tmp().await;

        Ok(storage)
    }
}
