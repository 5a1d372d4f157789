//! Sandboxed storage for catalog directories.
//!
//! A catalog is a plain directory tree that a browser reads directly, so this
//! crate stores bytes as-is (no compression) and focuses on:
//!
//! - **Sandbox Security**: every path is resolved against the canonical root.
//! - **Atomic Writes**: unique temp file + `fsync` + `rename`.
//! - **Namespacing & Sharding**: `metadata/<dataset>/<version>` views whose file
//!   names are split by a fixed-width prefix (`0a1/b2c3….json`).
//! - **Self-Healing**: interrupted writes are purged on connect.
//!
//! # Example
//!
//! ```rust
//! use catalog_storage::{Storage, StorageError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), StorageError> {
//!     # let tmp = tempfile::tempdir().unwrap();
//!     let storage = Storage::builder().root(tmp.path()).shard_width(3).connect().await?;
//!
//!     storage.write("metadata/super.json", br#"{"dataset_id":"abc"}"#).await?;
//!     assert_eq!(storage.read("metadata/super.json").await?, br#"{"dataset_id":"abc"}"#);
//!     Ok(())
//! }
//! ```

mod builder;
mod engine;
mod error;
mod maintenance;
mod namespace;
mod security;

pub use builder::StorageBuilder;
pub use engine::Storage;
pub use error::{StorageError, StorageErrorExt};
pub use namespace::{NamespaceName, NamespacedStorage};
