//! # Catalog
//!
//! Builds and maintains a static, browser-rendered metadata catalog.
//!
//! Metadata arrives as JSON lines, one dataset or file item per line. Items are
//! validated against the bundled JSON Schemas, translated into node files keyed
//! by the MD5 of their long name, and written below `metadata/` of the catalog
//! directory next to the bundled web UI.
//!
//! ## Usage
//! ```rust,no_run
//! use catalog::actions::{Request, run};
//! use catalog::domain::action::Action;
//!
//! # async fn example() -> Result<(), catalog::CatalogError> {
//! let request = Request::new(Action::Create)
//!     .catalog_dir("/data/catalog")
//!     .metadata("/data/metadata.jsonl");
//!
//! for record in run(&request).await? {
//!     println!("{record}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod actions;
mod error;
pub mod meta_item;
pub mod node;
pub mod schema;
pub mod templates;
pub mod webcatalog;

pub use crate::error::{CatalogError, CatalogErrorExt};
pub use catalog_domain as domain;
pub use catalog_kernel as kernel;
