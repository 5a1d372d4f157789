//! Kernel utilities shared by the catalog engine and the CLI.
//! Keep this crate lightweight: layered configuration loading and the static
//! file server used to preview a catalog.
//!
//! ## Config loading
//! ```rust
//! use catalog_kernel::config::load_config;
//! use catalog_kernel::domain::config::CatalogConfig;
//!
//! let cfg: CatalogConfig = load_config(None::<&str>, r#"{"catalog_name":"DataCat"}"#).unwrap();
//! assert_eq!(cfg.catalog_name, "DataCat");
//! ```
pub mod config;
pub mod server;

pub use catalog_domain as domain;
