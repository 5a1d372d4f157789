//! Catalog layout and schema identifiers shared by every crate.

/// Top-level directory holding one namespace per dataset id.
pub const METADATA_DIR: &str = "metadata";
pub const ASSETS_DIR: &str = "assets";
pub const ARTWORK_DIR: &str = "artwork";
pub const INDEX_HTML: &str = "index.html";
pub const CONFIG_FILE: &str = "config.json";
/// Relative to [`METADATA_DIR`].
pub const SUPER_FILE: &str = "super.json";

/// Entries whose presence marks a directory as a created catalog.
pub const CATALOG_MARKERS: [&str; 3] = [ASSETS_DIR, ARTWORK_DIR, INDEX_HTML];

/// Node files are stored as `<md5[..3]>/<md5[3..]>.json`.
pub const NODE_SHARD_WIDTH: usize = 3;
pub const NODE_FILE_EXTENSION: &str = "json";

pub const CATALOG_SCHEMA_ID: &str = "https://datalad.org/catalog.schema.json";
pub const DATASET_SCHEMA_ID: &str = "https://datalad.org/catalog.dataset.schema.json";
pub const FILE_SCHEMA_ID: &str = "https://datalad.org/catalog.file.schema.json";
pub const AUTHORS_SCHEMA_ID: &str = "https://datalad.org/catalog.authors.schema.json";
pub const EXTRACTORS_SCHEMA_ID: &str = "https://datalad.org/catalog.extractors.schema.json";

/// Prefix of environment variables overriding configuration, e.g. `CATALOG__SERVER__PORT`.
pub const ENV_PREFIX: &str = "CATALOG";
