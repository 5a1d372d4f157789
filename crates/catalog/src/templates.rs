//! Package data compiled into the binary: the web UI, the default site
//! configuration and the metadata schemas.

use catalog_domain::constants::{
    AUTHORS_SCHEMA_ID, CATALOG_SCHEMA_ID, DATASET_SCHEMA_ID, EXTRACTORS_SCHEMA_ID, FILE_SCHEMA_ID,
};

/// A bundled file and its path relative to the catalog root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    pub path: &'static str,
    pub contents: &'static str,
}

/// Web UI content copied into every catalog.
pub const SITE: [Template; 4] = [
    Template { path: "index.html", contents: include_str!("../templates/index.html") },
    Template { path: "assets/app.js", contents: include_str!("../templates/assets/app.js") },
    Template { path: "assets/style.css", contents: include_str!("../templates/assets/style.css") },
    Template {
        path: "artwork/catalog_logo.svg",
        contents: include_str!("../templates/artwork/catalog_logo.svg"),
    },
];

/// Default site configuration, also the lowest configuration layer.
pub const CONFIG_JSON: &str = include_str!("../templates/config.json");

/// Bundled schema documents keyed by their `$id`.
pub const SCHEMAS: [(&str, &str); 5] = [
    (CATALOG_SCHEMA_ID, include_str!("../templates/schema/jsonschema_catalog.json")),
    (DATASET_SCHEMA_ID, include_str!("../templates/schema/jsonschema_dataset.json")),
    (FILE_SCHEMA_ID, include_str!("../templates/schema/jsonschema_file.json")),
    (AUTHORS_SCHEMA_ID, include_str!("../templates/schema/jsonschema_authors.json")),
    (EXTRACTORS_SCHEMA_ID, include_str!("../templates/schema/jsonschema_extractors.json")),
];
