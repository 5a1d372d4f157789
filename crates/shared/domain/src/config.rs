use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Catalog configuration.
///
/// The site fields are what the web UI reads from `<catalog>/config.json`;
/// `server` only drives `serve` and is never written to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfigInner {
    pub catalog_name: String,
    pub logo_path: String,
    pub link_color: String,
    pub link_hover_color: String,
    /// Link name to URL; `null` hides the link in the UI.
    pub social_links: BTreeMap<String, Option<String>>,
    pub dataset_options: DatasetOptions,
    #[serde(skip_serializing)]
    pub server: ServerConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(flatten, default)]
    inner: Arc<CatalogConfigInner>,
}

impl Deref for CatalogConfig {
    type Target = CatalogConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for CatalogConfig {
    fn deref_mut(&mut self) -> &mut CatalogConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Per-dataset UI switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetOptions {
    pub include_metadata_export: bool,
}

/// Local HTTP server used by `serve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: IpAddr,
    pub port: u16,
}

// --- Default ---

impl Default for CatalogConfigInner {
    fn default() -> Self {
        let social_links = [
            ("about", None),
            ("documentation", Some("https://docs.datalad.org/projects/catalog/en/latest/")),
            ("github", Some("https://github.com/datalad/datalad-catalog")),
            ("mastodon", Some("https://fosstodon.org/@datalad")),
            ("x", Some("https://x.com/datalad")),
        ]
        .into_iter()
        .map(|(name, url)| (name.to_owned(), url.map(str::to_owned)))
        .collect();

        Self {
            catalog_name: "DataCat".to_owned(),
            logo_path: "artwork/catalog_logo.svg".to_owned(),
            link_color: "#fba304".to_owned(),
            link_hover_color: "#af7714".to_owned(),
            social_links,
            dataset_options: DatasetOptions::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self { include_metadata_export: true }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: IpAddr::V4(Ipv4Addr::LOCALHOST), port: 8000 }
    }
}
