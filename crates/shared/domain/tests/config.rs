use catalog_domain::config::CatalogConfig;
use serde_json::json;
use std::net::{IpAddr, Ipv4Addr};

#[test]
fn config_defaults_are_sane() {
    let cfg = CatalogConfig::default();
    assert_eq!(cfg.catalog_name, "DataCat");
    assert_eq!(cfg.logo_path, "artwork/catalog_logo.svg");
    assert!(cfg.dataset_options.include_metadata_export);
    assert_eq!(cfg.social_links.get("about"), Some(&None));
    assert_eq!(cfg.server.address, IpAddr::V4(Ipv4Addr::LOCALHOST));
    assert_eq!(cfg.server.port, 8000);
}

#[test]
fn partial_config_keeps_defaults() {
    let raw = json!({
        "catalog_name": "Lab Catalog",
        "server": { "port": 9000 }
    });

    let cfg: CatalogConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.catalog_name, "Lab Catalog");
    assert_eq!(cfg.link_color, "#fba304");
    assert_eq!(cfg.server.port, 9000);
    assert_eq!(cfg.server.address, IpAddr::V4(Ipv4Addr::LOCALHOST));
}

#[test]
fn server_section_is_not_written_to_the_site_config() {
    let mut cfg = CatalogConfig::default();
    cfg.server.port = 1234;

    let value = serde_json::to_value(&cfg).expect("config serialize");
    assert!(value.get("server").is_none());
    assert_eq!(value["catalog_name"], "DataCat");
    assert_eq!(value["dataset_options"]["include_metadata_export"], true);
}

#[test]
fn clones_share_until_mutated() {
    let original = CatalogConfig::default();
    let mut copy = original.clone();
    copy.catalog_name = "Other".to_owned();

    assert_eq!(original.catalog_name, "DataCat");
    assert_eq!(copy.catalog_name, "Other");
}
