//! Static entry-point registry.
//!
//! Mirrors the plugin registrations the catalog publishes to its host:
//! a group name, a label inside that group and the target symbol the host
//! loads. Targets are opaque strings; nothing here resolves them.

use serde::Serialize;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Host groups the catalog registers into.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter, AsRefStr,
)]
pub enum EntryPointGroup {
    #[strum(serialize = "datalad.extensions")]
    #[serde(rename = "datalad.extensions")]
    Extensions,
    #[strum(serialize = "datalad.metadata.extractors")]
    #[serde(rename = "datalad.metadata.extractors")]
    MetadataExtractors,
    #[strum(serialize = "datalad.tests")]
    #[serde(rename = "datalad.tests")]
    Tests,
}

/// A label in a group mapped to a loadable target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct EntryPoint {
    pub group: EntryPointGroup,
    pub label: &'static str,
    pub target: &'static str,
}

impl std::fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} = {}", self.group, self.label, self.target)
    }
}

pub const ENTRY_POINTS: [EntryPoint; 3] = [
    EntryPoint {
        group: EntryPointGroup::Extensions,
        label: "catalog",
        target: "datalad_catalog:command_suite",
    },
    EntryPoint {
        group: EntryPointGroup::MetadataExtractors,
        label: "datacite_gin",
        target: "datalad_catalog.extractors.datacite_gin:DataciteGINDatasetExtractor",
    },
    EntryPoint { group: EntryPointGroup::Tests, label: "catalog", target: "datalad_catalog" },
];

/// Finds the registration for `label` inside `group`.
#[must_use]
pub fn lookup(group: EntryPointGroup, label: &str) -> Option<&'static EntryPoint> {
    ENTRY_POINTS.iter().find(|ep| ep.group == group && ep.label == label)
}

/// All registrations of one group, in declaration order.
pub fn in_group(group: EntryPointGroup) -> impl Iterator<Item = &'static EntryPoint> {
    ENTRY_POINTS.iter().filter(move |ep| ep.group == group)
}
