use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Operations of the `catalog` command.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Action {
    Create,
    Add,
    Remove,
    Serve,
    SetSuper,
    Validate,
}

impl Action {
    /// Whether the action runs without a catalog directory.
    #[must_use]
    pub const fn is_standalone(self) -> bool {
        matches!(self, Self::Validate)
    }

    /// Label used in result records, e.g. `catalog set-super`.
    #[must_use]
    pub fn label(self) -> String {
        format!("catalog {self}")
    }
}
