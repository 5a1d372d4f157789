//! # CLI Argument Definitions

use catalog::actions::Request;
use catalog::domain::action::Action;
use catalog::domain::registry::ENTRY_POINTS;
use catalog_logger::LevelFilter;
use clap::{Parser, ValueEnum};
use std::fmt::Write;
use std::path::PathBuf;

/// Generate, update and serve a browser-based catalog of dataset metadata.
#[derive(Debug, Parser)]
#[command(name = "datalad-catalog")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(after_help = entry_points_help())]
pub struct Cli {
    /// Catalog action to perform
    #[arg(value_enum)]
    pub action: ActionArg,

    /// Directory of the catalog to operate on
    #[arg(short = 'c', long)]
    pub catalog_dir: Option<PathBuf>,

    /// JSON lines file with metadata items, one object per line
    #[arg(short = 'm', long)]
    pub metadata: Option<PathBuf>,

    /// Dataset id (set-super, remove)
    #[arg(short = 'i', long)]
    pub dataset_id: Option<String>,

    /// Dataset version (set-super, remove)
    #[arg(short = 'v', long)]
    pub dataset_version: Option<String>,

    /// Overwrite the assets of an existing catalog
    #[arg(short = 'f', long)]
    pub force: bool,

    /// YAML or JSON file overriding the catalog's site configuration
    #[arg(short = 'y', long)]
    pub config_file: Option<PathBuf>,

    /// Print result records as JSON lines
    #[arg(long)]
    pub json: bool,

    /// Minimum level of log messages written to stderr
    #[arg(long, default_value_t = LevelFilter::INFO)]
    pub log_level: LevelFilter,

    /// Also write rolling log files into this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActionArg {
    /// Create a new catalog, optionally adding metadata
    Create,
    /// Add metadata to an existing catalog
    Add,
    /// Remove one dataset version from a catalog
    Remove,
    /// Serve a catalog over HTTP
    Serve,
    /// Set the dataset the catalog opens on
    SetSuper,
    /// Validate metadata against the catalog schema
    Validate,
}

impl From<ActionArg> for Action {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::Create => Self::Create,
            ActionArg::Add => Self::Add,
            ActionArg::Remove => Self::Remove,
            ActionArg::Serve => Self::Serve,
            ActionArg::SetSuper => Self::SetSuper,
            ActionArg::Validate => Self::Validate,
        }
    }
}

impl Cli {
    #[must_use]
    pub fn request(&self) -> Request {
        Request {
            action: self.action.into(),
            catalog_dir: self.catalog_dir.clone(),
            metadata: self.metadata.clone(),
            dataset_id: self.dataset_id.clone(),
            dataset_version: self.dataset_version.clone(),
            force: self.force,
            config_file: self.config_file.clone(),
        }
    }
}

fn entry_points_help() -> String {
    let mut help = String::from("Registered entry points:");
    for entry_point in &ENTRY_POINTS {
        let _ = write!(help, "\n  {entry_point}");
    }
    help
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn short_flags_map_onto_request() {
        let cli = Cli::try_parse_from([
            "datalad-catalog",
            "set-super",
            "-c",
            "site",
            "-i",
            "abc",
            "-v",
            "1.0",
        ])
        .unwrap();
        let request = cli.request();

        assert_eq!(request.action, Action::SetSuper);
        assert_eq!(request.catalog_dir, Some(PathBuf::from("site")));
        assert_eq!(request.dataset_id.as_deref(), Some("abc"));
        assert_eq!(request.dataset_version.as_deref(), Some("1.0"));
        assert!(!request.force);
    }

    #[test]
    fn log_level_parses() {
        let cli = Cli::try_parse_from(["datalad-catalog", "validate", "--log-level", "debug"]).unwrap();
        assert_eq!(cli.log_level, LevelFilter::DEBUG);
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(Cli::try_parse_from(["datalad-catalog", "publish"]).is_err());
    }

    #[test]
    fn every_action_has_an_argument() {
        let labels: Vec<String> = ActionArg::value_variants()
            .iter()
            .map(|arg| Action::from(*arg).to_string())
            .collect();
        assert_eq!(labels, ["create", "add", "remove", "serve", "set-super", "validate"]);
    }
}
