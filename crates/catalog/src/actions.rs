//! Action dispatch for the `catalog` command.
//!
//! Every action except `validate` operates on a catalog directory, and the
//! state of that directory is checked before dispatch:
//!
//! | directory                 | `create`           | other actions |
//! |---------------------------|--------------------|---------------|
//! | missing                   | created            | error         |
//! | exists, not a catalog     | error              | error         |
//! | catalog                   | needs `force`      | run           |

use crate::error::{CatalogError, CatalogErrorExt};
use crate::meta_item;
use crate::schema::CatalogSchema;
use crate::templates::CONFIG_JSON;
use crate::webcatalog::{WebCatalog, absolute};
use catalog_domain::action::Action;
use catalog_domain::config::CatalogConfig;
use catalog_domain::constants::CONFIG_FILE;
use catalog_domain::result::{ActionResult, Status};
use catalog_kernel::config::load_config;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Arguments of one `catalog` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub action: Action,
    pub catalog_dir: Option<PathBuf>,
    pub metadata: Option<PathBuf>,
    pub dataset_id: Option<String>,
    pub dataset_version: Option<String>,
    pub force: bool,
    pub config_file: Option<PathBuf>,
}

impl Request {
    #[must_use]
    pub const fn new(action: Action) -> Self {
        Self {
            action,
            catalog_dir: None,
            metadata: None,
            dataset_id: None,
            dataset_version: None,
            force: false,
            config_file: None,
        }
    }

    #[must_use]
    pub fn catalog_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.catalog_dir = Some(path.into());
        self
    }

    #[must_use]
    pub fn metadata(mut self, path: impl Into<PathBuf>) -> Self {
        self.metadata = Some(path.into());
        self
    }

    #[must_use]
    pub fn dataset(mut self, id: impl Into<String>, version: impl Into<String>) -> Self {
        self.dataset_id = Some(id.into());
        self.dataset_version = Some(version.into());
        self
    }

    #[must_use]
    pub const fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    #[must_use]
    pub fn config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_file = Some(path.into());
        self
    }

    fn dataset_pair(&self, purpose: &str) -> Result<(&str, &str), CatalogError> {
        match (self.dataset_id.as_deref(), self.dataset_version.as_deref()) {
            (Some(id), Some(version)) if !id.is_empty() && !version.is_empty() => Ok((id, version)),
            _ => Err(CatalogError::InsufficientArguments {
                message: format!(
                    "Dataset ID and/or VERSION missing: catalog {} requires both the ID (-i, --dataset-id) and VERSION (-v, --dataset-version) of {purpose}",
                    self.action
                )
                .into(),
                context: None,
            }),
        }
    }

    fn metadata_path(&self) -> Result<&Path, CatalogError> {
        self.metadata.as_deref().ok_or_else(|| CatalogError::InsufficientArguments {
            message: "No metadata supplied: the catalog has to be supplied with metadata in the form of a path to a JSON lines file, using the argument: -m, --metadata".into(),
            context: None,
        })
    }
}

/// Runs one action and returns its result records.
///
/// `create` with metadata returns the create record even when adding the
/// metadata fails; the failure follows as an `error` record.
///
/// # Errors
/// Returns [`CatalogError::InsufficientArguments`] or [`CatalogError::NotACatalog`]
/// when the request does not fit the catalog's state, and the action's own
/// error otherwise.
pub async fn run(request: &Request) -> Result<Vec<ActionResult>, CatalogError> {
    debug!(action = %request.action, "Running catalog action");

    if request.action.is_standalone() {
        let path = request.metadata_path()?;
        let count = validate_metadata(path).await?;
        return Ok(vec![
            ActionResult::ok(request.action.label(), absolute(path))
                .with_message(format!("Metadata valid: {count} items checked")),
        ]);
    }

    let catalog_dir = request.catalog_dir.as_deref().ok_or_else(|| {
        CatalogError::InsufficientArguments {
            message: "No catalog directory supplied: the catalog can only operate on a path to a directory. Argument: -c, --catalog-dir".into(),
            context: None,
        }
    })?;

    let catalog = WebCatalog::new(catalog_dir, CatalogConfig::default());
    check_state(request, &catalog)?;
    let config = load_catalog_config(catalog.location(), request.config_file.as_deref()).await?;
    let catalog = catalog.with_config(config);

    match request.action {
        Action::Create => create(request, &catalog).await,
        Action::Add => add(request, &catalog).await.map(|record| vec![record]),
        Action::Remove => remove(request, &catalog).await.map(|record| vec![record]),
        Action::Serve => serve(request, &catalog).await.map(|record| vec![record]),
        Action::SetSuper => set_super(request, &catalog).await.map(|record| vec![record]),
        Action::Validate => Err(CatalogError::Internal {
            message: "validate does not operate on a catalog".into(),
            context: None,
        }),
    }
}

fn check_state(request: &Request, catalog: &WebCatalog) -> Result<(), CatalogError> {
    let location = catalog.location().display();

    if catalog.path_exists() && !catalog.is_created() {
        return Err(CatalogError::NotACatalog {
            message: format!(
                "A non-catalog directory already exists at {location}. Please supply a different path"
            )
            .into(),
            context: None,
        });
    }

    match (catalog.is_created(), request.action) {
        (false, action) if action != Action::Create => Err(CatalogError::InsufficientArguments {
            message: format!(
                "Catalog does not exist: catalog {action} can only operate on an existing catalog, please supply a path to an existing catalog with: -c, --catalog-dir"
            )
            .into(),
            context: None,
        }),
        (true, Action::Create) if !request.force => Err(CatalogError::InsufficientArguments {
            message: "Catalog already exists: overwriting catalog assets (not catalog metadata) is only possible when using the force argument: -f, --force".into(),
            context: None,
        }),
        _ => Ok(()),
    }
}

/// Layers the configuration: bundled defaults, or the catalog's own
/// `config.json` when it already has one, then the user file, then environment.
async fn load_catalog_config(
    catalog_dir: &Path,
    config_file: Option<&Path>,
) -> Result<CatalogConfig, CatalogError> {
    let existing = catalog_dir.join(CONFIG_FILE);
    let defaults = match tokio::fs::read_to_string(&existing).await {
        Ok(contents) => {
            debug!(path = %existing.display(), "Using existing catalog config as base layer");
            contents
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => CONFIG_JSON.to_owned(),
        Err(err) => {
            return Err(CatalogError::Io {
                source: err,
                context: Some(format!("Failed to read {}", existing.display()).into()),
            });
        },
    };

    Ok(load_config(config_file, &defaults)?)
}

async fn create(request: &Request, catalog: &WebCatalog) -> Result<Vec<ActionResult>, CatalogError> {
    let existed = catalog.is_created();
    catalog.create(request.force).await?;

    let message = if existed {
        format!("Catalog assets successfully overwritten at: {}", catalog.location().display())
    } else {
        format!("Catalog successfully created at: {}", catalog.location().display())
    };
    info!("{message}");
    let mut results = vec![ActionResult::ok(request.action.label(), catalog.location()).with_message(message)];

    // A failed add leaves the created catalog on disk.
    if request.metadata.is_some() {
        let record = add(request, catalog).await.unwrap_or_else(|err| {
            warn!(error = %err, "Catalog created, but its metadata could not be added");
            ActionResult::new(Action::Add.label(), catalog.location(), Status::Error)
                .with_message(err.to_string())
        });
        results.push(record);
    }
    Ok(results)
}

async fn add(request: &Request, catalog: &WebCatalog) -> Result<ActionResult, CatalogError> {
    let metadata = request.metadata_path()?;
    let summary = catalog.add_metadata(metadata).await?;

    if summary.skipped > 0 {
        warn!(skipped = summary.skipped, "Some metadata lines were not JSON objects and were skipped");
    }
    Ok(ActionResult::ok(Action::Add.label(), catalog.location())
        .with_message("Metadata items successfully added to catalog"))
}

async fn remove(request: &Request, catalog: &WebCatalog) -> Result<ActionResult, CatalogError> {
    let (id, version) = request.dataset_pair("the dataset to be removed from the catalog")?;

    if catalog.remove_dataset(id, version).await? {
        Ok(ActionResult::ok(request.action.label(), catalog.location())
            .with_message(format!("Dataset {id}@{version} successfully removed from catalog")))
    } else {
        Ok(ActionResult::new(request.action.label(), catalog.location(), Status::NotNeeded)
            .with_message(format!("Dataset {id}@{version} is not in the catalog")))
    }
}

async fn serve(request: &Request, catalog: &WebCatalog) -> Result<ActionResult, CatalogError> {
    catalog.serve().await?;
    Ok(ActionResult::ok(request.action.label(), catalog.location()).with_message("Catalog served"))
}

async fn set_super(request: &Request, catalog: &WebCatalog) -> Result<ActionResult, CatalogError> {
    let (id, version) =
        request.dataset_pair("the dataset that is to be used as the catalog's super dataset")?;
    catalog.set_super(id, version).await?;
    Ok(ActionResult::ok(request.action.label(), catalog.location())
        .with_message("Superdataset successfully set for catalog"))
}

/// Validates every line of a JSON-lines file against the catalog schema.
///
/// Returns the number of items checked.
///
/// # Errors
/// Returns [`CatalogError::Validation`] for the first invalid line (`LINE i/n`),
/// and [`CatalogError::Json`] for a line that is not JSON.
pub async fn validate_metadata(path: &Path) -> Result<usize, CatalogError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .context(format!("Failed to read metadata file {}", path.display()))?;
    let schema = CatalogSchema::bundled()?;
    let total = content.lines().count();
    let mut checked = 0;

    for (number, line) in meta_item::lines(&content) {
        debug!("metadata validation against catalog schema: LINE {number}/{total}");
        let item = meta_item::parse_line(number, line)?;
        if !item.is_object() {
            warn!(line = number, "Metadata item not of type dict");
        }
        schema.validate(&item).map_err(|errors| CatalogError::Validation {
            message: format!("LINE {number}/{total}: {}", errors.join("; ")).into(),
            context: None,
        })?;
        checked += 1;
    }

    info!(checked, path = %path.display(), "Metadata validated");
    Ok(checked)
}
