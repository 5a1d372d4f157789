use catalog_domain::constants::ENV_PREFIX;
use config::{Config, Environment, File, FileFormat};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::Path;
use tracing::{debug, info};

/// Custom error type for config loading.
#[catalog_derive::catalog_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
    #[error("Config file not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// A reusable configuration loader that layers bundled defaults, a user file and
/// environment overrides.
///
/// 1. **Defaults**: a JSON document compiled into the binary.
/// 2. **User File**: optional; YAML, JSON or TOML chosen by extension. Keys it
///    leaves out keep their default value.
/// 3. **Environment Overrides**: variables prefixed with `CATALOG__`; nested keys
///    use double underscores (`CATALOG__SERVER__PORT` maps to `server.port`).
///
/// # Errors
/// Returns [`ConfigError::NotFound`] if `path` is given but missing, and
/// [`ConfigError::Config`] if a layer cannot be parsed or the merged result does
/// not match `T`.
///
/// # Example
/// ```rust
/// use catalog_kernel::config::load_config;
///
/// #[derive(serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(None::<&str>, r#"{"port": 8000}"#).unwrap();
/// assert_eq!(cfg.port, 8000);
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>, defaults: &str) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let env = Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
        .convert_case(config::Case::Snake);

    load_layered(path.as_ref().map(|p| p.as_ref()), defaults, env)
}

fn load_layered<T>(path: Option<&Path>, defaults: &str, env: Environment) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let mut builder = Config::builder().add_source(File::from_str(defaults, FileFormat::Json));

    if let Some(path) = path {
        if !path.is_file() {
            return Err(ConfigError::NotFound {
                message: path.display().to_string().into(),
                context: Some("Supplied configuration file does not exist".into()),
            });
        }
        info!(path = %path.display(), "Loading config file");
        builder = builder.add_source(File::from(path).required(true));
    } else {
        debug!("No config file supplied, using bundled defaults");
    }

    let config = builder
        .add_source(env)
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
