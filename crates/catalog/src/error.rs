use catalog_kernel::config::ConfigError;
use catalog_kernel::server::ServerError;
use catalog_storage::StorageError;
use std::borrow::Cow;

/// Error types of the catalog engine.
#[catalog_derive::catalog_error]
pub enum CatalogError {
    /// A required argument for the requested action is missing, or the catalog
    /// is in the wrong state for it (absent, or present without `force`).
    #[error("Insufficient arguments{}: {message}", format_context(.context))]
    InsufficientArguments { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A directory exists at the catalog path but does not hold a catalog.
    #[error("Not a catalog{}: {message}", format_context(.context))]
    NotACatalog { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A metadata item failed schema validation.
    #[error("Schema validation failed in {message}{}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A metadata item passed validation but cannot be placed in the catalog.
    #[error("Invalid metadata item{}: {message}", format_context(.context))]
    InvalidMetadata { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The bundled schemas could not be compiled.
    #[error("Schema error{}: {message}", format_context(.context))]
    Schema { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("JSON error{}: {source}", format_context(.context))]
    Json { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Catalog storage error{}: {source}", format_context(.context))]
    Storage { source: StorageError, context: Option<Cow<'static, str>> },

    #[error("Catalog configuration error{}: {source}", format_context(.context))]
    Config { source: ConfigError, context: Option<Cow<'static, str>> },

    #[error("Catalog server error{}: {source}", format_context(.context))]
    Server { source: ServerError, context: Option<Cow<'static, str>> },

    #[error("Catalog I/O error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    /// Internal fallback for unexpected issues or logic errors.
    #[error("Internal catalog error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
