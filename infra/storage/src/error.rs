use std::borrow::Cow;

/// A specialized [`StorageError`] enum of this crate.
#[catalog_derive::catalog_error]
pub enum StorageError {
    #[error("Directory not found{}: {message}", format_context(.context))]
    DirectoryNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("File not found{}: {message}", format_context(.context))]
    FileNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Path traversal security violation{}: {message}", format_context(.context))]
    PathTraversalAttempt { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid namespace{}: {message}", format_context(.context))]
    InvalidNamespace { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Storage I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },
}
