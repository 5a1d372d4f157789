#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the catalog workspace.
//!
//! * [`macro@main`] bootstraps the tokio runtime from an `async fn main`.
//! * [`macro@catalog_error`] turns a plain enum into a `thiserror` error with
//!   context propagation.
//!
//! The examples are `ignore`d because they would have to compile inside this
//! proc-macro crate; consuming crates exercise them in their own tests.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, parse_macro_input};

/// Attribute macro to bootstrap the catalog's tokio runtime.
///
/// The annotated `async fn main` is rewritten into a synchronous `fn main` that
/// builds a runtime from one of the [`RuntimeConfig`] presets and blocks on the
/// original body.
///
/// # Arguments
///
/// * `default` - Worker threads auto-detected from available parallelism.
/// * `memory_efficient` - Half the workers and smaller stacks; the CLI profile.
/// * `high_performance` - Larger stacks and longer keep-alive for serving.
///
/// # Examples
///
/// ```rust,ignore
/// #[catalog_runtime::main(memory_efficient)]
/// async fn main() -> anyhow::Result<()> {
///     Ok(())
/// }
/// ```
///
/// [`RuntimeConfig`]: https://docs.rs/catalog-runtime
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Attribute macro for the error enums of catalog crates.
///
/// # Features
///
/// * **Automatic Derives**: Injects `#[derive(Debug, thiserror::Error)]` unless already present.
/// * **Context Support**: Generates a companion `<Name>Ext` trait that adds `.context()`
///   to `Result<T, Name>` and to `Result<T, Source>` for every wrapped source error.
/// * **Standard Conversions**: Implements `From<Source>` for variants with a `source`
///   field (or a field marked `#[source]`/`#[from]`), so `?` works on upstream errors.
/// * **Internal Fallback**: Implements `From<&'static str>` and `From<String>` when an
///   `Internal { message, context }` variant exists.
/// * **Display Helper**: Emits a private `format_context` function for `#[error(...)]` strings.
///
/// # Requirements
///
/// 1. Only enums are accepted.
/// 2. Variants use named fields; tuple and unit variants are rejected.
/// 3. A variant carrying a source must also carry `context: Option<Cow<'static, str>>`.
///
/// # Example
///
/// ```rust,ignore
/// use catalog_derive::catalog_error;
/// use std::borrow::Cow;
///
/// #[catalog_error]
/// pub enum SchemaError {
///     #[error("Schema I/O error{}: {source}", format_context(.context))]
///     Io { source: std::io::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal schema error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
///
/// fn load(path: &std::path::Path) -> Result<String, SchemaError> {
///     std::fs::read_to_string(path).context("Reading bundled schema")
/// }
/// ```
#[proc_macro_attribute]
pub fn catalog_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}
