//! # Domain Models
//!
//! Pure catalog types with minimal dependencies (`serde`, `strum`).
//! No I/O lives here: layout constants, configuration shapes, node kinds,
//! the entry-point registry and the result records actions report.

pub mod action;
pub mod config;
pub mod constants;
pub mod node;
pub mod registry;
pub mod result;
