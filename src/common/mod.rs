//! Common types, traits, and utilities shared by both conversion directions.
//!
//! This module provides the unified error model, codepage handling, unit
//! conversion and XML escaping used by the RTF and XAML sides alike.

// Submodule declarations
pub mod encoding;
pub mod error;
pub mod unit;
pub mod xml;

// Re-exports for convenience
pub use error::{Error, ErrorKind, Result, status};
