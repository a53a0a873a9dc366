//! Unified error types for the converter.
//!
//! This module provides the result-code enumeration shared by every layer and
//! the error type that carries it, presenting a consistent API to users.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{Error, ErrorKind, Result, status};
