//! Error taxonomy for the Asana CLI
//!
//! This crate provides pure data types for error handling, shared by the
//! request pipeline and the CLI boundary. It includes:
//! - The closed set of error kinds (`ErrorKind`) with their catalog entries (`ErrDef`)
//! - The single error type crossing the pipeline/caller boundary (`CliError`)
//! - The structured JSON error envelope printed by the CLI (`ErrorEnvelope`)
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod catalog;
pub mod envelope;
pub mod error;

// Re-export commonly used types
pub use catalog::{EXIT_SUCCESS, ErrDef, ErrorKind};
pub use envelope::{ErrorDetail, ErrorEnvelope};
pub use error::{BoxError, CliError};
