//! Common types and utilities shared by the jaz crates.
//!
//! This crate provides the foundational pieces used across the pipeline:
//! - Source spans (`Span`)
//! - Diagnostics (`Diagnostic`, error code table)
//! - Declaration modifier flags (`Modifiers`)

pub mod diagnostics;
pub mod modifiers;
pub mod span;

pub use diagnostics::{Diagnostic, DiagnosticCategory, RelatedInformation, codes};
pub use modifiers::Modifiers;
pub use span::Span;
