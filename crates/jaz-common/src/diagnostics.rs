//! Diagnostics for the resolution pipeline.
//!
//! Every semantic error carries a stable numeric code so tests and external
//! tooling can match on the condition rather than on message text.

use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning,
    Error,
}

/// Stable error codes, grouped by the error taxonomy: 1xxx parse/IO,
/// 2xxx lints, 3xxx lookup/ambiguity, 4xxx structural violations.
pub mod codes {
    pub const SYNTAX_ERROR: u32 = 1001;
    pub const LOAD_FAILED: u32 = 1002;

    pub const UNUSED_IMPORT: u32 = 2001;

    pub const UNRESOLVED_NAME: u32 = 3001;
    pub const AMBIGUOUS_REFERENCE: u32 = 3002;
    pub const CONFLICTING_IMPORT: u32 = 3003;
    pub const NOT_A_PACKAGE: u32 = 3004;

    pub const EXTENDS_INTERFACE: u32 = 4001;
    pub const IMPLEMENTS_NON_INTERFACE: u32 = 4002;
    pub const ILLEGAL_OVERRIDE: u32 = 4003;
    pub const ABSTRACT_NOT_IMPLEMENTED: u32 = 4004;
    pub const DUPLICATE_DECLARATION: u32 = 4005;
    pub const JUMP_OUTSIDE_CONTEXT: u32 = 4006;
    pub const CONTINUE_NON_LOOP: u32 = 4007;
    pub const LOCAL_SHADOWS_PARAMETER: u32 = 4008;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedInformation {
    pub file: String,
    pub span_start: u32,
    pub span_len: u32,
    pub message: String,
}

/// A single reportable condition, fatal unless its category is `Warning`.
///
/// Fatal diagnostics abort the enclosing pass for the offending compilation
/// unit; there is no soft-failure mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub file: String,
    pub span_start: u32,
    pub span_len: u32,
    pub message: String,
    pub related: Vec<RelatedInformation>,
}

impl Diagnostic {
    pub fn error(file: impl Into<String>, code: u32, message: impl Into<String>) -> Diagnostic {
        Diagnostic {
            category: DiagnosticCategory::Error,
            code,
            file: file.into(),
            span_start: 0,
            span_len: 0,
            message: message.into(),
            related: Vec::new(),
        }
    }

    pub fn warning(file: impl Into<String>, code: u32, message: impl Into<String>) -> Diagnostic {
        Diagnostic {
            category: DiagnosticCategory::Warning,
            ..Diagnostic::error(file, code, message)
        }
    }

    pub fn with_span(mut self, start: u32, len: u32) -> Diagnostic {
        self.span_start = start;
        self.span_len = len;
        self
    }

    pub fn with_related(
        mut self,
        file: impl Into<String>,
        start: u32,
        len: u32,
        message: impl Into<String>,
    ) -> Diagnostic {
        self.related.push(RelatedInformation {
            file: file.into(),
            span_start: start,
            span_len: len,
            message: message.into(),
        });
        self
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.category {
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Error => "error",
        };
        write!(f, "{}: {kind} JAZ{}: {}", self.file, self.code, self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_and_file() {
        let d = Diagnostic::error("A.jav", codes::UNRESOLVED_NAME, "unresolved name 'x'");
        assert_eq!(d.to_string(), "A.jav: error JAZ3001: unresolved name 'x'");
        assert!(d.is_error());
    }

    #[test]
    fn related_information_accumulates() {
        let d = Diagnostic::error("A.jav", codes::AMBIGUOUS_REFERENCE, "ambiguous 'X'")
            .with_related("p/X.jav", 0, 1, "candidate p.X")
            .with_related("q/X.jav", 0, 1, "candidate q.X");
        assert_eq!(d.related.len(), 2);
    }
}
