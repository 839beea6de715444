//! Diagnostic rendering.
//!
//! Formats diagnostics as `file:line:col - category JAZ<code>: message`,
//! with an optional source snippet underlining the span. Sources come from
//! the driver when the file was read in this run, or from disk otherwise.

use colored::Colorize;
use rustc_hash::FxHashMap;

use jaz_common::{Diagnostic, DiagnosticCategory, RelatedInformation};

pub struct Reporter {
    color: bool,
    sources: FxHashMap<String, String>,
}

impl Reporter {
    pub fn new(color: bool) -> Reporter {
        Reporter {
            color,
            sources: FxHashMap::default(),
        }
    }

    /// Register a source text so spans in `file` can be rendered without
    /// re-reading it from disk.
    pub fn add_source(&mut self, file: impl Into<String>, text: impl Into<String>) {
        self.sources.insert(file.into(), text.into());
    }

    pub fn render(&mut self, diagnostics: &[Diagnostic]) -> String {
        let mut out = String::new();
        for (index, diagnostic) in diagnostics.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            out.push_str(&self.format_diagnostic(diagnostic));
        }
        out
    }

    pub fn format_diagnostic(&mut self, diagnostic: &Diagnostic) -> String {
        let mut output = String::new();
        output.push_str(
            &self
                .format_location(&diagnostic.file, diagnostic.span_start)
                .unwrap_or_else(|| diagnostic.file.clone()),
        );
        output.push_str(" - ");
        output.push_str(&self.format_category(diagnostic.category));
        output.push(' ');
        output.push_str(&self.format_code(diagnostic.code));
        output.push_str(": ");
        output.push_str(&diagnostic.message);

        if let Some(snippet) =
            self.format_snippet(&diagnostic.file, diagnostic.span_start, diagnostic.span_len)
        {
            output.push_str(&snippet);
        }
        for related in &diagnostic.related {
            output.push('\n');
            output.push_str(&self.format_related(related));
        }
        output
    }

    /// A source line with the span underlined:
    ///
    /// ```text
    ///     3   int x = y;
    ///                 ~
    /// ```
    fn format_snippet(&mut self, file: &str, start: u32, len: u32) -> Option<String> {
        if file.is_empty() || len == 0 {
            return None;
        }
        let (line_num, column) = self.position_for(file, start)?;
        let source = self.sources.get(file)?;
        let line_text = source.lines().nth(line_num as usize - 1)?.to_string();

        let mut underline = String::new();
        for (i, ch) in line_text.chars().enumerate() {
            let offset = i as u32;
            if offset < column - 1 {
                underline.push(if ch == '\t' { '\t' } else { ' ' });
            } else if offset < column - 1 + len {
                underline.push('~');
            } else {
                break;
            }
        }
        if underline.is_empty() {
            underline.push('~');
        }
        let underline = if self.color {
            underline.red().to_string()
        } else {
            underline
        };
        Some(format!("\n  {line_num:>3}   {line_text}\n        {underline}"))
    }

    fn format_related(&mut self, related: &RelatedInformation) -> String {
        let location = self
            .format_location(&related.file, related.span_start)
            .unwrap_or_else(|| related.file.clone());
        let prefix = if self.color {
            "  Related".dimmed().to_string()
        } else {
            "  Related".to_string()
        };
        format!("{prefix}: {location} - {}", related.message)
    }

    fn format_location(&mut self, file: &str, offset: u32) -> Option<String> {
        if file.is_empty() {
            return None;
        }
        let (line, column) = self.position_for(file, offset)?;
        Some(format!("{file}:{line}:{column}"))
    }

    /// 1-based line and column of a byte offset.
    fn position_for(&mut self, file: &str, offset: u32) -> Option<(u32, u32)> {
        self.ensure_source(file)?;
        let source = self.sources.get(file)?;
        let prefix = source.get(..offset as usize)?;
        let line = prefix.matches('\n').count() as u32 + 1;
        let column = match prefix.rfind('\n') {
            Some(nl) => prefix[nl + 1..].chars().count() as u32 + 1,
            None => prefix.chars().count() as u32 + 1,
        };
        Some((line, column))
    }

    fn ensure_source(&mut self, file: &str) -> Option<()> {
        if !self.sources.contains_key(file) {
            let contents = std::fs::read_to_string(file).ok()?;
            self.sources.insert(file.to_string(), contents);
        }
        Some(())
    }

    fn format_category(&self, category: DiagnosticCategory) -> String {
        let label = match category {
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Warning => "warning",
        };
        if !self.color {
            return label.to_string();
        }
        match category {
            DiagnosticCategory::Error => label.red().bold().to_string(),
            DiagnosticCategory::Warning => label.yellow().bold().to_string(),
        }
    }

    fn format_code(&self, code: u32) -> String {
        let label = format!("JAZ{code}");
        if self.color {
            label.bright_blue().to_string()
        } else {
            label
        }
    }
}
