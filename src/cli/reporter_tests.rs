use jaz_common::{Diagnostic, codes};

use super::reporter::Reporter;

#[test]
fn formats_location_category_and_code() {
    let mut reporter = Reporter::new(false);
    reporter.add_source("A.jav", "class A {\n  int x = y;\n}\n");

    let diagnostic = Diagnostic::error("A.jav", codes::UNRESOLVED_NAME, "cannot resolve `y`")
        .with_span(20, 1);
    let rendered = reporter.format_diagnostic(&diagnostic);

    assert!(rendered.starts_with("A.jav:2:11 - error JAZ3001: cannot resolve `y`"));
    assert!(rendered.contains("int x = y;"));
    assert!(rendered.contains('~'));
}

#[test]
fn zero_length_span_omits_snippet() {
    let mut reporter = Reporter::new(false);
    reporter.add_source("A.jav", "class A {}\n");

    let diagnostic = Diagnostic::error("A.jav", codes::LOAD_FAILED, "cannot read source");
    let rendered = reporter.format_diagnostic(&diagnostic);
    assert_eq!(rendered, "A.jav:1:1 - error JAZ1002: cannot read source");
}

#[test]
fn warnings_are_labeled_as_warnings() {
    let mut reporter = Reporter::new(false);
    reporter.add_source("A.jav", "import p.Q;\n");

    let diagnostic =
        Diagnostic::warning("A.jav", codes::UNUSED_IMPORT, "import `p.Q` is never used");
    let rendered = reporter.format_diagnostic(&diagnostic);
    assert!(rendered.contains("warning JAZ2001"));
}

#[test]
fn related_information_renders_on_its_own_line() {
    let mut reporter = Reporter::new(false);
    reporter.add_source("A.jav", "class A {}\n");
    reporter.add_source("B.jav", "class B {}\n");

    let diagnostic = Diagnostic::error("A.jav", codes::AMBIGUOUS_REFERENCE, "ambiguous `X`")
        .with_related("B.jav", 0, 1, "also declared here");
    let rendered = reporter.format_diagnostic(&diagnostic);
    assert!(rendered.contains("\n  Related: B.jav:1:1 - also declared here"));
}

#[test]
fn render_joins_multiple_diagnostics() {
    let mut reporter = Reporter::new(false);
    let diagnostics = vec![
        Diagnostic::error("A.jav", codes::SYNTAX_ERROR, "unexpected token"),
        Diagnostic::error("B.jav", codes::SYNTAX_ERROR, "unexpected token"),
    ];
    let rendered = reporter.render(&diagnostics);
    assert_eq!(rendered.lines().count(), 2);
}
