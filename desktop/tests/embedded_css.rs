#![cfg(test)]
//! The desktop shell inlines the shared report stylesheet; a truncated or
//! moved file would only show up as unstyled pages at runtime.

use reports::REPORTS_CSS;

#[test]
fn embedded_css_is_not_empty() {
    assert!(
        !REPORTS_CSS.trim().is_empty(),
        "reports/assets/reports.css appears to be empty"
    );
}

#[test]
fn embedded_css_styles_rendered_markup() {
    // Class names emitted by the report renderers.
    let required = [
        "--color-bg",
        ".badgeos-report-table",
        ".metabox-holder",
        ".postbox .stat",
        ".button-primary",
        ".notice-error",
        ".navbar__links",
    ];
    for token in required {
        assert!(
            REPORTS_CSS.contains(token),
            "Expected token `{token}` missing from embedded CSS"
        );
    }
}
