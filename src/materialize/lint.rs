use std::fmt::Write;

/// rpmlint findings that are expected for repackaged upstream binaries.
pub const SUPPRESSED_CHECKS: &[&str] = &[
    "binary-or-shlib-defines-rpath",
    "position-independent-executable-suggested",
    "unstripped-binary-or-object",
];

/// Renders an rpmlintrc silencing `checks`.
pub fn render_lint_config(checks: &[&str]) -> String {
    let mut text = String::from("# Binaries are repackaged unmodified from the upstream RPM\n");
    for check in checks {
        let _ = writeln!(text, "setBadness('{}', 0)", check);
    }
    text
}
