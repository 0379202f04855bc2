use crate::render::render_template_str;

const SHELL_TMPL: &str = include_str!("../static/templates/shell.html.hbs");

/// Wrap raw delivery markup in a minimal standalone document.
///
/// The shell pins the viewport, zeroes body margins/padding, hides overflow
/// so the embedding surface never grows scrollbars, and stretches contained
/// images to fill their box. The markup itself is inserted unescaped; it is
/// the delivery server's payload, not untrusted page input.
pub fn wrap_document(markup: &str) -> String {
    render_template_str(SHELL_TMPL, &serde_json::json!({ "BODY": markup }))
}
