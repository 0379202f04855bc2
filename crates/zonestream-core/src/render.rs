use handlebars::Handlebars;
use serde_json::Value as JsonValue;

/// Render a handlebars template against JSON data.
///
/// HTML escaping stays on by default (to protect attribute injection); slots
/// that intentionally receive markup use the `{{{...}}}` form in the template.
pub fn render_template_str(tmpl: &str, data: &JsonValue) -> String {
    let mut reg = Handlebars::new();
    reg.register_template_string("t", tmpl).ok();
    reg.render("t", data).unwrap_or_default()
}

/// Escape text for use inside an HTML attribute value or text node.
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
