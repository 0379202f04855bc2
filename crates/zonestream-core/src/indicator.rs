//! Step indicator: the row of clickable markers under a carousel.
//!
//! The indicator is a pure view of the controller's index. Marker clicks are
//! forwarded by the host to [`crate::widget::AdCarousel::handle_marker_click`]
//! (or straight to the controller); nothing here mutates index state.

use serde::{Deserialize, Serialize};

use crate::render::render_template_str;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub index: usize,
    pub selected: bool,
}

/// Exactly `count` markers with the one at `current` selected. `current` is
/// clamped so that a non-empty row always has exactly one selected marker.
pub fn markers(current: usize, count: usize) -> Vec<Marker> {
    if count == 0 {
        return Vec::new();
    }
    let selected = current.min(count - 1);
    (0..count)
        .map(|index| Marker {
            index,
            selected: index == selected,
        })
        .collect()
}

/// Colors for the marker row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndicatorOptions {
    pub bg_color: String,
    pub selected_color: String,
    pub unselected_color: String,
}

impl Default for IndicatorOptions {
    fn default() -> Self {
        Self {
            bg_color: "rgba(0,0,0,0.125)".to_string(),
            selected_color: "#1976d2".to_string(),
            unselected_color: "#9e9e9e".to_string(),
        }
    }
}

const STEPS_TMPL: &str = include_str!("../static/templates/steps.html.hbs");

/// Render the marker row; zero count renders nothing.
pub fn indicator_html(current: usize, count: usize, opts: &IndicatorOptions) -> String {
    if count == 0 {
        return String::new();
    }
    let marks: Vec<serde_json::Value> = markers(current, count)
        .into_iter()
        .map(|m| {
            serde_json::json!({
                "INDEX": m.index,
                "LABEL": m.index + 1,
                "SELECTED": m.selected,
            })
        })
        .collect();
    render_template_str(
        STEPS_TMPL,
        &serde_json::json!({
            "MARKS": marks,
            "BG": opts.bg_color,
            "SELECTED_COLOR": opts.selected_color,
            "UNSELECTED_COLOR": opts.unselected_color,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_count_matches_and_exactly_one_selected() {
        for count in 1..6 {
            for current in 0..count {
                let marks = markers(current, count);
                assert_eq!(marks.len(), count);
                assert_eq!(marks.iter().filter(|m| m.selected).count(), 1);
                assert!(marks[current].selected);
            }
        }
    }

    #[test]
    fn zero_count_renders_nothing() {
        assert!(markers(0, 0).is_empty());
        assert_eq!(indicator_html(0, 0, &IndicatorOptions::default()), "");
    }

    #[test]
    fn out_of_range_current_still_selects_last_marker() {
        let marks = markers(9, 3);
        assert!(marks[2].selected);
        assert_eq!(marks.iter().filter(|m| m.selected).count(), 1);
    }

    #[test]
    fn html_renders_one_element_per_marker() {
        let html = indicator_html(1, 3, &IndicatorOptions::default());
        assert_eq!(html.matches("data-zs-step=").count(), 3);
        assert_eq!(html.matches("zs-step-selected").count(), 1);
        assert!(html.contains("data-zs-step=\"1\""));
        assert!(html.contains("aria-label=\"Step 2\""));
    }

    #[test]
    fn html_uses_configured_colors() {
        let opts = IndicatorOptions {
            bg_color: "black".to_string(),
            selected_color: "red".to_string(),
            unselected_color: "blue".to_string(),
        };
        let html = indicator_html(0, 2, &opts);
        assert!(html.contains("background:black"));
        assert!(html.contains("background:red"));
        assert!(html.contains("background:blue"));
    }
}
