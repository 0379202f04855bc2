//! Embedding surfaces.
//!
//! A surface is the isolated box one zone's document renders into: a
//! sandboxed iframe while a payload is present, a skeleton of identical
//! dimensions while the fetch is pending, and a centered error message after
//! a definitive failure. Every rendered surface gets a fresh id so a host
//! can tell a superseded embed from its replacement and release it.

use std::collections::BTreeMap;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::render::{escape_html, render_template_str};

/// Lifecycle of one zone slot's payload.
///
/// `Loading` is initial; a slot moves to `Loaded` on payload arrival or to
/// `Failed` on a fetch error, and only returns to `Loading` when a new fetch
/// cycle starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotState {
    Loading,
    Loaded(String),
    Failed,
}

impl SlotState {
    pub fn is_loaded(&self) -> bool {
        matches!(self, SlotState::Loaded(_))
    }
}

/// Responsive min/max height per breakpoint, in CSS pixels.
///
/// Breakpoint widths follow the common 600/900/1200 px tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightBreakpoints {
    pub xs: u32,
    pub sm: u32,
    pub md: u32,
    pub lg: u32,
}

impl Default for HeightBreakpoints {
    fn default() -> Self {
        Self {
            xs: 200,
            sm: 225,
            md: 275,
            lg: 336,
        }
    }
}

/// Partial height map; unset breakpoints keep their defaults.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct HeightOverrides {
    pub xs: Option<u32>,
    pub sm: Option<u32>,
    pub md: Option<u32>,
    pub lg: Option<u32>,
}

impl HeightBreakpoints {
    pub fn merged(&self, o: &HeightOverrides) -> HeightBreakpoints {
        HeightBreakpoints {
            xs: o.xs.unwrap_or(self.xs),
            sm: o.sm.unwrap_or(self.sm),
            md: o.md.unwrap_or(self.md),
            lg: o.lg.unwrap_or(self.lg),
        }
    }
}

/// Box shadow: a numeric elevation level or a raw CSS value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BoxShadow {
    Level(u8),
    Css(String),
}

impl BoxShadow {
    pub fn to_css(&self) -> String {
        match self {
            BoxShadow::Level(0) => "none".to_string(),
            BoxShadow::Level(level) => format!(
                "0 {}px {}px rgba(0,0,0,0.2)",
                level,
                u16::from(*level) * 2
            ),
            BoxShadow::Css(css) => css.clone(),
        }
    }
}

/// How a fetched document is attached to the surface iframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbedMode {
    /// Inline `srcdoc` attribute (HTML-escaped document).
    Srcdoc,
    /// Base64 `data:` URL, the blob-URL analog for hosts that prefer a `src`.
    DataUri,
}

/// Presentation options for one surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceOptions {
    pub aspect_ratio: String,
    pub height: HeightBreakpoints,
    pub width: String,
    pub box_shadow: BoxShadow,
    pub error_text: String,
    pub embed: EmbedMode,
    /// Extra CSS declarations for the container, property -> value.
    pub styles: BTreeMap<String, String>,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            aspect_ratio: "600 / 336".to_string(),
            height: HeightBreakpoints::default(),
            width: "100%".to_string(),
            box_shadow: BoxShadow::Level(1),
            error_text: "Failed to load ad.".to_string(),
            embed: EmbedMode::Srcdoc,
            styles: BTreeMap::new(),
        }
    }
}

/// Caller-suppliable partial record merged over [`SurfaceOptions`] defaults.
/// The merge is shallow per named option; `height` and `styles` merge their
/// own entries one level deep, nothing deeper.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SurfaceOverrides {
    pub aspect_ratio: Option<String>,
    pub height: Option<HeightOverrides>,
    pub width: Option<String>,
    pub box_shadow: Option<BoxShadow>,
    pub error_text: Option<String>,
    pub embed: Option<EmbedMode>,
    pub styles: Option<BTreeMap<String, String>>,
}

impl SurfaceOptions {
    pub fn merged(&self, o: &SurfaceOverrides) -> SurfaceOptions {
        let mut styles = self.styles.clone();
        if let Some(extra) = &o.styles {
            for (k, v) in extra {
                styles.insert(k.clone(), v.clone());
            }
        }
        SurfaceOptions {
            aspect_ratio: o.aspect_ratio.clone().unwrap_or_else(|| self.aspect_ratio.clone()),
            height: o
                .height
                .as_ref()
                .map(|h| self.height.merged(h))
                .unwrap_or(self.height),
            width: o.width.clone().unwrap_or_else(|| self.width.clone()),
            box_shadow: o.box_shadow.clone().unwrap_or_else(|| self.box_shadow.clone()),
            error_text: o.error_text.clone().unwrap_or_else(|| self.error_text.clone()),
            embed: o.embed.unwrap_or(self.embed),
            styles,
        }
    }
}

const SURFACE_TMPL: &str = include_str!("../static/templates/surface.html.hbs");
const SKELETON_TMPL: &str = include_str!("../static/templates/skeleton.html.hbs");
const ERROR_TMPL: &str = include_str!("../static/templates/error.html.hbs");

fn new_render_id() -> String {
    Uuid::now_v7().simple().to_string()
}

/// Scoped style block for the surface container: fixed aspect ratio, hidden
/// overflow, responsive min/max heights, shadow, then caller overrides.
fn container_css(sid: &str, opts: &SurfaceOptions) -> String {
    let shadow = opts.box_shadow.to_css();
    let extra: String = opts
        .styles
        .iter()
        .map(|(k, v)| format!("{}: {}; ", k, v))
        .collect();
    format!(
        "<style>\n\
         #zs-{sid} {{ position: relative; overflow: hidden; border-radius: 8px; \
         aspect-ratio: {aspect}; width: {width}; min-height: {xs}px; max-height: {xs}px; \
         box-shadow: {shadow}; {extra}}}\n\
         @media (min-width: 600px) {{ #zs-{sid} {{ min-height: {sm}px; max-height: {sm}px; }} }}\n\
         @media (min-width: 900px) {{ #zs-{sid} {{ min-height: {md}px; max-height: {md}px; }} }}\n\
         @media (min-width: 1200px) {{ #zs-{sid} {{ min-height: {lg}px; max-height: {lg}px; }} }}\n\
         </style>",
        sid = sid,
        aspect = opts.aspect_ratio,
        width = opts.width,
        xs = opts.height.xs,
        sm = opts.height.sm,
        md = opts.height.md,
        lg = opts.height.lg,
        shadow = shadow,
        extra = extra,
    )
}

fn embed_attr(doc: &str, mode: EmbedMode) -> String {
    match mode {
        EmbedMode::Srcdoc => format!("srcdoc=\"{}\"", escape_html(doc)),
        EmbedMode::DataUri => format!("src=\"data:text/html;base64,{}\"", STANDARD.encode(doc)),
    }
}

/// Render one slot into its surface HTML.
pub fn surface_html(state: &SlotState, opts: &SurfaceOptions) -> String {
    surface_html_with_id(&new_render_id(), state, opts)
}

pub(crate) fn surface_html_with_id(sid: &str, state: &SlotState, opts: &SurfaceOptions) -> String {
    let box_css = container_css(sid, opts);
    match state {
        SlotState::Loaded(doc) => render_template_str(
            SURFACE_TMPL,
            &serde_json::json!({
                "SID": sid,
                "BOX_CSS": box_css,
                "EMBED": embed_attr(doc, opts.embed),
            }),
        ),
        SlotState::Loading => render_template_str(
            SKELETON_TMPL,
            &serde_json::json!({ "SID": sid, "BOX_CSS": box_css }),
        ),
        SlotState::Failed => render_template_str(
            ERROR_TMPL,
            &serde_json::json!({
                "SID": sid,
                "BOX_CSS": box_css,
                "TEXT": opts.error_text,
            }),
        ),
    }
}
