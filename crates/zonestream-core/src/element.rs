//! Attribute-driven element adapter.
//!
//! Bridges DOM-style string attributes into widget configuration for
//! consumers that are not calling the Rust API directly: the host marshals
//! the element's attributes into an [`AttributeMap`] and this module does the
//! parsing, validation, and widget construction. Optional attributes parse
//! with-default (malformed JSON logs a warning and falls back, it never
//! faults the host page); the zone attributes are required and fail the
//! mount loudly.

use std::collections::BTreeMap;
use std::time::Duration;

use phf::phf_set;
use serde::de::DeserializeOwned;
use thiserror::Error;
use validator::Validate;

use crate::carousel::{CarouselOptions, CarouselOverrides, Direction, TextDirection};
use crate::delivery::{AdTransport, DeliveryConfig};
use crate::surface::{BoxShadow, SurfaceOptions, SurfaceOverrides};
use crate::widget::{AdCarousel, AdStream, CarouselWidgetOptions};
use crate::zone::ZoneId;

/// Attribute names the elements understand.
static KNOWN_ATTRIBUTES: phf::Set<&'static str> = phf_set! {
    "zoneid",
    "zoneids",
    "zonekey",
    "aspectratio",
    "height",
    "width",
    "boxshadow",
    "styles",
    "errortext",
    "slideroptions",
    "autoplay",
    "autoplayinterval",
    "direction",
};

/// The element's attributes as marshaled by the host, name -> raw string.
pub type AttributeMap = BTreeMap<String, String>;

/// Host-side sink for element lifecycle notifications.
pub trait ElementEvents {
    /// Dispatched once after the initial mount completes
    /// (the `zonestream-ready` DOM event).
    fn ready(&self);
}

/// Sink for hosts that don't listen.
pub struct NullEvents;

impl ElementEvents for NullEvents {
    fn ready(&self) {}
}

#[derive(Debug, Error)]
pub enum MountError {
    #[error("missing required attribute: zoneid or zoneids")]
    MissingZones,
    #[error("invalid zone attribute: {0}")]
    InvalidZones(String),
    #[error("missing required attribute: zonekey")]
    MissingKey,
}

enum Widget {
    Stream(AdStream),
    Carousel(AdCarousel),
}

/// A mounted element instance.
///
/// Timers belong to the host (see the adapter's autoplay driver); the element
/// tells it how often to tick via [`autoplay_interval`](Self::autoplay_interval)
/// and the host must stop the timer when it drops the element.
pub struct WidgetElement {
    widget: Widget,
}

impl std::fmt::Debug for WidgetElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.widget {
            Widget::Stream(_) => "Stream",
            Widget::Carousel(_) => "Carousel",
        };
        f.debug_struct("WidgetElement").field("widget", &kind).finish()
    }
}

impl WidgetElement {
    /// Parse attributes and construct the widget. `delivery` supplies the
    /// deployment's endpoint (and optionally a shared key); a `zonekey`
    /// attribute overrides the configured key.
    ///
    /// A `zoneids` attribute (JSON array) mounts the carousel; a `zoneid`
    /// attribute mounts the single stream, which refuses to mount without a
    /// key rather than fall back to unauthenticated requests.
    pub fn mount(
        attrs: &AttributeMap,
        delivery: DeliveryConfig,
        events: &dyn ElementEvents,
    ) -> Result<Self, MountError> {
        warn_unknown_attributes(attrs);

        let mut delivery = delivery;
        if let Some(key) = attrs.get("zonekey").filter(|k| !k.is_empty()) {
            delivery.key = Some(key.clone());
        }
        let surface = surface_options(attrs);

        let widget = match parse_zones(attrs)? {
            Zones::Many(zones) => {
                let options = CarouselWidgetOptions {
                    surface,
                    indicator: Default::default(),
                    slider: slider_options(attrs),
                };
                Widget::Carousel(AdCarousel::new(zones, delivery, options))
            }
            Zones::Single(zone) => {
                if !delivery.has_key() {
                    log::error!("zone {}: mount aborted, no zonekey configured", zone);
                    return Err(MountError::MissingKey);
                }
                Widget::Stream(AdStream::new(zone, delivery, surface))
            }
        };

        let element = Self { widget };
        events.ready();
        Ok(element)
    }

    pub fn is_carousel(&self) -> bool {
        matches!(self.widget, Widget::Carousel(_))
    }

    pub fn zones(&self) -> Vec<ZoneId> {
        match &self.widget {
            Widget::Stream(s) => vec![s.zone()],
            Widget::Carousel(c) => c.zones().to_vec(),
        }
    }

    /// Update the delivery key without a remount (asynchronous credential
    /// provisioning). Takes effect on the next fetch cycle.
    pub fn set_zone_key(&mut self, key: impl Into<String>) {
        match &mut self.widget {
            Widget::Stream(s) => s.set_key(key),
            Widget::Carousel(c) => c.set_key(key),
        }
    }

    /// Run one fetch cycle through the host's transport.
    pub async fn refresh<T: AdTransport>(&mut self, transport: &T) -> bool {
        match &mut self.widget {
            Widget::Stream(s) => s.refresh(transport).await,
            Widget::Carousel(c) => c.refresh(transport).await,
        }
    }

    /// How often the host should call [`tick`](Self::tick); `None` for the
    /// single stream or when autoplay is off.
    pub fn autoplay_interval(&self) -> Option<Duration> {
        match &self.widget {
            Widget::Stream(_) => None,
            Widget::Carousel(c) => c.controller().autoplay_interval(),
        }
    }

    pub fn tick(&mut self) -> bool {
        match &mut self.widget {
            Widget::Stream(_) => false,
            Widget::Carousel(c) => c.tick(),
        }
    }

    pub fn advance(&mut self, direction: Direction) -> bool {
        match &mut self.widget {
            Widget::Stream(_) => false,
            Widget::Carousel(c) => c.advance(direction),
        }
    }

    pub fn go_to(&mut self, index: usize) -> bool {
        match &mut self.widget {
            Widget::Stream(_) => false,
            Widget::Carousel(c) => c.go_to(index),
        }
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        if let Widget::Carousel(c) = &mut self.widget {
            c.set_hovered(hovered);
        }
    }

    /// Marker-click intent forwarded from the indicator row.
    pub fn handle_marker_click(&mut self, index: usize) -> bool {
        match &mut self.widget {
            Widget::Stream(_) => false,
            Widget::Carousel(c) => c.handle_marker_click(index),
        }
    }

    pub fn render(&self) -> String {
        match &self.widget {
            Widget::Stream(s) => s.render(),
            Widget::Carousel(c) => c.render(),
        }
    }

    /// Tear the element down. Widget state and embed resources drop here; the
    /// host must also stop any timer it started for this element.
    pub fn detach(self) {
        log::debug!("element detached ({} zone(s))", self.zones().len());
    }
}

enum Zones {
    Single(ZoneId),
    Many(Vec<ZoneId>),
}

fn parse_zones(attrs: &AttributeMap) -> Result<Zones, MountError> {
    if let Some(raw) = attrs.get("zoneids") {
        let ids: Vec<i64> = serde_json::from_str(raw).map_err(|err| {
            log::error!("invalid JSON for attribute 'zoneids': {}", err);
            MountError::InvalidZones(err.to_string())
        })?;
        if ids.iter().any(|&id| id <= 0 || id > i64::from(u32::MAX)) {
            log::error!("'zoneids' must contain positive integers: {:?}", ids);
            return Err(MountError::InvalidZones(
                "zone ids must be positive integers".to_string(),
            ));
        }
        return Ok(Zones::Many(ids.into_iter().map(|id| ZoneId(id as u32)).collect()));
    }
    if let Some(raw) = attrs.get("zoneid") {
        let zone: ZoneId = raw.parse().map_err(|_| {
            log::error!("invalid 'zoneid' attribute '{}', must be a positive integer", raw);
            MountError::InvalidZones(format!("bad zoneid: {}", raw))
        })?;
        if zone.as_u32() == 0 {
            log::error!("'zoneid' must be positive");
            return Err(MountError::InvalidZones("zoneid must be positive".to_string()));
        }
        return Ok(Zones::Single(zone));
    }
    log::error!("missing required attribute: zoneid or zoneids");
    Err(MountError::MissingZones)
}

/// Parse a JSON attribute, or fall back to the caller's default with a
/// warning. Never a visible fault.
fn parse_json_attr<T: DeserializeOwned>(name: &str, raw: Option<&String>) -> Option<T> {
    let raw = raw?;
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            log::warn!("invalid JSON for attribute '{}': {}", name, err);
            None
        }
    }
}

fn surface_options(attrs: &AttributeMap) -> SurfaceOptions {
    let overrides = SurfaceOverrides {
        aspect_ratio: attrs.get("aspectratio").cloned(),
        height: parse_json_attr("height", attrs.get("height")),
        width: attrs.get("width").cloned(),
        box_shadow: attrs.get("boxshadow").map(|raw| match raw.parse::<u8>() {
            Ok(level) => BoxShadow::Level(level),
            Err(_) => BoxShadow::Css(raw.clone()),
        }),
        error_text: attrs.get("errortext").cloned(),
        embed: None,
        styles: parse_json_attr("styles", attrs.get("styles")),
    };
    SurfaceOptions::default().merged(&overrides)
}

fn slider_options(attrs: &AttributeMap) -> CarouselOptions {
    let mut options = CarouselOptions::default();
    if let Some(overrides) =
        parse_json_attr::<CarouselOverrides>("slideroptions", attrs.get("slideroptions"))
    {
        options = options.merged(&overrides);
    }
    // Dedicated attributes win over the slideroptions blob.
    if let Some(raw) = attrs.get("autoplay") {
        match raw.as_str() {
            "true" => options.autoplay = true,
            "false" => options.autoplay = false,
            other => log::warn!("invalid 'autoplay' attribute '{}'; expected true/false", other),
        }
    }
    if let Some(raw) = attrs.get("autoplayinterval") {
        match raw.parse::<u64>() {
            Ok(ms) => options.autoplay_interval_ms = ms,
            Err(_) => log::warn!("invalid 'autoplayinterval' attribute '{}'", raw),
        }
    }
    if let Some(raw) = attrs.get("direction") {
        match raw.as_str() {
            "ltr" => options.direction = TextDirection::Ltr,
            "rtl" => options.direction = TextDirection::Rtl,
            other => log::warn!("invalid 'direction' attribute '{}'; expected ltr/rtl", other),
        }
    }
    if let Err(err) = options.validate() {
        log::warn!("slider options rejected ({}); using defaults", err);
        return CarouselOptions::default();
    }
    options
}

fn warn_unknown_attributes(attrs: &AttributeMap) {
    for name in attrs.keys() {
        if !KNOWN_ATTRIBUTES.contains(name.as_str()) && !name.starts_with("data-") {
            log::debug!("ignoring unknown attribute '{}'", name);
        }
    }
}
