//! Composed widgets.
//!
//! One parameterized implementation of the two consumer-facing streams:
//! [`AdStream`] renders a single zone and requires a delivery key before it
//! fetches anything; [`AdCarousel`] cycles several zones and treats the key
//! as optional. Both split a refresh into `begin_refresh` / `complete_refresh`
//! so hosts own the suspension point and stale in-flight cycles are discarded
//! by generation (see [`crate::state`]), with a one-call [`refresh`] wrapper
//! for hosts that don't interleave.
//!
//! [`refresh`]: AdStream::refresh

use crate::carousel::{CarouselController, CarouselOptions, Direction};
use crate::delivery::{AdFetcher, AdTransport, DeliveryConfig, FetchError};
use crate::indicator::{indicator_html, IndicatorOptions};
use crate::render::render_template_str;
use crate::state::{AdState, CycleToken};
use crate::surface::{surface_html, SlotState, SurfaceOptions};
use crate::zone::ZoneId;

/// A single ad slot bound to one zone.
pub struct AdStream {
    zone: ZoneId,
    delivery: DeliveryConfig,
    options: SurfaceOptions,
    state: AdState,
}

impl AdStream {
    pub fn new(zone: ZoneId, delivery: DeliveryConfig, options: SurfaceOptions) -> Self {
        Self {
            zone,
            delivery,
            options,
            state: AdState::new(),
        }
    }

    pub fn zone(&self) -> ZoneId {
        self.zone
    }

    pub fn options(&self) -> &SurfaceOptions {
        &self.options
    }

    /// Update the delivery key without remounting. The next cycle signs with
    /// the new key; an already-in-flight cycle keeps its token and settles
    /// (or is discarded) under the generation rule.
    pub fn set_key(&mut self, key: impl Into<String>) {
        self.delivery.key = Some(key.into());
    }

    /// Current slot state; `Loading` before the first cycle.
    pub fn slot(&self) -> SlotState {
        self.state
            .slot(0)
            .cloned()
            .unwrap_or(SlotState::Loading)
    }

    /// Start a fetch cycle, or `None` while no key is configured — a keyed
    /// stream never sends unauthenticated requests.
    pub fn begin_refresh(&mut self) -> Option<CycleToken> {
        if !self.delivery.has_key() {
            log::warn!("zone {}: no delivery key configured; skipping fetch", self.zone);
            return None;
        }
        Some(self.state.begin_cycle(1))
    }

    pub fn complete_refresh(
        &mut self,
        token: CycleToken,
        results: Vec<Result<String, FetchError>>,
    ) -> bool {
        self.state.complete_cycle(token, results)
    }

    /// Fetch-and-apply in one call.
    pub async fn refresh<T: AdTransport>(&mut self, transport: &T) -> bool {
        let Some(token) = self.begin_refresh() else {
            return false;
        };
        let fetcher = AdFetcher::new(transport, self.delivery.clone());
        let results = fetcher.fetch_all(&[self.zone]).await;
        self.complete_refresh(token, results)
    }

    /// Surface HTML for the current slot state.
    pub fn render(&self) -> String {
        surface_html(&self.slot(), &self.options)
    }
}

/// Widget-level options for [`AdCarousel`].
#[derive(Debug, Clone, Default)]
pub struct CarouselWidgetOptions {
    pub surface: SurfaceOptions,
    pub indicator: IndicatorOptions,
    pub slider: CarouselOptions,
}

const CAROUSEL_TMPL: &str = include_str!("../static/templates/carousel.html.hbs");

/// Several zones cycled behind one viewport with a step indicator.
pub struct AdCarousel {
    zones: Vec<ZoneId>,
    delivery: DeliveryConfig,
    surface: SurfaceOptions,
    indicator: IndicatorOptions,
    controller: CarouselController,
    state: AdState,
}

impl AdCarousel {
    pub fn new(zones: Vec<ZoneId>, delivery: DeliveryConfig, options: CarouselWidgetOptions) -> Self {
        let controller = CarouselController::new(zones.len(), options.slider);
        Self {
            zones,
            delivery,
            surface: options.surface,
            indicator: options.indicator,
            controller,
            state: AdState::new(),
        }
    }

    pub fn zones(&self) -> &[ZoneId] {
        &self.zones
    }

    pub fn state(&self) -> &AdState {
        &self.state
    }

    pub fn controller(&self) -> &CarouselController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut CarouselController {
        &mut self.controller
    }

    /// See [`AdStream::set_key`]. The carousel also fetches without a key
    /// (unauthenticated delivery), so this only upgrades future cycles.
    pub fn set_key(&mut self, key: impl Into<String>) {
        self.delivery.key = Some(key.into());
    }

    /// Start a fetch cycle over all zones.
    pub fn begin_refresh(&mut self) -> CycleToken {
        self.state.begin_cycle(self.zones.len())
    }

    /// Apply a settled batch; on the first applied cycle the controller's
    /// navigation gate opens.
    pub fn complete_refresh(
        &mut self,
        token: CycleToken,
        results: Vec<Result<String, FetchError>>,
    ) -> bool {
        let applied = self.state.complete_cycle(token, results);
        if applied && !self.controller.is_loaded() {
            self.controller.mark_loaded();
        }
        applied
    }

    /// Fetch-and-apply in one call.
    pub async fn refresh<T: AdTransport>(&mut self, transport: &T) -> bool {
        let token = self.begin_refresh();
        let fetcher = AdFetcher::new(transport, self.delivery.clone());
        let results = fetcher.fetch_all(&self.zones).await;
        self.complete_refresh(token, results)
    }

    pub fn advance(&mut self, direction: Direction) -> bool {
        self.controller.advance(direction)
    }

    pub fn go_to(&mut self, index: usize) -> bool {
        self.controller.go_to(index)
    }

    pub fn tick(&mut self) -> bool {
        self.controller.tick()
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.controller.set_hovered(hovered)
    }

    /// Marker-click intent from the indicator row; index authority stays in
    /// the controller.
    pub fn handle_marker_click(&mut self, index: usize) -> bool {
        self.controller.go_to(index)
    }

    /// Full widget HTML: one slide per zone (only the current one visible)
    /// plus the step indicator overlay.
    pub fn render(&self) -> String {
        let current = self.controller.current();
        let slides: Vec<serde_json::Value> = (0..self.zones.len())
            .map(|index| {
                let slot = self
                    .state
                    .slot(index)
                    .cloned()
                    .unwrap_or(SlotState::Loading);
                serde_json::json!({
                    "INDEX": index,
                    "ACTIVE": index == current,
                    "HTML": surface_html(&slot, &self.surface),
                })
            })
            .collect();
        let steps = indicator_html(current, self.zones.len(), &self.indicator);
        let dir = match self.controller.options().direction {
            crate::carousel::TextDirection::Ltr => "ltr",
            crate::carousel::TextDirection::Rtl => "rtl",
        };
        render_template_str(
            CAROUSEL_TMPL,
            &serde_json::json!({
                "DIR": dir,
                "SLIDES": slides,
                "STEPS": steps,
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::TransportError;

    fn ok(html: &str) -> Result<String, FetchError> {
        Ok(html.to_string())
    }

    fn err() -> Result<String, FetchError> {
        Err(FetchError::Transport(TransportError::Connect(
            "refused".to_string(),
        )))
    }

    #[test]
    fn stream_without_key_does_not_start_a_cycle() {
        let mut stream = AdStream::new(
            ZoneId(101),
            DeliveryConfig::default(),
            SurfaceOptions::default(),
        );
        assert!(stream.begin_refresh().is_none());
        assert_eq!(stream.slot(), SlotState::Loading);
    }

    #[test]
    fn stream_with_key_cycles_to_loaded() {
        let mut stream = AdStream::new(
            ZoneId(101),
            DeliveryConfig::default().with_key("secret"),
            SurfaceOptions::default(),
        );
        let token = stream.begin_refresh().unwrap();
        assert!(stream.complete_refresh(token, vec![ok("<html>ad</html>")]));
        assert_eq!(stream.slot(), SlotState::Loaded("<html>ad</html>".to_string()));
        assert!(stream.render().contains("<iframe"));
    }

    #[test]
    fn key_set_after_construction_enables_fetching() {
        let mut stream = AdStream::new(
            ZoneId(101),
            DeliveryConfig::default(),
            SurfaceOptions::default(),
        );
        assert!(stream.begin_refresh().is_none());
        stream.set_key("late-key");
        assert!(stream.begin_refresh().is_some());
    }

    #[test]
    fn carousel_mixed_batch_renders_ad_and_error() {
        let mut carousel = AdCarousel::new(
            vec![ZoneId(101), ZoneId(102)],
            DeliveryConfig::default(),
            CarouselWidgetOptions::default(),
        );
        let token = carousel.begin_refresh();
        assert!(carousel.complete_refresh(token, vec![ok("<html><div>ad</div></html>"), err()]));
        assert_eq!(carousel.state().loaded_count(), 1);
        let html = carousel.render();
        assert!(html.contains("<iframe"));
        assert!(html.contains("zs-error"));
        assert!(html.contains("Failed to load ad."));
    }

    #[test]
    fn carousel_navigation_gate_opens_after_first_cycle() {
        let mut carousel = AdCarousel::new(
            vec![ZoneId(1), ZoneId(2), ZoneId(3)],
            DeliveryConfig::default(),
            CarouselWidgetOptions::default(),
        );
        assert!(!carousel.advance(Direction::Forward));
        let token = carousel.begin_refresh();
        carousel.complete_refresh(token, vec![ok("a"), ok("b"), ok("c")]);
        assert!(carousel.advance(Direction::Forward));
        assert_eq!(carousel.controller().current(), 1);
    }

    #[test]
    fn carousel_render_marks_only_current_slide_active() {
        let mut carousel = AdCarousel::new(
            vec![ZoneId(1), ZoneId(2)],
            DeliveryConfig::default(),
            CarouselWidgetOptions::default(),
        );
        let token = carousel.begin_refresh();
        carousel.complete_refresh(token, vec![ok("a"), ok("b")]);
        carousel.go_to(1);
        let html = carousel.render();
        // Slide 0 hidden, slide 1 visible.
        assert!(html.contains("data-zs-slide=\"0\" style=\"display:none\""));
        assert!(!html.contains("data-zs-slide=\"1\" style=\"display:none\""));
        // Indicator selects the second marker.
        assert_eq!(html.matches("data-zs-step=").count(), 2);
        assert!(html.contains("zs-step-selected"));
    }

    #[test]
    fn carousel_render_before_fetch_shows_skeletons() {
        let carousel = AdCarousel::new(
            vec![ZoneId(1), ZoneId(2)],
            DeliveryConfig::default(),
            CarouselWidgetOptions::default(),
        );
        let html = carousel.render();
        assert_eq!(html.matches("zs-skeleton").count(), 2);
        assert!(!html.contains("<iframe"));
    }

    #[test]
    fn carousel_rtl_direction_lands_on_container() {
        let mut options = CarouselWidgetOptions::default();
        options.slider.direction = crate::carousel::TextDirection::Rtl;
        let carousel = AdCarousel::new(vec![ZoneId(1)], DeliveryConfig::default(), options);
        assert!(carousel.render().contains("dir=\"rtl\""));
    }

    #[test]
    fn marker_click_routes_through_controller() {
        let mut carousel = AdCarousel::new(
            vec![ZoneId(1), ZoneId(2), ZoneId(3)],
            DeliveryConfig::default(),
            CarouselWidgetOptions::default(),
        );
        let token = carousel.begin_refresh();
        carousel.complete_refresh(token, vec![ok("a"), ok("b"), ok("c")]);
        assert!(carousel.handle_marker_click(2));
        assert_eq!(carousel.controller().current(), 2);
        // Out-of-range clicks clamp like any other navigation.
        carousel.handle_marker_click(99);
        assert_eq!(carousel.controller().current(), 2);
    }

    #[test]
    fn stale_cycle_is_not_mixed_into_newer_state() {
        let mut carousel = AdCarousel::new(
            vec![ZoneId(1)],
            DeliveryConfig::default(),
            CarouselWidgetOptions::default(),
        );
        let old = carousel.begin_refresh();
        carousel.set_key("rotated");
        let fresh = carousel.begin_refresh();
        assert!(!carousel.complete_refresh(old, vec![ok("signed-with-old-key")]));
        assert!(carousel.complete_refresh(fresh, vec![ok("signed-with-new-key")]));
        assert_eq!(
            carousel.state().slot(0),
            Some(&SlotState::Loaded("signed-with-new-key".to_string()))
        );
    }
}
