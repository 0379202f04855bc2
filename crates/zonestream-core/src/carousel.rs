//! Carousel navigation state machine.
//!
//! The controller owns the current slide index and the autoplay/hover flags.
//! Hosts drive it from their event loop: user navigation calls `advance` or
//! `go_to`, a host timer calls `tick` at the configured interval, and every
//! successful index transition synchronously notifies registered listeners
//! (the index indicator, consumer callbacks) after the commit.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Reading direction of the carousel row. Affects rendering order only;
/// index arithmetic is direction-agnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl Default for TextDirection {
    fn default() -> Self {
        TextDirection::Ltr
    }
}

/// Slider behavior options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CarouselOptions {
    pub initial_slide: usize,
    pub autoplay: bool,
    /// Autoplay step interval in milliseconds.
    #[validate(range(min = 250))]
    pub autoplay_interval_ms: u64,
    /// Wraparound at both ends; when false navigation clamps at the edges.
    pub infinite: bool,
    pub pause_on_hover: bool,
    pub direction: TextDirection,
}

impl Default for CarouselOptions {
    fn default() -> Self {
        Self {
            initial_slide: 0,
            autoplay: true,
            autoplay_interval_ms: 4000,
            infinite: true,
            pause_on_hover: true,
            direction: TextDirection::Ltr,
        }
    }
}

/// Partial slider options (the `slideroptions` JSON attribute), merged over
/// the defaults per named option.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CarouselOverrides {
    pub initial_slide: Option<usize>,
    pub autoplay: Option<bool>,
    pub autoplay_interval_ms: Option<u64>,
    pub infinite: Option<bool>,
    pub pause_on_hover: Option<bool>,
    pub direction: Option<TextDirection>,
}

impl CarouselOptions {
    pub fn merged(&self, o: &CarouselOverrides) -> CarouselOptions {
        CarouselOptions {
            initial_slide: o.initial_slide.unwrap_or(self.initial_slide),
            autoplay: o.autoplay.unwrap_or(self.autoplay),
            autoplay_interval_ms: o.autoplay_interval_ms.unwrap_or(self.autoplay_interval_ms),
            infinite: o.infinite.unwrap_or(self.infinite),
            pause_on_hover: o.pause_on_hover.unwrap_or(self.pause_on_hover),
            direction: o.direction.unwrap_or(self.direction),
        }
    }
}

pub type IndexListener = Box<dyn Fn(usize) + Send>;

/// Tracks and mutates the current slide index for a fixed slide count.
pub struct CarouselController {
    current: usize,
    count: usize,
    loaded: bool,
    hovered: bool,
    options: CarouselOptions,
    listeners: Vec<IndexListener>,
}

impl CarouselController {
    pub fn new(count: usize, options: CarouselOptions) -> Self {
        let current = if count == 0 {
            0
        } else {
            options.initial_slide.min(count - 1)
        };
        Self {
            current,
            count,
            loaded: false,
            hovered: false,
            options,
            listeners: Vec::new(),
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn options(&self) -> &CarouselOptions {
        &self.options
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Open the navigation gate once the slide collection is initialized.
    /// Navigation calls before this are no-ops.
    pub fn mark_loaded(&mut self) {
        self.loaded = true;
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    /// Interval at which the host should call [`tick`](Self::tick), or `None`
    /// when autoplay is off. Hosts re-read this after option changes and
    /// restart their timer accordingly.
    pub fn autoplay_interval(&self) -> Option<Duration> {
        self.options
            .autoplay
            .then(|| Duration::from_millis(self.options.autoplay_interval_ms))
    }

    /// Register a listener invoked synchronously after every committed index
    /// transition, with the new index.
    pub fn on_index_change(&mut self, listener: impl Fn(usize) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Move one slide forward or backward. Wraps modulo the slide count when
    /// `infinite` is set, otherwise clamps (a step past either end is a
    /// no-op). Returns whether the index changed.
    pub fn advance(&mut self, direction: Direction) -> bool {
        if !self.navigable() {
            return false;
        }
        let next = match direction {
            Direction::Forward => {
                if self.current + 1 < self.count {
                    self.current + 1
                } else if self.options.infinite {
                    0
                } else {
                    return false;
                }
            }
            Direction::Backward => {
                if self.current > 0 {
                    self.current - 1
                } else if self.options.infinite {
                    self.count - 1
                } else {
                    return false;
                }
            }
        };
        self.commit(next)
    }

    /// Jump directly to `index`; out-of-range values clamp into
    /// `[0, count)`. Returns whether the index changed.
    pub fn go_to(&mut self, index: usize) -> bool {
        if !self.navigable() {
            return false;
        }
        self.commit(index.min(self.count - 1))
    }

    /// Autoplay step: one forward advance, unless autoplay is off, the
    /// pointer is hovering with pause-on-hover enabled, or navigation is
    /// gated.
    pub fn tick(&mut self) -> bool {
        if !self.options.autoplay {
            return false;
        }
        if self.hovered && self.options.pause_on_hover {
            return false;
        }
        self.advance(Direction::Forward)
    }

    fn navigable(&self) -> bool {
        self.loaded && self.count > 0
    }

    fn commit(&mut self, next: usize) -> bool {
        if next == self.current {
            return false;
        }
        self.current = next;
        for listener in &self.listeners {
            listener(next);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn loaded(count: usize, options: CarouselOptions) -> CarouselController {
        let mut c = CarouselController::new(count, options);
        c.mark_loaded();
        c
    }

    #[test]
    fn advance_wraps_at_both_ends_when_infinite() {
        let mut c = loaded(3, CarouselOptions::default());
        assert!(c.advance(Direction::Backward));
        assert_eq!(c.current(), 2);
        assert!(c.advance(Direction::Forward));
        assert_eq!(c.current(), 0);
    }

    #[test]
    fn advance_clamps_when_not_infinite() {
        let options = CarouselOptions {
            infinite: false,
            ..Default::default()
        };
        let mut c = loaded(3, options);
        assert!(!c.advance(Direction::Backward));
        assert_eq!(c.current(), 0);
        c.go_to(2);
        assert!(!c.advance(Direction::Forward));
        assert_eq!(c.current(), 2);
    }

    #[test]
    fn go_to_clamps_out_of_range_indices() {
        let mut c = loaded(3, CarouselOptions::default());
        assert!(c.go_to(99));
        assert_eq!(c.current(), 2);
        assert!(c.go_to(0));
        assert_eq!(c.current(), 0);
    }

    #[test]
    fn zero_slides_makes_all_navigation_a_no_op() {
        let mut c = loaded(0, CarouselOptions::default());
        assert!(!c.advance(Direction::Forward));
        assert!(!c.go_to(5));
        assert!(!c.tick());
        assert_eq!(c.current(), 0);
    }

    #[test]
    fn navigation_is_gated_until_loaded() {
        let mut c = CarouselController::new(3, CarouselOptions::default());
        assert!(!c.advance(Direction::Forward));
        assert!(!c.tick());
        assert_eq!(c.current(), 0);
        c.mark_loaded();
        assert!(c.advance(Direction::Forward));
        assert_eq!(c.current(), 1);
    }

    #[test]
    fn three_ticks_on_three_slides_return_to_start() {
        let mut c = loaded(3, CarouselOptions::default());
        assert!(c.tick());
        assert!(c.tick());
        assert!(c.tick());
        assert_eq!(c.current(), 0);
    }

    #[test]
    fn tick_respects_pause_on_hover() {
        let mut c = loaded(3, CarouselOptions::default());
        c.set_hovered(true);
        assert!(!c.tick());
        assert_eq!(c.current(), 0);
        c.set_hovered(false);
        assert!(c.tick());
        assert_eq!(c.current(), 1);
    }

    #[test]
    fn tick_is_inert_when_autoplay_disabled() {
        let options = CarouselOptions {
            autoplay: false,
            ..Default::default()
        };
        let mut c = loaded(3, options);
        assert!(!c.tick());
        assert_eq!(c.autoplay_interval(), None);
    }

    #[test]
    fn listeners_fire_once_per_committed_transition() {
        let mut c = loaded(3, CarouselOptions::default());
        let hits = Arc::new(AtomicUsize::new(0));
        let last = Arc::new(AtomicUsize::new(usize::MAX));
        let (hits2, last2) = (hits.clone(), last.clone());
        c.on_index_change(move |idx| {
            hits2.fetch_add(1, Ordering::SeqCst);
            last2.store(idx, Ordering::SeqCst);
        });
        c.advance(Direction::Forward);
        c.go_to(1); // same index, no commit
        c.go_to(2);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert_eq!(last.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn initial_slide_is_clamped_to_slide_count() {
        let options = CarouselOptions {
            initial_slide: 10,
            ..Default::default()
        };
        let c = CarouselController::new(3, options);
        assert_eq!(c.current(), 2);
    }

    #[test]
    fn overrides_merge_over_defaults() {
        let overrides: CarouselOverrides = serde_json::from_str(
            r#"{ "autoplayIntervalMs": 2500, "infinite": false, "direction": "rtl" }"#,
        )
        .unwrap();
        let merged = CarouselOptions::default().merged(&overrides);
        assert_eq!(merged.autoplay_interval_ms, 2500);
        assert!(!merged.infinite);
        assert_eq!(merged.direction, TextDirection::Rtl);
        assert!(merged.autoplay);
        assert!(merged.pause_on_hover);
    }

    #[test]
    fn autoplay_interval_reflects_options() {
        let c = loaded(3, CarouselOptions::default());
        assert_eq!(c.autoplay_interval(), Some(Duration::from_millis(4000)));
    }

    #[test]
    fn options_validate_interval_floor() {
        let ok = CarouselOptions::default();
        assert!(ok.validate().is_ok());
        let too_fast = CarouselOptions {
            autoplay_interval_ms: 50,
            ..Default::default()
        };
        assert!(too_fast.validate().is_err());
    }
}
