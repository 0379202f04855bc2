//! ZoneStream core — a client-side ad-delivery widget toolkit.
//!
//! Given one or more zone ids, the library fetches ad markup from a
//! Revive-style delivery endpoint (optionally HMAC-signed), wraps each
//! payload in an isolated standalone document, and renders presentation
//! chrome around it: embedding surfaces with loading skeletons and error
//! boxes, a carousel with autoplay and wraparound, and a step indicator.
//! The [`element`] module adapts string-attribute configuration for
//! custom-element hosts.
//!
//! The crate is host-agnostic: HTTP goes through the [`delivery::AdTransport`]
//! seam and timers are driven by the host against
//! [`carousel::CarouselController::autoplay_interval`]. See the adapter
//! crate for a native (tokio/hyper/axum) host.

pub mod carousel;
pub mod config;
pub mod delivery;
pub mod element;
pub mod indicator;
pub mod render;
pub mod shell;
pub mod sign;
pub mod state;
pub mod surface;
pub mod widget;
pub mod zone;

pub use carousel::{CarouselController, CarouselOptions, Direction, TextDirection};
pub use config::AppConfig;
pub use delivery::{
    AdFetcher, AdTransport, DeliveryConfig, FetchError, TransportError, TransportResponse,
};
pub use element::{AttributeMap, ElementEvents, MountError, NullEvents, WidgetElement};
pub use sign::{sign_request, sign_request_at, RequestAuth};
pub use state::{AdState, CycleToken};
pub use surface::{SlotState, SurfaceOptions, SurfaceOverrides};
pub use widget::{AdCarousel, AdStream, CarouselWidgetOptions};
pub use zone::ZoneId;
