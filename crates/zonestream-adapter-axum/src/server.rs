//! Preview server.
//!
//! A small axum app for exercising widgets against a live (or local mock)
//! delivery endpoint: `/` describes the deployment, `/preview?zones=101,102`
//! runs a real fetch cycle through the configured transport and returns the
//! rendered widget page.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use zonestream_core::render::render_template_str;
use zonestream_core::{
    AdCarousel, AdTransport, CarouselWidgetOptions, DeliveryConfig, ZoneId,
};

const PREVIEW_TMPL: &str = include_str!("../static/templates/preview.html.hbs");
const INFO_TMPL: &str = include_str!("../static/templates/info.html.hbs");

pub struct AppState {
    pub transport: Arc<dyn AdTransport>,
    pub delivery: DeliveryConfig,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(info))
        .route("/preview", get(preview))
        .with_state(state)
}

async fn info(State(state): State<Arc<AppState>>) -> Html<String> {
    let auth = if state.delivery.has_key() {
        "signed requests"
    } else {
        "unauthenticated requests"
    };
    Html(render_template_str(
        INFO_TMPL,
        &serde_json::json!({
            "TITLE": "ZoneStream Preview Up",
            "PKG_VERSION": env!("CARGO_PKG_VERSION"),
            "ENDPOINT": state.delivery.endpoint.as_str(),
            "AUTH": auth,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct PreviewParams {
    /// Comma-separated zone ids.
    pub zones: String,
    /// Optional delivery key overriding the configured one.
    pub key: Option<String>,
}

async fn preview(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PreviewParams>,
) -> Result<Html<String>, (StatusCode, String)> {
    let zones = parse_zone_list(&params.zones).map_err(|e| (StatusCode::BAD_REQUEST, e))?;
    let mut delivery = state.delivery.clone();
    if let Some(key) = params.key.as_deref().filter(|k| !k.is_empty()) {
        delivery.key = Some(key.to_string());
    }

    log::info!("preview requested for {} zone(s)", zones.len());
    let mut carousel = AdCarousel::new(zones, delivery, CarouselWidgetOptions::default());
    carousel.refresh(&state.transport).await;

    Ok(Html(render_template_str(
        PREVIEW_TMPL,
        &serde_json::json!({
            "ZONES": params.zones,
            "WIDGET": carousel.render(),
        }),
    )))
}

fn parse_zone_list(raw: &str) -> Result<Vec<ZoneId>, String> {
    raw.split(',')
        .map(|s| {
            s.trim()
                .parse::<ZoneId>()
                .map_err(|_| format!("bad zone id: {}", s.trim()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use url::Url;
    use zonestream_core::{TransportError, TransportResponse};

    struct StubTransport {
        body: Option<String>,
    }

    #[async_trait]
    impl AdTransport for StubTransport {
        async fn get(
            &self,
            _url: &Url,
            _headers: &[(String, String)],
        ) -> Result<TransportResponse, TransportError> {
            match &self.body {
                Some(body) => Ok(TransportResponse {
                    status: 200,
                    body: body.clone(),
                }),
                None => Err(TransportError::Connect("scripted failure".to_string())),
            }
        }
    }

    fn state(body: Option<&str>) -> Arc<AppState> {
        Arc::new(AppState {
            transport: Arc::new(StubTransport {
                body: body.map(str::to_string),
            }),
            delivery: DeliveryConfig::default(),
        })
    }

    #[test]
    fn parse_zone_list_accepts_comma_separated_ids() {
        assert_eq!(
            parse_zone_list("101, 102,103").unwrap(),
            vec![ZoneId(101), ZoneId(102), ZoneId(103)]
        );
        assert!(parse_zone_list("101,abc").is_err());
        assert!(parse_zone_list("").is_err());
    }

    #[tokio::test]
    async fn info_reports_endpoint_and_auth_mode() {
        let page = info(State(state(Some("x")))).await.0;
        assert!(page.contains("ZoneStream Preview Up"));
        assert!(page.contains("ads.zonestream.net"));
        assert!(page.contains("unauthenticated requests"));
    }

    #[tokio::test]
    async fn preview_renders_fetched_widget() {
        let params = PreviewParams {
            zones: "101,102".to_string(),
            key: None,
        };
        let page = preview(State(state(Some("<div>ad</div>"))), Query(params))
            .await
            .unwrap()
            .0;
        assert!(page.contains("ZoneStream preview"));
        assert_eq!(page.matches("<iframe").count(), 2);
        assert_eq!(page.matches("data-zs-step=").count(), 2);
    }

    #[tokio::test]
    async fn preview_shows_error_boxes_when_delivery_is_down() {
        let params = PreviewParams {
            zones: "101".to_string(),
            key: None,
        };
        let page = preview(State(state(None)), Query(params)).await.unwrap().0;
        assert!(page.contains("zs-error"));
        assert!(page.contains("Failed to load ad."));
        assert!(!page.contains("<iframe"));
    }

    #[tokio::test]
    async fn preview_rejects_malformed_zone_lists() {
        let params = PreviewParams {
            zones: "101,oops".to_string(),
            key: None,
        };
        let err = preview(State(state(Some("x"))), Query(params))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert!(err.1.contains("oops"));
    }
}
