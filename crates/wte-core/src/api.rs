use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::State;
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;
use wte_domain::{LocatorOptions, Place, SearchRequest};

use crate::error::{ApiError, ResultEnvelope};
use crate::providers::{self, Providers};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub struct AppState {
    pub providers: Arc<Providers>,
    pub locator_options: LocatorOptions,
}

impl AppState {
    pub fn new(providers: Arc<Providers>) -> Self {
        Self {
            providers,
            locator_options: LocatorOptions::default(),
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/restaurants", post(find_where_to_eat))
        .with_state(state)
}

/// `POST /api/v1/restaurants`: a random, rated restaurant near `lat`/`lng`.
pub async fn find_where_to_eat(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let trace_id = Uuid::new_v4().to_string();
    let started_at = Instant::now();

    let mut response = match find(&state, &body, &trace_id).await {
        Ok(place) => {
            info!(
                event = "downstream_responded",
                trace_id = %trace_id,
                place_id = %place.place_id,
                elapsed_ms = started_at.elapsed().as_millis()
            );
            match serde_json::to_value(&place) {
                Ok(value) => ResultEnvelope::ok(value).into_response(),
                Err(err) => ApiError::Encode(err).into_response(),
            }
        }
        Err(err) => {
            warn!(
                event = "downstream_responded",
                trace_id = %trace_id,
                code = err.code(),
                error = %err,
                elapsed_ms = started_at.elapsed().as_millis()
            );
            err.into_response()
        }
    };

    if let Ok(value) = HeaderValue::from_str(&trace_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

async fn find(state: &AppState, body: &[u8], trace_id: &str) -> Result<Place, ApiError> {
    let request = SearchRequest::from_json(body)?;
    info!(
        event = "downstream_received",
        trace_id = %trace_id,
        lat = request.lat,
        lng = request.lng,
        distance = request.distance,
        pricing = request.pricing
    );

    let locator = providers::locator_with_options(&state.providers, state.locator_options.clone())?;
    Ok(locator.fetch_restaurant(&request).await?)
}
