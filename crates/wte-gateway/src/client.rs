use std::fmt;
use std::time::{Duration, Instant};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{info, warn};
use wreq::{Client, Proxy};

use wte_common::GlobalConfig;
use wte_domain::{
    GeocodingResult, GeolocationResult, LatLng, NearbySearchRequest, PlaceDetailsResult,
    PlacesSearchResponse, UpstreamError, WifiAccessPoint,
};

const GEOLOCATE_PATH: &str = "/geolocation/v1/geolocate";
const GEOCODE_PATH: &str = "/maps/api/geocode/json";
const NEARBY_SEARCH_PATH: &str = "/maps/api/place/nearbysearch/json";
const PLACE_DETAILS_PATH: &str = "/maps/api/place/details/json";

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("maps api key is empty")]
    MissingApiKey,
    #[error("failed to build maps http client: {0}")]
    Client(#[from] wreq::Error),
}

#[derive(Clone)]
pub struct MapsClientConfig {
    pub api_key: String,
    pub maps_base_url: String,
    pub geolocation_base_url: String,
    pub proxy: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl MapsClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            maps_base_url: wte_common::DEFAULT_MAPS_BASE_URL.to_string(),
            geolocation_base_url: wte_common::DEFAULT_GEOLOCATION_BASE_URL.to_string(),
            proxy: None,
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
        }
    }

    pub fn from_global(global: &GlobalConfig) -> Self {
        Self {
            maps_base_url: global.maps_base_url.clone(),
            geolocation_base_url: global.geolocation_base_url.clone(),
            proxy: global.proxy.clone(),
            ..Self::new(global.api_key.clone())
        }
    }

    /// Points both APIs at one base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.maps_base_url = base_url.clone();
        self.geolocation_base_url = base_url;
        self
    }
}

impl fmt::Debug for MapsClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapsClientConfig")
            .field("api_key", &wte_common::redact(&self.api_key))
            .field("maps_base_url", &self.maps_base_url)
            .field("geolocation_base_url", &self.geolocation_base_url)
            .field("proxy", &self.proxy)
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Handle to the Google Maps web services. Immutable once built and cheap to
/// share behind an `Arc`.
pub struct MapsClient {
    http: Client,
    config: MapsClientConfig,
}

impl fmt::Debug for MapsClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapsClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct GeolocationRequest<'a> {
    consider_ip: bool,
    wifi_access_points: &'a [WifiAccessPoint],
}

#[derive(Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodingResult>,
}

#[derive(Deserialize)]
struct PlaceDetailsResponse {
    result: PlaceDetailsResult,
}

impl MapsClient {
    pub fn new(config: MapsClientConfig) -> Result<Self, GatewayError> {
        if config.api_key.trim().is_empty() {
            return Err(GatewayError::MissingApiKey);
        }
        let mut builder = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout);
        if let Some(proxy) = config.proxy.as_deref() {
            builder = builder.proxy(Proxy::all(proxy)?);
        }
        Ok(Self {
            http: builder.build()?,
            config,
        })
    }

    pub fn config(&self) -> &MapsClientConfig {
        &self.config
    }

    pub async fn geolocate(
        &self,
        access_points: &[WifiAccessPoint],
    ) -> Result<GeolocationResult, UpstreamError> {
        let body = serde_json::to_vec(&GeolocationRequest {
            consider_ip: true,
            wifi_access_points: access_points,
        })
        .map_err(|err| UpstreamError::Decode(err.to_string()))?;
        let url = self.url(&self.config.geolocation_base_url, GEOLOCATE_PATH, Vec::new())?;

        let started_at = log_request("geolocate", GEOLOCATE_PATH);
        let sent = self
            .http
            .post(url)
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await;
        let value = read_json("geolocate", sent, started_at).await?;
        decode(value)
    }

    pub async fn reverse_geocode(&self, at: LatLng) -> Result<Vec<GeocodingResult>, UpstreamError> {
        let url = self.url(
            &self.config.maps_base_url,
            GEOCODE_PATH,
            vec![("latlng", at.to_string())],
        )?;
        let response: GeocodeResponse = self.get("reverse_geocode", GEOCODE_PATH, url).await?;
        Ok(response.results)
    }

    pub async fn nearby_search(
        &self,
        request: &NearbySearchRequest,
    ) -> Result<PlacesSearchResponse, UpstreamError> {
        let url = self.url(
            &self.config.maps_base_url,
            NEARBY_SEARCH_PATH,
            nearby_query(request),
        )?;
        self.get("nearby_search", NEARBY_SEARCH_PATH, url).await
    }

    pub async fn place_details(&self, place_id: &str) -> Result<PlaceDetailsResult, UpstreamError> {
        let url = self.url(
            &self.config.maps_base_url,
            PLACE_DETAILS_PATH,
            vec![("place_id", place_id.to_string())],
        )?;
        let response: PlaceDetailsResponse =
            self.get("place_details", PLACE_DETAILS_PATH, url).await?;
        Ok(response.result)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        op: &'static str,
        path: &'static str,
        url: String,
    ) -> Result<T, UpstreamError> {
        let started_at = log_request(op, path);
        let sent = self.http.get(url).send().await;
        let value = read_json(op, sent, started_at).await?;
        check_status(&value)?;
        decode(value)
    }

    fn url(
        &self,
        base: &str,
        path: &str,
        mut query: Vec<(&'static str, String)>,
    ) -> Result<String, UpstreamError> {
        query.push(("key", self.config.api_key.clone()));
        let query = serde_urlencoded::to_string(&query)
            .map_err(|err| UpstreamError::Transport(err.to_string()))?;
        Ok(format!("{}{path}?{query}", base.trim_end_matches('/')))
    }
}

fn nearby_query(request: &NearbySearchRequest) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("location", request.location.to_string()),
        ("radius", request.radius.to_string()),
    ];
    if let Some(place_type) = &request.place_type {
        query.push(("type", place_type.clone()));
    }
    if let Some(min_price) = request.min_price {
        query.push(("minprice", min_price.level().to_string()));
    }
    if let Some(token) = &request.page_token {
        query.push(("pagetoken", token.clone()));
    }
    query
}

fn log_request(op: &str, path: &str) -> Instant {
    info!(event = "upstream_request", provider = "google", op = %op, path = %path);
    Instant::now()
}

async fn read_json(
    op: &str,
    sent: Result<wreq::Response, wreq::Error>,
    started_at: Instant,
) -> Result<Value, UpstreamError> {
    let elapsed_ms = || started_at.elapsed().as_millis();
    let response = sent.map_err(|err| {
        warn!(
            event = "upstream_response",
            provider = "google",
            op = %op,
            status = "error",
            elapsed_ms = elapsed_ms(),
            error = %err
        );
        UpstreamError::Transport(err.to_string())
    })?;

    let status = response.status();
    let body = response
        .bytes()
        .await
        .map_err(|err| UpstreamError::Transport(err.to_string()))?;
    info!(
        event = "upstream_response",
        provider = "google",
        op = %op,
        status = status.as_u16(),
        elapsed_ms = elapsed_ms()
    );

    let value: Option<Value> = serde_json::from_slice(&body).ok();
    if !status.is_success() {
        let message = value
            .as_ref()
            .and_then(error_message)
            .unwrap_or_else(|| String::from_utf8_lossy(&body).trim().to_string());
        return Err(UpstreamError::Status {
            status: status.as_u16().to_string(),
            message,
        });
    }
    value.ok_or_else(|| UpstreamError::Decode(format!("{op} returned a non-JSON body")))
}

/// Places and geocoding report failures in a `status` field with HTTP 200.
fn check_status(value: &Value) -> Result<(), UpstreamError> {
    match value.get("status").and_then(Value::as_str) {
        None | Some("OK") | Some("ZERO_RESULTS") => Ok(()),
        Some(status) => Err(UpstreamError::Status {
            status: status.to_string(),
            message: error_message(value).unwrap_or_default(),
        }),
    }
}

/// Message from either `{"error_message": ..}` or the geolocation API's
/// `{"error": {"message": ..}}`.
fn error_message(value: &Value) -> Option<String> {
    value
        .get("error_message")
        .and_then(Value::as_str)
        .or_else(|| {
            value
                .get("error")
                .and_then(|error| error.get("message"))
                .and_then(Value::as_str)
        })
        .map(str::to_string)
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, UpstreamError> {
    serde_json::from_value(value).map_err(|err| UpstreamError::Decode(err.to_string()))
}
