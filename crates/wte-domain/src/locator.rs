use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use tracing::{info, warn};

use crate::entities::{
    GeocodingResult, GeolocationResult, LatLng, NearbySearchRequest, PlacesSearchResponse,
    PlacesSearchResult, PriceLevel, SearchRequest, WifiAccessPoint,
};
use crate::errors::{LocateError, UpstreamError};
use crate::place::Place;

pub const DEFAULT_RADIUS_METERS: u32 = 3000;
pub const MAX_RADIUS_METERS: u32 = 50_000;
pub const MIN_RATING: f32 = 1.0;

/// Operations a mapping gateway offers the locator.
#[async_trait]
pub trait GeoLocator: Send + Sync {
    async fn geolocate(
        &self,
        access_points: Vec<WifiAccessPoint>,
    ) -> Result<GeolocationResult, UpstreamError>;

    async fn reverse_geocode(&self, at: LatLng) -> Result<Vec<GeocodingResult>, UpstreamError>;

    async fn list_restaurants(
        &self,
        request: &NearbySearchRequest,
    ) -> Result<PlacesSearchResponse, UpstreamError>;

    async fn place_details(&self, place_id: &str) -> Result<Place, UpstreamError>;
}

#[derive(Debug, Clone)]
pub struct LocatorOptions {
    /// Wait before requesting a continuation page; the upstream only honours a
    /// page token after a short delay.
    pub page_delay: Duration,
    pub max_pages: usize,
}

impl Default for LocatorOptions {
    fn default() -> Self {
        Self {
            page_delay: Duration::from_secs(2),
            max_pages: 3,
        }
    }
}

#[derive(Clone)]
pub struct Locator {
    gateway: Arc<dyn GeoLocator>,
    options: LocatorOptions,
}

impl Locator {
    pub fn new(gateway: Arc<dyn GeoLocator>) -> Self {
        Self::with_options(gateway, LocatorOptions::default())
    }

    pub fn with_options(gateway: Arc<dyn GeoLocator>, options: LocatorOptions) -> Self {
        Self { gateway, options }
    }

    pub fn options(&self) -> &LocatorOptions {
        &self.options
    }

    /// Geolocates from scanned `"<bssid> <channel>"` rows. Exactly the first
    /// two rows are used.
    pub async fn fetch_location(&self, rows: &[String]) -> Result<GeolocationResult, LocateError> {
        if rows.len() < 2 {
            return Err(LocateError::NoAccessPoints);
        }
        let access_points = rows[..2]
            .iter()
            .map(|row| parse_access_point(row))
            .collect::<Result<Vec<_>, _>>()?;

        self.gateway
            .geolocate(access_points)
            .await
            .map_err(|err| {
                warn!(event = "geolocate_failed", error = %err);
                LocateError::from(err)
            })
    }

    pub async fn reverse_geocode(&self, at: LatLng) -> Result<GeocodingResult, LocateError> {
        let results = self.gateway.reverse_geocode(at).await?;
        results.into_iter().next().ok_or(LocateError::NoAddress)
    }

    /// Runs one nearby search for `request` and returns a random restaurant
    /// rated at least [`MIN_RATING`].
    pub async fn fetch_restaurant(&self, request: &SearchRequest) -> Result<Place, LocateError> {
        let radius = normalize_radius(request.distance);
        let mut search = NearbySearchRequest::restaurants(request.location(), radius);
        search.min_price = PriceLevel::from_level(request.pricing);

        info!(event = "nearby_search", location = %search.location, radius = search.radius);
        let response = self.gateway.list_restaurants(&search).await.map_err(|err| {
            warn!(event = "nearby_search_failed", error = %err);
            LocateError::from(err)
        })?;
        info!(event = "nearby_search_results", count = response.results.len());

        let picked = pick_random_place(response.results, &mut rand::rng()).inspect_err(|err| {
            warn!(event = "random_pick_failed", error = %err);
        })?;
        Ok(Place::from(picked))
    }

    /// Collects nearby restaurants across continuation pages.
    pub async fn collect_restaurants(
        &self,
        at: LatLng,
        radius: u32,
        min_price: Option<PriceLevel>,
    ) -> Result<Vec<PlacesSearchResult>, LocateError> {
        let mut search = NearbySearchRequest::restaurants(at, normalize_radius(radius));
        search.min_price = min_price;

        let max_pages = self.options.max_pages.max(1);
        let mut places = Vec::new();
        for page in 1..=max_pages {
            info!(event = "nearby_search", page, location = %at, radius = search.radius);
            let response = self.gateway.list_restaurants(&search).await?;
            info!(event = "nearby_search_results", page, count = response.results.len());

            let next = response.continuation().map(str::to_string);
            places.extend(response.results);
            let Some(token) = next else {
                break;
            };
            if page == max_pages {
                info!(event = "nearby_search_page_cap", pages = page);
                break;
            }
            tokio::time::sleep(self.options.page_delay).await;
            search.page_token = Some(token);
        }
        Ok(places)
    }

    pub async fn place_details(&self, place_id: &str) -> Result<Place, LocateError> {
        Ok(self.gateway.place_details(place_id).await?)
    }
}

fn parse_access_point(row: &str) -> Result<WifiAccessPoint, LocateError> {
    let mut fields = row.split_whitespace();
    let (Some(bssid), Some(channel)) = (fields.next(), fields.next()) else {
        return Err(LocateError::IncompleteAccessPoint);
    };
    let channel = channel
        .parse::<u32>()
        .map_err(|source| LocateError::InvalidChannel {
            row: row.to_string(),
            source,
        })?;
    Ok(WifiAccessPoint {
        mac_address: bssid.to_string(),
        channel,
    })
}

fn normalize_radius(distance: u32) -> u32 {
    match distance {
        0 => DEFAULT_RADIUS_METERS,
        meters => meters.min(MAX_RADIUS_METERS),
    }
}

/// Draws uniformly from `candidates`, discarding draws rated below
/// [`MIN_RATING`] until one qualifies or none are left.
pub fn pick_random_place<R>(
    mut candidates: Vec<PlacesSearchResult>,
    rng: &mut R,
) -> Result<PlacesSearchResult, LocateError>
where
    R: Rng + ?Sized,
{
    while !candidates.is_empty() {
        let index = rng.random_range(0..candidates.len());
        let candidate = candidates.swap_remove(index);
        if candidate.rating >= MIN_RATING {
            return Ok(candidate);
        }
    }
    Err(LocateError::NoSuitablePlace)
}

pub fn format_bool(value: bool) -> &'static str {
    if value { "Sim" } else { "Não" }
}
