use std::fmt;

use serde::{Deserialize, Serialize};

pub const PLACE_TYPE_RESTAURANT: &str = "restaurant";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Formats as `lat,lng`, the form the geocoding and places APIs expect.
impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WifiAccessPoint {
    pub mac_address: String,
    pub channel: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeolocationResult {
    pub location: LatLng,
    #[serde(default)]
    pub accuracy: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeocodingResult {
    #[serde(default)]
    pub formatted_address: String,
    #[serde(default)]
    pub geometry: Geometry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PriceLevel {
    Free = 0,
    Inexpensive = 1,
    Moderate = 2,
    Expensive = 3,
    VeryExpensive = 4,
}

impl PriceLevel {
    pub fn from_level(level: i32) -> Option<Self> {
        match level {
            0 => Some(PriceLevel::Free),
            1 => Some(PriceLevel::Inexpensive),
            2 => Some(PriceLevel::Moderate),
            3 => Some(PriceLevel::Expensive),
            4 => Some(PriceLevel::VeryExpensive),
            _ => None,
        }
    }

    pub fn level(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearbySearchRequest {
    pub location: LatLng,
    /// Meters.
    pub radius: u32,
    pub place_type: Option<String>,
    pub min_price: Option<PriceLevel>,
    pub page_token: Option<String>,
}

impl NearbySearchRequest {
    pub fn restaurants(location: LatLng, radius: u32) -> Self {
        Self {
            location,
            radius,
            place_type: Some(PLACE_TYPE_RESTAURANT.to_string()),
            min_price: None,
            page_token: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TimeOfWeek {
    /// 0 is Sunday.
    pub day: u8,
    /// 24h `hhmm`.
    #[serde(default)]
    pub time: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OpeningPeriod {
    pub open: TimeOfWeek,
    #[serde(default)]
    pub close: Option<TimeOfWeek>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OpeningHours {
    #[serde(default)]
    pub open_now: Option<bool>,
    #[serde(default)]
    pub periods: Vec<OpeningPeriod>,
}

impl OpeningHours {
    /// Opening time for `weekday` (0 is Sunday), if any period opens that day.
    pub fn opens_at(&self, weekday: u8) -> Option<&str> {
        self.periods
            .iter()
            .find(|period| period.open.day == weekday)
            .map(|period| period.open.time.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlacesSearchResult {
    pub place_id: String,
    pub name: String,
    pub vicinity: String,
    pub rating: f32,
    pub price_level: i32,
    pub geometry: Geometry,
    pub types: Vec<String>,
    pub opening_hours: Option<OpeningHours>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlacesSearchResponse {
    pub results: Vec<PlacesSearchResult>,
    pub next_page_token: Option<String>,
}

impl PlacesSearchResponse {
    pub fn continuation(&self) -> Option<&str> {
        self.next_page_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlaceDetailsResult {
    pub place_id: String,
    pub name: String,
    pub formatted_address: String,
    pub formatted_phone_number: String,
    pub vicinity: String,
    pub rating: f32,
    pub price_level: i32,
    pub geometry: Geometry,
    pub types: Vec<String>,
    pub opening_hours: Option<OpeningHours>,
}

/// Body of `POST /api/v1/restaurants`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub lat: f64,
    pub lng: f64,
    /// Search radius in meters.
    #[serde(default)]
    pub distance: u32,
    /// Minimum price level, 0..=4. Other values disable the filter.
    #[serde(default)]
    pub pricing: i32,
}

impl SearchRequest {
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    pub fn location(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}
