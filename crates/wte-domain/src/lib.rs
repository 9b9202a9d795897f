//! Domain types and the locator service.
//!
//! Nothing here performs network IO; the [`GeoLocator`] trait is the seam a
//! gateway crate implements against a concrete mapping API.

pub mod entities;
pub mod errors;
pub mod locator;
pub mod place;

pub use entities::{
    GeocodingResult, GeolocationResult, Geometry, LatLng, NearbySearchRequest, OpeningHours,
    OpeningPeriod, PLACE_TYPE_RESTAURANT, PlaceDetailsResult, PlacesSearchResponse,
    PlacesSearchResult, PriceLevel, SearchRequest, TimeOfWeek, WifiAccessPoint,
};
pub use errors::{LocateError, UpstreamError};
pub use locator::{GeoLocator, Locator, LocatorOptions, format_bool, pick_random_place};
pub use place::Place;
