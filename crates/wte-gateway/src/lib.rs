//! Google Maps Platform gateway.
//!
//! [`MapsClient`] speaks HTTP to the geolocation, geocoding and places APIs;
//! [`GoogleGateway`] adapts it to the domain's `GeoLocator` seam.

mod client;
mod google;

pub use client::{GatewayError, MapsClient, MapsClientConfig};
pub use google::GoogleGateway;
