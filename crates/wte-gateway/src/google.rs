use std::sync::Arc;

use async_trait::async_trait;
use wte_domain::{
    GeoLocator, GeocodingResult, GeolocationResult, LatLng, NearbySearchRequest, Place,
    PlacesSearchResponse, UpstreamError, WifiAccessPoint,
};

use crate::client::MapsClient;

/// `GeoLocator` backed by the Google Maps web services.
#[derive(Debug, Clone)]
pub struct GoogleGateway {
    client: Arc<MapsClient>,
}

impl GoogleGateway {
    pub fn new(client: Arc<MapsClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<MapsClient> {
        &self.client
    }
}

#[async_trait]
impl GeoLocator for GoogleGateway {
    async fn geolocate(
        &self,
        access_points: Vec<WifiAccessPoint>,
    ) -> Result<GeolocationResult, UpstreamError> {
        self.client.geolocate(&access_points).await
    }

    async fn reverse_geocode(&self, at: LatLng) -> Result<Vec<GeocodingResult>, UpstreamError> {
        self.client.reverse_geocode(at).await
    }

    async fn list_restaurants(
        &self,
        request: &NearbySearchRequest,
    ) -> Result<PlacesSearchResponse, UpstreamError> {
        self.client.nearby_search(request).await
    }

    async fn place_details(&self, place_id: &str) -> Result<Place, UpstreamError> {
        let details = self.client.place_details(place_id).await?;
        Ok(Place::from(details))
    }
}
