use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use wte_domain::{
    GeoLocator, LatLng, NearbySearchRequest, PriceLevel, UpstreamError, WifiAccessPoint,
};
use wte_gateway::{GoogleGateway, MapsClient, MapsClientConfig};

const KEY: &str = "test-key";

type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

fn key_ok(query: &HashMap<String, String>) -> bool {
    query.get("key").map(String::as_str) == Some(KEY)
}

async fn geolocate(
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<Value>,
) -> Response {
    if !key_ok(&query) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key.",
                    "errors": [{
                        "domain": "usageLimits",
                        "reason": "keyInvalid",
                        "message": "Bad Request"
                    }]
                }
            })),
        )
            .into_response();
    }
    let points = body["wifiAccessPoints"].as_array().cloned().unwrap_or_default();
    if body["considerIp"] != json!(true) || points.len() != 2 {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": { "message": "bad body" } })))
            .into_response();
    }
    Json(json!({ "location": { "lat": 38.7223, "lng": -9.1393 }, "accuracy": 40.0 }))
        .into_response()
}

async fn geocode(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    if !key_ok(&query) {
        return Json(json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid.",
            "results": []
        }));
    }
    let latlng = query.get("latlng").cloned().unwrap_or_default();
    Json(json!({
        "status": "OK",
        "results": [{
            "formatted_address": format!("near {}", latlng),
            "geometry": {
                "location": { "lat": 38.7223, "lng": -9.1393 },
                "location_type": "ROOFTOP"
            }
        }]
    }))
}

async fn nearby(
    State(seen): State<Seen>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    seen.lock().unwrap().push(query.clone());
    if query.get("pagetoken").map(String::as_str) == Some("page-2") {
        return Json(json!({
            "status": "OK",
            "results": [{ "place_id": "c", "name": "Churrasqueira", "rating": 3.9 }]
        }));
    }
    Json(json!({
        "status": "OK",
        "next_page_token": "page-2",
        "results": [
            {
                "place_id": "a",
                "name": "Tasca do Chico",
                "vicinity": "Rua do Diário de Notícias 39",
                "rating": 4.5,
                "price_level": 2,
                "types": ["restaurant", "food"],
                "geometry": { "location": { "lat": 38.712, "lng": -9.143 } },
                "opening_hours": { "open_now": true }
            },
            { "place_id": "b", "name": "Sem Nota" }
        ]
    }))
}

async fn details(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    Json(json!({
        "status": "OK",
        "result": {
            "place_id": query.get("place_id").cloned().unwrap_or_default(),
            "name": "Tasca do Chico",
            "formatted_address": "R. do Diário de Notícias 39, 1200-141 Lisboa",
            "formatted_phone_number": "961 339 696",
            "rating": 4.5,
            "price_level": 2,
            "types": ["restaurant"],
            "geometry": { "location": { "lat": 38.712, "lng": -9.143 } },
            "opening_hours": {
                "open_now": false,
                "periods": [{ "open": { "day": 0, "time": "1900" } }]
            }
        }
    }))
}

async fn spawn_fake_google() -> (String, Seen) {
    let seen: Seen = Arc::default();
    let app = Router::new()
        .route("/geolocation/v1/geolocate", post(geolocate))
        .route("/maps/api/geocode/json", get(geocode))
        .route("/maps/api/place/nearbysearch/json", get(nearby))
        .route("/maps/api/place/details/json", get(details))
        .with_state(seen.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), seen)
}

fn client(base: &str, key: &str) -> MapsClient {
    MapsClient::new(MapsClientConfig::new(key).with_base_url(base)).unwrap()
}

fn access_points() -> Vec<WifiAccessPoint> {
    vec![
        WifiAccessPoint {
            mac_address: "68:ec:c5:c7:d9:f4".to_string(),
            channel: 13,
        },
        WifiAccessPoint {
            mac_address: "00:25:9c:cf:1c:ac".to_string(),
            channel: 6,
        },
    ]
}

#[tokio::test]
async fn geolocate_posts_access_points() {
    let (base, _) = spawn_fake_google().await;
    let result = client(&base, KEY).geolocate(&access_points()).await.unwrap();

    assert_eq!(result.location, LatLng::new(38.7223, -9.1393));
    assert_eq!(result.accuracy, 40.0);
}

#[tokio::test]
async fn geolocate_error_object_becomes_status_error() {
    let (base, _) = spawn_fake_google().await;
    let err = client(&base, "wrong")
        .geolocate(&access_points())
        .await
        .unwrap_err();

    match err {
        UpstreamError::Status { status, message } => {
            assert_eq!(status, "400");
            assert_eq!(message, "API key not valid. Please pass a valid API key.");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn reverse_geocode_sends_latlng() {
    let (base, _) = spawn_fake_google().await;
    let results = client(&base, KEY)
        .reverse_geocode(LatLng::new(38.5, -9.25))
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].formatted_address, "near 38.5,-9.25");
    assert_eq!(results[0].geometry.location_type.as_deref(), Some("ROOFTOP"));
}

#[tokio::test]
async fn denied_status_is_reported() {
    let (base, _) = spawn_fake_google().await;
    let err = client(&base, "wrong")
        .reverse_geocode(LatLng::new(0.0, 0.0))
        .await
        .unwrap_err();

    match err {
        UpstreamError::Status { status, message } => {
            assert_eq!(status, "REQUEST_DENIED");
            assert_eq!(message, "The provided API key is invalid.");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn nearby_search_passes_filters_and_token() {
    let (base, seen) = spawn_fake_google().await;
    let client = client(&base, KEY);
    let mut request = NearbySearchRequest::restaurants(LatLng::new(38.71, -9.14), 1500);
    request.min_price = Some(PriceLevel::Moderate);

    let first = client.nearby_search(&request).await.unwrap();
    assert_eq!(first.results.len(), 2);
    assert_eq!(first.continuation(), Some("page-2"));
    assert_eq!(first.results[0].rating, 4.5);
    assert_eq!(first.results[1].rating, 0.0);

    request.page_token = Some("page-2".to_string());
    let second = client.nearby_search(&request).await.unwrap();
    assert_eq!(second.results[0].place_id, "c");
    assert!(second.continuation().is_none());

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].get("location").map(String::as_str), Some("38.71,-9.14"));
    assert_eq!(seen[0].get("radius").map(String::as_str), Some("1500"));
    assert_eq!(seen[0].get("type").map(String::as_str), Some("restaurant"));
    assert_eq!(seen[0].get("minprice").map(String::as_str), Some("2"));
    assert!(seen[0].get("pagetoken").is_none());
    assert_eq!(seen[1].get("pagetoken").map(String::as_str), Some("page-2"));
}

#[tokio::test]
async fn gateway_maps_details_into_place() {
    let (base, _) = spawn_fake_google().await;
    let gateway = GoogleGateway::new(Arc::new(client(&base, KEY)));

    let place = gateway.place_details("ChIJ-tasca").await.unwrap();

    assert_eq!(place.place_id, "ChIJ-tasca");
    assert_eq!(place.address, "R. do Diário de Notícias 39, 1200-141 Lisboa");
    assert_eq!(place.phone, "961 339 696");
    assert_eq!(place.open_now, Some(false));
}

#[tokio::test]
async fn unreachable_upstream_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = client(&base, KEY)
        .reverse_geocode(LatLng::new(0.0, 0.0))
        .await
        .unwrap_err();
    assert!(matches!(err, UpstreamError::Transport(_)));
}
