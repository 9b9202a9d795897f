use axum::extract::OriginalUri;
use axum::http::{HeaderValue, StatusCode, header::CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "web"]
struct WebAssets;

/// Serves the embedded page; unknown paths get `index.html`.
pub(crate) async fn static_fallback(uri: OriginalUri) -> Response {
    let path = match uri.0.path().trim_start_matches('/') {
        "" => "index.html",
        path => path,
    };
    let (path, asset) = match WebAssets::get(path) {
        Some(asset) => (path, asset),
        None => match WebAssets::get("index.html") {
            Some(asset) => ("index.html", asset),
            None => return (StatusCode::NOT_FOUND, "not found").into_response(),
        },
    };
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let mut response = Response::new(axum::body::Body::from(asset.data));
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_str(mime.as_ref())
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    response
}
