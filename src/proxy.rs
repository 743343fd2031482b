//! Edge proxy.
//!
//! A stateless forwarder for deployments where the browser-facing origin
//! cannot reach the backend directly: it accepts any method under `/api/*`,
//! strips the `/api` prefix, forwards method, headers, and body to the
//! configured backend origin, and relays the response verbatim. With no
//! backend origin configured every request fails fast with a JSON error.

use axum::{
    Json, Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
    routing::any,
};
use bytes::Bytes;
use metrics::counter;
use serde_json::json;
use tracing::{debug, warn};

#[derive(Clone)]
pub struct ProxyState {
    http: reqwest::Client,
    backend_origin: Option<String>,
}

impl ProxyState {
    pub fn new(backend_origin: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            backend_origin: backend_origin.map(|origin| origin.trim_end_matches('/').to_owned()),
        }
    }
}

pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/api/{*path}", any(forward))
        .with_state(state)
}

async fn forward(
    State(state): State<ProxyState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(origin) = &state.backend_origin else {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "backend origin is not configured",
        );
    };

    let path = uri.path().strip_prefix("/api").unwrap_or(uri.path());
    let target = match uri.query() {
        Some(query) => format!("{origin}{path}?{query}"),
        None => format!("{origin}{path}"),
    };

    counter!("larder_proxy_forward_total").increment(1);
    debug!(%method, target, "forwarding request");

    let mut request = state.http.request(method, target.as_str());
    for (name, value) in &headers {
        // Host and length are re-derived for the upstream connection.
        if name == header::HOST || name == header::CONTENT_LENGTH {
            continue;
        }
        request = request.header(name.clone(), value.clone());
    }

    let upstream = match request.body(body).send().await {
        Ok(response) => response,
        Err(error) => {
            warn!(%error, target, "upstream request failed");
            return error_response(
                StatusCode::BAD_GATEWAY,
                &format!("upstream request failed: {error}"),
            );
        }
    };

    let status = upstream.status();
    let mut builder = Response::builder().status(status);
    for (name, value) in upstream.headers() {
        if name == header::TRANSFER_ENCODING || name == header::CONNECTION {
            continue;
        }
        builder = builder.header(name.clone(), value.clone());
    }
    let bytes = match upstream.bytes().await {
        Ok(bytes) => bytes,
        Err(error) => {
            warn!(%error, target, "failed to read upstream body");
            return error_response(
                StatusCode::BAD_GATEWAY,
                &format!("failed to read upstream body: {error}"),
            );
        }
    };

    builder
        .body(Body::from(bytes))
        .unwrap_or_else(|_| StatusCode::BAD_GATEWAY.into_response())
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}
