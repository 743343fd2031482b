//! The single HTTP chokepoint for backend RPC.
//!
//! Every backend call is a JSON POST to `<base>/<Aggregate>/<operation>`.
//! This module owns the one `reqwest::Client` per process, bearer-token
//! injection from session storage, the fixed request timeout, the error
//! taxonomy, and response-shape normalization: result bodies arrive either
//! as a JSON object or as an array whose first element (or, for row-set
//! endpoints, every element) carries the result fields. Nothing above this
//! layer ever sniffs shapes. Single attempt per call; no retries.

mod error;

use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use reqwest::StatusCode;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::infra::storage::{SessionStorage, keys};

pub use error::ApiError;

#[derive(Debug, Clone, serde::Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

pub struct RpcClient {
    http: reqwest::Client,
    base: Url,
    storage: Arc<SessionStorage>,
}

impl RpcClient {
    /// Build the process-wide client. `origin` may carry a path prefix
    /// (e.g. an edge proxy's `/api`); it is normalized to end with `/` so
    /// endpoint joins preserve it.
    pub fn new(
        origin: Url,
        timeout: Duration,
        storage: Arc<SessionStorage>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .build()
            .map_err(|err| ApiError::client(format!("failed to build http client: {err}")))?;

        let mut base = origin;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Ok(Self {
            http,
            base,
            storage,
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("larder/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn endpoint_url(&self, endpoint: &str) -> Result<Url, ApiError> {
        self.base
            .join(endpoint.trim_start_matches('/'))
            .map_err(|err| ApiError::client(format!("invalid endpoint {endpoint}: {err}")))
    }

    async fn post_raw<P: Serialize>(
        &self,
        endpoint: &str,
        payload: &P,
    ) -> Result<(StatusCode, Bytes), ApiError> {
        let url = self.endpoint_url(endpoint)?;
        debug!(endpoint, "rpc call");

        let mut request = self.http.post(url).json(payload);
        if let Some(token) = self.storage.get(keys::SESSION_TOKEN) {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|err| {
            if err.is_builder() {
                ApiError::client(err.to_string())
            } else {
                ApiError::transport(err.to_string())
            }
        })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ApiError::transport(err.to_string()))?;

        if !status.is_success() {
            return Err(server_error(status, &bytes));
        }
        Ok((status, bytes))
    }

    /// Call an endpoint whose result is a single record (object root or
    /// first array element).
    pub async fn call<P: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        payload: &P,
    ) -> Result<T, ApiError> {
        let (status, bytes) = self.post_raw(endpoint, payload).await?;
        decode_first(&bytes).map_err(|message| ApiError::server(status.as_u16(), message))
    }

    /// Call an endpoint whose result is a row set (every array element is a
    /// record; a bare object is a one-row set).
    pub async fn call_list<P: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        payload: &P,
    ) -> Result<Vec<T>, ApiError> {
        let (status, bytes) = self.post_raw(endpoint, payload).await?;
        decode_list(&bytes).map_err(|message| ApiError::server(status.as_u16(), message))
    }

    /// Call a command endpoint whose response body is not consumed.
    pub async fn call_ack<P: Serialize>(&self, endpoint: &str, payload: &P) -> Result<(), ApiError> {
        self.post_raw(endpoint, payload).await.map(|_| ())
    }
}

fn server_error(status: StatusCode, bytes: &[u8]) -> ApiError {
    let message = serde_json::from_slice::<ErrorBody>(bytes)
        .ok()
        .and_then(|body| body.error)
        .unwrap_or_else(|| format!("HTTP error! status: {}", status.as_u16()));
    ApiError::server(status.as_u16(), message)
}

fn decode_first<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, String> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|err| format!("failed to parse body: {err}"))?;
    let root = match value {
        Value::Array(mut items) => {
            if items.is_empty() {
                return Err("empty result array".to_owned());
            }
            items.remove(0)
        }
        other => other,
    };
    serde_json::from_value(root).map_err(|err| format!("unexpected response shape: {err}"))
}

fn decode_list<T: DeserializeOwned>(bytes: &[u8]) -> Result<Vec<T>, String> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|err| format!("failed to parse body: {err}"))?;
    let rows = match value {
        Value::Array(items) => items,
        other => vec![other],
    };
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row).map_err(|err| format!("unexpected response shape: {err}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use larder_api_types::auth::{UserResponse, UsersResponse};
    use larder_api_types::menu_collection::MenusOwnedRow;

    use super::*;

    #[test]
    fn decode_first_accepts_object_root() {
        let body = br#"{"user": "u1"}"#;
        let parsed: UserResponse = decode_first(body).expect("object root");
        assert_eq!(parsed.user, "u1");
    }

    #[test]
    fn decode_first_takes_first_array_element() {
        let body = br#"[{"users": ["u1", "u2"]}, {"users": ["ignored"]}]"#;
        let parsed: UsersResponse = decode_first(body).expect("array root");
        assert_eq!(parsed.users, vec!["u1", "u2"]);
    }

    #[test]
    fn decode_first_rejects_empty_array() {
        let body = br"[]";
        let result: Result<UserResponse, String> = decode_first(body);
        assert!(result.is_err());
    }

    #[test]
    fn decode_list_keeps_every_row() {
        let body = br#"[{"menus": ["m1"]}, {"menus": "m2, m3"}]"#;
        let rows: Vec<MenusOwnedRow> = decode_list(body).expect("rows");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].menus, vec!["m1"]);
        assert_eq!(rows[1].menus, vec!["m2", "m3"]);
    }

    #[test]
    fn decode_list_wraps_bare_object() {
        let body = br#"{"menus": ["m1"]}"#;
        let rows: Vec<MenusOwnedRow> = decode_list(body).expect("rows");
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn server_error_prefers_body_error_field() {
        let error = server_error(
            StatusCode::BAD_REQUEST,
            br#"{"error": "menu already exists"}"#,
        );
        assert_eq!(error, ApiError::server(400, "menu already exists"));
    }

    #[test]
    fn server_error_synthesizes_from_status() {
        let error = server_error(StatusCode::INTERNAL_SERVER_ERROR, b"boom");
        assert_eq!(error, ApiError::server(500, "HTTP error! status: 500"));
    }
}
