// Async HTTP client for the dynamic reference-data catalogue.
//
// Base path: {api_base_url}/dynamic-data/
// No authentication; every call is a single JSON request with no retry.

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::transport::TransportConfig;
use crate::types::{
    BulkCreateRequest, BulkCreateResponse, CatalogueStatus, CreateDataPointRequest, DataPoint,
    DataType, DataTypeWithPoints, EntityId, UpdateDataPointRequest,
};

/// Path segment appended to the API base URL.
const ROOT_SEGMENT: &str = "dynamic-data";

// ── Error response shape ─────────────────────────────────────────────

/// Error bodies carry `detail` as either a plain string or a list of
/// validation entries (`[{ "loc": [...], "msg": "...", "type": "..." }]`).
#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

fn detail_text(detail: &serde_json::Value) -> Option<String> {
    match detail {
        serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
        serde_json::Value::Array(entries) => {
            let msgs: Vec<&str> = entries
                .iter()
                .filter_map(|e| e.get("msg").and_then(serde_json::Value::as_str))
                .collect();
            if msgs.is_empty() {
                None
            } else {
                Some(msgs.join("; "))
            }
        }
        serde_json::Value::Null => None,
        other => Some(other.to_string()),
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the reference-data catalogue.
///
/// Cheap to clone; the underlying `reqwest::Client` shares its pool.
#[derive(Debug, Clone)]
pub struct CatalogueClient {
    http: reqwest::Client,
    base_url: Url,
}

impl CatalogueClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API base URL (e.g. `http://localhost:8000/api/v1`).
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::with_client(base_url, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Parse the base URL and strip any trailing slash so that segments
    /// can be appended uniformly.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        if url.cannot_be_a_base() {
            return Err(Error::UnusableBaseUrl(raw.to_owned()));
        }
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&path);
        Ok(url)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append `dynamic-data/` plus each segment, percent-encoding every
    /// segment individually.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push(ROOT_SEGMENT).extend(segments);
        }
        url
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, Error> {
        let url = self.url(segments);
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        Self::handle_response(resp).await
    }

    async fn get_with_params<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        params: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = self.url(segments);
        debug!("GET {url} params={params:?}");

        let resp = self.http.get(url).query(params).send().await?;
        Self::handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(segments);
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        Self::handle_response(resp).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(segments);
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        Self::handle_response(resp).await
    }

    async fn delete(&self, segments: &[&str]) -> Result<(), Error> {
        let url = self.url(segments);
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        Self::handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn handle_empty(resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(Self::parse_error(status, resp).await)
        }
    }

    async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();

        let detail = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|err| err.detail.as_ref().and_then(detail_text))
            .unwrap_or_else(|| {
                if raw.is_empty() {
                    status.to_string()
                } else {
                    raw
                }
            });

        Error::Http {
            status: status.as_u16(),
            detail,
        }
    }

    fn require_type_name(type_name: &str) -> Result<(), Error> {
        if type_name.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "data type name must not be empty".into(),
            ));
        }
        Ok(())
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Data types ───────────────────────────────────────────────────

    /// Active data types, ordered by display name.
    pub async fn list_types(&self) -> Result<Vec<DataType>, Error> {
        self.get(&["data-types"]).await
    }

    /// A data type together with all of its points.
    pub async fn get_type_with_points(&self, type_name: &str) -> Result<DataTypeWithPoints, Error> {
        Self::require_type_name(type_name)?;
        self.get(&["data-types", type_name]).await
    }

    // ── Data points ──────────────────────────────────────────────────

    /// Active points of a type, ordered by sort order then name.
    ///
    /// An unknown type name yields an empty list rather than an error.
    pub async fn list_points(&self, type_name: &str) -> Result<Vec<DataPoint>, Error> {
        self.points_for(type_name, true).await
    }

    /// Every point of a type, inactive ones included. Used by the
    /// management console so that deactivated values remain editable.
    pub async fn list_all_points(&self, type_name: &str) -> Result<Vec<DataPoint>, Error> {
        self.points_for(type_name, false).await
    }

    async fn points_for(&self, type_name: &str, active_only: bool) -> Result<Vec<DataPoint>, Error> {
        Self::require_type_name(type_name)?;
        let result = self
            .get_with_params(
                &["data-types", type_name, "points"],
                &[("active_only", active_only.to_string())],
            )
            .await;

        match result {
            Err(e) if e.is_not_found() => {
                debug!(type_name, "unknown data type, returning empty list");
                Ok(Vec::new())
            }
            other => other,
        }
    }

    pub async fn create_point(&self, req: &CreateDataPointRequest) -> Result<DataPoint, Error> {
        if req.name.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "data point name must not be empty".into(),
            ));
        }
        self.post(&["data-points"], req).await
    }

    pub async fn update_point(
        &self,
        id: &EntityId,
        req: &UpdateDataPointRequest,
    ) -> Result<DataPoint, Error> {
        let id = id.to_string();
        self.put(&["data-points", &id], req).await
    }

    /// Delete a point. The server echoes `{ok, deleted}`; the body is ignored.
    pub async fn delete_point(&self, id: &EntityId) -> Result<(), Error> {
        let id = id.to_string();
        self.delete(&["data-points", &id]).await
    }

    pub async fn bulk_create_points(
        &self,
        req: &BulkCreateRequest,
    ) -> Result<BulkCreateResponse, Error> {
        self.post(&["data-points", "bulk"], req).await
    }

    /// Case-insensitive search on name and description, optionally
    /// restricted to one data type.
    pub async fn search_points(
        &self,
        query: &str,
        data_type: Option<&str>,
    ) -> Result<Vec<DataPoint>, Error> {
        let mut params = vec![("q", query.to_owned())];
        if let Some(dt) = data_type {
            params.push(("data_type", dt.to_owned()));
        }
        self.get_with_params(&["search"], &params).await
    }

    // ── Status ───────────────────────────────────────────────────────

    pub async fn status(&self) -> Result<CatalogueStatus, Error> {
        self.get(&["status"]).await
    }

    /// Seed the server with its built-in default types and points.
    pub async fn initialize_defaults(&self) -> Result<String, Error> {
        let resp: HashMap<String, String> = self.post(&["initialize"], &()).await?;
        Ok(resp.get("message").cloned().unwrap_or_default())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(base: &str) -> CatalogueClient {
        CatalogueClient::with_client(base, reqwest::Client::new()).unwrap()
    }

    #[test]
    fn url_appends_root_segment() {
        let c = client("http://localhost:8000/api/v1");
        assert_eq!(
            c.url(&["data-types"]).as_str(),
            "http://localhost:8000/api/v1/dynamic-data/data-types"
        );
    }

    #[test]
    fn url_tolerates_trailing_slash() {
        let c = client("http://localhost:8000/api/v1/");
        assert_eq!(
            c.url(&["data-types", "risk_levels", "points"]).as_str(),
            "http://localhost:8000/api/v1/dynamic-data/data-types/risk_levels/points"
        );
    }

    #[test]
    fn url_percent_encodes_type_name() {
        let c = client("http://localhost:8000/api/v1");
        assert_eq!(
            c.url(&["data-types", "a/b c", "points"]).as_str(),
            "http://localhost:8000/api/v1/dynamic-data/data-types/a%2Fb%20c/points"
        );
    }

    #[test]
    fn rejects_non_base_url() {
        let err = CatalogueClient::with_client("mailto:ops@example.org", reqwest::Client::new())
            .unwrap_err();
        assert!(matches!(err, Error::UnusableBaseUrl(_)));
    }

    #[test]
    fn detail_text_handles_string_and_list() {
        assert_eq!(
            detail_text(&json!("Data type not found")).as_deref(),
            Some("Data type not found")
        );
        assert_eq!(
            detail_text(&json!([
                { "loc": ["body", "name"], "msg": "field required", "type": "value_error.missing" },
                { "loc": ["body", "data_type_id"], "msg": "field required", "type": "value_error.missing" }
            ]))
            .as_deref(),
            Some("field required; field required")
        );
        assert_eq!(detail_text(&json!(null)), None);
    }
}
