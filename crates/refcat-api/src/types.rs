//! Wire types for the `/dynamic-data/` endpoints.
//!
//! Field names are snake_case on the wire, matching Rust field names, so no
//! renaming is needed. Timestamps are kept as the server's ISO 8601 strings.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// ── EntityId ────────────────────────────────────────────────────────

/// Opaque identifier for a data type or data point.
///
/// The catalogue issues UUIDs, but locally authored records (fallback
/// snapshot, test fixtures) use short strings. Consumers never care which.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    Uuid(Uuid),
    Opaque(String),
}

impl EntityId {
    pub fn as_uuid(&self) -> Option<&Uuid> {
        match self {
            Self::Uuid(u) => Some(u),
            Self::Opaque(_) => None,
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Opaque(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

impl From<Uuid> for EntityId {
    fn from(u: Uuid) -> Self {
        Self::Uuid(u)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        match Uuid::parse_str(&s) {
            Ok(u) => Self::Uuid(u),
            Err(_) => Self::Opaque(s),
        }
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

fn default_true() -> bool {
    true
}

// ── Data types ──────────────────────────────────────────────────────

/// A named category of selectable values, as returned by `GET /data-types`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataType {
    pub id: EntityId,
    /// Machine key; unique across the catalogue.
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Only populated by some server builds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_points_count: Option<u32>,
}

/// A data type with its full point list, as returned by `GET /data-types/{name}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTypeWithPoints {
    #[serde(flatten)]
    pub data_type: DataType,
    #[serde(default)]
    pub data_points: Vec<DataPoint>,
}

// ── Data points ─────────────────────────────────────────────────────

/// One selectable value within a data type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub id: EntityId,
    pub data_type_id: EntityId,
    /// Value stored and submitted by forms; unique within its type.
    pub name: String,
    /// Display label. Consumers fall back to `name` when absent.
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_data: Option<BTreeMap<String, Value>>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl DataPoint {
    /// Label shown to end users: description, or name when there is none.
    pub fn label(&self) -> &str {
        match self.description.as_deref() {
            Some(d) if !d.is_empty() => d,
            _ => &self.name,
        }
    }
}

// ── Requests ────────────────────────────────────────────────────────

/// Body for `POST /data-points`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateDataPointRequest {
    pub data_type_id: EntityId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_data: Option<BTreeMap<String, Value>>,
}

/// Body for `PUT /data-points/{id}`. Only set fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateDataPointRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_data: Option<BTreeMap<String, Value>>,
}

impl UpdateDataPointRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.sort_order.is_none()
            && self.is_active.is_none()
            && self.extra_data.is_none()
    }
}

/// One entry of a bulk create.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewDataPoint {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_data: Option<BTreeMap<String, Value>>,
}

/// Body for `POST /data-points/bulk`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkCreateRequest {
    pub data_type_id: EntityId,
    pub data_points: Vec<NewDataPoint>,
}

/// Response of `POST /data-points/bulk`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkCreateResponse {
    pub created_count: u32,
    pub data_points: Vec<DataPoint>,
}

// ── Status ──────────────────────────────────────────────────────────

/// Per-type summary inside [`CatalogueStatus`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataTypeStatus {
    pub display_name: String,
    pub points_count: u32,
    pub is_active: bool,
}

/// Response of `GET /status`.
///
/// The server reports its own failures in-band (`status: "error"` plus an
/// `error` message) with HTTP 200, so every field besides `status` is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogueStatus {
    pub status: String,
    #[serde(default)]
    pub total_data_types: Option<u32>,
    #[serde(default)]
    pub total_data_points: Option<u32>,
    #[serde(default)]
    pub data_types: BTreeMap<String, DataTypeStatus>,
    #[serde(default)]
    pub error: Option<String>,
}

impl CatalogueStatus {
    pub fn is_operational(&self) -> bool {
        self.status == "operational"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn entity_id_from_uuid_string() {
        let id = EntityId::from("550e8400-e29b-41d4-a716-446655440000");
        assert!(id.as_uuid().is_some());
    }

    #[test]
    fn entity_id_from_opaque_string() {
        let id: EntityId = "fb-contact_methods-1".parse().unwrap();
        assert_eq!(id, EntityId::Opaque("fb-contact_methods-1".into()));
        assert_eq!(id.to_string(), "fb-contact_methods-1");
    }

    #[test]
    fn data_point_defaults_when_fields_missing() {
        let point: DataPoint = serde_json::from_value(json!({
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "data_type_id": "7",
            "name": "sms"
        }))
        .unwrap();

        assert_eq!(point.sort_order, 0);
        assert!(point.is_active);
        assert_eq!(point.label(), "sms");
        assert_eq!(point.data_type_id, EntityId::Opaque("7".into()));
    }

    #[test]
    fn label_prefers_description() {
        let point: DataPoint = serde_json::from_value(json!({
            "id": "1",
            "data_type_id": "7",
            "name": "sms",
            "description": "SMS/Text Message"
        }))
        .unwrap();
        assert_eq!(point.label(), "SMS/Text Message");
    }

    #[test]
    fn update_request_serializes_only_set_fields() {
        let req = UpdateDataPointRequest {
            is_active: Some(false),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&req).unwrap(), json!({ "is_active": false }));
        assert!(!req.is_empty());
        assert!(UpdateDataPointRequest::default().is_empty());
    }

    #[test]
    fn status_error_shape_parses() {
        let status: CatalogueStatus =
            serde_json::from_value(json!({ "status": "error", "error": "db down" })).unwrap();
        assert!(!status.is_operational());
        assert_eq!(status.error.as_deref(), Some("db down"));
        assert!(status.data_types.is_empty());
    }
}
