// ── Domain model ──
//
// The wire types from refcat-api are already the canonical shapes, so they
// are re-exported as-is. This module adds the ordering and display helpers
// shared by every consumer.

use chrono::{DateTime, NaiveDateTime, Utc};

pub use refcat_api::{
    CatalogueStatus, CreateDataPointRequest, DataPoint, DataType, DataTypeWithPoints, EntityId,
    UpdateDataPointRequest,
};

/// Keep active points only, in their existing order.
pub fn active_only(points: impl IntoIterator<Item = DataPoint>) -> Vec<DataPoint> {
    points.into_iter().filter(|p| p.is_active).collect()
}

/// Sort by `sort_order` ascending. Stable, so ties keep insertion order.
pub fn sort_by_order(points: &mut [DataPoint]) {
    points.sort_by_key(|p| p.sort_order);
}

/// Parse a server timestamp. Accepts RFC 3339 and offset-less ISO 8601
/// (treated as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Render a server timestamp as `YYYY-MM-DD HH:MM`, or `-` when absent or
/// unparseable.
pub fn display_timestamp(raw: Option<&str>) -> String {
    raw.and_then(parse_timestamp)
        .map_or_else(|| "-".into(), |dt| dt.format("%Y-%m-%d %H:%M").to_string())
}
