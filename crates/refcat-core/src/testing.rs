// In-memory catalogue used by the unit tests of the retrieval hook,
// choice controls and console.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::error::CoreError;
use crate::model::{
    CreateDataPointRequest, DataPoint, DataType, EntityId, UpdateDataPointRequest,
};
use crate::source::CatalogueSource;

#[derive(Default)]
pub(crate) struct StubSource {
    types: Mutex<Vec<DataType>>,
    points: Mutex<HashMap<String, Vec<DataPoint>>>,
    failing: Mutex<Vec<String>>,
    delays: HashMap<String, Duration>,
    calls: Mutex<HashMap<String, usize>>,
    next_id: AtomicU64,
}

pub(crate) fn point(type_name: &str, name: &str, sort_order: i32, active: bool) -> DataPoint {
    DataPoint {
        id: EntityId::Opaque(format!("{type_name}:{name}")),
        data_type_id: type_id(type_name),
        name: name.into(),
        description: Some(capitalize(name)),
        sort_order,
        is_active: active,
        extra_data: None,
        created_at: None,
        updated_at: None,
    }
}

fn type_id(type_name: &str) -> EntityId {
    EntityId::Opaque(format!("type-{type_name}"))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |c| {
        c.to_uppercase().chain(chars).collect()
    })
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

impl StubSource {
    /// Register a type with active points in the given order.
    pub(crate) fn with_points(self, type_name: &str, names: &[&str]) -> Self {
        let points = names
            .iter()
            .zip(1..)
            .map(|(name, order)| point(type_name, name, order, true))
            .collect();
        self.with_raw_points(type_name, points)
    }

    pub(crate) fn with_raw_points(self, type_name: &str, points: Vec<DataPoint>) -> Self {
        lock(&self.types).push(DataType {
            id: type_id(type_name),
            name: type_name.into(),
            display_name: capitalize(&type_name.replace('_', " ")),
            description: None,
            is_active: true,
            created_at: None,
            updated_at: None,
            data_points_count: None,
        });
        lock(&self.points).insert(type_name.into(), points);
        self
    }

    /// Fail every call keyed by `key`: a type name, or one of
    /// `types`, `create`, `update`, `delete`.
    pub(crate) fn failing(self, key: &str) -> Self {
        lock(&self.failing).push(key.into());
        self
    }

    pub(crate) fn with_delay(mut self, type_name: &str, delay: Duration) -> Self {
        self.delays.insert(type_name.into(), delay);
        self
    }

    pub(crate) fn set_failing(&self, key: &str, fail: bool) {
        let mut failing = lock(&self.failing);
        failing.retain(|k| k != key);
        if fail {
            failing.push(key.into());
        }
    }

    pub(crate) fn calls(&self, key: &str) -> usize {
        lock(&self.calls).get(key).copied().unwrap_or(0)
    }

    pub(crate) fn stored(&self, type_name: &str) -> Vec<DataPoint> {
        lock(&self.points).get(type_name).cloned().unwrap_or_default()
    }

    fn record(&self, key: &str) {
        *lock(&self.calls).entry(key.into()).or_default() += 1;
    }

    fn check(&self, key: &str) -> Result<(), CoreError> {
        if lock(&self.failing).iter().any(|k| k == key) {
            return Err(match key {
                "create" | "update" | "delete" => CoreError::Rejected {
                    status: 500,
                    message: format!("{key} exploded"),
                },
                _ => CoreError::Unreachable {
                    url: "http://stub".into(),
                    reason: "connection refused".into(),
                },
            });
        }
        Ok(())
    }

    async fn wait(&self, type_name: &str) {
        if let Some(delay) = self.delays.get(type_name) {
            tokio::time::sleep(*delay).await;
        }
    }

    fn type_name_for(&self, id: &EntityId) -> Option<String> {
        lock(&self.types)
            .iter()
            .find(|t| &t.id == id)
            .map(|t| t.name.clone())
    }
}

impl CatalogueSource for StubSource {
    async fn list_types(&self) -> Result<Vec<DataType>, CoreError> {
        self.record("types");
        self.check("types")?;
        Ok(lock(&self.types).clone())
    }

    async fn list_points(&self, type_name: &str) -> Result<Vec<DataPoint>, CoreError> {
        self.record(type_name);
        self.wait(type_name).await;
        self.check(type_name)?;
        Ok(self.stored(type_name))
    }

    async fn list_all_points(&self, type_name: &str) -> Result<Vec<DataPoint>, CoreError> {
        self.record(type_name);
        self.wait(type_name).await;
        self.check(type_name)?;
        Ok(self.stored(type_name))
    }

    async fn create_point(&self, req: &CreateDataPointRequest) -> Result<DataPoint, CoreError> {
        self.record("create");
        self.check("create")?;
        let type_name = self
            .type_name_for(&req.data_type_id)
            .ok_or_else(|| CoreError::NotFound {
                message: "Data type not found".into(),
            })?;
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let created = DataPoint {
            id: EntityId::Opaque(format!("srv-{n}")),
            data_type_id: req.data_type_id.clone(),
            name: req.name.clone(),
            description: req.description.clone(),
            sort_order: req.sort_order,
            is_active: req.is_active,
            extra_data: None,
            created_at: Some("2025-03-01T09:30:00+00:00".into()),
            updated_at: Some("2025-03-01T09:30:00+00:00".into()),
        };
        lock(&self.points)
            .entry(type_name)
            .or_default()
            .push(created.clone());
        Ok(created)
    }

    async fn update_point(
        &self,
        id: &EntityId,
        req: &UpdateDataPointRequest,
    ) -> Result<DataPoint, CoreError> {
        self.record("update");
        self.check("update")?;
        let mut points = lock(&self.points);
        let point = points
            .values_mut()
            .flat_map(|v| v.iter_mut())
            .find(|p| &p.id == id)
            .ok_or_else(|| CoreError::NotFound {
                message: "Data point not found".into(),
            })?;
        if let Some(name) = &req.name {
            point.name.clone_from(name);
        }
        if let Some(description) = &req.description {
            point.description = Some(description.clone());
        }
        if let Some(order) = req.sort_order {
            point.sort_order = order;
        }
        if let Some(active) = req.is_active {
            point.is_active = active;
        }
        Ok(point.clone())
    }

    async fn delete_point(&self, id: &EntityId) -> Result<(), CoreError> {
        self.record("delete");
        self.check("delete")?;
        for list in lock(&self.points).values_mut() {
            list.retain(|p| &p.id != id);
        }
        Ok(())
    }
}
