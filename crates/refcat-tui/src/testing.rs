// In-memory catalogue for screen tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use refcat_core::{
    CatalogueSource, CoreError, CreateDataPointRequest, DataPoint, DataType, EntityId,
    UpdateDataPointRequest,
};

#[derive(Default)]
pub struct MemorySource {
    types: Vec<DataType>,
    points: Mutex<HashMap<String, Vec<DataPoint>>>,
    offline: AtomicBool,
    next_id: AtomicU64,
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

pub fn point(type_name: &str, name: &str, sort_order: i32) -> DataPoint {
    DataPoint {
        id: EntityId::Opaque(format!("{type_name}:{name}")),
        data_type_id: EntityId::Opaque(format!("type-{type_name}")),
        name: name.into(),
        description: None,
        sort_order,
        is_active: true,
        extra_data: None,
        created_at: None,
        updated_at: None,
    }
}

impl MemorySource {
    pub fn with_type(mut self, type_name: &str, names: &[&str]) -> Self {
        self.types.push(DataType {
            id: EntityId::Opaque(format!("type-{type_name}")),
            name: type_name.into(),
            display_name: type_name.replace('_', " "),
            description: None,
            is_active: true,
            created_at: None,
            updated_at: None,
            data_points_count: None,
        });
        let points = names
            .iter()
            .zip(1..)
            .map(|(name, order)| point(type_name, name, order))
            .collect();
        lock(&self.points).insert(type_name.into(), points);
        self
    }

    pub fn offline() -> Self {
        let source = Self::default();
        source.offline.store(true, Ordering::SeqCst);
        source
    }

    fn check(&self) -> Result<(), CoreError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(CoreError::Unreachable {
                url: "memory://catalogue".into(),
                reason: "connection refused".into(),
            });
        }
        Ok(())
    }
}

impl CatalogueSource for MemorySource {
    async fn list_types(&self) -> Result<Vec<DataType>, CoreError> {
        self.check()?;
        Ok(self.types.clone())
    }

    async fn list_points(&self, type_name: &str) -> Result<Vec<DataPoint>, CoreError> {
        let all = self.list_all_points(type_name).await?;
        Ok(all.into_iter().filter(|p| p.is_active).collect())
    }

    async fn list_all_points(&self, type_name: &str) -> Result<Vec<DataPoint>, CoreError> {
        self.check()?;
        Ok(lock(&self.points).get(type_name).cloned().unwrap_or_default())
    }

    async fn create_point(&self, req: &CreateDataPointRequest) -> Result<DataPoint, CoreError> {
        self.check()?;
        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let point = DataPoint {
            id: EntityId::Opaque(format!("srv-{n}")),
            data_type_id: req.data_type_id.clone(),
            name: req.name.clone(),
            description: req.description.clone(),
            sort_order: req.sort_order,
            is_active: req.is_active,
            extra_data: None,
            created_at: None,
            updated_at: None,
        };
        let type_name = self
            .types
            .iter()
            .find(|t| t.id == req.data_type_id)
            .map(|t| t.name.clone())
            .unwrap_or_default();
        lock(&self.points)
            .entry(type_name)
            .or_default()
            .push(point.clone());
        Ok(point)
    }

    async fn update_point(
        &self,
        id: &EntityId,
        req: &UpdateDataPointRequest,
    ) -> Result<DataPoint, CoreError> {
        self.check()?;
        let mut points = lock(&self.points);
        let point = points
            .values_mut()
            .flat_map(|v| v.iter_mut())
            .find(|p| &p.id == id)
            .ok_or_else(|| CoreError::NotFound {
                message: format!("Data point {id} not found"),
            })?;
        if let Some(ref name) = req.name {
            point.name.clone_from(name);
        }
        if let Some(ref description) = req.description {
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
        self.check()?;
        for points in lock(&self.points).values_mut() {
            points.retain(|p| &p.id != id);
        }
        Ok(())
    }
}
