// ── Catalogue management console ──
//
// Two-pane administrative state: data types on the left, the points of
// the selected type on the right, with add / edit-in-place / delete.
//
// Every mutation is a command in three steps so that an event-loop UI can
// render the optimistic state while the request is in flight:
//
//   begin_*  -> apply locally, capture what is needed to undo
//   confirm  -> perform the remote call (borrows nothing from the console)
//   settle   -> adopt the server record, or undo and raise an alert
//
// New rows carry a client-side correlation id until the server answers;
// the server record replaces exactly that row.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::CoreError;
use crate::fallback;
use crate::model::{
    CreateDataPointRequest, DataPoint, DataType, EntityId, UpdateDataPointRequest, sort_by_order,
};
use crate::source::CatalogueSource;

// ── Rows ────────────────────────────────────────────────────────────

/// Stable key of a console row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RowKey {
    /// Known to the server.
    Persisted(EntityId),
    /// Created locally, awaiting the server's answer.
    Pending(Uuid),
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Persisted(id) => write!(f, "{id}"),
            Self::Pending(corr) => write!(f, "pending-{corr}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleRow {
    pub key: RowKey,
    pub point: DataPoint,
}

impl ConsoleRow {
    fn persisted(point: DataPoint) -> Self {
        Self {
            key: RowKey::Persisted(point.id.clone()),
            point,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.key, RowKey::Pending(_))
    }
}

// ── Drafts ──────────────────────────────────────────────────────────

/// The "add new option" form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointDraft {
    pub name: String,
    pub description: String,
    pub sort_order: i32,
}

/// In-place edit of one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    pub key: RowKey,
    pub name: String,
    pub description: String,
    pub sort_order: i32,
    pub is_active: bool,
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

// ── Commands ────────────────────────────────────────────────────────

/// Remote half of a mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Create {
        correlation: Uuid,
        request: CreateDataPointRequest,
    },
    Update {
        id: EntityId,
        request: UpdateDataPointRequest,
    },
    Delete {
        id: EntityId,
    },
}

#[derive(Debug, Clone)]
enum Undo {
    RemovePending(Uuid),
    Restore { index: usize, row: ConsoleRow },
}

/// A locally applied mutation awaiting confirmation.
#[derive(Debug, Clone)]
pub struct PendingMutation {
    generation: u64,
    mutation: Mutation,
    undo: Undo,
}

impl PendingMutation {
    pub fn mutation(&self) -> &Mutation {
        &self.mutation
    }

    pub fn verb(&self) -> &'static str {
        match self.mutation {
            Mutation::Create { .. } => "create",
            Mutation::Update { .. } => "update",
            Mutation::Delete { .. } => "delete",
        }
    }

    /// Perform the remote call. Returns the server record for creates and
    /// updates, `None` for deletes.
    pub async fn confirm<S: CatalogueSource>(
        &self,
        source: &S,
    ) -> Result<Option<DataPoint>, CoreError> {
        match &self.mutation {
            Mutation::Create { request, .. } => source.create_point(request).await.map(Some),
            Mutation::Update { id, request } => source.update_point(id, request).await.map(Some),
            Mutation::Delete { id } => source.delete_point(id).await.map(|()| None),
        }
    }
}

/// A point load for one selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    type_name: String,
}

impl LoadTicket {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub async fn fetch<S: CatalogueSource>(&self, source: &S) -> Result<Vec<DataPoint>, CoreError> {
        source.list_all_points(&self.type_name).await
    }
}

// ── Console ─────────────────────────────────────────────────────────

pub struct CatalogueConsole<S: CatalogueSource> {
    source: Arc<S>,
    types: Vec<DataType>,
    types_degraded: bool,
    selected: Option<String>,
    /// Bumped on every selection; stale loads and settles are ignored.
    generation: u64,
    rows: Vec<ConsoleRow>,
    loading: bool,
    draft: PointDraft,
    editing: Option<EditDraft>,
    pending_delete: Option<RowKey>,
    /// Rows removed by a delete that has not failed. A rollback of any
    /// other mutation must not bring them back.
    removed: HashSet<RowKey>,
    alert: Option<String>,
    in_flight: usize,
}

impl<S: CatalogueSource> CatalogueConsole<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            types: Vec::new(),
            types_degraded: false,
            selected: None,
            generation: 0,
            rows: Vec::new(),
            loading: false,
            draft: PointDraft::default(),
            editing: None,
            pending_delete: None,
            removed: HashSet::new(),
            alert: None,
            in_flight: 0,
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    pub fn types(&self) -> &[DataType] {
        &self.types
    }

    /// Types came from the fallback snapshot, not the service.
    pub fn types_degraded(&self) -> bool {
        self.types_degraded
    }

    pub fn selected_name(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_type(&self) -> Option<&DataType> {
        let name = self.selected.as_deref()?;
        self.types.iter().find(|t| t.name == name)
    }

    pub fn rows(&self) -> &[ConsoleRow] {
        &self.rows
    }

    pub fn row(&self, key: &RowKey) -> Option<&ConsoleRow> {
        self.rows.iter().find(|r| &r.key == key)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn draft(&self) -> &PointDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut PointDraft {
        &mut self.draft
    }

    pub fn editing(&self) -> Option<&EditDraft> {
        self.editing.as_ref()
    }

    pub fn editing_mut(&mut self) -> Option<&mut EditDraft> {
        self.editing.as_mut()
    }

    pub fn pending_delete(&self) -> Option<&RowKey> {
        self.pending_delete.as_ref()
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn set_alert(&mut self, message: impl Into<String>) {
        self.alert = Some(message.into());
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Mutations applied locally but not yet settled.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    fn fail<T>(&mut self, err: CoreError) -> Result<T, CoreError> {
        self.alert = Some(err.user_message());
        Err(err)
    }

    // ── Data types ───────────────────────────────────────────────────

    pub async fn load_types(&mut self) {
        let result = self.source.list_types().await;
        self.apply_types(result);
    }

    /// Adopt a `list_types` result. On failure the fallback snapshot's
    /// types are listed so the console still has something to browse.
    pub fn apply_types(&mut self, result: Result<Vec<DataType>, CoreError>) {
        match result {
            Ok(types) => {
                debug!(count = types.len(), "console: data types loaded");
                self.types = types;
                self.types_degraded = false;
            }
            Err(e) => {
                warn!(error = %e, "console: data types unavailable, listing fallback types");
                self.types = fallback::data_types();
                self.types_degraded = true;
                self.alert = Some(format!("Failed to load data types: {}", e.user_message()));
            }
        }
    }

    // ── Selection ────────────────────────────────────────────────────

    /// Select a type and clear the right pane. Fetch with the returned
    /// ticket and hand the result to [`finish_select`](Self::finish_select).
    pub fn begin_select(&mut self, type_name: impl Into<String>) -> LoadTicket {
        let type_name = type_name.into();
        self.generation += 1;
        self.selected = Some(type_name.clone());
        self.rows.clear();
        self.loading = true;
        self.editing = None;
        self.pending_delete = None;
        self.removed.clear();
        LoadTicket {
            generation: self.generation,
            type_name,
        }
    }

    /// Apply a point load. Returns `false` when the ticket was superseded
    /// by a later selection and the result was discarded.
    pub fn finish_select(
        &mut self,
        ticket: &LoadTicket,
        result: Result<Vec<DataPoint>, CoreError>,
    ) -> bool {
        if ticket.generation != self.generation {
            debug!(type_name = ticket.type_name, "console: discarding stale point load");
            return false;
        }
        self.loading = false;
        match result {
            Ok(mut points) => {
                sort_by_order(&mut points);
                self.rows = points.into_iter().map(ConsoleRow::persisted).collect();
            }
            Err(e) => {
                warn!(type_name = ticket.type_name, error = %e, "console: failed to load points");
                self.rows.clear();
                self.alert = Some(format!("Failed to load data points: {}", e.user_message()));
            }
        }
        true
    }

    pub async fn select_type(&mut self, type_name: impl Into<String>) {
        let ticket = self.begin_select(type_name);
        let result = ticket.fetch(self.source.as_ref()).await;
        self.finish_select(&ticket, result);
    }

    /// Reload the points of the current selection.
    pub async fn reload(&mut self) {
        if let Some(name) = self.selected.clone() {
            self.select_type(name).await;
        }
    }

    // ── Add ──────────────────────────────────────────────────────────

    pub fn begin_add(&mut self) -> Result<PendingMutation, CoreError> {
        let Some(data_type) = self.selected_type().cloned() else {
            return self.fail(CoreError::validation("Select a data type first"));
        };
        let Some(name) = non_empty(&self.draft.name) else {
            return self.fail(CoreError::validation("Name is required"));
        };
        if self.rows.iter().any(|r| r.point.name == name) {
            return self.fail(CoreError::validation(format!(
                "A data point named '{name}' already exists"
            )));
        }

        let correlation = Uuid::new_v4();
        let description = non_empty(&self.draft.description);
        let sort_order = self.draft.sort_order;

        self.rows.push(ConsoleRow {
            key: RowKey::Pending(correlation),
            point: DataPoint {
                id: EntityId::Opaque(format!("pending-{correlation}")),
                data_type_id: data_type.id.clone(),
                name: name.clone(),
                description: description.clone(),
                sort_order,
                is_active: true,
                extra_data: None,
                created_at: None,
                updated_at: None,
            },
        });
        self.draft = PointDraft::default();
        self.in_flight += 1;

        Ok(PendingMutation {
            generation: self.generation,
            mutation: Mutation::Create {
                correlation,
                request: CreateDataPointRequest {
                    data_type_id: data_type.id,
                    name,
                    description,
                    sort_order,
                    is_active: true,
                    extra_data: None,
                },
            },
            undo: Undo::RemovePending(correlation),
        })
    }

    pub async fn add_point(&mut self) -> Result<(), CoreError> {
        let pending = self.begin_add()?;
        self.run(pending).await
    }

    // ── Edit ─────────────────────────────────────────────────────────

    pub fn begin_edit(&mut self, key: &RowKey) -> Result<(), CoreError> {
        let Some(row) = self.row(key) else {
            return self.fail(CoreError::NotFound {
                message: "Data point not found".into(),
            });
        };
        if row.is_pending() {
            return self.fail(CoreError::validation(
                "This data point is still being saved",
            ));
        }
        self.editing = Some(EditDraft {
            key: key.clone(),
            name: row.point.name.clone(),
            description: row.point.description.clone().unwrap_or_default(),
            sort_order: row.point.sort_order,
            is_active: row.point.is_active,
        });
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Apply the edit draft locally. `Ok(None)` when nothing changed.
    pub fn begin_save_edit(&mut self) -> Result<Option<PendingMutation>, CoreError> {
        let Some(draft) = self.editing.clone() else {
            return Ok(None);
        };
        let RowKey::Persisted(id) = draft.key.clone() else {
            return self.fail(CoreError::validation(
                "This data point is still being saved",
            ));
        };
        let Some(index) = self.rows.iter().position(|r| r.key == draft.key) else {
            self.editing = None;
            return self.fail(CoreError::NotFound {
                message: "Data point not found".into(),
            });
        };
        let Some(name) = non_empty(&draft.name) else {
            return self.fail(CoreError::validation("Name is required"));
        };
        if self
            .rows
            .iter()
            .any(|r| r.key != draft.key && r.point.name == name)
        {
            return self.fail(CoreError::validation(format!(
                "A data point named '{name}' already exists"
            )));
        }

        let before = self.rows[index].clone();
        let description = non_empty(&draft.description);
        let request = UpdateDataPointRequest {
            name: (name != before.point.name).then(|| name.clone()),
            description: (description != before.point.description)
                .then(|| description.clone().unwrap_or_default()),
            sort_order: (draft.sort_order != before.point.sort_order).then_some(draft.sort_order),
            is_active: (draft.is_active != before.point.is_active).then_some(draft.is_active),
            extra_data: None,
        };
        self.editing = None;
        if request.is_empty() {
            return Ok(None);
        }

        let point = &mut self.rows[index].point;
        point.name = name;
        point.description = description;
        point.sort_order = draft.sort_order;
        point.is_active = draft.is_active;
        self.in_flight += 1;

        Ok(Some(PendingMutation {
            generation: self.generation,
            mutation: Mutation::Update { id, request },
            undo: Undo::Restore { index, row: before },
        }))
    }

    pub async fn save_edit(&mut self) -> Result<(), CoreError> {
        match self.begin_save_edit()? {
            Some(pending) => self.run(pending).await,
            None => Ok(()),
        }
    }

    /// Flip the active flag of one row.
    pub fn begin_toggle_active(&mut self, key: &RowKey) -> Result<PendingMutation, CoreError> {
        let Some(index) = self.rows.iter().position(|r| &r.key == key) else {
            return self.fail(CoreError::NotFound {
                message: "Data point not found".into(),
            });
        };
        let RowKey::Persisted(id) = key.clone() else {
            return self.fail(CoreError::validation(
                "This data point is still being saved",
            ));
        };

        let before = self.rows[index].clone();
        let is_active = !before.point.is_active;
        self.rows[index].point.is_active = is_active;
        self.in_flight += 1;

        Ok(PendingMutation {
            generation: self.generation,
            mutation: Mutation::Update {
                id,
                request: UpdateDataPointRequest {
                    is_active: Some(is_active),
                    ..UpdateDataPointRequest::default()
                },
            },
            undo: Undo::Restore { index, row: before },
        })
    }

    pub async fn toggle_active(&mut self, key: &RowKey) -> Result<(), CoreError> {
        let pending = self.begin_toggle_active(key)?;
        self.run(pending).await
    }

    // ── Delete ───────────────────────────────────────────────────────

    /// Arm the delete confirmation for one row.
    pub fn request_delete(&mut self, key: &RowKey) -> bool {
        if self.row(key).is_none() {
            return false;
        }
        self.pending_delete = Some(key.clone());
        true
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Remove the armed row locally. `Ok(None)` when nothing is armed.
    pub fn begin_confirm_delete(&mut self) -> Result<Option<PendingMutation>, CoreError> {
        let Some(key) = self.pending_delete.take() else {
            return Ok(None);
        };
        let Some(index) = self.rows.iter().position(|r| r.key == key) else {
            return Ok(None);
        };
        let RowKey::Persisted(id) = key else {
            return self.fail(CoreError::validation(
                "This data point is still being saved",
            ));
        };

        let row = self.rows.remove(index);
        self.removed.insert(row.key.clone());
        if self.editing.as_ref().is_some_and(|e| e.key == row.key) {
            self.editing = None;
        }
        self.in_flight += 1;

        Ok(Some(PendingMutation {
            generation: self.generation,
            mutation: Mutation::Delete { id },
            undo: Undo::Restore { index, row },
        }))
    }

    pub async fn confirm_delete(&mut self) -> Result<(), CoreError> {
        match self.begin_confirm_delete()? {
            Some(pending) => self.run(pending).await,
            None => Ok(()),
        }
    }

    // ── Settlement ───────────────────────────────────────────────────

    /// Adopt the outcome of a confirmed mutation.
    pub fn settle(&mut self, pending: PendingMutation, result: Result<Option<DataPoint>, CoreError>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let verb = pending.verb();

        let err = match result {
            Ok(record) => {
                info!(verb, "console: data point {verb}d");
                if pending.generation == self.generation {
                    self.adopt(&pending.mutation, record);
                }
                return;
            }
            Err(e) => e,
        };

        warn!(verb, error = %err, "console: mutation failed, reverting");
        if pending.generation == self.generation {
            match pending.undo {
                Undo::RemovePending(correlation) => {
                    self.rows.retain(|r| r.key != RowKey::Pending(correlation));
                }
                Undo::Restore { index, row } => {
                    if matches!(pending.mutation, Mutation::Delete { .. }) {
                        self.removed.remove(&row.key);
                    }
                    if self.removed.contains(&row.key) {
                        debug!(key = %row.key, "console: row was deleted, not restoring");
                    } else if let Some(existing) = self.rows.iter_mut().find(|r| r.key == row.key) {
                        *existing = row;
                    } else {
                        let index = index.min(self.rows.len());
                        self.rows.insert(index, row);
                    }
                }
            }
        }
        self.alert = Some(format!(
            "Failed to {verb} data point: {}",
            err.user_message()
        ));
    }

    fn adopt(&mut self, mutation: &Mutation, record: Option<DataPoint>) {
        let key = match mutation {
            Mutation::Create { correlation, .. } => RowKey::Pending(*correlation),
            Mutation::Update { id, .. } => RowKey::Persisted(id.clone()),
            Mutation::Delete { id } => {
                let key = RowKey::Persisted(id.clone());
                self.rows.retain(|r| r.key != key);
                return;
            }
        };
        let Some(point) = record else {
            return;
        };
        if self.removed.contains(&key) {
            return;
        }
        if let Some(row) = self.rows.iter_mut().find(|r| r.key == key) {
            *row = ConsoleRow::persisted(point);
        }
    }

    async fn run(&mut self, pending: PendingMutation) -> Result<(), CoreError> {
        let result = pending.confirm(self.source.as_ref()).await;
        let outcome = match &result {
            Ok(_) => Ok(()),
            Err(e) => Err(e.clone()),
        };
        self.settle(pending, result);
        outcome
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{StubSource, point};
    use pretty_assertions::assert_eq;

    async fn console_with(source: StubSource, type_name: &str) -> CatalogueConsole<StubSource> {
        let mut console = CatalogueConsole::new(Arc::new(source));
        console.load_types().await;
        console.select_type(type_name).await;
        console
    }

    fn names(console: &CatalogueConsole<StubSource>) -> Vec<&str> {
        console.rows().iter().map(|r| r.point.name.as_str()).collect()
    }

    #[tokio::test]
    async fn add_then_delete_round_trip() {
        let mut console =
            console_with(StubSource::default().with_points("contact_methods", &[]), "contact_methods")
                .await;
        assert!(console.rows().is_empty());

        console.draft_mut().name = "foo".into();
        console.draft_mut().description = "Foo".into();
        console.add_point().await.unwrap();

        assert_eq!(console.rows().len(), 1);
        let row = &console.rows()[0];
        assert_eq!(row.point.name, "foo");
        assert_eq!(row.point.description.as_deref(), Some("Foo"));
        assert!(row.point.is_active);
        assert_eq!(row.key, RowKey::Persisted(EntityId::Opaque("srv-1".into())));
        assert_eq!(console.draft(), &PointDraft::default());

        let key = row.key.clone();
        assert!(console.request_delete(&key));
        console.confirm_delete().await.unwrap();

        assert!(console.rows().is_empty());
        assert!(console.source().stored("contact_methods").is_empty());
        assert!(console.alert().is_none());
    }

    #[tokio::test]
    async fn optimistic_row_is_visible_before_confirmation() {
        let mut console =
            console_with(StubSource::default().with_points("risk_levels", &["low"]), "risk_levels")
                .await;
        console.draft_mut().name = "extreme".into();
        console.draft_mut().sort_order = 9;

        let pending = console.begin_add().unwrap();
        assert_eq!(console.in_flight(), 1);
        let row = console.rows().last().unwrap();
        assert!(row.is_pending());
        assert_eq!(row.point.sort_order, 9);

        let result = pending.confirm(console.source().as_ref()).await;
        console.settle(pending, result);
        assert_eq!(console.in_flight(), 0);
        assert!(!console.rows().last().unwrap().is_pending());
    }

    #[tokio::test]
    async fn failed_create_rolls_back_with_alert() {
        let source = StubSource::default()
            .with_points("risk_levels", &["low"])
            .failing("create");
        let mut console = console_with(source, "risk_levels").await;
        console.draft_mut().name = "extreme".into();

        let err = console.add_point().await.unwrap_err();
        assert!(matches!(err, CoreError::Rejected { .. }));
        assert_eq!(names(&console), ["low"]);
        assert_eq!(
            console.alert(),
            Some("Failed to create data point: create exploded")
        );
    }

    #[tokio::test]
    async fn add_validates_locally() {
        let mut console =
            console_with(StubSource::default().with_points("risk_levels", &["low"]), "risk_levels")
                .await;

        console.draft_mut().name = "   ".into();
        assert!(matches!(
            console.begin_add(),
            Err(CoreError::ValidationFailed { .. })
        ));
        assert_eq!(console.alert(), Some("Name is required"));

        console.draft_mut().name = "low".into();
        assert!(console.begin_add().is_err());
        assert_eq!(console.rows().len(), 1);
        assert_eq!(console.source().calls("create"), 0);
    }

    #[tokio::test]
    async fn edit_sends_only_changed_fields() {
        let mut console =
            console_with(StubSource::default().with_points("risk_levels", &["low"]), "risk_levels")
                .await;
        let key = console.rows()[0].key.clone();

        console.begin_edit(&key).unwrap();
        console.editing_mut().unwrap().description = "Minimal".into();
        let pending = console.begin_save_edit().unwrap().unwrap();

        match pending.mutation() {
            Mutation::Update { request, .. } => {
                assert_eq!(
                    request,
                    &UpdateDataPointRequest {
                        description: Some("Minimal".into()),
                        ..UpdateDataPointRequest::default()
                    }
                );
            }
            other => panic!("expected update, got {other:?}"),
        }
        assert_eq!(console.rows()[0].point.label(), "Minimal");
        assert!(console.editing().is_none());

        let result = pending.confirm(console.source().as_ref()).await;
        console.settle(pending, result);
        assert_eq!(
            console.source().stored("risk_levels")[0].description.as_deref(),
            Some("Minimal")
        );
    }

    #[tokio::test]
    async fn unchanged_edit_is_a_no_op() {
        let mut console =
            console_with(StubSource::default().with_points("risk_levels", &["low"]), "risk_levels")
                .await;
        let key = console.rows()[0].key.clone();
        console.begin_edit(&key).unwrap();
        assert!(console.begin_save_edit().unwrap().is_none());
        assert_eq!(console.source().calls("update"), 0);
    }

    #[tokio::test]
    async fn failed_update_restores_row() {
        let source = StubSource::default()
            .with_points("risk_levels", &["low", "high"])
            .failing("update");
        let mut console = console_with(source, "risk_levels").await;
        let key = console.rows()[1].key.clone();

        console.toggle_active(&key).await.unwrap_err();
        assert!(console.rows()[1].point.is_active);
        assert_eq!(
            console.alert(),
            Some("Failed to update data point: update exploded")
        );
    }

    #[tokio::test]
    async fn failed_delete_reinserts_at_original_position() {
        let source = StubSource::default()
            .with_points("risk_levels", &["low", "medium", "high"])
            .failing("delete");
        let mut console = console_with(source, "risk_levels").await;
        let key = console.rows()[1].key.clone();

        console.request_delete(&key);
        console.confirm_delete().await.unwrap_err();
        assert_eq!(names(&console), ["low", "medium", "high"]);
        assert!(console.pending_delete().is_none());
    }

    #[tokio::test]
    async fn failed_update_after_delete_does_not_resurrect_row() {
        let source = Arc::new(StubSource::default().with_points("risk_levels", &["low", "high"]));
        let mut console = CatalogueConsole::new(Arc::clone(&source));
        console.load_types().await;
        console.select_type("risk_levels").await;
        let key = console.rows()[1].key.clone();

        let toggle = console.begin_toggle_active(&key).unwrap();
        assert!(console.request_delete(&key));
        let delete = console.begin_confirm_delete().unwrap().unwrap();
        let deleted = delete.confirm(source.as_ref()).await;
        console.settle(delete, deleted);

        source.set_failing("update", true);
        let toggled = toggle.confirm(source.as_ref()).await;
        assert!(toggled.is_err());
        console.settle(toggle, toggled);

        assert_eq!(names(&console), ["low"]);
        let stored: Vec<_> = source.stored("risk_levels").into_iter().map(|p| p.name).collect();
        assert_eq!(stored, ["low"]);
        assert_eq!(
            console.alert(),
            Some("Failed to update data point: update exploded")
        );
    }

    #[tokio::test]
    async fn failed_update_while_delete_in_flight_keeps_row_hidden() {
        let source = Arc::new(
            StubSource::default()
                .with_points("risk_levels", &["low", "high"])
                .failing("update"),
        );
        let mut console = CatalogueConsole::new(Arc::clone(&source));
        console.load_types().await;
        console.select_type("risk_levels").await;
        let key = console.rows()[1].key.clone();

        let toggle = console.begin_toggle_active(&key).unwrap();
        assert!(console.request_delete(&key));
        let delete = console.begin_confirm_delete().unwrap().unwrap();

        let toggled = toggle.confirm(source.as_ref()).await;
        console.settle(toggle, toggled);
        assert_eq!(names(&console), ["low"]);

        let deleted = delete.confirm(source.as_ref()).await;
        console.settle(delete, deleted);
        assert_eq!(names(&console), ["low"]);
        assert_eq!(console.in_flight(), 0);
    }

    #[tokio::test]
    async fn failed_delete_after_failed_update_restores_row_once() {
        let source = Arc::new(
            StubSource::default()
                .with_points("risk_levels", &["low", "high"])
                .failing("update")
                .failing("delete"),
        );
        let mut console = CatalogueConsole::new(Arc::clone(&source));
        console.load_types().await;
        console.select_type("risk_levels").await;
        let key = console.rows()[1].key.clone();

        let toggle = console.begin_toggle_active(&key).unwrap();
        assert!(console.request_delete(&key));
        let delete = console.begin_confirm_delete().unwrap().unwrap();

        let toggled = toggle.confirm(source.as_ref()).await;
        console.settle(toggle, toggled);
        let deleted = delete.confirm(source.as_ref()).await;
        console.settle(delete, deleted);

        assert_eq!(names(&console), ["low", "high"]);
    }

    #[tokio::test]
    async fn cancelled_delete_keeps_row() {
        let mut console =
            console_with(StubSource::default().with_points("risk_levels", &["low"]), "risk_levels")
                .await;
        let key = console.rows()[0].key.clone();
        console.request_delete(&key);
        console.cancel_delete();
        console.confirm_delete().await.unwrap();
        assert_eq!(names(&console), ["low"]);
        assert_eq!(console.source().calls("delete"), 0);
    }

    #[tokio::test]
    async fn inactive_points_are_listed_and_sorted() {
        let source = StubSource::default().with_raw_points(
            "plan_types",
            vec![
                point("plan_types", "agency-managed", 3, true),
                point("plan_types", "legacy", 1, false),
                point("plan_types", "self-managed", 2, true),
            ],
        );
        let console = console_with(source, "plan_types").await;
        assert_eq!(names(&console), ["legacy", "self-managed", "agency-managed"]);
        assert!(!console.rows()[0].point.is_active);
    }

    #[tokio::test]
    async fn stale_load_is_discarded() {
        let source = StubSource::default()
            .with_points("a", &["from_a"])
            .with_points("b", &["from_b"]);
        let mut console = CatalogueConsole::new(Arc::new(source));
        console.load_types().await;

        let first = console.begin_select("a");
        let second = console.begin_select("b");
        let b = second.fetch(console.source().as_ref()).await;
        assert!(console.finish_select(&second, b));
        let a = first.fetch(console.source().as_ref()).await;
        assert!(!console.finish_select(&first, a));

        assert_eq!(console.selected_name(), Some("b"));
        assert_eq!(names(&console), ["from_b"]);
    }

    #[tokio::test]
    async fn types_fall_back_when_unreachable() {
        let source = StubSource::default().failing("types");
        let mut console = CatalogueConsole::new(Arc::new(source));
        console.load_types().await;

        assert!(console.types_degraded());
        assert_eq!(console.types(), fallback::data_types().as_slice());
        assert_eq!(
            console.alert(),
            Some("Failed to load data types: Catalogue service is offline or unreachable")
        );
        console.dismiss_alert();
        assert!(console.alert().is_none());
    }

    #[tokio::test]
    async fn settle_after_reselect_only_alerts() {
        let source = StubSource::default()
            .with_points("a", &["x"])
            .with_points("b", &["y"])
            .failing("create");
        let mut console = console_with(source, "a").await;
        console.draft_mut().name = "z".into();
        let pending = console.begin_add().unwrap();

        console.select_type("b").await;
        let result = pending.confirm(console.source().as_ref()).await;
        console.settle(pending, result);

        assert_eq!(names(&console), ["y"]);
        assert!(console.alert().is_some());
    }
}
