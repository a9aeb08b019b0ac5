// ── Catalogue source abstraction ──
//
// The retrieval hook, choice controls and console only need these six
// operations. `CatalogueClient` is the production implementation; tests
// drive the same state machines with in-memory sources.

use std::future::Future;

use refcat_api::{
    CatalogueClient, CreateDataPointRequest, DataPoint, DataType, EntityId, UpdateDataPointRequest,
};

use crate::error::CoreError;

/// Read/write access to the reference-data catalogue.
pub trait CatalogueSource: Send + Sync + 'static {
    /// Active data types.
    fn list_types(&self) -> impl Future<Output = Result<Vec<DataType>, CoreError>> + Send;

    /// Active points of one type. Unknown names yield an empty list.
    fn list_points(
        &self,
        type_name: &str,
    ) -> impl Future<Output = Result<Vec<DataPoint>, CoreError>> + Send;

    /// Every point of one type, inactive ones included.
    fn list_all_points(
        &self,
        type_name: &str,
    ) -> impl Future<Output = Result<Vec<DataPoint>, CoreError>> + Send;

    fn create_point(
        &self,
        req: &CreateDataPointRequest,
    ) -> impl Future<Output = Result<DataPoint, CoreError>> + Send;

    fn update_point(
        &self,
        id: &EntityId,
        req: &UpdateDataPointRequest,
    ) -> impl Future<Output = Result<DataPoint, CoreError>> + Send;

    fn delete_point(&self, id: &EntityId) -> impl Future<Output = Result<(), CoreError>> + Send;
}

impl CatalogueSource for CatalogueClient {
    async fn list_types(&self) -> Result<Vec<DataType>, CoreError> {
        Ok(CatalogueClient::list_types(self).await?)
    }

    async fn list_points(&self, type_name: &str) -> Result<Vec<DataPoint>, CoreError> {
        Ok(CatalogueClient::list_points(self, type_name).await?)
    }

    async fn list_all_points(&self, type_name: &str) -> Result<Vec<DataPoint>, CoreError> {
        Ok(CatalogueClient::list_all_points(self, type_name).await?)
    }

    async fn create_point(&self, req: &CreateDataPointRequest) -> Result<DataPoint, CoreError> {
        Ok(CatalogueClient::create_point(self, req).await?)
    }

    async fn update_point(
        &self,
        id: &EntityId,
        req: &UpdateDataPointRequest,
    ) -> Result<DataPoint, CoreError> {
        Ok(CatalogueClient::update_point(self, id, req).await?)
    }

    async fn delete_point(&self, id: &EntityId) -> Result<(), CoreError> {
        Ok(CatalogueClient::delete_point(self, id).await?)
    }
}
