// refcat-api: Async Rust client for the dynamic reference-data catalogue API

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::CatalogueClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
pub use types::{
    BulkCreateRequest, BulkCreateResponse, CatalogueStatus, CreateDataPointRequest, DataPoint,
    DataType, DataTypeStatus, DataTypeWithPoints, EntityId, NewDataPoint, UpdateDataPointRequest,
};
