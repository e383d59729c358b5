//! Catalog store port.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::catalog::{CatalogFilters, ServiceRecord};
use crate::domain::foundation::ServiceId;

/// Errors from the catalog backend.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("service not found: {0}")]
    NotFound(String),

    #[error("catalog backend error: {0}")]
    Backend(String),
}

/// Read access to the bookable-service catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Returns services matching the filters.
    async fn search(&self, filters: &CatalogFilters) -> Result<Vec<ServiceRecord>, CatalogError>;

    /// Looks one service up by id.
    async fn get_details(&self, id: &ServiceId) -> Result<ServiceRecord, CatalogError>;
}
