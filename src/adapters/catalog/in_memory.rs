//! In-memory catalog store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::catalog::{CatalogFilters, ServiceRecord};
use crate::domain::foundation::ServiceId;
use crate::ports::{CatalogError, CatalogStore};

/// Vector-backed catalog, seeded at startup.
pub struct InMemoryCatalog {
    services: RwLock<Vec<ServiceRecord>>,
}

impl InMemoryCatalog {
    pub fn new(services: Vec<ServiceRecord>) -> Self {
        Self {
            services: RwLock::new(services),
        }
    }

    pub async fn add(&self, record: ServiceRecord) {
        self.services.write().await.push(record);
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn search(&self, filters: &CatalogFilters) -> Result<Vec<ServiceRecord>, CatalogError> {
        let services = self.services.read().await;
        Ok(services.iter().filter(|s| filters.matches(s)).cloned().collect())
    }

    async fn get_details(&self, id: &ServiceId) -> Result<ServiceRecord, CatalogError> {
        let services = self.services.read().await;
        services
            .iter()
            .find(|s| &s.id == id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::ServiceCategory;

    fn record(name: &str, city: &str, category: ServiceCategory) -> ServiceRecord {
        ServiceRecord {
            id: ServiceId::new(format!("svc-{}", name.to_lowercase().replace(' ', "-"))).unwrap(),
            name: name.to_string(),
            alt_name: None,
            category,
            description: "fun for groups".to_string(),
            price: 100.0,
            currency: "USD".to_string(),
            duration_minutes: None,
            city: city.to_string(),
            min_group: None,
            max_group: None,
        }
    }

    #[tokio::test]
    async fn search_filters_by_city_and_category() {
        let catalog = InMemoryCatalog::new(vec![
            record("Smokehouse", "Austin", ServiceCategory::Restaurant),
            record("Neon Club", "Austin", ServiceCategory::Nightclub),
            record("Vegas Buffet", "Las Vegas", ServiceCategory::Restaurant),
        ]);

        let filters = CatalogFilters::for_city("Austin").with_category(ServiceCategory::Restaurant);
        let results = catalog.search(&filters).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Smokehouse");
    }

    #[tokio::test]
    async fn get_details_by_id() {
        let smokehouse = record("Smokehouse", "Austin", ServiceCategory::Restaurant);
        let id = smokehouse.id.clone();
        let catalog = InMemoryCatalog::new(vec![smokehouse]);

        assert_eq!(catalog.get_details(&id).await.unwrap().name, "Smokehouse");
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let catalog = InMemoryCatalog::new(vec![]);
        let missing = ServiceId::new("svc-missing").unwrap();
        assert!(matches!(
            catalog.get_details(&missing).await,
            Err(CatalogError::NotFound(_))
        ));
    }
}
