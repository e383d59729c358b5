//! Ports - trait boundaries between the domain core and adapters.

mod catalog_store;
mod reasoning_provider;
mod service_selector;

pub use catalog_store::{CatalogError, CatalogStore};
pub use reasoning_provider::{
    ReasoningError, ReasoningMessage, ReasoningProvider, ReasoningRequest, ReasoningResponse,
    ReasoningRole,
};
pub use service_selector::{SelectionError, ServiceSelector};
