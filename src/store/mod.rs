//! Endpoint persistence.
//!
//! # Responsibilities
//! - Keyed storage of endpoint records
//! - Lookup by id, by domain, by domain + path, full enumeration
//!
//! # Design Decisions
//! - `EndpointStore` is the seam to a real database; the bundled
//!   `InMemoryEndpointStore` keeps insertion order so generated documents
//!   are deterministic for an unchanged registry
//! - (domain, path) uniqueness is checked by the registry, not here

use std::sync::{PoisonError, RwLock};

use thiserror::Error;
use uuid::Uuid;

use crate::model::Endpoint;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("endpoint store unavailable: {0}")]
    Unavailable(String),
}

/// Durable keyed storage for endpoint records.
pub trait EndpointStore: Send + Sync {
    fn find_all(&self) -> Result<Vec<Endpoint>, StoreError>;

    fn find_by_domain(&self, domain: &str) -> Result<Vec<Endpoint>, StoreError>;

    fn find_by_id(&self, id: Uuid) -> Result<Option<Endpoint>, StoreError>;

    fn find_by_domain_and_path(&self, domain: &str, path: &str) -> Result<Option<Endpoint>, StoreError>;

    /// Insert or replace the record with the same id.
    fn save(&self, endpoint: Endpoint) -> Result<Endpoint, StoreError>;

    /// Remove a record; returns whether it existed.
    fn delete_by_id(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Process-local endpoint store.
#[derive(Debug, Default)]
pub struct InMemoryEndpointStore {
    endpoints: RwLock<Vec<Endpoint>>,
}

impl InMemoryEndpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read<T>(&self, f: impl FnOnce(&[Endpoint]) -> T) -> T {
        let guard = self.endpoints.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }
}

impl EndpointStore for InMemoryEndpointStore {
    fn find_all(&self) -> Result<Vec<Endpoint>, StoreError> {
        Ok(self.read(|all| all.to_vec()))
    }

    fn find_by_domain(&self, domain: &str) -> Result<Vec<Endpoint>, StoreError> {
        Ok(self.read(|all| all.iter().filter(|e| e.domain == domain).cloned().collect()))
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Endpoint>, StoreError> {
        Ok(self.read(|all| all.iter().find(|e| e.id == id).cloned()))
    }

    fn find_by_domain_and_path(&self, domain: &str, path: &str) -> Result<Option<Endpoint>, StoreError> {
        Ok(self.read(|all| {
            all.iter()
                .find(|e| e.domain == domain && e.path == path)
                .cloned()
        }))
    }

    fn save(&self, endpoint: Endpoint) -> Result<Endpoint, StoreError> {
        let mut all = self.endpoints.write().unwrap_or_else(PoisonError::into_inner);
        match all.iter_mut().find(|e| e.id == endpoint.id) {
            Some(existing) => *existing = endpoint.clone(),
            None => all.push(endpoint.clone()),
        }
        Ok(endpoint)
    }

    fn delete_by_id(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut all = self.endpoints.write().unwrap_or_else(PoisonError::into_inner);
        let before = all.len();
        all.retain(|e| e.id != id);
        Ok(all.len() != before)
    }
}
