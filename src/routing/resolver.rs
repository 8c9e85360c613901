//! Auth configuration lookup for the external authorization filter.
//!
//! Called once per upstream request, so lookups go through a cached
//! [`PathIndex`] per domain. The cache is filled lazily from the endpoint
//! store and dropped for a domain whenever the registry mutates it.
//! Domains without endpoints are never cached; they arrive straight from
//! request headers.

use std::sync::Arc;
use std::time::Instant;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use crate::model::{Endpoint, EndpointAuth};
use crate::observability::metrics;
use crate::routing::index::PathIndex;
use crate::store::{EndpointStore, StoreError};

/// Auth configuration covering a requested domain and path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    pub endpoint_id: Uuid,
    /// Registered path that matched.
    pub path: String,
    #[serde(flatten)]
    pub auth: EndpointAuth,
}

impl From<&Endpoint> for AuthConfig {
    fn from(endpoint: &Endpoint) -> Self {
        Self {
            endpoint_id: endpoint.id,
            path: endpoint.path.clone(),
            auth: endpoint.auth.clone(),
        }
    }
}

/// Cache entry of one domain.
#[derive(Debug, Default)]
struct Slot {
    /// Bumped by every invalidation. An index built from a snapshot read
    /// before the last bump is not stored.
    generation: u64,
    index: Option<Arc<PathIndex>>,
}

/// Longest-prefix resolver over the endpoint store.
pub struct AuthResolver {
    store: Arc<dyn EndpointStore>,
    indexes: DashMap<String, Slot>,
}

impl AuthResolver {
    pub fn new(store: Arc<dyn EndpointStore>) -> Self {
        Self {
            store,
            indexes: DashMap::new(),
        }
    }

    /// Auth configuration of the endpoint whose path is the most specific
    /// prefix of `path` on `domain`. `None` means no authorization should be
    /// attached.
    pub fn resolve(&self, domain: &str, path: &str) -> Result<Option<AuthConfig>, StoreError> {
        let start = Instant::now();
        // The filter may forward the raw request target.
        let path = path.split(['?', '#']).next().unwrap_or(path);

        let index = self.index_for(domain)?;
        let resolved = index.longest_match(path).map(AuthConfig::from);

        match &resolved {
            Some(config) => tracing::trace!(domain, path, matched = %config.path, "Resolved auth config"),
            None => tracing::trace!(domain, path, "No auth config"),
        }
        metrics::record_resolution(resolved.is_some(), start);
        Ok(resolved)
    }

    /// Drop the cached index of `domain`; the next lookup rebuilds it.
    pub fn invalidate(&self, domain: &str) {
        let mut slot = self.indexes.entry(domain.to_string()).or_default();
        slot.generation += 1;
        slot.index = None;
    }

    fn index_for(&self, domain: &str) -> Result<Arc<PathIndex>, StoreError> {
        let generation = match self.indexes.get(domain) {
            Some(slot) => match &slot.index {
                Some(index) => return Ok(index.clone()),
                None => slot.generation,
            },
            None => 0,
        };

        let index = Arc::new(PathIndex::build(self.store.find_by_domain(domain)?));
        if index.is_empty() {
            return Ok(index);
        }

        // Compared and stored under the shard lock `invalidate` takes too.
        match self.indexes.entry(domain.to_string()) {
            Entry::Occupied(mut slot) => {
                if slot.get().generation == generation {
                    slot.get_mut().index = Some(index.clone());
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(Slot {
                    generation,
                    index: Some(index.clone()),
                });
            }
        }
        Ok(index)
    }
}
