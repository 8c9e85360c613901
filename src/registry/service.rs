//! Endpoint registry: the mutation path.
//!
//! # Responsibilities
//! - Enforce (domain, path) uniqueness on creation
//! - Keep the endpoint store and the credential files loosely consistent
//! - Invalidate the auth resolver and schedule regeneration after changes
//!
//! # Design Decisions
//! - Store row first, credentials second. A credential failure removes the
//!   row again and returns the credential error unchanged
//! - On delete the row goes first; leftover credential files are logged,
//!   the endpoint is gone either way
//! - Credential updates do not touch the generated documents and do not
//!   schedule a regeneration

use std::sync::{Arc, Mutex, PoisonError};

use uuid::Uuid;

use crate::model::{CredentialKind, Endpoint, EndpointRegistration};
use crate::observability::metrics;
use crate::registry::error::RegistryError;
use crate::registry::write_service::AuthHandlers;
use crate::routing::AuthResolver;
use crate::scheduler::UpdateScheduler;
use crate::store::EndpointStore;

pub struct EndpointRegistry {
    store: Arc<dyn EndpointStore>,
    handlers: AuthHandlers,
    scheduler: Arc<dyn UpdateScheduler>,
    resolver: Arc<AuthResolver>,
    /// Serializes the uniqueness check with the insert.
    create_lock: Mutex<()>,
}

impl EndpointRegistry {
    pub fn new(
        store: Arc<dyn EndpointStore>,
        handlers: AuthHandlers,
        scheduler: Arc<dyn UpdateScheduler>,
        resolver: Arc<AuthResolver>,
    ) -> Self {
        Self {
            store,
            handlers,
            scheduler,
            resolver,
            create_lock: Mutex::new(()),
        }
    }

    pub fn create_endpoint(&self, registration: EndpointRegistration) -> Result<Endpoint, RegistryError> {
        registration.validate().map_err(RegistryError::Invalid)?;
        let handler = self.handlers.for_type(registration.auth_type())?;

        let endpoint = {
            let _guard = self.create_lock.lock().unwrap_or_else(PoisonError::into_inner);
            let path = registration.effective_path();
            if self
                .store
                .find_by_domain_and_path(&registration.domain, path)?
                .is_some()
            {
                return Err(RegistryError::Conflict {
                    domain: registration.domain.clone(),
                    path: path.to_string(),
                });
            }

            let endpoint = self.store.save(registration.resolve_defaults(Uuid::new_v4()))?;
            if let Err(e) = handler.create_endpoint(endpoint.id, &registration) {
                tracing::warn!(endpoint_id = %endpoint.id, error = %e, "Credential creation failed, removing endpoint");
                match self.store.delete_by_id(endpoint.id) {
                    // The row was visible to lookups and regeneration runs
                    // in between.
                    Ok(_) => self.after_mutation(&endpoint.domain),
                    Err(rollback) => {
                        tracing::error!(endpoint_id = %endpoint.id, error = %rollback, "Failed to remove endpoint after credential failure");
                    }
                }
                return Err(e);
            }
            endpoint
        };

        tracing::info!(
            endpoint_id = %endpoint.id,
            domain = %endpoint.domain,
            path = %endpoint.path,
            auth_type = %endpoint.auth_type(),
            "Endpoint created"
        );
        self.after_mutation(&endpoint.domain);
        Ok(endpoint)
    }

    pub fn delete_endpoint(&self, id: Uuid) -> Result<(), RegistryError> {
        let endpoint = self.store.find_by_id(id)?.ok_or(RegistryError::NotFound(id))?;
        let handler = self.handlers.for_type(endpoint.auth_type())?;

        if !self.store.delete_by_id(id)? {
            return Err(RegistryError::NotFound(id));
        }
        if let Err(e) = handler.delete_endpoint(&endpoint) {
            if e.is_already_absent() {
                tracing::debug!(endpoint_id = %id, "Credential files were already absent");
            } else {
                tracing::warn!(endpoint_id = %id, error = %e, "Failed to delete credential files");
            }
        }

        tracing::info!(endpoint_id = %id, domain = %endpoint.domain, path = %endpoint.path, "Endpoint deleted");
        self.after_mutation(&endpoint.domain);
        Ok(())
    }

    /// Replace one credential file of an endpoint. `kind` is the wire name.
    pub fn update_credential(&self, id: Uuid, kind: &str, body: &str) -> Result<(), RegistryError> {
        let endpoint = self.store.find_by_id(id)?.ok_or(RegistryError::NotFound(id))?;
        let auth_type = endpoint.auth_type();
        let supported = auth_type.credential_kinds();

        let kind = CredentialKind::from_wire_name(kind)
            .filter(|k| supported.contains(k))
            .ok_or_else(|| RegistryError::UnknownCredentialKind {
                requested: kind.to_string(),
                supported: supported.iter().map(CredentialKind::wire_name).collect(),
            })?;

        self.handlers
            .for_type(auth_type)?
            .update_credential(&endpoint, kind, body)?;
        tracing::info!(endpoint_id = %id, credential = %kind, "Credential updated");
        Ok(())
    }

    pub fn get_endpoint(&self, id: Uuid) -> Result<Endpoint, RegistryError> {
        self.store.find_by_id(id)?.ok_or(RegistryError::NotFound(id))
    }

    pub fn list_endpoints(&self) -> Result<Vec<Endpoint>, RegistryError> {
        Ok(self.store.find_all()?)
    }

    fn after_mutation(&self, domain: &str) {
        self.resolver.invalidate(domain);
        if let Ok(all) = self.store.find_all() {
            metrics::set_registered_endpoints(all.len());
        }
        self.scheduler.schedule_config_update();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::credentials::FileCredentialStore;
    use crate::model::{AuthCredentials, AuthType, IShareAuthInfo, IShareCredentials};
    use crate::registry::write_service::{EndpointWriteService, IShareWriteService};
    use crate::store::InMemoryEndpointStore;

    #[derive(Default)]
    struct CountingScheduler {
        calls: AtomicUsize,
    }

    impl CountingScheduler {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl UpdateScheduler for CountingScheduler {
        fn schedule_config_update(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        store: Arc<InMemoryEndpointStore>,
        credentials: Arc<FileCredentialStore>,
        scheduler: Arc<CountingScheduler>,
        resolver: Arc<AuthResolver>,
        registry: EndpointRegistry,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        fixture_with_root(dir.path().join("certs"), dir)
    }

    fn fixture_with_root(root: std::path::PathBuf, dir: tempfile::TempDir) -> Fixture {
        let store = Arc::new(InMemoryEndpointStore::new());
        let credentials = Arc::new(FileCredentialStore::new(root));
        let scheduler = Arc::new(CountingScheduler::default());
        let resolver = Arc::new(AuthResolver::new(store.clone()));
        let handlers = AuthHandlers::new(vec![
            Arc::new(IShareWriteService::new(credentials.clone())) as Arc<dyn EndpointWriteService>
        ])
        .unwrap();
        let registry = EndpointRegistry::new(store.clone(), handlers, scheduler.clone(), resolver.clone());
        Fixture {
            _dir: dir,
            store,
            credentials,
            scheduler,
            resolver,
            registry,
        }
    }

    fn registration(domain: &str, path: Option<&str>) -> EndpointRegistration {
        EndpointRegistration {
            domain: domain.into(),
            path: path.map(String::from),
            port: None,
            target_port: None,
            use_https: true,
            credentials: AuthCredentials::IShare(IShareCredentials {
                info: IShareAuthInfo {
                    client_id: "EU.EORI.CLIENT".into(),
                    idp_id: "EU.EORI.IDP".into(),
                    idp_address: "https://idp.example.org/token".into(),
                    request_grant_type: "client_credentials".into(),
                },
                signing_key: "KEY".into(),
                certificate_chain: "CHAIN".into(),
            }),
        }
    }

    #[test]
    fn test_create_stores_row_and_credentials() {
        let f = fixture();
        assert_eq!(f.resolver.resolve("a.org", "/orders/1").unwrap(), None);

        let endpoint = f.registry.create_endpoint(registration("a.org", Some("/orders"))).unwrap();

        assert_eq!(endpoint.target_port, 443);
        assert_eq!(f.store.find_all().unwrap(), vec![endpoint.clone()]);
        assert_eq!(f.credentials.read(endpoint.id, CredentialKind::SigningKey).unwrap(), "KEY");
        assert_eq!(
            f.credentials.read(endpoint.id, CredentialKind::CertificateChain).unwrap(),
            "CHAIN"
        );
        assert_eq!(f.scheduler.calls(), 1);
        // Resolver cache was invalidated.
        let resolved = f.resolver.resolve("a.org", "/orders/1").unwrap().unwrap();
        assert_eq!(resolved.endpoint_id, endpoint.id);
    }

    #[test]
    fn test_duplicate_is_conflict_without_side_effects() {
        let f = fixture();
        f.registry.create_endpoint(registration("a.org", None)).unwrap();

        let err = f.registry.create_endpoint(registration("a.org", Some("/"))).unwrap_err();

        assert!(matches!(err, RegistryError::Conflict { ref path, .. } if path == "/"));
        assert_eq!(f.store.find_all().unwrap().len(), 1);
        assert_eq!(f.scheduler.calls(), 1);
    }

    #[test]
    fn test_same_path_on_other_domain_is_allowed() {
        let f = fixture();
        f.registry.create_endpoint(registration("a.org", Some("/x"))).unwrap();
        f.registry.create_endpoint(registration("b.org", Some("/x"))).unwrap();
        assert_eq!(f.store.find_all().unwrap().len(), 2);
    }

    #[test]
    fn test_credential_failure_removes_row() {
        let dir = tempfile::tempdir().unwrap();
        // Credential root is a regular file, so no folder can be created.
        let root = dir.path().join("not-a-dir");
        std::fs::write(&root, "x").unwrap();
        let f = fixture_with_root(root, dir);

        let err = f.registry.create_endpoint(registration("a.org", None)).unwrap_err();

        assert!(matches!(
            err,
            RegistryError::Credential(crate::credentials::CredentialError::FolderCreation { .. })
        ));
        assert!(f.store.find_all().unwrap().is_empty());
        // The removal is a mutation of its own.
        assert_eq!(f.scheduler.calls(), 1);
    }

    /// Looks the new endpoint up while its row exists, then fails.
    struct ResolveThenFail {
        resolver: Arc<AuthResolver>,
    }

    impl EndpointWriteService for ResolveThenFail {
        fn auth_type(&self) -> AuthType {
            AuthType::IShare
        }

        fn create_endpoint(&self, _id: Uuid, registration: &EndpointRegistration) -> Result<(), RegistryError> {
            let seen = self
                .resolver
                .resolve(&registration.domain, registration.effective_path())?;
            assert!(seen.is_some());
            Err(RegistryError::Credential(crate::credentials::CredentialError::FolderCreation {
                path: "/certs".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            }))
        }

        fn delete_endpoint(&self, _endpoint: &Endpoint) -> Result<(), crate::credentials::CredentialError> {
            Ok(())
        }

        fn update_credential(&self, _endpoint: &Endpoint, _kind: CredentialKind, _body: &str) -> Result<(), RegistryError> {
            Ok(())
        }
    }

    #[test]
    fn test_rolled_back_endpoint_is_not_resolvable() {
        let store = Arc::new(InMemoryEndpointStore::new());
        let scheduler = Arc::new(CountingScheduler::default());
        let resolver = Arc::new(AuthResolver::new(store.clone()));
        let handlers = AuthHandlers::new(vec![Arc::new(ResolveThenFail {
            resolver: resolver.clone(),
        }) as Arc<dyn EndpointWriteService>])
        .unwrap();
        let registry = EndpointRegistry::new(store.clone(), handlers, scheduler.clone(), resolver.clone());

        let err = registry.create_endpoint(registration("a.org", Some("/orders"))).unwrap_err();

        assert!(matches!(err, RegistryError::Credential(_)));
        assert!(store.find_all().unwrap().is_empty());
        assert_eq!(resolver.resolve("a.org", "/orders").unwrap(), None);
        assert_eq!(scheduler.calls(), 1);
    }

    #[test]
    fn test_invalid_registration_is_rejected_before_storing() {
        let f = fixture();

        let err = f.registry.create_endpoint(registration("a.org", Some("orders"))).unwrap_err();
        assert!(matches!(err, RegistryError::Invalid(_)));

        let err = f
            .registry
            .create_endpoint(registration("a.org\"\n  injected: true", None))
            .unwrap_err();
        assert!(matches!(err, RegistryError::Invalid(_)));

        assert!(f.store.find_all().unwrap().is_empty());
        assert_eq!(f.scheduler.calls(), 0);
    }

    #[test]
    fn test_delete_removes_row_and_files() {
        let f = fixture();
        let endpoint = f.registry.create_endpoint(registration("a.org", Some("/x"))).unwrap();

        f.registry.delete_endpoint(endpoint.id).unwrap();

        assert!(f.store.find_all().unwrap().is_empty());
        assert!(!f.credentials.folder_path(endpoint.id).exists());
        assert_eq!(f.scheduler.calls(), 2);
        assert_eq!(f.resolver.resolve("a.org", "/x").unwrap(), None);
    }

    #[test]
    fn test_delete_tolerates_missing_files() {
        let f = fixture();
        let endpoint = f.registry.create_endpoint(registration("a.org", None)).unwrap();
        f.credentials.delete(endpoint.id).unwrap();

        f.registry.delete_endpoint(endpoint.id).unwrap();

        assert!(f.store.find_all().unwrap().is_empty());
    }

    #[test]
    fn test_delete_unknown_is_not_found() {
        let f = fixture();
        let id = Uuid::new_v4();
        assert!(matches!(f.registry.delete_endpoint(id), Err(RegistryError::NotFound(missing)) if missing == id));
        assert_eq!(f.scheduler.calls(), 0);
    }

    #[test]
    fn test_update_credential() {
        let f = fixture();
        let endpoint = f.registry.create_endpoint(registration("a.org", None)).unwrap();

        f.registry
            .update_credential(endpoint.id, "certificateChain", "NEW CHAIN")
            .unwrap();

        assert_eq!(
            f.credentials.read(endpoint.id, CredentialKind::CertificateChain).unwrap(),
            "NEW CHAIN"
        );
        assert_eq!(f.credentials.read(endpoint.id, CredentialKind::SigningKey).unwrap(), "KEY");
        // Only the creation scheduled a regeneration.
        assert_eq!(f.scheduler.calls(), 1);
    }

    #[test]
    fn test_update_unknown_kind_lists_supported() {
        let f = fixture();
        let endpoint = f.registry.create_endpoint(registration("a.org", None)).unwrap();

        let err = f.registry.update_credential(endpoint.id, "password", "x").unwrap_err();

        match err {
            RegistryError::UnknownCredentialKind { requested, supported } => {
                assert_eq!(requested, "password");
                assert_eq!(supported, vec!["signingKey", "certificateChain"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_update_unknown_endpoint() {
        let f = fixture();
        assert!(matches!(
            f.registry.update_credential(Uuid::new_v4(), "signingKey", "x"),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn test_get_and_list() {
        let f = fixture();
        let a = f.registry.create_endpoint(registration("a.org", None)).unwrap();
        let b = f.registry.create_endpoint(registration("b.org", None)).unwrap();

        assert_eq!(f.registry.get_endpoint(b.id).unwrap(), b);
        assert_eq!(f.registry.list_endpoints().unwrap(), vec![a, b]);
        assert!(matches!(f.registry.get_endpoint(Uuid::new_v4()), Err(RegistryError::NotFound(_))));
    }
}
