//! Service registry for dependency injection and lifecycle management.
//!
//! The registry holds all services, initializes them in order, and
//! handles ordered shutdown. Long-running commands build a registry;
//! one-shot commands talk to the API client directly.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{error, info};

use od_api::{ApiClient, TokenManager};
use od_core::config::ConfigHandle;
use od_core::error::{OdError, OdResult};
use od_models::Database;

use crate::assistant::AssistantService;
use crate::event_bus::EventBus;
use crate::jobs::{JobPollerService, JobStatusSource};
use crate::notification::NotificationService;
use crate::service::{Service, ServiceState};
use crate::session::SessionService;
use crate::settings::SettingsService;

/// Central service registry that manages all application services.
///
/// Provides dependency injection by holding shared references to core
/// infrastructure (database, token manager, config) and managing service
/// lifecycle in the correct order.
pub struct ServiceRegistry {
    /// Application configuration.
    pub config: ConfigHandle,
    /// Local store connection pool.
    pub database: Database,
    /// Shared token state for authenticated requests.
    pub tokens: Arc<TokenManager>,
    /// HTTP API client, set once the backend is configured.
    pub api_client: Arc<RwLock<Option<ApiClient>>>,
    /// Application-level event bus.
    pub event_bus: EventBus,
    /// Registered services in initialization order.
    services: Vec<(String, Arc<RwLock<Box<dyn Service>>>)>,
}

impl ServiceRegistry {
    /// Create a new ServiceRegistry with core infrastructure.
    pub fn new(config: ConfigHandle, database: Database, tokens: Arc<TokenManager>) -> Self {
        Self {
            config,
            database,
            tokens,
            api_client: Arc::new(RwLock::new(None)),
            event_bus: EventBus::new(256),
            services: Vec::new(),
        }
    }

    /// Register a service. Services are initialized in registration order.
    pub fn register<S: Service + 'static>(&mut self, service: S) {
        let name = service.name().to_string();
        info!("registered service: {name}");
        self.services
            .push((name, Arc::new(RwLock::new(Box::new(service)))));
    }

    /// Register all default services in the correct dependency order.
    ///
    /// Initialization order:
    /// 1. Settings (config)
    /// 2. Notification (config, event_bus)
    /// 3. Session (database, event_bus, tokens)
    /// 4. Jobs (database, event_bus, status source)
    /// 5. Assistant (database, config, event_bus)
    pub fn register_all(&mut self, job_source: Arc<dyn JobStatusSource>, poll_interval: Duration) {
        let bus = self.event_bus.clone();

        self.register(SettingsService::new(self.config.clone()));
        self.register(NotificationService::new(self.config.clone(), bus.clone()));
        self.register(SessionService::new(
            self.database.clone(),
            bus.clone(),
            Arc::clone(&self.tokens),
        ));
        self.register(JobPollerService::new(
            self.database.clone(),
            bus.clone(),
            job_source,
            poll_interval,
        ));
        self.register(AssistantService::new(
            self.database.clone(),
            self.config.clone(),
            bus,
        ));

        info!("registered {} default services", self.services.len());
    }

    /// Initialize all registered services in order.
    pub async fn init_all(&self) -> OdResult<()> {
        info!("initializing {} services", self.services.len());

        for (name, service) in &self.services {
            info!("initializing service: {name}");
            let mut svc = service.write().await;
            if let Err(e) = svc.init() {
                error!("failed to initialize service {name}: {e}");
                return Err(OdError::ServiceInit(format!("{name}: {e}")));
            }
        }

        info!("all services initialized");
        Ok(())
    }

    /// Shut down all services in reverse order.
    pub async fn shutdown_all(&self) -> OdResult<()> {
        info!("shutting down services");

        for (name, service) in self.services.iter().rev() {
            info!("shutting down service: {name}");
            let mut svc = service.write().await;
            if let Err(e) = svc.shutdown() {
                error!("error shutting down service {name}: {e}");
                // Continue shutting down other services
            }
        }

        info!("all services shut down");
        Ok(())
    }

    /// Set the API client (after backend configuration is available).
    pub async fn set_api_client(&self, client: ApiClient) {
        let mut api = self.api_client.write().await;
        *api = Some(client);
        info!("API client configured");
    }

    /// Get a reference to the API client.
    pub async fn api_client(&self) -> OdResult<ApiClient> {
        let api = self.api_client.read().await;
        api.clone()
            .ok_or_else(|| OdError::ServiceNotInitialized("API client not configured".into()))
    }

    /// Get a reference to the event bus.
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Get the health status of all services.
    pub async fn health_check(&self) -> Vec<(String, ServiceState, bool)> {
        let mut results = Vec::new();
        for (name, service) in &self.services {
            let svc = service.read().await;
            results.push((name.clone(), svc.state(), svc.is_healthy()));
        }
        results
    }

    /// Get the number of registered services.
    pub fn service_count(&self) -> usize {
        self.services.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use od_core::config::{AppConfig, StoreConfig};

    use crate::jobs::JobStatus;

    struct NoopSource;

    #[async_trait]
    impl JobStatusSource for NoopSource {
        async fn status(&self, _meeting_id: i64, _job_id: &str) -> OdResult<JobStatus> {
            Ok(JobStatus {
                status: "pending".into(),
                error: None,
            })
        }
    }

    fn make_registry(dir: &tempfile::TempDir) -> ServiceRegistry {
        let config = ConfigHandle::new(AppConfig::default());
        let db_path = dir.path().join("test.db");
        let db = Database::init(&db_path, &StoreConfig::default()).unwrap();
        ServiceRegistry::new(config, db, Arc::new(TokenManager::new()))
    }

    #[tokio::test]
    async fn test_register_all() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut registry = make_registry(&dir);
        registry.register_all(Arc::new(NoopSource), Duration::from_secs(5));

        assert_eq!(registry.service_count(), 5);
    }

    #[tokio::test]
    async fn test_init_and_shutdown() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut registry = make_registry(&dir);
        registry.register_all(Arc::new(NoopSource), Duration::from_secs(5));

        registry.init_all().await.unwrap();

        let health = registry.health_check().await;
        for (name, state, healthy) in &health {
            assert!(healthy, "service {name} is not healthy (state: {state})");
        }

        registry.shutdown_all().await.unwrap();
    }

    #[tokio::test]
    async fn test_api_client_unset() {
        let dir = tempfile::TempDir::new().unwrap();
        let registry = make_registry(&dir);
        assert!(registry.api_client().await.is_err());
    }
}
