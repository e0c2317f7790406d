//! System health checks
//! Reports the state of storage and the language model for `/health`

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use health_pulse_data::database::{self, DatabaseError};
use tracing::{debug, warn};

/// Overall system status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemStatus {
    Ok,
    /// Functional with reduced capability
    Degraded,
    Error,
}

/// Component status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentStatus {
    Ok,
    Degraded,
    Error,
}

impl ComponentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentStatus::Ok => "ok",
            ComponentStatus::Degraded => "degraded",
            ComponentStatus::Error => "error",
        }
    }
}

impl SystemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemStatus::Ok => "ok",
            SystemStatus::Degraded => "degraded",
            SystemStatus::Error => "error",
        }
    }
}

/// A health component with status and optional details
#[derive(Debug, Clone, PartialEq)]
pub struct HealthComponent {
    pub status: ComponentStatus,
    pub details: Option<String>,
}

impl HealthComponent {
    fn new(status: ComponentStatus, details: impl Into<String>) -> Self {
        Self { status, details: Some(details.into()) }
    }
}

/// Overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    pub status: SystemStatus,
    /// Component name to its health
    pub components: HashMap<String, HealthComponent>,
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Check the storage backend
    async fn check_database_status(&self) -> HealthComponent;
}

/// Health service backed by the global pool
#[derive(Debug, Clone)]
pub struct HealthService {
    language_model_configured: bool,
}

impl HealthService {
    pub fn new(language_model_configured: bool) -> Self {
        Self { language_model_configured }
    }
}

/// Classify the storage backend from the result of looking up the pool
pub fn database_component(pool: Result<database::DatabasePool, DatabaseError>) -> HealthComponent {
    let pool = match pool {
        Ok(pool) => pool,
        Err(DatabaseError::PoolNotInitialized) => {
            return HealthComponent::new(ComponentStatus::Degraded, "No database pool, using in-memory store");
        }
        Err(e) => return HealthComponent::new(ComponentStatus::Error, e.to_string()),
    };

    let answered = pool
        .connection()
        .and_then(|conn| conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)).map_err(DatabaseError::from));
    match answered {
        Ok(_) if pool.is_in_memory() => {
            HealthComponent::new(ComponentStatus::Degraded, "SQLite in-memory database, data is not persisted")
        }
        Ok(_) => HealthComponent {
            status: ComponentStatus::Ok,
            details: database::get_connection_info(),
        },
        Err(e) => {
            warn!("Database health check failed: {}", e);
            HealthComponent::new(ComponentStatus::Error, format!("Database connection error: {}", e))
        }
    }
}

/// Worst component status wins
pub fn overall_status<'a>(components: impl IntoIterator<Item = &'a HealthComponent>) -> SystemStatus {
    components
        .into_iter()
        .fold(SystemStatus::Ok, |status, component| match (status, component.status) {
            (SystemStatus::Error, _) | (_, ComponentStatus::Error) => SystemStatus::Error,
            (SystemStatus::Degraded, _) | (_, ComponentStatus::Degraded) => SystemStatus::Degraded,
            _ => SystemStatus::Ok,
        })
}

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let database = self.check_database_status().await;
        let api = HealthComponent { status: ComponentStatus::Ok, details: None };
        let language_model = if self.language_model_configured {
            HealthComponent { status: ComponentStatus::Ok, details: None }
        } else {
            HealthComponent::new(ComponentStatus::Degraded, "Language model is not configured")
        };

        let components: HashMap<String, HealthComponent> = [
            ("database".to_string(), database),
            ("api".to_string(), api),
            ("llm".to_string(), language_model),
        ]
        .into_iter()
        .collect();

        let status = overall_status(components.values());
        debug!("System health: {}", status.as_str());
        SystemHealth { status, components }
    }

    async fn check_database_status(&self) -> HealthComponent {
        database_component(database::get_db_pool())
    }
}

pub fn create_health_service(language_model_configured: bool) -> Arc<dyn HealthServiceTrait + Send + Sync> {
    Arc::new(HealthService::new(language_model_configured))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_system_health() {
        let health = HealthService::new(false).get_system_health().await;
        assert!(health.components.contains_key("database"));
        assert_eq!(health.components["llm"].status, ComponentStatus::Degraded);
        assert_ne!(health.status, SystemStatus::Ok);
    }

    #[test]
    fn test_in_memory_pool_is_degraded() {
        let pool = database::create_in_memory_pool().unwrap();
        assert_eq!(database_component(Ok(pool)).status, ComponentStatus::Degraded);
        assert_eq!(
            database_component(Err(DatabaseError::PoolNotInitialized)).status,
            ComponentStatus::Degraded
        );
    }

    #[test]
    fn test_overall_status() {
        let ok = HealthComponent { status: ComponentStatus::Ok, details: None };
        let degraded = HealthComponent::new(ComponentStatus::Degraded, "slow");
        let error = HealthComponent::new(ComponentStatus::Error, "down");

        assert_eq!(overall_status([&ok, &ok]), SystemStatus::Ok);
        assert_eq!(overall_status([&ok, &degraded]), SystemStatus::Degraded);
        assert_eq!(overall_status([&degraded, &error, &ok]), SystemStatus::Error);
    }
}
