// Repository module structure
pub mod errors;
mod alert;
mod health_metric;
mod in_memory;
mod insight;
mod medication;
mod profile;
mod storage;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use alert::{HealthAlertRepository, HealthAlertRepositoryTrait};
pub use health_metric::{HealthMetricRepository, HealthMetricRepositoryTrait};
pub use in_memory::InMemoryTable;
pub use insight::{InsightRepository, InsightRepositoryTrait};
pub use medication::{MedicationRepository, MedicationRepositoryTrait};
pub use profile::{ProfileRepository, ProfileRepositoryTrait};
