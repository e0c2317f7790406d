// HealthPulse Domain
// Business logic for the HealthPulse application: entities, services, the
// rule engine, the language model client and authentication

// Services that implement business logic
pub mod services;

// Authentication
pub mod auth;

// Domain entities
pub mod entities;

// Health checks and system status
pub mod health;

// Hosted language model client
pub mod llm;

// Re-export the database module from the data crate for convenience
pub use health_pulse_data::database;

// Testing utilities - only available with mock feature
#[cfg(feature = "mock")]
pub mod testing;
