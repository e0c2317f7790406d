pub mod alerts;
pub mod analysis;
pub mod chat;
pub mod dashboard;
pub mod health;
pub mod insights;
pub mod medications;
pub mod metrics;
pub mod profile;

#[cfg(test)]
mod tests;

pub use health::health_check;
