// Public entities for the HealthPulse API
// Envelopes, query parameters and error payloads shared by the handlers.
// Domain records are serialized as they are.

pub mod common;

pub use common::{
    AlertListQuery, AnalysisResponse, DashboardResponse, ErrorResponse, ListQuery, ListResponse, MedicationListQuery,
    MetricListQuery, ReadingCheckResponse,
};
