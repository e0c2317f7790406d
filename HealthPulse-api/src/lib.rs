// health_pulse_api lib.rs
//
// HTTP surface of HealthPulse: routing, request and response envelopes,
// and the OpenAPI document.

pub mod api;
pub mod entities;
pub mod openapi;
