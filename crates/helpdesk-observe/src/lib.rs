//! Observability for the helpdesk agent: global tracing subscriber setup
//! with optional OpenTelemetry export.

pub mod tracing_setup;
