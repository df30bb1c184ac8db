//! Observability subsystem.
//!
//! Structured logging only: every subsystem emits `tracing` events, and
//! requests are wrapped in a span carrying their `x-request-id`. There is no
//! metrics endpoint.

pub mod logging;

pub use logging::init_logging;
