//! Logging and metrics.
//!
//! Observability is read-only: nothing in here influences scoring, and a
//! failure to log or count must never surface as an operation error.

pub mod logger;
pub mod metrics;

pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
