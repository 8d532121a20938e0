//! Internal telemetry for the tablevote backend.
//!
//! In-process counters and health flags only; the log stream is the
//! export surface.

pub mod health;
pub mod metrics;
pub mod tracing_setup;

pub use health::*;
pub use metrics::*;
pub use tracing_setup::*;
