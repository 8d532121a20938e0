//! Background workers: fallback-map cleanup, durable-backend probing,
//! periodic metrics logging.

pub mod probe;
pub mod scheduler;
pub mod sweeper;

pub use probe::ProbeWorker;
pub use scheduler::{Scheduler, WorkerConfig};
pub use sweeper::CleanupSweeper;
