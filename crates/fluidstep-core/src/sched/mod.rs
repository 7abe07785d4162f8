mod config;
mod lag;
mod scheduler;
mod wait;

pub use config::{Pacing, PacingPlan, SchedulerConfig};
pub use lag::{LagTracker, LagTransition};
pub use scheduler::{IterationReport, TickScheduler, TickTarget};
pub use wait::HybridWait;
