//! Core engine: fetch cache, news fallback resolution, metric
//! normalization, the dashboard state object and the refresh scheduler.

pub mod cache;
pub mod dashboard;
pub mod normalizer;
pub mod resolver;
pub mod scheduler;

pub use dashboard::{Dashboard, RefreshEvent};
pub use scheduler::{Scheduler, SchedulerConfig};
