//! Session orchestration module.

mod orchestrator;
mod stats;

pub use orchestrator::{Session, SessionOptions};
pub use stats::SessionStats;
