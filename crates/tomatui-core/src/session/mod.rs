//! Session state machine and its running summary.

mod engine;
mod summary;

pub use engine::{SessionEngine, SessionState};
pub use summary::SessionSummary;
