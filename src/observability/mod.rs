//! Observability for the model layer
//!
//! Structured single-line logging with explicit severities and a closed
//! event set. Read-only with respect to the model: logging never influences
//! what an operation returns.

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};
