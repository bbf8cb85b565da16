//! Observation session coordination for Packtrace.
//!
//! A session owns the change ledger, runs all watchers concurrently for a
//! bounded observation window, stops them cooperatively and exports the
//! final change report exactly once.

mod config;
mod coordinator;
mod shutdown;

pub use config::{ConfigError, SessionConfig};
pub use coordinator::{ObservationCoordinator, SessionError};
pub use shutdown::StopSignal;
