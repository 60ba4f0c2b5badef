//! Analysis orchestration.
//!
//! This module owns the session state and drives the remote analysis
//! steps over a pluggable HTTP transport.

pub mod runner;
pub mod session;
pub mod transport;

pub use runner::{Orchestrator, StepObserver};
pub use session::{Control, Session};
pub use transport::HttpTransport;
