//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Build collaborators → Bind with retry
//!
//! Run (http::server):
//!     Listening → serve until ShutdownSignal
//!     background.rs runner alongside, same signal
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain (bounded) → Stopped
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger graceful shutdown
//!     Second signal → immediate exit
//! ```
//!
//! # Design Decisions
//! - Bounded bind retry with fixed delay
//! - Shutdown has timeout: exceeding it is an error, not a silent abandon
//! - Upgraded WebSocket connections are not part of the drain

pub mod background;
pub mod error;
pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod state;

pub use background::{BackgroundTasks, IdleBackgroundTasks};
pub use error::LifecycleError;
pub use shutdown::{Shutdown, ShutdownSignal};
pub use startup::RetryPolicy;
pub use state::{LifecycleState, StateTracker};
