//! Execution status polling
//!
//! The state machine that tracks one asynchronous execution from the client
//! side. Everything here is pure: no IO, no timers, and the clock is only read
//! through arguments. The scheduling shell (`flexi-watcher`) drives a
//! [`PollSession`] by feeding it submission results, fetched records and
//! transient errors, and forwards the returned [`Notification`]s to the user.

mod error;
mod notification;
mod policy;
mod session;
mod status;

pub use error::PollError;
pub use notification::{Notification, NotificationKind};
pub use policy::PollPolicy;
pub use session::{PollSession, TickOutcome};
pub use status::DisplayStatus;
