//! Flexi Watcher
//!
//! Drives [`flexi_core::poll::PollSession`] against a live backend.
//!
//! Architecture:
//! - Backend: the two HTTP calls the poller needs, behind a trait
//! - Notifier: where one-time user notifications go
//! - Watcher: one tokio task per execution, owning its session
//! - View: at most one active watch, mirroring an open execution screen
//!
//! The state machine stays pure; this crate only decides when to call it.

pub mod backend;
pub mod config;
pub mod notifier;
pub mod view;
pub mod watcher;

pub use backend::ExecutionBackend;
pub use config::WatcherConfig;
pub use notifier::{Notifier, TracingNotifier};
pub use view::ExecutionView;
pub use watcher::{ExecutionWatcher, WatchHandle};
