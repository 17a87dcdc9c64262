//! Channels and coordination on the tokio runtime.
//!
//! Execution contexts are tokio tasks and values travel over `tokio::sync::mpsc`. The
//! patterns match [`crate::synchronous`], minus the hand-rolled channel.

pub mod coordinator;
pub mod deadline;
pub mod wait_group;
pub mod worker;

pub use coordinator::{wait_for_all_via_channel, wait_for_all_via_counter};
pub use deadline::run_with_deadline;
pub use wait_group::{WaitGroup, WaitGuard};
pub use worker::{join_all, simulated_work, Worker, WorkerHandle};
