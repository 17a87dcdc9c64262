//! Thread-based channels and coordination.
//!
//! Every execution context is an OS thread. Blocking uses a mutex and condition variables;
//! the deadline race uses `crossbeam_channel`.

pub mod channel;
pub mod coordinator;
pub mod deadline;
pub mod wait_group;
pub mod worker;

pub use channel::{Channel, RecvAll};
pub use coordinator::{
    wait_for_all_via_channel, wait_for_all_via_counter, CloseAndDrain, Coordinator,
    CountedReceive, CounterWait,
};
pub use deadline::run_with_deadline;
pub use wait_group::{WaitGroup, WaitGuard};
pub use worker::{join_all, simulated_work, Worker, WorkerHandle};
