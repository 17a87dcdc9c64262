//! Runnable demonstrations of the channel semantics, good and bad.
//!
//! Each [`Scenario`] sets up channels and workers, drives them to an end state and reports
//! what it observed. Failures a scenario expects (a send on a closed channel, a worker that
//! reports too late) are caught at the scenario boundary and listed in
//! [`ScenarioReport::caught`]; anything else is returned as an error.

use crate::internal::{CloseError, Outcome, WorkerError};
use crate::synchronous::{
    run_with_deadline, simulated_work, wait_for_all_via_channel, Channel, CloseAndDrain,
    Coordinator, CountedReceive, Worker,
};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    /// Send into a buffered channel, then receive from it on the same thread.
    OkBuffered,
    /// Send into an unbuffered channel with nobody receiving. Never finishes.
    DeadlockUnbuffered,
    /// Workers rendezvous with the caller one at a time.
    WaitAllUnbuffered,
    /// Workers report into a channel buffered for all of them.
    WaitAllBuffered,
    /// Count workers with a wait group, then close the channel and drain it.
    WaitAllDrain,
    /// Close the channel before the workers report.
    ClosingTooEarly,
    /// Send on a channel that is already closed.
    SendOnClosed,
}

impl Scenario {
    pub const ALL: [Scenario; 7] = [
        Scenario::OkBuffered,
        Scenario::DeadlockUnbuffered,
        Scenario::WaitAllUnbuffered,
        Scenario::WaitAllBuffered,
        Scenario::WaitAllDrain,
        Scenario::ClosingTooEarly,
        Scenario::SendOnClosed,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Scenario::OkBuffered => "ok-buffered",
            Scenario::DeadlockUnbuffered => "deadlock-unbuffered",
            Scenario::WaitAllUnbuffered => "wait-all-unbuffered",
            Scenario::WaitAllBuffered => "wait-all-buffered",
            Scenario::WaitAllDrain => "wait-all-drain",
            Scenario::ClosingTooEarly => "closing-too-early",
            Scenario::SendOnClosed => "send-on-closed",
        }
    }

    /// Worker count used when the config does not set one.
    pub fn default_workers(&self) -> usize {
        match self {
            Scenario::WaitAllUnbuffered | Scenario::WaitAllDrain => 10,
            Scenario::WaitAllBuffered => 100,
            Scenario::ClosingTooEarly => 2,
            Scenario::OkBuffered | Scenario::DeadlockUnbuffered | Scenario::SendOnClosed => 0,
        }
    }

    /// Run the scenario to completion.
    pub fn run(&self, config: &ScenarioConfig) -> Result<ScenarioReport, ScenarioError> {
        let start = Instant::now();
        let workers = config.workers.unwrap_or_else(|| self.default_workers());
        log::info!("{self}: starting with {workers} workers");

        let mut caught = Vec::new();
        let (outcome, completions) = match self {
            Scenario::OkBuffered => {
                let done = Channel::new(1);
                done.send(false).map_err(|_| ScenarioError::ClosedChannel)?;
                let completions = usize::from(done.recv().is_some());
                log::info!("{self}: execution success");
                (Outcome::Completed, completions)
            }
            Scenario::DeadlockUnbuffered => {
                let outcome = run_with_deadline(
                    || {
                        let done = Channel::new(0);
                        if done.send(false).is_ok() {
                            done.recv();
                        }
                    },
                    config.deadline,
                );
                if outcome.is_timed_out() {
                    log::info!("{self}: blocked as expected, sender abandoned");
                }
                (outcome, usize::from(outcome.is_completed()))
            }
            Scenario::WaitAllUnbuffered => {
                let work = config.work;
                let completions =
                    CountedReceive::unbuffered().wait_for(workers, |_| simulated_work(work))?;
                (Outcome::Completed, completions)
            }
            Scenario::WaitAllBuffered => {
                let work = config.work;
                let completions = wait_for_all_via_channel(workers, |_| simulated_work(work))?;
                (Outcome::Completed, completions)
            }
            Scenario::WaitAllDrain => {
                let work = config.work;
                let drained = CloseAndDrain.drain_for(workers, |_| simulated_work(work))?;
                log::info!("{self}: drained {drained:?}");
                (Outcome::Completed, drained.len())
            }
            Scenario::ClosingTooEarly => {
                let done: Channel<()> = Channel::new(2);
                let handles: Vec<_> = (0..workers)
                    .map(|index| {
                        Worker::new(index, simulated_work(config.work), (), done.clone()).spawn()
                    })
                    .collect();
                done.close()?;

                let completions = (0..workers)
                    .filter(|_| {
                        let (_, closed) = done.recv_or_default();
                        !closed
                    })
                    .count();
                log::info!("{self}: {completions} of {workers} receives got a real value");

                for handle in handles {
                    if let Err(err) = handle.join() {
                        caught.push(ScenarioError::Worker(err));
                    }
                }
                (Outcome::Completed, completions)
            }
            Scenario::SendOnClosed => {
                let done = Channel::new(2);
                done.close()?;
                let completions = match done.send(true) {
                    Ok(()) => usize::from(done.recv().is_some()),
                    Err(err) => {
                        log::warn!("{self}: {err}");
                        caught.push(ScenarioError::ClosedChannel);
                        0
                    }
                };
                (Outcome::Completed, completions)
            }
        };

        let report = ScenarioReport {
            scenario: *self,
            outcome,
            completions,
            caught,
            elapsed: start.elapsed(),
        };
        log::info!("{report}");
        Ok(report)
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown scenario `{0}`")]
pub struct ParseScenarioError(pub String);

impl FromStr for Scenario {
    type Err = ParseScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.name() == s)
            .ok_or_else(|| ParseScenarioError(s.to_string()))
    }
}

/// Parameters shared by all scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScenarioConfig {
    /// Overrides [`Scenario::default_workers`].
    pub workers: Option<usize>,
    /// How long each simulated task takes.
    pub work: Duration,
    /// How long to wait before declaring a deadlock.
    pub deadline: Duration,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        ScenarioConfig {
            workers: None,
            work: Duration::from_secs(1),
            deadline: Duration::from_secs(2),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScenarioError {
    #[error("send on closed channel")]
    ClosedChannel,
    #[error(transparent)]
    DoubleClose(#[from] CloseError),
    #[error(transparent)]
    Worker(#[from] WorkerError),
}

/// What a scenario observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioReport {
    pub scenario: Scenario,
    pub outcome: Outcome,
    /// Completion signals received by the initiating thread.
    pub completions: usize,
    /// Expected failures caught at the scenario boundary.
    pub caught: Vec<ScenarioError>,
    pub elapsed: Duration,
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} with {} completions, {} caught errors, took {:?}",
            self.scenario,
            self.outcome,
            self.completions,
            self.caught.len(),
            self.elapsed
        )
    }
}
