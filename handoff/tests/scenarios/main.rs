// Integration tests running every scenario with short timings.

use handoff::scenarios::{ParseScenarioError, Scenario, ScenarioConfig, ScenarioError};
use handoff::{Outcome, WorkerError};
use pretty_assertions::assert_eq;
use std::time::Duration;

fn quick() -> ScenarioConfig {
    ScenarioConfig {
        workers: None,
        work: Duration::from_millis(20),
        deadline: Duration::from_millis(300),
    }
}

#[test_log::test]
fn ok_buffered_receives_its_own_send() {
    let report = Scenario::OkBuffered.run(&quick()).unwrap();
    assert_eq!(report.outcome, Outcome::Completed);
    assert_eq!(report.completions, 1);
    assert!(report.caught.is_empty());
}

#[test_log::test]
fn deadlock_unbuffered_times_out() {
    let report = Scenario::DeadlockUnbuffered.run(&quick()).unwrap();
    assert_eq!(report.outcome, Outcome::TimedOut);
    assert_eq!(report.completions, 0);
    assert!(report.elapsed >= Duration::from_millis(300));
}

#[test_log::test]
fn wait_all_scenarios_see_every_worker() {
    for (scenario, expected) in [
        (Scenario::WaitAllUnbuffered, 10),
        (Scenario::WaitAllBuffered, 100),
        (Scenario::WaitAllDrain, 10),
    ] {
        let report = scenario.run(&quick()).unwrap();
        assert_eq!(report.outcome, Outcome::Completed, "{scenario}");
        assert_eq!(report.completions, expected, "{scenario}");
        assert!(report.caught.is_empty(), "{scenario}");
    }
}

#[test_log::test]
fn worker_count_can_be_overridden() {
    let config = ScenarioConfig {
        workers: Some(3),
        ..quick()
    };
    let report = Scenario::WaitAllDrain.run(&config).unwrap();
    assert_eq!(report.completions, 3);
}

#[test_log::test]
fn closing_too_early_fails_the_workers() {
    let config = ScenarioConfig {
        work: Duration::from_millis(200),
        ..quick()
    };
    let report = Scenario::ClosingTooEarly.run(&config).unwrap();
    assert_eq!(report.completions, 0);
    assert_eq!(
        report.caught,
        vec![
            ScenarioError::Worker(WorkerError::Closed { index: 0 }),
            ScenarioError::Worker(WorkerError::Closed { index: 1 }),
        ]
    );
}

#[test_log::test]
fn send_on_closed_is_caught() {
    let report = Scenario::SendOnClosed.run(&quick()).unwrap();
    assert_eq!(report.completions, 0);
    assert_eq!(report.caught, vec![ScenarioError::ClosedChannel]);
}

#[test]
fn scenario_names_parse_back() {
    for scenario in Scenario::ALL {
        assert_eq!(scenario.name().parse::<Scenario>(), Ok(scenario));
    }
    assert_eq!(
        "select-forever".parse::<Scenario>(),
        Err(ParseScenarioError("select-forever".to_string()))
    );
}
