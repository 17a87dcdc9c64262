use clap::Parser;
use handoff::scenarios::{Scenario, ScenarioConfig};
use std::process::ExitCode;
use std::time::{Duration, Instant};

/// Run channel scenarios and report what each one observed.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Scenario to run. Repeat to run several; runs all of them when omitted.
    #[arg(short, long = "scenario", value_name = "NAME")]
    scenarios: Vec<Scenario>,

    /// Number of workers, overriding each scenario's default.
    #[arg(short, long)]
    workers: Option<usize>,

    /// Duration of each simulated task in milliseconds.
    #[arg(long, default_value_t = 1000)]
    work_ms: u64,

    /// How long to wait before declaring a deadlock, in milliseconds.
    #[arg(long, default_value_t = 2000)]
    deadline_ms: u64,
}

fn main() -> ExitCode {
    pretty_env_logger::init();
    let args = Args::parse();

    let config = ScenarioConfig {
        workers: args.workers,
        work: Duration::from_millis(args.work_ms),
        deadline: Duration::from_millis(args.deadline_ms),
    };
    let scenarios = if args.scenarios.is_empty() {
        Scenario::ALL.to_vec()
    } else {
        args.scenarios
    };

    let start = Instant::now();
    let mut failed = false;
    for scenario in scenarios {
        match scenario.run(&config) {
            Ok(report) => {
                println!("{report}");
                for err in &report.caught {
                    println!("  caught: {err}");
                }
            }
            Err(err) => {
                log::error!("{scenario}: {err}");
                failed = true;
            }
        }
    }
    log::info!("took {:?}", start.elapsed());

    // Workers and senders abandoned by a scenario are not waited for.
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
