//! Entry point: parse arguments, build both cache configurations, run the
//! trace, and print the two counter reports.

use std::process::ExitCode;

use clap::Parser;

use cachesim2::config::{Cli, Config};
use cachesim2::error::SimError;
use cachesim2::metrics::report;
use cachesim2::simulator::Simulator;
use cachesim2::trace::TraceReader;

fn run() -> Result<String, SimError> {
    let cli = Cli::parse();
    let config = Config::try_from_cli(&cli)?;

    let trace = TraceReader::open(&config.trace_path)?;
    let mut simulator = Simulator::new(&config.l1, &config.l2);
    simulator.run(trace)?;

    let (no_prefetch, with_prefetch) = simulator.counters();
    Ok(report(no_prefetch, with_prefetch))
}

fn main() -> ExitCode {
    env_logger::init();

    match run() {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            // Diagnostics go to stdout, matching the reference simulator this
            // one stays counter-compatible with.
            println!("cachesim2: {err}");
            if err.is_configuration_error() {
                println!(
                    "usage: cachesim2 <L1_SIZE> <L1_ASSOC> <L1_POLICY> <L1_BLOCK_SIZE> \
                     <L2_SIZE> <L2_ASSOC> <L2_POLICY> <L2_BLOCK_SIZE> <TRACE_FILE>"
                );
            }
            ExitCode::FAILURE
        }
    }
}
