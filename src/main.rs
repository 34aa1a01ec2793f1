// RCPSP benchmark runner.
// Copyright (C) 2024 The rcpsp-bench authors

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use crate::cli::Args;
use crate::error::BenchError;
use crate::pipeline::{run_benchmark, BenchSummary};
use crate::solver::ProcessSolver;
use crate::toolchain::{CargoToolchain, NoBuild};

mod cli;
mod config;
mod error;
mod pipeline;
mod report;
mod solver;
mod storage;
mod toolchain;
mod util;

fn setup_tracing() -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::builder().parse_lossy(
        std::env::var(tracing_subscriber::EnvFilter::DEFAULT_ENV).unwrap_or("info".to_string()),
    );
    let fmt = tracing_subscriber::fmt::layer()
        .compact()
        .with_target(false)
        .with_filter(env_filter);
    tracing_subscriber::registry().with(fmt).try_init()?;
    Ok(())
}

fn run(args: &Args) -> Result<BenchSummary, BenchError> {
    let config = args.to_config()?;
    let solver = ProcessSolver {
        dataset_flag: args.dataset_flag.clone(),
        solutions_flag: args.solutions_flag.clone(),
        ..ProcessSolver::new(args.solver_bin.clone())
    };
    if args.skip_build || args.dry_run {
        run_benchmark(&config, &NoBuild, &solver)
    } else {
        run_benchmark(&config, &CargoToolchain::new(args.manifest_dir.clone()), &solver)
    }
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let args = Args::parse();
    if let Err(e) = setup_tracing() {
        eprintln!("Couldn't initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(summary) if summary.dry_run => {
            tracing::info!(
                "Dry run complete: {} of {} open instances available",
                summary.linked,
                summary.open
            );
            ExitCode::SUCCESS
        }
        Ok(summary) => {
            tracing::info!("Benchmarking complete on {} instances", summary.linked);
            tracing::info!("Results saved in '{}'", summary.results_file);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}
