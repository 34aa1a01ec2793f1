use anyhow::Context;
use camino::Utf8PathBuf as PathBuf;
use tracing::{info, instrument};

use crate::config::BenchConfig;
use crate::error::BenchError;
use crate::report;
use crate::solver::{run_solver, Solver};
use crate::storage::FilteredDataset;
use crate::toolchain::Toolchain;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchSummary {
    pub open: usize,
    pub linked: usize,
    pub results_file: PathBuf,
    pub dry_run: bool,
}

/// Selects the open instances of the report and runs the solver on exactly those.
///
/// The filtered dataset lives until the end of this function, so its temp dir is gone
/// by the time the result is returned, whatever the outcome.
#[instrument(skip_all, fields(report = %config.solutions, dataset = %config.dataset.root()))]
pub fn run_benchmark(
    config: &BenchConfig,
    toolchain: &impl Toolchain,
    solver: &impl Solver,
) -> Result<BenchSummary, BenchError> {
    info!("Parsing {}", config.solutions);
    let open = report::load_open_instances(&config.solutions, &config.convention)?;
    if open.is_empty() {
        return Err(BenchError::NoOpenInstances(config.solutions.clone()));
    }
    info!("Total number of open instances: {}", open.len());

    if !config.dry_run {
        toolchain.build()?;
        solver.check()?;
    }

    let filtered = FilteredDataset::build(&open, &config.dataset, &config.dataset_name)?;
    let verb = if config.dry_run { "Would run" } else { "Running" };
    info!(
        "Executing solver on {} instances staged under '{}'",
        filtered.linked().len(),
        filtered.root()
    );
    for id in filtered.linked() {
        info!("{verb}: {id}");
    }

    if !config.dry_run {
        if let Some(parent) = config.results_file.parent().filter(|dir| !dir.as_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Couldn't create results dir '{parent}'"))?;
        }
        run_solver(solver, filtered.dir(), &config.solutions)?;
    }

    Ok(BenchSummary {
        open: open.len(),
        linked: filtered.linked().len(),
        results_file: config.results_file.clone(),
        dry_run: config.dry_run,
    })
}
