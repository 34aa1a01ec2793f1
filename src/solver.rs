use std::process::{Command, ExitStatus, Stdio};

use anyhow::Context;
use camino::{Utf8Path as Path, Utf8PathBuf as PathBuf};
use tracing::{info, instrument};

use crate::error::BenchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    pub code: Option<i32>,
}

impl ExitOutcome {
    pub const SUCCESS: ExitOutcome = ExitOutcome { code: Some(0) };

    pub fn success(&self) -> bool {
        *self == Self::SUCCESS
    }
}

impl From<ExitStatus> for ExitOutcome {
    fn from(status: ExitStatus) -> Self {
        Self {
            code: status.code(),
        }
    }
}

pub trait Solver {
    /// Runs the solver on `dataset_dir`, blocking until it exits.
    fn run(&self, dataset_dir: &Path, solutions: &Path) -> anyhow::Result<ExitOutcome>;

    fn check(&self) -> Result<(), BenchError> {
        Ok(())
    }
}

/// External solver executable. Output streams are inherited, so its progress shows up live.
#[derive(Debug, Clone)]
pub struct ProcessSolver {
    pub binary: PathBuf,
    pub dataset_flag: String,
    pub solutions_flag: String,
}

impl ProcessSolver {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            dataset_flag: "--dataset".to_owned(),
            solutions_flag: "--solutions".to_owned(),
        }
    }

    fn command(&self, dataset_dir: &Path, solutions: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(&self.dataset_flag)
            .arg(dataset_dir)
            .arg(&self.solutions_flag)
            .arg(solutions)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        cmd
    }
}

impl Solver for ProcessSolver {
    fn run(&self, dataset_dir: &Path, solutions: &Path) -> anyhow::Result<ExitOutcome> {
        let status = match self.command(dataset_dir, solutions).status() {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BenchError::SolverNotFound(self.binary.clone()).into())
            }
            result => result.with_context(|| format!("Couldn't start solver '{}'", self.binary))?,
        };
        Ok(status.into())
    }

    fn check(&self) -> Result<(), BenchError> {
        if is_executable(&self.binary) {
            Ok(())
        } else {
            Err(BenchError::SolverNotFound(self.binary.clone()))
        }
    }
}

fn is_executable(path: &Path) -> bool {
    match path.metadata() {
        Ok(metadata) => metadata.is_file() && has_exec_bit(&metadata),
        Err(_) => false,
    }
}

#[cfg(unix)]
fn has_exec_bit(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn has_exec_bit(_metadata: &std::fs::Metadata) -> bool {
    true
}

/// Runs the solver once and turns a failed exit into [`BenchError::SolverExecution`].
#[instrument(skip(solver))]
pub fn run_solver(
    solver: &impl Solver,
    dataset_dir: &Path,
    solutions: &Path,
) -> Result<(), BenchError> {
    let outcome = solver
        .run(dataset_dir, solutions)
        .map_err(|e| e.downcast::<BenchError>().unwrap_or_else(BenchError::Other))?;
    if !outcome.success() {
        return Err(BenchError::SolverExecution { code: outcome.code });
    }
    info!("Solver finished successfully");
    Ok(())
}
