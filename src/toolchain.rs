use std::process::Command;

use camino::Utf8PathBuf as PathBuf;
use tracing::{info, instrument};

use crate::error::BenchError;

pub trait Toolchain {
    fn build(&self) -> Result<(), BenchError>;
}

/// Builds the solver with `cargo build --release`. Output is captured and only shown on failure.
#[derive(Debug, Clone)]
pub struct CargoToolchain {
    pub manifest_dir: PathBuf,
    pub program: String,
}

impl CargoToolchain {
    pub fn new(manifest_dir: impl Into<PathBuf>) -> Self {
        Self {
            manifest_dir: manifest_dir.into(),
            program: std::env::var("CARGO").unwrap_or_else(|_| "cargo".to_owned()),
        }
    }
}

impl Toolchain for CargoToolchain {
    #[instrument(skip_all, fields(dir = %self.manifest_dir))]
    fn build(&self) -> Result<(), BenchError> {
        info!("Building solver in release mode");
        let output = Command::new(&self.program)
            .args(["build", "--release"])
            .current_dir(&self.manifest_dir)
            .output()
            .map_err(|e| BenchError::BuildFailure(format!("Couldn't run '{}': {e}", self.program)))?;
        if output.status.success() {
            Ok(())
        } else {
            Err(BenchError::BuildFailure(
                String::from_utf8_lossy(&output.stderr).trim_end().to_owned(),
            ))
        }
    }
}

pub struct NoBuild;

impl Toolchain for NoBuild {
    fn build(&self) -> Result<(), BenchError> {
        Ok(())
    }
}
