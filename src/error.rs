use camino::Utf8PathBuf as PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum BenchError {
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Bounds report '{0}' is missing")]
    MissingFile(PathBuf),
    #[error("Couldn't read bounds report '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("No open instances (LB < UB) found in '{0}'")]
    NoOpenInstances(PathBuf),
    #[error("Failed to build solver:\n{0}")]
    BuildFailure(String),
    #[error("Solver binary not found at '{0}'")]
    SolverNotFound(PathBuf),
    #[error("None of the {open} open instances were found in '{dataset_dir}'")]
    NoMatchingInstances { open: usize, dataset_dir: PathBuf },
    #[error("Solver exited with {}", describe_code(.code))]
    SolverExecution { code: Option<i32> },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BenchError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 10,
            Self::MissingFile(_) => 3,
            Self::Io { .. } => 4,
            Self::NoOpenInstances(_) => 5,
            Self::BuildFailure(_) => 6,
            Self::SolverNotFound(_) => 7,
            Self::NoMatchingInstances { .. } => 8,
            Self::SolverExecution { code: Some(_) } => 9,
            Self::SolverExecution { code: None } => 1,
            Self::Other(_) => 1,
        }
    }
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_owned(),
    }
}
