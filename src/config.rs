use camino::Utf8PathBuf as PathBuf;

use crate::report::IdConvention;
use crate::storage::DatasetDir;

/// Everything a benchmark run needs to know, resolved once from the command line.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub dataset: DatasetDir,
    /// Name of the dir the solver gets to see, e.g. `j60.sm`
    pub dataset_name: String,
    pub solutions: PathBuf,
    pub results_file: PathBuf,
    pub convention: IdConvention,
    pub dry_run: bool,
}
