use camino::{Utf8Path as Path, Utf8PathBuf as PathBuf};
use clap::Parser;

use crate::config::BenchConfig;
use crate::error::BenchError;
use crate::report::IdConvention;
use crate::storage::DatasetDir;

#[derive(Parser, Debug, Clone)]
#[command(version, about = "Runs the solver on the instances whose optimum is still open")]
pub struct Args {
    /// Directory with one file per instance
    #[clap(long, env, value_name = "DIR", default_value = "data/j60.sm")]
    pub dataset_dir: PathBuf,

    /// Bounds report listing LB and UB per instance
    #[clap(long, env, value_name = "FILE", default_value = "data/j60hrs.sm")]
    pub solutions: PathBuf,

    /// Solver executable, produced by the build step
    #[clap(long, env, value_name = "FILE", default_value = "./target/release/super_solver")]
    pub solver_bin: PathBuf,

    /// Where the solver writes its results
    #[clap(long, env, value_name = "FILE", default_value = "results/resultats_finaux.txt")]
    pub results_file: PathBuf,

    /// Directory to run the release build in
    #[clap(long, env, value_name = "DIR", default_value = ".")]
    pub manifest_dir: PathBuf,

    /// Use the existing solver binary instead of rebuilding it
    #[clap(long, env)]
    pub skip_build: bool,

    /// Only show which instances would be run
    #[clap(long, env)]
    pub dry_run: bool,

    /// Name the solver sees for the dataset (defaults to the last component of --dataset-dir)
    #[clap(long, env)]
    pub dataset_name: Option<String>,

    /// Instance file extension (defaults to the extension of the dataset name)
    #[clap(long, env)]
    pub extension: Option<String>,

    /// Prefix of instance names (defaults to the dataset name without extension)
    #[clap(long, env)]
    pub instance_prefix: Option<String>,

    #[clap(long, env, default_value = "_")]
    pub id_separator: String,

    /// Report column holding the instance group
    #[clap(long, env, default_value_t = 0)]
    pub group_column: usize,

    /// Report column holding the instance number within its group
    #[clap(long, env, default_value_t = 1)]
    pub instance_column: usize,

    #[clap(long, env, hide(true), default_value = "--dataset")]
    pub dataset_flag: String,

    #[clap(long, env, hide(true), default_value = "--solutions")]
    pub solutions_flag: String,
}

impl Args {
    pub fn to_config(&self) -> Result<BenchConfig, BenchError> {
        let dataset_name = match &self.dataset_name {
            Some(name) => name.clone(),
            None => self
                .dataset_dir
                .file_name()
                .map(str::to_owned)
                .ok_or_else(|| {
                    BenchError::Config(format!(
                        "Couldn't derive dataset name from '{}', pass --dataset-name",
                        self.dataset_dir
                    ))
                })?,
        };
        let name_path = Path::new(&dataset_name);
        let extension = self
            .extension
            .clone()
            .or_else(|| name_path.extension().map(str::to_owned))
            .unwrap_or_default();
        let prefix = self
            .instance_prefix
            .clone()
            .or_else(|| name_path.file_stem().map(str::to_owned))
            .unwrap_or_default();

        Ok(BenchConfig {
            dataset: DatasetDir::new(self.dataset_dir.clone(), extension),
            dataset_name,
            solutions: self.solutions.clone(),
            results_file: self.results_file.clone(),
            convention: IdConvention {
                separator: self.id_separator.clone(),
                group_column: self.group_column,
                instance_column: self.instance_column,
                ..IdConvention::with_prefix(prefix)
            },
            dry_run: self.dry_run,
        })
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::Args;
    use crate::error::BenchError;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["bench"]).unwrap();
        assert!(!args.skip_build);
        let config = args.to_config().unwrap();
        assert_eq!(config.dataset_name, "j60.sm");
        assert_eq!(config.dataset.extension, "sm");
        assert_eq!(config.dataset.root, "data/j60.sm");
        assert_eq!(config.convention.prefix, "j60");
        assert_eq!(config.convention.separator, "_");
        assert_eq!(config.solutions, "data/j60hrs.sm");
        assert_eq!(config.results_file, "results/resultats_finaux.txt");
        assert!(!config.dry_run);
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "bench",
            "--dataset-dir",
            "/data/j120.sm/",
            "--solutions",
            "/data/j120hrs.sm",
            "--instance-prefix",
            "J",
            "--group-column",
            "1",
            "--instance-column",
            "0",
            "--dry-run",
        ])
        .unwrap();
        let config = args.to_config().unwrap();
        assert_eq!(config.dataset_name, "j120.sm");
        assert_eq!(config.dataset.extension, "sm");
        assert_eq!(config.convention.prefix, "J");
        assert_eq!(config.convention.group_column, 1);
        assert_eq!(config.convention.instance_column, 0);
        assert!(config.dry_run);
    }

    #[test]
    fn test_config_error_exit_code_differs_from_usage_error() {
        let usage = Args::try_parse_from(["bench", "--no-such-flag"]).unwrap_err();
        let args = Args::try_parse_from(["bench", "--dataset-dir", "/"]).unwrap();
        let config = args.to_config().unwrap_err();
        assert_ne!(i32::from(config.exit_code()), usage.exit_code());
    }

    #[test]
    fn test_underivable_dataset_name() {
        let args = Args::try_parse_from(["bench", "--dataset-dir", "/"]).unwrap();
        assert!(matches!(args.to_config(), Err(BenchError::Config(_))));

        let args =
            Args::try_parse_from(["bench", "--dataset-dir", "/", "--dataset-name", "rg300"])
                .unwrap();
        let config = args.to_config().unwrap();
        assert_eq!(config.dataset.extension, "");
        assert_eq!(config.convention.prefix, "rg300");
    }
}
