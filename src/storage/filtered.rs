use std::collections::HashSet;

use anyhow::{anyhow, Context, Result};
use camino::{Utf8Path as Path, Utf8PathBuf as PathBuf};
use tracing::{debug, info, instrument};

use crate::error::BenchError;
use crate::report::InstanceId;

use super::guard::FsGuard;
use super::DatasetDir;

const TEMP_LABEL: &str = "rcpsp-bench";

/// Run-scoped view of a dataset that only exposes the selected instances.
///
/// Layout is `<temp root>/<dataset name>/<instance>.<ext>`, where every entry links back to
/// the source dataset. The solver derives the dataset identity from the nested dir name, so
/// [`FilteredDataset::dir`] is what gets passed to it, never the root.
/// Dropping the value removes the temp root with everything under it.
pub struct FilteredDataset {
    dir: PathBuf,
    linked: Vec<InstanceId>,
    // Dropped last
    guard: FsGuard,
}

impl FilteredDataset {
    #[instrument(skip_all, fields(source = %source.root(), dataset = dataset_name))]
    pub fn build(
        open_instances: &[InstanceId],
        source: &DatasetDir,
        dataset_name: &str,
    ) -> Result<Self, BenchError> {
        Self::stage(FsGuard::temp(TEMP_LABEL)?, open_instances, source, dataset_name)
    }

    /// Fills `guard`'s dir. On error the guard is dropped along with everything staged so far.
    fn stage(
        guard: FsGuard,
        open_instances: &[InstanceId],
        source: &DatasetDir,
        dataset_name: &str,
    ) -> Result<Self, BenchError> {
        let dir = nested_dir(guard.path(), dataset_name)?;
        std::fs::create_dir(&dir).with_context(|| format!("Couldn't create dir '{dir}'"))?;

        let mut seen = HashSet::new();
        let mut linked = Vec::new();
        for id in open_instances {
            if !seen.insert(id) {
                continue;
            }
            let Some(src) = source.locate(id) else {
                debug!("Instance {id} is not part of '{}', skipping", source.root());
                continue;
            };
            link_instance(&src, &dir.join(source.file_name(id)))?;
            linked.push(id.clone());
        }

        if linked.is_empty() {
            return Err(BenchError::NoMatchingInstances {
                open: open_instances.len(),
                dataset_dir: source.root().to_owned(),
            });
        }
        info!("Linked {} of {} open instances into '{dir}'", linked.len(), open_instances.len());
        Ok(Self { dir, linked, guard })
    }

    /// The dataset-named dir to hand to the solver.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn root(&self) -> &Path {
        self.guard.path()
    }

    /// Linked instances in report order, without duplicates.
    pub fn linked(&self) -> &[InstanceId] {
        &self.linked
    }
}

fn nested_dir(root: &Path, dataset_name: &str) -> Result<PathBuf> {
    let mut components = Path::new(dataset_name).components();
    match (components.next(), components.next()) {
        (Some(camino::Utf8Component::Normal(name)), None) => Ok(root.join(name)),
        _ => Err(anyhow!("Invalid dataset name '{dataset_name}'")),
    }
}

// Links must be absolute, a relative target would resolve against the temp dir
fn link_instance(src: &Path, dst: &Path) -> Result<()> {
    let target = src
        .canonicalize_utf8()
        .with_context(|| format!("Couldn't resolve instance file '{src}'"))?;
    #[cfg(unix)]
    std::os::unix::fs::symlink(&target, dst)
        .with_context(|| format!("Couldn't link '{target}' to '{dst}'"))?;
    #[cfg(not(unix))]
    std::fs::copy(&target, dst).with_context(|| format!("Couldn't copy '{target}' to '{dst}'"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use camino::{Utf8Path, Utf8PathBuf};
    use tempfile::TempDir;

    use crate::error::BenchError;
    use crate::report::InstanceId;
    use crate::storage::guard::FsGuard;
    use crate::storage::DatasetDir;

    use super::{FilteredDataset, TEMP_LABEL};

    fn dataset_with(files: &[&str]) -> (TempDir, DatasetDir) {
        let tmp = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(tmp.path()).unwrap().join("j60.sm");
        std::fs::create_dir(&root).unwrap();
        for name in files {
            std::fs::write(root.join(format!("{name}.sm")), format!("instance {name}")).unwrap();
        }
        (tmp, DatasetDir::new(root, "sm"))
    }

    fn ids(names: &[&str]) -> Vec<InstanceId> {
        names.iter().map(|&name| InstanceId::from(name)).collect()
    }

    fn entries(dir: &Utf8Path) -> Vec<String> {
        let mut names: Vec<String> = dir
            .read_dir_utf8()
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_links_only_existing_open_instances() {
        let (_tmp, source) = dataset_with(&["j601_1", "j601_2", "j601_3", "j602_1"]);
        let open = ids(&["j602_1", "j601_2", "j1201_1", "j601_2"]);

        let filtered = FilteredDataset::build(&open, &source, "j60.sm").unwrap();

        assert_eq!(filtered.dir().file_name(), Some("j60.sm"));
        assert_eq!(filtered.dir().parent(), Some(filtered.root()));
        assert_eq!(filtered.linked(), ids(&["j602_1", "j601_2"]).as_slice());
        assert_eq!(entries(filtered.dir()), vec!["j601_2.sm", "j602_1.sm"]);
        assert_eq!(entries(filtered.root()), vec!["j60.sm"]);

        let content = std::fs::read_to_string(filtered.dir().join("j601_2.sm")).unwrap();
        assert_eq!(content, "instance j601_2");
        // Source dataset is left untouched
        assert_eq!(entries(source.root()).len(), 4);
    }

    #[cfg(unix)]
    #[test]
    fn test_entries_are_symlinks() {
        let (_tmp, source) = dataset_with(&["j601_1"]);
        let filtered = FilteredDataset::build(&ids(&["j601_1"]), &source, "j60.sm").unwrap();
        let link = filtered.dir().join("j601_1.sm");
        assert!(link.symlink_metadata().unwrap().file_type().is_symlink());
        let target = Utf8PathBuf::try_from(std::fs::read_link(&link).unwrap()).unwrap();
        assert!(target.is_absolute());
        assert_eq!(
            target,
            source.instance_path(&InstanceId::from("j601_1")).canonicalize_utf8().unwrap()
        );
    }

    #[test]
    fn test_relative_source_dir() {
        let (_tmp, source) = dataset_with(&["j601_1"]);
        let cwd = Utf8PathBuf::try_from(std::env::current_dir().unwrap()).unwrap();
        let relative = pathdiff(source.root(), &cwd);
        let source = DatasetDir::new(relative, "sm");
        let filtered = FilteredDataset::build(&ids(&["j601_1"]), &source, "j60.sm").unwrap();
        assert_eq!(
            std::fs::read_to_string(filtered.dir().join("j601_1.sm")).unwrap(),
            "instance j601_1"
        );
    }

    // Walks up from `base` to the root, then down to `path`
    fn pathdiff(path: &Utf8Path, base: &Utf8Path) -> Utf8PathBuf {
        let mut relative = Utf8PathBuf::new();
        for _ in base.components().skip(1) {
            relative.push("..");
        }
        for component in path.components().skip(1) {
            relative.push(component);
        }
        relative
    }

    #[test]
    fn test_no_matching_instances() {
        let (_tmp, source) = dataset_with(&["j601_1"]);
        let open = ids(&["j1201_1", "j1201_2"]);
        let guard = FsGuard::temp(TEMP_LABEL).unwrap();
        let root = guard.path().to_owned();
        assert!(root.is_dir());
        let result = FilteredDataset::stage(guard, &open, &source, "j60.sm");
        // The temp root is gone even though staging failed
        assert!(!root.exists());
        match result {
            Err(BenchError::NoMatchingInstances { open, dataset_dir }) => {
                assert_eq!(open, 2);
                assert_eq!(dataset_dir, source.root());
            }
            Err(e) => panic!("unexpected error: {e}"),
            Ok(_) => panic!("expected no matching instances"),
        }
    }

    #[test]
    fn test_root_removed_on_drop() {
        let (_tmp, source) = dataset_with(&["j601_1"]);
        let filtered = FilteredDataset::build(&ids(&["j601_1"]), &source, "j60.sm").unwrap();
        let root = filtered.root().to_owned();
        assert!(root.is_dir());
        drop(filtered);
        assert!(!root.exists());
        // Source files survive the cleanup
        assert!(source.locate(&InstanceId::from("j601_1")).is_some());
    }

    #[test]
    fn test_invalid_dataset_name() {
        let (_tmp, source) = dataset_with(&["j601_1"]);
        for name in ["", "a/b", "..", "/abs"] {
            let guard = FsGuard::temp(TEMP_LABEL).unwrap();
            let root = guard.path().to_owned();
            assert!(
                matches!(
                    FilteredDataset::stage(guard, &ids(&["j601_1"]), &source, name),
                    Err(BenchError::Other(_))
                ),
                "name {name:?}"
            );
            assert!(!root.exists(), "name {name:?}");
        }
    }
}
