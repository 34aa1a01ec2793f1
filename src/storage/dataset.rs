use camino::{Utf8Path as Path, Utf8PathBuf as PathBuf};

use crate::report::InstanceId;

/// A flat directory with one `<instance>.<extension>` file per instance.
#[derive(Debug, Clone)]
pub struct DatasetDir {
    pub root: PathBuf,
    pub extension: String,
}

impl DatasetDir {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn file_name(&self, id: &InstanceId) -> String {
        id.file_name(&self.extension)
    }

    pub fn instance_path(&self, id: &InstanceId) -> PathBuf {
        self.root.join(self.file_name(id))
    }

    /// Returns the path of the instance file if it exists.
    pub fn locate(&self, id: &InstanceId) -> Option<PathBuf> {
        let path = self.instance_path(id);
        path.is_file().then_some(path)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
