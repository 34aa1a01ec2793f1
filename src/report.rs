//! Bounds reports list the best known lower and upper bound for every instance of a
//! benchmark suite, one instance per line:
//!
//! ```text
//! ***********************************
//! Par  Inst  ...  LB   UB
//! ***********************************
//!  1    1    ...  77   77
//!  1    2    ...  45   60
//! ```
//!
//! Only the two identifier columns and the trailing two bound columns are interpreted.
//! Everything else (headers, footers, commentary) is dropped line by line.

use camino::Utf8Path as Path;
use itertools::Itertools;
use tracing::{debug, instrument, trace};

use crate::error::BenchError;

const MIN_FIELDS: usize = 4;
const COMMENT_MARKERS: [char; 2] = ['*', '#'];

/// Canonical instance name, e.g. `j601_2`. Matches the file stem in the dataset directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    pub fn file_name(&self, extension: &str) -> String {
        if extension.is_empty() {
            self.0.clone()
        } else {
            format!("{}.{}", self.0, extension)
        }
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstanceId {
    fn from(value: &str) -> Self {
        InstanceId(value.to_owned())
    }
}

/// How identifiers are assembled from a report line: `<prefix><group><separator><instance>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdConvention {
    pub prefix: String,
    pub separator: String,
    pub group_column: usize,
    pub instance_column: usize,
}

impl IdConvention {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..Default::default()
        }
    }

    pub fn instance_id(&self, record: &BoundsRecord<'_>) -> InstanceId {
        InstanceId(format!(
            "{}{}{}{}",
            self.prefix, record.group, self.separator, record.instance
        ))
    }
}

impl Default for IdConvention {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            separator: "_".to_owned(),
            group_column: 0,
            instance_column: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundsRecord<'a> {
    pub group: &'a str,
    pub instance: &'a str,
    pub lower_bound: i128,
    pub upper_bound: i128,
}

impl BoundsRecord<'_> {
    pub fn is_open(&self) -> bool {
        self.lower_bound < self.upper_bound
    }
}

pub fn parse_line<'a>(line: &'a str, convention: &IdConvention) -> Option<BoundsRecord<'a>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with(COMMENT_MARKERS) {
        return None;
    }
    let fields = line.split_whitespace().collect_vec();
    if fields.len() < MIN_FIELDS {
        return None;
    }
    let group = *fields.get(convention.group_column)?;
    let instance = *fields.get(convention.instance_column)?;
    let lower_bound = parse_bound(fields[fields.len() - 2])?;
    let upper_bound = parse_bound(fields[fields.len() - 1])?;
    Some(BoundsRecord {
        group,
        instance,
        lower_bound,
        upper_bound,
    })
}

/// Optional sign, then digits with single `_` separators allowed between them (`1_000`).
fn parse_bound(field: &str) -> Option<i128> {
    let digits = field.strip_prefix(['+', '-']).unwrap_or(field);
    if digits.starts_with('_') || digits.ends_with('_') || digits.contains("__") {
        return None;
    }
    field.replace('_', "").parse().ok()
}

/// All well-formed records in report order. Malformed lines are absent from the output.
pub fn parse_records<'a>(
    text: &'a str,
    convention: &'a IdConvention,
) -> impl Iterator<Item = BoundsRecord<'a>> + 'a {
    text.lines().filter_map(move |line| {
        let record = parse_line(line, convention);
        if record.is_none() {
            trace!("Skipping report line '{}'", line.trim());
        }
        record
    })
}

pub fn open_instances(text: &str, convention: &IdConvention) -> Vec<InstanceId> {
    parse_records(text, convention)
        .filter(|record| record.is_open())
        .map(|record| convention.instance_id(&record))
        .collect()
}

/// Reads the report at `path` and returns the open instances in scan order.
/// An empty result is not an error here.
#[instrument(skip(convention), level = "debug")]
pub fn load_open_instances(
    path: &Path,
    convention: &IdConvention,
) -> Result<Vec<InstanceId>, BenchError> {
    if !path.exists() {
        return Err(BenchError::MissingFile(path.to_owned()));
    }
    let text = std::fs::read_to_string(path).map_err(|source| BenchError::Io {
        path: path.to_owned(),
        source,
    })?;
    let open = open_instances(&text, convention);
    debug!("Found {} open instances in '{}'", open.len(), path);
    Ok(open)
}
