pub mod dataset;
pub mod filtered;
pub mod guard;

pub use dataset::DatasetDir;
pub use filtered::FilteredDataset;
