//! File destinations and the `export_to_csv` / `export_to_json` operations.
//!
//! Each operation traverses, renders the whole document in memory and only
//! then writes it, so a failed export never leaves a file behind.

use std::path::{Path, PathBuf};

use sdtm_core::{Dataset, DomainObject, Exporter};
use sdtm_model::{Result, Variable};
use tracing::info;

use crate::common::write_atomic;
use crate::csv_writer::{CsvOptions, render_csv};
use crate::dataset_json::{DatasetJsonOptions, render_dataset_json};

/// A file written by an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenOutput {
    pub path: PathBuf,
    pub records: usize,
}

/// Writes a dataset to a CSV file.
pub fn write_csv_file<V: Variable>(
    dataset: &Dataset<V>,
    path: &Path,
    options: &CsvOptions,
) -> Result<WrittenOutput> {
    let bytes = render_csv(dataset, options)?;
    write_atomic(path, &bytes)?;
    info!(
        domain = %dataset.domain(),
        path = %path.display(),
        records = dataset.len(),
        "wrote CSV"
    );
    Ok(WrittenOutput {
        path: path.to_path_buf(),
        records: dataset.len(),
    })
}

/// Writes a dataset to a Dataset-JSON file.
pub fn write_dataset_json_file<V: Variable>(
    dataset: &Dataset<V>,
    path: &Path,
    options: &DatasetJsonOptions,
) -> Result<WrittenOutput> {
    let bytes = render_dataset_json(dataset, options)?;
    write_atomic(path, &bytes)?;
    info!(
        domain = %dataset.domain(),
        path = %path.display(),
        records = dataset.len(),
        "wrote Dataset-JSON"
    );
    Ok(WrittenOutput {
        path: path.to_path_buf(),
        records: dataset.len(),
    })
}

/// File output for an [`Exporter`].
///
/// Every call traverses the store again; nothing is cached between calls.
pub trait ExportOutput<O> {
    fn export_to_csv(&self, path: &Path, options: &CsvOptions) -> Result<WrittenOutput>;

    fn export_to_json(&self, path: &Path, options: &DatasetJsonOptions) -> Result<WrittenOutput>;

    /// Like [`ExportOutput::export_to_csv`], limited to the records below `node`.
    fn export_subtree_to_csv(
        &self,
        node: &O,
        path: &Path,
        options: &CsvOptions,
    ) -> Result<WrittenOutput>;

    fn export_subtree_to_json(
        &self,
        node: &O,
        path: &Path,
        options: &DatasetJsonOptions,
    ) -> Result<WrittenOutput>;
}

impl<V: Variable, O: DomainObject> ExportOutput<O> for Exporter<'_, V, O> {
    fn export_to_csv(&self, path: &Path, options: &CsvOptions) -> Result<WrittenOutput> {
        write_csv_file(&self.export()?, path, options)
    }

    fn export_to_json(&self, path: &Path, options: &DatasetJsonOptions) -> Result<WrittenOutput> {
        write_dataset_json_file(&self.export()?, path, options)
    }

    fn export_subtree_to_csv(
        &self,
        node: &O,
        path: &Path,
        options: &CsvOptions,
    ) -> Result<WrittenOutput> {
        write_csv_file(&self.export_subtree(node)?, path, options)
    }

    fn export_subtree_to_json(
        &self,
        node: &O,
        path: &Path,
        options: &DatasetJsonOptions,
    ) -> Result<WrittenOutput> {
        write_dataset_json_file(&self.export_subtree(node)?, path, options)
    }
}
