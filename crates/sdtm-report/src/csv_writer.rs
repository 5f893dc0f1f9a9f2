//! CSV rendering.
//!
//! The default layout is one header row of column names in variable order,
//! then one row per record. The transposed layout writes a single record as
//! `Name,Value,Description` lines, one per variable.

use std::io::Write;

use csv::WriterBuilder;
use sdtm_core::Dataset;
use sdtm_model::{ExportError, SerializationError, Variable};

use crate::common::coerce_cell;

const FORMAT: &str = "CSV";

/// Options for CSV output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvOptions {
    /// Single-cell line written before the header.
    pub disclaimer: Option<String>,
    /// Write the single exported record as one `Name,Value,Description` line per variable.
    pub transpose: bool,
}

impl CsvOptions {
    #[must_use]
    pub fn with_disclaimer(mut self, text: impl Into<String>) -> Self {
        self.disclaimer = Some(text.into());
        self
    }

    #[must_use]
    pub fn transposed(mut self) -> Self {
        self.transpose = true;
        self
    }
}

/// Renders a dataset to CSV bytes.
pub fn render_csv<V: Variable>(
    dataset: &Dataset<V>,
    options: &CsvOptions,
) -> Result<Vec<u8>, SerializationError> {
    let rows = build_rows(dataset, options)?;
    let mut buffer = Vec::new();
    encode_rows(&rows, options, &mut buffer)
        .map_err(|error| SerializationError::encode(FORMAT, error))?;
    Ok(buffer)
}

/// Writes a dataset as CSV to any writer.
///
/// Every value is coerced before anything is written, so a coercion failure
/// leaves `writer` untouched. A failing writer surfaces as
/// [`ExportError::Write`] with the original `io::Error`.
pub fn write_csv<V: Variable, W: Write>(
    dataset: &Dataset<V>,
    options: &CsvOptions,
    writer: W,
) -> Result<(), ExportError> {
    let rows = build_rows(dataset, options)?;
    encode_rows(&rows, options, writer).map_err(csv_error)
}

fn build_rows<V: Variable>(
    dataset: &Dataset<V>,
    options: &CsvOptions,
) -> Result<Vec<Vec<String>>, SerializationError> {
    if options.transpose {
        transposed_rows(dataset)
    } else {
        tabular_rows(dataset)
    }
}

fn encode_rows<W: Write>(
    rows: &[Vec<String>],
    options: &CsvOptions,
    writer: W,
) -> Result<(), csv::Error> {
    let mut csv = WriterBuilder::new().flexible(true).from_writer(writer);
    if let Some(disclaimer) = &options.disclaimer {
        csv.write_record([disclaimer.as_str()])?;
    }
    for row in rows {
        csv.write_record(row)?;
    }
    csv.flush()?;
    Ok(())
}

fn csv_error(error: csv::Error) -> ExportError {
    if !error.is_io_error() {
        return SerializationError::encode(FORMAT, error).into();
    }
    match error.into_kind() {
        csv::ErrorKind::Io(source) => ExportError::Write(source),
        other => SerializationError::encode(FORMAT, format!("{other:?}")).into(),
    }
}

fn tabular_rows<V: Variable>(dataset: &Dataset<V>) -> Result<Vec<Vec<String>>, SerializationError> {
    let mut rows = Vec::with_capacity(dataset.len() + 1);
    rows.push(
        dataset
            .columns()
            .iter()
            .map(|variable| variable.name().to_string())
            .collect(),
    );
    for (index, record) in dataset.records().iter().enumerate() {
        let row = record
            .iter()
            .map(|(variable, value)| {
                coerce_cell(variable, value, index + 1).map(|cell| cell.to_csv_field())
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(row);
    }
    Ok(rows)
}

fn transposed_rows<V: Variable>(
    dataset: &Dataset<V>,
) -> Result<Vec<Vec<String>>, SerializationError> {
    let [record] = dataset.records() else {
        return Err(SerializationError::TransposeRowCount {
            count: dataset.len(),
        });
    };
    let mut rows = Vec::with_capacity(V::ALL.len() + 1);
    rows.push(vec![
        "Name".to_string(),
        "Value".to_string(),
        "Description".to_string(),
    ]);
    for (variable, value) in record.iter() {
        let cell = coerce_cell(variable, value, 1)?;
        rows.push(vec![
            variable.name().to_string(),
            cell.to_csv_field(),
            variable.label().to_string(),
        ]);
    }
    Ok(rows)
}
