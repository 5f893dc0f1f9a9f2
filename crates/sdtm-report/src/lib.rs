//! Record materialization for SDTM exports.
//!
//! This crate renders exported datasets in two formats:
//!
//! - **CSV**: header row plus one row per record, or the transposed
//!   single-record layout
//! - **Dataset-JSON**: CDISC Dataset-JSON 1.0 item group
//!
//! [`ExportOutput`] adds `export_to_csv` / `export_to_json` to
//! [`sdtm_core::Exporter`].

mod common;
mod csv_writer;
mod dataset_json;
mod output;

pub use common::{
    Cell, VariableTypeExt, coerce_cell, is_iso_date, is_iso_datetime, write_atomic,
};
pub use csv_writer::{CsvOptions, render_csv, write_csv};
pub use dataset_json::{
    ClinicalData, DATASET_JSON_VERSION, DatasetJson, DatasetJsonOptions, ItemDef, ItemGroup,
    build_dataset_json, render_dataset_json, write_dataset_json,
};
pub use output::{ExportOutput, WrittenOutput, write_csv_file, write_dataset_json_file};
