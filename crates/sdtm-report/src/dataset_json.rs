//! Dataset-JSON output generation.
//!
//! Follows the CDISC Dataset-JSON 1.0 layout: one item group per exported
//! domain under `clinicalData.itemGroupData`, keyed `IG.<DOMAIN>`, with the
//! column definitions in `items` and one array per record in `itemData`.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sdtm_core::Dataset;
use sdtm_model::{
    ConfigurationError, ExportError, Result, SerializationError, Variable, VariableType,
};

use crate::common::{Cell, coerce_cell};

/// Dataset-JSON version written into every document.
pub const DATASET_JSON_VERSION: &str = "1.0.0";

const FORMAT: &str = "Dataset-JSON";

/// Options for Dataset-JSON output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetJsonOptions {
    /// Defaults to the identity of the export's root instance.
    pub study_oid: Option<String>,
    /// Defaults to the study OID.
    pub metadata_version_oid: Option<String>,
    /// Omitted from the document when unset.
    pub creation_date_time: Option<DateTime<Utc>>,
    pub pretty: bool,
}

impl DatasetJsonOptions {
    #[must_use]
    pub fn with_study_oid(mut self, oid: impl Into<String>) -> Self {
        self.study_oid = Some(oid.into());
        self
    }

    #[must_use]
    pub fn created_at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.creation_date_time = Some(timestamp);
        self
    }

    #[must_use]
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetJson {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date_time: Option<String>,
    #[serde(rename = "datasetJSONVersion")]
    pub dataset_json_version: String,
    pub clinical_data: ClinicalData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalData {
    #[serde(rename = "studyOID")]
    pub study_oid: String,
    #[serde(rename = "metaDataVersionOID")]
    pub metadata_version_oid: String,
    pub item_group_data: BTreeMap<String, ItemGroup>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemGroup {
    pub records: usize,
    pub name: String,
    pub label: String,
    pub items: Vec<ItemDef>,
    pub item_data: Vec<Vec<serde_json::Value>>,
}

/// Column definition; `items` order is the column order of `itemData`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    #[serde(rename = "OID")]
    pub oid: String,
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub data_type: VariableType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
}

impl DatasetJson {
    /// The item group of the exported domain.
    pub fn item_group(&self) -> Option<&ItemGroup> {
        self.clinical_data.item_group_data.values().next()
    }
}

/// Builds the Dataset-JSON document for a dataset.
///
/// # Errors
///
/// Fails with a configuration error when the dataset has no label, and with
/// a serialization error when a value does not fit its declared type.
pub fn build_dataset_json<V: Variable>(
    dataset: &Dataset<V>,
    options: &DatasetJsonOptions,
) -> Result<DatasetJson> {
    let domain = dataset.domain().as_str();
    if dataset.label().trim().is_empty() {
        return Err(ConfigurationError::MissingLabel {
            domain: domain.to_string(),
        }
        .into());
    }

    let items = dataset
        .columns()
        .iter()
        .map(|variable| {
            let spec = variable.spec();
            ItemDef {
                oid: spec.oid(),
                name: spec.name.to_string(),
                label: spec.label.to_string(),
                data_type: spec.data_type,
                length: spec.length,
            }
        })
        .collect();

    let mut item_data = Vec::with_capacity(dataset.len());
    for (index, record) in dataset.records().iter().enumerate() {
        let row = record
            .iter()
            .map(|(variable, value)| coerce_cell(variable, value, index + 1).map(cell_to_json))
            .collect::<std::result::Result<Vec<_>, SerializationError>>()?;
        item_data.push(row);
    }

    let study_oid = options
        .study_oid
        .clone()
        .unwrap_or_else(|| dataset.root().to_string());
    let metadata_version_oid = options
        .metadata_version_oid
        .clone()
        .unwrap_or_else(|| study_oid.clone());

    let group = ItemGroup {
        records: dataset.len(),
        name: domain.to_string(),
        label: dataset.label().to_string(),
        items,
        item_data,
    };
    Ok(DatasetJson {
        creation_date_time: options
            .creation_date_time
            .map(|timestamp| timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)),
        dataset_json_version: DATASET_JSON_VERSION.to_string(),
        clinical_data: ClinicalData {
            study_oid,
            metadata_version_oid,
            item_group_data: BTreeMap::from([(format!("IG.{domain}"), group)]),
        },
    })
}

/// Renders a dataset to Dataset-JSON bytes.
pub fn render_dataset_json<V: Variable>(
    dataset: &Dataset<V>,
    options: &DatasetJsonOptions,
) -> Result<Vec<u8>> {
    let document = build_dataset_json(dataset, options)?;
    let mut bytes = if options.pretty {
        serde_json::to_vec_pretty(&document)
    } else {
        serde_json::to_vec(&document)
    }
    .map_err(|error| SerializationError::encode(FORMAT, error))?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Writes a dataset as Dataset-JSON to any writer.
///
/// The document is rendered before the first write; a failing writer
/// surfaces as [`ExportError::Write`] with the original `io::Error`.
pub fn write_dataset_json<V: Variable, W: Write>(
    dataset: &Dataset<V>,
    options: &DatasetJsonOptions,
    mut writer: W,
) -> Result<()> {
    let bytes = render_dataset_json(dataset, options)?;
    writer.write_all(&bytes).map_err(ExportError::Write)?;
    writer.flush().map_err(ExportError::Write)
}

fn cell_to_json(cell: Cell) -> serde_json::Value {
    match cell {
        Cell::Null => serde_json::Value::Null,
        Cell::Text(text) => serde_json::Value::String(text),
        Cell::Integer(number) => serde_json::Value::from(number),
        Cell::Float(number) => serde_json::Value::from(number),
        Cell::Boolean(flag) => serde_json::Value::Bool(flag),
    }
}
