//! The `export` command: load a graph, run one built-in definition, write files.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, info, info_span, trace};

use sdtm_core::{
    ChildOrdering, Dataset, DomainObject, ExportDefinition, Exporter, MemoryObject, load_graph,
};
use sdtm_model::{ExportError, FlatRecord, Variable};
use sdtm_report::{CsvOptions, DatasetJsonOptions, render_csv, render_dataset_json, write_atomic};
use sdtm_standards::{StandardDomain, ae, cm, dm};

use crate::logging::redact_value;
use crate::types::{DomainSummary, ExportResult, OutputPaths};

/// File formats an export can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }
}

/// Everything the `export` command needs, already parsed from the command line.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub domain: StandardDomain,
    pub graph: PathBuf,
    pub output_dir: PathBuf,
    pub formats: Vec<OutputFormat>,
    pub child_ordering: ChildOrdering,
    pub csv: CsvOptions,
    pub json: DatasetJsonOptions,
}

impl ExportRequest {
    pub fn new(
        domain: StandardDomain,
        graph: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            domain,
            graph: graph.into(),
            output_dir: output_dir.into(),
            formats: vec![OutputFormat::Csv, OutputFormat::Json],
            child_ordering: ChildOrdering::default(),
            csv: CsvOptions::default(),
            json: DatasetJsonOptions::default(),
        }
    }

    /// `<output_dir>/<domain>.<ext>`, domain in lowercase.
    pub fn output_path(&self, format: OutputFormat) -> PathBuf {
        self.output_dir.join(format!(
            "{}.{}",
            self.domain.code().to_lowercase(),
            format.extension()
        ))
    }
}

/// Runs one export request end to end.
///
/// # Errors
///
/// Fails when the graph cannot be loaded, the traversal or rendering fails,
/// or a file cannot be written. Every requested format is rendered before
/// the first file is written, so a rendering failure writes nothing.
pub fn run_export(request: &ExportRequest) -> Result<ExportResult> {
    let span = info_span!("run_export", domain = %request.domain);
    let _guard = span.enter();
    let start = Instant::now();

    let root = load_graph(&request.graph)
        .with_context(|| format!("load object graph {}", request.graph.display()))?;
    debug!(
        graph = %request.graph.display(),
        root_type = root.record_type(),
        root = %root.identity(),
        "graph loaded"
    );

    let summary = match request.domain {
        StandardDomain::Dm => export_domain(dm::definition()?, &root, request)?,
        StandardDomain::Ae => export_domain(ae::definition()?, &root, request)?,
        StandardDomain::Cm => export_domain(cm::definition()?, &root, request)?,
    };

    info!(
        domain = %request.domain,
        records = summary.records,
        duration_ms = start.elapsed().as_millis(),
        "export finished"
    );
    Ok(ExportResult {
        study: root.identity().to_string(),
        output_dir: request.output_dir.clone(),
        domains: vec![summary],
    })
}

fn export_domain<V: Variable>(
    definition: ExportDefinition<V, MemoryObject>,
    root: &MemoryObject,
    request: &ExportRequest,
) -> Result<DomainSummary> {
    let definition = definition.with_child_ordering(request.child_ordering);
    let exporter = Exporter::new(&definition, root.clone());
    let dataset = exporter
        .export()
        .with_context(|| format!("export {}", request.domain))?;
    trace_records(&dataset);

    let mut rendered = Vec::with_capacity(request.formats.len());
    for format in &request.formats {
        let bytes = match format {
            OutputFormat::Csv => render_csv(&dataset, &request.csv).map_err(ExportError::from),
            OutputFormat::Json => render_dataset_json(&dataset, &request.json),
        }
        .with_context(|| format!("render {} as {}", request.domain, format.extension()))?;
        rendered.push((*format, bytes));
    }

    let mut outputs = OutputPaths::default();
    for (format, bytes) in rendered {
        let path = request.output_path(format);
        write_atomic(&path, &bytes).with_context(|| format!("write {}", path.display()))?;
        info!(
            domain = %dataset.domain(),
            path = %path.display(),
            records = dataset.len(),
            "wrote {}",
            format.extension()
        );
        match format {
            OutputFormat::Csv => outputs.csv = Some(path),
            OutputFormat::Json => outputs.json = Some(path),
        }
    }

    Ok(DomainSummary {
        domain_code: dataset.domain().to_string(),
        description: dataset.label().to_string(),
        records: dataset.len(),
        outputs,
    })
}

fn trace_records<V: Variable>(dataset: &Dataset<V>) {
    for record in dataset.records() {
        let values = describe_record(record);
        trace!(
            domain = %dataset.domain(),
            source = %record.source(),
            sequence = record.sequence(),
            values = redact_value(&values),
            "record"
        );
    }
}

fn describe_record<V: Variable>(record: &FlatRecord<V>) -> String {
    record
        .iter()
        .map(|(variable, value)| format!("{}={value}", variable.name()))
        .collect::<Vec<_>>()
        .join(" ")
}

