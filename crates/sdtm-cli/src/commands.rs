use std::path::{Path, PathBuf};

use anyhow::Result;
use comfy_table::Table;
use tracing::debug;

use sdtm_cli::export::{ExportRequest, OutputFormat, run_export};
use sdtm_cli::types::ExportResult;
use sdtm_core::ChildOrdering;
use sdtm_report::{CsvOptions, DatasetJsonOptions};
use sdtm_standards::StandardDomain;

use crate::cli::{ChildOrderArg, ExportArgs, OutputFormatArg};
use crate::summary::apply_table_style;

pub fn run_domains() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["Domain", "Description", "Path"]);
    apply_table_style(&mut table);
    for domain in StandardDomain::ALL {
        table.add_row(vec![
            domain.code().to_string(),
            domain.label().to_string(),
            domain.path().join(" > "),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_export_command(args: &ExportArgs) -> Result<ExportResult> {
    let request = build_request(args)?;
    debug!(?request, "export request");
    run_export(&request)
}

fn build_request(args: &ExportArgs) -> Result<ExportRequest> {
    let domain: StandardDomain = args.domain.parse()?;
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| default_output_dir(&args.graph));

    let mut request = ExportRequest::new(domain, &args.graph, output_dir);
    request.formats = format_outputs(args.format);
    request.child_ordering = match args.child_order {
        ChildOrderArg::Store => ChildOrdering::Store,
        ChildOrderArg::Identity => ChildOrdering::ByIdentity,
    };
    request.csv = CsvOptions {
        disclaimer: args.disclaimer.clone(),
        transpose: args.transpose,
    };
    request.json = DatasetJsonOptions {
        study_oid: args.study_oid.clone(),
        pretty: args.pretty,
        ..DatasetJsonOptions::default()
    };
    Ok(request)
}

fn default_output_dir(graph: &Path) -> PathBuf {
    match graph.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join("output"),
        _ => PathBuf::from("output"),
    }
}

fn format_outputs(format: OutputFormatArg) -> Vec<OutputFormat> {
    match format {
        OutputFormatArg::Csv => vec![OutputFormat::Csv],
        OutputFormatArg::Json => vec![OutputFormat::Json],
        OutputFormatArg::Both => vec![OutputFormat::Csv, OutputFormat::Json],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_dir_defaults_next_to_graph() {
        assert_eq!(
            default_output_dir(Path::new("data/study.json")),
            PathBuf::from("data/output")
        );
        assert_eq!(
            default_output_dir(Path::new("study.json")),
            PathBuf::from("output")
        );
    }

    #[test]
    fn both_formats_write_csv_first() {
        assert_eq!(
            format_outputs(OutputFormatArg::Both),
            vec![OutputFormat::Csv, OutputFormat::Json]
        );
    }
}
