//! CLI argument definitions for the SDTM exporter.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "sdtm-export",
    version,
    about = "Export a study object graph to SDTM domain datasets",
    long_about = "Export hierarchical study data to flat SDTM domain datasets.\n\n\
                  Reads an object graph from JSON, walks it with a built-in domain\n\
                  definition (DM, AE, CM) and writes CSV and/or Dataset-JSON 1.0."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include record values in trace logs (they may contain subject data).
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Export one domain from an object graph.
    Export(ExportArgs),

    /// List the built-in domains.
    Domains,
}

#[derive(Parser)]
pub struct ExportArgs {
    /// Domain code (DM, AE, CM), case-insensitive.
    #[arg(value_name = "DOMAIN")]
    pub domain: String,

    /// JSON document holding the object graph, rooted at the study.
    #[arg(value_name = "GRAPH_JSON")]
    pub graph: PathBuf,

    /// Output directory (default: `output/` next to the graph file).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format to generate.
    #[arg(long = "format", value_enum, default_value = "both")]
    pub format: OutputFormatArg,

    /// Order of child collections before sequence numbers are assigned.
    #[arg(long = "child-order", value_enum, default_value = "store")]
    pub child_order: ChildOrderArg,

    /// Write the CSV as Name,Value,Description lines (single-record exports only).
    #[arg(long = "transpose")]
    pub transpose: bool,

    /// Single-cell line written above the CSV header.
    #[arg(long = "disclaimer", value_name = "TEXT")]
    pub disclaimer: Option<String>,

    /// Pretty-print Dataset-JSON output.
    #[arg(long = "pretty")]
    pub pretty: bool,

    /// Study OID for Dataset-JSON (default: the root identity).
    #[arg(long = "study-oid", value_name = "OID")]
    pub study_oid: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Csv,
    Json,
    Both,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ChildOrderArg {
    /// Keep the order of the input document.
    Store,
    /// Sort siblings by identity.
    Identity,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
