use std::path::PathBuf;

/// Outcome of one `export` invocation.
#[derive(Debug)]
pub struct ExportResult {
    pub study: String,
    pub output_dir: PathBuf,
    pub domains: Vec<DomainSummary>,
}

#[derive(Debug)]
pub struct DomainSummary {
    pub domain_code: String,
    pub description: String,
    pub records: usize,
    pub outputs: OutputPaths,
}

/// Files written for one domain; `None` when the format was not requested.
#[derive(Debug, Default)]
pub struct OutputPaths {
    pub csv: Option<PathBuf>,
    pub json: Option<PathBuf>,
}
