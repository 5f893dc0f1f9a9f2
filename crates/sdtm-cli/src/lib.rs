//! CLI library components for the SDTM exporter.

pub mod export;
pub mod logging;
pub mod types;
