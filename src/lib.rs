use std::path::Path;

use tracing::info;

pub mod common;
pub mod converter;
pub mod gateway;
pub mod legacy;
pub mod manifest;

pub use common::{Configuration, ConversionError, ResourceKey};
pub use converter::{convert_records, Conversion, ConversionReport};

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Result<T> = std::result::Result<T, Error>;

/// Converts a whole manifest stream. Nothing is returned unless every record converts.
pub fn convert(input: &str, configuration: &Configuration) -> std::result::Result<(String, ConversionReport), ConversionError> {
    let records = manifest::parse_manifest_stream(input)?;
    let Conversion { resources, report } = convert_records(records, configuration)?;
    Ok((manifest::serialize_records(&resources)?, report))
}

pub fn convert_file(input: &Path, output: &Path, configuration: &Configuration) -> Result<ConversionReport> {
    let content = std::fs::read_to_string(input).map_err(|e| format!("unable to read {}: {e}", input.display()))?;
    let (converted, report) = convert(&content, configuration)?;
    std::fs::write(output, converted).map_err(|e| format!("unable to write {}: {e}", output.display()))?;
    info!("Conversion successful. Output written to {}", output.display());
    Ok(report)
}
