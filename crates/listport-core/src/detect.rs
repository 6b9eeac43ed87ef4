use std::path::Path;

use tracing::debug;

use crate::error::FormatError;
use listport_models::ImportFormat;

/// Decide how an upload should be parsed.
///
/// Detection order: declared content type, then filename extension, then
/// content sniffing. `text/plain` and `.txt` fall through to sniffing so
/// pasted or renamed exports still import; anything else unrecognized is
/// rejected outright.
pub fn detect_format(
    text: &str,
    declared: Option<&str>,
    filename: Option<&str>,
) -> Result<ImportFormat, FormatError> {
    if let Some(declared) = declared {
        // Strip parameters like "; charset=utf-8"
        let media_type = declared
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match media_type.as_str() {
            "text/csv" | "application/csv" => return Ok(ImportFormat::Csv),
            "application/json" | "text/json" => return Ok(ImportFormat::Json),
            "" | "text/plain" => {}
            other => return Err(FormatError::UnsupportedType(other.to_string())),
        }
    }

    if let Some(extension) = file_extension(filename) {
        match extension.as_str() {
            "csv" => return Ok(ImportFormat::Csv),
            "json" => return Ok(ImportFormat::Json),
            "txt" => {}
            other => return Err(FormatError::UnsupportedType(format!(".{}", other))),
        }
    }

    let format = sniff(text);
    debug!("No usable type hints, sniffed upload as {}", format);
    Ok(format)
}

fn file_extension(filename: Option<&str>) -> Option<String> {
    filename
        .map(Path::new)
        .and_then(Path::extension)
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

fn sniff(text: &str) -> ImportFormat {
    match text.trim_start().chars().next() {
        Some('{') | Some('[') => ImportFormat::Json,
        _ => ImportFormat::Csv,
    }
}
