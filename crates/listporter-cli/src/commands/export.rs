use super::config::load_settings;
use crate::output::Output;
use color_eyre::Result;
use listport_core::{export_entries, export_filename};
use listport_models::ImportFormat;
use listport_sources::build_store;
use serde_json::json;
use std::path::PathBuf;

pub async fn run_export(
    format: ImportFormat,
    out: Option<PathBuf>,
    output: &Output,
) -> Result<()> {
    tracing::debug!("Export command started, format {}", format);

    let (config, cred_store, path_manager) = load_settings()?;
    let store = build_store(&config, &cred_store, &path_manager)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create watchlist store: {}", e))?;

    let entries = store
        .list()
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read the watchlist store: {}", e))?;

    let bytes = export_entries(&entries, format)
        .map_err(|e| color_eyre::eyre::eyre!("Export failed: {}", e))?;

    let path = out.unwrap_or_else(|| PathBuf::from(export_filename(format)));
    std::fs::write(&path, &bytes)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to write {}: {}", path.display(), e))?;

    match output.format() {
        crate::output::OutputFormat::Human => {
            output.success(&format!(
                "Exported {} entries to {}",
                entries.len(),
                path.display()
            ));
        }
        crate::output::OutputFormat::Json | crate::output::OutputFormat::JsonPretty => {
            let json_result = json!({
                "success": true,
                "entries": entries.len(),
                "format": format.to_string(),
                "path": path.display().to_string(),
            });
            output.json(&json_result);
        }
    }

    Ok(())
}
