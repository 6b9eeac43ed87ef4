use super::config::load_settings;
use super::prompts;
use crate::output::Output;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use indicatif::{ProgressBar, ProgressStyle};
use listport_core::{ImportOptions, Importer};
use listport_models::{ImportFormat, Preview};
use listport_sources::{build_catalog, build_store};
use owo_colors::OwoColorize;
use std::path::PathBuf;

pub async fn run_import(
    file: PathBuf,
    format: Option<ImportFormat>,
    out: Option<PathBuf>,
    output: &Output,
) -> Result<()> {
    tracing::debug!("Import command started for {}", file.display());

    let (config, cred_store, path_manager) = load_settings()?;

    let catalog = build_catalog(&config, &cred_store)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create catalog client: {}", e))?;
    let store = build_store(&config, &cred_store, &path_manager)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create watchlist store: {}", e))?;

    let bytes = std::fs::read(&file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read {}: {}", file.display(), e))?;

    let snapshot = store
        .list()
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Failed to read the watchlist store: {}", e))?;

    // A forced format takes the declared-type slot, so it outranks the file
    // extension exactly like an upload's content type would.
    let declared = format.map(|f| match f {
        ImportFormat::Csv => "text/csv",
        ImportFormat::Json => "application/json",
    });
    let filename = file.file_name().and_then(|n| n.to_str());

    let importer = Importer::new(catalog).with_options(ImportOptions::from(&config.import));

    let spinner = matching_spinner(output);
    let preview = importer
        .build_preview(&bytes, declared, filename, &snapshot)
        .await;
    if let Some(pb) = &spinner {
        pb.finish_and_clear();
    }
    let preview = preview.map_err(|e| color_eyre::eyre::eyre!("Import failed: {}", e))?;

    if let Some(out_path) = &out {
        let json = serde_json::to_string_pretty(&preview)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to serialize preview: {}", e))?;
        std::fs::write(out_path, json).map_err(|e| {
            color_eyre::eyre::eyre!("Failed to write {}: {}", out_path.display(), e)
        })?;
    }

    match output.format() {
        crate::output::OutputFormat::Human => {
            render_preview(&preview, output);

            let duplicates = preview
                .items
                .iter()
                .filter(|item| item.has_existing_entry)
                .count();
            output.info(&format!(
                "Parsed {} rows from the {} upload: {} with issues, {} already on the watchlist",
                preview.rows_parsed, preview.detected_format, preview.rows_with_errors, duplicates
            ));
            if preview.rows_with_errors > 0 {
                output.warn(&format!(
                    "{} rows have issues and will be skipped unless fixed",
                    preview.rows_with_errors
                ));
            }
            match &out {
                Some(out_path) => output.success(&format!(
                    "Preview written to {}. Review it, then run 'listporter commit {}'",
                    out_path.display(),
                    out_path.display()
                )),
                None => output.info(
                    "Re-run with --out <path> to save this preview for 'listporter commit'",
                ),
            }
        }
        crate::output::OutputFormat::Json | crate::output::OutputFormat::JsonPretty => {
            let value = serde_json::to_value(&preview)
                .map_err(|e| color_eyre::eyre::eyre!("Failed to serialize preview: {}", e))?;
            output.json(&value);
        }
    }

    Ok(())
}

fn render_preview(preview: &Preview, output: &Output) {
    if output.is_quiet() {
        return;
    }

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("#").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Title").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Year").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Status").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Matches").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Best Match").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Duplicate").add_attribute(comfy_table::Attribute::Bold),
        Cell::new("Issue").add_attribute(comfy_table::Attribute::Bold),
    ]);

    // Row numbers are the same indexes the commit decisions file uses.
    for (index, item) in preview.items.iter().enumerate() {
        let title = if item.original_title.is_empty() {
            "(missing)".to_string()
        } else {
            item.original_title.clone()
        };
        let year = item.original_year.map(|y| y.to_string()).unwrap_or_default();
        let best = match item.match_candidates.first() {
            Some(candidate) => match candidate.year {
                Some(y) => format!("{} ({}) [{:.2}]", candidate.title, y, candidate.confidence),
                None => format!("{} [{:.2}]", candidate.title, candidate.confidence),
            },
            None => String::new(),
        };
        let duplicate = if item.has_existing_entry {
            "yes".yellow().to_string()
        } else {
            String::new()
        };
        let issue = item
            .error
            .as_ref()
            .map(|e| e.red().to_string())
            .unwrap_or_default();

        table.add_row(vec![
            Cell::new(index.to_string()),
            Cell::new(title),
            Cell::new(year),
            Cell::new(item.suggested_status.to_string()),
            Cell::new(item.match_candidates.len().to_string()),
            Cell::new(best),
            Cell::new(duplicate),
            Cell::new(issue),
        ]);
    }

    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    println!("{}", table);
}

fn matching_spinner(output: &Output) -> Option<ProgressBar> {
    if output.format() != crate::output::OutputFormat::Human
        || output.is_quiet()
        || !prompts::is_interactive()
    {
        return None;
    }

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    spinner.set_message("Matching rows against the catalog...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    Some(spinner)
}
