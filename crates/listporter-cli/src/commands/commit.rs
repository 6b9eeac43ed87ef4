use super::config::load_settings;
use super::prompts;
use crate::output::Output;
use color_eyre::Result;
use comfy_table::{Cell, Table};
use listport_models::{ImportResult, Preview, PreviewItem, Resolution};
use listport_sources::build_store;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Decisions recorded while reviewing a preview, keyed by the row numbers
/// the preview table shows.
#[derive(Debug, Default, Deserialize)]
struct DecisionFile {
    /// Row index to index into that row's match candidates.
    #[serde(default)]
    selections: HashMap<usize, usize>,
    /// Rows to leave out of the commit entirely.
    #[serde(default)]
    skips: Vec<usize>,
    /// Duplicate handling, consumed by the commit itself.
    #[serde(default)]
    resolutions: Vec<Resolution>,
}

pub async fn run_commit(
    preview_path: PathBuf,
    resolutions_path: Option<PathBuf>,
    yes: bool,
    output: &Output,
) -> Result<()> {
    tracing::debug!("Commit command started for {}", preview_path.display());

    let (config, cred_store, path_manager) = load_settings()?;

    let preview_text = std::fs::read_to_string(&preview_path).map_err(|e| {
        color_eyre::eyre::eyre!("Failed to read {}: {}", preview_path.display(), e)
    })?;
    let preview: Preview = serde_json::from_str(&preview_text).map_err(|e| {
        color_eyre::eyre::eyre!("{} is not a preview file: {}", preview_path.display(), e)
    })?;

    let decisions = match &resolutions_path {
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| {
                color_eyre::eyre::eyre!("Failed to read {}: {}", path.display(), e)
            })?;
            serde_json::from_str(&text).map_err(|e| {
                color_eyre::eyre::eyre!("{} is not a decisions file: {}", path.display(), e)
            })?
        }
        None => DecisionFile::default(),
    };

    let mut items = preview.items;
    apply_decisions(&mut items, &decisions)?;

    let skipped = items.iter().filter(|i| i.should_skip).count();
    let with_errors = items.iter().filter(|i| i.error.is_some()).count();
    let duplicates = items
        .iter()
        .filter(|i| i.has_existing_entry && !i.should_skip)
        .count();
    let selected = items
        .iter()
        .filter(|i| i.selected_match.is_some() && !i.should_skip)
        .count();

    if !yes {
        output.info(&format!(
            "{} items: {} with a selected match, {} duplicates to resolve, {} skipped, {} with issues",
            items.len(),
            selected,
            duplicates,
            skipped,
            with_errors
        ));
        if !prompts::is_interactive() {
            return Err(color_eyre::eyre::eyre!(
                "Refusing to commit without --yes when not running interactively"
            ));
        }
        if !prompts::prompt_yes_no("Apply these changes to the watchlist?", Some(false))? {
            output.info("Commit aborted");
            return Ok(());
        }
    }

    let store = build_store(&config, &cred_store, &path_manager)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create watchlist store: {}", e))?;

    let result = listport_core::commit(&items, &decisions.resolutions, store.as_ref())
        .await
        .map_err(|e| color_eyre::eyre::eyre!("Commit failed: {}", e))?;

    match output.format() {
        crate::output::OutputFormat::Human => {
            render_result(&result, output);
        }
        crate::output::OutputFormat::Json | crate::output::OutputFormat::JsonPretty => {
            let value = serde_json::to_value(&result)
                .map_err(|e| color_eyre::eyre::eyre!("Failed to serialize result: {}", e))?;
            output.json(&value);
        }
    }

    Ok(())
}

/// Write the reviewer's selections and skips onto the preview items. Rows and
/// candidate indexes outside the preview are rejected rather than ignored.
fn apply_decisions(items: &mut [PreviewItem], decisions: &DecisionFile) -> Result<()> {
    let total = items.len();

    for (&row, &candidate) in &decisions.selections {
        let item = items.get_mut(row).ok_or_else(|| {
            color_eyre::eyre::eyre!(
                "Selection for row {} but the preview has {} rows",
                row,
                total
            )
        })?;
        if candidate >= item.match_candidates.len() {
            return Err(color_eyre::eyre::eyre!(
                "Row {} has {} match candidates, cannot select candidate {}",
                row,
                item.match_candidates.len(),
                candidate
            ));
        }
        item.selected_match = Some(candidate);
    }

    for &row in &decisions.skips {
        let item = items.get_mut(row).ok_or_else(|| {
            color_eyre::eyre::eyre!("Skip for row {} but the preview has {} rows", row, total)
        })?;
        item.should_skip = true;
    }

    Ok(())
}

fn render_result(result: &ImportResult, output: &Output) {
    if !output.is_quiet() {
        let mut table = Table::new();
        table.set_header(vec![
            Cell::new("Outcome")
                .fg(comfy_table::Color::Cyan)
                .add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Items")
                .fg(comfy_table::Color::Cyan)
                .add_attribute(comfy_table::Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("Imported"),
            Cell::new(result.imported.to_string()),
        ]);
        table.add_row(vec![
            Cell::new("Merged"),
            Cell::new(result.merged.to_string()),
        ]);
        table.add_row(vec![
            Cell::new("Overwritten"),
            Cell::new(result.overwritten.to_string()),
        ]);
        table.add_row(vec![
            Cell::new("Skipped"),
            Cell::new(result.skipped.to_string()),
        ]);
        table.add_row(vec![
            Cell::new("Failed"),
            Cell::new(result.failed.to_string()),
        ]);
        table.add_row(vec![
            Cell::new("Total"),
            Cell::new(result.total().to_string()),
        ]);
        table.load_preset(comfy_table::presets::UTF8_FULL);
        table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
        println!("{}", table);
    }

    for error in &result.errors {
        output.error(&format!(
            "Row {} ({}): {}",
            error.index, error.title, error.message
        ));
    }

    let applied = result.imported + result.merged + result.overwritten;
    if result.failed == 0 {
        output.success(&format!("Commit finished: {} changes applied", applied));
    } else {
        output.warn(&format!(
            "Commit finished with {} failures; {} changes were still applied",
            result.failed, applied
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use listport_models::{CandidateMatch, MediaKind, WatchStatus};

    fn item_with_candidates(count: usize) -> PreviewItem {
        PreviewItem {
            original_title: "Heat".to_string(),
            original_year: Some(1995),
            match_candidates: (0..count)
                .map(|i| CandidateMatch {
                    catalog_id: i as u64 + 1,
                    media_kind: MediaKind::Movie,
                    title: "Heat".to_string(),
                    year: Some(1995),
                    poster_path: None,
                    backdrop_path: None,
                    overview: None,
                    confidence: 1.0 - i as f64 * 0.1,
                })
                .collect(),
            selected_match: None,
            suggested_status: WatchStatus::NotWatched,
            rating: None,
            notes: None,
            date_added: None,
            streaming_providers: Vec::new(),
            has_existing_entry: false,
            existing_entry_id: None,
            should_skip: false,
            error: None,
        }
    }

    #[test]
    fn test_decision_file_parses_string_keyed_selections() {
        let decisions: DecisionFile = serde_json::from_str(
            r#"{
                "selections": {"0": 1},
                "skips": [2],
                "resolutions": [
                    {"key": {"index": 3}, "strategy": "merge", "merge_fields": ["rating"]}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(decisions.selections.get(&0), Some(&1));
        assert_eq!(decisions.skips, vec![2]);
        assert_eq!(decisions.resolutions.len(), 1);
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let decisions: DecisionFile = serde_json::from_str("{}").unwrap();
        assert!(decisions.selections.is_empty());
        assert!(decisions.skips.is_empty());
        assert!(decisions.resolutions.is_empty());
    }

    #[test]
    fn test_apply_decisions_selects_and_skips() {
        let mut items = vec![
            item_with_candidates(2),
            item_with_candidates(0),
            item_with_candidates(1),
        ];
        let decisions: DecisionFile =
            serde_json::from_str(r#"{"selections": {"0": 1}, "skips": [1]}"#).unwrap();

        apply_decisions(&mut items, &decisions).unwrap();

        assert_eq!(items[0].selected_match, Some(1));
        assert!(items[1].should_skip);
        assert_eq!(items[2].selected_match, None);
        assert!(!items[2].should_skip);
    }

    #[test]
    fn test_apply_decisions_rejects_out_of_range() {
        let mut items = vec![item_with_candidates(1)];

        let bad_row: DecisionFile = serde_json::from_str(r#"{"skips": [5]}"#).unwrap();
        assert!(apply_decisions(&mut items, &bad_row).is_err());

        let bad_candidate: DecisionFile =
            serde_json::from_str(r#"{"selections": {"0": 4}}"#).unwrap();
        assert!(apply_decisions(&mut items, &bad_candidate).is_err());
    }
}
