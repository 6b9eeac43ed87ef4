use std::collections::HashSet;

use chrono::NaiveDate;

use listport_models::{PreviewItem, RawRow, WatchStatus};

/// Turn one raw row into a reviewable preview item.
///
/// Pure and deterministic: the same row always yields the same item. Match
/// candidates and duplicate flags are filled by later stages.
pub fn normalize_row(row: &RawRow) -> PreviewItem {
    let mut error = row.parse_note.clone();
    let mut notes = row.notes.clone();

    let title = row.title.trim().to_string();
    if title.is_empty() && error.is_none() {
        error = Some("missing title".to_string());
    }

    let suggested_status = match row.status.as_deref() {
        None => WatchStatus::default(),
        Some(text) => match parse_status(text) {
            Some(status) => status,
            None => {
                // Keep the original wording visible instead of losing it
                append_note(&mut notes, &format!("status: {}", text.trim()));
                WatchStatus::NotWatched
            }
        },
    };

    let mut rating = None;
    if let Some(raw) = row.rating {
        // Values on an apparent 5-point scale are lifted onto the 10-point one
        let scaled = if raw <= 5.0 { raw * 2.0 } else { raw };
        if (0.0..=10.0).contains(&scaled) {
            rating = Some(scaled as f32);
        } else if error.is_none() {
            error = Some(format!("rating {} out of range", raw));
        }
    }

    let mut date_added = None;
    if let Some(text) = row.date_watched.as_deref() {
        match parse_date(text) {
            Some(date) => date_added = Some(date),
            None => {
                if error.is_none() {
                    error = Some(format!("unparseable date '{}'", text));
                }
            }
        }
    }

    let streaming_providers = row
        .providers
        .as_deref()
        .map(split_providers)
        .unwrap_or_default();

    PreviewItem {
        original_title: title,
        original_year: row.year,
        match_candidates: Vec::new(),
        selected_match: None,
        suggested_status,
        rating,
        notes,
        date_added,
        streaming_providers,
        has_existing_entry: false,
        existing_entry_id: None,
        should_skip: false,
        error,
    }
}

/// Free-text watch status to the canonical three states. Lower-cased with
/// punctuation turned into spaces, so "Plan-to-Watch!" and "plan to watch"
/// read the same.
fn parse_status(text: &str) -> Option<WatchStatus> {
    let canonical = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    match canonical.as_str() {
        "plan to watch" | "planned" | "ptw" | "want to watch" | "to watch" | "wishlist"
        | "watchlist" | "not watched" | "unwatched" => Some(WatchStatus::NotWatched),
        "watching" | "currently watching" | "in progress" | "started" | "partial" => {
            Some(WatchStatus::Watching)
        }
        "completed" | "complete" | "watched" | "done" | "finished" | "seen" => {
            Some(WatchStatus::Completed)
        }
        _ => None,
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(text, "%d/%m/%Y"))
        .or_else(|_| NaiveDate::parse_from_str(text, "%m-%d-%Y"))
        .ok()
}

/// Split a raw provider cell on `,`/`;`/`|`, dropping empties and
/// case-insensitive duplicates. The first occurrence's casing survives.
fn split_providers(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut providers = Vec::new();
    for part in raw.split([',', ';', '|']) {
        let name = part.trim();
        if name.is_empty() {
            continue;
        }
        if seen.insert(name.to_lowercase()) {
            providers.push(name.to_string());
        }
    }
    providers
}

fn append_note(notes: &mut Option<String>, addition: &str) {
    *notes = Some(match notes.take() {
        Some(existing) => format!("{}\n{}", existing, addition),
        None => addition.to_string(),
    });
}
