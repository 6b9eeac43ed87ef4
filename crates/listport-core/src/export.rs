use anyhow::Result;
use chrono::{NaiveDate, Utc};
use serde::Serialize;

use listport_models::{ImportFormat, MediaKind, WatchStatus, WatchlistEntry};

const CSV_COLUMNS: [&str; 10] = [
    "title",
    "year",
    "media_kind",
    "status",
    "rating",
    "notes",
    "date_added",
    "date_completed",
    "catalog_id",
    "streaming_providers",
];

/// Serialize the watchlist for download. Both formats carry the same logical
/// fields; CSV joins providers with `;`, JSON keeps them as an array.
pub fn export_entries(entries: &[WatchlistEntry], format: ImportFormat) -> Result<Vec<u8>> {
    match format {
        ImportFormat::Csv => export_csv(entries),
        ImportFormat::Json => export_json(entries),
    }
}

/// Default download name, `watchlist-<date>.<ext>`.
pub fn export_filename(format: ImportFormat) -> String {
    format!(
        "watchlist-{}.{}",
        Utc::now().format("%Y-%m-%d"),
        format.extension()
    )
}

fn export_csv(entries: &[WatchlistEntry]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buffer);
        writer.write_record(CSV_COLUMNS)?;
        for entry in entries {
            writer.write_record(csv_row(entry))?;
        }
        writer.flush()?;
    }
    Ok(buffer)
}

fn csv_row(entry: &WatchlistEntry) -> [String; 10] {
    [
        entry.title.clone(),
        entry.year.map(|y| y.to_string()).unwrap_or_default(),
        entry.media_kind.to_string(),
        entry.status.to_string(),
        entry.rating.map(|r| r.to_string()).unwrap_or_default(),
        entry.notes.clone().unwrap_or_default(),
        entry.date_added.map(|d| d.to_string()).unwrap_or_default(),
        entry.date_completed.map(|d| d.to_string()).unwrap_or_default(),
        entry.catalog_id.to_string(),
        entry.streaming_providers.join(";"),
    ]
}

fn export_json(entries: &[WatchlistEntry]) -> Result<Vec<u8>> {
    let records: Vec<ExportRecord> = entries.iter().map(ExportRecord::from).collect();
    Ok(serde_json::to_vec_pretty(&records)?)
}

/// The export view of an entry: the same logical fields as the CSV columns,
/// without store internals like the entry id or poster path.
#[derive(Serialize)]
struct ExportRecord<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    year: Option<u32>,
    media_kind: MediaKind,
    status: WatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    rating: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_added: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_completed: Option<NaiveDate>,
    catalog_id: u64,
    #[serde(skip_serializing_if = "slice_is_empty")]
    streaming_providers: &'a [String],
}

fn slice_is_empty(providers: &&[String]) -> bool {
    providers.is_empty()
}

impl<'a> From<&'a WatchlistEntry> for ExportRecord<'a> {
    fn from(entry: &'a WatchlistEntry) -> Self {
        ExportRecord {
            title: &entry.title,
            year: entry.year,
            media_kind: entry.media_kind,
            status: entry.status,
            rating: entry.rating,
            notes: entry.notes.as_deref(),
            date_added: entry.date_added,
            date_completed: entry.date_completed,
            catalog_id: entry.catalog_id,
            streaming_providers: &entry.streaming_providers,
        }
    }
}
