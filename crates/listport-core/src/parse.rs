use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, info};

use crate::detect;
use crate::error::FormatError;
use listport_models::{ImportFormat, RawRow};

/// Which normalized field a source column feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnRole {
    Title,
    Year,
    Status,
    Rating,
    Notes,
    Date,
    Providers,
}

/// Parse an upload into raw rows plus the format it was read as.
///
/// Size and encoding are checked before any parsing. Individual bad rows are
/// kept as `RawRow` placeholders with a `parse_note`; only whole-file
/// problems surface as `FormatError`.
pub fn parse_upload(
    bytes: &[u8],
    declared: Option<&str>,
    filename: Option<&str>,
    limit: usize,
) -> Result<(Vec<RawRow>, ImportFormat), FormatError> {
    if bytes.len() > limit {
        return Err(FormatError::PayloadTooLarge {
            size: bytes.len(),
            limit,
        });
    }

    let text = std::str::from_utf8(bytes).map_err(|_| FormatError::BinaryContent)?;
    if text.contains('\0') {
        return Err(FormatError::BinaryContent);
    }
    // Excel likes to prepend a BOM to CSV exports
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    if text.trim().is_empty() {
        return Err(FormatError::EmptyFile);
    }

    let format = detect::detect_format(text, declared, filename)?;
    let rows = match format {
        ImportFormat::Csv => parse_csv(text)?,
        ImportFormat::Json => parse_json(text)?,
    };

    let noted = rows.iter().filter(|r| r.parse_note.is_some()).count();
    info!(
        "Parsed {} rows from {} upload, {} with parse notes",
        rows.len(),
        format,
        noted
    );
    Ok((rows, format))
}

fn parse_csv(text: &str) -> Result<Vec<RawRow>, FormatError> {
    let mut reader = csv::Reader::from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let roles: Vec<Option<ColumnRole>> = headers.iter().map(column_role).collect();
    if roles.iter().all(Option::is_none) {
        return Err(FormatError::NoRecognizedColumns);
    }
    debug!("CSV header: {:?}", headers);

    let mut rows = Vec::new();
    for result in reader.records() {
        match result {
            Ok(record) => rows.push(row_from_record(&headers, &roles, &record)),
            Err(e) => {
                debug!("Skipping unreadable CSV record: {}", e);
                rows.push(RawRow::malformed(format!("unreadable record: {}", e)));
            }
        }
    }
    Ok(rows)
}

fn parse_json(text: &str) -> Result<Vec<RawRow>, FormatError> {
    let root: Value = serde_json::from_str(text)?;
    let elements = match root {
        Value::Array(elements) => elements,
        Value::Object(map) => map
            .into_iter()
            .find_map(|(_, value)| match value {
                Value::Array(elements) => Some(elements),
                _ => None,
            })
            .ok_or_else(|| {
                FormatError::UnsupportedType("json object with no array property".to_string())
            })?,
        _ => {
            return Err(FormatError::UnsupportedType(
                "json root is neither an array nor an object".to_string(),
            ))
        }
    };

    let mut rows = Vec::new();
    for element in elements {
        match element {
            Value::Object(fields) => rows.push(row_from_object(fields)),
            other => rows.push(RawRow::malformed(format!("non-object row: {}", other))),
        }
    }
    Ok(rows)
}

fn row_from_record(
    headers: &csv::StringRecord,
    roles: &[Option<ColumnRole>],
    record: &csv::StringRecord,
) -> RawRow {
    let mut row = RawRow::default();
    for (index, header) in headers.iter().enumerate() {
        let value = record.get(index).unwrap_or("").trim();
        if value.is_empty() {
            continue;
        }
        match roles[index] {
            Some(role) => assign_field(&mut row, role, value, header),
            None => {
                row.extra.insert(header.to_string(), value.to_string());
            }
        }
    }
    row
}

fn row_from_object(fields: serde_json::Map<String, Value>) -> RawRow {
    let mut row = RawRow::default();
    for (key, value) in fields {
        if value.is_null() {
            continue;
        }
        let role = column_role(&key);
        let text = match (&value, role) {
            // Provider lists may arrive as a real JSON array
            (Value::Array(parts), Some(ColumnRole::Providers)) => parts
                .iter()
                .map(value_text)
                .collect::<Vec<_>>()
                .join("; "),
            _ => value_text(&value),
        };
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        match role {
            Some(role) => assign_field(&mut row, role, text, &key),
            None => {
                row.extra.insert(key, text.to_string());
            }
        }
    }
    row
}

/// Route one recognized cell into its raw field. The first column claiming a
/// role wins; later duplicates are preserved in the extra bag instead of
/// overwriting.
fn assign_field(row: &mut RawRow, role: ColumnRole, value: &str, header: &str) {
    match role {
        ColumnRole::Title => {
            if row.title.is_empty() {
                row.title = value.to_string();
            } else {
                row.extra.insert(header.to_string(), value.to_string());
            }
        }
        ColumnRole::Status => set_text(&mut row.status, &mut row.extra, header, value),
        ColumnRole::Notes => set_text(&mut row.notes, &mut row.extra, header, value),
        ColumnRole::Date => set_text(&mut row.date_watched, &mut row.extra, header, value),
        ColumnRole::Providers => set_text(&mut row.providers, &mut row.extra, header, value),
        ColumnRole::Year => {
            if row.year.is_some() {
                row.extra.insert(header.to_string(), value.to_string());
            } else {
                match value.parse::<u32>() {
                    Ok(year) => row.year = Some(year),
                    Err(_) => note_unparsed(row, "year", value),
                }
            }
        }
        ColumnRole::Rating => {
            if row.rating.is_some() {
                row.extra.insert(header.to_string(), value.to_string());
            } else {
                match value.parse::<f64>() {
                    Ok(rating) => row.rating = Some(rating),
                    Err(_) => note_unparsed(row, "rating", value),
                }
            }
        }
    }
}

fn set_text(
    slot: &mut Option<String>,
    extra: &mut BTreeMap<String, String>,
    header: &str,
    value: &str,
) {
    if slot.is_none() {
        *slot = Some(value.to_string());
    } else {
        extra.insert(header.to_string(), value.to_string());
    }
}

fn note_unparsed(row: &mut RawRow, field: &str, value: &str) {
    let note = format!("unparseable {} '{}'", field, value);
    row.parse_note = Some(match row.parse_note.take() {
        Some(existing) => format!("{}; {}", existing, note),
        None => note,
    });
}

/// Map a source column name onto the field it feeds. Names are compared
/// lower-cased with space/underscore/dash runs squashed, so "Release_Year",
/// "release-year" and "Release Year" all land on the year field.
fn column_role(name: &str) -> Option<ColumnRole> {
    match canonical_column(name).as_str() {
        "title" | "name" | "movie" | "show" | "film" => Some(ColumnRole::Title),
        "watched" | "status" | "state" => Some(ColumnRole::Status),
        "rating" | "score" | "my rating" | "your rating" | "stars" => Some(ColumnRole::Rating),
        "year" | "release year" => Some(ColumnRole::Year),
        "notes" | "comment" | "comments" | "review" => Some(ColumnRole::Notes),
        "date watched" | "watched on" | "watched at" | "date" | "date added" | "created" => {
            Some(ColumnRole::Date)
        }
        "providers" | "streaming" | "streaming providers" | "services" | "available on" => {
            Some(ColumnRole::Providers)
        }
        _ => None,
    }
}

fn canonical_column(name: &str) -> String {
    name.to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// A JSON scalar as the text a CSV cell would have carried. Strings lose
/// their quotes; anything composite keeps its compact JSON form.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_LIMIT: usize = usize::MAX;

    fn parse(text: &str) -> (Vec<RawRow>, ImportFormat) {
        parse_upload(text.as_bytes(), None, None, NO_LIMIT).unwrap()
    }

    #[test]
    fn test_parse_csv_with_synonym_headers() {
        let csv = "Name,Release Year,My Rating,State,Comment,Watched On,Services\n\
                   Heat,1995,9,watched,A classic,2020-05-01,Netflix; Hulu\n";
        let (rows, format) = parse(csv);

        assert_eq!(format, ImportFormat::Csv);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.title, "Heat");
        assert_eq!(row.year, Some(1995));
        assert_eq!(row.rating, Some(9.0));
        assert_eq!(row.status.as_deref(), Some("watched"));
        assert_eq!(row.notes.as_deref(), Some("A classic"));
        assert_eq!(row.date_watched.as_deref(), Some("2020-05-01"));
        assert_eq!(row.providers.as_deref(), Some("Netflix; Hulu"));
        assert!(row.extra.is_empty());
        assert!(row.parse_note.is_none());
    }

    #[test]
    fn test_underscore_and_dash_headers_are_squashed() {
        let csv = "title,release_year,date-added\nRonin,1998,2021-01-05\n";
        let (rows, _) = parse(csv);
        assert_eq!(rows[0].year, Some(1998));
        assert_eq!(rows[0].date_watched.as_deref(), Some("2021-01-05"));
    }

    #[test]
    fn test_unmatched_columns_land_in_extra() {
        let csv = "Title,Year,Director\nHeat,1995,Michael Mann\n";
        let (rows, _) = parse(csv);
        assert_eq!(rows[0].extra.get("Director").map(String::as_str), Some("Michael Mann"));
    }

    #[test]
    fn test_duplicate_title_columns_first_wins() {
        let csv = "Title,Name\nHeat,Also Heat\n";
        let (rows, _) = parse(csv);
        assert_eq!(rows[0].title, "Heat");
        assert_eq!(rows[0].extra.get("Name").map(String::as_str), Some("Also Heat"));
    }

    #[test]
    fn test_no_recognized_columns_is_fatal() {
        let err = parse_upload(b"foo,bar\n1,2\n", None, None, NO_LIMIT).unwrap_err();
        assert!(matches!(err, FormatError::NoRecognizedColumns));
    }

    #[test]
    fn test_size_ceiling_checked_before_parsing() {
        let err = parse_upload(b"title\nHeat\n", None, None, 4).unwrap_err();
        assert!(matches!(err, FormatError::PayloadTooLarge { size: 11, limit: 4 }));
    }

    #[test]
    fn test_binary_content_rejected() {
        let err = parse_upload(&[0x25, 0x50, 0x44, 0x46, 0xff, 0xfe], None, Some("list.csv"), NO_LIMIT)
            .unwrap_err();
        assert!(matches!(err, FormatError::BinaryContent));

        let err = parse_upload(b"title\x00year", None, None, NO_LIMIT).unwrap_err();
        assert!(matches!(err, FormatError::BinaryContent));
    }

    #[test]
    fn test_empty_upload_rejected() {
        assert!(matches!(
            parse_upload(b"", None, None, NO_LIMIT).unwrap_err(),
            FormatError::EmptyFile
        ));
        assert!(matches!(
            parse_upload(b"  \n\t", None, None, NO_LIMIT).unwrap_err(),
            FormatError::EmptyFile
        ));
    }

    #[test]
    fn test_bom_is_stripped() {
        let csv = "\u{feff}Title,Year\nHeat,1995\n";
        let (rows, _) = parse(csv);
        assert_eq!(rows[0].title, "Heat");
        assert_eq!(rows[0].year, Some(1995));
    }

    #[test]
    fn test_ragged_record_kept_with_parse_note() {
        let csv = "Title,Year\nHeat,1995\nRonin,1998,extra,fields\nThief,1981\n";
        let (rows, _) = parse(csv);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].title, "Heat");
        assert!(rows[1].parse_note.is_some());
        assert_eq!(rows[2].title, "Thief");
    }

    #[test]
    fn test_unparseable_year_noted_not_dropped() {
        let csv = "Title,Year\nHeat,TBD\n";
        let (rows, _) = parse(csv);
        assert_eq!(rows[0].title, "Heat");
        assert_eq!(rows[0].year, None);
        assert!(rows[0].parse_note.as_deref().unwrap().contains("year"));
    }

    #[test]
    fn test_json_top_level_array() {
        let json = r#"[{"title": "Heat", "year": 1995, "rating": 8.5, "status": "watched"}]"#;
        let (rows, format) = parse_upload(json.as_bytes(), None, None, NO_LIMIT).unwrap();

        assert_eq!(format, ImportFormat::Json);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Heat");
        assert_eq!(rows[0].year, Some(1995));
        assert_eq!(rows[0].rating, Some(8.5));
        assert_eq!(rows[0].status.as_deref(), Some("watched"));
    }

    #[test]
    fn test_json_object_wrapper_uses_array_property() {
        let json = r#"{"count": 1, "items": [{"name": "Ronin", "year": "1998"}]}"#;
        let (rows, _) = parse_upload(json.as_bytes(), None, None, NO_LIMIT).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Ronin");
        assert_eq!(rows[0].year, Some(1998));
    }

    #[test]
    fn test_json_object_without_array_property() {
        let err = parse_upload(br#"{"title": "Heat"}"#, None, None, NO_LIMIT).unwrap_err();
        assert!(matches!(err, FormatError::UnsupportedType(_)));
    }

    #[test]
    fn test_json_non_object_row_kept_with_note() {
        let json = r#"[{"title": "Heat"}, 42]"#;
        let (rows, _) = parse_upload(json.as_bytes(), None, None, NO_LIMIT).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows[1].parse_note.is_some());
        assert!(rows[1].title.is_empty());
    }

    #[test]
    fn test_json_provider_array_is_joined() {
        let json = r#"[{"title": "Heat", "streaming_providers": ["Netflix", "Hulu"]}]"#;
        let (rows, _) = parse_upload(json.as_bytes(), None, None, NO_LIMIT).unwrap();
        assert_eq!(rows[0].providers.as_deref(), Some("Netflix; Hulu"));
    }

    #[test]
    fn test_json_unknown_keys_preserved_in_extra() {
        let json = r#"[{"title": "Heat", "catalog_id": 949, "media_kind": "movie"}]"#;
        let (rows, _) = parse_upload(json.as_bytes(), None, None, NO_LIMIT).unwrap();
        assert_eq!(rows[0].extra.get("catalog_id").map(String::as_str), Some("949"));
        assert_eq!(rows[0].extra.get("media_kind").map(String::as_str), Some("movie"));
    }

    #[test]
    fn test_malformed_json_is_fatal() {
        let err = parse_upload(b"[{\"title\": ", None, None, NO_LIMIT).unwrap_err();
        assert!(matches!(err, FormatError::Json(_)));
    }
}
