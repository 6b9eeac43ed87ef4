use crate::error::SourceError;
use chrono::{Datelike, NaiveDate};
use listport_models::{CatalogTitle, MediaKind};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    results: Vec<SearchHit>,
}

/// One raw hit from `/search/multi`. Movies carry `title`/`release_date`,
/// tv entries carry `name`/`first_air_date`.
#[derive(Debug, Deserialize)]
struct SearchHit {
    id: u64,
    #[serde(rename = "media_type")]
    media_type: Option<String>,
    title: Option<String>,
    name: Option<String>,
    #[serde(rename = "release_date")]
    release_date: Option<String>,
    #[serde(rename = "first_air_date")]
    first_air_date: Option<String>,
    poster_path: Option<String>,
    backdrop_path: Option<String>,
    overview: Option<String>,
    popularity: Option<f64>,
    vote_count: Option<u64>,
}

fn year_from_date(date: Option<&str>) -> Option<u32> {
    let date = date?.trim();
    if date.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .map(|d| d.year() as u32)
}

fn collect_titles(hits: Vec<SearchHit>) -> Vec<CatalogTitle> {
    let mut titles = Vec::new();

    for hit in hits {
        let (media_kind, title, year) = match hit.media_type.as_deref() {
            Some("movie") => {
                let title = match hit.title {
                    Some(t) => t,
                    None => continue,
                };
                (
                    MediaKind::Movie,
                    title,
                    year_from_date(hit.release_date.as_deref()),
                )
            }
            Some("tv") => {
                let name = match hit.name {
                    Some(n) => n,
                    None => continue,
                };
                (
                    MediaKind::Series,
                    name,
                    year_from_date(hit.first_air_date.as_deref()),
                )
            }
            // People and other result types are not importable
            _ => continue,
        };

        titles.push(CatalogTitle {
            catalog_id: hit.id,
            media_kind,
            title,
            year,
            poster_path: hit.poster_path,
            backdrop_path: hit.backdrop_path,
            overview: hit.overview,
            popularity: hit.popularity,
            vote_count: hit.vote_count,
        });
    }

    titles
}

/// Search the catalog across movies and tv in one call.
pub async fn search_multi(
    client: &Client,
    base_url: &str,
    api_key: &str,
    query: &str,
) -> Result<Vec<CatalogTitle>, SourceError> {
    let url = format!(
        "{}/search/multi?api_key={}&query={}&include_adult=false",
        base_url,
        api_key,
        urlencoding::encode(query)
    );

    let response = client
        .get(&url)
        .header("Accept", "application/json")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        warn!(
            "Catalog search failed for '{}': HTTP {} - {}",
            query, status, error_text
        );
        return Err(SourceError::api(status.as_u16(), error_text));
    }

    let page: SearchPage = response.json().await?;
    let total = page.results.len();
    let titles = collect_titles(page.results);

    debug!(
        "Catalog search '{}': {} usable of {} raw results",
        query,
        titles.len(),
        total
    );

    Ok(titles)
}
