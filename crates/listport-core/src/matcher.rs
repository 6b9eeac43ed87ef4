use std::cmp::Ordering;
use std::collections::BTreeSet;

use listport_models::{CandidateMatch, CatalogTitle};
use listport_sources::{CatalogSearch, SourceError};

/// Most candidates a preview row will carry.
pub const MAX_CANDIDATES: usize = 5;

const TITLE_WEIGHT: f64 = 7.0;
const YEAR_WEIGHT: f64 = 3.0;

/// Tokens that barely distinguish titles count for less, but still count.
const STOP_WORDS: [&str; 8] = ["the", "a", "an", "of", "and", "or", "in", "on"];
const STOP_WORD_WEIGHT: f64 = 0.3;

/// Search the catalog for one imported row and score the hits against it.
/// Candidates come back best first, capped at [`MAX_CANDIDATES`]. Selection
/// stays with the user; nothing here picks a winner.
pub async fn find_candidates(
    catalog: &dyn CatalogSearch,
    title: &str,
    year: Option<u32>,
) -> Result<Vec<CandidateMatch>, SourceError> {
    let hits = catalog.search(title).await?;
    Ok(rank_candidates(title, year, hits))
}

/// Score and order raw catalog hits: descending confidence, ties broken by
/// popularity then vote count, full ties keeping the catalog's own order.
pub fn rank_candidates(
    title: &str,
    year: Option<u32>,
    hits: Vec<CatalogTitle>,
) -> Vec<CandidateMatch> {
    let mut scored: Vec<(f64, CatalogTitle)> = hits
        .into_iter()
        .map(|hit| (confidence(title, year, &hit), hit))
        .collect();

    scored.sort_by(|(conf_a, hit_a), (conf_b, hit_b)| {
        conf_b
            .partial_cmp(conf_a)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                hit_b
                    .popularity
                    .partial_cmp(&hit_a.popularity)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| hit_b.vote_count.cmp(&hit_a.vote_count))
    });

    scored
        .into_iter()
        .take(MAX_CANDIDATES)
        .map(|(confidence, hit)| CandidateMatch::from_catalog(&hit, confidence))
        .collect()
}

/// Estimated probability in [0, 1] that `hit` is the title the row meant,
/// weighted 7:3 between title similarity and year agreement.
pub fn confidence(title: &str, year: Option<u32>, hit: &CatalogTitle) -> f64 {
    // Integer weights keep an exact title + exact year at exactly 1.0
    let score = (TITLE_WEIGHT * title_similarity(title, &hit.title)
        + YEAR_WEIGHT * year_bonus(year, hit.year))
        / (TITLE_WEIGHT + YEAR_WEIGHT);
    score.clamp(0.0, 1.0)
}

/// Sørensen–Dice overlap between the two titles' token sets. Tokens are
/// lower-cased with punctuation stripped; stop words are down-weighted, not
/// removed. Identical sets score 1.0.
pub fn title_similarity(a: &str, b: &str) -> f64 {
    let tokens_a = tokenize(a);
    let tokens_b = tokenize(b);
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0.0;
    }

    let weight_a: f64 = tokens_a.iter().map(|t| token_weight(t)).sum();
    let weight_b: f64 = tokens_b.iter().map(|t| token_weight(t)).sum();
    let shared: f64 = tokens_a
        .intersection(&tokens_b)
        .map(|t| token_weight(t))
        .sum();

    2.0 * shared / (weight_a + weight_b)
}

/// 1.0 on an exact year match, 0.5 within a year either way, 0.0 otherwise.
/// A missing year on either side earns nothing.
pub fn year_bonus(imported: Option<u32>, candidate: Option<u32>) -> f64 {
    match (imported, candidate) {
        (Some(a), Some(b)) if a == b => 1.0,
        (Some(a), Some(b)) if a.abs_diff(b) <= 1 => 0.5,
        _ => 0.0,
    }
}

fn tokenize(title: &str) -> BTreeSet<String> {
    title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn token_weight(token: &str) -> f64 {
    if STOP_WORDS.contains(&token) {
        STOP_WORD_WEIGHT
    } else {
        1.0
    }
}
