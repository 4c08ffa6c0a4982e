//! Candidate selection from trigger payloads and added-file lists

use serde_json::Value;

use crate::model::ArticleCandidate;

/// Candidates named by a structured trigger event
///
/// Returns `None` when the event does not carry the expected action, so the
/// caller can fall back to the source-control diff.
pub fn candidates_from_event(
    event: &Value,
    action: &str,
    limit: usize,
) -> Option<Vec<ArticleCandidate>> {
    if event.get("action").and_then(Value::as_str) != Some(action) {
        return None;
    }

    let articles = event
        .get("client_payload")
        .and_then(|p| p.get("articles"))
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .take(limit)
                .map(ArticleCandidate::new)
                .collect()
        })
        .unwrap_or_default();

    Some(articles)
}

/// Keep added files that are HTML documents inside the articles directory
pub fn candidates_from_added_files<'a>(
    files: impl IntoIterator<Item = &'a str>,
    articles_dir: &str,
    limit: usize,
) -> Vec<ArticleCandidate> {
    let prefix = format!("{}/", articles_dir.trim_end_matches('/'));
    files
        .into_iter()
        .map(str::trim)
        .filter(|f| f.starts_with(&prefix) && f.ends_with(".html"))
        .take(limit)
        .map(ArticleCandidate::new)
        .collect()
}
