use chrono::Utc;
use sentinel_domain::{ArticleDraft, NewArticle, NewsArticle};
use tracing::info;

use crate::commands::input::{normalize_text, required_text};
use crate::{AppError, AppState};

pub const NEWS_FETCH_MESSAGE: &str = "News fetch initiated";

pub async fn create_article(state: &AppState, draft: ArticleDraft) -> Result<NewsArticle, AppError> {
    let article = validate_new_article(draft)?;
    let stored = state
        .news_repo
        .insert_article(article)
        .await
        .map_err(AppError::Internal)?;
    state.metrics.record_mutation();
    info!(article = %stored.id, category = %stored.category, "news article stored");
    Ok(stored)
}

/// External feed ingestion is not wired up; the request is only acknowledged.
pub async fn request_news_fetch(_state: &AppState) -> &'static str {
    info!("news fetch requested");
    NEWS_FETCH_MESSAGE
}

pub fn validate_new_article(draft: ArticleDraft) -> Result<NewArticle, AppError> {
    Ok(NewArticle {
        title: required_text("title", draft.title)?,
        description: required_text("description", draft.description)?,
        content: normalize_text(draft.content),
        source: required_text("source", draft.source)?,
        category: required_text("category", draft.category)?.to_lowercase(),
        tags: draft
            .tags
            .unwrap_or_default()
            .into_iter()
            .filter_map(|tag| normalize_text(Some(tag)))
            .collect(),
        url: normalize_text(draft.url),
        image_url: normalize_text(draft.image_url),
        published_at: draft.published_at.unwrap_or_else(Utc::now),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_tags_are_trimmed_and_blank_ones_dropped() {
        let draft = ArticleDraft {
            title: Some("Zero-day".to_string()),
            description: Some("Patch now".to_string()),
            source: Some("CISA".to_string()),
            category: Some("Vulnerability".to_string()),
            tags: Some(vec![" cve ".to_string(), "".to_string()]),
            ..ArticleDraft::default()
        };
        let article = validate_new_article(draft).expect("valid");
        assert_eq!(article.tags, vec!["cve".to_string()]);
        assert_eq!(article.category, "vulnerability");
    }

    #[test]
    fn article_requires_source() {
        let draft = ArticleDraft {
            title: Some("t".to_string()),
            description: Some("d".to_string()),
            category: Some("breach".to_string()),
            ..ArticleDraft::default()
        };
        assert!(validate_new_article(draft).is_err());
    }
}
