use sentinel_domain::{NewsArticle, NewsQuery};

use crate::queries::clamp_limit;
use crate::{AppError, AppState};

pub async fn list_news(state: &AppState, query: NewsQuery) -> Result<Vec<NewsArticle>, AppError> {
    let limit = clamp_limit(query.limit, 50, 200);
    state
        .news_repo
        .fetch_articles(limit)
        .await
        .map_err(AppError::Internal)
}
