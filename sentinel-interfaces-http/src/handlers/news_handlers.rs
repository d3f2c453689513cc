use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;

use sentinel_application::commands::news_commands;
use sentinel_application::queries::news_queries;
use sentinel_application::AppState;
use sentinel_domain::{ArticleDraft, NewsArticle, NewsQuery};

use crate::error::HttpError;
use crate::middleware::parse_json_body;

#[derive(Serialize)]
pub struct Acknowledgement {
    pub message: &'static str,
}

pub async fn list_news(
    State(state): State<AppState>,
    Query(query): Query<NewsQuery>,
) -> Result<Json<Vec<NewsArticle>>, HttpError> {
    let articles = news_queries::list_news(&state, query).await?;
    Ok(Json(articles))
}

pub async fn create_article(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<NewsArticle>, HttpError> {
    let draft: ArticleDraft = parse_json_body(&body)?;
    let article = news_commands::create_article(&state, draft).await?;
    Ok(Json(article))
}

pub async fn fetch_news(State(state): State<AppState>) -> Json<Acknowledgement> {
    let message = news_commands::request_news_fetch(&state).await;
    Json(Acknowledgement { message })
}
