// Intel briefing articles

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub id: String,
    pub title: String,
    pub description: String,
    pub content: Option<String>,
    pub source: String,
    pub category: String,
    pub tags: Vec<String>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArticle {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub content: Option<String>,
    pub source: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub published_at: DateTime<Utc>,
}

impl NewArticle {
    pub fn into_article(self, id: String, created_at: DateTime<Utc>) -> NewsArticle {
        NewsArticle {
            id,
            title: self.title,
            description: self.description,
            content: self.content,
            source: self.source,
            category: self.category,
            tags: self.tags,
            url: self.url,
            image_url: self.image_url,
            published_at: self.published_at,
            created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub source: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub url: Option<String>,
    pub image_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewsQuery {
    pub limit: Option<usize>,
}
