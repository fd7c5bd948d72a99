use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "recipe_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecipeStatus {
    Draft,
    Published,
}

impl Default for RecipeStatus {
    fn default() -> Self {
        RecipeStatus::Published
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: Uuid,
    /// URL-safe unique identifier, immutable after creation.
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub ingredients: Json<Vec<String>>,
    pub steps: Json<Vec<String>>,
    pub cover_image: Option<String>,
    pub video_url: Option<String>,
    pub status: RecipeStatus,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
