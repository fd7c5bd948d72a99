// Recipe CRUD. Creation derives the slug; update and delete are
// ownership-scoped: the query filters by id AND user_id, and zero affected
// rows surfaces the same error whether the recipe is absent or owned by
// someone else.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;
use sqlx::types::Json as SqlJson;
use uuid::Uuid;

use crate::config;
use crate::database::models::{Recipe, RecipeStatus};
use crate::error::ApiError;
use crate::identity::CurrentIdentity;
use crate::response::{ApiResponse, ApiResult};
use crate::slug::slugify;
use crate::state::AppState;

const NOT_FOUND_OR_NOT_OWNER: &str = "Recipe not found or you are not the owner";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeInput {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub cover_image: Option<String>,
    pub video_url: Option<String>,
    pub status: Option<RecipeStatus>,
}

impl RecipeInput {
    fn validate(&self) -> Result<(), ApiError> {
        let min_title = config::config().limits.min_title_chars;
        if self.title.chars().count() < min_title {
            return Err(ApiError::validation_field(
                "title",
                format!("must be at least {} characters", min_title),
            ));
        }
        for (field, value) in [
            ("coverImage", &self.cover_image),
            ("videoUrl", &self.video_url),
        ] {
            if let Some(v) = value {
                if url::Url::parse(v).is_err() {
                    return Err(ApiError::validation_field(field, "must be a valid URL"));
                }
            }
        }
        Ok(())
    }
}

/// POST /api/recipes
pub async fn create(
    Extension(identity): Extension<CurrentIdentity>,
    State(state): State<AppState>,
    Json(payload): Json<RecipeInput>,
) -> ApiResult<Recipe> {
    let user = identity.require_user()?;
    payload.validate()?;

    let slug = slugify(&payload.title);
    let category = payload.category.clone().unwrap_or_else(|| "General".to_string());
    let status = payload.status.unwrap_or_default();

    let recipe = sqlx::query_as::<_, Recipe>(
        "INSERT INTO recipes
             (slug, title, description, category, ingredients, steps,
              cover_image, video_url, status, user_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
         RETURNING id, slug, title, description, category, ingredients, steps,
                   cover_image, video_url, status, user_id, created_at, updated_at",
    )
    .bind(&slug)
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(&category)
    .bind(SqlJson(&payload.ingredients))
    .bind(SqlJson(&payload.steps))
    .bind(&payload.cover_image)
    .bind(&payload.video_url)
    .bind(status)
    .bind(user.id)
    .fetch_one(state.gateway.pool())
    .await?;

    Ok(ApiResponse::created(recipe))
}

/// PUT /api/recipes/:id
///
/// The slug is immutable: updates never touch it even when the title changes.
pub async fn update(
    Extension(identity): Extension<CurrentIdentity>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecipeInput>,
) -> ApiResult<Recipe> {
    let user = identity.require_user()?;
    payload.validate()?;

    let recipe = sqlx::query_as::<_, Recipe>(
        // Omitted optional fields leave the stored value unchanged
        "UPDATE recipes SET
             title = $1, description = COALESCE($2, description),
             category = COALESCE($3, category),
             ingredients = $4, steps = $5,
             cover_image = COALESCE($6, cover_image),
             video_url = COALESCE($7, video_url),
             status = COALESCE($8, status), updated_at = now()
         WHERE id = $9 AND user_id = $10
         RETURNING id, slug, title, description, category, ingredients, steps,
                   cover_image, video_url, status, user_id, created_at, updated_at",
    )
    .bind(&payload.title)
    .bind(&payload.description)
    .bind(&payload.category)
    .bind(SqlJson(&payload.ingredients))
    .bind(SqlJson(&payload.steps))
    .bind(&payload.cover_image)
    .bind(&payload.video_url)
    .bind(payload.status)
    .bind(id)
    .bind(user.id)
    .fetch_optional(state.gateway.pool())
    .await?
    .ok_or_else(|| ApiError::not_found_or_forbidden(NOT_FOUND_OR_NOT_OWNER))?;

    Ok(ApiResponse::success(recipe))
}

/// DELETE /api/recipes/:id
pub async fn delete(
    Extension(identity): Extension<CurrentIdentity>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    let user = identity.require_user()?;

    let result = sqlx::query("DELETE FROM recipes WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user.id)
        .execute(state.gateway.pool())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found_or_forbidden(NOT_FOUND_OR_NOT_OWNER));
    }

    Ok(ApiResponse::success(json!({ "deleted": true })))
}

/// GET /api/recipes - published recipes, newest first
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Recipe>> {
    let recipes = sqlx::query_as::<_, Recipe>(
        "SELECT id, slug, title, description, category, ingredients, steps,
                cover_image, video_url, status, user_id, created_at, updated_at
         FROM recipes WHERE status = 'published'
         ORDER BY created_at DESC LIMIT 50",
    )
    .fetch_all(state.gateway.pool())
    .await?;

    Ok(ApiResponse::success(recipes))
}

/// GET /api/recipes/:slug
///
/// Drafts are visible only to their author; to everyone else a draft slug
/// reads as not found.
pub async fn get_by_slug(
    Extension(identity): Extension<CurrentIdentity>,
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<Recipe> {
    let recipe = sqlx::query_as::<_, Recipe>(
        "SELECT id, slug, title, description, category, ingredients, steps,
                cover_image, video_url, status, user_id, created_at, updated_at
         FROM recipes WHERE slug = $1",
    )
    .bind(&slug)
    .fetch_optional(state.gateway.pool())
    .await?
    .ok_or_else(|| ApiError::not_found_or_forbidden("Recipe not found"))?;

    if recipe.status == RecipeStatus::Draft
        && identity.user().map(|u| u.id) != Some(recipe.user_id)
    {
        return Err(ApiError::not_found_or_forbidden("Recipe not found"));
    }

    Ok(ApiResponse::success(recipe))
}
