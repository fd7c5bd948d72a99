// Social interactions: like/bookmark toggles and comments.
//
// Toggles are deliberately check-then-act: read the association row, then
// insert or delete in a second round trip, with no transaction and no
// uniqueness constraint. Two concurrent first toggles from the same user can
// both observe "absent" and both insert; a later toggle deletes every row
// for the pair, so the state converges. The integration suite documents the
// race rather than hiding it.

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config;
use crate::database::models::Comment;
use crate::error::ApiError;
use crate::identity::CurrentIdentity;
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ToggleResult {
    /// True when the toggle left the association present ("on").
    pub active: bool,
}

async fn toggle_association(
    pool: &PgPool,
    table: &'static str,
    recipe_id: Uuid,
    user_id: Uuid,
) -> Result<bool, ApiError> {
    // Check-then-act; see module comment for the concurrency caveat.
    let existing: Option<(Uuid,)> = sqlx::query_as(&format!(
        "SELECT id FROM {} WHERE recipe_id = $1 AND user_id = $2 LIMIT 1",
        table
    ))
    .bind(recipe_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    if existing.is_some() {
        sqlx::query(&format!(
            "DELETE FROM {} WHERE recipe_id = $1 AND user_id = $2",
            table
        ))
        .bind(recipe_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(false)
    } else {
        sqlx::query(&format!(
            "INSERT INTO {} (recipe_id, user_id) VALUES ($1, $2)",
            table
        ))
        .bind(recipe_id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(true)
    }
}

/// POST /api/recipes/:id/like
pub async fn toggle_like(
    Extension(identity): Extension<CurrentIdentity>,
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
) -> ApiResult<ToggleResult> {
    let user = identity.require_user()?;
    let active = toggle_association(state.gateway.pool(), "likes", recipe_id, user.id).await?;
    Ok(ApiResponse::success(ToggleResult { active }))
}

/// POST /api/recipes/:id/bookmark
pub async fn toggle_bookmark(
    Extension(identity): Extension<CurrentIdentity>,
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
) -> ApiResult<ToggleResult> {
    let user = identity.require_user()?;
    let active = toggle_association(state.gateway.pool(), "bookmarks", recipe_id, user.id).await?;
    Ok(ApiResponse::success(ToggleResult { active }))
}

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub content: String,
}

impl AddCommentRequest {
    fn validate(&self) -> Result<(), ApiError> {
        let max = config::config().limits.max_comment_chars;
        let len = self.content.chars().count();
        if len == 0 || len > max {
            return Err(ApiError::validation_field(
                "content",
                format!("must be between 1 and {} characters", max),
            ));
        }
        Ok(())
    }
}

/// POST /api/recipes/:id/comments
pub async fn add_comment(
    Extension(identity): Extension<CurrentIdentity>,
    State(state): State<AppState>,
    Path(recipe_id): Path<Uuid>,
    Json(payload): Json<AddCommentRequest>,
) -> ApiResult<Comment> {
    let user = identity.require_user()?;
    payload.validate()?;

    let comment = sqlx::query_as::<_, Comment>(
        "INSERT INTO comments (recipe_id, user_id, content)
         VALUES ($1, $2, $3)
         RETURNING id, recipe_id, user_id, content, created_at",
    )
    .bind(recipe_id)
    .bind(user.id)
    .bind(&payload.content)
    .fetch_one(state.gateway.pool())
    .await?;

    Ok(ApiResponse::created(comment))
}
