use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// At most one Like per (recipe, user), enforced by application-level
/// check-then-act rather than a uniqueness constraint. Concurrent first
/// toggles can transiently insert duplicates; see the social handler tests.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub user_id: Uuid,
}

/// Same shape and invariant as Like, independent association.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub user_id: Uuid,
}

/// Comments are append-only: never updated in place, not deletable.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub recipe_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}
