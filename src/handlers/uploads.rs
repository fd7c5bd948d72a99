// Direct-to-storage upload authorization. The server validates the request,
// derives a user-namespaced object key, and returns a presigned PUT URL; the
// file bytes never pass through this API and the client never sees storage
// account secrets.

use axum::{extract::State, Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::ApiError;
use crate::identity::CurrentIdentity;
use crate::response::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::storage::{self, StorageSigner};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignRequest {
    pub file_type: String,
    pub file_size: u64,
}

impl PresignRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.file_type.is_empty() {
            return Err(ApiError::validation_field("fileType", "must not be empty"));
        }
        let max = config::config().limits.max_upload_bytes;
        if self.file_size == 0 || self.file_size > max {
            return Err(ApiError::validation_field(
                "fileSize",
                format!("must be between 1 and {} bytes", max),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresignResponse {
    pub upload_url: String,
    pub file_key: String,
    /// Where the object will be served from once uploaded. Deriving this URL
    /// does not confirm the upload happened.
    pub public_url: String,
}

/// Validation runs before any signing call; an oversized request never
/// reaches the signer. Factored out of the axum handler so tests can assert
/// that with a counting fake.
pub async fn issue_credential(
    signer: &dyn StorageSigner,
    user_id: uuid::Uuid,
    request: &PresignRequest,
) -> Result<PresignResponse, ApiError> {
    request.validate()?;

    let key = storage::object_key(user_id, Utc::now());
    let upload_url = signer
        .presign_put(&key, &request.file_type, request.file_size)
        .await?;

    let public_url = storage::public_url(&config::config().storage.public_domain, &key);

    Ok(PresignResponse {
        upload_url,
        file_key: key,
        public_url,
    })
}

/// POST /api/uploads/presign
pub async fn presign(
    Extension(identity): Extension<CurrentIdentity>,
    State(state): State<AppState>,
    Json(payload): Json<PresignRequest>,
) -> ApiResult<PresignResponse> {
    let user = identity.require_user()?;
    let response = issue_credential(state.signer.as_ref(), user.id, &payload).await?;
    Ok(ApiResponse::success(response))
}
