//! Handlers for the `/auth` resource.

use axum::extract::State;
use axum::Json;
use resizer_core::types::DbId;
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::error::AppResult;
use crate::state::AppState;

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserInfo,
}

/// Public part of an account.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: DbId,
    pub username: String,
}

/// POST /api/v1/auth/login
///
/// 401 with `UNAUTHORIZED` for an unknown user or a wrong password.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let user = auth::authenticate(&state.pool, &input.username, &input.password).await?;
    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(LoginResponse {
        user: UserInfo {
            id: user.id,
            username: user.username,
        },
    }))
}
