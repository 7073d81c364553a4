//! User data publication.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;

use super::auth::MaybeAuthUser;
use crate::services::account::{self, UserData};
use crate::state::AppState;

/// `GET /api/users/me/data` — the caller's own publishable fields.
///
/// Anonymous callers get `null` rather than an error, so the client can
/// treat "no session" as an ordinary empty result.
pub async fn user_data(
    State(state): State<AppState>,
    MaybeAuthUser(auth): MaybeAuthUser,
) -> Result<Json<Option<UserData>>, StatusCode> {
    let Some(auth) = auth else {
        return Ok(Json(None));
    };
    let user = account::load_user_data(&state.pool, auth.user_id).await.map_err(|e| {
        tracing::error!(error = %e, user_id = %auth.user_id, "user data lookup failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    Ok(Json(user))
}
