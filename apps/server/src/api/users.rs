//! User management routes.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use hearth_core::{NewUser, UserProfile};

use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/users", get(list).post(create))
}

/// GET /api/users
async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<UserProfile>>> {
    Ok(Json(state.auth.list_users().await?))
}

/// POST /api/users
async fn create(
    State(state): State<AppState>,
    body: Result<Json<NewUser>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    let Json(user) = body?;
    let user = state.auth.create_user(user).await?;
    Ok((StatusCode::CREATED, Json(user)))
}
