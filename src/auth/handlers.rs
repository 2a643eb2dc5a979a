use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{debug, instrument};

use crate::{
    auth::{
        dto::{Profile, SignInRequest, SignInResponse, SignUpRequest},
        extractors::AuthUser,
    },
    error::AuthError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/sign-up", post(sign_up))
        .route("/sign-in", post(sign_in))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

#[instrument(skip(state, payload))]
pub async fn sign_up(
    State(state): State<AppState>,
    Json(payload): Json<SignUpRequest>,
) -> Result<StatusCode, AuthError> {
    payload.validate()?;
    state.auth.sign_up(payload).await?;
    Ok(StatusCode::CREATED)
}

#[instrument(skip(state, payload))]
pub async fn sign_in(
    State(state): State<AppState>,
    Json(payload): Json<SignInRequest>,
) -> Result<Json<SignInResponse>, AuthError> {
    payload.validate()?;
    let token = state.auth.sign_in(payload).await?;
    Ok(Json(SignInResponse { token }))
}

#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn get_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Profile>, AuthError> {
    debug!(roles = ?user.roles, "profile requested");
    let profile = state.auth.profile(&user.user_id).await?;
    Ok(Json(profile))
}
