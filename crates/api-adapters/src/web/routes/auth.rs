//! `/api/auth`: registration, login and self-service account changes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::Router;
use serde::de::IgnoredAny;
use serde_json::{json, Value};

use domains::DomainError;

use crate::dto::{LoginRequest, PasswordRequest, ProfileRequest, RegisterRequest, SessionView, UserView};
use crate::envelope::ApiResponse;
use crate::web::error::ApiResult;
use crate::web::extract::{ApiJson, CurrentUser, Payload};
use crate::web::uploads::{keep_if_ok, store_uploads};
use crate::web::AppState;

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/profile", put(update_profile))
        .route("/password", put(change_password))
        .route("/avatar", post(upload_avatar))
        .route("/logout", post(logout))
}

async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    let session = state.services.auth.register(body.into()).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("user registered successfully", SessionView::from(&session)),
    ))
}

async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> ApiResult<ApiResponse<SessionView>> {
    let session = state.services.auth.login(&body.email, &body.password).await?;
    Ok(ApiResponse::with_message("login successful", SessionView::from(&session)))
}

async fn me(State(state): State<AppState>, user: CurrentUser) -> ApiResult<ApiResponse<Value>> {
    let user = state.services.auth.me(&user.actor()).await?;
    Ok(ApiResponse::ok(json!({ "user": UserView::from(&user) })))
}

async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(body): ApiJson<ProfileRequest>,
) -> ApiResult<ApiResponse<Value>> {
    let user = state
        .services
        .auth
        .update_profile(&user.actor(), body.into())
        .await?;
    Ok(ApiResponse::with_message(
        "profile updated successfully",
        json!({ "user": UserView::from(&user) }),
    ))
}

async fn change_password(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(body): ApiJson<PasswordRequest>,
) -> ApiResult<ApiResponse<()>> {
    state
        .services
        .auth
        .change_password(&user.actor(), &body.current_password, &body.new_password)
        .await?;
    Ok(ApiResponse::message("password updated successfully"))
}

/// Expects exactly one file in the `image` field. The previous avatar file
/// is removed once the new one is saved.
async fn upload_avatar(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Payload<IgnoredAny>,
) -> ApiResult<ApiResponse<Value>> {
    if payload.files.len() != 1 {
        return Err(DomainError::validation("please upload exactly one image").into());
    }
    let previous = user.0.avatar.clone();
    let paths = store_uploads(&state, payload.files, "image").await?;
    let Some(path) = paths.first().cloned() else {
        return Err(DomainError::validation("please upload exactly one image").into());
    };
    let result = state.services.auth.set_avatar(&user.actor(), path).await;
    let updated = keep_if_ok(&state, &paths, result).await?;

    if !previous.is_empty() && previous != updated.avatar {
        if let Err(err) = state.media.remove(&previous).await {
            tracing::warn!(path = %previous, error = %err, "failed to remove previous avatar");
        }
    }
    Ok(ApiResponse::with_message(
        "avatar uploaded successfully",
        json!({ "user": UserView::from(&updated) }),
    ))
}

/// Tokens are stateless; the client simply discards its copy.
async fn logout(_user: CurrentUser) -> ApiResponse<()> {
    ApiResponse::message("logged out successfully")
}
