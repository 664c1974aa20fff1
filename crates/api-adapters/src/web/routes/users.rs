//! `/api/users`: member directory and admin account management.

use axum::extract::State;
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};

use domains::{Page, User, UserId};
use services::DEFAULT_USER_LIMIT;

use crate::dto::{AdminUserRequest, PageQuery, UserSearchQuery, UserView};
use crate::envelope::{ApiResponse, Pagination};
use crate::web::error::ApiResult;
use crate::web::extract::{ApiJson, ApiPath, ApiQuery, CurrentUser};
use crate::web::AppState;

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/search", get(search_users))
        .route("/stats/overview", get(user_stats))
        .route("/{id}", get(get_user).put(update_user).delete(deactivate_user))
}

fn user_page(page: &Page<User>) -> Value {
    json!({
        "users": page.items.iter().map(UserView::from).collect::<Vec<_>>(),
        "pagination": Pagination::from(page),
    })
}

async fn list_users(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<ApiResponse<Value>> {
    let page = state
        .services
        .users
        .list(query.request(DEFAULT_USER_LIMIT))
        .await?;
    Ok(ApiResponse::ok(user_page(&page)))
}

async fn search_users(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiQuery(query): ApiQuery<UserSearchQuery>,
) -> ApiResult<ApiResponse<Value>> {
    let request = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .request(DEFAULT_USER_LIMIT);
    let page = state.services.users.search(&query.q, request).await?;
    Ok(ApiResponse::ok(user_page(&page)))
}

async fn get_user(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiPath(id): ApiPath<UserId>,
) -> ApiResult<ApiResponse<Value>> {
    let user = state.services.users.get(id).await?;
    Ok(ApiResponse::ok(json!({ "user": UserView::from(&user) })))
}

async fn update_user(
    State(state): State<AppState>,
    admin: CurrentUser,
    ApiPath(id): ApiPath<UserId>,
    ApiJson(body): ApiJson<AdminUserRequest>,
) -> ApiResult<ApiResponse<Value>> {
    let user = state
        .services
        .users
        .update(&admin.actor(), id, body.into())
        .await?;
    Ok(ApiResponse::with_message(
        "user updated successfully",
        json!({ "user": UserView::from(&user) }),
    ))
}

/// Soft delete: the account is deactivated, never removed.
async fn deactivate_user(
    State(state): State<AppState>,
    admin: CurrentUser,
    ApiPath(id): ApiPath<UserId>,
) -> ApiResult<ApiResponse<()>> {
    state.services.users.deactivate(&admin.actor(), id).await?;
    Ok(ApiResponse::message("user deactivated successfully"))
}

async fn user_stats(
    State(state): State<AppState>,
    admin: CurrentUser,
) -> ApiResult<ApiResponse<Value>> {
    let stats = state.services.users.stats(&admin.actor()).await?;
    Ok(ApiResponse::ok(json!({ "stats": stats })))
}
