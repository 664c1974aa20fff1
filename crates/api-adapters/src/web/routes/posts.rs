//! `/api/posts`: the social feed and its engagement actions.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};

use domains::{CommentId, Page, PostId, UserId, MAX_LIMIT};
use services::{PostDetails, DEFAULT_POST_LIMIT, TRENDING_LIMIT};

use crate::dto::{
    CommentRequest, CreatePostRequest, PageQuery, PostSearchQuery, PostView, TrendingQuery,
    UpdatePostRequest,
};
use crate::envelope::{ApiResponse, Pagination};
use crate::web::error::ApiResult;
use crate::web::extract::{ApiJson, ApiPath, ApiQuery, CurrentUser, MaybeUser, Payload};
use crate::web::uploads::{keep_if_ok, store_uploads};
use crate::web::AppState;

const IMAGES_FIELD: &str = "images";

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_posts).post(create_post))
        .route("/trending", get(trending_posts))
        .route("/search", get(search_posts))
        .route("/user/{user_id}", get(user_posts))
        .route("/{id}", get(get_post).put(update_post).delete(delete_post))
        .route("/{id}/like", post(toggle_like))
        .route("/{id}/share", post(share_post))
        .route("/{id}/comments", post(add_comment))
        .route("/{id}/comments/{comment_id}/replies", post(add_reply))
        .route("/{id}/comments/{comment_id}/like", post(toggle_comment_like))
}

fn post_page(state: &AppState, page: &Page<PostDetails>, viewer: Option<UserId>) -> Value {
    json!({
        "posts": PostView::list(&page.items, viewer, state.clock.now()),
        "pagination": Pagination::from(page),
    })
}

fn single(state: &AppState, details: &PostDetails, viewer: UserId) -> Value {
    json!({ "post": PostView::build(details, Some(viewer), state.clock.now()) })
}

async fn list_posts(
    State(state): State<AppState>,
    viewer: MaybeUser,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<ApiResponse<Value>> {
    let page = state
        .services
        .posts
        .list(query.request(DEFAULT_POST_LIMIT))
        .await?;
    Ok(ApiResponse::ok(post_page(&state, &page, viewer.id())))
}

async fn trending_posts(
    State(state): State<AppState>,
    viewer: MaybeUser,
    ApiQuery(query): ApiQuery<TrendingQuery>,
) -> ApiResult<ApiResponse<Value>> {
    let limit = query.limit.unwrap_or(TRENDING_LIMIT).clamp(1, MAX_LIMIT);
    let posts = state.services.posts.trending(limit).await?;
    Ok(ApiResponse::ok(json!({
        "posts": PostView::list(&posts, viewer.id(), state.clock.now()),
    })))
}

async fn search_posts(
    State(state): State<AppState>,
    viewer: MaybeUser,
    ApiQuery(query): ApiQuery<PostSearchQuery>,
) -> ApiResult<ApiResponse<Value>> {
    let page = state
        .services
        .posts
        .search(query.filter(), query.page(DEFAULT_POST_LIMIT))
        .await?;
    Ok(ApiResponse::ok(post_page(&state, &page, viewer.id())))
}

async fn user_posts(
    State(state): State<AppState>,
    viewer: MaybeUser,
    ApiPath(user_id): ApiPath<UserId>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<ApiResponse<Value>> {
    let page = state
        .services
        .posts
        .user_posts(user_id, query.request(DEFAULT_POST_LIMIT))
        .await?;
    Ok(ApiResponse::ok(post_page(&state, &page, viewer.id())))
}

async fn get_post(
    State(state): State<AppState>,
    viewer: MaybeUser,
    ApiPath(id): ApiPath<PostId>,
) -> ApiResult<ApiResponse<Value>> {
    let actor = viewer.actor();
    let details = state.services.posts.get(id, actor.as_ref()).await?;
    Ok(ApiResponse::ok(json!({
        "post": PostView::build(&details, viewer.id(), state.clock.now()),
    })))
}

async fn create_post(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Payload<CreatePostRequest>,
) -> ApiResult<impl IntoResponse> {
    let uploaded = store_uploads(&state, payload.files, IMAGES_FIELD).await?;
    let new_post = payload.data.into_new_post(uploaded.clone());
    let result = state.services.posts.create(&user.actor(), new_post).await;
    let details = keep_if_ok(&state, &uploaded, result).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("post created successfully", single(&state, &details, user.id())),
    ))
}

async fn update_post(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<PostId>,
    payload: Payload<UpdatePostRequest>,
) -> ApiResult<ApiResponse<Value>> {
    let uploaded = store_uploads(&state, payload.files, IMAGES_FIELD).await?;
    let update = payload.data.into_update(uploaded.clone());
    let result = state.services.posts.update(&user.actor(), id, update).await;
    let details = keep_if_ok(&state, &uploaded, result).await?;
    Ok(ApiResponse::with_message(
        "post updated successfully",
        single(&state, &details, user.id()),
    ))
}

/// Soft delete; the document stays but disappears from every listing.
async fn delete_post(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<PostId>,
) -> ApiResult<ApiResponse<()>> {
    state.services.posts.delete(&user.actor(), id).await?;
    Ok(ApiResponse::message("post deleted successfully"))
}

async fn toggle_like(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<PostId>,
) -> ApiResult<ApiResponse<Value>> {
    let toggle = state.services.posts.toggle_like(&user.actor(), id).await?;
    let message = if toggle.liked { "post liked" } else { "post unliked" };
    Ok(ApiResponse::with_message(
        message,
        json!({ "isLiked": toggle.liked, "likeCount": toggle.like_count }),
    ))
}

async fn share_post(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<PostId>,
) -> ApiResult<ApiResponse<Value>> {
    let share_count = state.services.posts.share(&user.actor(), id).await?;
    Ok(ApiResponse::with_message(
        "post shared successfully",
        json!({ "shareCount": share_count }),
    ))
}

async fn add_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<PostId>,
    ApiJson(body): ApiJson<CommentRequest>,
) -> ApiResult<impl IntoResponse> {
    let details = state
        .services
        .posts
        .add_comment(&user.actor(), id, &body.content)
        .await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("comment added successfully", single(&state, &details, user.id())),
    ))
}

async fn add_reply(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath((id, comment_id)): ApiPath<(PostId, CommentId)>,
    ApiJson(body): ApiJson<CommentRequest>,
) -> ApiResult<impl IntoResponse> {
    let details = state
        .services
        .posts
        .add_reply(&user.actor(), id, comment_id, &body.content)
        .await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message("reply added successfully", single(&state, &details, user.id())),
    ))
}

async fn toggle_comment_like(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath((id, comment_id)): ApiPath<(PostId, CommentId)>,
) -> ApiResult<ApiResponse<Value>> {
    let toggle = state
        .services
        .posts
        .toggle_comment_like(&user.actor(), id, comment_id)
        .await?;
    Ok(ApiResponse::ok(json!({
        "isLiked": toggle.liked,
        "likeCount": toggle.like_count,
    })))
}
