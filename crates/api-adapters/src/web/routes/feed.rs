//! `/api/feed`: home-page aggregates.

use axum::extract::State;
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};

use services::DEFAULT_POST_LIMIT;

use crate::dto::{FeedView, PageQuery, PersonalizedFeedView};
use crate::envelope::ApiResponse;
use crate::web::error::ApiResult;
use crate::web::extract::{ApiQuery, CurrentUser, MaybeUser};
use crate::web::AppState;

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(feed))
        .route("/personalized", get(personalized_feed))
        .route("/stats", get(feed_stats))
}

async fn feed(
    State(state): State<AppState>,
    viewer: MaybeUser,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<ApiResponse<FeedView>> {
    let feed = state
        .services
        .feed
        .feed(query.request(DEFAULT_POST_LIMIT))
        .await?;
    Ok(ApiResponse::ok(FeedView::build(&feed, viewer.id(), state.clock.now())))
}

async fn personalized_feed(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<ApiResponse<PersonalizedFeedView>> {
    let feed = state
        .services
        .feed
        .personalized(&user.actor(), query.request(DEFAULT_POST_LIMIT))
        .await?;
    Ok(ApiResponse::ok(PersonalizedFeedView::build(
        &feed,
        user.id(),
        state.clock.now(),
    )))
}

async fn feed_stats(State(state): State<AppState>) -> ApiResult<ApiResponse<Value>> {
    let stats = state.services.feed.stats().await?;
    Ok(ApiResponse::ok(json!({ "stats": stats })))
}
