//! # Web layer
//!
//! axum router for the `/api` surface. Handlers translate HTTP into service
//! calls and service results into the JSON envelope; they hold no business
//! rules of their own.

mod error;
mod extract;
mod routes;
mod uploads;

pub use error::{status_of, ApiError, ApiResult};
pub use extract::{ApiJson, ApiPath, ApiQuery, CurrentUser, MaybeUser, Payload};

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{DefaultBodyLimit, Request, State};
use axum::http::{header, HeaderValue, Method};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::Level;

use domains::{Clock, MediaStorage, SystemClock};
use services::Services;

use crate::envelope::ApiResponse;
use crate::metrics::HttpMetrics;

/// Limits applied to multipart uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_files: usize,
    pub max_file_size: usize,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_files: 10,
            max_file_size: 5 * 1024 * 1024,
        }
    }
}

impl UploadPolicy {
    /// Whole-request body limit: every file at full size plus room for text
    /// fields and multipart framing.
    fn body_limit(&self) -> usize {
        self.max_files
            .saturating_mul(self.max_file_size)
            .saturating_add(1024 * 1024)
    }
}

#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub media: Arc<dyn MediaStorage>,
    pub uploads: UploadPolicy,
    pub metrics: Arc<HttpMetrics>,
    /// Reference time for derived values such as `timeAgo`.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(services: Services, media: Arc<dyn MediaStorage>, uploads: UploadPolicy) -> Self {
        Self {
            services,
            media,
            uploads,
            metrics: Arc::new(HttpMetrics::new()),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

/// Outer-surface options that do not belong to any service.
#[derive(Debug, Clone, Default)]
pub struct WebOptions {
    /// Allowed CORS origins. Empty or `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// Directory served under `uploads_url`, when set.
    pub uploads_dir: Option<PathBuf>,
    pub uploads_url: String,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(origins))
}

async fn track_requests(State(metrics): State<Arc<HttpMetrics>>, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let response = next.run(req).await;
    metrics.record(method.as_str(), response.status().as_u16());
    response
}

/// Builds the complete application router.
pub fn router(state: AppState, options: WebOptions) -> Router {
    let api = Router::new()
        .nest("/auth", routes::auth::routes())
        .nest("/users", routes::users::routes())
        .nest("/pets", routes::pets::routes())
        .nest("/posts", routes::posts::routes())
        .nest("/feed", routes::feed::routes())
        .merge(routes::health::routes());

    let mut app = Router::new().nest("/api", api);
    if let Some(dir) = options.uploads_dir {
        let prefix = format!("/{}", options.uploads_url.trim_matches('/'));
        if prefix == "/" {
            tracing::warn!("uploads url prefix is empty, not serving uploaded files");
        } else {
            app = app.nest_service(&prefix, ServeDir::new(dir));
        }
    }

    let body_limit = state.uploads.body_limit();
    let metrics = Arc::clone(&state.metrics);

    app.layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn_with_state(metrics, track_requests))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(|req: &Request| {
                            let request_id = req
                                .headers()
                                .get("x-request-id")
                                .and_then(|v| v.to_str().ok())
                                .unwrap_or_default();
                            tracing::info_span!(
                                "http",
                                method = %req.method(),
                                uri = %req.uri(),
                                request_id = %request_id,
                            )
                        })
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors_layer(&options.cors_origins))
                .layer(CompressionLayer::new()),
        )
        .with_state(state)
}
