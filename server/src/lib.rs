pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod models;
pub mod schema;
pub mod store;
pub mod telemetry;
pub mod types;

use axum::extract::{FromRef, MatchedPath};
use axum::http::Request;
use axum::Router;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::Span;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<db::DbPool>,
    /// Lifetime of tokens issued at signup and login
    pub session_ttl_days: i64,
}

impl FromRef<AppState> for Arc<db::DbPool> {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}

/// Assemble every route, the Swagger UI and request tracing.
pub fn build_router(state: AppState) -> Router {
    let swagger_ui = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api::openapi());

    Router::new()
        .merge(api::public::router())
        .nest("/api/recipe/tags", api::tags::router())
        .nest("/api/recipe/ingredients", api::ingredients::router())
        .nest("/api/recipe/recipes", api::recipes::router())
        .with_state(state)
        .merge(swagger_ui)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let matched_path = request
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str)
                        .unwrap_or(request.uri().path());

                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %matched_path,
                    )
                })
                .on_request(|_request: &Request<_>, _span: &Span| {})
                .on_response(
                    |response: &axum::http::Response<_>, latency: Duration, _span: &Span| {
                        let status = response.status().as_u16();
                        if status >= 500 {
                            tracing::error!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request failed with server error"
                            );
                        } else {
                            tracing::info!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request completed"
                            );
                        }
                    },
                )
                .on_failure(
                    |error: tower_http::classify::ServerErrorsFailureClass,
                     latency: Duration,
                     _span: &Span| {
                        tracing::error!(
                            error = %error,
                            latency_ms = %latency.as_millis(),
                            "request failed"
                        );
                    },
                ),
        )
}
