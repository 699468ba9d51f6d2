pub mod auth;

use crate::AppState;
use axum::routing::post;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for public endpoints (no auth required)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/user/create", post(auth::signup::signup))
        .route("/api/user/token", post(auth::login::login))
}

#[derive(OpenApi)]
#[openapi(
    paths(auth::login::login, auth::signup::signup,),
    components(schemas(
        auth::login::LoginRequest,
        auth::login::LoginResponse,
        auth::signup::SignupRequest,
        auth::signup::SignupResponse,
    ))
)]
pub struct ApiDoc;
