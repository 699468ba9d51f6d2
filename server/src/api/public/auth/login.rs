use crate::api::{error_response, ApiJson, ErrorResponse};
use crate::auth::{create_session, verify_password};
use crate::get_conn;
use crate::models::User;
use crate::schema::users;
use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub token: String,
}

/// An unknown email is a 401; any other lookup error is a logged 500.
fn lookup_failure(error: diesel::result::Error) -> Response {
    match error {
        diesel::result::Error::NotFound => {
            error_response(StatusCode::UNAUTHORIZED, "Invalid credentials")
        }
        e => {
            tracing::error!("Failed to look up user: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to look up user")
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/user/token",
    tag = "auth",
    request_body(content = LoginRequest, example = json!({"email": "user@example.com", "password": "testpass123"})),
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> impl IntoResponse {
    let mut conn = get_conn!(state.pool);

    let user: User = match users::table
        .filter(
            diesel::dsl::sql::<diesel::sql_types::Bool>("LOWER(email) = LOWER(")
                .bind::<diesel::sql_types::Text, _>(req.email.trim())
                .sql(")"),
        )
        .select(User::as_select())
        .first(&mut conn)
    {
        Ok(u) => u,
        Err(e) => return lookup_failure(e),
    };

    if !verify_password(&req.password, &user.password_hash) {
        return error_response(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }

    match create_session(&mut conn, user.id, state.session_ttl_days) {
        Ok(token) => (StatusCode::OK, Json(LoginResponse { token })).into_response(),
        Err(e) => {
            tracing::error!("Failed to create session: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create session")
        }
    }
}
