use crate::api::{error_response, ApiJson, ErrorResponse};
use crate::auth::{create_session, hash_password};
use crate::get_conn;
use crate::models::NewUser;
use crate::schema::users;
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

const MIN_PASSWORD_LEN: usize = 5;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SignupResponse {
    pub user_id: Uuid,
    pub token: String,
}

fn validate_signup(req: &SignupRequest) -> Result<(), &'static str> {
    let email = req.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err("A valid email address is required");
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err("Password must be at least 5 characters");
    }
    Ok(())
}

/// Insert the user and their first session together; neither is kept if
/// the other fails.
fn register(
    conn: &mut PgConnection,
    new_user: &NewUser<'_>,
    session_ttl_days: i64,
) -> Result<(Uuid, String), diesel::result::Error> {
    conn.transaction(|conn| {
        let user_id: Uuid = diesel::insert_into(users::table)
            .values(new_user)
            .returning(users::id)
            .get_result(conn)?;

        let token = create_session(conn, user_id, session_ttl_days)?;
        Ok((user_id, token))
    })
}

#[utoipa::path(
    post,
    path = "/api/user/create",
    tag = "auth",
    request_body(content = SignupRequest, example = json!({"email": "user@example.com", "password": "testpass123", "name": "Test User"})),
    responses(
        (status = 201, description = "User created successfully", body = SignupResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> impl IntoResponse {
    if let Err(message) = validate_signup(&req) {
        return error_response(StatusCode::BAD_REQUEST, message);
    }

    let mut conn = get_conn!(state.pool);

    let password_hash = match hash_password(&req.password) {
        Ok(h) => h,
        Err(e) => {
            tracing::error!("Failed to hash password: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to hash password");
        }
    };

    let result = register(
        &mut conn,
        &NewUser {
            email: req.email.trim(),
            name: req.name.trim(),
            password_hash: &password_hash,
        },
        state.session_ttl_days,
    );

    let (user_id, token) = match result {
        Ok(registered) => registered,
        Err(diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            _,
        )) => {
            return error_response(StatusCode::CONFLICT, "Email already registered");
        }
        Err(e) => {
            tracing::error!("Failed to create user: {}", e);
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create user");
        }
    };

    tracing::info!(%user_id, "user signed up");

    (StatusCode::CREATED, Json(SignupResponse { user_id, token })).into_response()
}
