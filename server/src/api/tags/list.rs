use crate::api::labels::{self, ListLabelsParams, TAGS};
use crate::api::{ErrorResponse, LabelItem};
use crate::auth::AuthUser;
use crate::db::DbPool;
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::IntoResponse,
};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/recipe/tags",
    tag = "tags",
    params(ListLabelsParams),
    responses(
        (status = 200, description = "The user's tags, by name descending", body = Vec<LabelItem>),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_tags(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    params: Result<Query<ListLabelsParams>, QueryRejection>,
) -> impl IntoResponse {
    labels::list(&TAGS, &pool, user.id, params)
}
