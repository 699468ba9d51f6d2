use crate::api::labels::{self, ListLabelsParams, INGREDIENTS};
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
    path = "/api/recipe/ingredients",
    tag = "ingredients",
    params(ListLabelsParams),
    responses(
        (status = 200, description = "The user's ingredients, by name descending", body = Vec<LabelItem>),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_ingredients(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    params: Result<Query<ListLabelsParams>, QueryRejection>,
) -> impl IntoResponse {
    labels::list(&INGREDIENTS, &pool, user.id, params)
}
