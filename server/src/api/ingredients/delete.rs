use crate::api::labels::{self, INGREDIENTS};
use crate::api::ErrorResponse;
use crate::auth::AuthUser;
use crate::db::DbPool;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    delete,
    path = "/api/recipe/ingredients/{id}",
    tag = "ingredients",
    params(
        ("id" = Uuid, Path, description = "Ingredient ID")
    ),
    responses(
        (status = 204, description = "Ingredient deleted"),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Ingredient not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_ingredient(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    labels::delete(&INGREDIENTS, &pool, user.id, id)
}
