use crate::api::labels::{self, UpdateLabelRequest, INGREDIENTS};
use crate::api::{ApiJson, ErrorResponse, LabelItem};
use crate::auth::AuthUser;
use crate::db::DbPool;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    patch,
    path = "/api/recipe/ingredients/{id}",
    tag = "ingredients",
    params(
        ("id" = Uuid, Path, description = "Ingredient ID")
    ),
    request_body = UpdateLabelRequest,
    responses(
        (status = 200, description = "Ingredient updated", body = LabelItem),
        (status = 400, description = "Invalid request (empty name)", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Ingredient not found", body = ErrorResponse),
        (status = 409, description = "Ingredient with that name already exists", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn patch_ingredient(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    ApiJson(request): ApiJson<UpdateLabelRequest>,
) -> impl IntoResponse {
    labels::update(&INGREDIENTS, &pool, user.id, id, request, true)
}

#[utoipa::path(
    put,
    path = "/api/recipe/ingredients/{id}",
    tag = "ingredients",
    params(
        ("id" = Uuid, Path, description = "Ingredient ID")
    ),
    request_body = UpdateLabelRequest,
    responses(
        (status = 200, description = "Ingredient replaced", body = LabelItem),
        (status = 400, description = "Invalid request (missing or empty name)", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Ingredient not found", body = ErrorResponse),
        (status = 409, description = "Ingredient with that name already exists", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn put_ingredient(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    ApiJson(request): ApiJson<UpdateLabelRequest>,
) -> impl IntoResponse {
    labels::update(&INGREDIENTS, &pool, user.id, id, request, false)
}
