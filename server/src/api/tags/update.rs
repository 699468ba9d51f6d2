use crate::api::labels::{self, UpdateLabelRequest, TAGS};
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
    path = "/api/recipe/tags/{id}",
    tag = "tags",
    params(
        ("id" = Uuid, Path, description = "Tag ID")
    ),
    request_body = UpdateLabelRequest,
    responses(
        (status = 200, description = "Tag updated", body = LabelItem),
        (status = 400, description = "Invalid request (empty name)", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Tag not found", body = ErrorResponse),
        (status = 409, description = "Tag with that name already exists", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn patch_tag(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    ApiJson(request): ApiJson<UpdateLabelRequest>,
) -> impl IntoResponse {
    labels::update(&TAGS, &pool, user.id, id, request, true)
}

#[utoipa::path(
    put,
    path = "/api/recipe/tags/{id}",
    tag = "tags",
    params(
        ("id" = Uuid, Path, description = "Tag ID")
    ),
    request_body = UpdateLabelRequest,
    responses(
        (status = 200, description = "Tag replaced", body = LabelItem),
        (status = 400, description = "Invalid request (missing or empty name)", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Tag not found", body = ErrorResponse),
        (status = 409, description = "Tag with that name already exists", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn put_tag(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    ApiJson(request): ApiJson<UpdateLabelRequest>,
) -> impl IntoResponse {
    labels::update(&TAGS, &pool, user.id, id, request, false)
}
