//! Request handling shared by the tag and ingredient endpoints.
//!
//! The two resources behave identically; each handler module passes the
//! `LabelOps` for its table.

use crate::api::{error_response, validate_name, ErrorResponse, LabelItem};
use crate::db::DbPool;
use crate::get_conn;
use crate::models::Label;
use crate::store::labels::{ingredients, tags};
use crate::store::StoreError;
use axum::{
    extract::{rejection::QueryRejection, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use diesel::prelude::*;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Store operations for one label table.
pub struct LabelOps {
    pub noun: &'static str,
    pub list: fn(&mut PgConnection, Uuid, bool) -> QueryResult<Vec<Label>>,
    pub find: fn(&mut PgConnection, Uuid, Uuid) -> Result<Label, StoreError>,
    pub rename: fn(&mut PgConnection, Uuid, Uuid, &str) -> Result<Label, StoreError>,
    pub delete: fn(&mut PgConnection, Uuid, Uuid) -> Result<(), StoreError>,
}

pub const TAGS: LabelOps = LabelOps {
    noun: "Tag",
    list: tags::list,
    find: tags::find,
    rename: tags::rename,
    delete: tags::delete,
};

pub const INGREDIENTS: LabelOps = LabelOps {
    noun: "Ingredient",
    list: ingredients::list,
    find: ingredients::find,
    rename: ingredients::rename,
    delete: ingredients::delete,
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListLabelsParams {
    /// When non-zero, only return entries attached to at least one recipe
    pub assigned_only: Option<i32>,
}

impl ListLabelsParams {
    pub fn assigned_only(&self) -> bool {
        self.assigned_only.is_some_and(|v| v != 0)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateLabelRequest {
    /// New name. Required for PUT, optional for PATCH.
    pub name: Option<String>,
}

pub fn list(
    ops: &LabelOps,
    pool: &DbPool,
    user_id: Uuid,
    params: Result<Query<ListLabelsParams>, QueryRejection>,
) -> Response {
    let params = match params {
        Ok(Query(params)) => params,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    let mut conn = get_conn!(pool);

    match (ops.list)(&mut conn, user_id, params.assigned_only()) {
        Ok(rows) => {
            let items: Vec<LabelItem> = rows.into_iter().map(LabelItem::from).collect();
            (StatusCode::OK, Json(items)).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to list {}s: {}", ops.noun.to_lowercase(), e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to fetch {}s", ops.noun.to_lowercase()),
            )
        }
    }
}

/// Rename one entry. With `partial`, a missing name leaves the entry as is.
pub fn update(
    ops: &LabelOps,
    pool: &DbPool,
    user_id: Uuid,
    id: Uuid,
    request: UpdateLabelRequest,
    partial: bool,
) -> Response {
    let name = match request.name {
        Some(name) => match validate_name("name", &name) {
            Ok(name) => Some(name),
            Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
        },
        None if partial => None,
        None => return error_response(StatusCode::BAD_REQUEST, "name is required"),
    };

    let mut conn = get_conn!(pool);

    let result = match &name {
        Some(name) => (ops.rename)(&mut conn, user_id, id, name),
        None => (ops.find)(&mut conn, user_id, id),
    };

    match result {
        Ok(label) => (StatusCode::OK, Json(LabelItem::from(label))).into_response(),
        Err(StoreError::NotFound) => not_found(ops),
        Err(e) => e.into_response(),
    }
}

pub fn delete(ops: &LabelOps, pool: &DbPool, user_id: Uuid, id: Uuid) -> Response {
    let mut conn = get_conn!(pool);

    match (ops.delete)(&mut conn, user_id, id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(StoreError::NotFound) => not_found(ops),
        Err(e) => e.into_response(),
    }
}

fn not_found(ops: &LabelOps) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("{} not found", ops.noun),
        }),
    )
        .into_response()
}
