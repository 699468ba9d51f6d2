use super::RecipeSummary;
use crate::api::{error_response, ErrorResponse};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::store::{self, recipes::RecipeFilter};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListRecipesParams {
    /// Comma-separated tag IDs; only recipes with at least one of them are returned
    pub tags: Option<String>,
    /// Comma-separated ingredient IDs; only recipes with at least one of them are returned
    pub ingredients: Option<String>,
}

/// Parse a comma-separated id list, ignoring blank entries.
fn parse_ids(field: &str, raw: Option<&str>) -> Result<Vec<Uuid>, String> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Uuid::parse_str(s).map_err(|_| format!("{field}: '{s}' is not a valid id")))
        .collect()
}

impl ListRecipesParams {
    fn to_filter(&self) -> Result<RecipeFilter, String> {
        Ok(RecipeFilter {
            tag_ids: parse_ids("tags", self.tags.as_deref())?,
            ingredient_ids: parse_ids("ingredients", self.ingredients.as_deref())?,
        })
    }
}

#[utoipa::path(
    get,
    path = "/api/recipe/recipes",
    tag = "recipes",
    params(ListRecipesParams),
    responses(
        (status = 200, description = "The user's recipes, newest first", body = Vec<RecipeSummary>),
        (status = 400, description = "Invalid parameters", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_recipes(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    params: Result<Query<ListRecipesParams>, QueryRejection>,
) -> impl IntoResponse {
    let filter = match params
        .map_err(|rejection| rejection.body_text())
        .and_then(|Query(params)| params.to_filter())
    {
        Ok(filter) => filter,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let mut conn = get_conn!(pool);

    match store::recipes::list(&mut conn, user.id, &filter) {
        Ok(records) => {
            let recipes: Vec<RecipeSummary> =
                records.into_iter().map(RecipeSummary::from).collect();
            (StatusCode::OK, Json(recipes)).into_response()
        }
        Err(e) => {
            tracing::error!("Failed to list recipes: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to fetch recipes")
        }
    }
}
