use super::{validate_entries, validate_link, validate_time_minutes, validate_title, RecipeDetail};
use crate::api::{error_response, ApiJson, ErrorResponse, NameEntry};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::store::{self, recipes::RecipeChanges, StoreError};
use crate::types::{FieldUpdate, Price};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

/// Partial update. Absent fields are left unchanged; `null` is rejected. A
/// present `tags` or `ingredients` list (even an empty one) replaces the
/// whole set.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateRecipeRequest {
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub title: FieldUpdate<String>,
    #[serde(default)]
    #[schema(value_type = Option<i32>)]
    pub time_minutes: FieldUpdate<i32>,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "4.50")]
    pub price: FieldUpdate<Price>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub link: FieldUpdate<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub description: FieldUpdate<String>,
    #[serde(default)]
    #[schema(value_type = Option<Vec<NameEntry>>)]
    pub tags: FieldUpdate<Vec<NameEntry>>,
    #[serde(default)]
    #[schema(value_type = Option<Vec<NameEntry>>)]
    pub ingredients: FieldUpdate<Vec<NameEntry>>,
}

/// Full update. Scalar fields `title`, `time_minutes` and `price` are
/// required; the rest behave as in a partial update.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReplaceRecipeRequest {
    pub title: String,
    pub time_minutes: i32,
    #[schema(value_type = String, example = "4.50")]
    pub price: Price,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub link: FieldUpdate<String>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub description: FieldUpdate<String>,
    #[serde(default)]
    #[schema(value_type = Option<Vec<NameEntry>>)]
    pub tags: FieldUpdate<Vec<NameEntry>>,
    #[serde(default)]
    #[schema(value_type = Option<Vec<NameEntry>>)]
    pub ingredients: FieldUpdate<Vec<NameEntry>>,
}

fn validate_relation(
    field: &str,
    update: FieldUpdate<Vec<NameEntry>>,
) -> Result<FieldUpdate<Vec<String>>, String> {
    match update {
        FieldUpdate::Unset => Ok(FieldUpdate::Unset),
        FieldUpdate::SetTo(entries) => validate_entries(field, entries).map(FieldUpdate::SetTo),
    }
}

impl UpdateRecipeRequest {
    pub fn into_changes(self) -> Result<RecipeChanges, String> {
        Ok(RecipeChanges {
            title: self.title.into_option().as_deref().map(validate_title).transpose()?,
            time_minutes: self
                .time_minutes
                .into_option()
                .map(validate_time_minutes)
                .transpose()?,
            price: self.price.into_option(),
            link: self.link.into_option().as_deref().map(validate_link).transpose()?,
            description: self.description.into_option(),
            tags: validate_relation("tags", self.tags)?,
            ingredients: validate_relation("ingredients", self.ingredients)?,
        })
    }
}

impl ReplaceRecipeRequest {
    pub fn into_changes(self) -> Result<RecipeChanges, String> {
        UpdateRecipeRequest {
            title: FieldUpdate::SetTo(self.title),
            time_minutes: FieldUpdate::SetTo(self.time_minutes),
            price: FieldUpdate::SetTo(self.price),
            link: self.link,
            description: self.description,
            tags: self.tags,
            ingredients: self.ingredients,
        }
        .into_changes()
    }
}

fn apply_changes(
    pool: &DbPool,
    user_id: Uuid,
    id: Uuid,
    changes: Result<RecipeChanges, String>,
) -> axum::response::Response {
    let changes = match changes {
        Ok(changes) => changes,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let mut conn = get_conn!(pool);

    match store::recipes::update(&mut conn, user_id, id, &changes) {
        Ok(record) => (StatusCode::OK, Json(RecipeDetail::from(record))).into_response(),
        Err(StoreError::NotFound) => error_response(StatusCode::NOT_FOUND, "Recipe not found"),
        Err(e) => {
            tracing::error!("Failed to update recipe: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to update recipe")
        }
    }
}

#[utoipa::path(
    patch,
    path = "/api/recipe/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Recipe updated successfully", body = RecipeDetail),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    ApiJson(request): ApiJson<UpdateRecipeRequest>,
) -> impl IntoResponse {
    apply_changes(&pool, user.id, id, request.into_changes())
}

#[utoipa::path(
    put,
    path = "/api/recipe/recipes/{id}",
    tag = "recipes",
    params(
        ("id" = Uuid, Path, description = "Recipe ID")
    ),
    request_body = ReplaceRecipeRequest,
    responses(
        (status = 200, description = "Recipe replaced successfully", body = RecipeDetail),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 404, description = "Recipe not found", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn replace_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    Path(id): Path<Uuid>,
    ApiJson(request): ApiJson<ReplaceRecipeRequest>,
) -> impl IntoResponse {
    apply_changes(&pool, user.id, id, request.into_changes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn changes(body: serde_json::Value) -> Result<RecipeChanges, String> {
        serde_json::from_value::<UpdateRecipeRequest>(body)
            .unwrap()
            .into_changes()
    }

    #[test]
    fn test_empty_patch_changes_nothing() {
        let changes = changes(json!({})).unwrap();
        assert!(changes.title.is_none());
        assert!(changes.price.is_none());
        assert_eq!(changes.tags, FieldUpdate::Unset);
        assert_eq!(changes.ingredients, FieldUpdate::Unset);
    }

    #[test]
    fn test_empty_tags_list_clears() {
        let changes = changes(json!({"tags": []})).unwrap();
        assert_eq!(changes.tags, FieldUpdate::SetTo(vec![]));
        assert_eq!(changes.ingredients, FieldUpdate::Unset);
    }

    #[test]
    fn test_tags_replaced_with_validated_names() {
        let changes = changes(json!({"tags": [{"name": " Lunch "}]})).unwrap();
        assert_eq!(changes.tags, FieldUpdate::SetTo(vec!["Lunch".to_string()]));
    }

    #[test]
    fn test_invalid_fields_rejected() {
        assert!(changes(json!({"title": "  "})).is_err());
        assert!(changes(json!({"time_minutes": -1})).is_err());
        assert!(changes(json!({"ingredients": [{"name": ""}]})).is_err());
    }

    #[test]
    fn test_null_scalars_rejected() {
        for body in [
            json!({"title": null}),
            json!({"time_minutes": null, "tags": []}),
            json!({"price": null}),
            json!({"link": null}),
            json!({"description": null}),
        ] {
            let parsed: Result<UpdateRecipeRequest, _> = serde_json::from_value(body.clone());
            assert!(parsed.is_err(), "{body}");
        }

        let parsed: Result<ReplaceRecipeRequest, _> = serde_json::from_value(
            json!({"title": "Soup", "time_minutes": 5, "price": "3.00", "link": null}),
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_scalar_patch_sets_only_given_fields() {
        let changes = changes(json!({"description": "", "price": 2})).unwrap();
        assert_eq!(changes.description.as_deref(), Some(""));
        assert_eq!(changes.price, Some(Price::from_cents(200)));
        assert!(changes.title.is_none());
        assert!(changes.link.is_none());
    }

    #[test]
    fn test_replace_requires_scalars() {
        let missing: Result<ReplaceRecipeRequest, _> =
            serde_json::from_value(json!({"title": "Soup", "time_minutes": 5}));
        assert!(missing.is_err());

        let changes = serde_json::from_value::<ReplaceRecipeRequest>(
            json!({"title": "Soup", "time_minutes": 5, "price": "3.00"}),
        )
        .unwrap()
        .into_changes()
        .unwrap();
        assert_eq!(changes.title.as_deref(), Some("Soup"));
        assert_eq!(changes.price, Some(Price::from_cents(300)));
        assert!(changes.link.is_none());
        assert_eq!(changes.tags, FieldUpdate::Unset);
    }
}
