use super::{validate_entries, validate_link, validate_time_minutes, validate_title, RecipeDetail};
use crate::api::{error_response, ApiJson, ErrorResponse, NameEntry};
use crate::auth::AuthUser;
use crate::db::DbPool;
use crate::get_conn;
use crate::store::{self, recipes::RecipeDraft};
use crate::types::Price;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRecipeRequest {
    pub title: String,
    pub time_minutes: i32,
    #[schema(value_type = String, example = "4.50")]
    pub price: Price,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub description: String,
    /// Tags to attach, created for the user if they don't exist yet
    #[serde(default)]
    pub tags: Vec<NameEntry>,
    /// Ingredients to attach, created for the user if they don't exist yet
    #[serde(default)]
    pub ingredients: Vec<NameEntry>,
}

impl CreateRecipeRequest {
    pub fn into_draft(self) -> Result<RecipeDraft, String> {
        Ok(RecipeDraft {
            title: validate_title(&self.title)?,
            time_minutes: validate_time_minutes(self.time_minutes)?,
            price: self.price,
            link: validate_link(&self.link)?,
            description: self.description,
            tags: validate_entries("tags", self.tags)?,
            ingredients: validate_entries("ingredients", self.ingredients)?,
        })
    }
}

#[utoipa::path(
    post,
    path = "/api/recipe/recipes",
    tag = "recipes",
    request_body = CreateRecipeRequest,
    responses(
        (status = 201, description = "Recipe created successfully", body = RecipeDetail),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_recipe(
    AuthUser(user): AuthUser,
    State(pool): State<Arc<DbPool>>,
    ApiJson(request): ApiJson<CreateRecipeRequest>,
) -> impl IntoResponse {
    let draft = match request.into_draft() {
        Ok(draft) => draft,
        Err(message) => return error_response(StatusCode::BAD_REQUEST, message),
    };

    let mut conn = get_conn!(pool);

    match store::recipes::create(&mut conn, user.id, &draft) {
        Ok(record) => (StatusCode::CREATED, Json(RecipeDetail::from(record))).into_response(),
        Err(e) => {
            tracing::error!("Failed to create recipe: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Failed to create recipe")
        }
    }
}
