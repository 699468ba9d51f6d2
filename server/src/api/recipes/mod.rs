pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use crate::api::{validate_name, LabelItem, NameEntry, MAX_NAME_LEN};
use crate::store::recipes::RecipeRecord;
use crate::types::Price;
use crate::AppState;
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

/// Returns the router for /api/recipe/recipes endpoints (mounted at /api/recipe/recipes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_recipes).post(create::create_recipe))
        .route(
            "/{id}",
            get(get::get_recipe)
                .patch(update::update_recipe)
                .put(update::replace_recipe)
                .delete(delete::delete_recipe),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        create::create_recipe,
        list::list_recipes,
        get::get_recipe,
        update::update_recipe,
        update::replace_recipe,
        delete::delete_recipe,
    ),
    components(schemas(
        create::CreateRecipeRequest,
        update::UpdateRecipeRequest,
        update::ReplaceRecipeRequest,
        RecipeSummary,
        RecipeDetail,
    ))
)]
pub struct ApiDoc;

/// A recipe as it appears in listings
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeSummary {
    pub id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    #[schema(value_type = String, example = "4.50")]
    pub price: Price,
    pub link: String,
    pub tags: Vec<LabelItem>,
    pub ingredients: Vec<LabelItem>,
}

/// A single recipe with every field
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RecipeDetail {
    pub id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    #[schema(value_type = String, example = "4.50")]
    pub price: Price,
    pub link: String,
    pub description: String,
    pub tags: Vec<LabelItem>,
    pub ingredients: Vec<LabelItem>,
}

impl From<RecipeRecord> for RecipeSummary {
    fn from(record: RecipeRecord) -> Self {
        RecipeSummary {
            id: record.recipe.id,
            title: record.recipe.title,
            time_minutes: record.recipe.time_minutes,
            price: Price::from_cents(record.recipe.price_cents),
            link: record.recipe.link,
            tags: record.tags.into_iter().map(LabelItem::from).collect(),
            ingredients: record.ingredients.into_iter().map(LabelItem::from).collect(),
        }
    }
}

impl From<RecipeRecord> for RecipeDetail {
    fn from(record: RecipeRecord) -> Self {
        RecipeDetail {
            id: record.recipe.id,
            title: record.recipe.title,
            time_minutes: record.recipe.time_minutes,
            price: Price::from_cents(record.recipe.price_cents),
            link: record.recipe.link,
            description: record.recipe.description,
            tags: record.tags.into_iter().map(LabelItem::from).collect(),
            ingredients: record.ingredients.into_iter().map(LabelItem::from).collect(),
        }
    }
}

fn validate_title(title: &str) -> Result<String, String> {
    validate_name("title", title)
}

fn validate_time_minutes(minutes: i32) -> Result<i32, String> {
    if minutes < 0 {
        return Err("time_minutes must be zero or greater".to_string());
    }
    Ok(minutes)
}

fn validate_link(link: &str) -> Result<String, String> {
    let link = link.trim();
    if link.chars().count() > MAX_NAME_LEN {
        return Err(format!("link must be at most {MAX_NAME_LEN} characters"));
    }
    Ok(link.to_string())
}

/// Validate each `{name}` entry of a tags or ingredients list.
fn validate_entries(field: &str, entries: Vec<NameEntry>) -> Result<Vec<String>, String> {
    entries
        .into_iter()
        .map(|entry| validate_name(&format!("{field} name"), &entry.name))
        .collect()
}
