pub mod delete;
pub mod list;
pub mod update;

use crate::AppState;
use axum::routing::{get, patch};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/recipe/ingredients endpoints (mounted at /api/recipe/ingredients)
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list::list_ingredients)).route(
        "/{id}",
        patch(update::patch_ingredient)
            .put(update::put_ingredient)
            .delete(delete::delete_ingredient),
    )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_ingredients,
        update::patch_ingredient,
        update::put_ingredient,
        delete::delete_ingredient,
    ),
    components(schemas(crate::api::labels::UpdateLabelRequest))
)]
pub struct ApiDoc;
