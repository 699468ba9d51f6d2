pub mod delete;
pub mod list;
pub mod update;

use crate::AppState;
use axum::routing::{get, patch};
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/recipe/tags endpoints (mounted at /api/recipe/tags)
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list::list_tags)).route(
        "/{id}",
        patch(update::patch_tag)
            .put(update::put_tag)
            .delete(delete::delete_tag),
    )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_tags,
        update::patch_tag,
        update::put_tag,
        delete::delete_tag,
    ),
    components(schemas(crate::api::labels::UpdateLabelRequest))
)]
pub struct ApiDoc;
