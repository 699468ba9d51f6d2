pub mod ingredients;
pub mod labels;
pub mod public;
pub mod recipes;
pub mod tags;

use crate::models::Label;
use crate::store::StoreError;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

/// Longest accepted title, link, or tag/ingredient name.
pub const MAX_NAME_LEN: usize = 255;

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        match self {
            StoreError::NotFound => error_response(StatusCode::NOT_FOUND, "Not found"),
            StoreError::Conflict(message) => error_response(StatusCode::CONFLICT, message),
            StoreError::Database(e) => {
                tracing::error!("Database error: {}", e);
                error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        }
    }
}

/// JSON body extractor that answers malformed bodies with a 400 `ErrorResponse`.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(error_response(
                StatusCode::BAD_REQUEST,
                rejection.body_text(),
            )),
        }
    }
}

/// A tag or ingredient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LabelItem {
    pub id: Uuid,
    pub name: String,
}

impl From<Label> for LabelItem {
    fn from(label: Label) -> Self {
        LabelItem {
            id: label.id,
            name: label.name,
        }
    }
}

/// A tag or ingredient reference inside a recipe payload
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NameEntry {
    pub name: String,
}

/// Trimmed name, or a message saying why it is unusable.
pub fn validate_name(field: &str, name: &str) -> Result<String, String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("{field} cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(format!(
            "{field} must be at most {MAX_NAME_LEN} characters"
        ));
    }
    Ok(name.to_string())
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    // Base spec with shared components and security
    #[derive(OpenApi)]
    #[openapi(components(schemas(ErrorResponse, LabelItem, NameEntry)))]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    // Add security scheme
    if let Some(components) = spec.components.as_mut() {
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }

    // Merge in each module's spec
    let modules: Vec<utoipa::openapi::OpenApi> = vec![
        public::ApiDoc::openapi(),
        recipes::ApiDoc::openapi(),
        tags::ApiDoc::openapi(),
        ingredients::ApiDoc::openapi(),
    ];

    for module_spec in modules {
        // Merge paths
        spec.paths.paths.extend(module_spec.paths.paths);

        // Merge components (schemas)
        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}
