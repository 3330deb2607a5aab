//! School registration.

use actix_web::{HttpResponse, web};
use quad_core::RepoError;
use quad_shared::dto::CreateSchoolRequest;

use crate::middleware::error::{ApiError, ApiResult};
use crate::state::AppState;

/// POST /schools
pub async fn create_school(
    state: web::Data<AppState>,
    body: web::Json<CreateSchoolRequest>,
) -> ApiResult<HttpResponse> {
    let request = body.into_inner();

    let Some(name) = request.name.filter(|name| !name.is_empty()) else {
        return Err(ApiError::BadRequest("name is required".to_string()));
    };

    match state.schools.create(&name).await {
        Ok(school) => Ok(HttpResponse::Created().json(school)),
        Err(RepoError::UniqueViolation(_)) => Err(ApiError::Conflict(
            "School with this name already exists".to_string(),
        )),
        Err(err) => {
            tracing::error!(error = %err, "Failed to create school");
            Err(ApiError::Internal("Failed to create school".to_string()))
        }
    }
}
