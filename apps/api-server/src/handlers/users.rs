//! User registration and lookup.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use quad_core::RepoError;
use quad_shared::dto::CreateUserRequest;

use crate::middleware::error::{ApiError, ApiResult};
use crate::state::AppState;

/// POST /users
pub async fn create_user(
    state: web::Data<AppState>,
    body: web::Json<CreateUserRequest>,
) -> ApiResult<HttpResponse> {
    let request = body.into_inner();

    let Some(name) = request.name.filter(|name| !name.is_empty()) else {
        return Err(ApiError::BadRequest("name is required".to_string()));
    };
    let Some(school_id) = request.school_id else {
        return Err(ApiError::BadRequest("schoolId is required".to_string()));
    };

    let created_at = Utc::now().timestamp_millis();
    match state.users.create(&name, school_id, created_at).await {
        Ok(user) => Ok(HttpResponse::Created().json(user)),
        Err(RepoError::ForeignKeyViolation(_)) => {
            Err(ApiError::BadRequest("Invalid schoolId".to_string()))
        }
        Err(err) => {
            tracing::error!(error = %err, "Failed to create user");
            Err(ApiError::Internal("Failed to create user".to_string()))
        }
    }
}

/// GET /users/{id}
pub async fn get_user(state: web::Data<AppState>, path: web::Path<String>) -> ApiResult<HttpResponse> {
    let user_id: i64 = path
        .into_inner()
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid user ID".to_string()))?;

    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(user))
}
