//! Comment creation.

use std::sync::Arc;

use actix_web::{HttpResponse, web};
use quad_core::domain::{NewComment, validate_content};
use quad_infra::moderation::ModerationTask;
use quad_shared::dto::CreateCommentRequest;

use crate::handlers::resolve_body_user;
use crate::middleware::error::{ApiError, ApiResult};
use crate::state::AppState;

/// POST /comments
///
/// The denormalized comment counter on the post is bumped off the request
/// path; a failed bump is repaired by the reconciliation sweep.
pub async fn create_comment(
    state: web::Data<AppState>,
    body: web::Json<CreateCommentRequest>,
) -> ApiResult<HttpResponse> {
    let request = body.into_inner();

    if let Some(content) = request.content.as_deref() {
        validate_content(content)?;
    }

    let user = resolve_body_user(&state, request.user_id).await?;

    let Some(content) = request.content else {
        return Err(ApiError::BadRequest("content is required".to_string()));
    };
    let Some(post_id) = request.post_id else {
        return Err(ApiError::BadRequest("postId is required".to_string()));
    };

    if state.posts.find_by_id(post_id).await?.is_none() {
        return Err(ApiError::NotFound("Post not found".to_string()));
    }

    let draft = NewComment::new(post_id, user.id, content, request.media_url);
    match state.comments.create(draft).await {
        Ok(comment) => {
            let posts = Arc::clone(&state.posts);
            tokio::spawn(async move {
                if let Err(err) = posts.increment_comments(post_id).await {
                    tracing::error!(post_id, error = %err, "Failed to bump comment count");
                }
            });

            state.moderation.submit(ModerationTask::Comment {
                comment_id: comment.id,
                post_id,
                content: comment.content.clone(),
            });

            Ok(HttpResponse::Created().json(comment))
        }
        Err(err) => {
            tracing::error!(error = %err, "Failed to create comment");
            Err(ApiError::Internal("Failed to create comment".to_string()))
        }
    }
}
