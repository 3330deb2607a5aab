//! Post creation and the post detail view.

use actix_web::{HttpResponse, web};
use quad_core::domain::{NewPost, validate_content};
use quad_core::feed::paginate;
use quad_infra::moderation::ModerationTask;
use quad_shared::dto::{CreatePostRequest, PostDetailQuery, PostDetailResponse};

use crate::handlers::{parse_cursor, parse_limit, resolve_body_user};
use crate::middleware::error::{ApiError, ApiResult};
use crate::state::AppState;

/// POST /posts
///
/// The post is visible as soon as the insert commits; the moderation
/// verdict arrives later and may retract it.
pub async fn create_post(
    state: web::Data<AppState>,
    body: web::Json<CreatePostRequest>,
) -> ApiResult<HttpResponse> {
    let request = body.into_inner();

    // Content shape is checked before the caller is resolved, so an
    // over-long post from an unknown user reports the content problem.
    if let Some(content) = request.content.as_deref() {
        validate_content(content)?;
    }

    let user = resolve_body_user(&state, request.user_id).await?;

    let Some(content) = request.content else {
        return Err(ApiError::BadRequest("content is required".to_string()));
    };

    let draft = NewPost::new(user.id, user.school_id, content, request.media_url);
    match state.posts.create(draft).await {
        Ok(post) => {
            state.moderation.submit(ModerationTask::Post {
                post_id: post.id,
                content: post.content.clone(),
            });
            Ok(HttpResponse::Created().json(post))
        }
        Err(err) => {
            tracing::error!(error = %err, "Failed to create post");
            Err(ApiError::Internal("Failed to create post".to_string()))
        }
    }
}

/// GET /posts/{id}
///
/// Post detail with the first page of its comments, oldest of the page
/// last; further pages follow `comments_next_cursor`.
pub async fn get_post(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PostDetailQuery>,
) -> ApiResult<HttpResponse> {
    let post_id: i64 = path
        .into_inner()
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid post ID".to_string()))?;

    let post = state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post not found".to_string()))?;

    let limit = parse_limit(query.limit.as_deref());
    let before = parse_cursor(query.cursor.as_deref())?;

    let rows = state.comments.page_by_post(post_id, before, limit + 1).await?;
    let page = paginate(rows, limit, |comment| comment.created_at);

    Ok(HttpResponse::Ok().json(PostDetailResponse {
        post,
        comments: page.items,
        comments_next_cursor: page.next_cursor,
        comments_has_more: page.has_more,
    }))
}
