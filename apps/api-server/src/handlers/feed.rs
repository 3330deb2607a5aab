//! The two feed views, both scoped to the calling user's school.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use quad_core::feed::{TRENDING_WINDOW_DAYS, paginate, rank_trending, window_start};
use quad_shared::dto::{FeedQuery, FeedResponse};

use crate::handlers::{parse_cursor, parse_limit, resolve_query_user};
use crate::middleware::error::ApiResult;
use crate::state::AppState;

/// GET /feed/newest
pub async fn newest(
    state: web::Data<AppState>,
    query: web::Query<FeedQuery>,
) -> ApiResult<HttpResponse> {
    let user = resolve_query_user(&state, query.user_id.as_deref()).await?;
    let limit = parse_limit(query.limit.as_deref());
    let before = parse_cursor(query.cursor.as_deref())?;

    let rows = state
        .posts
        .page_by_school(user.school_id, before, limit + 1)
        .await?;
    let page = paginate(rows, limit, |post| post.created_at);

    let preload_hint = page.next_cursor.as_ref().map(|cursor| {
        format!(
            "/feed/newest?userId={}&limit={}&cursor={}",
            user.id, limit, cursor
        )
    });

    Ok(HttpResponse::Ok().json(FeedResponse {
        posts: page.items,
        next_cursor: page.next_cursor,
        has_more: page.has_more,
        preload_hint,
    }))
}

/// GET /feed/trending
///
/// Ranks the last seven days of the school's posts in one pass; the
/// response reuses the feed envelope with pagination switched off.
pub async fn trending(
    state: web::Data<AppState>,
    query: web::Query<FeedQuery>,
) -> ApiResult<HttpResponse> {
    let user = resolve_query_user(&state, query.user_id.as_deref()).await?;

    let now = Utc::now().timestamp_millis();
    let since = window_start(now, TRENDING_WINDOW_DAYS);
    let rows = state.posts.recent_by_school(user.school_id, since).await?;
    let posts = rank_trending(rows, now);

    Ok(HttpResponse::Ok().json(FeedResponse {
        posts,
        next_cursor: None,
        has_more: false,
        preload_hint: None,
    }))
}
