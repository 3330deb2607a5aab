//! HTTP handlers and route configuration.
//!
//! Write endpoints and the feeds resolve the calling user through the
//! helpers at the bottom, which mirror a lookup middleware: a missing
//! `userId` is a 400, an unknown or unparseable one is a 404.

mod comments;
mod feed;
mod health;
mod posts;
mod schools;
mod users;

use actix_web::web;
use quad_core::domain::User;
use quad_core::feed::clamp_limit;

use crate::middleware::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .route("/schools", web::post().to(schools::create_school))
        .route("/users", web::post().to(users::create_user))
        .route("/users/{id}", web::get().to(users::get_user))
        .route("/posts", web::post().to(posts::create_post))
        .route("/posts/{id}", web::get().to(posts::get_post))
        .route("/comments", web::post().to(comments::create_comment))
        .route("/feed/newest", web::get().to(feed::newest))
        .route("/feed/trending", web::get().to(feed::trending));
}

pub(crate) async fn resolve_body_user(state: &AppState, user_id: Option<i64>) -> ApiResult<User> {
    let Some(user_id) = user_id else {
        return Err(ApiError::BadRequest("userId is required".to_string()));
    };
    state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

pub(crate) async fn resolve_query_user(state: &AppState, user_id: Option<&str>) -> ApiResult<User> {
    let Some(raw) = user_id.filter(|value| !value.is_empty()) else {
        return Err(ApiError::BadRequest("userId is required".to_string()));
    };
    let user = match raw.parse::<i64>() {
        Ok(id) => state.users.find_by_id(id).await?,
        Err(_) => None,
    };
    user.ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

/// Page size from a raw query value; anything unparseable falls back to
/// the default, mirroring a lenient `parseInt`.
pub(crate) fn parse_limit(raw: Option<&str>) -> u64 {
    clamp_limit(raw.and_then(|value| value.parse().ok()))
}

/// Cursor from a raw query value. Unlike the limit, a present but
/// non-numeric cursor is rejected rather than treated as the first page.
pub(crate) fn parse_cursor(raw: Option<&str>) -> ApiResult<Option<i64>> {
    match raw.filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ApiError::BadRequest("Invalid cursor".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_parsing_is_lenient() {
        assert_eq!(parse_limit(None), 30);
        assert_eq!(parse_limit(Some("abc")), 30);
        assert_eq!(parse_limit(Some("10")), 10);
        assert_eq!(parse_limit(Some("500")), 100);
    }

    #[test]
    fn cursor_parsing_is_strict() {
        assert!(matches!(parse_cursor(None), Ok(None)));
        assert!(matches!(parse_cursor(Some("")), Ok(None)));
        assert!(matches!(parse_cursor(Some("1700000000000")), Ok(Some(_))));
        assert!(parse_cursor(Some("abc")).is_err());
    }
}
