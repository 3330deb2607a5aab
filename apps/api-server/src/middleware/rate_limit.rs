//! Per-user rate limiting applied around the whole route tree.
//!
//! The caller is identified by `userId`, read from the query string or,
//! for POST bodies, from the buffered JSON payload. The payload is handed
//! back to the request afterwards so the extractors downstream see it
//! untouched. Requests without a user id pass through uncounted, as does
//! everything when no limiter backend is configured or the backend errors.

use std::collections::HashMap;
use std::future::{Ready, ready};
use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::Method;
use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue};
use actix_web::{Error, HttpMessage, HttpResponse, web};
use futures::StreamExt;
use futures::future::LocalBoxFuture;
use quad_core::ports::RateLimitDecision;
use quad_shared::ErrorBody;

use crate::state::AppState;

/// Rate limiting middleware factory.
pub struct RateLimitGuard;

impl<S, B> Transform<S, ServiceRequest> for RateLimitGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitGuardService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitGuardService {
            service: Rc::new(service),
        }))
    }
}

pub struct RateLimitGuardService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RateLimitGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            let limiter = req
                .app_data::<web::Data<AppState>>()
                .and_then(|state| state.limiter.clone());

            let Some(limiter) = limiter else {
                let res = service.call(req).await?;
                return Ok(res.map_into_left_body());
            };

            let Some(user_id) = caller_id(&mut req).await? else {
                let res = service.call(req).await?;
                return Ok(res.map_into_left_body());
            };

            match limiter.check(&user_id).await {
                Ok(decision) if decision.allowed => {
                    let mut res = service.call(req).await?;
                    apply_headers(res.headers_mut(), &decision);
                    Ok(res.map_into_left_body())
                }
                Ok(decision) => {
                    tracing::warn!(user_id = %user_id, "Rate limit exceeded");

                    let mut response = HttpResponse::TooManyRequests().json(ErrorBody::new(
                        429,
                        "Rate limit exceeded. Please try again later.",
                    ));
                    apply_headers(response.headers_mut(), &decision);

                    let (http_req, _payload) = req.into_parts();
                    Ok(ServiceResponse::new(http_req, response).map_into_right_body())
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Rate limiter unavailable, failing open");
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
            }
        })
    }
}

fn apply_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    let entries = [
        ("x-ratelimit-limit", decision.limit.to_string()),
        ("x-ratelimit-remaining", decision.remaining.to_string()),
        ("x-ratelimit-reset", decision.resets_at.to_string()),
    ];
    for (name, value) in entries {
        if let Ok(value) = HeaderValue::from_str(&value) {
            headers.insert(HeaderName::from_static(name), value);
        }
    }
}

/// Extracts the caller's `userId` from the query string, falling back to
/// the JSON body for POSTs. Body bytes are re-injected as a fresh payload.
async fn caller_id(req: &mut ServiceRequest) -> Result<Option<String>, Error> {
    if let Some(id) = query_param(req.query_string(), "userId") {
        return Ok(Some(id));
    }
    if req.method() != Method::POST {
        return Ok(None);
    }

    let mut payload = req.take_payload();
    let mut buf = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        buf.extend_from_slice(&chunk?);
    }
    let bytes = buf.freeze();

    let user_id = serde_json::from_slice::<serde_json::Value>(&bytes)
        .ok()
        .and_then(|body| match body.get("userId") {
            Some(serde_json::Value::Number(n)) => Some(n.to_string()),
            Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        });

    let (_, mut restored) = actix_http::h1::Payload::create(true);
    restored.unread_data(bytes);
    req.set_payload(restored.into());

    Ok(user_id)
}

fn query_param(query: &str, name: &str) -> Option<String> {
    web::Query::<HashMap<String, String>>::from_query(query)
        .ok()
        .and_then(|params| params.get(name).cloned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use actix_web::{App, test};
    use quad_core::ports::{RateLimitError, RateLimiter};
    use quad_infra::database::MemoryStore;
    use quad_infra::moderation::{ChatClassifier, ClassifierConfig};
    use quad_infra::rate_limit::{InMemoryRateLimiter, RateLimitConfig};
    use serde_json::{Value, json};

    use super::*;
    use crate::handlers;
    use crate::state::AppState;

    fn tiny_quota_state(max_requests: u32) -> AppState {
        // Tokenless classifier: moderation never retracts anything here.
        let classifier = ChatClassifier::new(ClassifierConfig {
            token: None,
            ..ClassifierConfig::default()
        });
        AppState::with_store(
            MemoryStore::default(),
            Arc::new(classifier),
            Some(Arc::new(InMemoryRateLimiter::new(RateLimitConfig {
                max_requests,
                window: Duration::from_secs(60),
            }))),
        )
    }

    async fn seed_user(state: &AppState) {
        let school = state
            .schools
            .create("Limit Test University")
            .await
            .expect("school");
        state.users.create("ada", school.id, 1_000).await.expect("user");
    }

    #[actix_web::test]
    async fn over_quota_requests_get_429_with_headers() {
        let state = tiny_quota_state(2);
        seed_user(&state).await;

        let app = test::init_service(
            App::new()
                .wrap(RateLimitGuard)
                .app_data(web::Data::new(state))
                .configure(handlers::configure_routes),
        )
        .await;

        for _ in 0..2 {
            let req = test::TestRequest::get()
                .uri("/feed/newest?userId=1")
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 200);
            assert!(resp.headers().contains_key("x-ratelimit-limit"));
        }

        let req = test::TestRequest::get()
            .uri("/feed/newest?userId=1")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 429);
        assert_eq!(
            resp.headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok()),
            Some("0")
        );

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body["error"]["message"],
            "Rate limit exceeded. Please try again later."
        );
        assert_eq!(body["error"]["statusCode"], 429);
    }

    #[actix_web::test]
    async fn body_user_id_is_counted_and_payload_survives() {
        let state = tiny_quota_state(50);
        seed_user(&state).await;

        let app = test::init_service(
            App::new()
                .wrap(RateLimitGuard)
                .app_data(web::Data::new(state))
                .configure(handlers::configure_routes),
        )
        .await;

        // The handler still parses the body after the middleware read it.
        let req = test::TestRequest::post()
            .uri("/posts")
            .set_json(json!({"userId": 1, "content": "quota check"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        assert!(resp.headers().contains_key("x-ratelimit-remaining"));

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["content"], "quota check");
    }

    #[actix_web::test]
    async fn backend_errors_fail_open() {
        struct BrokenLimiter;

        #[async_trait::async_trait]
        impl RateLimiter for BrokenLimiter {
            async fn check(&self, _key: &str) -> Result<RateLimitDecision, RateLimitError> {
                Err(RateLimitError::Backend("connection refused".to_string()))
            }
        }

        let classifier = ChatClassifier::new(ClassifierConfig {
            token: None,
            ..ClassifierConfig::default()
        });
        let state = AppState::with_store(
            MemoryStore::default(),
            Arc::new(classifier),
            Some(Arc::new(BrokenLimiter)),
        );
        seed_user(&state).await;

        let app = test::init_service(
            App::new()
                .wrap(RateLimitGuard)
                .app_data(web::Data::new(state))
                .configure(handlers::configure_routes),
        )
        .await;

        for _ in 0..5 {
            let req = test::TestRequest::get()
                .uri("/feed/newest?userId=1")
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 200);
            assert!(!resp.headers().contains_key("x-ratelimit-limit"));
        }
    }

    #[actix_web::test]
    async fn anonymous_requests_are_not_counted() {
        let state = tiny_quota_state(1);

        let app = test::init_service(
            App::new()
                .wrap(RateLimitGuard)
                .app_data(web::Data::new(state))
                .configure(handlers::configure_routes),
        )
        .await;

        // No userId anywhere: the health endpoint never hits the limiter.
        for _ in 0..5 {
            let req = test::TestRequest::get().uri("/health").to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), 200);
            assert!(!resp.headers().contains_key("x-ratelimit-limit"));
        }
    }
}
