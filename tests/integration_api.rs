//! End-to-end tests driving the router with in-memory collaborators.

use anyhow::{Context, Result};
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

use kunci::api::handlers::auth::state::AuthState;
use kunci::api::router;
use kunci::auth::AuthService;
use kunci::clock::{Clock, SystemClock};
use kunci::notify::NotificationSender;
use kunci::otp::{InMemoryOtpStore, OtpConfig, OtpService, OtpStore};
use kunci::rate_limit::{
    AdaptiveRateLimiter, InMemoryTrackerStore, NoopRateLimiter, RateLimiter, TrackerStore,
};
use kunci::token::{TokenConfig, TokenSigner};
use kunci::users::{InMemoryUserStore, UserStore};

#[derive(Default)]
struct RecordingNotifier {
    codes: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    fn last_code(&self) -> String {
        self.codes
            .lock()
            .expect("recorder mutex poisoned")
            .last()
            .cloned()
            .expect("no code recorded")
    }
}

impl NotificationSender for RecordingNotifier {
    fn send_otp(&self, _to: &str, code: &str) -> Result<()> {
        self.codes
            .lock()
            .expect("recorder mutex poisoned")
            .push(code.to_string());
        Ok(())
    }

    fn send_welcome(&self, _to: &str) -> Result<()> {
        Ok(())
    }
}

fn auth_state(rate_limiter: Arc<dyn RateLimiter>) -> (Arc<AuthState>, Arc<RecordingNotifier>) {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let notifier = Arc::new(RecordingNotifier::default());
    let users: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new());
    let otp = Arc::new(OtpService::new(
        Arc::new(InMemoryOtpStore::new()) as Arc<dyn OtpStore>,
        Arc::clone(&notifier) as Arc<dyn NotificationSender>,
        Arc::clone(&clock),
        OtpConfig::new(),
    ));
    let signer = TokenSigner::new(TokenConfig::new(
        SecretString::from("0123456789abcdef0123456789abcdef"),
        "https://auth.example.test".to_string(),
        "kunci".to_string(),
    ));
    let auth = AuthService::new(
        users,
        otp,
        signer,
        Arc::clone(&notifier) as Arc<dyn NotificationSender>,
        clock,
    );
    (
        Arc::new(AuthState::new(auth, rate_limiter)),
        notifier,
    )
}

async fn post_json(state: &Arc<AuthState>, path: &str, body: Value) -> Result<(StatusCode, Value)> {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))?;
    send(state, request).await
}

async fn get_with_bearer(
    state: &Arc<AuthState>,
    path: &str,
    token: Option<&str>,
) -> Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    send(state, builder.body(Body::empty())?).await
}

async fn send(state: &Arc<AuthState>, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let response = router(Arc::clone(state)).oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, value))
}

fn str_field<'a>(value: &'a Value, field: &str) -> Result<&'a str> {
    value
        .get(field)
        .and_then(Value::as_str)
        .with_context(|| format!("missing field: {field}"))
}

#[tokio::test]
async fn register_verify_and_me_end_to_end() -> Result<()> {
    let (state, notifier) = auth_state(Arc::new(NoopRateLimiter));

    let (status, body) = post_json(
        &state,
        "/v1/auth/register",
        json!({
            "name": "Alice",
            "email": "Alice@Example.com",
            "password": "hunter2!"
        }),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    let subject_id = str_field(&body, "subject_id")?.to_string();
    assert_eq!(body["attempt_count"], 1);

    // Sign-in before verification is refused.
    let (status, body) = post_json(
        &state,
        "/v1/auth/sign-in",
        json!({"email": "alice@example.com", "password": "hunter2!"}),
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "not_verified");

    let (status, body) = post_json(
        &state,
        "/v1/auth/verify-otp",
        json!({"subject_id": subject_id, "code": notifier.last_code()}),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let access_token = str_field(&body, "access_token")?.to_string();
    let refresh_token = str_field(&body, "refresh_token")?.to_string();
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert!(body["user"].get("password_hash").is_none());

    let (status, body) = get_with_bearer(&state, "/v1/auth/me", Some(&access_token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "alice@example.com");

    let (status, _) = get_with_bearer(&state, "/v1/auth/me", None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = post_json(
        &state,
        "/v1/auth/refresh-token",
        json!({"refresh_token": refresh_token}),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let refreshed = str_field(&body, "access_token")?.to_string();
    let (status, _) = get_with_bearer(&state, "/v1/auth/me", Some(&refreshed)).await?;
    assert_eq!(status, StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn wrong_code_then_resend_recovers() -> Result<()> {
    let (state, notifier) = auth_state(Arc::new(NoopRateLimiter));

    let (_, body) = post_json(
        &state,
        "/v1/auth/register",
        json!({"name": "Bob", "email": "bob@example.com", "password": "hunter2!"}),
    )
    .await?;
    let subject_id = str_field(&body, "subject_id")?.to_string();

    let (status, body) = post_json(
        &state,
        "/v1/auth/verify-otp",
        json!({"subject_id": subject_id, "code": "0000"}),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_code");

    let (status, body) = post_json(
        &state,
        "/v1/auth/resend-otp",
        json!({"subject_id": subject_id, "email": "bob@example.com"}),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["attempt_count"], 2);

    let (status, _) = post_json(
        &state,
        "/v1/auth/verify-otp",
        json!({"subject_id": subject_id, "code": notifier.last_code()}),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn reset_password_round_trip() -> Result<()> {
    let (state, notifier) = auth_state(Arc::new(NoopRateLimiter));

    let (_, body) = post_json(
        &state,
        "/v1/auth/register",
        json!({"name": "Carol", "email": "carol@example.com", "password": "old-pass"}),
    )
    .await?;
    let subject_id = str_field(&body, "subject_id")?.to_string();

    let (_, body) = post_json(
        &state,
        "/v1/auth/verify-otp",
        json!({"subject_id": subject_id, "code": notifier.last_code()}),
    )
    .await?;
    let access_token = str_field(&body, "access_token")?.to_string();

    // Without a bearer token the reset endpoint is gated.
    let (status, _) = post_json(
        &state,
        "/v1/auth/reset-password",
        json!({"old_password": "old-pass", "new_password": "new-pass", "confirm_password": "new-pass"}),
    )
    .await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let request = Request::builder()
        .method("POST")
        .uri("/v1/auth/reset-password")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {access_token}"))
        .body(Body::from(
            json!({"old_password": "old-pass", "new_password": "new-pass", "confirm_password": "new-pass"})
                .to_string(),
        ))?;
    let (status, _) = send(&state, request).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_json(
        &state,
        "/v1/auth/sign-in",
        json!({"email": "carol@example.com", "password": "old-pass"}),
    )
    .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, _) = post_json(
        &state,
        "/v1/auth/sign-in",
        json!({"email": "carol@example.com", "password": "new-pass"}),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn adaptive_limiter_blocks_after_window_budget() -> Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let limiter: Arc<dyn RateLimiter> = Arc::new(AdaptiveRateLimiter::new(
        Arc::new(InMemoryTrackerStore::new()) as Arc<dyn TrackerStore>,
        clock,
    ));
    let (state, _) = auth_state(limiter);

    // 20 requests fit in the window; the 21st from the same client is blocked.
    for _ in 0..20 {
        let (status, _) = post_json(
            &state,
            "/v1/auth/sign-in",
            json!({"email": "nobody@example.com", "password": "pw"}),
        )
        .await?;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    let (status, body) = post_json(
        &state,
        "/v1/auth/sign-in",
        json!({"email": "nobody@example.com", "password": "pw"}),
    )
    .await?;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "blocked");

    // A different device is tracked independently.
    let request = Request::builder()
        .method("POST")
        .uri("/v1/auth/sign-in")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-device-id", "other-device")
        .body(Body::from(
            json!({"email": "nobody@example.com", "password": "pw"}).to_string(),
        ))?;
    let (status, _) = send(&state, request).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn health_reports_build_info() -> Result<()> {
    let (state, _) = auth_state(Arc::new(NoopRateLimiter));
    let (status, body) = get_with_bearer(&state, "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "kunci");
    Ok(())
}
