// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Token lifecycle tests against a mock Strava OAuth endpoint.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use httpmock::prelude::*;
use serde_json::json;
use std::sync::Arc;
use strava_tss_exporter::models::TokenState;
use strava_tss_exporter::routes::create_router;
use strava_tss_exporter::services::AuthError;
use tower::ServiceExt;

mod common;
use common::{authenticate, create_test_state, sample_ftp_history, test_strava_client, RecordingWriter};

fn mock_state(server: &MockServer) -> Arc<strava_tss_exporter::AppState> {
    create_test_state(
        test_strava_client(Some(&server.base_url())),
        sample_ftp_history(),
        Arc::new(RecordingWriter::new()),
    )
}

fn token_body(access: &str, refresh: &str) -> serde_json::Value {
    json!({
        "token_type": "Bearer",
        "access_token": access,
        "refresh_token": refresh,
        "expires_at": 1_900_000_000,
        "expires_in": 21600,
        "athlete": { "id": 1234 }
    })
}

#[tokio::test]
async fn test_exchange_code_sets_token_state() {
    let server = MockServer::start_async().await;
    let token_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/oauth/token")
                .body_contains("client_id=test_client_id")
                .body_contains("client_secret=test_secret")
                .body_contains("code=abc123")
                .body_contains("grant_type=authorization_code");
            then.status(200).json_body(token_body("acc1", "ref1"));
        })
        .await;

    let state = mock_state(&server);
    let result = state.auth.exchange_code("abc123").await.unwrap();

    token_mock.assert_async().await;
    assert_eq!(result.access_token, "acc1");

    let tokens = state.auth.tokens().snapshot().await;
    assert!(tokens.is_authenticated());
    assert_eq!(tokens.access_token, "acc1");
    assert_eq!(tokens.refresh_token, "ref1");
    assert_eq!(tokens.expires_at.timestamp(), 1_900_000_000);
}

#[tokio::test]
async fn test_exchange_failure_leaves_state_untouched() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(500).body("upstream exploded");
        })
        .await;

    let state = mock_state(&server);
    authenticate(state.auth.tokens(), "old_access", "old_refresh").await;
    let before = state.auth.tokens().snapshot().await;

    let err = state.auth.exchange_code("abc123").await.unwrap_err();

    assert!(matches!(err, AuthError::Provider(_)));
    assert_eq!(state.auth.tokens().snapshot().await, before);
}

#[tokio::test]
async fn test_exchange_unparseable_response_leaves_state_untouched() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(200).body("not json");
        })
        .await;

    let state = mock_state(&server);
    let err = state.auth.exchange_code("abc123").await.unwrap_err();

    assert!(matches!(err, AuthError::Provider(_)));
    assert_eq!(state.auth.tokens().snapshot().await, TokenState::default());
}

#[tokio::test]
async fn test_exchange_empty_access_token_is_malformed() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(200).json_body(token_body("", "ref1"));
        })
        .await;

    let state = mock_state(&server);
    let err = state.auth.exchange_code("abc123").await.unwrap_err();

    assert!(matches!(err, AuthError::MalformedResponse));
    assert!(!state.auth.tokens().is_authenticated().await);
}

#[tokio::test]
async fn test_exchange_without_code_makes_no_request() {
    let server = MockServer::start_async().await;
    let token_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(200).json_body(token_body("acc1", "ref1"));
        })
        .await;

    let state = mock_state(&server);
    let err = state.auth.exchange_code("   ").await.unwrap_err();

    assert!(matches!(err, AuthError::MissingCode));
    assert_eq!(token_mock.hits_async().await, 0);
}

#[tokio::test]
async fn test_refresh_without_refresh_token_makes_no_request() {
    let server = MockServer::start_async().await;
    let token_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(200).json_body(token_body("acc2", "ref2"));
        })
        .await;

    let state = mock_state(&server);
    authenticate(state.auth.tokens(), "acc1", "").await;

    let err = state.auth.refresh().await.unwrap_err();

    assert!(matches!(err, AuthError::NoRefreshToken));
    assert_eq!(token_mock.hits_async().await, 0);
    assert_eq!(
        state.auth.tokens().access_token().await.as_deref(),
        Some("acc1")
    );
}

#[tokio::test]
async fn test_refresh_rotates_tokens() {
    let server = MockServer::start_async().await;
    let token_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/oauth/token")
                .body_contains("grant_type=refresh_token")
                .body_contains("refresh_token=ref1");
            then.status(200).json_body(token_body("acc2", "ref2"));
        })
        .await;

    let state = mock_state(&server);
    authenticate(state.auth.tokens(), "acc1", "ref1").await;

    state.auth.refresh().await.unwrap();

    token_mock.assert_async().await;
    let tokens = state.auth.tokens().snapshot().await;
    assert_eq!(tokens.access_token, "acc2");
    assert_eq!(tokens.refresh_token, "ref2");
    assert_eq!(tokens.expires_at.timestamp(), 1_900_000_000);
}

#[tokio::test]
async fn test_refresh_failure_keeps_previous_state() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(401).json_body(json!({ "message": "Bad Request" }));
        })
        .await;

    let state = mock_state(&server);
    authenticate(state.auth.tokens(), "acc1", "ref1").await;
    let before = state.auth.tokens().snapshot().await;

    assert!(state.auth.refresh().await.is_err());
    assert_eq!(state.auth.tokens().snapshot().await, before);
}

#[tokio::test]
async fn test_concurrent_refreshes_leave_consistent_state() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(200).json_body(token_body("acc2", "ref2"));
        })
        .await;

    let state = mock_state(&server);
    authenticate(state.auth.tokens(), "acc1", "ref1").await;

    let (a, b) = tokio::join!(state.auth.refresh(), state.auth.refresh());
    assert!(a.is_ok());
    assert!(b.is_ok());

    let tokens = state.auth.tokens().snapshot().await;
    assert_eq!(tokens.access_token, "acc2");
    assert_eq!(tokens.refresh_token, "ref2");
}

#[tokio::test]
async fn test_callback_route_completes_login() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/oauth/token")
                .body_contains("code=xyz");
            then.status(200).json_body(token_body("acc1", "ref1"));
        })
        .await;

    let state = mock_state(&server);
    let app = create_router(state.clone());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/auth/callback?code=xyz&scope=read,activity:read_all")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(body.contains("Authentication complete"));

    // Gate now lets protected routes through
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_callback_route_hides_provider_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(400)
                .json_body(json!({ "message": "client_secret invalid" }));
        })
        .await;

    let state = mock_state(&server);
    let app = create_router(state.clone());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/auth/callback?code=xyz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(!body.contains("client_secret"));
    assert!(!state.auth.tokens().is_authenticated().await);
}
