// ABOUTME: Integration tests for the API key authorization gate
// ABOUTME: Covers optional-key mode, missing and unknown keys, valid keys, and post-auth checks
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Eventgate Project

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod helpers;

use std::sync::Arc;

use eventgate::errors::AppError;
use eventgate::keys::ApiKey;
use helpers::axum_test::AxumTestRequest;
use helpers::gateway::{app, keyed_resources, open_resources, resources_with_post_auth};
use serde_json::{json, Value};

fn publish_body() -> Value {
    json!({"event": "ping", "data": {"n": 1}})
}

#[tokio::test]
async fn anonymous_requests_pass_when_keys_are_optional() {
    let resources = open_resources();
    let response = AxumTestRequest::post("/channels/events")
        .json(&publish_body())
        .send(app(&resources))
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.json::<Value>(), json!({"delivered": 0}));
}

#[tokio::test]
async fn a_presented_key_is_ignored_when_keys_are_optional() {
    let resources = open_resources();
    let response = AxumTestRequest::post("/channels/events")
        .header("x-api-key", "egk_nobody_checks_this")
        .json(&publish_body())
        .send(app(&resources))
        .await;

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn missing_key_is_rejected_with_401() {
    let resources = keyed_resources(vec![ApiKey::new("ci", Vec::new())]);
    let response = AxumTestRequest::post("/channels/events")
        .json(&publish_body())
        .send(app(&resources))
        .await;

    assert_eq!(response.status(), 401);
    let body: Value = response.json();
    assert_eq!(body["error"], 401);
    assert_eq!(body["reason"], "unauthorized");
}

#[tokio::test]
async fn unknown_key_is_rejected_with_403() {
    let resources = keyed_resources(vec![ApiKey::new("ci", Vec::new())]);
    let response = AxumTestRequest::post("/channels/events")
        .header("x-api-key", "egk_does_not_exist")
        .json(&publish_body())
        .send(app(&resources))
        .await;

    assert_eq!(response.status(), 403);
    let body: Value = response.json();
    assert_eq!(body["error"], 403);
    assert_eq!(body["reason"], "forbidden");
}

#[tokio::test]
async fn valid_key_passes_the_gate() {
    let key = ApiKey::new("ci", Vec::new());
    let token = key.token.clone();
    let resources = keyed_resources(vec![key]);

    let response = AxumTestRequest::post("/channels/events")
        .header("x-api-key", &token)
        .json(&publish_body())
        .send(app(&resources))
        .await;

    assert_eq!(response.status(), 200);
    assert_eq!(response.json::<Value>(), json!({"delivered": 0}));
}

#[tokio::test]
async fn streams_sit_behind_the_gate_too() {
    let resources = keyed_resources(vec![ApiKey::new("ci", Vec::new())]);
    let response = AxumTestRequest::get("/channels/events/stream?feed=eventsource")
        .send(app(&resources))
        .await;

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn health_bypasses_the_gate() {
    let resources = keyed_resources(vec![ApiKey::new("ci", Vec::new())]);
    let response = AxumTestRequest::get("/health").send(app(&resources)).await;

    assert_eq!(response.status(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn post_auth_check_can_reject_a_valid_key() {
    let key = ApiKey::new("reader", Vec::new());
    let token = key.token.clone();
    let resources = resources_with_post_auth(
        vec![key],
        Arc::new(|key| {
            if key.has_permission("publish") {
                Ok(())
            } else {
                Err(AppError::forbidden("key lacks the publish permission"))
            }
        }),
    );

    let response = AxumTestRequest::post("/channels/events")
        .header("x-api-key", &token)
        .json(&publish_body())
        .send(app(&resources))
        .await;

    assert_eq!(response.status(), 403);
    assert_eq!(response.json::<Value>()["reason"], "forbidden");
}

#[tokio::test]
async fn post_auth_check_passes_a_permitted_key() {
    let key = ApiKey::new("writer", vec!["publish".to_owned()]);
    let token = key.token.clone();
    let resources = resources_with_post_auth(
        vec![key],
        Arc::new(|key| {
            if key.has_permission("publish") {
                Ok(())
            } else {
                Err(AppError::forbidden("key lacks the publish permission"))
            }
        }),
    );

    let response = AxumTestRequest::post("/channels/events")
        .header("x-api-key", &token)
        .json(&publish_body())
        .send(app(&resources))
        .await;

    assert_eq!(response.status(), 200);
}
