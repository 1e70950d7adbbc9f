//! Integration tests for the `POST /api/trade` proxy.
//!
//! The router is driven in-process with a mock advice service, and once over
//! a real socket through `ProxyAdviceClient` to check both ends agree on the
//! wire shape.

mod common;

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use genx_trade_desk::advice::{
    AdviceFault, AdviceService, FallbackTable, FaultKind, ProxyAdviceClient, WidgetVariant,
};
use genx_trade_desk::chat::Role;
use genx_trade_desk::server::{bind, router, ProxyState};
use genx_trade_desk::testing::MockAdviceService;

const CONTACT: &str = "genxoverseasindia1@gmail.com";

fn app(advice: Arc<MockAdviceService>) -> Router {
    router(ProxyState::new(
        advice,
        FallbackTable::for_variant(WidgetVariant::Desk, CONTACT),
        CONTACT,
    ))
}

async fn post_trade(app: Router, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/trade")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("Expected valid JSON body: {e}"));
    (status, json)
}

#[tokio::test]
async fn trade_returns_reply_and_forwards_history() {
    let advice = Arc::new(MockAdviceService::new());
    advice.queue_reply("Nasik onions: $380/MT FOB Nhava Sheva.");

    let (status, body) = post_trade(
        app(advice.clone()),
        json!({
            "query": "  Onion price?  ",
            "history": [
                {"role": "model", "text": "Welcome to the desk."},
                {"role": "user", "text": "Hi"},
                {"role": "model", "text": "Hello!"}
            ]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "Nasik onions: $380/MT FOB Nhava Sheva.");

    let calls = advice.recorded_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].query, "Onion price?");
    assert_eq!(calls[0].history.len(), 3);
    assert_eq!(calls[0].history[0].role, Role::Assistant);
}

#[tokio::test]
async fn trade_without_credential_returns_fixed_500() {
    let advice = Arc::new(MockAdviceService::new());
    advice.queue_fault(AdviceFault::ConfigMissing);

    let (status, body) = post_trade(app(advice), json!({"query": "Turmeric?", "history": []})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["reply"],
        format!("Trade Desk temporarily unavailable. Please contact {CONTACT}.")
    );
}

#[tokio::test]
async fn trade_maps_faults_to_status_and_fallback_copy() {
    let table = FallbackTable::for_variant(WidgetVariant::Desk, CONTACT);
    let cases = [
        (AdviceFault::RateLimited, StatusCode::TOO_MANY_REQUESTS),
        (AdviceFault::AuthRejected { status: 401 }, StatusCode::BAD_GATEWAY),
        (AdviceFault::EmptyReply, StatusCode::BAD_GATEWAY),
        (AdviceFault::Transport("reset".to_string()), StatusCode::BAD_GATEWAY),
    ];

    for (fault, expected) in cases {
        let kind = fault.kind();
        let advice = Arc::new(MockAdviceService::new());
        advice.queue_fault(fault);

        let (status, body) = post_trade(app(advice), json!({"query": "Rice?"})).await;
        assert_eq!(status, expected, "{kind:?}");
        assert_eq!(body["reply"], table.message_for(kind));
    }
}

#[tokio::test]
async fn trade_rejects_blank_query_without_calling_service() {
    let advice = Arc::new(MockAdviceService::new());
    let (status, _) = post_trade(app(advice.clone()), json!({"query": "   ", "history": []})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(advice.recorded_calls().is_empty());
}

#[tokio::test]
async fn trade_answers_malformed_body_in_reply_shape() {
    let advice = Arc::new(MockAdviceService::new());

    let response = app(advice.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/trade")
                .header("content-type", "application/json")
                .body(Body::from("{\"query\": "))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["reply"], "Please enter a trade inquiry.");

    let response = app(advice.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/trade")
                .body(Body::from("query=rice"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(body["reply"].is_string());

    assert!(advice.recorded_calls().is_empty());
}

#[tokio::test]
async fn proxy_binds_to_host_name() {
    let listener = bind("localhost", 0).await.unwrap();
    assert!(listener.local_addr().unwrap().ip().is_loopback());
}

#[tokio::test]
async fn health_returns_ok() {
    let response = app(Arc::new(MockAdviceService::new()))
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn proxy_client_round_trips_through_server() {
    let advice = Arc::new(MockAdviceService::new());
    advice.queue_reply("Saffron A1 is $2.1k/kg.");
    advice.queue_fault(AdviceFault::RateLimited);
    advice.queue_fault(AdviceFault::ConfigMissing);

    let addr = common::spawn(app(advice.clone())).await;
    let config = common::config_with(&[]);
    let client = ProxyAdviceClient::from_config(
        &config,
        url::Url::parse(&format!("http://{addr}")).unwrap(),
    )
    .unwrap();

    let history = vec![genx_trade_desk::advice::Turn {
        role: Role::Assistant,
        text: "Welcome".to_string(),
    }];

    assert_eq!(
        client.get_advice("Saffron?", &history).await,
        Ok("Saffron A1 is $2.1k/kg.".to_string())
    );
    assert_eq!(
        client.get_advice("Saffron?", &history).await,
        Err(AdviceFault::RateLimited)
    );
    let fault = client.get_advice("Saffron?", &history).await.unwrap_err();
    assert_eq!(fault.kind(), FaultKind::Transport);

    assert_eq!(advice.recorded_calls()[0].history, history);
}
