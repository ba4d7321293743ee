mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use common::{carrots, weather, FakeFeed, FakeFollowup};
use ed25519_dalek::{Signer, SigningKey};
use serde_json::{json, Value};
use stockwatch_core::format::QUERY_FAILURE_MESSAGE;
use stockwatch_daemon::discord::InteractionReply;
use stockwatch_daemon::http::{router, AppState};
use stockwatch_daemon::query::QueryResponder;
use stockwatch_daemon::verify::InteractionVerifier;
use tower::ServiceExt;

const TIMESTAMP: &str = "1718366730";

fn signing_key() -> SigningKey {
    SigningKey::from_bytes(&[42u8; 32])
}

fn app(feed: Arc<FakeFeed>, followup: Arc<FakeFollowup>, with_key: bool) -> Router {
    let verifier = with_key.then(|| InteractionVerifier::from_key(signing_key().verifying_key()));
    router(AppState::new(verifier, QueryResponder::new(feed), followup))
}

fn signed(body: &Value) -> Request<Body> {
    let body = serde_json::to_vec(body).unwrap();
    let mut message = TIMESTAMP.as_bytes().to_vec();
    message.extend_from_slice(&body);
    let signature = hex::encode(signing_key().sign(&message).to_bytes());

    Request::post("/interactions")
        .header("content-type", "application/json")
        .header("x-signature-ed25519", signature)
        .header("x-signature-timestamp", TIMESTAMP)
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn wait_for_reply(followup: &FakeFollowup) -> (String, InteractionReply) {
    for _ in 0..100 {
        if let Some(reply) = followup.replies.lock().unwrap().first().cloned() {
            return reply;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("no interaction reply delivered");
}

#[tokio::test]
async fn liveness_routes() {
    let app = app(Arc::new(FakeFeed::default()), Arc::new(FakeFollowup::default()), false);

    let resp = app
        .clone()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"Bot is running!");

    let resp = app
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn interactions_not_served_without_public_key() {
    let app = app(Arc::new(FakeFeed::default()), Arc::new(FakeFollowup::default()), false);
    let resp = app.oneshot(signed(&json!({"type": 1}))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rejects_bad_signature() {
    let app = app(Arc::new(FakeFeed::default()), Arc::new(FakeFollowup::default()), true);
    let req = Request::post("/interactions")
        .header("x-signature-ed25519", "00".repeat(64))
        .header("x-signature-timestamp", TIMESTAMP)
        .body(Body::from(r#"{"type":1}"#))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn answers_ping() {
    let app = app(Arc::new(FakeFeed::default()), Arc::new(FakeFollowup::default()), true);
    let resp = app.oneshot(signed(&json!({"type": 1}))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await, json!({"type": 1}));
}

#[tokio::test]
async fn stock_command_defers_then_replies_with_report() {
    let feed = Arc::new(FakeFeed::new(Some(carrots(3)), Some(weather(&["Rainy"]))));
    let followup = Arc::new(FakeFollowup::default());
    let app = app(feed, Arc::clone(&followup), true);

    let resp = app
        .oneshot(signed(&json!({"type": 2, "token": "tok", "data": {"name": "stock"}})))
        .await
        .unwrap();
    assert_eq!(json_body(resp).await, json!({"type": 5}));

    let (token, reply) = wait_for_reply(&followup).await;
    assert_eq!(token, "tok");
    match reply {
        InteractionReply::Embeds { embeds } => {
            assert_eq!(embeds.len(), 2);
            assert_eq!(embeds[0].fields[0].value, "🥕 **Carrot**: `3`");
            assert_eq!(embeds[1].description.as_deref(), Some("🌧️ **Rainy**"));
        }
        other => panic!("expected embeds, got {other:?}"),
    }
    assert_eq!(followup.replies.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn stock_command_reports_single_failure_when_weather_is_down() {
    let feed = Arc::new(FakeFeed::new(Some(carrots(3)), None));
    let followup = Arc::new(FakeFollowup::default());
    let app = app(feed, Arc::clone(&followup), true);

    let resp = app
        .oneshot(signed(&json!({"type": 2, "token": "tok", "data": {"name": "stock"}})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let (_, reply) = wait_for_reply(&followup).await;
    assert_eq!(
        reply,
        InteractionReply::Content {
            content: QUERY_FAILURE_MESSAGE.into()
        }
    );
}

#[tokio::test]
async fn unknown_command_is_answered_ephemerally() {
    let followup = Arc::new(FakeFollowup::default());
    let app = app(Arc::new(FakeFeed::default()), Arc::clone(&followup), true);

    let resp = app
        .oneshot(signed(&json!({"type": 2, "token": "tok", "data": {"name": "nope"}})))
        .await
        .unwrap();
    let body = json_body(resp).await;
    assert_eq!(body["type"], 4);
    assert_eq!(body["data"]["flags"], 64);
    assert!(followup.replies.lock().unwrap().is_empty());
}
