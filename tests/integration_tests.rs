//! Integration tests for the policy inference API
//!
//! These tests drive the full router (path normalization, routing, JSON
//! decoding, parsing, traversal and error mapping) without binding a socket.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use decider_rs::decider::policy::dot::DotParser;
use decider_rs::decider::policy::graph::{Graph, GraphExecutor};
use decider_rs::decider::policy::state::{Value, VariableBag};
use decider_rs::decider::policy::{Inferrer, PolicyExecutor};
use decider_rs::decider::error::PolicyError;
use decider_rs::decider::server::{app, AppState};
use http_body_util::BodyExt;
use serde_json::{json, Value as Json};
use std::sync::Arc;
use tower::ServiceExt;

// ============================================================================
// Helpers
// ============================================================================

const AGE_POLICY: &str = r#"digraph { start [result=""]; ok [result="approved=true"]; no [result="approved=false"]; start -> ok [cond="age>=18"]; start -> no [cond="age<18"]; }"#;

async fn send(state: AppState, method: Method, uri: &str, body: Body) -> (StatusCode, String, Vec<u8>) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap();

    let response = app(state).oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, content_type, bytes.to_vec())
}

async fn infer(body: Json) -> (StatusCode, Json) {
    infer_with(AppState::default(), body).await
}

async fn infer_with(state: AppState, body: Json) -> (StatusCode, Json) {
    let (status, _, bytes) = send(
        state,
        Method::POST,
        "/infer",
        Body::from(serde_json::to_vec(&body).unwrap()),
    )
    .await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn assert_error(status: StatusCode, body: &Json, expected_status: u16, code: &str) {
    assert_eq!(status.as_u16(), expected_status, "{}", body);
    assert_eq!(body["status"], expected_status);
    assert_eq!(body["error"], code);
    assert!(body["message"].is_string());
}

// ============================================================================
// Routing
// ============================================================================

#[tokio::test]
async fn test_ping() {
    let (status, content_type, body) =
        send(AppState::default(), Method::GET, "/ping", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.starts_with("text/plain"));
    assert_eq!(body, b"pong");
}

#[tokio::test]
async fn test_ping_with_trailing_slash() {
    let (status, _, body) = send(AppState::default(), Method::GET, "/ping/", Body::empty()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"pong");
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    for method in [Method::GET, Method::POST] {
        let (status, _, body) = send(AppState::default(), method, "/nope", Body::empty()).await;
        let body: Json = serde_json::from_slice(&body).unwrap();
        assert_error(status, &body, 404, "not_found");
    }
}

#[tokio::test]
async fn test_wrong_method_is_not_allowed() {
    for (method, uri) in [
        (Method::GET, "/infer"),
        (Method::PUT, "/infer"),
        (Method::POST, "/ping"),
        (Method::DELETE, "/ping"),
    ] {
        let (status, _, body) = send(AppState::default(), method, uri, Body::empty()).await;
        let body: Json = serde_json::from_slice(&body).unwrap();
        assert_error(status, &body, 405, "method_not_allowed");
    }
}

// ============================================================================
// Inference
// ============================================================================

#[tokio::test]
async fn test_infer_adult_is_approved() {
    let (status, body) = infer(json!({"policy_dot": AGE_POLICY, "input": {"age": 20}})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"output": {"age": 20, "approved": true}}));
}

#[tokio::test]
async fn test_infer_minor_is_rejected() {
    let (status, body) = infer(json!({"policy_dot": AGE_POLICY, "input": {"age": 15}})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"output": {"age": 15, "approved": false}}));
}

#[tokio::test]
async fn test_infer_response_is_json() {
    let body = json!({"policy_dot": AGE_POLICY, "input": {"age": 20}});
    let (_, content_type, _) = send(
        AppState::default(),
        Method::POST,
        "/infer",
        Body::from(body.to_string()),
    )
    .await;
    assert_eq!(content_type, "application/json");
}

#[tokio::test]
async fn test_infer_cycle_terminates() {
    let policy = r#"digraph { start [result=""]; a [result="done=true"]; start -> a [cond="x==1"]; a -> a [cond="x==1"]; }"#;
    let (status, body) = infer(json!({"policy_dot": policy, "input": {"x": 1}})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"output": {"x": 1, "done": true}}));
}

#[tokio::test]
async fn test_infer_multi_step_policy() {
    let policy = r#"
        digraph credit {
            start   [result="checked=true"];
            review  [result="tier=\"review\""];
            premium [result="tier=\"premium\", limit=5000"];
            basic   [result="tier=\"basic\", limit=500.5"];
            start -> premium [cond="score >= 750 && country == \"BR\""];
            start -> review  [cond="score < 300 || flagged == true"];
            start -> basic;
        }
    "#;

    let (status, body) = infer(json!({
        "policy_dot": policy,
        "input": {"score": 800, "country": "BR", "flagged": false}
    }))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["output"]["tier"], "premium");
    assert_eq!(body["output"]["limit"], 5000);
    assert_eq!(body["output"]["checked"], true);

    let (_, body) = infer(json!({
        "policy_dot": policy,
        "input": {"score": 500, "country": "US", "flagged": true}
    }))
    .await;
    assert_eq!(body["output"]["tier"], "review");

    let (_, body) = infer(json!({
        "policy_dot": policy,
        "input": {"score": 500, "country": "US", "flagged": false}
    }))
    .await;
    assert_eq!(body["output"]["tier"], "basic");
    assert_eq!(body["output"]["limit"], 500.5);
}

#[tokio::test]
async fn test_infer_without_input() {
    let (status, body) =
        infer(json!({"policy_dot": r#"digraph { start [result="x=1, mode=\"auto\""] }"#})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"output": {"x": 1, "mode": "auto"}}));
}

// ============================================================================
// Error taxonomy
// ============================================================================

#[tokio::test]
async fn test_invalid_json_body() {
    let (status, _, body) = send(
        AppState::default(),
        Method::POST,
        "/infer",
        Body::from("{not json"),
    )
    .await;
    let body: Json = serde_json::from_slice(&body).unwrap();
    assert_error(status, &body, 400, "invalid_request_body");
}

#[tokio::test]
async fn test_unsupported_input_value() {
    let (status, body) = infer(json!({"policy_dot": AGE_POLICY, "input": {"age": null}})).await;
    assert_error(status, &body, 400, "invalid_request_body");

    let (status, body) = infer(json!({"policy_dot": AGE_POLICY, "input": [1, 2]})).await;
    assert_error(status, &body, 400, "invalid_request_body");
}

#[tokio::test]
async fn test_invalid_policy_dot() {
    for policy in ["", "this is not dot", "digraph { start [result=\"x=1\" }"] {
        let (status, body) = infer(json!({"policy_dot": policy, "input": {}})).await;
        assert_error(status, &body, 400, "invalid_policy_dot");
    }
}

#[tokio::test]
async fn test_policy_without_start_node() {
    let policy = r#"digraph { begin [result="x=1"]; begin -> end; }"#;
    let (status, body) = infer(json!({"policy_dot": policy, "input": {}})).await;
    assert_error(status, &body, 400, "policy_no_start_node");
}

#[tokio::test]
async fn test_invalid_condition() {
    let policy = r#"digraph { start; adult [result="ok=true"]; start -> adult [cond="age+1>=18"]; }"#;
    let (status, body) = infer(json!({"policy_dot": policy, "input": {"age": 17}})).await;
    assert_error(status, &body, 400, "invalid_condition");
    assert!(body.get("output").is_none());
}

#[tokio::test]
async fn test_condition_on_missing_variable() {
    let (status, body) = infer(json!({"policy_dot": AGE_POLICY, "input": {}})).await;
    assert_error(status, &body, 400, "invalid_condition");
}

// ============================================================================
// Custom components
// ============================================================================

struct BrokenExecutor;

impl PolicyExecutor for BrokenExecutor {
    fn execute(&self, _graph: &Graph, _input: &VariableBag) -> Result<VariableBag, PolicyError> {
        Err(PolicyError::Internal("executor unavailable".into()))
    }
}

#[tokio::test]
async fn test_internal_error() {
    let state = AppState {
        inferrer: Inferrer::new(Arc::new(DotParser::new()), Arc::new(BrokenExecutor)),
    };
    let (status, body) = infer_with(state, json!({"policy_dot": AGE_POLICY, "input": {"age": 20}})).await;
    assert_error(status, &body, 500, "internal_error");
}

#[test]
fn test_library_pipeline_without_server() {
    let graph = DotParser::new().parse(AGE_POLICY).unwrap();
    let input: VariableBag = [("age", Value::from(18.0))].into_iter().collect();

    let trace = GraphExecutor::new().trace(&graph, &input).unwrap();
    assert_eq!(trace.path, vec!["start", "ok"]);
    assert_eq!(trace.output.get("approved"), Some(&Value::Bool(true)));
    assert!(trace.path.len() <= graph.nodes.len() + 1);
}

#[tokio::test]
async fn test_demo_policy() {
    let policy = include_str!("../demos/credit_policy.dot");
    let (status, body) = infer(json!({
        "policy_source": policy,
        "input": {"score": 780, "country": "BR", "flagged": false}
    }))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"output": {
            "checked": true,
            "country": "BR",
            "flagged": false,
            "limit": 5000,
            "score": 780,
            "tier": "premium"
        }})
    );
}

#[tokio::test]
async fn test_edge_chain_stops_after_first_hop() {
    let policy = r#"digraph { start; a [result="x=1"]; b [result="y=2"]; start -> a -> b }"#;
    let (status, body) = infer(json!({"policy_dot": policy})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"output": {"x": 1}}));
}

#[tokio::test]
async fn test_start_only_inside_subgraph() {
    let policy = r#"digraph { subgraph s { start [result="x=1"] } }"#;
    let (status, body) = infer(json!({"policy_dot": policy})).await;
    assert_error(status, &body, 400, "policy_no_start_node");
}
