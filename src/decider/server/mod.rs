// SPDX-License-Identifier: MIT

use axum::{
    body::Bytes,
    extract::{Request, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::decider::error::DeciderError;
use crate::decider::metric::{self, Cause};
use crate::decider::policy::state::VariableBag;
use crate::decider::policy::Inferrer;

pub mod error;

pub use error::ApiError;

/// Body of `POST /infer`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InferRequest {
    #[serde(default, alias = "policy_source")]
    pub policy_dot: String,
    #[serde(default)]
    pub input: VariableBag,
}

/// Successful `POST /infer` response
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InferResponse {
    pub output: VariableBag,
}

#[derive(Clone, Default)]
pub struct AppState {
    pub inferrer: Inferrer,
}

/// Routes without path normalization
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(ping).fallback(method_not_allowed))
        .route("/infer", post(infer).fallback(method_not_allowed))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// The full application; `/ping/` is routed like `/ping`
pub fn app(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}

pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), DeciderError> {
    log::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(
        listener,
        axum::ServiceExt::<Request>::into_make_service(app(state)),
    )
    .await?;
    Ok(())
}

async fn ping() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], "pong")
}

async fn infer(State(state): State<AppState>, body: Bytes) -> Result<Json<InferResponse>, ApiError> {
    let request_id = Uuid::new_v4();

    let request: InferRequest = serde_json::from_slice(&body).map_err(|e| {
        log_failure("bind_json", &request_id, &e);
        metric::emit_error(Cause::BindJson);
        ApiError::invalid_request_body()
    })?;

    let graph = state.inferrer.parse(&request.policy_dot).map_err(|e| {
        log_failure("parse_dot", &request_id, &e);
        metric::emit_error(Cause::ParseDot);
        ApiError::from(&e)
    })?;

    let output = state
        .inferrer
        .execute(&graph, &request.input)
        .map_err(|e| {
            log_failure("execute", &request_id, &e);
            metric::emit_error(Cause::Execute);
            ApiError::from(&e)
        })?;

    log::debug!(
        "[feature:policy_inference] [msg:done] [request_id:{}] [outputs:{}]",
        request_id,
        output.len()
    );
    metric::emit_success();
    Ok(Json(InferResponse { output }))
}

fn log_failure(stage: &str, request_id: &Uuid, err: &dyn std::fmt::Display) {
    log::error!(
        "[feature:policy_inference] [msg:{}] [request_id:{}] [err:{}]",
        stage,
        request_id,
        err
    );
}

async fn not_found() -> ApiError {
    ApiError::not_found()
}

async fn method_not_allowed() -> ApiError {
    ApiError::method_not_allowed()
}
