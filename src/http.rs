//! HTTP binding.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/schedules/generate` | Generate a timetable from the posted snapshot |
//! | GET | `/healthz` | Liveness check |
//!
//! The generate body is a snapshot document with two optional extras,
//! `weights` and `time_limit_ms`; the budget is capped at
//! [`ServerConfig::max_time_limit_ms`]. The response is the
//! [`GenerateResult`] JSON: 200 when `status` is `ok`, 400 otherwise,
//! including bodies that fail to parse.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::config::{EngineConfig, ServerConfig};
use crate::engine::{generate_from_source, GenerateResult};
use crate::snapshot::SnapshotData;
use crate::timetable::ObjectiveWeights;

/// Shared state for handlers.
#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<EngineConfig>,
    /// Bounds the number of solves running at once.
    pub solves: Arc<Semaphore>,
    /// Cap on a client-requested budget.
    pub max_time_limit_ms: u64,
}

impl ApiState {
    pub fn new(engine: EngineConfig, server: &ServerConfig) -> Self {
        Self {
            engine: Arc::new(engine),
            solves: Arc::new(Semaphore::new(server.max_concurrent_solves.max(1))),
            max_time_limit_ms: server.max_time_limit_ms,
        }
    }

    /// Engine configuration with the request's overrides applied.
    pub fn request_config(&self, weights: Option<ObjectiveWeights>, time_limit_ms: Option<u64>) -> EngineConfig {
        let mut config = (*self.engine).clone();
        if let Some(weights) = weights {
            config.objective.weights = weights;
        }
        if let Some(ms) = time_limit_ms {
            config.solver.time_limit_ms = ms;
        }
        config.solver.time_limit_ms = config.solver.time_limit_ms.min(self.max_time_limit_ms);
        config
    }
}

/// Body of `POST /schedules/generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(flatten)]
    pub snapshot: SnapshotData,
    #[serde(default)]
    pub weights: Option<ObjectiveWeights>,
    #[serde(default)]
    pub time_limit_ms: Option<u64>,
}

/// Build the API router.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/schedules/generate", post(generate))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// GET /healthz
pub async fn healthz() -> &'static str {
    "ok"
}

/// POST /schedules/generate
pub async fn generate(
    State(state): State<ApiState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> impl IntoResponse {
    let req = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let detail = rejection.body_text();
            warn!(error = %detail, "generate request rejected");
            return (StatusCode::BAD_REQUEST, Json(GenerateResult::Error { detail }));
        }
    };
    let config = state.request_config(req.weights, req.time_limit_ms);

    info!(
        sections = req.snapshot.sections.len(),
        time_limit_ms = config.solver.time_limit_ms,
        "generate request"
    );

    let result = match state.solves.clone().acquire_owned().await {
        Ok(permit) => {
            let snapshot = req.snapshot;
            tokio::task::spawn_blocking(move || {
                let _permit = permit;
                generate_from_source(&snapshot, &config)
            })
            .await
            .unwrap_or_else(|e| GenerateResult::Error {
                detail: format!("solve task failed: {e}"),
            })
        }
        Err(e) => GenerateResult::Error {
            detail: format!("solver unavailable: {e}"),
        },
    };

    let status = if result.is_ok() {
        StatusCode::OK
    } else {
        warn!(status = result.status(), "generate request not satisfied");
        StatusCode::BAD_REQUEST
    };
    (status, Json(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn router() -> Router {
        build_router(ApiState::new(EngineConfig::default(), &ServerConfig::default()))
    }

    #[tokio::test]
    async fn test_healthz() {
        let req = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
        let resp = router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_generate_empty_snapshot_is_ok() {
        let req = Request::builder()
            .method("POST")
            .uri("/schedules/generate")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let resp = router().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["schedule"].as_array().map(Vec::len), Some(0));
    }

    #[test]
    fn test_request_budget_is_capped() {
        let server = ServerConfig {
            max_time_limit_ms: 1_000,
            ..ServerConfig::default()
        };
        let state = ApiState::new(EngineConfig::default(), &server);

        assert_eq!(state.request_config(None, Some(u64::MAX)).solver.time_limit_ms, 1_000);
        assert_eq!(state.request_config(None, Some(250)).solver.time_limit_ms, 250);
        // The configured default is capped too.
        assert_eq!(state.request_config(None, None).solver.time_limit_ms, 1_000);

        let weights = ObjectiveWeights {
            time: 7,
            ..ObjectiveWeights::default()
        };
        assert_eq!(state.request_config(Some(weights), None).objective.weights.time, 7);
    }

    #[test]
    fn test_request_extras() {
        let req: GenerateRequest = serde_json::from_str(
            r#"{"courses": [], "weights": {"time": 5}, "time_limit_ms": 100}"#,
        )
        .unwrap();
        assert_eq!(req.weights.map(|w| (w.time, w.balance)), Some((5, 1)));
        assert_eq!(req.time_limit_ms, Some(100));
        assert!(req.snapshot.courses.is_empty());
    }
}
