use crate::errors::{EngineError, EngineResult};
use crate::models::{MarketParameters, PriceGrid, PriceSample};
use crate::portfolio::{self, Evaluation, RawPosition};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use std::sync::Arc;

/// Upper bound on caller-requested grid resolution.
const MAX_GRID_POINTS: usize = 100_000;

#[derive(Debug, serde::Deserialize)]
pub struct GridSpec {
    pub min: f64,
    pub max: f64,
    pub points: usize,
}

#[derive(Debug, serde::Deserialize)]
pub struct EvaluateRequest {
    pub market: MarketParameters,
    pub positions: Vec<RawPosition>,
    pub spot: f64,
    #[serde(default)]
    pub grid: Option<GridSpec>,
}

#[derive(Debug, serde::Serialize)]
pub struct EvaluateResponse {
    pub id: uuid::Uuid,
    pub evaluated_at: chrono::DateTime<chrono::Utc>,
    pub evaluation: Evaluation,
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = match self {
            EngineError::Io(_) | EngineError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        };
        let body = serde_json::json!({ "error": self.to_string(), "kind": self.kind() });
        (status, Json(body)).into_response()
    }
}

/// POST /api/evaluate -- payoff curves and option pricing for one portfolio
pub async fn evaluate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<EvaluateRequest>, JsonRejection>,
) -> Result<Json<EvaluateResponse>, EngineError> {
    let id = uuid::Uuid::new_v4();
    let result = payload
        .map_err(|rejection| EngineError::Input(rejection.body_text()))
        .and_then(|Json(req)| run_evaluation(&state, req));
    state.counters.record(result.is_ok());

    match result {
        Ok(evaluation) => {
            tracing::info!(%id, legs = evaluation.legs.len(), "evaluation served");
            Ok(Json(EvaluateResponse {
                id,
                evaluated_at: chrono::Utc::now(),
                evaluation,
            }))
        }
        Err(e) => {
            tracing::warn!(%id, "evaluation rejected: {e}");
            Err(e)
        }
    }
}

fn run_evaluation(state: &AppState, req: EvaluateRequest) -> EngineResult<Evaluation> {
    let max = state.config.max_positions;
    if req.positions.len() > max {
        return Err(EngineError::Input(format!(
            "at most {max} positions allowed, got {}",
            req.positions.len()
        )));
    }

    let grid = match req.grid {
        Some(spec) if spec.points > MAX_GRID_POINTS => {
            return Err(EngineError::InvalidGrid(format!(
                "at most {MAX_GRID_POINTS} points allowed, got {}",
                spec.points
            )));
        }
        Some(spec) => PriceGrid::linspace(spec.min, spec.max, spec.points)?,
        None => state.config.price_grid()?,
    };

    let spot = PriceSample::new(req.spot)?;
    portfolio::evaluate_raw(req.positions, &req.market, &grid, spot)
}

/// GET /api/health -- liveness plus request counters
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    use portable_atomic::Ordering::Relaxed;
    Json(serde_json::json!({
        "status": "ok",
        "evaluations_served": state.counters.evaluations_served.load(Relaxed),
        "evaluations_rejected": state.counters.evaluations_rejected.load(Relaxed),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::server::router;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    async fn post(state: Arc<AppState>, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let req = Request::builder()
            .method("POST")
            .uri("/api/evaluate")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = router(state).oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn market() -> serde_json::Value {
        serde_json::json!({ "risk_free_rate": 0.05, "volatility": 0.2, "time_to_maturity": 1.0 })
    }

    #[tokio::test]
    async fn test_evaluate_happy_path() {
        let state = AppState::new(AppConfig::default());
        let (status, body) = post(
            state.clone(),
            serde_json::json!({
                "market": market(),
                "positions": [
                    { "type": "stock", "quantity": 1 },
                    { "type": "call", "quantity": 1, "strike": 100 },
                ],
                "spot": 100,
                "grid": { "min": 50, "max": 150, "points": 101 },
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "{body}");
        let eval = &body["evaluation"];
        assert_eq!(eval["grid"].as_array().unwrap().len(), 101);
        assert_eq!(eval["total"].as_array().unwrap().len(), 101);
        assert_eq!(eval["legs"][0]["position"]["type"], "stock");
        let price = eval["option_legs"][0]["point"]["price"].as_f64().unwrap();
        assert!((price - 10.45).abs() < 0.01, "price={price}");
        assert!(body["id"].is_string());
        assert_eq!(state.counters.evaluations_served.load(portable_atomic::Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_invalid_kind_is_422() {
        let (status, body) = post(
            AppState::new(AppConfig::default()),
            serde_json::json!({
                "market": market(),
                "positions": [{ "type": "future", "quantity": 1, "strike": 100 }],
                "spot": 100,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["kind"], "invalid_position_kind");
    }

    #[tokio::test]
    async fn test_domain_error_is_422() {
        let (status, body) = post(
            AppState::new(AppConfig::default()),
            serde_json::json!({
                "market": { "risk_free_rate": 0.05, "volatility": 0.0, "time_to_maturity": 1.0 },
                "positions": [{ "type": "put", "quantity": 1, "strike": 100 }],
                "spot": 100,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["kind"], "domain");
    }

    #[tokio::test]
    async fn test_too_many_positions() {
        let cfg = AppConfig {
            max_positions: 1,
            ..AppConfig::default()
        };
        let (status, body) = post(
            AppState::new(cfg),
            serde_json::json!({
                "market": market(),
                "positions": [
                    { "type": "stock", "quantity": 1 },
                    { "type": "stock", "quantity": 2 },
                ],
                "spot": 100,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["kind"], "input");
    }

    #[tokio::test]
    async fn test_non_numeric_quantity_is_input_error() {
        let state = AppState::new(AppConfig::default());
        let (status, body) = post(
            state.clone(),
            serde_json::json!({
                "market": market(),
                "positions": [{ "type": "call", "quantity": "abc", "strike": 100 }],
                "spot": 100,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["kind"], "input");
        assert!(body["error"].as_str().unwrap().contains("quantity"), "{body}");
        assert_eq!(state.counters.evaluations_rejected.load(portable_atomic::Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_missing_field_is_input_error() {
        let (status, body) = post(
            AppState::new(AppConfig::default()),
            serde_json::json!({ "market": market(), "positions": [] }),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["kind"], "input");
    }

    #[tokio::test]
    async fn test_oversized_grid_rejected() {
        let (status, body) = post(
            AppState::new(AppConfig::default()),
            serde_json::json!({
                "market": market(),
                "positions": [],
                "spot": 100,
                "grid": { "min": 1, "max": 2, "points": 10_000_000 },
            }),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["kind"], "invalid_grid");
    }

    #[tokio::test]
    async fn test_health() {
        let req = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
        let resp = router(AppState::new(AppConfig::default())).oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["status"], "ok");
    }
}
