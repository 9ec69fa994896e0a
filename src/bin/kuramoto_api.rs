use std::net::SocketAddr;

use anyhow::Context;
use axum::{http::StatusCode, response::IntoResponse, routing::{get, post}, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use kuramoto_sweep::analysis::{critical_coupling_gaussian, summarize, SweepSummary};
use kuramoto_sweep::math::circle::wrap_phase;
use kuramoto_sweep::model::sweep::SweepWarning;
use kuramoto_sweep::{run_sweep, run_sweep_with_ensemble, Ensemble, KuramotoError, SweepConfig};

// Full phase trajectories are N x steps per coupling; refuse anything larger in one response.
const MAX_RESPONSE_CELLS: usize = 5_000_000;

#[derive(Debug, Deserialize)]
struct SweepRequest {
    #[serde(default)]
    config: SweepConfig,
    /// Explicit ensemble; replaces the seeded draw and fixes N
    ensemble: Option<Ensemble>,
    #[serde(default)]
    include_series: bool,
    #[serde(default)]
    include_final_phases: bool,
}

#[derive(Debug, Serialize)]
struct Series {
    coupling: f64,
    t: Vec<f64>,
    r: Vec<f64>,
    psi: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct FinalPhases {
    coupling: f64,
    theta_wrapped: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct SweepResponse {
    return_code: i32,
    n: usize,
    steps: usize,
    dt: f64,
    critical_coupling: f64,
    omega: Vec<f64>,
    summary: Vec<SweepSummary>,
    warnings: Vec<SweepWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    series: Option<Vec<Series>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    final_phases: Option<Vec<FinalPhases>>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .compact()
        .init();

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(8000);

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/sweep", post(sweep));

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("invalid HOST/PORT: {host}:{port}"))?;
    info!(%addr, "kuramoto-api listening");

    let listener = tokio::net::TcpListener::bind(addr).await.context("bind failed")?;
    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}

async fn healthz() -> impl IntoResponse {
    Json(json!({"ok": true}))
}

async fn sweep(Json(req): Json<SweepRequest>) -> impl IntoResponse {
    // CPU-bound; keep it off the async workers
    let join = tokio::task::spawn_blocking(move || sweep_sync(req));

    match join.await {
        Ok(Ok(resp)) => (StatusCode::OK, Json(resp)).into_response(),
        Ok(Err((code, body))) => (code, Json(body)).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"return_code": 2, "error": format!("join error: {e}")})),
        )
            .into_response(),
    }
}

fn sweep_sync(req: SweepRequest) -> Result<SweepResponse, (StatusCode, serde_json::Value)> {
    let mut cfg = req.config;
    if let Some(ens) = &req.ensemble {
        cfg.n = ens.len();
    }
    cfg.check().map_err(bad_request)?;

    let cells = cfg.n.saturating_mul(cfg.step_count()).saturating_mul(cfg.couplings.len());
    if cells > MAX_RESPONSE_CELLS {
        return Err((
            StatusCode::PAYLOAD_TOO_LARGE,
            json!({"return_code": 1, "error": format!("n x steps x couplings = {cells} exceeds {MAX_RESPONSE_CELLS}")}),
        ));
    }

    let result = match &req.ensemble {
        Some(ens) => run_sweep_with_ensemble(&cfg, ens),
        None => run_sweep(&cfg),
    }
    .map_err(bad_request)?;

    let series: Option<Vec<Series>> = req.include_series.then(|| {
        result
            .trajectories
            .iter()
            .map(|t| Series {
                coupling: t.coupling,
                t: t.times.clone(),
                r: t.r.clone(),
                psi: t.psi.clone(),
            })
            .collect()
    });

    let final_phases: Option<Vec<FinalPhases>> = req.include_final_phases.then(|| {
        result
            .trajectories
            .iter()
            .map(|t| FinalPhases {
                coupling: t.coupling,
                theta_wrapped: t
                    .final_phases()
                    .map(|p| p.iter().copied().map(wrap_phase).collect::<Vec<f64>>())
                    .unwrap_or_default(),
            })
            .collect()
    });

    Ok(SweepResponse {
        return_code: 0,
        n: cfg.n,
        steps: result.steps,
        dt: result.dt,
        critical_coupling: critical_coupling_gaussian(cfg.freq_std),
        summary: summarize(&result),
        omega: result.omega,
        warnings: result.warnings,
        series,
        final_phases,
    })
}

fn bad_request(e: KuramotoError) -> (StatusCode, serde_json::Value) {
    (
        StatusCode::BAD_REQUEST,
        json!({"return_code": 1, "error": e.to_string()}),
    )
}
