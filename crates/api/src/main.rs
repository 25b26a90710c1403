use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use advisor_core::analytics::{build_analytics, AnalyticsReport};
use advisor_core::config::{EngineConfig, Settings};
use advisor_core::domain::contract::AdviceRequest;
use advisor_core::domain::recommendation::AdviceSnapshot;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let state = AppState {
        engine: Arc::new(settings.engine.clone()),
    };
    let app = router(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], settings.port));
    tracing::info!(
        %addr,
        max_recommendations = settings.engine.max_recommendations,
        debt_risk_fixed_ratio = settings.engine.debt_risk_fixed_ratio,
        "api listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/recommendations", post(post_recommendations))
        .route("/analytics", post(post_analytics))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Clone)]
struct AppState {
    engine: Arc<EngineConfig>,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn unprocessable(err: anyhow::Error) -> Self {
        tracing::warn!(error = %format!("{err:#}"), "rejected request");
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: format!("{err:#}"),
        }
    }

    fn internal(err: anyhow::Error) -> Self {
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(error = %err, "request failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "internal error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

fn resolve_as_of(req: &AdviceRequest, engine: &EngineConfig) -> Result<NaiveDate, ApiError> {
    if let Some(d) = req.as_of_date {
        return Ok(d);
    }
    advisor_core::time::resolve_as_of_date(None, Utc::now(), engine.utc_offset_minutes)
        .map_err(ApiError::internal)
}

async fn post_recommendations(
    State(state): State<AppState>,
    Json(req): Json<AdviceRequest>,
) -> Result<Json<AdviceSnapshot>, ApiError> {
    let as_of = resolve_as_of(&req, &state.engine)?;
    let input = req
        .validate_and_into_input()
        .map_err(ApiError::unprocessable)?;

    let snapshot = advisor_core::generate_snapshot(&input, as_of, Utc::now(), &state.engine);
    tracing::info!(
        %as_of,
        recommendations = snapshot.recommendations.len(),
        "served recommendations"
    );
    Ok(Json(snapshot))
}

async fn post_analytics(
    State(state): State<AppState>,
    Json(req): Json<AdviceRequest>,
) -> Result<Json<AnalyticsReport>, ApiError> {
    let as_of = resolve_as_of(&req, &state.engine)?;
    let input = req
        .validate_and_into_input()
        .map_err(ApiError::unprocessable)?;

    Ok(Json(build_analytics(&input.profile, &input.transactions, as_of)))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
