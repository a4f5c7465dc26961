use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::{SystemTime, UNIX_EPOCH},
};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::{
    ApiDemoDataRequest, ApiDemoDataResponse, ApiDuplicateRequest, ApiDuplicateResponse,
    ApiErrorResponse,
};
use reel_insights::actions::DASHBOARD_VARIATIONS;
use reel_insights::config::InsightsConfig;
use reel_insights::{apply_demo_data, duplicate_insight, Completion, ErrorKind, Synthesizer};

type ApiError = (StatusCode, Json<ApiErrorResponse>);

#[derive(Clone)]
struct AppState {
    synth: Arc<Synthesizer<Arc<dyn Completion>>>,
}

static REQUEST_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub async fn serve(
    args: crate::ServeArgs,
    config: &InsightsConfig,
    synth: Synthesizer<Arc<dyn Completion>>,
) -> Result<(), String> {
    let state = AppState {
        synth: Arc::new(synth),
    };

    let app = Router::new()
        .route("/api/health", get(health))
        .route("/api/demo-data", post(demo_data_handler))
        .route("/api/insights/duplicate", post(duplicate_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .map_err(|err| format!("invalid bind address: {}", err))?;

    info!(%addr, model = %config.llm.model, "serving insight generation api");
    axum::serve(
        tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|err| format!("failed to bind server: {}", err))?,
        app,
    )
    .await
    .map_err(|err| format!("server error: {}", err))?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    StatusCode::OK
}

async fn demo_data_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiDemoDataRequest>,
) -> Result<Json<ApiDemoDataResponse>, ApiError> {
    let request_id = request
        .request_id
        .clone()
        .unwrap_or_else(generate_request_id);
    let (title, initial_views) = request.into_input();
    info!(%request_id, %title, initial_views, "demo data requested");

    match apply_demo_data(state.synth.as_ref(), &title, initial_views).await {
        Ok(metrics) => Ok(Json(ApiDemoDataResponse {
            request_id,
            metrics,
        })),
        Err(err) => Err((
            status_for(err.kind()),
            Json(ApiErrorResponse::from_action(&err, request_id)),
        )),
    }
}

async fn duplicate_handler(
    State(state): State<AppState>,
    Json(request): Json<ApiDuplicateRequest>,
) -> Result<Json<ApiDuplicateResponse>, ApiError> {
    let request_id = request
        .request_id
        .clone()
        .unwrap_or_else(generate_request_id);
    let (original, count) = request.into_input(DASHBOARD_VARIATIONS).map_err(|err| {
        (
            status_for(err.kind()),
            Json(ApiErrorResponse::from_synthesis(&err, request_id.clone())),
        )
    })?;
    info!(%request_id, video_id = %original.video_id, count, "duplicate requested");

    match duplicate_insight(state.synth.as_ref(), &original, count).await {
        Ok(variations) => Ok(Json(ApiDuplicateResponse {
            request_id,
            variations,
        })),
        Err(err) => Err((
            status_for(err.kind()),
            Json(ApiErrorResponse::from_action(&err, request_id)),
        )),
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::CollaboratorUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::Cancelled => {
            StatusCode::from_u16(499).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        }
        ErrorKind::MalformedOutput | ErrorKind::SchemaViolation | ErrorKind::CountMismatch => {
            StatusCode::BAD_GATEWAY
        }
    }
}

fn generate_request_id() -> String {
    let counter = REQUEST_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("req-{}-{}", now_ms(), counter)
}

fn now_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis())
        .unwrap_or(0)
}
