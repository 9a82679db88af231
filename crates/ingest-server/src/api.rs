use application::ingestion::{BatchIngestionRequest, IngestionRequest};
use axum::{
    Router,
    body::Bytes,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::{HeaderMap, StatusCode},
    response::{
        IntoResponse, Json,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use domain::alert::{AlertQuery, AlertRepository};
use domain::measurement::{MeasurementQuery, MeasurementRepository};
use domain::threshold::NewThreshold;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::{sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

pub const DEADLINE_HEADER: &str = "x-deadline-ms";

pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/readings", post(ingest_reading).get(query_readings))
        .route("/api/readings/batch", post(ingest_batch))
        .route("/api/alerts", get(query_alerts))
        .route("/api/thresholds", post(create_threshold))
        .route(
            "/api/thresholds/{id}",
            get(get_threshold).delete(delete_threshold),
        )
        .route("/api/thresholds/{id}/activate", post(activate_threshold))
        .route("/api/thresholds/{id}/deactivate", post(deactivate_threshold))
        .route("/api/sensors/{id}/thresholds", get(sensor_thresholds))
        .route("/api/schemas/{id}/invalidate", post(invalidate_schema))
        .route("/api/events", get(sse_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

type ApiResult<T> = Result<T, ApiError>;

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> ApiResult<T> {
    serde_json::from_slice(body).map_err(|e| ApiError::validation(format!("invalid body: {e}")))
}

fn parse_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::validation(format!("invalid id: {raw}")))
}

fn parse_deadline(headers: &HeaderMap) -> ApiResult<Option<Duration>> {
    let Some(value) = headers.get(DEADLINE_HEADER) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .map(|ms| Some(Duration::from_millis(ms)))
        .ok_or_else(|| {
            ApiError::validation(format!("{DEADLINE_HEADER} must be a positive integer"))
        })
}

// --- Ingestion ---

async fn ingest_reading(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let request: IngestionRequest = parse_body(&body)?;
    let deadline = parse_deadline(&headers)?;
    let cancel = state.shutdown.child_token();

    let receipt = state.engine.ingestion.ingest(request, &cancel, deadline).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

async fn ingest_batch(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let batch: BatchIngestionRequest = parse_body(&body)?;
    let deadline = parse_deadline(&headers)?;
    let cancel = state.shutdown.child_token();

    let receipt = state
        .engine
        .ingestion
        .ingest_batch(batch, &cancel, deadline)
        .await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

#[derive(Debug, Deserialize)]
struct ReadingParams {
    asset_sensor_id: Option<Uuid>,
    sensor_type_id: Option<Uuid>,
    mac_address: Option<String>,
    field: Option<String>,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    limit: Option<u32>,
}

impl From<ReadingParams> for MeasurementQuery {
    fn from(p: ReadingParams) -> Self {
        Self {
            asset_sensor_id: p.asset_sensor_id,
            sensor_type_id: p.sensor_type_id,
            mac_address: p.mac_address,
            field_name: p.field,
            from: p.from,
            to: p.to,
            limit: p.limit,
        }
    }
}

async fn query_readings(
    State(state): State<Arc<AppState>>,
    params: Result<Query<ReadingParams>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(params) = params.map_err(|e| ApiError::validation(e.body_text()))?;
    let facts = state
        .engine
        .repositories
        .measurements
        .query(&params.into())
        .await?;
    Ok(Json(facts))
}

async fn query_alerts(
    State(state): State<Arc<AppState>>,
    params: Result<Query<AlertQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = params.map_err(|e| ApiError::validation(e.body_text()))?;
    let alerts = state.engine.repositories.alerts.query(&query).await?;
    Ok(Json(alerts))
}

// --- Thresholds ---

async fn create_threshold(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let request: NewThreshold = parse_body(&body)?;
    let threshold = state.engine.thresholds.create(request).await?;
    Ok((StatusCode::CREATED, Json(threshold)))
}

async fn get_threshold(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    let threshold = state.engine.thresholds.get(parse_id(&id)?).await?;
    Ok(Json(threshold))
}

async fn delete_threshold(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    state.engine.thresholds.delete(parse_id(&id)?).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn activate_threshold(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    let threshold = state.engine.thresholds.activate(parse_id(&id)?).await?;
    Ok(Json(threshold))
}

async fn deactivate_threshold(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    let threshold = state.engine.thresholds.deactivate(parse_id(&id)?).await?;
    Ok(Json(threshold))
}

async fn sensor_thresholds(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    let thresholds = state
        .engine
        .thresholds
        .list_for_sensor(parse_id(&id)?)
        .await?;
    Ok(Json(thresholds))
}

// --- Schemas ---

async fn invalidate_schema(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    let sensor_type_id = parse_id(&id)?;
    let invalidated = state.engine.registry.invalidate(sensor_type_id);
    Ok(Json(json!({
        "sensor_type_id": sensor_type_id,
        "invalidated": invalidated
    })))
}

// --- Events & health ---

async fn sse_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let rx = state.events.subscribe();
    let stream = BroadcastStream::new(rx)
        .map(|msg| match msg {
            Ok(event) => Event::default()
                .event(event.event_type())
                .json_data(&event)
                .map_err(|_| axum::Error::new("Serialization error")),
            // Lagged subscriber: skip ahead
            Err(_) => Ok(Event::default().comment("lagged")),
        })
        .take_until(state.shutdown.clone().cancelled_owned());

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let dispatcher = state.engine.dispatcher.stats();
    let closed = state.engine.dispatcher.is_closed();

    let status = if closed {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (
        status,
        Json(json!({
            "status": if closed { "shutting_down" } else { "ok" },
            "uptime_secs": state.started_at.elapsed().as_secs(),
            "cached_schemas": state.engine.registry.cached_count(),
            "event_subscribers": state.events.subscriber_count(),
            "dispatcher": dispatcher,
        })),
    )
}
