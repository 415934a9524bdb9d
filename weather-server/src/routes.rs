//! HTTP surface of the weather server.
//!
//! Handlers only extract query strings and hand them to `WeatherService`;
//! `ApiError` turns service errors into status codes and JSON bodies.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use weather_core::{
    GeocodeParams, ReverseGeocodeParams, WeatherError, WeatherParams, WeatherService,
};

/// Shared state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<WeatherService>,
}

impl AppState {
    pub fn new(service: WeatherService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// Service error rendered as an HTTP response.
pub struct ApiError(WeatherError);

impl From<WeatherError> for ApiError {
    fn from(err: WeatherError) -> Self {
        Self(err)
    }
}

/// Unreadable query strings get the same JSON error shape as every other 400.
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(WeatherError::InvalidQuery(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = self.0;
        if err.is_internal() {
            tracing::error!(error = %err, "request failed");
        } else {
            tracing::debug!(error = %err, status = err.status_code(), "request rejected");
        }

        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(err.client_body())).into_response()
    }
}

type ApiResult = Result<Json<Value>, ApiError>;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/geocode", get(geocode))
        .route("/geocode/reverse", get(reverse_geocode))
        .route("/weather", get(current_weather))
        .route("/weather/forecast", get(forecast))
        .route("/status", get(status));

    Router::new()
        .route("/", get(index))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn index() -> Json<Value> {
    Json(json!({ "message": "Hello from Weather Info Server app!" }))
}

async fn status() -> Json<Value> {
    Json(json!({ "status": "Up and running!" }))
}

async fn geocode(
    State(state): State<AppState>,
    query: Result<Query<GeocodeParams>, QueryRejection>,
) -> ApiResult {
    let Query(params) = query?;
    Ok(Json(state.service.geocode(&params).await?))
}

async fn reverse_geocode(
    State(state): State<AppState>,
    query: Result<Query<ReverseGeocodeParams>, QueryRejection>,
) -> ApiResult {
    let Query(params) = query?;
    Ok(Json(state.service.reverse_geocode(&params).await?))
}

async fn current_weather(
    State(state): State<AppState>,
    query: Result<Query<WeatherParams>, QueryRejection>,
) -> ApiResult {
    let Query(params) = query?;
    Ok(Json(state.service.current_weather(&params).await?))
}

async fn forecast(
    State(state): State<AppState>,
    query: Result<Query<WeatherParams>, QueryRejection>,
) -> ApiResult {
    let Query(params) = query?;
    Ok(Json(state.service.forecast(&params).await?))
}
