use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::StateError;
use crate::routing::{Route, RouteError, RouteManager};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayPort {
    pub port: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
}

/// Error returned by management handlers, rendered as JSON.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn internal(message: impl ToString) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}

impl From<RouteError> for ApiError {
    fn from(err: RouteError) -> Self {
        let status = match &err {
            RouteError::InvalidTarget(_) | RouteError::Port(StateError::InvalidPort(_)) => {
                StatusCode::BAD_REQUEST
            }
            RouteError::Persist(_) | RouteError::Port(StateError::Persist(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, message = %self.message, "Management request failed");
        } else {
            tracing::warn!(status = %self.status, message = %self.message, "Management request rejected");
        }
        (self.status, Json(ErrorBody { message: self.message })).into_response()
    }
}

pub async fn ping() -> &'static str {
    "pong"
}

pub async fn get_routes(State(routes): State<Arc<RouteManager>>) -> Json<Vec<Route>> {
    Json(routes.get_routes())
}

pub async fn create_route(
    State(routes): State<Arc<RouteManager>>,
    body: Result<Json<Route>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(route) = body?;
    // Persisting touches the disk; keep it off the async workers.
    tokio::task::spawn_blocking(move || routes.create_route(route))
        .await
        .map_err(ApiError::internal)??;
    Ok(StatusCode::CREATED)
}

pub async fn get_port(State(routes): State<Arc<RouteManager>>) -> Json<GatewayPort> {
    Json(GatewayPort {
        port: routes.get_gateway_port(),
    })
}

pub async fn set_port(
    State(routes): State<Arc<RouteManager>>,
    body: Result<Json<GatewayPort>, JsonRejection>,
) -> Result<Json<GatewayPort>, ApiError> {
    let Json(request) = body?;
    let port = tokio::task::spawn_blocking(move || {
        routes.set_gateway_port(&request.port)?;
        Ok::<_, RouteError>(routes.get_gateway_port())
    })
    .await
    .map_err(ApiError::internal)??;
    Ok(Json(GatewayPort { port }))
}
