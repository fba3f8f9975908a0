// src/server/routes.rs
use std::sync::Arc;
use bytes::Bytes;
use http::{Method, StatusCode};
use log::{debug, error};
use serde_json::{json, Value};
use crate::error::Result;
use crate::service::{parse_body, Operation};
use super::response::{
    error_response, json_response, method_not_allowed, not_found, preflight_response, ApiResponse,
};
use super::ServerState;

pub const APPEND_PATH: &str = "/api/append-table";
pub const JOIN_PATH: &str = "/api/join-table";
pub const CLUSTER_PATH: &str = "/api/cluster-matching";
pub const HEALTH_PATH: &str = "/api/health";

enum Route {
    Operation(Operation),
    Health,
}

impl Route {
    fn from_path(path: &str) -> Option<Self> {
        match path.trim_end_matches('/') {
            APPEND_PATH => Some(Route::Operation(Operation::Append)),
            JOIN_PATH => Some(Route::Operation(Operation::Join)),
            CLUSTER_PATH => Some(Route::Operation(Operation::Cluster)),
            HEALTH_PATH => Some(Route::Health),
            _ => None,
        }
    }

    fn allowed(&self) -> &'static str {
        match self {
            Route::Operation(_) => "POST, OPTIONS",
            Route::Health => "GET, OPTIONS",
        }
    }
}

/// Dispatches one request with its already-collected body.
pub async fn route(state: &Arc<ServerState>, method: &Method, path: &str, body: Bytes) -> ApiResponse {
    let origin = state.allow_origin();

    let Some(route) = Route::from_path(path) else {
        return not_found(method.as_str(), path, origin);
    };

    match (method, route) {
        (&Method::OPTIONS, _) => preflight_response(origin),
        (&Method::GET, Route::Health) => {
            json_response(StatusCode::OK, &json!({"status": "ok"}), origin)
        }
        (&Method::POST, Route::Operation(op)) => match run_operation(state, op, body).await {
            Ok(result) => json_response(StatusCode::OK, &result, origin),
            Err(e) => {
                if e.is_client_error() {
                    debug!("{} rejected: {}", op, e);
                } else {
                    error!("{} failed: {}", op, e);
                }
                error_response(&e, origin)
            }
        },
        (_, route) => method_not_allowed(method.as_str(), path, route.allowed(), origin),
    }
}

/// Runs an operation off the async workers; clustering is O(n²).
async fn run_operation(state: &Arc<ServerState>, op: Operation, body: Bytes) -> Result<Value> {
    let request = parse_body(&body)?;
    let service = Arc::clone(state.service());
    tokio::task::spawn_blocking(move || service.handle(op, request)).await?
}
