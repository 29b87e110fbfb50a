use crate::error::AppError;
use crate::AppState;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use social_adapter::{shim, AdapterKind, AdapterService};

/// `POST /`: the default adapter.
pub async fn submit_default(State(state): State<AppState>, body: Bytes) -> Result<Response, AppError> {
    let kind = state.default_adapter().ok_or_else(|| {
        AppError::not_found("no default adapter; post to /reddit or /twitter")
    })?;
    let service = state
        .service(kind)
        .ok_or_else(|| AppError::not_found(format!("adapter not configured: {kind}")))?;
    Ok(respond(service, &body).await)
}

/// `POST /:adapter`: a named adapter.
pub async fn submit(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Response, AppError> {
    let kind: AdapterKind = name
        .parse()
        .map_err(|_| AppError::not_found(format!("adapter not found: {name}")))?;
    let service = state
        .service(kind)
        .ok_or_else(|| AppError::not_found(format!("adapter not configured: {kind}")))?;
    Ok(respond(service, &body).await)
}

async fn respond(service: &AdapterService, body: &[u8]) -> Response {
    let (status, envelope) = shim::handle_body(service, body).await;
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(envelope)).into_response()
}

pub async fn healthz(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "ok": true,
        "adapters": state.enabled(),
        "default": state.default_adapter(),
    }))
}
