//! Operation lifecycle handlers.
//!
//! The HTTP adapter only reads raw header strings and hands them to the
//! core; every validation decision lives there.

use axum::{
    extract::{RawQuery, State},
    http::{header::AUTHORIZATION, HeaderMap},
    response::Json,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::{error::ApiError, state::AppState};

/// Header carrying the caller-supplied operation id on verification
pub const OPERATION_ID_HEADER: &str = "X-OPERATION-ID";

#[derive(Debug, Serialize)]
pub struct StartOperationResponse {
    pub success: bool,
    pub data: OperationData,
}

#[derive(Debug, Serialize)]
pub struct OperationData {
    #[serde(rename = "operationId")]
    pub operation_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub success: bool,
}

fn auth_header(headers: &HeaderMap) -> &str {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("")
}

/// POST /operations
pub async fn start_operation(
    State(state): State<Arc<AppState>>,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
) -> Result<Json<StartOperationResponse>, ApiError> {
    let identity = state.operations.authorize(auth_header(&headers))?;

    // The form is resolved before the record is written, so a rejected or
    // failed form request leaves no orphaned operation behind.
    let form = match &state.forms {
        Some(client) => client.resolve(raw_query.as_deref()).await?,
        None => None,
    };

    let operation_id = state.operations.issue_for(identity).await?;

    Ok(Json(StartOperationResponse {
        success: true,
        data: OperationData { operation_id, form },
    }))
}

/// GET /operations/check
pub async fn check_operation(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<CheckResponse>, ApiError> {
    let operation_header = headers
        .get(OPERATION_ID_HEADER)
        .and_then(|h| h.to_str().ok());

    state
        .operations
        .verify(auth_header(&headers), operation_header)
        .await?;

    Ok(Json(CheckResponse { success: true }))
}
