use axum::extract::{Query, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use iml_anchor::PinataClient;
use iml_chain::Block;
use iml_ledger::AnchorOutcome;
use iml_types::{AnchorId, LogEntry, MovementKind, ProductId};

use crate::error::ServerError;
use crate::state::AppState;

/// Body of `POST /v1/movements`.
#[derive(Debug, Deserialize)]
pub struct RecordMovementRequest {
    #[serde(rename = "type")]
    pub kind: MovementKind,
    pub product_id: u64,
    pub amount: u64,
}

/// Response to a recorded movement.
///
/// `anchored` is always present; a degraded (unanchored) movement is still
/// a 200 with the failure reason in `warning`.
#[derive(Debug, Serialize)]
pub struct MovementResponse {
    pub entry: LogEntry,
    pub block: Block,
    pub anchored: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_id: Option<AnchorId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// POST /v1/movements
pub async fn record_movement(
    State(state): State<AppState>,
    Json(request): Json<RecordMovementRequest>,
) -> Result<Json<MovementResponse>, ServerError> {
    let receipt = state
        .ledger
        .record_movement(request.kind, ProductId::new(request.product_id), request.amount)
        .await?;

    let (anchored, anchor_id, gateway_url, warning) = match &receipt.anchor {
        AnchorOutcome::Anchored(id) => (
            true,
            Some(id.clone()),
            Some(PinataClient::gateway_url(id)),
            None,
        ),
        AnchorOutcome::Unanchored { reason } => (false, None, None, Some(reason.clone())),
    };

    Ok(Json(MovementResponse {
        entry: receipt.entry,
        block: receipt.block,
        anchored,
        anchor_id,
        gateway_url,
        warning,
    }))
}

/// Response to a chain snapshot request.
#[derive(Debug, Serialize)]
pub struct ChainResponse {
    pub length: usize,
    pub blocks: Vec<Block>,
}

/// GET /v1/chain
pub async fn get_chain(
    State(state): State<AppState>,
) -> Result<Json<ChainResponse>, ServerError> {
    let blocks = state.ledger.chain()?;
    Ok(Json(ChainResponse {
        length: blocks.len(),
        blocks,
    }))
}

/// Response to a verification scan.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_invalid_index: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
}

/// GET /v1/chain/verify
pub async fn verify_chain(
    State(state): State<AppState>,
) -> Result<Json<VerifyResponse>, ServerError> {
    let report = state.ledger.verify_chain()?;
    Ok(Json(VerifyResponse {
        valid: report.is_valid(),
        length: report.length,
        first_invalid_index: report.failing_index(),
        fault: report.fault.map(|f| f.to_string()),
    }))
}

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub product_id: Option<u64>,
}

/// Response to a log listing.
#[derive(Debug, Serialize)]
pub struct LogsResponse {
    pub count: usize,
    pub entries: Vec<LogEntry>,
}

/// GET /v1/logs
pub async fn list_logs(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<LogsResponse>, ServerError> {
    let mut entries = state.ledger.list_entries()?;
    if let Some(product_id) = query.product_id {
        entries.retain(|entry| entry.product_id == ProductId::new(product_id));
    }
    Ok(Json(LogsResponse {
        count: entries.len(),
        entries,
    }))
}

/// GET /v1/health
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /v1/info
pub async fn info(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ServerError> {
    let report = state.ledger.verify_chain()?;
    let latest = state.ledger.latest_block()?;
    Ok(Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "chain": {
            "length": report.length,
            "valid": report.is_valid(),
            "latest_hash": latest.hash.to_hex(),
        },
    })))
}
