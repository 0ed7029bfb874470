use crate::api::{ApiError, AppState, ListParams};
use crate::storage::{self, Pagination, RunRecord, Storage, StoredItem};
use crate::sync::{Trigger, TriggerOutcome};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ItemPage {
    pub items: Vec<StoredItem>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshAccepted {
    /// Crawl-run id to poll at `/api/refresh/{id}`
    pub job_id: Option<i64>,
    pub status: &'static str,
    /// True when the request joined a refresh that was already running
    pub coalesced: bool,
    pub message: &'static str,
}

pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

pub async fn list_items(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ItemPage>, ApiError> {
    let query = params.into_query()?;

    let storage = storage::lock(&state.storage)?;
    let total = storage.count_items(&query.filter)?;
    let items = storage.find_items(&query)?;
    drop(storage);

    Ok(Json(ItemPage {
        items,
        pagination: Pagination::new(query.page, query.limit, total),
    }))
}

pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredItem>, ApiError> {
    let id = parse_id(&id, "Item")?;
    let item = storage::lock(&state.storage)?.get_item(id)?;
    item.map(Json)
        .ok_or_else(|| ApiError::not_found("Item not found"))
}

pub async fn start_refresh(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<RefreshAccepted>), ApiError> {
    let body = match state.runner.try_start(Trigger::Manual)? {
        TriggerOutcome::Started { run_id } => {
            tracing::info!("Manual refresh started as run {}", run_id);
            RefreshAccepted {
                job_id: Some(run_id),
                status: "running",
                coalesced: false,
                message: "Refresh started. This may take a few minutes.",
            }
        }
        TriggerOutcome::AlreadyRunning { run_id } => {
            tracing::info!("Manual refresh joined running run {:?}", run_id);
            RefreshAccepted {
                job_id: run_id,
                status: "running",
                coalesced: true,
                message: "A refresh is already in progress.",
            }
        }
    };
    Ok((StatusCode::ACCEPTED, Json(body)))
}

pub async fn refresh_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RunRecord>, ApiError> {
    let id = parse_id(&id, "Refresh job")?;
    let run = storage::lock(&state.storage)?.get_run(id)?;
    run.map(Json)
        .ok_or_else(|| ApiError::not_found("Refresh job not found"))
}

/// Ids that are not integers cannot exist, so they are reported as not found
fn parse_id(raw: &str, what: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::not_found(format!("{} not found", what)))
}
