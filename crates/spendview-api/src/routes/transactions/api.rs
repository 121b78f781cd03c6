//! Transactions endpoints: JSON API and HTMX partial responses
//!
//! Endpoints:
//! - api_view: current view snapshot (JSON)
//! - api_load_more: append the next page (JSON)
//! - api_set_approval: toggle one approval (JSON)
//! - htmx_transactions_list: list fragment
//! - htmx_load_more: append the next page, re-render the list
//! - htmx_set_approval: toggle one approval, re-render its pane

use crate::routes::transactions::page::{render_transaction_row, render_transactions};
use crate::{ApiError, AppState};
use axum::extract::Path;
use axum::response::Html;
use axum::{Form, Json};
use serde::{Deserialize, Serialize};
use spendview_core::ViewSnapshot;

#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub approved: bool,
}

/// Approval checkbox form body; `approved` is absent when unchecked
#[derive(Debug, Default, Deserialize)]
pub struct ApprovalForm {
    #[serde(default)]
    pub approved: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApprovalResponse {
    pub transaction_id: String,
    pub approved: bool,
}

/// Current view (JSON API)
pub async fn api_view(state: axum::extract::State<AppState>) -> Json<ViewSnapshot> {
    Json(state.view.snapshot().await)
}

/// Load the next page of the unfiltered list (JSON API)
pub async fn api_load_more(state: axum::extract::State<AppState>) -> Result<Json<ViewSnapshot>, ApiError> {
    state.view.load_all_transactions().await?;
    Ok(Json(state.view.snapshot().await))
}

/// Set the approval of one transaction (JSON API)
pub async fn api_set_approval(
    state: axum::extract::State<AppState>,
    Path(transaction_id): Path<String>,
    Json(request): Json<ApprovalRequest>,
) -> Result<Json<ApprovalResponse>, ApiError> {
    if transaction_id.is_empty() {
        return Err(ApiError::BadRequest {
            message: "transaction id is empty".to_string(),
        });
    }
    state
        .view
        .set_transaction_approval(&transaction_id, request.approved)
        .await?;
    Ok(Json(ApprovalResponse {
        transaction_id,
        approved: request.approved,
    }))
}

/// HTMX: transactions list fragment
pub async fn htmx_transactions_list(state: axum::extract::State<AppState>) -> Html<String> {
    let snapshot = state.view.snapshot().await;
    Html(render_transactions(&snapshot, &state.config.currency))
}

/// HTMX: "View More" and retry for the unfiltered list.
/// A failed fetch is rendered as a retry notice.
pub async fn htmx_load_more(state: axum::extract::State<AppState>) -> Html<String> {
    if let Err(e) = state.view.load_all_transactions().await {
        log::debug!(target: "spendview::api", "Rendering retry after: {}", e);
    }
    let snapshot = state.view.snapshot().await;
    Html(render_transactions(&snapshot, &state.config.currency))
}

/// HTMX: approval checkbox. The checkbox posts `approved` only when checked.
pub async fn htmx_set_approval(
    state: axum::extract::State<AppState>,
    Path(transaction_id): Path<String>,
    Form(form): Form<ApprovalForm>,
) -> Result<Html<String>, ApiError> {
    let approved = matches!(form.approved.as_deref(), Some("true" | "on"));

    let notice = match state.view.set_transaction_approval(&transaction_id, approved).await {
        Ok(()) => None,
        Err(e) => Some(format!("Approval was not saved: {}", e)),
    };

    let snapshot = state.view.snapshot().await;
    let row = snapshot.row(&transaction_id).ok_or_else(|| ApiError::NotFound {
        resource: format!("transaction {}", transaction_id),
    })?;
    Ok(Html(render_transaction_row(row, &state.config.currency, notice.as_deref())))
}
