//! Employee filter routes
//!
//! An empty `employee_id` is the "All Employees" sentinel.

use crate::routes::transactions::page::render_transactions;
use crate::{ApiError, AppState};
use axum::response::Html;
use axum::{Form, Json};
use serde::Deserialize;
use spendview_core::{LoadOutcome, TransactionView, ViewResult, ViewSnapshot};

#[derive(Debug, Default, Deserialize)]
pub struct FilterRequest {
    #[serde(default)]
    pub employee_id: Option<String>,
}

/// Filter `<select>` form body
#[derive(Debug, Default, Deserialize)]
pub struct FilterForm {
    #[serde(default)]
    pub employee_id: String,
}

/// Dispatch a selection by id.
///
/// Ids missing from the loaded directory are still filtered on, so a
/// retry works before the directory has loaded.
pub async fn apply_filter(view: &TransactionView, employee_id: Option<&str>) -> ViewResult<LoadOutcome> {
    match employee_id.filter(|id| !id.is_empty()) {
        None => view.on_filter_selection_change(None).await,
        Some(id) => match view.employee(id).await {
            Some(employee) => view.on_filter_selection_change(Some(&employee)).await,
            None => view.load_transactions_by_employee(id).await,
        },
    }
}

/// HTMX: filter `<select>` change
pub async fn htmx_filter(state: axum::extract::State<AppState>, Form(form): Form<FilterForm>) -> Html<String> {
    if let Err(e) = apply_filter(&state.view, Some(&form.employee_id)).await {
        log::debug!(target: "spendview::api", "Rendering retry after: {}", e);
    }
    let snapshot = state.view.snapshot().await;
    Html(render_transactions(&snapshot, &state.config.currency))
}

/// Change the filter (JSON API)
pub async fn api_filter(
    state: axum::extract::State<AppState>,
    Json(request): Json<FilterRequest>,
) -> Result<Json<ViewSnapshot>, ApiError> {
    apply_filter(&state.view, request.employee_id.as_deref()).await?;
    Ok(Json(state.view.snapshot().await))
}
