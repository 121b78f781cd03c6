//! Transactions page rendering
//!
//! Endpoints:
//! - page_index: main page with the employee filter and the list
//!
//! Helper functions:
//! - render_filter: employee `<select>`, "All Employees" first
//! - render_transactions: list fragment with "View More" and retry controls
//! - render_transaction_row: one transaction pane with its approval toggle

use crate::AppState;
use spendview_config::CurrencyConfig;
use spendview_core::{FilterMode, TransactionRow, ViewSnapshot};
use spendview_ledger::Employee;
use spendview_utils::{escape_html, format_money};

/// Main page
pub async fn page_index(state: axum::extract::State<AppState>) -> axum::response::Html<String> {
    let snapshot = state.view.snapshot().await;
    let content = render_index(&snapshot, &state.config.currency);
    axum::response::Html(crate::base_html("Transactions", &content))
}

pub fn render_index(snapshot: &ViewSnapshot, currency: &CurrencyConfig) -> String {
    format!(
        r#"<main class='max-w-4xl mx-auto p-6'>
    <div class='flex items-center justify-between mb-6'>
        <h1 class='text-2xl font-bold'>Transactions</h1>
        {}
    </div>
    <div id='transactions-content'>
        {}
    </div>
</main>"#,
        render_filter(snapshot),
        render_transactions(snapshot, currency)
    )
}

/// Employee filter. Disabled while the directory loads.
pub fn render_filter(snapshot: &ViewSnapshot) -> String {
    let selected_id = snapshot
        .filter
        .employee_id()
        .unwrap_or(Employee::ALL_EMPLOYEES_ID);
    let disabled = if snapshot.employees_loading { "disabled" } else { "" };

    let mut options = String::new();
    for employee in snapshot.filter_options() {
        let selected = if employee.id == selected_id { "selected" } else { "" };
        options.push_str(&format!(
            "<option value='{}' {}>{}</option>",
            escape_html(&employee.id),
            selected,
            escape_html(&employee.full_name())
        ));
    }

    let notice = match &snapshot.employees_error {
        Some(message) => format!(
            "<p class='text-xs text-red-600 mt-1'>Employees unavailable: {} <a href='/' class='underline'>Reload</a></p>",
            escape_html(message)
        ),
        None => String::new(),
    };

    format!(
        r#"<div>
        <select id='employee-filter' name='employee_id' hx-post='/filter' hx-trigger='change'
            hx-target='#transactions-content' hx-indicator='#transactions-loading'
            class='px-4 py-2 border rounded-lg bg-white' {}>{}</select>{}
    </div>"#,
        disabled, options, notice
    )
}

/// The visible list, with the controls that apply to the current filter
pub fn render_transactions(snapshot: &ViewSnapshot, currency: &CurrencyConfig) -> String {
    let mut html = String::from(
        "<div id='transactions-loading' class='htmx-indicator text-sm text-gray-500 mb-2'>Loading...</div>",
    );

    if let Some(message) = &snapshot.transactions_error {
        html.push_str(&render_retry(&snapshot.filter, message));
    }

    if snapshot.rows.is_empty() {
        let placeholder = if snapshot.transactions_loading {
            "Loading transactions..."
        } else {
            "No transactions"
        };
        html.push_str(&format!("<p class='text-gray-500 py-8 text-center'>{}</p>", placeholder));
    } else {
        html.push_str("<div class='space-y-2'>");
        for row in &snapshot.rows {
            html.push_str(&render_transaction_row(row, currency, None));
        }
        html.push_str("</div>");
    }

    if snapshot.has_more {
        let disabled = if snapshot.transactions_loading { "disabled" } else { "" };
        html.push_str(&format!(
            r#"<div class='mt-4 text-center'>
        <button hx-post='/transactions/more' hx-target='#transactions-content' hx-indicator='#transactions-loading'
            class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700' {}>View More</button>
    </div>"#,
            disabled
        ));
    }
    html
}

/// One transaction pane; `notice` is shown under it when set
pub fn render_transaction_row(row: &TransactionRow, currency: &CurrencyConfig, notice: Option<&str>) -> String {
    let transaction = &row.transaction;
    let dom_id = escape_html(&transaction.id);
    let checked = if row.approved { "checked" } else { "" };
    let disabled = if row.pending { "disabled" } else { "" };
    let notice = notice
        .map(|n| format!("<p class='w-full text-xs text-red-600 mt-2'>{}</p>", escape_html(n)))
        .unwrap_or_default();

    format!(
        r#"<div id='txn-{}' class='p-4 bg-white rounded-lg border flex flex-wrap items-center justify-between'>
        <div>
            <p class='font-medium'>{}</p>
            <p class='text-sm text-gray-500'>{} &middot; {}</p>
        </div>
        <div class='flex items-center gap-4'>
            <span class='font-mono'>{}</span>
            <label class='flex items-center gap-2 text-sm'>
                <input type='checkbox' name='approved' value='true' {} {}
                    hx-post='/transactions/{}/approval' hx-target='#txn-{}' hx-swap='outerHTML'>
                Approved
            </label>
        </div>
        {}
    </div>"#,
        dom_id,
        escape_html(&transaction.merchant),
        escape_html(&transaction.employee.full_name()),
        transaction.date.format("%b %-d, %Y"),
        format_money(transaction.amount, &currency.symbol, currency.decimal_places),
        checked,
        disabled,
        urlencoding::encode(&transaction.id),
        dom_id,
        notice
    )
}

/// Retry control: the same request the user made last
fn render_retry(filter: &FilterMode, message: &str) -> String {
    let action = match filter {
        FilterMode::All => "hx-post='/transactions/more'".to_string(),
        FilterMode::ByEmployee(id) => format!(
            "hx-post='/filter' hx-vals='{}'",
            escape_html(&serde_json::json!({ "employee_id": id }).to_string())
        ),
    };
    format!(
        r#"<div class='mb-4 p-3 rounded-lg border border-red-200 bg-red-50 text-sm text-red-700 flex items-center justify-between'>
        <span>Could not load transactions: {}</span>
        <button {} hx-target='#transactions-content' class='px-3 py-1 border border-red-300 rounded hover:bg-red-100'>Retry</button>
    </div>"#,
        escape_html(message),
        action
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use spendview_ledger::Transaction;

    fn currency() -> CurrencyConfig {
        CurrencyConfig::default()
    }

    fn row(id: &str, approved: bool) -> TransactionRow {
        TransactionRow {
            transaction: Transaction {
                id: id.to_string(),
                merchant: "Uber".to_string(),
                amount: Decimal::new(123456, 2),
                date: NaiveDate::from_ymd_opt(2022, 3, 7).unwrap(),
                employee: Employee::new("e1", "Ada", "Lovelace"),
                approved: false,
            },
            approved,
            pending: false,
        }
    }

    fn snapshot() -> ViewSnapshot {
        ViewSnapshot {
            filter: FilterMode::All,
            employees: vec![Employee::new("e1", "Ada", "Lovelace")],
            rows: vec![row("t1", false)],
            employees_loading: false,
            transactions_loading: false,
            has_more: true,
            filter_active: false,
            employees_error: None,
            transactions_error: None,
            discarded_results: 0,
        }
    }

    #[test]
    fn test_filter_lists_sentinel_first_and_selected() {
        let html = render_filter(&snapshot());
        let all = html.find("All Employees").unwrap();
        let ada = html.find("Ada Lovelace").unwrap();
        assert!(all < ada);
        assert!(html.contains("<option value='' selected>"));
        assert!(!html.contains("disabled"));
    }

    #[test]
    fn test_filter_marks_selected_employee_and_disables_while_loading() {
        let mut snapshot = snapshot();
        snapshot.filter = FilterMode::ByEmployee("e1".to_string());
        snapshot.employees_loading = true;
        let html = render_filter(&snapshot);
        assert!(html.contains("<option value='e1' selected>"));
        assert!(html.contains("disabled"));
    }

    #[test]
    fn test_view_more_only_when_has_more() {
        let mut snapshot = snapshot();
        assert!(render_transactions(&snapshot, &currency()).contains("View More"));

        snapshot.has_more = false;
        assert!(!render_transactions(&snapshot, &currency()).contains("View More"));
    }

    #[test]
    fn test_failure_renders_retry() {
        let mut snapshot = snapshot();
        snapshot.transactions_error = Some("timeout".to_string());
        let html = render_transactions(&snapshot, &currency());
        assert!(html.contains("Retry"));
        assert!(html.contains("Could not load transactions: timeout"));
        assert!(html.contains("txn-t1"));

        snapshot.filter = FilterMode::ByEmployee("e1".to_string());
        let html = render_transactions(&snapshot, &currency());
        assert!(html.contains("hx-post='/filter'"));
        assert!(html.contains("e1"));
    }

    #[test]
    fn test_row_shows_amount_date_and_approval() {
        let html = render_transaction_row(&row("t1", true), &currency(), None);
        assert!(html.contains("$1,234.56"));
        assert!(html.contains("Mar 7, 2022"));
        assert!(html.contains("checked"));
        assert!(html.contains("/transactions/t1/approval"));

        let html = render_transaction_row(&row("t1", false), &currency(), Some("Approval failed"));
        assert!(!html.contains("checked"));
        assert!(html.contains("Approval failed"));
    }

    #[test]
    fn test_empty_list_placeholder() {
        let mut snapshot = snapshot();
        snapshot.rows.clear();
        snapshot.transactions_loading = true;
        assert!(render_transactions(&snapshot, &currency()).contains("Loading transactions..."));

        snapshot.transactions_loading = false;
        assert!(render_transactions(&snapshot, &currency()).contains("No transactions"));
    }
}
