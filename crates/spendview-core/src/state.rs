//! View state and the transitions that change it
//!
//! `ViewState` is replaced as a whole on every transition: each method
//! consumes the current value and returns the next one. The visible
//! list is never stored; [`ViewState::visible`] derives it from the
//! filter and the source that filter selects.

use serde::{Deserialize, Serialize};
use spendview_ledger::{Employee, PageCursor, Transaction, TransactionPage};
use std::collections::HashMap;

/// Which feed governs the visible list
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", content = "employee_id", rename_all = "snake_case")]
pub enum FilterMode {
    #[default]
    All,
    ByEmployee(String),
}

impl FilterMode {
    pub fn is_filtered(&self) -> bool {
        matches!(self, FilterMode::ByEmployee(_))
    }

    pub fn employee_id(&self) -> Option<&str> {
        match self {
            FilterMode::All => None,
            FilterMode::ByEmployee(id) => Some(id),
        }
    }
}

impl std::fmt::Display for FilterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilterMode::All => write!(f, "all"),
            FilterMode::ByEmployee(id) => write!(f, "employee {}", id),
        }
    }
}

/// Loading state of one data source
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SourceStatus {
    #[default]
    Idle,
    /// Owned by the most recent request; older requests cannot clear it
    Loading { request: u64 },
    Failed { message: String },
}

impl SourceStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, SourceStatus::Loading { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SourceStatus::Failed { message } => Some(message),
            _ => None,
        }
    }

    fn owned_by(&self, ticket: Ticket) -> bool {
        matches!(self, SourceStatus::Loading { request } if *request == ticket.request)
    }
}

/// Identifies a fetch: its request number and the filter epoch it was issued in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub request: u64,
    pub epoch: u64,
}

/// Tickets handed out when a full load starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadAllTickets {
    /// `None` when the directory is already loaded
    pub employees: Option<Ticket>,
    pub transactions: Ticket,
}

/// Result of committing a fetch into the state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Commit {
    Applied,
    /// The filter moved on while the fetch was in flight
    Stale { requested: String, current: String },
}

#[derive(Debug, Clone, PartialEq)]
struct EmployeeResult {
    employee_id: String,
    transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Default)]
pub struct ViewState {
    filter: FilterMode,
    /// Advanced on every filter change; results from older epochs are stale
    epoch: u64,
    last_request: u64,
    employees: Option<Vec<Employee>>,
    employees_status: SourceStatus,
    transactions_status: SourceStatus,
    /// Pages fetched since the last invalidation, deduplicated by id
    accumulation: Vec<Transaction>,
    employee_result: Option<EmployeeResult>,
    next_cursor: Option<PageCursor>,
    discarded: u64,
}

impl ViewState {
    // ==================== Queries ====================

    pub fn filter(&self) -> &FilterMode {
        &self.filter
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn employees(&self) -> Option<&[Employee]> {
        self.employees.as_deref()
    }

    pub fn employees_status(&self) -> &SourceStatus {
        &self.employees_status
    }

    pub fn transactions_status(&self) -> &SourceStatus {
        &self.transactions_status
    }

    pub fn next_cursor(&self) -> Option<&PageCursor> {
        self.next_cursor.as_ref()
    }

    /// Number of fetch results dropped because the filter had moved on
    pub fn discarded_results(&self) -> u64 {
        self.discarded
    }

    /// "Load more" is only offered on the unfiltered list
    pub fn has_more(&self) -> bool {
        self.filter == FilterMode::All && self.next_cursor.is_some()
    }

    /// The list to display under the current filter
    pub fn visible(&self) -> Vec<Transaction> {
        match &self.filter {
            FilterMode::All => self.accumulation.clone(),
            FilterMode::ByEmployee(id) => self
                .employee_result
                .as_ref()
                .filter(|result| &result.employee_id == id)
                .map(|result| result.transactions.clone())
                .unwrap_or_default(),
        }
    }

    // ==================== Transitions ====================

    /// Switch to the unfiltered list; a no-op when already unfiltered
    pub fn select_all(mut self) -> Self {
        if self.filter != FilterMode::All {
            self.filter = FilterMode::All;
            self.epoch += 1;
        }
        self
    }

    /// Switch to the unfiltered list and mark both sources loading
    pub fn begin_load_all(self) -> (Self, LoadAllTickets) {
        let mut state = self.select_all();
        let employees = if state.employees.is_none() {
            let ticket = state.issue();
            state.employees_status = SourceStatus::Loading { request: ticket.request };
            Some(ticket)
        } else {
            None
        };
        let transactions = state.issue();
        state.transactions_status = SourceStatus::Loading { request: transactions.request };
        (state, LoadAllTickets { employees, transactions })
    }

    /// Filter by one employee. The accumulation and cursor are dropped
    /// so returning to the unfiltered list starts from the first page.
    pub fn begin_employee_filter(mut self, employee_id: &str) -> (Self, Ticket) {
        self.filter = FilterMode::ByEmployee(employee_id.to_string());
        self.epoch += 1;
        self.accumulation.clear();
        self.next_cursor = None;
        let ticket = self.issue();
        self.transactions_status = SourceStatus::Loading { request: ticket.request };
        (self, ticket)
    }

    pub fn employees_loaded(mut self, ticket: Ticket, employees: Vec<Employee>) -> Self {
        self.employees = Some(employees);
        if self.employees_status.owned_by(ticket) {
            self.employees_status = SourceStatus::Idle;
        }
        self
    }

    pub fn employees_failed(mut self, ticket: Ticket, message: String) -> Self {
        if self.employees_status.owned_by(ticket) {
            self.employees_status = SourceStatus::Failed { message };
        }
        self
    }

    pub fn page_loaded(mut self, ticket: Ticket, page: TransactionPage) -> (Self, Commit) {
        if let Some(stale) = self.staleness(ticket, &FilterMode::All) {
            return (self.drop_result(ticket), stale);
        }
        merge_page(&mut self.accumulation, page.data);
        self.next_cursor = page.next_cursor;
        self.settle_transactions(ticket, SourceStatus::Idle);
        (self, Commit::Applied)
    }

    /// Whether a result for `ticket` under `requested` would still be applied
    pub fn is_current(&self, ticket: Ticket, requested: &FilterMode) -> bool {
        self.staleness(ticket, requested).is_none()
    }

    /// Drop a page fetch that was overtaken by a filter change before
    /// it reached the feed
    pub fn page_superseded(self, ticket: Ticket) -> (Self, Commit) {
        let stale = self.staleness(ticket, &FilterMode::All).unwrap_or_else(|| Commit::Stale {
            requested: FilterMode::All.to_string(),
            current: self.filter.to_string(),
        });
        (self.drop_result(ticket), stale)
    }

    pub fn page_failed(mut self, ticket: Ticket, message: String) -> (Self, Commit) {
        if let Some(stale) = self.staleness(ticket, &FilterMode::All) {
            return (self.drop_result(ticket), stale);
        }
        self.settle_transactions(ticket, SourceStatus::Failed { message });
        (self, Commit::Applied)
    }

    pub fn employee_feed_loaded(
        mut self,
        ticket: Ticket,
        employee_id: &str,
        transactions: Vec<Transaction>,
    ) -> (Self, Commit) {
        let requested = FilterMode::ByEmployee(employee_id.to_string());
        if let Some(stale) = self.staleness(ticket, &requested) {
            return (self.drop_result(ticket), stale);
        }
        self.employee_result = Some(EmployeeResult {
            employee_id: employee_id.to_string(),
            transactions,
        });
        self.settle_transactions(ticket, SourceStatus::Idle);
        (self, Commit::Applied)
    }

    pub fn employee_feed_failed(mut self, ticket: Ticket, employee_id: &str, message: String) -> (Self, Commit) {
        let requested = FilterMode::ByEmployee(employee_id.to_string());
        if let Some(stale) = self.staleness(ticket, &requested) {
            return (self.drop_result(ticket), stale);
        }
        self.settle_transactions(ticket, SourceStatus::Failed { message });
        (self, Commit::Applied)
    }

    // ==================== Helpers ====================

    fn issue(&mut self) -> Ticket {
        self.last_request += 1;
        Ticket {
            request: self.last_request,
            epoch: self.epoch,
        }
    }

    fn staleness(&self, ticket: Ticket, requested: &FilterMode) -> Option<Commit> {
        if ticket.epoch == self.epoch && &self.filter == requested {
            None
        } else {
            Some(Commit::Stale {
                requested: requested.to_string(),
                current: self.filter.to_string(),
            })
        }
    }

    fn drop_result(mut self, ticket: Ticket) -> Self {
        self.discarded += 1;
        self.settle_transactions(ticket, SourceStatus::Idle);
        self
    }

    fn settle_transactions(&mut self, ticket: Ticket, status: SourceStatus) {
        if self.transactions_status.owned_by(ticket) {
            self.transactions_status = status;
        }
    }
}

/// Append a page, replacing in place any transaction already present
fn merge_page(accumulation: &mut Vec<Transaction>, page: Vec<Transaction>) {
    let mut index: HashMap<String, usize> = accumulation
        .iter()
        .enumerate()
        .map(|(i, t)| (t.id.clone(), i))
        .collect();

    for transaction in page {
        match index.get(&transaction.id) {
            Some(&i) => accumulation[i] = transaction,
            None => {
                index.insert(transaction.id.clone(), accumulation.len());
                accumulation.push(transaction);
            }
        }
    }
}
