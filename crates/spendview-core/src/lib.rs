//! Transaction view synchronization
//!
//! [`TransactionView`] reconciles the paginated feed, the per-employee
//! feed and local approval overrides into one displayed list. Callers
//! drive it with user actions and read it back through [`ViewSnapshot`].

pub mod accessors;
pub mod approvals;
pub mod error;
pub mod state;

#[cfg(test)]
mod testing;

use serde::Serialize;
use spendview_ledger::{Employee, Transaction, TransportRef};
use tokio::sync::RwLock;

pub use accessors::{EmployeeDirectory, EmployeeFeed, PaginatedFeed};
pub use approvals::{ApprovalOverrides, ApprovalStore};
pub use error::{
    DefaultErrorLogger, ErrorCode, ErrorContext, ErrorDetails, ErrorLogger, ErrorSeverity,
    FeedSource, ViewError, ViewResult,
};
pub use state::{Commit, FilterMode, SourceStatus, ViewState};

/// What happened to the result of a load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadOutcome {
    /// The result is now part of the view
    Applied,
    /// The filter changed while loading; the result was dropped
    Discarded,
}

/// A visible transaction with its display approval resolved
#[derive(Debug, Clone, Serialize)]
pub struct TransactionRow {
    pub transaction: Transaction,
    pub approved: bool,
    /// An approval write for this row is in flight
    pub pending: bool,
}

/// Everything the presentation layer renders
#[derive(Debug, Clone, Serialize)]
pub struct ViewSnapshot {
    pub filter: FilterMode,
    pub employees: Vec<Employee>,
    pub rows: Vec<TransactionRow>,
    pub employees_loading: bool,
    pub transactions_loading: bool,
    pub has_more: bool,
    pub filter_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employees_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transactions_error: Option<String>,
    pub discarded_results: u64,
}

impl ViewSnapshot {
    /// Filter options with the "All Employees" sentinel first
    pub fn filter_options(&self) -> Vec<Employee> {
        std::iter::once(Employee::all_employees())
            .chain(self.employees.iter().cloned())
            .collect()
    }

    pub fn row(&self, transaction_id: &str) -> Option<&TransactionRow> {
        self.rows.iter().find(|r| r.transaction.id == transaction_id)
    }
}

/// The view-state synchronizer
pub struct TransactionView {
    directory: EmployeeDirectory,
    pages: PaginatedFeed,
    by_employee: EmployeeFeed,
    approvals: ApprovalStore,
    state: RwLock<ViewState>,
    logger: Box<dyn ErrorLogger>,
}

impl TransactionView {
    pub fn new(transport: TransportRef) -> Self {
        Self {
            directory: EmployeeDirectory::new(transport.clone()),
            pages: PaginatedFeed::new(transport.clone()),
            by_employee: EmployeeFeed::new(transport.clone()),
            approvals: ApprovalStore::new(transport),
            state: RwLock::new(ViewState::default()),
            logger: Box::new(DefaultErrorLogger),
        }
    }

    pub fn with_logger(mut self, logger: impl ErrorLogger + 'static) -> Self {
        self.logger = Box::new(logger);
        self
    }

    /// Replace the state with the next value produced by `step`
    async fn transition<R>(&self, step: impl FnOnce(ViewState) -> (ViewState, R)) -> R {
        let mut guard = self.state.write().await;
        let current = std::mem::take(&mut *guard);
        let (next, output) = step(current);
        *guard = next;
        output
    }

    /// Show the unfiltered list and append its next page.
    ///
    /// The employee directory is fetched first when not yet loaded.
    /// A directory failure is recorded on the view and does not stop
    /// the page fetch. No page is requested when the filter changed
    /// while the directory was loading.
    pub async fn load_all_transactions(&self) -> ViewResult<LoadOutcome> {
        let operation = "load_all_transactions";
        let tickets = self.transition(ViewState::begin_load_all).await;

        if let Some(ticket) = tickets.employees {
            match self.directory.fetch_all().await {
                Ok(employees) => {
                    log::debug!(target: "spendview::sync", "Loaded {} employees", employees.len());
                    self.transition(|s| (s.employees_loaded(ticket, employees), ())).await;
                }
                Err(e) => {
                    let error = ViewError::fetch(FeedSource::Employees, &e);
                    self.logger.log_error(&error, &ErrorContext::new(operation));
                    self.transition(|s| (s.employees_failed(ticket, error.to_string()), ())).await;
                }
            }
        }

        let ticket = tickets.transactions;
        if !self.state.read().await.is_current(ticket, &FilterMode::All) {
            let commit = self.transition(|s| s.page_superseded(ticket)).await;
            return Ok(self.settle(commit, FeedSource::Paginated, operation));
        }

        match self.pages.fetch_next_page(ticket.epoch).await {
            Ok(None) => {
                let commit = self.transition(|s| s.page_superseded(ticket)).await;
                Ok(self.settle(commit, FeedSource::Paginated, operation))
            }
            Ok(Some(page)) => {
                let count = page.data.len();
                let commit = self.transition(|s| s.page_loaded(ticket, page)).await;
                if commit == Commit::Applied {
                    log::debug!(target: "spendview::sync", "Appended page of {} transactions", count);
                }
                Ok(self.settle(commit, FeedSource::Paginated, operation))
            }
            Err(e) => {
                let error = ViewError::fetch(FeedSource::Paginated, &e);
                let commit = self.transition(|s| s.page_failed(ticket, error.to_string())).await;
                self.fail(commit, error, operation)
            }
        }
    }

    /// Show exactly the transactions of one employee
    pub async fn load_transactions_by_employee(&self, employee_id: &str) -> ViewResult<LoadOutcome> {
        let operation = "load_transactions_by_employee";
        let ticket = self.transition(|s| s.begin_employee_filter(employee_id)).await;
        log::info!(target: "spendview::sync", "Filtering by employee {}", employee_id);

        self.pages.invalidate(ticket.epoch).await;

        match self.by_employee.fetch_for_employee(employee_id).await {
            Ok(transactions) => {
                let commit = self
                    .transition(|s| s.employee_feed_loaded(ticket, employee_id, transactions))
                    .await;
                Ok(self.settle(commit, FeedSource::ByEmployee, operation))
            }
            Err(e) => {
                let error = ViewError::fetch(FeedSource::ByEmployee, &e);
                let commit = self
                    .transition(|s| s.employee_feed_failed(ticket, employee_id, error.to_string()))
                    .await;
                self.fail(commit, error, operation)
            }
        }
    }

    /// Dispatch a filter selection. No selection and the "All Employees"
    /// sentinel both mean the unfiltered list.
    pub async fn on_filter_selection_change(&self, selection: Option<&Employee>) -> ViewResult<LoadOutcome> {
        match selection {
            Some(employee) if !employee.is_all_employees() => {
                self.load_transactions_by_employee(&employee.id).await
            }
            _ => {
                self.transition(|s| (s.select_all(), ())).await;
                log::info!(target: "spendview::sync", "Filter cleared");
                self.load_all_transactions().await
            }
        }
    }

    /// Toggle the approval of one transaction; visible without a refetch
    pub async fn set_transaction_approval(&self, transaction_id: &str, approved: bool) -> ViewResult<()> {
        self.approvals
            .set_approval(transaction_id, approved)
            .await
            .map_err(|error| {
                let context = ErrorContext::new("set_transaction_approval")
                    .with_data("approved", serde_json::json!(approved));
                self.logger.log_error(&error, &context);
                error
            })
    }

    /// Display approval of a transaction
    pub async fn resolve_approval(&self, transaction: &Transaction) -> bool {
        self.approvals.resolve(transaction).await
    }

    pub async fn filter(&self) -> FilterMode {
        self.state.read().await.filter().clone()
    }

    pub async fn visible_transactions(&self) -> Vec<Transaction> {
        self.state.read().await.visible()
    }

    /// Look up an employee in the loaded directory
    pub async fn employee(&self, employee_id: &str) -> Option<Employee> {
        self.state
            .read()
            .await
            .employees()
            .and_then(|list| list.iter().find(|e| e.id == employee_id).cloned())
    }

    /// Current view, with approvals resolved now
    pub async fn snapshot(&self) -> ViewSnapshot {
        let state = self.state.read().await.clone();
        let overrides = self.approvals.overrides().await;

        let rows = state
            .visible()
            .into_iter()
            .map(|transaction| TransactionRow {
                approved: overrides.resolve(&transaction),
                pending: overrides.is_pending(&transaction.id),
                transaction,
            })
            .collect();

        ViewSnapshot {
            filter: state.filter().clone(),
            employees: state.employees().map(|e| e.to_vec()).unwrap_or_default(),
            rows,
            employees_loading: state.employees_status().is_loading(),
            transactions_loading: state.transactions_status().is_loading(),
            has_more: state.has_more(),
            filter_active: state.filter().is_filtered(),
            employees_error: state.employees_status().error().map(str::to_string),
            transactions_error: state.transactions_status().error().map(str::to_string),
            discarded_results: state.discarded_results(),
        }
    }

    fn settle(&self, commit: Commit, source_feed: FeedSource, operation: &str) -> LoadOutcome {
        match commit {
            Commit::Applied => LoadOutcome::Applied,
            Commit::Stale { requested, current } => {
                let error = ViewError::InconsistentFilterState { source_feed, requested, current };
                self.logger.log_error(&error, &ErrorContext::new(operation));
                LoadOutcome::Discarded
            }
        }
    }

    fn fail(&self, commit: Commit, error: ViewError, operation: &str) -> ViewResult<LoadOutcome> {
        match commit {
            Commit::Applied => {
                self.logger.log_error(&error, &ErrorContext::new(operation));
                Err(error)
            }
            Commit::Stale { .. } => {
                self.logger.log_debug(&format!("Ignoring stale failure: {}", error), &ErrorContext::new(operation));
                Ok(LoadOutcome::Discarded)
            }
        }
    }
}
