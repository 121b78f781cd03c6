//! Ledger records and the transport seam the view talks through
//!
//! The view never reaches the network directly: every read and write
//! goes through [`LedgerTransport`]. [`InMemoryLedger`] serves a JSON
//! dataset and is what the binary runs against.

use async_trait::async_trait;
use std::sync::Arc;

pub mod dataset;
pub mod error;
pub mod memory;
pub mod types;

pub use dataset::Dataset;
pub use error::TransportError;
pub use memory::InMemoryLedger;
pub use types::{Employee, PageCursor, Transaction, TransactionPage};

/// Transport reference type
pub type TransportRef = Arc<dyn LedgerTransport>;

/// Remote ledger operations
#[async_trait]
pub trait LedgerTransport: Send + Sync {
    /// Fetch the employee directory
    async fn fetch_employees(&self) -> Result<Vec<Employee>, TransportError>;

    /// Fetch one page of all transactions; `None` requests the first page
    async fn fetch_transactions_page(
        &self,
        cursor: Option<&PageCursor>,
    ) -> Result<TransactionPage, TransportError>;

    /// Fetch every transaction of one employee
    async fn fetch_transactions_by_employee(
        &self,
        employee_id: &str,
    ) -> Result<Vec<Transaction>, TransportError>;

    /// Persist the approval flag of a transaction
    async fn set_transaction_approval(
        &self,
        transaction_id: &str,
        approved: bool,
    ) -> Result<(), TransportError>;
}
