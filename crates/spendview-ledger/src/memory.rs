//! In-memory ledger backend

use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::dataset::Dataset;
use crate::error::TransportError;
use crate::types::{Employee, PageCursor, Transaction, TransactionPage};
use crate::LedgerTransport;

pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Ledger served from a dataset held in memory
///
/// Cursors are page indices. Approval writes update the stored records,
/// so later fetches report the new server flag.
pub struct InMemoryLedger {
    data: RwLock<Dataset>,
    page_size: usize,
    latency: Duration,
}

impl InMemoryLedger {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            data: RwLock::new(dataset),
            page_size: DEFAULT_PAGE_SIZE,
            latency: Duration::ZERO,
        }
    }

    /// Set the page size; values below one are clamped to one
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Delay every call by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn page_index(cursor: Option<&PageCursor>) -> Result<usize, TransportError> {
        match cursor {
            None => Ok(0),
            Some(cursor) => cursor.as_str().parse().map_err(|_| TransportError::InvalidCursor {
                cursor: cursor.to_string(),
            }),
        }
    }
}

#[async_trait]
impl LedgerTransport for InMemoryLedger {
    async fn fetch_employees(&self) -> Result<Vec<Employee>, TransportError> {
        self.simulate_latency().await;
        Ok(self.data.read().await.employees.clone())
    }

    async fn fetch_transactions_page(
        &self,
        cursor: Option<&PageCursor>,
    ) -> Result<TransactionPage, TransportError> {
        self.simulate_latency().await;
        let page = Self::page_index(cursor)?;

        let data = self.data.read().await;
        let total = data.transactions.len();
        let start = page * self.page_size;
        if start > total {
            return Err(TransportError::InvalidPage { page });
        }
        let end = (start + self.page_size).min(total);
        let next_cursor = if end < total {
            Some(PageCursor::new((page + 1).to_string()))
        } else {
            None
        };

        log::debug!(
            target: "spendview::ledger",
            "Serving page {} ({}..{} of {})",
            page, start, end, total
        );

        Ok(TransactionPage {
            data: data.transactions[start..end].to_vec(),
            next_cursor,
        })
    }

    async fn fetch_transactions_by_employee(
        &self,
        employee_id: &str,
    ) -> Result<Vec<Transaction>, TransportError> {
        self.simulate_latency().await;
        if employee_id.is_empty() {
            return Err(TransportError::EmptyEmployeeId);
        }

        let data = self.data.read().await;
        Ok(data
            .transactions
            .iter()
            .filter(|t| t.belongs_to(employee_id))
            .cloned()
            .collect())
    }

    async fn set_transaction_approval(
        &self,
        transaction_id: &str,
        approved: bool,
    ) -> Result<(), TransportError> {
        self.simulate_latency().await;
        let mut data = self.data.write().await;
        let transaction = data
            .transactions
            .iter_mut()
            .find(|t| t.id == transaction_id)
            .ok_or_else(|| TransportError::TransactionNotFound {
                id: transaction_id.to_string(),
            })?;
        transaction.approved = approved;
        log::debug!(
            target: "spendview::ledger",
            "Transaction {} approval set to {}",
            transaction_id, approved
        );
        Ok(())
    }
}
