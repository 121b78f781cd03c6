//! Ledger record types shared by the transport and the view

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Employee record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
}

impl Employee {
    /// Identifier of the "All Employees" pseudo-employee
    pub const ALL_EMPLOYEES_ID: &'static str = "";

    pub fn new(id: impl Into<String>, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    /// The sentinel meaning "no employee filter"
    pub fn all_employees() -> Self {
        Self::new(Self::ALL_EMPLOYEES_ID, "All", "Employees")
    }

    pub fn is_all_employees(&self) -> bool {
        self.id == Self::ALL_EMPLOYEES_ID
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Transaction as delivered by the ledger
///
/// Records are never mutated after a fetch; local approval changes
/// are layered on top by the view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub merchant: String,
    /// Signed amount, negative for refunds
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub date: NaiveDate,
    pub employee: Employee,
    /// Approval flag as reported by the server
    pub approved: bool,
}

impl Transaction {
    pub fn belongs_to(&self, employee_id: &str) -> bool {
        self.employee.id == employee_id
    }
}

/// Opaque position in the unfiltered feed
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageCursor(String);

impl PageCursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PageCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of the unfiltered feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPage {
    pub data: Vec<Transaction>,
    /// `None` once the last page has been delivered
    pub next_cursor: Option<PageCursor>,
}

impl TransactionPage {
    pub fn has_next(&self) -> bool {
        self.next_cursor.is_some()
    }
}
