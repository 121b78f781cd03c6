//! Scripted transport for exercising the view in tests

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use spendview_ledger::{
    Employee, LedgerTransport, PageCursor, Transaction, TransactionPage, TransportError,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub fn employee(id: &str) -> Employee {
    Employee::new(id, format!("First-{}", id), format!("Last-{}", id))
}

pub fn transaction(id: &str, employee_id: &str, approved: bool) -> Transaction {
    Transaction {
        id: id.to_string(),
        merchant: format!("Merchant {}", id),
        amount: Decimal::new(1250, 2),
        date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
        employee: employee(employee_id),
        approved,
    }
}

pub fn page(ids: &[&str], next: Option<&str>) -> TransactionPage {
    TransactionPage {
        data: ids.iter().map(|id| transaction(id, "e1", false)).collect(),
        next_cursor: next.map(PageCursor::new),
    }
}

/// Holds one call until released
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

#[derive(Default)]
pub struct ScriptedTransport {
    employees: Mutex<Vec<Employee>>,
    pages: Mutex<HashMap<Option<String>, TransactionPage>>,
    by_employee: Mutex<HashMap<String, Vec<Transaction>>>,
    fail_employees: AtomicBool,
    fail_pages: AtomicBool,
    fail_by_employee: AtomicBool,
    fail_approvals: AtomicBool,
    directory_gate: Mutex<Option<Arc<Gate>>>,
    employee_gate: Mutex<Option<Arc<Gate>>>,
    page_gate: Mutex<Option<Arc<Gate>>>,
    approval_gate: Mutex<Option<Arc<Gate>>>,
    employee_calls: Mutex<usize>,
    page_calls: Mutex<Vec<Option<String>>>,
    approval_writes: Mutex<Vec<(String, bool)>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_employees(self, employees: Vec<Employee>) -> Self {
        *self.employees.lock().unwrap() = employees;
        self
    }

    pub fn with_page(self, cursor: Option<&str>, page: TransactionPage) -> Self {
        self.set_page(cursor, page);
        self
    }

    pub fn with_employee_transactions(self, employee_id: &str, list: Vec<Transaction>) -> Self {
        self.by_employee.lock().unwrap().insert(employee_id.to_string(), list);
        self
    }

    pub fn set_page(&self, cursor: Option<&str>, page: TransactionPage) {
        self.pages.lock().unwrap().insert(cursor.map(str::to_string), page);
    }

    pub fn fail_employees(&self, fail: bool) {
        self.fail_employees.store(fail, Ordering::SeqCst);
    }

    pub fn fail_pages(&self, fail: bool) {
        self.fail_pages.store(fail, Ordering::SeqCst);
    }

    pub fn fail_by_employee(&self, fail: bool) {
        self.fail_by_employee.store(fail, Ordering::SeqCst);
    }

    pub fn fail_approvals(&self, fail: bool) {
        self.fail_approvals.store(fail, Ordering::SeqCst);
    }

    /// Hold the next employee directory fetch until the gate is released
    pub fn hold_next_directory_fetch(&self) -> Arc<Gate> {
        Self::arm(&self.directory_gate)
    }

    /// Hold the next per-employee fetch until the gate is released
    pub fn hold_next_employee_fetch(&self) -> Arc<Gate> {
        Self::arm(&self.employee_gate)
    }

    /// Hold the next page fetch until the gate is released
    pub fn hold_next_page_fetch(&self) -> Arc<Gate> {
        Self::arm(&self.page_gate)
    }

    /// Hold the next approval write until the gate is released; the
    /// failure switch is read after the release
    pub fn hold_next_approval_write(&self) -> Arc<Gate> {
        Self::arm(&self.approval_gate)
    }

    pub fn employee_calls(&self) -> usize {
        *self.employee_calls.lock().unwrap()
    }

    pub fn page_calls(&self) -> Vec<Option<String>> {
        self.page_calls.lock().unwrap().clone()
    }

    pub fn approval_writes(&self) -> Vec<(String, bool)> {
        self.approval_writes.lock().unwrap().clone()
    }

    fn arm(slot: &Mutex<Option<Arc<Gate>>>) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        *slot.lock().unwrap() = Some(gate.clone());
        gate
    }

    async fn pass(gate: &Mutex<Option<Arc<Gate>>>) {
        let gate = gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }
    }
}

#[async_trait]
impl LedgerTransport for ScriptedTransport {
    async fn fetch_employees(&self) -> Result<Vec<Employee>, TransportError> {
        *self.employee_calls.lock().unwrap() += 1;
        Self::pass(&self.directory_gate).await;
        if self.fail_employees.load(Ordering::SeqCst) {
            return Err(TransportError::request("employees unavailable"));
        }
        Ok(self.employees.lock().unwrap().clone())
    }

    async fn fetch_transactions_page(
        &self,
        cursor: Option<&PageCursor>,
    ) -> Result<TransactionPage, TransportError> {
        let key = cursor.map(|c| c.as_str().to_string());
        self.page_calls.lock().unwrap().push(key.clone());
        Self::pass(&self.page_gate).await;
        if self.fail_pages.load(Ordering::SeqCst) {
            return Err(TransportError::request("pages unavailable"));
        }
        self.pages
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or_else(|| TransportError::InvalidCursor {
                cursor: key.unwrap_or_default(),
            })
    }

    async fn fetch_transactions_by_employee(
        &self,
        employee_id: &str,
    ) -> Result<Vec<Transaction>, TransportError> {
        Self::pass(&self.employee_gate).await;
        if self.fail_by_employee.load(Ordering::SeqCst) {
            return Err(TransportError::request("employee feed unavailable"));
        }
        Ok(self
            .by_employee
            .lock()
            .unwrap()
            .get(employee_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn set_transaction_approval(
        &self,
        transaction_id: &str,
        approved: bool,
    ) -> Result<(), TransportError> {
        Self::pass(&self.approval_gate).await;
        if self.fail_approvals.load(Ordering::SeqCst) {
            return Err(TransportError::request("write rejected"));
        }
        self.approval_writes
            .lock()
            .unwrap()
            .push((transaction_id.to_string(), approved));
        Ok(())
    }
}
