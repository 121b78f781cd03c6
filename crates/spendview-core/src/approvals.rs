//! Local approval overrides layered over server-reported flags

use spendview_ledger::{Transaction, TransportRef};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::{ViewError, ViewResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Override {
    approved: bool,
    /// Bumped on every write so a late rollback cannot clobber a newer toggle
    version: u64,
    pending: bool,
}

/// Overrides keyed by transaction id
#[derive(Debug, Clone, Default)]
pub struct ApprovalOverrides {
    entries: HashMap<String, Override>,
    /// Latest version the transport accepted, per transaction
    confirmed: HashMap<String, u64>,
    next_version: u64,
}

impl ApprovalOverrides {
    /// Display approval: the override when present, the server flag otherwise
    pub fn resolve(&self, transaction: &Transaction) -> bool {
        self.get(&transaction.id).unwrap_or(transaction.approved)
    }

    pub fn get(&self, transaction_id: &str) -> Option<bool> {
        self.entries.get(transaction_id).map(|o| o.approved)
    }

    /// Whether a write for this transaction is still in flight
    pub fn is_pending(&self, transaction_id: &str) -> bool {
        self.entries.get(transaction_id).map_or(false, |o| o.pending)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn begin(&mut self, transaction_id: &str, approved: bool) -> (u64, Option<Override>) {
        self.next_version += 1;
        let version = self.next_version;
        let prior = self.entries.insert(
            transaction_id.to_string(),
            Override { approved, version, pending: true },
        );
        (version, prior)
    }

    fn confirm(&mut self, transaction_id: &str, version: u64) {
        let confirmed = self.confirmed.entry(transaction_id.to_string()).or_default();
        *confirmed = (*confirmed).max(version);
        if let Some(entry) = self.entries.get_mut(transaction_id) {
            if entry.version == version {
                entry.pending = false;
            }
        }
    }

    fn is_confirmed(&self, transaction_id: &str, version: u64) -> bool {
        self.confirmed.get(transaction_id).map_or(false, |&confirmed| confirmed >= version)
    }

    /// Restore the prior override; returns false when a newer write took over.
    /// A prior whose own write completed in the meantime comes back settled.
    fn rollback(&mut self, transaction_id: &str, version: u64, prior: Option<Override>) -> bool {
        match self.entries.get(transaction_id) {
            Some(current) if current.version == version => {}
            _ => return false,
        }
        match prior {
            Some(mut prior) => {
                if self.is_confirmed(transaction_id, prior.version) {
                    prior.pending = false;
                }
                self.entries.insert(transaction_id.to_string(), prior);
            }
            None => {
                self.entries.remove(transaction_id);
            }
        }
        true
    }
}

/// Approval store backed by the transport's approval write
pub struct ApprovalStore {
    writer: TransportRef,
    overrides: RwLock<ApprovalOverrides>,
}

impl ApprovalStore {
    pub fn new(writer: TransportRef) -> Self {
        Self {
            writer,
            overrides: RwLock::new(ApprovalOverrides::default()),
        }
    }

    /// Apply the override optimistically, then persist it.
    ///
    /// On a failed write the override is rolled back to what it was
    /// before this call, unless a later toggle already replaced it.
    pub async fn set_approval(&self, transaction_id: &str, approved: bool) -> ViewResult<()> {
        let (version, prior) = self.overrides.write().await.begin(transaction_id, approved);

        match self.writer.set_transaction_approval(transaction_id, approved).await {
            Ok(()) => {
                self.overrides.write().await.confirm(transaction_id, version);
                log::debug!(
                    target: "spendview::approvals",
                    "Approval of {} set to {}",
                    transaction_id, approved
                );
                Ok(())
            }
            Err(e) => {
                let restored = self.overrides.write().await.rollback(transaction_id, version, prior);
                if !restored {
                    log::debug!(
                        target: "spendview::approvals",
                        "Skipping rollback of {}: superseded by a newer toggle",
                        transaction_id
                    );
                }
                Err(ViewError::write(transaction_id, &e))
            }
        }
    }

    /// Resolve against the current overrides
    pub async fn resolve(&self, transaction: &Transaction) -> bool {
        self.overrides.read().await.resolve(transaction)
    }

    /// Copy of the current overrides, for resolving a whole list at once
    pub async fn overrides(&self) -> ApprovalOverrides {
        self.overrides.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{transaction, ScriptedTransport};
    use std::sync::Arc;

    #[test]
    fn test_resolve_falls_back_to_server_flag() {
        let overrides = ApprovalOverrides::default();
        let txn = transaction("t1", "e1", true);
        assert!(overrides.resolve(&txn));
        assert!(overrides.is_empty());
    }

    #[test]
    fn test_stale_rollback_is_ignored() {
        let mut overrides = ApprovalOverrides::default();
        let (first, prior) = overrides.begin("t1", true);
        let (second, _) = overrides.begin("t1", false);
        assert!(second > first);

        assert!(!overrides.rollback("t1", first, prior));
        assert_eq!(overrides.get("t1"), Some(false));
        assert!(overrides.is_pending("t1"));

        overrides.confirm("t1", second);
        assert!(!overrides.is_pending("t1"));
    }

    #[test]
    fn test_rollback_to_confirmed_prior_clears_pending() {
        let mut overrides = ApprovalOverrides::default();
        let (first, _) = overrides.begin("t1", true);
        let (second, prior) = overrides.begin("t1", false);

        overrides.confirm("t1", first);
        assert!(overrides.is_pending("t1"));

        assert!(overrides.rollback("t1", second, prior));
        assert_eq!(overrides.get("t1"), Some(true));
        assert!(!overrides.is_pending("t1"));
    }

    #[test]
    fn test_rollback_to_unconfirmed_prior_stays_pending() {
        let mut overrides = ApprovalOverrides::default();
        let (first, _) = overrides.begin("t1", true);
        let (second, prior) = overrides.begin("t1", false);

        assert!(overrides.rollback("t1", second, prior));
        assert!(overrides.is_pending("t1"));

        overrides.confirm("t1", first);
        assert_eq!(overrides.get("t1"), Some(true));
        assert!(!overrides.is_pending("t1"));
    }

    #[tokio::test]
    async fn test_override_wins_over_server_flag() {
        let transport = Arc::new(ScriptedTransport::new());
        let store = ApprovalStore::new(transport.clone());
        let txn = transaction("t1", "e1", false);

        store.set_approval("t1", true).await.unwrap();
        assert!(store.resolve(&txn).await);
        assert_eq!(transport.approval_writes(), vec![("t1".to_string(), true)]);

        let overrides = store.overrides().await;
        assert!(!overrides.is_pending("t1"));
        assert_eq!(overrides.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_write_rolls_back_to_server_flag() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.fail_approvals(true);
        let store = ApprovalStore::new(transport.clone());
        let txn = transaction("t1", "e1", false);

        let error = store.set_approval("t1", true).await.unwrap_err();
        assert!(matches!(error, ViewError::WriteFailure { .. }));
        assert!(!store.resolve(&txn).await);
        assert!(store.overrides().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_write_restores_previous_override() {
        let transport = Arc::new(ScriptedTransport::new());
        let store = ApprovalStore::new(transport.clone());
        let txn = transaction("t1", "e1", false);

        store.set_approval("t1", true).await.unwrap();
        transport.fail_approvals(true);
        assert!(store.set_approval("t1", false).await.is_err());

        assert!(store.resolve(&txn).await);
        assert!(!store.overrides().await.is_pending("t1"));
    }

    #[tokio::test]
    async fn test_overlapping_writes_settle_when_newer_one_fails() {
        let transport = Arc::new(ScriptedTransport::new());
        let store = Arc::new(ApprovalStore::new(transport.clone()));
        let txn = transaction("t1", "e1", false);

        let first_gate = transport.hold_next_approval_write();
        let first = {
            let store = store.clone();
            tokio::spawn(async move { store.set_approval("t1", true).await })
        };
        first_gate.entered.notified().await;

        let second_gate = transport.hold_next_approval_write();
        let second = {
            let store = store.clone();
            tokio::spawn(async move { store.set_approval("t1", false).await })
        };
        second_gate.entered.notified().await;
        assert!(!store.resolve(&txn).await);

        first_gate.release.notify_one();
        first.await.unwrap().unwrap();
        assert!(store.overrides().await.is_pending("t1"));

        transport.fail_approvals(true);
        second_gate.release.notify_one();
        assert!(second.await.unwrap().is_err());

        let overrides = store.overrides().await;
        assert_eq!(overrides.get("t1"), Some(true));
        assert!(!overrides.is_pending("t1"));
        assert_eq!(transport.approval_writes(), vec![("t1".to_string(), true)]);
    }
}
