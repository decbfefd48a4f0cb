use super::{InsertOutcome, Ledger, LedgerError};
use crate::order::OrderId;
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Mutex;

/// Process-local ledger. Forgets everything on restart, so it only backs
/// dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    seen: Mutex<BTreeSet<OrderId>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_seen(ids: impl IntoIterator<Item = OrderId>) -> Self {
        Self {
            seen: Mutex::new(ids.into_iter().collect()),
        }
    }

    /// Snapshot of the recorded ids in ascending order.
    pub fn ids(&self) -> Vec<OrderId> {
        self.lock().iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeSet<OrderId>> {
        // A poisoned set is still a valid set.
        self.seen.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn has(&self, id: OrderId) -> Result<bool, LedgerError> {
        Ok(self.lock().contains(&id))
    }

    async fn insert(&self, id: OrderId) -> Result<InsertOutcome, LedgerError> {
        if self.lock().insert(id) {
            Ok(InsertOutcome::Inserted)
        } else {
            Ok(InsertOutcome::AlreadyPresent)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_then_has() {
        let ledger = MemoryLedger::new();
        assert!(!ledger.has(7).await.unwrap());

        assert_eq!(ledger.insert(7).await.unwrap(), InsertOutcome::Inserted);
        assert!(ledger.has(7).await.unwrap());
        assert!(!ledger.has(8).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_insert_is_rejected() {
        let ledger = MemoryLedger::with_seen([1, 2, 3]);

        assert_eq!(ledger.insert(2).await.unwrap(), InsertOutcome::AlreadyPresent);
        assert_eq!(ledger.ids(), vec![1, 2, 3]);
    }
}
