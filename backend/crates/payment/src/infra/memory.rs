//! In-memory transaction repository for tests and local runs

use std::sync::{Arc, Mutex};

use crate::domain::repository::TransactionRepository;
use crate::domain::transaction::TransactionRecord;
use crate::error::{PaymentError, PaymentResult};

#[derive(Clone, Default)]
pub struct MemoryTransactionRepository {
    records: Arc<Mutex<Vec<TransactionRecord>>>,
}

impl MemoryTransactionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything inserted so far, oldest first
    pub fn records(&self) -> Vec<TransactionRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }
}

impl TransactionRepository for MemoryTransactionRepository {
    async fn insert(&self, record: &TransactionRecord) -> PaymentResult<()> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| PaymentError::Internal("transaction store lock poisoned".into()))?;
        records.push(record.clone());
        Ok(())
    }
}
