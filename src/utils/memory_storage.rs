//! In-memory storage implementation for testing

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use crate::state::CompanyData;
use crate::traits::*;
use crate::types::*;

/// In-memory storage implementation for testing and development
///
/// Clones share the same snapshot, so a test can keep a handle and inspect
/// what the book persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    snapshot: Arc<RwLock<Option<CompanyData>>>,
    saves: Arc<AtomicUsize>,
    fail_saves: Arc<AtomicBool>,
}

impl MemoryStorage {
    /// Create a new, empty memory storage instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage that already holds a snapshot
    pub fn with_snapshot(data: CompanyData) -> Self {
        let storage = Self::new();
        if let Ok(mut slot) = storage.snapshot.write() {
            *slot = Some(data);
        }
        storage
    }

    /// Last persisted snapshot
    pub fn snapshot(&self) -> Option<CompanyData> {
        self.snapshot.read().ok().and_then(|slot| slot.clone())
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Make every following save fail (useful for testing rollback)
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) {
        if let Ok(mut slot) = self.snapshot.write() {
            *slot = None;
        }
        self.saves.store(0, Ordering::SeqCst);
    }
}

fn poisoned() -> LedgerError {
    LedgerError::Storage("memory storage lock poisoned".to_string())
}

#[async_trait]
impl CompanyStorage for MemoryStorage {
    async fn load(&self) -> LedgerResult<Option<CompanyData>> {
        let slot = self.snapshot.read().map_err(|_| poisoned())?;
        Ok(slot.clone())
    }

    async fn save(&mut self, data: &CompanyData) -> LedgerResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(LedgerError::Storage("simulated save failure".to_string()));
        }
        let mut slot = self.snapshot.write().map_err(|_| poisoned())?;
        *slot = Some(data.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
