use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Serializes booking attempts per account number within this process.
/// Attempts on different accounts do not wait on each other.
#[derive(Debug, Default)]
pub struct BookingLocks {
    slots: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl BookingLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other caller holds the slot for `account_number`.
    pub async fn acquire(&self, account_number: &str) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self
                .slots
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            // 沒有持有者也沒有等待者的鎖可以移除
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            slots
                .entry(account_number.trim().to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        slot.lock_owned().await
    }

    pub fn tracked_accounts(&self) -> usize {
        self.slots
            .lock()
            .map(|slots| slots.len())
            .unwrap_or_default()
    }
}
