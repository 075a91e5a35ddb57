use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// Per-interview mutual exclusion. Unrelated interviews never contend.
#[derive(Clone, Default)]
pub struct SessionLocks {
    slots: Arc<Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>>,
}

impl SessionLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to one interview. Released when the guard drops.
    pub async fn acquire(&self, interview_id: Uuid) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            // drop slots nobody holds or waits on
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            Arc::clone(slots.entry(interview_id).or_default())
        };
        slot.lock_owned().await
    }

    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
