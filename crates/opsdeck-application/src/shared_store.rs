use opsdeck_core::store::{ActionOutcome, AppStore, StoreAction, StoreSnapshot};
use std::sync::Arc;
use tokio::sync::{RwLock, watch};

/// Cloneable async handle to an [`AppStore`].
///
/// Every action runs to completion under the write lock, so mutations stay
/// atomic for concurrent callers. Reads of the latest published snapshot do
/// not touch the lock.
#[derive(Clone)]
pub struct SharedStore {
    store: Arc<RwLock<AppStore>>,
    updates: watch::Receiver<StoreSnapshot>,
}

impl SharedStore {
    pub fn new(store: AppStore) -> Self {
        let updates = store.subscribe();
        Self {
            store: Arc::new(RwLock::new(store)),
            updates,
        }
    }

    /// Takes a fresh snapshot under the read lock.
    pub async fn snapshot(&self) -> StoreSnapshot {
        let store = self.store.read().await;
        store.snapshot()
    }

    /// The last snapshot published by the store.
    pub fn latest(&self) -> StoreSnapshot {
        self.updates.borrow().clone()
    }

    /// Receiver that wakes on the next effective mutation.
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        let mut rx = self.updates.clone();
        rx.borrow_and_update();
        rx
    }

    pub async fn dispatch(&self, action: StoreAction) -> ActionOutcome {
        let mut store = self.store.write().await;
        store.dispatch(action)
    }

    /// Runs `f` with exclusive access to the store.
    pub async fn update<R>(&self, f: impl FnOnce(&mut AppStore) -> R) -> R {
        let mut store = self.store.write().await;
        f(&mut store)
    }

    /// Runs `f` with shared access to the store.
    pub async fn read<R>(&self, f: impl FnOnce(&AppStore) -> R) -> R {
        let store = self.store.read().await;
        f(&store)
    }
}

impl Default for SharedStore {
    fn default() -> Self {
        Self::new(AppStore::default())
    }
}
