use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use iml_types::ProductId;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Lazily created per-product async locks.
///
/// The registry mutex is held only long enough to fetch or create an
/// entry; the returned guard serializes a product's read-check-write
/// section. Locks are never removed: the set of products is small and
/// bounded by the catalog.
pub(crate) struct ProductLocks {
    locks: Mutex<HashMap<ProductId, Arc<AsyncMutex<()>>>>,
}

impl ProductLocks {
    pub(crate) fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) async fn acquire(&self, product: ProductId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.locks.lock().expect("product lock registry poisoned");
            Arc::clone(map.entry(product).or_default())
        };
        lock.lock_owned().await
    }
}
