use std::future::Future;
use std::sync::Arc;

use parking_lot::RwLock;

struct Slot<T> {
    items: Option<Arc<Vec<T>>>,
    generation: u64,
}

/// Read-through cache of a full listing. Mutations never patch it in place;
/// they invalidate it and the next read reloads from the store.
pub struct ListCache<T> {
    slot: RwLock<Slot<T>>,
}

impl<T> Default for ListCache<T> {
    fn default() -> Self {
        Self {
            slot: RwLock::new(Slot {
                items: None,
                generation: 0,
            }),
        }
    }
}

impl<T> ListCache<T> {
    pub fn invalidate(&self) {
        let mut slot = self.slot.write();
        slot.items = None;
        slot.generation += 1;
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.read().items.is_some()
    }

    pub async fn get_or_load<E, F, Fut>(&self, load: F) -> Result<Arc<Vec<T>>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
    {
        let generation = {
            let slot = self.slot.read();
            if let Some(items) = &slot.items {
                return Ok(items.clone());
            }
            slot.generation
        };

        let items = Arc::new(load().await?);

        let mut slot = self.slot.write();
        // A mutation landed while loading; hand out the result but don't keep it.
        if slot.generation == generation {
            slot.items = Some(items.clone());
        }
        Ok(items)
    }
}
