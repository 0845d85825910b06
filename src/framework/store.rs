//! # Storage Collaborator
//!
//! The narrow create/read/update/delete/query interface a [`ResourceActor`] persists
//! through. The actor owns its repository exclusively, so implementations need no
//! internal locking.
//!
//! [`ResourceActor`]: super::ResourceActor

use std::collections::BTreeMap;

use super::core::{ActorEntity, Query};

/// Storage for one entity type.
pub trait Repository<T: ActorEntity>: Send + 'static {
    /// Allocates the identifier for the next created entity.
    fn next_id(&mut self) -> T::Id;

    /// Inserts or replaces the entity stored under `item.id()`.
    fn save(&mut self, item: T) -> T;

    fn find_by_id(&self, id: &T::Id) -> Option<T>;

    fn find_all(&self) -> Vec<T>;

    fn find_by(&self, query: &Query<T>) -> Vec<T> {
        self.find_all()
            .into_iter()
            .filter(|item| query.matches(item))
            .collect()
    }

    fn delete_by_id(&mut self, id: &T::Id) -> Option<T>;

    fn count(&self) -> usize;
}

/// In-memory repository ordered by id. Ids come from a counter starting at 1 and are
/// never reused, even after deletes or failed creates.
pub struct MemoryRepository<T: ActorEntity> {
    items: BTreeMap<T::Id, T>,
    next_id: u32,
}

impl<T: ActorEntity> MemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            items: BTreeMap::new(),
            next_id: 1,
        }
    }
}

impl<T: ActorEntity> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ActorEntity> Repository<T> for MemoryRepository<T> {
    fn next_id(&mut self) -> T::Id {
        let id = self.next_id;
        self.next_id += 1;
        T::Id::from(id)
    }

    fn save(&mut self, item: T) -> T {
        self.items.insert(item.id().clone(), item.clone());
        item
    }

    fn find_by_id(&self, id: &T::Id) -> Option<T> {
        self.items.get(id).cloned()
    }

    fn find_all(&self) -> Vec<T> {
        self.items.values().cloned().collect()
    }

    fn find_by(&self, query: &Query<T>) -> Vec<T> {
        self.items
            .values()
            .filter(|item| query.matches(item))
            .cloned()
            .collect()
    }

    fn delete_by_id(&mut self, id: &T::Id) -> Option<T> {
        self.items.remove(id)
    }

    fn count(&self) -> usize {
        self.items.len()
    }
}
