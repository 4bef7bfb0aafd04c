//! # In-Memory Store
//!
//! One [`InMemoryRepository`] per entity type, grouped in a [`Store`]. Reads
//! never fail: a poisoned lock still holds consistent records because every
//! write is a single insert or closure over one record.
//!
//! IDs come from a per-repository atomic counter starting at 1.

use crate::model::{Order, Product, User};
use resource_framework::{Entity, EntityCatalog, EntityError, EntityId, EntityRepository};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

pub struct InMemoryRepository<E: Entity> {
    records: RwLock<BTreeMap<EntityId, E>>,
    next_id: AtomicU64,
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<EntityId, E>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<EntityId, E>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores the record built for the next free ID and returns it.
    pub fn insert_with(&self, build: impl FnOnce(EntityId) -> E) -> E {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = build(id);
        self.write().insert(id, record.clone());
        record
    }

    /// Like [`insert_with`](Self::insert_with), but stores nothing and returns
    /// `None` when a record already matching `conflicts` is present. The check
    /// and the insert happen under one write lock.
    pub fn insert_unique_with(
        &self,
        conflicts: impl Fn(&E) -> bool,
        build: impl FnOnce(EntityId) -> E,
    ) -> Option<E> {
        let mut records = self.write();
        if records.values().any(|record| conflicts(record)) {
            return None;
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = build(id);
        records.insert(id, record.clone());
        Some(record)
    }

    /// Applies `change` to the stored record, returning the updated copy.
    pub fn update(&self, id: EntityId, change: impl FnOnce(&mut E)) -> Option<E> {
        let mut records = self.write();
        let record = records.get_mut(&id)?;
        change(record);
        Some(record.clone())
    }

    /// Like [`update`](Self::update), but `change` may refuse by returning `Err`
    /// and the record is then left untouched.
    pub fn try_update<R>(
        &self,
        id: EntityId,
        change: impl FnOnce(&mut E) -> Result<(), R>,
    ) -> Option<Result<E, R>> {
        let mut records = self.write();
        let record = records.get_mut(&id)?;
        let mut draft = record.clone();
        Some(change(&mut draft).map(|()| {
            *record = draft.clone();
            draft
        }))
    }

    pub fn get(&self, id: EntityId) -> Option<E> {
        self.read().get(&id).cloned()
    }

    pub fn find_where(&self, predicate: impl Fn(&E) -> bool) -> Option<E> {
        self.read().values().find(|record| predicate(record)).cloned()
    }

    /// All records in ID order.
    pub fn all(&self) -> Vec<E> {
        self.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl<E: Entity> EntityRepository<E> for InMemoryRepository<E> {
    fn find_by_id(&self, id: EntityId) -> Result<Option<E>, EntityError> {
        Ok(self.get(id))
    }

    fn find_by_ide(&self, ide: &str) -> Result<Option<E>, EntityError> {
        Ok(self.find_where(|record| record.ide() == ide))
    }
}

/// The repositories of every sample entity type.
#[derive(Default)]
pub struct Store {
    pub users: Arc<InMemoryRepository<User>>,
    pub products: Arc<InMemoryRepository<Product>>,
    pub orders: Arc<InMemoryRepository<Order>>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog resolving references against this store.
    pub fn catalog(&self) -> EntityCatalog {
        EntityCatalog::new()
            .with::<User>(self.users.clone())
            .with::<Product>(self.products.clone())
            .with::<Order>(self.orders.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use resource_framework::Reference;

    #[test]
    fn test_ids_assigned_in_order() {
        let users = InMemoryRepository::<User>::new();
        let first = users.insert_with(|id| User {
            id,
            ..User::new("ada", "Ada", "ada@example.com")
        });
        let second = users.insert_with(|id| User {
            id,
            ..User::new("bob", "Bob", "bob@example.com")
        });

        assert_eq!((first.id, second.id), (1, 2));
        assert_eq!(users.convert_to_id(Reference::Ide("bob".into())).unwrap(), 2);
        assert_eq!(users.all().len(), 2);
    }

    #[test]
    fn test_refused_update_leaves_record() {
        let products = InMemoryRepository::<Product>::new();
        let lamp = products.insert_with(|id| Product {
            id,
            ..Product::new("LAMP-1", "Lamp", 2_500, 1)
        });

        let refused = products.try_update(lamp.id, |p| {
            p.stock = 0;
            Err("out of stock")
        });
        assert_eq!(refused, Some(Err("out of stock")));
        assert_eq!(products.get(lamp.id).map(|p| p.stock), Some(1));
        assert!(products.try_update(99, |_| Ok::<_, ()>(())).is_none());
    }

    #[test]
    fn test_unique_insert_refuses_conflict() {
        let users = Arc::new(InMemoryRepository::<User>::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let users = users.clone();
                std::thread::spawn(move || {
                    users.insert_unique_with(
                        |u| u.username == "carol",
                        |id| User {
                            id,
                            ..User::new("carol", "Carol", "carol@example.com")
                        },
                    )
                })
            })
            .collect();
        let inserted = handles
            .into_iter()
            .map(|h| h.join().expect("Failed to join insert thread"))
            .filter(Option::is_some)
            .count();

        assert_eq!(inserted, 1);
        assert_eq!(users.len(), 1);
        assert_eq!(users.all()[0].id, 1);
    }

    #[test]
    fn test_catalog_knows_every_type() {
        let catalog = Store::new().catalog();
        for name in ["User", "Product", "Order"] {
            assert!(catalog.is_entity_type(name));
        }
    }
}
