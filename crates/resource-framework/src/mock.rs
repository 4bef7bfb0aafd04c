//! # Mock Repository & Testing Guide
//!
//! `MockRepository<E>` implements [`EntityRepository`] from a queue of
//! expectations, so resolver and resource logic can be tested without a real
//! store, and storage failures that are hard to produce for real can be
//! injected.
//!
//! | Feature | MockRepository | Real repository |
//! |---------|----------------|-----------------|
//! | **State** | None, answers come from expectations | Real records |
//! | **Order** | Lookups must arrive in the expected order | Any order |
//! | **Error Injection** | Easy (`return_err`) | Hard |
//!
//! ```rust
//! use resource_framework::mock::MockRepository;
//! use resource_framework::{Entity, EntityError, EntityId, EntityRepository, Reference};
//!
//! #[derive(Debug, Clone, PartialEq)]
//! struct Label { id: EntityId, name: String }
//!
//! impl Entity for Label {
//!     const TYPE_NAME: &'static str = "Label";
//!     fn id(&self) -> EntityId { self.id }
//!     fn ide(&self) -> &str { &self.name }
//! }
//!
//! let mock = MockRepository::<Label>::new();
//! mock.expect_find_by_id(1).return_ok(Some(Label { id: 1, name: "bug".into() }));
//! mock.expect_find_by_ide("wontfix").return_err(EntityError::Storage {
//!     entity_type: "Label",
//!     message: "timeout".into(),
//! });
//!
//! assert_eq!(mock.convert_to_ide(Reference::Id(1)).unwrap(), "bug");
//! assert!(mock.convert_to_id(Reference::Ide("wontfix".into())).is_err());
//! mock.verify();
//! ```

use crate::entity::{Entity, EntityId, EntityRepository};
use crate::error::EntityError;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

enum Expectation<E> {
    FindById {
        id: EntityId,
        response: Result<Option<E>, EntityError>,
    },
    FindByIde {
        ide: String,
        response: Result<Option<E>, EntityError>,
    },
}

type Queue<E> = Arc<Mutex<VecDeque<Expectation<E>>>>;

fn lock<E>(queue: &Queue<E>) -> MutexGuard<'_, VecDeque<Expectation<E>>> {
    queue.lock().unwrap_or_else(PoisonError::into_inner)
}

/// A repository that answers lookups from queued expectations.
///
/// Panics on an unexpected lookup, like a failed assertion would.
pub struct MockRepository<E: Entity> {
    expectations: Queue<E>,
}

impl<E: Entity> Default for MockRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> MockRepository<E> {
    pub fn new() -> Self {
        Self {
            expectations: Arc::new(Mutex::new(VecDeque::new())),
        }
    }

    /// Shares the expectation queue, for registering the mock in a catalog
    /// while keeping a handle for `verify`.
    pub fn handle(&self) -> Self {
        Self {
            expectations: self.expectations.clone(),
        }
    }

    pub fn expect_find_by_id(&self, id: EntityId) -> FindByIdBuilder<E> {
        FindByIdBuilder {
            id,
            expectations: self.expectations.clone(),
        }
    }

    pub fn expect_find_by_ide(&self, ide: impl Into<String>) -> FindByIdeBuilder<E> {
        FindByIdeBuilder {
            ide: ide.into(),
            expectations: self.expectations.clone(),
        }
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let remaining = lock(&self.expectations).len();
        if remaining != 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
    }
}

impl<E: Entity> EntityRepository<E> for MockRepository<E> {
    fn find_by_id(&self, id: EntityId) -> Result<Option<E>, EntityError> {
        match lock(&self.expectations).pop_front() {
            Some(Expectation::FindById { id: expected, response }) if expected == id => response,
            _ => panic!("Unexpected find_by_id({id}) on {} mock", E::TYPE_NAME),
        }
    }

    fn find_by_ide(&self, ide: &str) -> Result<Option<E>, EntityError> {
        match lock(&self.expectations).pop_front() {
            Some(Expectation::FindByIde { ide: expected, response }) if expected == ide => response,
            _ => panic!("Unexpected find_by_ide({ide:?}) on {} mock", E::TYPE_NAME),
        }
    }
}

/// Builder for `find_by_id` expectations.
pub struct FindByIdBuilder<E> {
    id: EntityId,
    expectations: Queue<E>,
}

impl<E> FindByIdBuilder<E> {
    pub fn return_ok(self, value: Option<E>) {
        lock(&self.expectations).push_back(Expectation::FindById {
            id: self.id,
            response: Ok(value),
        });
    }

    pub fn return_err(self, error: EntityError) {
        lock(&self.expectations).push_back(Expectation::FindById {
            id: self.id,
            response: Err(error),
        });
    }
}

/// Builder for `find_by_ide` expectations.
pub struct FindByIdeBuilder<E> {
    ide: String,
    expectations: Queue<E>,
}

impl<E> FindByIdeBuilder<E> {
    pub fn return_ok(self, value: Option<E>) {
        lock(&self.expectations).push_back(Expectation::FindByIde {
            ide: self.ide,
            response: Ok(value),
        });
    }

    pub fn return_err(self, error: EntityError) {
        lock(&self.expectations).push_back(Expectation::FindByIde {
            ide: self.ide,
            response: Err(error),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityCatalog, Reference};

    #[derive(Debug, Clone, PartialEq)]
    struct Device {
        id: EntityId,
        serial: String,
    }

    impl Entity for Device {
        const TYPE_NAME: &'static str = "Device";
        fn id(&self) -> EntityId {
            self.id
        }
        fn ide(&self) -> &str {
            &self.serial
        }
    }

    #[test]
    fn test_mock_answers_in_order() {
        let mock = MockRepository::<Device>::new();
        mock.expect_find_by_ide("SN-1").return_ok(Some(Device {
            id: 10,
            serial: "SN-1".into(),
        }));
        mock.expect_find_by_id(11).return_ok(None);

        assert_eq!(mock.convert_to_id(Reference::Ide("SN-1".into())).unwrap(), 10);
        assert!(matches!(
            mock.convert_to_object(Reference::Id(11)),
            Err(EntityError::NotFound { .. })
        ));
        mock.verify();
    }

    #[test]
    fn test_handle_shares_expectations_through_catalog() {
        let mock = MockRepository::<Device>::new();
        let catalog = EntityCatalog::new().with::<Device>(Arc::new(mock.handle()));
        mock.expect_find_by_id(1).return_ok(Some(Device {
            id: 1,
            serial: "SN-9".into(),
        }));

        let repo = catalog.repository::<Device>().unwrap();
        assert_eq!(repo.convert_to_ide(Reference::Id(1)).unwrap(), "SN-9");
        mock.verify();
    }

    #[test]
    #[should_panic(expected = "Not all expectations were met")]
    fn test_verify_panics_on_leftovers() {
        let mock = MockRepository::<Device>::new();
        mock.expect_find_by_id(1).return_ok(None);
        mock.verify();
    }

    #[test]
    #[should_panic(expected = "Unexpected find_by_ide")]
    fn test_unexpected_lookup_panics() {
        let mock = MockRepository::<Device>::new();
        mock.expect_find_by_id(1).return_ok(None);
        let _ = mock.find_by_ide("SN-1");
    }
}
