//! # Reference Resolver
//!
//! Normalizes a [`Reference`] into exactly one canonical form for any entity
//! type registered in the [`EntityCatalog`].
//!
//! The resolver keeps the two failure layers apart: a missing entity type is a
//! programmer error ([`ResolveError::Internal`]), while anything the entity
//! layer reports comes back as [`ResolveError::Entity`]. Resources turn the
//! latter into a validation error of their own vocabulary, see
//! [`ResourceContext::resolve`](crate::ResourceContext::resolve).

use crate::entity::{Entity, EntityCatalog, EntityId, Reference, ReferenceKind};
use crate::error::{EntityError, InternalError};
use tracing::trace;

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ResolveError {
    #[error(transparent)]
    Internal(#[from] InternalError),
    #[error(transparent)]
    Entity(#[from] EntityError),
}

/// Borrowing view over a catalog that performs conversions.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    catalog: &'a EntityCatalog,
}

impl<'a> Resolver<'a> {
    pub fn new(catalog: &'a EntityCatalog) -> Self {
        Self { catalog }
    }

    pub fn resolve<E: Entity>(
        &self,
        kind: ReferenceKind,
        value: Reference<E>,
    ) -> Result<Reference<E>, ResolveError> {
        match kind {
            ReferenceKind::Id => self.convert_to_id(value).map(Reference::Id),
            ReferenceKind::Ide => self.convert_to_ide(value).map(Reference::Ide),
            ReferenceKind::Object => self.convert_to_object(value).map(Reference::Object),
        }
    }

    pub fn convert_to_id<E: Entity>(&self, value: Reference<E>) -> Result<EntityId, ResolveError> {
        let repository = self.catalog.repository::<E>()?;
        trace!(entity_type = E::TYPE_NAME, from = %value.kind(), "Resolving to ID");
        Ok(repository.convert_to_id(value)?)
    }

    pub fn convert_to_ide<E: Entity>(&self, value: Reference<E>) -> Result<String, ResolveError> {
        let repository = self.catalog.repository::<E>()?;
        trace!(entity_type = E::TYPE_NAME, from = %value.kind(), "Resolving to IDE");
        Ok(repository.convert_to_ide(value)?)
    }

    pub fn convert_to_object<E: Entity>(&self, value: Reference<E>) -> Result<E, ResolveError> {
        let repository = self.catalog.repository::<E>()?;
        trace!(entity_type = E::TYPE_NAME, from = %value.kind(), "Resolving to Object");
        Ok(repository.convert_to_object(value)?)
    }

    /// Like [`Resolver::resolve`], with the target kind given by name
    /// (`"ID"`, `"IDE"` or `"Object"`).
    pub fn resolve_named<E: Entity>(
        &self,
        kind: &str,
        value: Reference<E>,
    ) -> Result<Reference<E>, ResolveError> {
        self.resolve(kind.parse()?, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityRepository;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    struct Team {
        id: EntityId,
        handle: String,
    }

    impl Entity for Team {
        const TYPE_NAME: &'static str = "Team";
        fn id(&self) -> EntityId {
            self.id
        }
        fn ide(&self) -> &str {
            &self.handle
        }
    }

    struct Teams;

    impl EntityRepository<Team> for Teams {
        fn find_by_id(&self, id: EntityId) -> Result<Option<Team>, EntityError> {
            if id == 500 {
                return Err(EntityError::Storage {
                    entity_type: "Team",
                    message: "connection reset".into(),
                });
            }
            Ok((id == 1).then(|| Team {
                id: 1,
                handle: "core".into(),
            }))
        }

        fn find_by_ide(&self, ide: &str) -> Result<Option<Team>, EntityError> {
            Ok((ide == "core").then(|| Team {
                id: 1,
                handle: "core".into(),
            }))
        }
    }

    fn catalog() -> EntityCatalog {
        EntityCatalog::new().with::<Team>(Arc::new(Teams))
    }

    #[test]
    fn test_resolves_each_kind() {
        let catalog = catalog();
        let resolver = Resolver::new(&catalog);

        assert_eq!(
            resolver.resolve(ReferenceKind::Id, Reference::<Team>::Ide("core".into())),
            Ok(Reference::Id(1))
        );
        assert_eq!(
            resolver.resolve(ReferenceKind::Ide, Reference::<Team>::Id(1)),
            Ok(Reference::Ide("core".into()))
        );
        let object = resolver
            .resolve(ReferenceKind::Object, Reference::<Team>::Id(1))
            .unwrap()
            .into_object()
            .unwrap();
        assert_eq!(object.handle, "core");
    }

    #[test]
    fn test_entity_failures_surface_as_entity_errors() {
        let catalog = catalog();
        let resolver = Resolver::new(&catalog);

        assert!(matches!(
            resolver.resolve(ReferenceKind::Id, Reference::<Team>::Id(2)),
            Err(ResolveError::Entity(EntityError::NotFound { .. }))
        ));
        assert!(matches!(
            resolver.resolve(ReferenceKind::Object, Reference::<Team>::Id(500)),
            Err(ResolveError::Entity(EntityError::Storage { .. }))
        ));
    }

    #[test]
    fn test_unknown_entity_type_is_internal() {
        let catalog = EntityCatalog::new();
        let resolver = Resolver::new(&catalog);

        for kind in [ReferenceKind::Id, ReferenceKind::Ide, ReferenceKind::Object] {
            assert_eq!(
                resolver.resolve(kind, Reference::<Team>::Id(1)),
                Err(ResolveError::Internal(InternalError::UnknownEntityType(
                    "Team".into()
                )))
            );
        }
    }

    #[test]
    fn test_unsupported_kind_name_is_internal() {
        let catalog = catalog();
        let resolver = Resolver::new(&catalog);

        assert_eq!(
            resolver.resolve_named("Handle", Reference::<Team>::Id(1)),
            Err(ResolveError::Internal(InternalError::UnsupportedConversion(
                "Handle".into()
            )))
        );
    }
}
