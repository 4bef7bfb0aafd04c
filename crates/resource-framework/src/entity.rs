//! # Entities & References
//!
//! Requests refer to domain records loosely: a numeric ID, an external ID
//! string (IDE), or an already-loaded object. [`Reference`] is the tagged form of
//! that polymorphic value, and [`EntityRepository`] gives every entity type the
//! three conversions between those forms.
//!
//! The [`EntityCatalog`] knows which entity types exist and holds the repository
//! for each of them.

use crate::error::{EntityError, InternalError};
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::fmt::{self, Debug, Display};
use std::str::FromStr;
use std::sync::Arc;

/// Internal numeric identifier of a stored entity.
pub type EntityId = u64;

/// A domain record that can be referenced from requests.
pub trait Entity: Clone + Debug + Send + Sync + 'static {
    /// Name the catalog registers this type under.
    const TYPE_NAME: &'static str;

    fn id(&self) -> EntityId;

    /// External (public) identifier.
    fn ide(&self) -> &str;
}

/// One of the three canonical forms of an entity reference.
#[derive(Debug, Clone, PartialEq)]
pub enum Reference<E> {
    Id(EntityId),
    Ide(String),
    Object(E),
}

impl<E: Entity> Reference<E> {
    /// Classifies a loosely-typed request value.
    ///
    /// Unsigned integers and all-digit strings are IDs, other non-empty strings
    /// are IDEs. Anything else is not a reference.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64().map(Reference::Id),
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => match s.parse::<EntityId>() {
                Ok(id) if s.bytes().all(|b| b.is_ascii_digit()) => Some(Reference::Id(id)),
                _ => Some(Reference::Ide(s.clone())),
            },
            _ => None,
        }
    }

    pub fn kind(&self) -> ReferenceKind {
        match self {
            Reference::Id(_) => ReferenceKind::Id,
            Reference::Ide(_) => ReferenceKind::Ide,
            Reference::Object(_) => ReferenceKind::Object,
        }
    }

    pub fn into_id(self) -> Option<EntityId> {
        match self {
            Reference::Id(id) => Some(id),
            _ => None,
        }
    }

    pub fn into_ide(self) -> Option<String> {
        match self {
            Reference::Ide(ide) => Some(ide),
            _ => None,
        }
    }

    pub fn into_object(self) -> Option<E> {
        match self {
            Reference::Object(entity) => Some(entity),
            _ => None,
        }
    }
}

impl<E: Entity> Display for Reference<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Id(id) => write!(f, "#{id}"),
            Reference::Ide(ide) => write!(f, "{ide}"),
            Reference::Object(entity) => write!(f, "#{}", entity.id()),
        }
    }
}

/// Target form of a reference resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Id,
    Ide,
    Object,
}

impl Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReferenceKind::Id => "ID",
            ReferenceKind::Ide => "IDE",
            ReferenceKind::Object => "Object",
        })
    }
}

impl FromStr for ReferenceKind {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ID" => Ok(ReferenceKind::Id),
            "IDE" => Ok(ReferenceKind::Ide),
            "Object" => Ok(ReferenceKind::Object),
            other => Err(InternalError::UnsupportedConversion(other.to_string())),
        }
    }
}

/// Storage-facing side of an entity type.
///
/// Implementors provide the two lookups; the conversions are provided. A
/// conversion from an ID or IDE always loads the record, so it also proves the
/// record exists. An object is already loaded and converts without a lookup.
pub trait EntityRepository<E: Entity>: Send + Sync {
    fn find_by_id(&self, id: EntityId) -> Result<Option<E>, EntityError>;

    fn find_by_ide(&self, ide: &str) -> Result<Option<E>, EntityError>;

    fn convert_to_object(&self, value: Reference<E>) -> Result<E, EntityError> {
        match value {
            Reference::Object(entity) => Ok(entity),
            Reference::Id(id) => self.find_by_id(id)?.ok_or_else(|| EntityError::NotFound {
                entity_type: E::TYPE_NAME,
                reference: format!("#{id}"),
            }),
            Reference::Ide(ide) if ide.is_empty() => Err(EntityError::InvalidReference {
                entity_type: E::TYPE_NAME,
                reason: "empty external id".to_string(),
            }),
            Reference::Ide(ide) => self.find_by_ide(&ide)?.ok_or(EntityError::NotFound {
                entity_type: E::TYPE_NAME,
                reference: ide,
            }),
        }
    }

    fn convert_to_id(&self, value: Reference<E>) -> Result<EntityId, EntityError> {
        self.convert_to_object(value).map(|entity| entity.id())
    }

    fn convert_to_ide(&self, value: Reference<E>) -> Result<String, EntityError> {
        self.convert_to_object(value)
            .map(|entity| entity.ide().to_string())
    }
}

/// Registry of known entity types and their repositories.
#[derive(Default)]
pub struct EntityCatalog {
    repositories: HashMap<&'static str, Box<dyn Any + Send + Sync>>,
}

impl EntityCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the repository for `E`, replacing any earlier one.
    pub fn register<E: Entity>(&mut self, repository: Arc<dyn EntityRepository<E>>) -> &mut Self {
        self.repositories.insert(E::TYPE_NAME, Box::new(repository));
        self
    }

    pub fn with<E: Entity>(mut self, repository: Arc<dyn EntityRepository<E>>) -> Self {
        self.register(repository);
        self
    }

    pub fn is_entity_type(&self, name: &str) -> bool {
        self.repositories.contains_key(name)
    }

    pub fn entity_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.repositories.keys().copied()
    }

    pub fn repository<E: Entity>(&self) -> Result<Arc<dyn EntityRepository<E>>, InternalError> {
        let stored = self
            .repositories
            .get(E::TYPE_NAME)
            .ok_or_else(|| InternalError::UnknownEntityType(E::TYPE_NAME.to_string()))?;

        stored
            .downcast_ref::<Arc<dyn EntityRepository<E>>>()
            .cloned()
            .ok_or(InternalError::EntityTypeMismatch(E::TYPE_NAME))
    }
}

impl Debug for EntityCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.entity_types().collect();
        names.sort_unstable();
        f.debug_struct("EntityCatalog")
            .field("entity_types", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct Tag {
        id: EntityId,
        slug: String,
    }

    impl Entity for Tag {
        const TYPE_NAME: &'static str = "Tag";

        fn id(&self) -> EntityId {
            self.id
        }

        fn ide(&self) -> &str {
            &self.slug
        }
    }

    #[derive(Default)]
    struct TagStore {
        tags: Vec<Tag>,
        lookups: Mutex<u32>,
    }

    impl EntityRepository<Tag> for TagStore {
        fn find_by_id(&self, id: EntityId) -> Result<Option<Tag>, EntityError> {
            *self.lookups.lock().unwrap() += 1;
            Ok(self.tags.iter().find(|t| t.id == id).cloned())
        }

        fn find_by_ide(&self, ide: &str) -> Result<Option<Tag>, EntityError> {
            *self.lookups.lock().unwrap() += 1;
            Ok(self.tags.iter().find(|t| t.slug == ide).cloned())
        }
    }

    fn store() -> TagStore {
        TagStore {
            tags: vec![Tag {
                id: 7,
                slug: "rust".into(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_reference_from_json() {
        assert_eq!(Reference::<Tag>::from_json(&json!(7)), Some(Reference::Id(7)));
        assert_eq!(Reference::<Tag>::from_json(&json!("42")), Some(Reference::Id(42)));
        assert_eq!(
            Reference::<Tag>::from_json(&json!("rust")),
            Some(Reference::Ide("rust".into()))
        );
        assert_eq!(
            Reference::<Tag>::from_json(&json!("+42")),
            Some(Reference::Ide("+42".into()))
        );
        assert_eq!(Reference::<Tag>::from_json(&json!("")), None);
        assert_eq!(Reference::<Tag>::from_json(&json!(-1)), None);
        assert_eq!(Reference::<Tag>::from_json(&json!(null)), None);
    }

    #[test]
    fn test_reference_kind_parsing() {
        assert_eq!("ID".parse::<ReferenceKind>().unwrap(), ReferenceKind::Id);
        assert_eq!("IDE".parse::<ReferenceKind>().unwrap(), ReferenceKind::Ide);
        assert_eq!("Object".parse::<ReferenceKind>().unwrap(), ReferenceKind::Object);
        assert_eq!(
            "Slug".parse::<ReferenceKind>().unwrap_err(),
            InternalError::UnsupportedConversion("Slug".into())
        );
    }

    #[test]
    fn test_conversions_across_forms() {
        let store = store();

        assert_eq!(store.convert_to_ide(Reference::Id(7)).unwrap(), "rust");
        assert_eq!(store.convert_to_id(Reference::Ide("rust".into())).unwrap(), 7);

        let tag = store.convert_to_object(Reference::Id(7)).unwrap();
        assert_eq!(tag.slug, "rust");
        assert_eq!(*store.lookups.lock().unwrap(), 3);

        // already loaded: no lookup
        assert_eq!(store.convert_to_id(Reference::Object(tag)).unwrap(), 7);
        assert_eq!(*store.lookups.lock().unwrap(), 3);
    }

    #[test]
    fn test_conversion_failures() {
        let store = store();
        assert!(matches!(
            store.convert_to_id(Reference::Id(99)),
            Err(EntityError::NotFound { entity_type: "Tag", .. })
        ));
        assert!(matches!(
            store.convert_to_object(Reference::Ide(String::new())),
            Err(EntityError::InvalidReference { .. })
        ));
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = EntityCatalog::new().with::<Tag>(Arc::new(store()));

        assert!(catalog.is_entity_type("Tag"));
        assert!(!catalog.is_entity_type("Label"));
        let repo = catalog.repository::<Tag>().unwrap();
        assert_eq!(repo.convert_to_id(Reference::Ide("rust".into())).unwrap(), 7);

        let empty = EntityCatalog::new();
        assert_eq!(
            empty.repository::<Tag>().err(),
            Some(InternalError::UnknownEntityType("Tag".into()))
        );
    }
}
