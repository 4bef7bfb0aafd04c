use resource_framework::{Entity, EntityId};
use serde::Serialize;

/// A registered account.
///
/// Referenced externally by `username`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: EntityId,
    pub username: String,
    pub name: String,
    pub email: String,
}

impl User {
    /// The `id` is assigned when the user is stored.
    pub fn new(
        username: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            username: username.into(),
            name: name.into(),
            email: email.into(),
        }
    }
}

impl Entity for User {
    const TYPE_NAME: &'static str = "User";

    fn id(&self) -> EntityId {
        self.id
    }

    fn ide(&self) -> &str {
        &self.username
    }
}
