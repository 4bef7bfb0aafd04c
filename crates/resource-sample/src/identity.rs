use resource_framework::Identity;

/// An authenticated caller: the username it signed in as plus its roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    username: String,
    roles: Vec<String>,
}

impl Caller {
    pub const ADMIN: &'static str = "admin";

    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            roles: Vec::new(),
        }
    }

    pub fn admin(username: impl Into<String>) -> Self {
        Self::new(username).with_role(Self::ADMIN)
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.roles.push(role.into());
        self
    }
}

impl Identity for Caller {
    fn subject(&self) -> &str {
        &self.username
    }

    fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
