//! # User Resource
//!
//! Account registration and profile access. A caller may read and change its
//! own account; admins may read any account and list all of them.
//!
//! All field problems in one request are reported together: an invalid
//! username and an invalid email come back as two errors in one failure.

use super::{caller, Request};
use crate::model::User;
use crate::store::Store;
use http::StatusCode;
use resource_framework::{
    resource_state, ActionDescriptor, ActionRegistry, EntityId, ErrorRegistry, Reference,
    Resource, ResourceContext, ResourceResult, SetFields,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::{Arc, OnceLock};
use tracing::info;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInput {
    /// The account acted on: an ID or a username.
    pub user: Option<Value>,
    pub username: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
}

resource_state! {
    #[derive(Debug, Default, Clone, PartialEq, Serialize)]
    pub struct UserState {
        pub id: EntityId,
        pub username: String,
        pub name: String,
        pub email: String,
    }
}

impl From<&User> for UserStatePatch {
    fn from(user: &User) -> Self {
        UserStatePatch::default()
            .id(user.id)
            .username(user.username.clone())
            .name(user.name.clone())
            .email(user.email.clone())
    }
}

pub struct UserResource {
    context: ResourceContext,
    store: Arc<Store>,
    input: UserInput,
    target: Option<User>,
    is_admin: bool,
    state: UserState,
}

impl Resource for UserResource {
    const NAME: &'static str = "User";
    type Params = Request<UserInput>;

    fn possible_errors() -> &'static ErrorRegistry {
        static ERRORS: OnceLock<ErrorRegistry> = OnceLock::new();
        ERRORS.get_or_init(|| {
            ErrorRegistry::new(
                Self::NAME,
                json!({
                    "invalid_user": {
                        "message": "User does not exist",
                        "fields": ["user"],
                    },
                    "username_required": {
                        "message": "Username is required",
                        "fields": ["username"],
                        "type": "required",
                    },
                    "bad_username": {
                        "message": "Username must be 3 to 32 letters, digits, '-' or '_'",
                        "fields": ["username"],
                        "type": "format",
                    },
                    "username_taken": {
                        "message": "Username is already taken",
                        "fields": ["username"],
                        "type": "conflict",
                    },
                    "name_required": {
                        "message": "Name is required",
                        "fields": ["name"],
                        "type": "required",
                    },
                    "email_required": {
                        "message": "Email address is required",
                        "fields": ["email"],
                        "type": "required",
                    },
                    "bad_email": {
                        "message": "Email address is invalid",
                        "fields": ["email"],
                        "type": "format",
                    },
                    "email_taken": {
                        "message": "Email address is already registered",
                        "fields": ["email"],
                        "type": "conflict",
                    },
                }),
            )
        })
    }

    fn actions() -> &'static ActionRegistry {
        static ACTIONS: OnceLock<ActionRegistry> = OnceLock::new();
        ACTIONS.get_or_init(|| {
            ActionRegistry::new(Self::NAME)
                .action("get", ActionDescriptor::new().wrapper("user"))
                .action(
                    "list",
                    ActionDescriptor::new().method("listUsers").wrapper("users"),
                )
                .action(
                    "create",
                    ActionDescriptor::new()
                        .status(StatusCode::CREATED)
                        .wrapper("user"),
                )
                .action("change_email", ActionDescriptor::new().wrapper("user"))
        })
    }

    fn new(params: Request<UserInput>, mut context: ResourceContext) -> ResourceResult<Self> {
        let (subject, is_admin) = caller(&context)?;
        let Request { store, input } = params;

        let target = match &input.user {
            Some(value) => {
                let Some(reference) = Reference::<User>::from_json(value) else {
                    return context.error("invalid_user", json!({ "value": value }));
                };
                Some(context.convert_to_object(reference, "invalid_user")?)
            }
            None => None,
        };
        if let Some(user) = &target {
            if !is_admin && user.username != subject {
                return context.access_denied(Some("users may only access their own account"));
            }
        }

        let own_id = target.as_ref().map(|user| user.id);
        if let Some(username) = &input.username {
            if !is_valid_username(username) {
                context.add_error("bad_username", json!({ "value": username }))?;
            } else if store.users.find_where(|u| &u.username == username).is_some() {
                context.add_error("username_taken", Value::Null)?;
            }
        }
        if let Some(name) = &input.name {
            if name.trim().is_empty() {
                context.add_error("name_required", Value::Null)?;
            }
        }
        if let Some(email) = &input.email {
            if !is_valid_email(email) {
                context.add_error("bad_email", json!({ "value": email }))?;
            } else if store
                .users
                .find_where(|u| u.email.eq_ignore_ascii_case(email) && Some(u.id) != own_id)
                .is_some()
            {
                context.add_error("email_taken", Value::Null)?;
            }
        }
        context.check_errors()?;

        let mut state = UserState::default();
        if let Some(user) = &target {
            state.set(user.into());
        }

        Ok(Self {
            context,
            store,
            input,
            target,
            is_admin,
            state,
        })
    }

    fn invoke(&mut self, method: &str) -> ResourceResult<()> {
        match method {
            "get" => self.get(),
            "listUsers" => self.list_users(),
            "create" => self.create(),
            "changeEmail" => self.change_email(),
            other => Self::unknown_method(other),
        }
    }

    fn context(&self) -> &ResourceContext {
        &self.context
    }

    fn context_mut(&mut self) -> &mut ResourceContext {
        &mut self.context
    }
}

impl UserResource {
    pub fn state(&self) -> &UserState {
        &self.state
    }

    fn get(&mut self) -> ResourceResult<()> {
        if self.target.is_none() {
            return self.context.not_found(Some("no user given"));
        }
        self.context.output(&self.state)?;
        Ok(())
    }

    fn list_users(&mut self) -> ResourceResult<()> {
        if !self.is_admin {
            return self.context.access_denied(Some("admin role required"));
        }
        self.context.output(self.store.users.all())?;
        Ok(())
    }

    fn create(&mut self) -> ResourceResult<()> {
        if self.input.username.is_none() {
            self.context.add_error("username_required", Value::Null)?;
        }
        if self.input.name.is_none() {
            self.context.add_error("name_required", Value::Null)?;
        }
        if self.input.email.is_none() {
            self.context.add_error("email_required", Value::Null)?;
        }
        self.context.check_errors()?;

        let input = &self.input;
        let username = input.username.clone().unwrap_or_default();
        let created = self.store.users.insert_unique_with(
            |u| u.username == username,
            |id| User {
                id,
                ..User::new(
                    username.clone(),
                    input.name.clone().unwrap_or_default(),
                    input.email.clone().unwrap_or_default(),
                )
            },
        );
        let Some(user) = created else {
            return self.context.error("username_taken", Value::Null);
        };
        info!(user_id = user.id, username = %user.username, "User created");

        self.state.set((&user).into());
        self.target = Some(user);
        self.context.output(&self.state)?;
        Ok(())
    }

    fn change_email(&mut self) -> ResourceResult<()> {
        let Some(target) = &self.target else {
            return self.context.not_found(Some("no user given"));
        };
        let Some(email) = self.input.email.clone() else {
            return self.context.error("email_required", Value::Null);
        };

        let Some(user) = self
            .store
            .users
            .update(target.id, |user| user.email = email.clone())
        else {
            return self.context.not_found(None);
        };
        info!(user_id = user.id, "Email changed");

        self.state.set(UserStatePatch::default().email(email));
        self.context.output(&self.state)?;
        Ok(())
    }
}

/// Usernames double as user references, so an all-digit name would read as an ID.
fn is_valid_username(username: &str) -> bool {
    (3..=32).contains(&username.len())
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        && !username.bytes().all(|b| b.is_ascii_digit())
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.split('.').count() >= 2
        && domain.split('.').all(|part| !part.is_empty())
}
