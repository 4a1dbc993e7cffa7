//! User collaborator interface.
//!
//! The auth core does not own user persistence; it talks to whatever backs
//! this trait. `InMemoryUserStore` is the default for local dev and tests.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub mobile: Option<String>,
    pub password_hash: String,
    pub verified: bool,
    pub role: String,
}

/// Restricted projection returned to callers; never carries the password hash.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserProjection {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub mobile: Option<String>,
    pub role: String,
}

impl From<&User> for UserProjection {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            mobile: user.mobile.clone(),
            role: user.role.clone(),
        }
    }
}

/// Partial update applied via `UserStore::update`.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub verified: Option<bool>,
    pub password_hash: Option<String>,
}

impl UserUpdate {
    #[must_use]
    pub fn verified(value: bool) -> Self {
        Self {
            verified: Some(value),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn password_hash(value: String) -> Self {
        Self {
            password_hash: Some(value),
            ..Self::default()
        }
    }
}

/// Narrow persistence interface consumed by the auth flows.
///
/// "Not found" is an explicit `Ok(None)`, never an error the core has to
/// interpret.
pub trait UserStore: Send + Sync {
    fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
    fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    fn save(&self, user: User) -> Result<()>;
    fn update(&self, id: Uuid, update: UserUpdate) -> Result<Option<User>>;
}

/// Mutex-guarded map, good enough for local dev and tests.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl InMemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for InMemoryUserStore {
    fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let users = self.users.lock().expect("user store mutex poisoned");
        Ok(users.get(&id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.lock().expect("user store mutex poisoned");
        Ok(users.values().find(|user| user.email == email).cloned())
    }

    fn save(&self, user: User) -> Result<()> {
        let mut users = self.users.lock().expect("user store mutex poisoned");
        let duplicate = users
            .values()
            .any(|existing| existing.email == user.email && existing.id != user.id);
        if duplicate {
            bail!("email already exists: {}", user.email);
        }
        users.insert(user.id, user);
        Ok(())
    }

    fn update(&self, id: Uuid, update: UserUpdate) -> Result<Option<User>> {
        let mut users = self.users.lock().expect("user store mutex poisoned");
        let Some(user) = users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(verified) = update.verified {
            user.verified = verified;
        }
        if let Some(password_hash) = update.password_hash {
            user.password_hash = password_hash;
        }
        Ok(Some(user.clone()))
    }
}
