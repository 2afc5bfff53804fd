use std::sync::Arc;

use shared_types::{TokenResponse, User, UserRole};

use crate::storage::{KeyValueStore, MemoryStore};

/// Storage keys shared with the rest of the portal.
pub mod keys {
    pub const TOKEN: &str = "token";
    pub const USER_ROLE: &str = "userRole";
    pub const USER_EMAIL: &str = "userEmail";
    pub const CURRENT_USER: &str = "currentUser";
    pub const REMEMBERED_EMAIL: &str = "rememberedEmail";
    pub const TEACHER_STATS: &str = "teacherDashboardStats";
}

/// Credentials and per-user state kept across page loads.
///
/// A "remember me" login writes to the persistent store, otherwise to the
/// session-scoped one. Reads check the session-scoped store first.
pub struct Session {
    persistent: Arc<dyn KeyValueStore>,
    scoped: Arc<dyn KeyValueStore>,
}

impl Session {
    pub fn new(persistent: Arc<dyn KeyValueStore>, scoped: Arc<dyn KeyValueStore>) -> Self {
        Self { persistent, scoped }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
    }

    /// Session-scoped store, also used by the stats cache.
    pub fn scoped_store(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.scoped)
    }

    pub fn persistent_store(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.persistent)
    }

    fn read(&self, key: &str) -> Option<String> {
        self.scoped
            .get(key)
            .or_else(|| self.persistent.get(key))
            .filter(|v| !v.trim().is_empty())
    }

    pub fn token(&self) -> Option<String> {
        self.read(keys::TOKEN)
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Role stored at login. Unknown strings read as `None`.
    pub fn role(&self) -> Option<UserRole> {
        self.read(keys::USER_ROLE).and_then(|r| UserRole::parse(&r))
    }

    pub fn email(&self) -> Option<String> {
        self.read(keys::USER_EMAIL)
    }

    /// Persist a successful login. Only the email is remembered, never the
    /// password.
    pub fn store_login(&self, token: &TokenResponse, email: &str, remember: bool) {
        let target = if remember { &self.persistent } else { &self.scoped };
        target.set(keys::TOKEN, &token.access_token);
        if let Some(role) = token.role() {
            target.set(keys::USER_ROLE, role.as_str());
        }
        target.set(keys::USER_EMAIL, email);

        if remember {
            self.persistent.set(keys::REMEMBERED_EMAIL, email);
        } else {
            self.persistent.remove(keys::REMEMBERED_EMAIL);
        }
    }

    pub fn remembered_email(&self) -> Option<String> {
        self.persistent
            .get(keys::REMEMBERED_EMAIL)
            .filter(|v| !v.trim().is_empty())
    }

    pub fn set_current_user(&self, user: &User) {
        match serde_json::to_string(user) {
            Ok(json) => self.scoped.set(keys::CURRENT_USER, &json),
            Err(e) => tracing::warn!(error = %e, "Failed to cache current user"),
        }
    }

    /// Cached `/auth/me` result. A corrupt entry is dropped.
    pub fn current_user(&self) -> Option<User> {
        let raw = self.scoped.get(keys::CURRENT_USER)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding corrupt current user entry");
                self.scoped.remove(keys::CURRENT_USER);
                None
            }
        }
    }

    /// Forget the token and everything derived from it, in both stores.
    /// The remembered email survives.
    pub fn clear_credentials(&self) {
        for store in [&self.persistent, &self.scoped] {
            for key in [
                keys::TOKEN,
                keys::USER_ROLE,
                keys::USER_EMAIL,
                keys::CURRENT_USER,
                keys::TEACHER_STATS,
            ] {
                store.remove(key);
            }
        }
        tracing::info!("credentials cleared");
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .field("role", &self.role())
            .finish()
    }
}
