use crate::models::{Session, UserProfile};
use thiserror::Error;

pub(crate) const TOKEN_KEY: &str = "token";
pub(crate) const USER_KEY: &str = "user";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub(crate) enum StorageError {
    #[error("local storage is not available")]
    Unavailable,

    #[error("could not write `{key}` to local storage")]
    Write { key: String },

    #[error("could not encode user record: {0}")]
    Encode(String),
}

/// String key/value persistence.
pub(crate) trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str);
}

/// `window.localStorage`.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct LocalStorage;

impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = Self::storage().ok_or(StorageError::Unavailable)?;
        storage.set_item(key, value).map_err(|_| StorageError::Write {
            key: key.to_string(),
        })
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(key);
        }
    }
}

/// Token + user record persisted under [`TOKEN_KEY`] and [`USER_KEY`].
#[derive(Clone, Debug, Default)]
pub(crate) struct SessionStore<S> {
    store: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Never fails. A corrupted user record wipes both entries.
    pub fn load(&self) -> Session {
        let token = self.store.get(TOKEN_KEY);
        let user = match self.store.get(USER_KEY) {
            None => None,
            Some(raw) => match serde_json::from_str::<Option<UserProfile>>(&raw) {
                Ok(user) => user,
                Err(e) => {
                    tracing::warn!(error = %e, "stored user record is corrupted, clearing session");
                    self.clear();
                    return Session::default();
                }
            },
        };

        Session { token, user }
    }

    /// The user record goes in first and the token last; a failed write leaves
    /// neither entry behind.
    pub fn save(&self, session: &Session) -> Result<(), StorageError> {
        let result = self.write(session);
        if let Err(e) = &result {
            tracing::error!(error = %e, "saving session failed");
            self.clear();
        }
        result
    }

    fn write(&self, session: &Session) -> Result<(), StorageError> {
        match &session.user {
            Some(user) => {
                let json =
                    serde_json::to_string(user).map_err(|e| StorageError::Encode(e.to_string()))?;
                self.store.set(USER_KEY, &json)?;
            }
            None => self.store.remove(USER_KEY),
        }

        match &session.token {
            Some(token) => self.store.set(TOKEN_KEY, token)?,
            None => self.store.remove(TOKEN_KEY),
        }

        Ok(())
    }

    pub fn clear(&self) {
        self.store.remove(TOKEN_KEY);
        self.store.remove(USER_KEY);
    }
}

/// In-memory store for tests.
#[cfg(test)]
#[derive(Clone, Debug, Default)]
pub(crate) struct MemoryStore {
    entries: std::rc::Rc<std::cell::RefCell<std::collections::BTreeMap<String, String>>>,
    read_only: std::rc::Rc<std::cell::Cell<bool>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn with_entries(entries: &[(&str, &str)]) -> Self {
        let store = Self::default();
        for (k, v) in entries {
            store
                .entries
                .borrow_mut()
                .insert((*k).to_string(), (*v).to_string());
        }
        store
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.read_only.set(read_only);
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.raw(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only.get() {
            return Err(StorageError::Write {
                key: key.to_string(),
            });
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}
