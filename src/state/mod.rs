use crate::api::ApiClient;
use crate::browser::WebBrowser;
use crate::config::EnvConfig;
use crate::feedback::ToastFeedback;
use crate::storage::{LocalStorage, SessionStore};

/// Everything a page controller talks to, passed explicitly instead of living
/// in module globals.
#[derive(Clone)]
pub(crate) struct Services<B, S, F, W> {
    pub backend: B,
    pub session: SessionStore<S>,
    pub feedback: F,
    pub browser: W,
}

pub(crate) type WebServices = Services<ApiClient, LocalStorage, ToastFeedback, WebBrowser>;

impl WebServices {
    pub fn from_config(config: &EnvConfig) -> Self {
        Self {
            backend: ApiClient::from_config(config),
            session: SessionStore::new(LocalStorage),
            feedback: ToastFeedback::new(),
            browser: WebBrowser,
        }
    }
}

#[derive(Clone)]
pub(crate) struct AppContext(pub WebServices);

#[cfg(test)]
pub(crate) mod fakes {
    use super::Services;
    use crate::api::FakeBackend;
    use crate::browser::RecordingBrowser;
    use crate::feedback::RecordingFeedback;
    use crate::models::{Session, UserProfile};
    use crate::storage::{MemoryStore, SessionStore};

    pub(crate) type FakeServices =
        Services<FakeBackend, MemoryStore, RecordingFeedback, RecordingBrowser>;

    pub(crate) fn services(store: MemoryStore, browser: RecordingBrowser) -> FakeServices {
        Services {
            backend: FakeBackend::default(),
            session: SessionStore::new(store),
            feedback: RecordingFeedback::default(),
            browser,
        }
    }

    pub(crate) fn signed_in_store() -> MemoryStore {
        let store = MemoryStore::default();
        let user = UserProfile {
            username: "A".to_string(),
            email: "a@b.com".to_string(),
            created_at: Some("2025-11-02T10:00:00.000Z".to_string()),
            ..Default::default()
        };
        SessionStore::new(store.clone())
            .save(&Session::new("t1".to_string(), user))
            .expect("memory store write");
        store
    }
}
