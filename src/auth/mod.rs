//! Register and login form submission.
//!
//! Each form moves `Idle -> Submitting -> Idle | Navigating`. Only an idle
//! form accepts a submission; a navigating form stays put until the delayed
//! redirect replaces the page.

use crate::api::{ApiError, NotesBackend};
use crate::browser::{Browser, Page};
use crate::config::{
    AUTH_REDIRECT_DELAY_MS, GUARD_REDIRECT_DELAY_MS, LOGOUT_REDIRECT_DELAY_MS,
    SESSION_EXPIRED_REDIRECT_DELAY_MS,
};
use crate::feedback::{Feedback, Severity};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, Session};
use crate::state::Services;
use crate::storage::KeyValueStore;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub(crate) enum FormPhase {
    #[default]
    Idle,
    Submitting,
    Navigating,
}

/// Copy shown by one form.
struct FormText {
    missing_fields: &'static str,
    success: &'static str,
    rejected: &'static str,
    unreachable: &'static str,
}

const REGISTER_TEXT: FormText = FormText {
    missing_fields: "Please fill all fields.",
    success: "Registration successful!",
    rejected: "Registration failed.",
    unreachable: "Server error during registration.",
};

const LOGIN_TEXT: FormText = FormText {
    missing_fields: "Please enter both email and password.",
    success: "Login successful!",
    rejected: "Invalid credentials.",
    unreachable: "Server error during login.",
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterForm {
    fn validated(&self) -> Option<RegisterRequest> {
        let req = RegisterRequest {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.trim().to_string(),
        };
        let complete =
            !req.username.is_empty() && !req.email.is_empty() && !req.password.is_empty();
        complete.then_some(req)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    fn validated(&self) -> Option<LoginRequest> {
        let req = LoginRequest {
            email: self.email.trim().to_string(),
            password: self.password.trim().to_string(),
        };
        (!req.email.is_empty() && !req.password.is_empty()).then_some(req)
    }
}

/// Submission state for one auth form.
#[derive(Clone)]
pub(crate) struct AuthFlow<B, S, F, W> {
    services: Services<B, S, F, W>,
    phase: Arc<Mutex<FormPhase>>,
}

impl<B, S, F, W> AuthFlow<B, S, F, W>
where
    B: NotesBackend,
    S: KeyValueStore,
    F: Feedback,
    W: Browser,
{
    pub fn new(services: Services<B, S, F, W>) -> Self {
        Self {
            services,
            phase: Arc::new(Mutex::new(FormPhase::Idle)),
        }
    }

    #[cfg(test)]
    pub fn services(&self) -> &Services<B, S, F, W> {
        &self.services
    }

    pub fn phase(&self) -> FormPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_phase(&self, phase: FormPhase) {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner) = phase;
    }

    /// Moves `Idle -> Submitting`; false when the form is not idle.
    fn begin(&self) -> bool {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        if *phase != FormPhase::Idle {
            tracing::debug!(phase = ?*phase, "ignoring submit");
            return false;
        }
        *phase = FormPhase::Submitting;
        true
    }

    pub async fn submit_register(&self, form: RegisterForm) -> FormPhase {
        if !self.begin() {
            return self.phase();
        }
        self.services.feedback.show_busy();

        let Some(req) = form.validated() else {
            return self.reject_incomplete(&REGISTER_TEXT);
        };

        tracing::info!(email = %req.email, "registering");
        let result = self.services.backend.register(&req).await;
        self.finish(result, &REGISTER_TEXT)
    }

    pub async fn submit_login(&self, form: LoginForm) -> FormPhase {
        if !self.begin() {
            return self.phase();
        }
        self.services.feedback.show_busy();

        let Some(req) = form.validated() else {
            return self.reject_incomplete(&LOGIN_TEXT);
        };

        tracing::info!(email = %req.email, "logging in");
        let result = self.services.backend.login(&req).await;
        self.finish(result, &LOGIN_TEXT)
    }

    fn reject_incomplete(&self, text: &FormText) -> FormPhase {
        self.services.feedback.hide_busy();
        self.services
            .feedback
            .notify(text.missing_fields, Severity::Warning);
        self.set_phase(FormPhase::Idle);
        FormPhase::Idle
    }

    fn finish(&self, result: Result<AuthResponse, ApiError>, text: &FormText) -> FormPhase {
        let feedback = &self.services.feedback;
        feedback.hide_busy();

        let outcome = result.map_err(|e| match &e {
            ApiError::Transport { .. } => text.unreachable.to_string(),
            _ => e.server_message().unwrap_or(text.rejected).to_string(),
        });

        let saved = outcome.and_then(|res| {
            let session = Session::new(res.token, res.user);
            self.services
                .session
                .save(&session)
                .map_err(|e| format!("Could not save your session: {e}."))
        });

        match saved {
            Ok(()) => {
                feedback.notify(text.success, Severity::Success);
                self.services
                    .browser
                    .redirect_after(Page::Dashboard, AUTH_REDIRECT_DELAY_MS);
                self.set_phase(FormPhase::Navigating);
                FormPhase::Navigating
            }
            Err(message) => {
                feedback.notify(&message, Severity::Danger);
                self.set_phase(FormPhase::Idle);
                FormPhase::Idle
            }
        }
    }
}

/// Page access guard: the stored session when it is valid, otherwise a
/// warning and a delayed trip to the login page.
pub(crate) fn require_session<B, S, F, W>(services: &Services<B, S, F, W>) -> Option<Session>
where
    S: KeyValueStore,
    F: Feedback,
    W: Browser,
{
    let session = services.session.load();
    if session.is_valid() {
        return Some(session);
    }

    tracing::info!("no valid session, sending visitor to login");
    services
        .feedback
        .notify("Please login first!", Severity::Warning);
    services
        .browser
        .redirect_after(Page::Login, GUARD_REDIRECT_DELAY_MS);
    None
}

/// The backend refused the stored credentials.
pub(crate) fn expire_session<B, S, F, W>(services: &Services<B, S, F, W>)
where
    S: KeyValueStore,
    F: Feedback,
    W: Browser,
{
    tracing::warn!("session rejected, clearing stored credentials");
    services.session.clear();
    services
        .feedback
        .notify("Session expired. Please login again.", Severity::Warning);
    services
        .browser
        .redirect_after(Page::Login, SESSION_EXPIRED_REDIRECT_DELAY_MS);
}

pub(crate) fn logout<B, S, F, W>(services: &Services<B, S, F, W>)
where
    S: KeyValueStore,
    F: Feedback,
    W: Browser,
{
    services.session.clear();
    services
        .feedback
        .notify("Logged out successfully!", Severity::Info);
    services
        .browser
        .redirect_after(Page::Login, LOGOUT_REDIRECT_DELAY_MS);
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::browser::RecordingBrowser;
    use crate::models::UserProfile;
    use crate::state::fakes::{services, FakeServices};
    use crate::storage::MemoryStore;
    use pretty_assertions::assert_eq;

    type Flow = AuthFlow<
        crate::api::FakeBackend,
        MemoryStore,
        crate::feedback::RecordingFeedback,
        RecordingBrowser,
    >;

    fn flow(store: MemoryStore) -> Flow {
        let svc: FakeServices = services(store, RecordingBrowser::default());
        AuthFlow::new(svc)
    }

    fn ok_response() -> AuthResponse {
        AuthResponse {
            token: "t1".to_string(),
            user: UserProfile {
                username: "A".to_string(),
                email: "a@b.com".to_string(),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn test_login_success_stores_session_and_redirects() {
        let store = MemoryStore::default();
        let flow = flow(store.clone());
        *flow.services().backend.auth_result.borrow_mut() = Some(Ok(ok_response()));

        let phase = flow
            .submit_login(LoginForm {
                email: "a@b.com".to_string(),
                password: "secret".to_string(),
            })
            .await;

        assert_eq!(phase, FormPhase::Navigating);
        let svc = flow.services();
        assert_eq!(svc.backend.calls.borrow().clone(), vec!["login:a@b.com:secret"]);

        let session = svc.session.load();
        assert_eq!(session.token.as_deref(), Some("t1"));
        assert_eq!(session.user.map(|u| u.username), Some("A".to_string()));

        assert_eq!(
            svc.feedback.notifications(),
            vec![("Login successful!".to_string(), Severity::Success)]
        );
        assert_eq!(
            svc.browser.redirects(),
            vec![(Page::Dashboard, AUTH_REDIRECT_DELAY_MS)]
        );
        assert_eq!(svc.feedback.busy_level(), 0);
    }

    #[tokio::test]
    async fn test_login_trims_inputs() {
        let flow = flow(MemoryStore::default());
        *flow.services().backend.auth_result.borrow_mut() = Some(Ok(ok_response()));

        flow.submit_login(LoginForm {
            email: "  a@b.com ".to_string(),
            password: " secret\n".to_string(),
        })
        .await;

        assert_eq!(
            flow.services().backend.calls.borrow().clone(),
            vec!["login:a@b.com:secret"]
        );
    }

    #[tokio::test]
    async fn test_login_missing_field_makes_no_call() {
        let flow = flow(MemoryStore::default());

        let phase = flow
            .submit_login(LoginForm {
                email: "a@b.com".to_string(),
                password: "   ".to_string(),
            })
            .await;

        assert_eq!(phase, FormPhase::Idle);
        let svc = flow.services();
        assert_eq!(svc.backend.count("login"), 0);
        assert_eq!(svc.feedback.severities(), vec![Severity::Warning]);
        assert!(svc.browser.redirects().is_empty());
        assert_eq!(svc.feedback.busy_counts(), (1, 1));
    }

    #[tokio::test]
    async fn test_register_missing_field_makes_no_call() {
        let flow = flow(MemoryStore::default());

        let phase = flow
            .submit_register(RegisterForm {
                username: String::new(),
                email: "a@b.com".to_string(),
                password: "secret".to_string(),
            })
            .await;

        assert_eq!(phase, FormPhase::Idle);
        assert_eq!(flow.services().backend.count("register"), 0);
        assert_eq!(
            flow.services().feedback.notifications(),
            vec![("Please fill all fields.".to_string(), Severity::Warning)]
        );
    }

    #[tokio::test]
    async fn test_login_rejected_shows_server_message_and_allows_retry() {
        let flow = flow(MemoryStore::default());
        *flow.services().backend.auth_result.borrow_mut() = Some(Err(ApiError::Rejected {
            status: 400,
            message: Some("Wrong password".to_string()),
        }));
        let form = LoginForm {
            email: "a@b.com".to_string(),
            password: "nope".to_string(),
        };

        assert_eq!(flow.submit_login(form.clone()).await, FormPhase::Idle);
        assert_eq!(flow.submit_login(form).await, FormPhase::Idle);

        let svc = flow.services();
        assert_eq!(svc.backend.count("login"), 2);
        assert_eq!(
            svc.feedback.notifications()[0],
            ("Wrong password".to_string(), Severity::Danger)
        );
        assert!(svc.browser.redirects().is_empty());
        assert!(!svc.session.load().is_valid());
    }

    #[tokio::test]
    async fn test_login_rejected_without_message_uses_fallback() {
        let flow = flow(MemoryStore::default());
        *flow.services().backend.auth_result.borrow_mut() = Some(Err(ApiError::Rejected {
            status: 401,
            message: None,
        }));

        flow.submit_login(LoginForm {
            email: "a@b.com".to_string(),
            password: "x".to_string(),
        })
        .await;

        assert_eq!(
            flow.services().feedback.notifications(),
            vec![("Invalid credentials.".to_string(), Severity::Danger)]
        );
    }

    #[tokio::test]
    async fn test_register_transport_failure_uses_fixed_message() {
        let flow = flow(MemoryStore::default());
        *flow.services().backend.auth_result.borrow_mut() = Some(Err(ApiError::Transport {
            detail: "connection refused".to_string(),
        }));

        let phase = flow
            .submit_register(RegisterForm {
                username: "A".to_string(),
                email: "a@b.com".to_string(),
                password: "secret".to_string(),
            })
            .await;

        assert_eq!(phase, FormPhase::Idle);
        assert_eq!(
            flow.services().feedback.notifications(),
            vec![(
                "Server error during registration.".to_string(),
                Severity::Danger
            )]
        );
        assert_eq!(flow.services().feedback.busy_level(), 0);
    }

    #[tokio::test]
    async fn test_register_success_redirects_once() {
        let flow = flow(MemoryStore::default());
        *flow.services().backend.auth_result.borrow_mut() = Some(Ok(ok_response()));

        let phase = flow
            .submit_register(RegisterForm {
                username: "A".to_string(),
                email: "a@b.com".to_string(),
                password: "secret".to_string(),
            })
            .await;

        assert_eq!(phase, FormPhase::Navigating);
        assert_eq!(
            flow.services().feedback.severities(),
            vec![Severity::Success]
        );
        assert_eq!(flow.services().browser.redirects().len(), 1);
    }

    #[tokio::test]
    async fn test_navigating_form_ignores_resubmit() {
        let flow = flow(MemoryStore::default());
        *flow.services().backend.auth_result.borrow_mut() = Some(Ok(ok_response()));
        let form = LoginForm {
            email: "a@b.com".to_string(),
            password: "secret".to_string(),
        };

        flow.submit_login(form.clone()).await;
        let phase = flow.submit_login(form).await;

        assert_eq!(phase, FormPhase::Navigating);
        assert_eq!(flow.services().backend.count("login"), 1);
        assert_eq!(flow.services().browser.redirects().len(), 1);
    }

    #[test]
    fn test_require_session_redirects_when_missing() {
        let svc = services(MemoryStore::default(), RecordingBrowser::default());

        assert!(require_session(&svc).is_none());
        assert_eq!(
            svc.feedback.notifications(),
            vec![("Please login first!".to_string(), Severity::Warning)]
        );
        assert_eq!(
            svc.browser.redirects(),
            vec![(Page::Login, GUARD_REDIRECT_DELAY_MS)]
        );
    }

    #[test]
    fn test_require_session_accepts_stored_session() {
        let svc = services(
            crate::state::fakes::signed_in_store(),
            RecordingBrowser::default(),
        );

        let session = require_session(&svc).expect("session should be valid");
        assert_eq!(session.token.as_deref(), Some("t1"));
        assert!(svc.feedback.notifications().is_empty());
        assert!(svc.browser.redirects().is_empty());
    }

    #[test]
    fn test_logout_clears_and_redirects() {
        let store = crate::state::fakes::signed_in_store();
        let svc = services(store.clone(), RecordingBrowser::default());

        logout(&svc);

        assert!(store.raw(crate::storage::TOKEN_KEY).is_none());
        assert!(store.raw(crate::storage::USER_KEY).is_none());
        assert_eq!(
            svc.feedback.notifications(),
            vec![("Logged out successfully!".to_string(), Severity::Info)]
        );
        assert_eq!(
            svc.browser.redirects(),
            vec![(Page::Login, LOGOUT_REDIRECT_DELAY_MS)]
        );
    }

    #[tokio::test]
    async fn test_unsavable_session_reports_failure_without_redirect() {
        let store = MemoryStore::default();
        store.set_read_only(true);
        let flow = flow(store);
        *flow.services().backend.auth_result.borrow_mut() = Some(Ok(ok_response()));

        let phase = flow
            .submit_login(LoginForm {
                email: "a@b.com".to_string(),
                password: "secret".to_string(),
            })
            .await;

        assert_eq!(phase, FormPhase::Idle);
        assert_eq!(
            flow.services().feedback.severities(),
            vec![Severity::Danger]
        );
        assert!(flow.services().browser.redirects().is_empty());
    }
}
