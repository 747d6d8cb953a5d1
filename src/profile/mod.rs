use crate::auth::require_session;
use crate::browser::Browser;
use crate::config::AVATAR_SAVE_DELAY_MS;
use crate::feedback::{BusyGuard, Feedback, Severity};
use crate::models::Session;
use crate::state::Services;
use crate::storage::KeyValueStore;
use chrono::{DateTime, NaiveDate};

pub(crate) const UNKNOWN_USERNAME: &str = "Unknown";
pub(crate) const UNKNOWN_EMAIL: &str = "No Email";
pub(crate) const UNKNOWN_JOIN_DATE: &str = "—";

/// Account fields shown on the profile page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ProfileSummary {
    pub username: String,
    pub email: String,
    pub joined: String,
}

impl ProfileSummary {
    pub fn from_session(session: &Session) -> Self {
        let user = session.user.as_ref();
        let or = |value: Option<&str>, fallback: &str| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
                .to_string()
        };

        Self {
            username: or(user.map(|u| u.username.as_str()), UNKNOWN_USERNAME),
            email: or(user.map(|u| u.email.as_str()), UNKNOWN_EMAIL),
            joined: join_date_label(user.and_then(|u| u.created_at.as_deref())),
        }
    }
}

/// "Joined: November 2025" from an RFC 3339 timestamp or a bare date.
pub(crate) fn join_date_label(created_at: Option<&str>) -> String {
    let Some(raw) = created_at.map(str::trim).filter(|s| !s.is_empty()) else {
        return UNKNOWN_JOIN_DATE.to_string();
    };

    let date = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"));

    match date {
        Ok(d) => d.format("Joined: %B %Y").to_string(),
        Err(e) => {
            tracing::debug!(raw, error = %e, "unparseable join date");
            UNKNOWN_JOIN_DATE.to_string()
        }
    }
}

#[derive(Clone)]
pub(crate) struct ProfileView<B, S, F, W> {
    services: Services<B, S, F, W>,
}

impl<B, S, F, W> ProfileView<B, S, F, W>
where
    S: KeyValueStore,
    F: Feedback,
    W: Browser,
{
    pub fn new(services: Services<B, S, F, W>) -> Self {
        Self { services }
    }

    /// `None` when the visitor was sent to the login page.
    pub fn activate(&self) -> Option<ProfileSummary> {
        require_session(&self.services).map(|s| ProfileSummary::from_session(&s))
    }

    /// Simulated save; the picked photo never leaves the browser.
    pub async fn save_avatar(&self, has_file: bool) -> bool {
        if !has_file {
            self.services
                .feedback
                .notify("Please choose a photo before saving.", Severity::Warning);
            return false;
        }

        {
            let _busy = BusyGuard::show(&self.services.feedback);
            self.services.browser.pause(AVATAR_SAVE_DELAY_MS).await;
        }
        self.services
            .feedback
            .notify("Avatar updated successfully!", Severity::Success);
        true
    }

    pub fn logout(&self) {
        crate::auth::logout(&self.services);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserProfile;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_join_date_from_timestamp() {
        assert_eq!(
            join_date_label(Some("2025-11-02T10:00:00.000Z")),
            "Joined: November 2025"
        );
    }

    #[test]
    fn test_join_date_from_plain_date() {
        assert_eq!(join_date_label(Some("2024-03-15")), "Joined: March 2024");
    }

    #[test]
    fn test_join_date_fallbacks() {
        assert_eq!(join_date_label(None), UNKNOWN_JOIN_DATE);
        assert_eq!(join_date_label(Some("")), UNKNOWN_JOIN_DATE);
        assert_eq!(join_date_label(Some("yesterday")), UNKNOWN_JOIN_DATE);
    }

    #[test]
    fn test_summary_fallbacks() {
        let session = Session {
            token: Some("t".to_string()),
            user: Some(UserProfile::default()),
        };
        assert_eq!(
            ProfileSummary::from_session(&session),
            ProfileSummary {
                username: UNKNOWN_USERNAME.to_string(),
                email: UNKNOWN_EMAIL.to_string(),
                joined: UNKNOWN_JOIN_DATE.to_string(),
            }
        );
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod flow_tests {
    use super::*;
    use crate::browser::{Page, RecordingBrowser};
    use crate::config::GUARD_REDIRECT_DELAY_MS;
    use crate::state::fakes::{services, signed_in_store, FakeServices};
    use crate::storage::MemoryStore;
    use pretty_assertions::assert_eq;

    fn view(store: MemoryStore) -> ProfileView<
        crate::api::FakeBackend,
        MemoryStore,
        crate::feedback::RecordingFeedback,
        RecordingBrowser,
    > {
        let svc: FakeServices = services(store, RecordingBrowser::default());
        ProfileView::new(svc)
    }

    #[test]
    fn test_activate_shows_stored_user() {
        let profile = view(signed_in_store());

        let summary = profile.activate().expect("signed in");

        assert_eq!(summary.username, "A");
        assert_eq!(summary.email, "a@b.com");
        assert_eq!(summary.joined, "Joined: November 2025");
    }

    #[test]
    fn test_activate_without_session_redirects() {
        let profile = view(MemoryStore::default());

        assert_eq!(profile.activate(), None);
        assert_eq!(
            profile.services.browser.redirects(),
            vec![(Page::Login, GUARD_REDIRECT_DELAY_MS)]
        );
    }

    #[tokio::test]
    async fn test_save_avatar_without_file_warns() {
        let profile = view(signed_in_store());

        assert!(!profile.save_avatar(false).await);

        let svc = &profile.services;
        assert_eq!(
            svc.feedback.notifications(),
            vec![(
                "Please choose a photo before saving.".to_string(),
                Severity::Warning
            )]
        );
        assert!(svc.browser.pauses().is_empty());
        assert_eq!(svc.feedback.busy_counts(), (0, 0));
    }

    #[tokio::test]
    async fn test_save_avatar_pauses_then_confirms() {
        let profile = view(signed_in_store());

        assert!(profile.save_avatar(true).await);

        let svc = &profile.services;
        assert_eq!(svc.browser.pauses(), vec![AVATAR_SAVE_DELAY_MS]);
        assert_eq!(svc.feedback.busy_counts(), (1, 1));
        assert_eq!(
            svc.feedback.notifications(),
            vec![("Avatar updated successfully!".to_string(), Severity::Success)]
        );
        assert!(svc.backend.calls.borrow().is_empty());
    }
}
