use leptos::task::spawn_local;
use strum::{Display, IntoStaticStr};

/// Top-level pages of the app.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, IntoStaticStr)]
pub(crate) enum Page {
    #[strum(serialize = "/login")]
    Login,
    #[strum(serialize = "/register")]
    Register,
    #[strum(serialize = "/dashboard")]
    Dashboard,
    #[strum(serialize = "/profile")]
    Profile,
}

impl Page {
    pub fn path(self) -> &'static str {
        self.into()
    }
}

/// Window-level side effects: navigation, confirm prompts and timed pauses.
pub(crate) trait Browser {
    /// Full page navigation to `page` after `delay_ms`.
    fn redirect_after(&self, page: Page, delay_ms: u32);

    fn confirm(&self, prompt: &str) -> bool;

    async fn pause(&self, ms: u32);
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct WebBrowser;

impl Browser for WebBrowser {
    fn redirect_after(&self, page: Page, delay_ms: u32) {
        tracing::debug!(%page, delay_ms, "redirect scheduled");
        spawn_local(async move {
            gloo_timers::future::TimeoutFuture::new(delay_ms).await;
            if let Some(window) = web_sys::window() {
                if window.location().set_href(page.path()).is_err() {
                    tracing::error!(%page, "navigation failed");
                }
            }
        });
    }

    fn confirm(&self, prompt: &str) -> bool {
        web_sys::window()
            .and_then(|w| w.confirm_with_message(prompt).ok())
            .unwrap_or(false)
    }

    async fn pause(&self, ms: u32) {
        gloo_timers::future::TimeoutFuture::new(ms).await;
    }
}

#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingBrowser {
    redirects: std::cell::RefCell<Vec<(Page, u32)>>,
    pauses: std::cell::RefCell<Vec<u32>>,
    answer: std::cell::Cell<bool>,
    prompts: std::cell::Cell<u32>,
}

#[cfg(test)]
impl RecordingBrowser {
    pub fn answering(answer: bool) -> Self {
        let b = Self::default();
        b.answer.set(answer);
        b
    }

    pub fn redirects(&self) -> Vec<(Page, u32)> {
        self.redirects.borrow().clone()
    }

    pub fn pauses(&self) -> Vec<u32> {
        self.pauses.borrow().clone()
    }

    pub fn prompts(&self) -> u32 {
        self.prompts.get()
    }
}

#[cfg(test)]
impl Browser for RecordingBrowser {
    fn redirect_after(&self, page: Page, delay_ms: u32) {
        self.redirects.borrow_mut().push((page, delay_ms));
    }

    fn confirm(&self, _prompt: &str) -> bool {
        self.prompts.set(self.prompts.get() + 1);
        self.answer.get()
    }

    async fn pause(&self, ms: u32) {
        self.pauses.borrow_mut().push(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_paths() {
        assert_eq!(Page::Login.path(), "/login");
        assert_eq!(Page::Register.path(), "/register");
        assert_eq!(Page::Dashboard.path(), "/dashboard");
        assert_eq!(Page::Profile.to_string(), "/profile");
    }
}
