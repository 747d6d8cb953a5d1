use crate::config::TOAST_LIFETIME_MS;
use leptos::prelude::*;
use leptos::task::spawn_local;
use strum::{Display, IntoStaticStr};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Severity {
    Success,
    Warning,
    Danger,
    Info,
}

/// Busy indicator and transient messages.
pub(crate) trait Feedback {
    fn show_busy(&self);
    fn hide_busy(&self);
    fn notify(&self, message: &str, severity: Severity);
}

/// Shows the busy indicator on creation and hides it exactly once on drop.
pub(crate) struct BusyGuard<'a, F: Feedback> {
    feedback: &'a F,
}

impl<'a, F: Feedback> BusyGuard<'a, F> {
    pub fn show(feedback: &'a F) -> Self {
        feedback.show_busy();
        Self { feedback }
    }
}

impl<F: Feedback> Drop for BusyGuard<'_, F> {
    fn drop(&mut self) {
        self.feedback.hide_busy();
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Toast {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
}

/// Signal-backed toast stack and busy counter rendered by `ToastStack` and
/// `BusyOverlay`.
#[derive(Clone, Copy)]
pub(crate) struct ToastFeedback {
    pub toasts: RwSignal<Vec<Toast>>,
    pub busy: RwSignal<u32>,
    next_id: StoredValue<u64>,
}

impl ToastFeedback {
    pub fn new() -> Self {
        Self {
            toasts: RwSignal::new(vec![]),
            busy: RwSignal::new(0),
            next_id: StoredValue::new(1),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get() > 0
    }

    pub fn dismiss(&self, id: u64) {
        self.toasts.update(|list| list.retain(|t| t.id != id));
    }
}

impl Default for ToastFeedback {
    fn default() -> Self {
        Self::new()
    }
}

impl Feedback for ToastFeedback {
    fn show_busy(&self) {
        self.busy.update(|n| *n = n.saturating_add(1));
    }

    fn hide_busy(&self) {
        self.busy.update(|n| *n = n.saturating_sub(1));
    }

    fn notify(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Danger => tracing::warn!(%severity, "{message}"),
            _ => tracing::info!(%severity, "{message}"),
        }

        let id = self.next_id.get_value();
        self.next_id.set_value(id + 1);
        self.toasts.update(|list| {
            list.push(Toast {
                id,
                message: message.to_string(),
                severity,
            })
        });

        let this = *self;
        spawn_local(async move {
            gloo_timers::future::TimeoutFuture::new(TOAST_LIFETIME_MS).await;
            this.dismiss(id);
        });
    }
}

/// Records every call; used by controller tests.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct RecordingFeedback {
    busy: std::cell::Cell<i32>,
    busy_shows: std::cell::Cell<u32>,
    busy_hides: std::cell::Cell<u32>,
    notes: std::cell::RefCell<Vec<(String, Severity)>>,
}

#[cfg(test)]
impl RecordingFeedback {
    pub fn notifications(&self) -> Vec<(String, Severity)> {
        self.notes.borrow().clone()
    }

    pub fn severities(&self) -> Vec<Severity> {
        self.notes.borrow().iter().map(|(_, s)| *s).collect()
    }

    pub fn busy_level(&self) -> i32 {
        self.busy.get()
    }

    pub fn busy_counts(&self) -> (u32, u32) {
        (self.busy_shows.get(), self.busy_hides.get())
    }
}

#[cfg(test)]
impl Feedback for RecordingFeedback {
    fn show_busy(&self) {
        self.busy.set(self.busy.get() + 1);
        self.busy_shows.set(self.busy_shows.get() + 1);
    }

    fn hide_busy(&self) {
        self.busy.set(self.busy.get() - 1);
        self.busy_hides.set(self.busy_hides.get() + 1);
    }

    fn notify(&self, message: &str, severity: Severity) {
        self.notes.borrow_mut().push((message.to_string(), severity));
    }
}
