//! Notes dashboard: session guard, fetch cycle, local search, upload and delete.

use crate::api::{ApiError, NotesBackend};
use crate::auth::{expire_session, require_session};
use crate::browser::Browser;
use crate::feedback::{BusyGuard, Feedback, Severity};
use crate::models::{Note, NoteUpload, UploadFile};
use crate::state::Services;
use crate::storage::KeyValueStore;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub(crate) const EMPTY_TAGS: &str = "—";

/// Last accepted fetch result plus the ticket of the newest fetch started.
///
/// Only the newest ticket may replace the notes, so a slow earlier fetch can
/// never overwrite a later one.
#[derive(Clone, Debug, Default)]
pub(crate) struct NoteLibrary {
    notes: Vec<Note>,
    latest_ticket: u64,
}

impl NoteLibrary {
    pub fn begin_fetch(&mut self) -> u64 {
        self.latest_ticket = self.latest_ticket.saturating_add(1);
        self.latest_ticket
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        ticket == self.latest_ticket
    }

    /// Replaces the notes wholesale when `ticket` is still the newest.
    pub fn accept(&mut self, ticket: u64, notes: Vec<Note>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.notes = notes;
        true
    }

    /// Drops all notes and invalidates fetches still in flight.
    pub fn clear(&mut self) {
        self.notes.clear();
        self.latest_ticket = self.latest_ticket.saturating_add(1);
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }
}

/// Notes whose title, subject or comma-joined tags contain `query`,
/// ignoring case. An empty query keeps every note.
pub(crate) fn filter_notes(notes: &[Note], query: &str) -> Vec<Note> {
    if query.is_empty() {
        return notes.to_vec();
    }

    let q = query.to_lowercase();
    notes
        .iter()
        .filter(|n| {
            n.title.to_lowercase().contains(&q)
                || n.subject.to_lowercase().contains(&q)
                || n.tags.join(",").to_lowercase().contains(&q)
        })
        .cloned()
        .collect()
}

/// What one note card shows. Text is raw; the view layer escapes it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct NoteCard {
    pub id: String,
    pub title: String,
    pub subject: String,
    pub tags_label: String,
    pub download_url: String,
}

impl NoteCard {
    pub fn from_note(note: &Note, download_url: String) -> Self {
        let joined = note.tags.join(", ");
        let tags_label = if joined.trim().is_empty() {
            EMPTY_TAGS.to_string()
        } else {
            joined
        };

        Self {
            id: note.id.clone(),
            title: note.title.clone(),
            subject: note.subject.clone(),
            tags_label,
            download_url,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum FetchOutcome {
    Loaded(usize),
    /// A newer fetch started before this one finished.
    Stale,
    SessionExpired,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MutationOutcome {
    Done,
    /// Rejected locally before any request.
    Invalid,
    /// Confirmation declined.
    Cancelled,
    SessionExpired,
    Failed,
}

/// Upload form contents; `file` is `None` when nothing was picked.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct UploadDraft {
    pub title: String,
    pub subject: String,
    pub tags: String,
    pub file: Option<UploadFile>,
}

#[derive(Clone)]
pub(crate) struct Dashboard<B, S, F, W> {
    services: Services<B, S, F, W>,
    library: Arc<Mutex<NoteLibrary>>,
}

impl<B, S, F, W> Dashboard<B, S, F, W>
where
    B: NotesBackend,
    S: KeyValueStore,
    F: Feedback,
    W: Browser,
{
    pub fn new(services: Services<B, S, F, W>) -> Self {
        Self {
            services,
            library: Arc::new(Mutex::new(NoteLibrary::default())),
        }
    }

    #[cfg(test)]
    pub fn services(&self) -> &Services<B, S, F, W> {
        &self.services
    }

    fn library(&self) -> MutexGuard<'_, NoteLibrary> {
        self.library.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs the access guard, then the first fetch. `None` when the visitor
    /// was sent to the login page.
    pub async fn activate(&self) -> Option<FetchOutcome> {
        require_session(&self.services)?;
        Some(self.fetch_notes().await)
    }

    pub async fn fetch_notes(&self) -> FetchOutcome {
        let Some(token) = self.token() else {
            self.expire();
            return FetchOutcome::SessionExpired;
        };

        let ticket = self.library().begin_fetch();
        let result = {
            let _busy = BusyGuard::show(&self.services.feedback);
            self.services.backend.list_my_notes(&token).await
        };

        match result {
            Ok(notes) => {
                let count = notes.len();
                if self.library().accept(ticket, notes) {
                    tracing::debug!(count, "notes loaded");
                    FetchOutcome::Loaded(count)
                } else {
                    tracing::debug!(ticket, "dropping stale notes response");
                    FetchOutcome::Stale
                }
            }
            Err(ApiError::SessionInvalid { .. }) => {
                self.expire();
                FetchOutcome::SessionExpired
            }
            Err(e) => {
                if self.library().is_current(ticket) {
                    self.report(&e, "Error fetching notes");
                    FetchOutcome::Failed
                } else {
                    tracing::debug!(ticket, error = %e, "ignoring stale fetch failure");
                    FetchOutcome::Stale
                }
            }
        }
    }

    pub async fn upload(&self, draft: UploadDraft) -> MutationOutcome {
        let UploadDraft {
            title,
            subject,
            tags,
            file,
        } = draft;

        let Some(file) = file else {
            self.services
                .feedback
                .notify("Please select a file to upload.", Severity::Warning);
            return MutationOutcome::Invalid;
        };

        let Some(token) = self.token() else {
            self.expire();
            return MutationOutcome::SessionExpired;
        };

        tracing::info!(file = %file.name, size = file.bytes.len(), "uploading note");
        let upload = NoteUpload {
            title: title.trim().to_string(),
            subject: subject.trim().to_string(),
            tags: tags.trim().to_string(),
            file,
        };

        let result = {
            let _busy = BusyGuard::show(&self.services.feedback);
            self.services.backend.upload_note(&token, upload).await
        };

        let outcome = self.settle(result, "Note uploaded successfully!", Severity::Success, "Error uploading note");
        if outcome == MutationOutcome::Done {
            self.fetch_notes().await;
        }
        outcome
    }

    pub async fn delete(&self, id: &str) -> MutationOutcome {
        if !self
            .services
            .browser
            .confirm("Delete this note permanently?")
        {
            return MutationOutcome::Cancelled;
        }

        let Some(token) = self.token() else {
            self.expire();
            return MutationOutcome::SessionExpired;
        };

        tracing::info!(id, "deleting note");
        let result = {
            let _busy = BusyGuard::show(&self.services.feedback);
            self.services.backend.delete_note(&token, id).await
        };

        let outcome = self.settle(result, "Note deleted", Severity::Info, "Failed to delete note");
        if outcome == MutationOutcome::Done {
            self.fetch_notes().await;
        }
        outcome
    }

    pub fn logout(&self) {
        self.library().clear();
        crate::auth::logout(&self.services);
    }

    /// Cards for the notes matching `query`, in fetch order.
    pub fn visible_cards(&self, query: &str) -> Vec<NoteCard> {
        let matches = filter_notes(self.library().notes(), query);
        matches
            .iter()
            .map(|n| NoteCard::from_note(n, self.services.backend.download_url(n)))
            .collect()
    }

    #[cfg(test)]
    pub fn note_count(&self) -> usize {
        self.library().notes().len()
    }

    fn token(&self) -> Option<String> {
        self.services.session.load().bearer().map(str::to_string)
    }

    fn expire(&self) {
        self.library().clear();
        expire_session(&self.services);
    }

    fn report(&self, e: &ApiError, fallback: &str) {
        tracing::warn!(status = ?e.status(), error = %e, "dashboard request failed");
        let message = e.server_message().unwrap_or(fallback);
        self.services.feedback.notify(message, Severity::Danger);
    }

    fn settle(
        &self,
        result: Result<(), ApiError>,
        success: &str,
        severity: Severity,
        fallback: &str,
    ) -> MutationOutcome {
        match result {
            Ok(()) => {
                self.services.feedback.notify(success, severity);
                MutationOutcome::Done
            }
            Err(ApiError::SessionInvalid { .. }) => {
                self.expire();
                MutationOutcome::SessionExpired
            }
            Err(e) => {
                self.report(&e, fallback);
                MutationOutcome::Failed
            }
        }
    }
}
