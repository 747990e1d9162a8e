//! State transitions.
//!
//! Every change to [`AppState`] is an [`AppEvent`] fed through
//! [`AppState::apply`]. Applying an event does no I/O, so a given state and
//! event always produce the same next state.

use winenotes_shared::{Photo, WineEntry};

use crate::state::{AppState, FormField, FormState, PendingPhoto};

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A full collection arrived from the server.
    CollectionLoaded(Vec<WineEntry>),
    LoadFailed(String),
    EditStarted(WineEntry),
    FormReset,
    FieldChanged(FormField, String),
    PhotoSelected(PendingPhoto),
    /// The pending photo is now stored server-side under this reference.
    PhotoUploaded(Photo),
    /// Form input could not be turned into a valid entry.
    InputRejected(String),
    SubmitStarted,
    SubmitSucceeded,
    SubmitFailed(String),
    DeleteFailed(String),
    ErrorDismissed,
    ScrollHandled,
}

impl AppState {
    pub fn apply(&mut self, event: AppEvent) {
        match event {
            AppEvent::CollectionLoaded(wines) => {
                self.wines = wines;
            }
            AppEvent::LoadFailed(message)
            | AppEvent::InputRejected(message)
            | AppEvent::DeleteFailed(message) => {
                self.error = Some(message);
            }
            AppEvent::EditStarted(entry) => {
                self.form = FormState::from_entry(&entry);
                self.scroll_to_top = true;
            }
            AppEvent::FormReset => {
                self.form = FormState::default();
            }
            AppEvent::FieldChanged(field, value) => {
                *self.form.field_mut(field) = value;
            }
            AppEvent::PhotoSelected(pending) => {
                self.form.preview = Some(pending.preview());
                self.form.pending_photo = Some(pending);
            }
            AppEvent::PhotoUploaded(photo) => {
                self.form.photo = Some(photo);
                self.form.preview = None;
                self.form.pending_photo = None;
            }
            AppEvent::SubmitStarted => {
                self.busy = true;
                self.error = None;
            }
            AppEvent::SubmitSucceeded => {
                self.busy = false;
                self.form = FormState::default();
            }
            AppEvent::SubmitFailed(message) => {
                self.busy = false;
                self.error = Some(message);
            }
            AppEvent::ErrorDismissed => {
                self.error = None;
            }
            AppEvent::ScrollHandled => {
                self.scroll_to_top = false;
            }
        }
    }
}
