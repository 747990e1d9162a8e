//! Form/state controller.
//!
//! The [`Controller`] holds the [`WineApi`] it talks through and the
//! [`AppState`] behind `Arc<Mutex<>>`. It turns user actions into network
//! calls and network results into [`AppEvent`]s. Every method takes `&self`,
//! so a view can read the state while a save is in flight. After every
//! successful write it fetches the whole collection again; the local list is
//! never patched by hand.
//!
//! The state lock is never held across an `.await`.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, error, info, warn};

use winenotes_shared::{WineEntry, WineId};

use crate::api::WineApi;
use crate::error::ClientError;
use crate::events::AppEvent;
use crate::render::{self, CollectionView, FormView};
use crate::state::{current_year, AppState, FormField, PendingPhoto};

pub const LOAD_FAILED: &str = "Failed to load wines";
pub const SAVE_FAILED: &str = "Failed to save wine";
pub const DELETE_FAILED: &str = "Failed to delete wine";
pub const PHOTO_READ_FAILED: &str = "Failed to read photo";
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this wine?";

/// Interactive yes/no confirmation.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

pub struct Controller<A> {
    api: A,
    state: Arc<Mutex<AppState>>,
}

impl<A: WineApi> Controller<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(AppState::default())),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> AppState {
        self.read(AppState::clone)
    }

    /// Handle on the live state for an embedding UI.
    pub fn shared_state(&self) -> Arc<Mutex<AppState>> {
        Arc::clone(&self.state)
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    fn read<T>(&self, f: impl FnOnce(&AppState) -> T) -> T {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    fn apply(&self, event: AppEvent) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .apply(event);
    }

    /// Fetch the collection and replace the local copy with it.
    ///
    /// On failure the previous copy stays and the error slot is set.
    pub async fn load_collection(&self) -> Result<(), ClientError> {
        match self.api.list().await {
            Ok(wines) => {
                debug!(count = wines.len(), "Collection loaded");
                self.apply(AppEvent::CollectionLoaded(wines));
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Error fetching wines");
                self.apply(AppEvent::LoadFailed(LOAD_FAILED.to_string()));
                Err(e)
            }
        }
    }

    pub fn begin_edit(&self, entry: &WineEntry) {
        debug!(id = %entry.id, "Editing wine");
        self.apply(AppEvent::EditStarted(entry.clone()));
    }

    pub fn reset_form(&self) {
        self.apply(AppEvent::FormReset);
    }

    pub fn set_field(&self, field: FormField, value: impl Into<String>) {
        self.apply(AppEvent::FieldChanged(field, value.into()));
    }

    /// Pick a photo from disk. The file is read and previewed locally; it is
    /// only uploaded on submit.
    pub async fn select_photo(&self, path: impl AsRef<Path>) -> Result<(), ClientError> {
        let path = path.as_ref();
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(path = %path.display(), error = %e, "Error reading photo");
                self.apply(AppEvent::InputRejected(PHOTO_READ_FAILED.to_string()));
                return Err(e.into());
            }
        };

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("photo")
            .to_string();
        self.select_photo_bytes(file_name, bytes);
        Ok(())
    }

    pub fn select_photo_bytes(&self, file_name: impl Into<String>, bytes: Vec<u8>) {
        let pending = PendingPhoto::new(file_name, bytes);
        debug!(file = %pending.file_name, size = pending.bytes.len(), "Photo selected");
        self.apply(AppEvent::PhotoSelected(pending));
    }

    /// Save the form: upload a pending photo, then create or update.
    ///
    /// A failed photo upload does not stop the save; the entry keeps the
    /// photo it had before. A failed save leaves the form as it was so the
    /// user can retry. While this runs `busy` is set and a second submit is
    /// refused.
    pub async fn submit(&self) -> Result<(), ClientError> {
        let (mut draft, pending, editing_id) = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if state.busy {
                warn!("Submit ignored, a save is already in progress");
                return Err(ClientError::Busy);
            }

            let draft = match state.form.normalize(current_year()) {
                Ok(draft) => draft,
                Err(e) => {
                    warn!(error = %e, "Form rejected");
                    state.apply(AppEvent::InputRejected(e.to_string()));
                    return Err(e.into());
                }
            };

            state.apply(AppEvent::SubmitStarted);
            (
                draft,
                state.form.pending_photo.clone(),
                state.form.editing_id.clone(),
            )
        };

        if let Some(pending) = &pending {
            match self.api.upload_photo(pending).await {
                Ok(photo) => {
                    draft.photo = Some(photo.clone());
                    self.apply(AppEvent::PhotoUploaded(photo));
                }
                Err(e) => {
                    warn!(error = %e, "Photo upload failed, keeping previous photo");
                }
            }
        }

        let saved = match &editing_id {
            Some(id) => self.api.update(id, &draft).await,
            None => self.api.create(&draft).await,
        };

        match saved {
            Ok(()) => {
                info!(id = ?editing_id, name = %draft.name, "Wine saved");
                // a failed reload already lands in the error slot
                let _ = self.load_collection().await;
                self.apply(AppEvent::SubmitSucceeded);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Error saving wine");
                self.apply(AppEvent::SubmitFailed(SAVE_FAILED.to_string()));
                Err(e)
            }
        }
    }

    /// Delete an entry once the user confirms. Returns whether a delete
    /// call was made and succeeded.
    pub async fn delete_entry(
        &self,
        id: &WineId,
        confirm: &impl Confirm,
    ) -> Result<bool, ClientError> {
        if !confirm.confirm(DELETE_PROMPT) {
            debug!(id = %id, "Delete cancelled");
            return Ok(false);
        }

        match self.api.delete(id).await {
            Ok(()) => {
                info!(id = %id, "Wine deleted");
                let _ = self.load_collection().await;
                Ok(true)
            }
            Err(e) => {
                error!(id = %id, error = %e, "Error deleting wine");
                self.apply(AppEvent::DeleteFailed(DELETE_FAILED.to_string()));
                Err(e)
            }
        }
    }

    pub fn dismiss_error(&self) {
        self.apply(AppEvent::ErrorDismissed);
    }

    /// Whether the view should scroll to the form. Reading clears the request.
    pub fn take_scroll_request(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let requested = state.scroll_to_top;
        if requested {
            state.apply(AppEvent::ScrollHandled);
        }
        requested
    }

    pub fn form_view(&self) -> FormView {
        self.read(|state| render::form_view(state, self.api.base_url()))
    }

    pub fn collection_view(&self) -> CollectionView {
        self.read(|state| render::collection_view(&state.wines, self.api.base_url()))
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::Notify;

    use winenotes_shared::{Photo, WineDraft, WineType};

    use super::*;
    use crate::state::FormState;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        List,
        Create(WineDraft),
        Update(WineId, WineDraft),
        Delete(WineId),
        Upload(String),
    }

    /// Holds `create` open until the test lets it finish.
    #[derive(Default)]
    struct Gate {
        entered: Notify,
        release: Notify,
    }

    /// In-memory stand-in for the server that records every call.
    #[derive(Default)]
    struct FakeApi {
        create_gate: Option<Gate>,
        calls: Mutex<Vec<Call>>,
        wines: Mutex<Vec<WineEntry>>,
        fail_list: Mutex<bool>,
        fail_save: bool,
        fail_delete: bool,
        fail_upload: bool,
    }

    impl FakeApi {
        fn with_wines(wines: Vec<WineEntry>) -> Self {
            Self {
                wines: Mutex::new(wines),
                ..Self::default()
            }
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
            self.calls().iter().filter(|c| pred(c)).count()
        }
    }

    impl WineApi for FakeApi {
        fn base_url(&self) -> &str {
            "http://localhost:8000"
        }

        async fn list(&self) -> Result<Vec<WineEntry>, ClientError> {
            self.record(Call::List);
            if *self.fail_list.lock().unwrap() {
                return Err(ClientError::Status(500));
            }
            Ok(self.wines.lock().unwrap().clone())
        }

        async fn create(&self, draft: &WineDraft) -> Result<(), ClientError> {
            self.record(Call::Create(draft.clone()));
            if let Some(gate) = &self.create_gate {
                gate.entered.notify_one();
                gate.release.notified().await;
            }
            if self.fail_save {
                return Err(ClientError::Status(500));
            }
            let mut wines = self.wines.lock().unwrap();
            let id = WineId::new((wines.len() + 1).to_string());
            let now = chrono::Utc::now();
            wines.push(WineEntry::from_draft(id, draft.clone(), now, now));
            Ok(())
        }

        async fn update(&self, id: &WineId, draft: &WineDraft) -> Result<(), ClientError> {
            self.record(Call::Update(id.clone(), draft.clone()));
            if self.fail_save {
                return Err(ClientError::Status(404));
            }
            Ok(())
        }

        async fn delete(&self, id: &WineId) -> Result<(), ClientError> {
            self.record(Call::Delete(id.clone()));
            if self.fail_delete {
                return Err(ClientError::Status(500));
            }
            self.wines.lock().unwrap().retain(|w| &w.id != id);
            Ok(())
        }

        async fn upload_photo(&self, photo: &PendingPhoto) -> Result<Photo, ClientError> {
            self.record(Call::Upload(photo.file_name.clone()));
            if self.fail_upload {
                return Err(ClientError::Status(500));
            }
            Ok(Photo::Remote(format!("/api/uploads/{}", photo.file_name)))
        }
    }

    fn entry(id: &str, rating: u8) -> WineEntry {
        WineEntry {
            id: WineId::new(id),
            name: format!("Wine {id}"),
            wine_type: WineType::Sparkling,
            region: "Champagne".into(),
            vintage: Some(2012),
            rating,
            price: Some(45.0),
            notes: None,
            photo: Some(Photo::Remote("/api/uploads/old.jpg".into())),
            created_at: None,
            updated_at: None,
        }
    }

    fn fill_form<A: WineApi>(ctl: &Controller<A>) {
        ctl.set_field(FormField::Name, "Sancerre");
        ctl.set_field(FormField::Type, "White");
        ctl.set_field(FormField::Region, "Loire");
        ctl.set_field(FormField::Vintage, "2020");
        ctl.set_field(FormField::Rating, "7");
        ctl.set_field(FormField::Price, "");
    }

    #[tokio::test]
    async fn test_submit_new_entry_creates_once_then_reloads_and_resets() {
        let ctl = Controller::new(FakeApi::default());
        fill_form(&ctl);

        ctl.submit().await.unwrap();

        let api = ctl.api();
        let creates: Vec<_> = api
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Create(d) => Some(d),
                _ => None,
            })
            .collect();
        assert_eq!(creates.len(), 1);
        assert_eq!(creates[0].vintage, Some(2020));
        assert_eq!(creates[0].rating, 7);
        assert_eq!(creates[0].price, None);
        assert_eq!(api.count(|c| matches!(c, Call::List)), 1);
        assert_eq!(api.count(|c| matches!(c, Call::Update(..))), 0);

        assert_eq!(ctl.state().form, FormState::default());
        assert_eq!(ctl.state().wines.len(), 1);
        assert!(!ctl.state().busy);
        assert!(ctl.state().error.is_none());
    }

    #[tokio::test]
    async fn test_submit_while_editing_updates_that_id() {
        let ctl = Controller::new(FakeApi::with_wines(vec![entry("42", 9)]));
        ctl.load_collection().await.unwrap();
        let wine = ctl.state().wines[0].clone();

        ctl.begin_edit(&wine);
        ctl.set_field(FormField::Price, "50.25");
        ctl.submit().await.unwrap();

        let calls = ctl.api().calls();
        assert_eq!(ctl.api().count(|c| matches!(c, Call::Create(_))), 0);
        let update = calls
            .iter()
            .find_map(|c| match c {
                Call::Update(id, d) => Some((id.clone(), d.clone())),
                _ => None,
            })
            .unwrap();
        assert_eq!(update.0, WineId::new("42"));
        assert_eq!(update.1.price, Some(50.25));
        assert_eq!(update.1.photo, wine.photo);
        assert!(ctl.state().form.editing_id.is_none());
    }

    #[tokio::test]
    async fn test_upload_failure_still_saves_with_previous_photo() {
        let api = FakeApi {
            fail_upload: true,
            ..FakeApi::with_wines(vec![entry("1", 8)])
        };
        let ctl = Controller::new(api);
        ctl.load_collection().await.unwrap();
        let wine = ctl.state().wines[0].clone();

        ctl.begin_edit(&wine);
        ctl.select_photo_bytes("new.png", b"png".to_vec());
        ctl.submit().await.unwrap();

        let calls = ctl.api().calls();
        assert!(calls.contains(&Call::Upload("new.png".into())));
        let saved = calls
            .iter()
            .find_map(|c| match c {
                Call::Update(_, d) => Some(d.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(saved.photo, Some(Photo::Remote("/api/uploads/old.jpg".into())));
        assert!(ctl.state().error.is_none());
    }

    #[tokio::test]
    async fn test_upload_failure_on_new_entry_saves_without_photo() {
        let api = FakeApi {
            fail_upload: true,
            ..FakeApi::default()
        };
        let ctl = Controller::new(api);
        fill_form(&ctl);
        ctl.select_photo_bytes("new.png", b"png".to_vec());

        ctl.submit().await.unwrap();

        let created = ctl
            .api()
            .calls()
            .into_iter()
            .find_map(|c| match c {
                Call::Create(d) => Some(d),
                _ => None,
            })
            .unwrap();
        assert_eq!(created.photo, None);
    }

    #[tokio::test]
    async fn test_uploaded_photo_is_stored_on_entry() {
        let ctl = Controller::new(FakeApi::default());
        fill_form(&ctl);
        ctl.select_photo_bytes("label.jpg", b"jpg".to_vec());
        assert!(ctl.state().form.preview.is_some());

        ctl.submit().await.unwrap();

        let calls = ctl.api().calls();
        assert!(matches!(calls[0], Call::Upload(_)));
        assert_eq!(
            ctl.state().wines[0].photo,
            Some(Photo::Remote("/api/uploads/label.jpg".into()))
        );
    }

    #[tokio::test]
    async fn test_save_failure_keeps_form_and_sets_error() {
        let api = FakeApi {
            fail_save: true,
            fail_upload: true,
            ..FakeApi::default()
        };
        let ctl = Controller::new(api);
        fill_form(&ctl);
        ctl.select_photo_bytes("keep.png", b"png".to_vec());
        let before = ctl.state().form.clone();

        assert!(ctl.submit().await.is_err());

        assert_eq!(ctl.state().error.as_deref(), Some(SAVE_FAILED));
        assert_eq!(ctl.state().form, before);
        assert!(ctl.state().form.pending_photo.is_some());
        assert!(!ctl.state().busy);
        assert_eq!(ctl.api().count(|c| matches!(c, Call::List)), 0);
    }

    #[tokio::test]
    async fn test_uploaded_photo_survives_failed_save() {
        let api = FakeApi {
            fail_save: true,
            ..FakeApi::default()
        };
        let ctl = Controller::new(api);
        fill_form(&ctl);
        ctl.select_photo_bytes("label.png", b"png".to_vec());

        assert!(ctl.submit().await.is_err());
        assert!(ctl.state().form.pending_photo.is_none());
        assert_eq!(
            ctl.state().form.photo,
            Some(Photo::Remote("/api/uploads/label.png".into()))
        );

        // Retrying does not upload again.
        let _ = ctl.submit().await;
        assert_eq!(ctl.api().count(|c| matches!(c, Call::Upload(_))), 1);
    }

    #[tokio::test]
    async fn test_invalid_form_issues_no_call() {
        let ctl = Controller::new(FakeApi::default());
        fill_form(&ctl);
        ctl.set_field(FormField::Rating, "11");

        assert!(matches!(ctl.submit().await, Err(ClientError::Invalid(_))));
        assert!(ctl.api().calls().is_empty());
        assert!(ctl.state().error.is_some());
        assert!(!ctl.state().busy);
    }

    #[tokio::test]
    async fn test_view_sees_save_in_flight_and_second_submit_is_refused() {
        let ctl = Controller::new(FakeApi {
            create_gate: Some(Gate::default()),
            ..FakeApi::default()
        });
        fill_form(&ctl);
        let gate = ctl.api().create_gate.as_ref().unwrap();

        let observe = async {
            gate.entered.notified().await;

            let view = ctl.form_view();
            assert_eq!(view.submit_label, "Saving...");
            assert!(view.submit_disabled);
            assert!(ctl.state().busy);
            assert!(ctl.shared_state().lock().unwrap().busy);

            let second = ctl.submit().await;
            gate.release.notify_one();
            second
        };
        let (first, second) = tokio::join!(ctl.submit(), observe);

        first.unwrap();
        assert!(matches!(second, Err(ClientError::Busy)));
        assert_eq!(ctl.api().count(|c| matches!(c, Call::Create(_))), 1);
        assert!(!ctl.state().busy);
        assert_eq!(ctl.form_view().submit_label, "Add Wine");
    }

    #[tokio::test]
    async fn test_begin_edit_then_reset_restores_defaults() {
        let ctl = Controller::new(FakeApi::default());
        let pristine = ctl.state().form.clone();

        ctl.begin_edit(&entry("5", 4));
        assert!(ctl.take_scroll_request());
        assert!(!ctl.take_scroll_request());
        ctl.reset_form();

        let state = ctl.state();
        let form = &state.form;
        assert_eq!(form, &pristine);
        assert_eq!(form.wine_type, "Red");
        assert_eq!(form.rating, "5");
        assert_eq!(form.vintage, current_year().to_string());
        assert!(form.editing_id.is_none());
        assert!(ctl.api().calls().is_empty());
    }

    #[tokio::test]
    async fn test_delete_without_confirmation_does_nothing() {
        let ctl = Controller::new(FakeApi::with_wines(vec![entry("1", 8)]));
        ctl.load_collection().await.unwrap();

        let deleted = ctl
            .delete_entry(&WineId::new("1"), &|_: &str| false)
            .await
            .unwrap();

        assert!(!deleted);
        assert_eq!(ctl.api().count(|c| matches!(c, Call::Delete(_))), 0);
        assert_eq!(ctl.state().wines.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_confirmed_reloads() {
        let ctl = Controller::new(FakeApi::with_wines(vec![entry("1", 8), entry("2", 3)]));
        ctl.load_collection().await.unwrap();

        let prompt = Mutex::new(String::new());
        let confirm = |p: &str| {
            *prompt.lock().unwrap() = p.to_string();
            true
        };
        assert!(ctl.delete_entry(&WineId::new("1"), &confirm).await.unwrap());

        assert_eq!(*prompt.lock().unwrap(), DELETE_PROMPT);
        assert_eq!(ctl.state().wines.len(), 1);
        assert_eq!(ctl.state().wines[0].id, WineId::new("2"));
        assert_eq!(ctl.api().count(|c| matches!(c, Call::List)), 2);
    }

    #[tokio::test]
    async fn test_delete_failure_keeps_cache() {
        let api = FakeApi {
            fail_delete: true,
            ..FakeApi::with_wines(vec![entry("1", 8)])
        };
        let ctl = Controller::new(api);
        ctl.load_collection().await.unwrap();

        assert!(ctl
            .delete_entry(&WineId::new("1"), &|_: &str| true)
            .await
            .is_err());
        assert_eq!(ctl.state().error.as_deref(), Some(DELETE_FAILED));
        assert_eq!(ctl.state().wines.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_reload_keeps_cache_and_error_is_dismissable() {
        let ctl = Controller::new(FakeApi::with_wines(vec![entry("1", 8), entry("2", 3)]));
        ctl.load_collection().await.unwrap();

        *ctl.api().fail_list.lock().unwrap() = true;
        assert!(ctl.load_collection().await.is_err());
        assert_eq!(ctl.state().wines.len(), 2);
        assert_eq!(ctl.state().error.as_deref(), Some(LOAD_FAILED));

        ctl.dismiss_error();
        assert!(ctl.state().error.is_none());
        assert_eq!(ctl.state().wines.len(), 2);
    }

    #[tokio::test]
    async fn test_collection_view_star_counts() {
        let ctl = Controller::new(FakeApi::with_wines(vec![entry("1", 8), entry("2", 3)]));
        ctl.load_collection().await.unwrap();

        let stars: Vec<_> = ctl.collection_view().cards.iter().map(|c| c.stars).collect();
        assert_eq!(stars, [4, 2]);
        assert_eq!(
            ctl.collection_view().cards[0].photo_src.as_deref(),
            Some("http://localhost:8000/api/uploads/old.jpg")
        );
    }

    #[tokio::test]
    async fn test_select_missing_file_sets_error() {
        let ctl = Controller::new(FakeApi::default());
        let dir = tempfile::tempdir().unwrap();

        let result = ctl.select_photo(dir.path().join("missing.jpg")).await;
        assert!(matches!(result, Err(ClientError::Io(_))));
        assert_eq!(ctl.state().error.as_deref(), Some(PHOTO_READ_FAILED));
        assert!(ctl.state().form.pending_photo.is_none());
    }

    #[tokio::test]
    async fn test_select_photo_reads_file_without_network() {
        let ctl = Controller::new(FakeApi::default());
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("label.png");
        std::fs::write(&path, b"abc").unwrap();

        ctl.select_photo(&path).await.unwrap();

        let state = ctl.state();
        let form = &state.form;
        assert_eq!(form.pending_photo.as_ref().unwrap().file_name, "label.png");
        assert_eq!(
            form.preview.as_ref().map(Photo::as_str),
            Some("data:image/png;base64,YWJj")
        );
        assert!(ctl.api().calls().is_empty());
    }
}
