//! FlowController - Owns the card session from upload to export.
//!
//! One controller holds one in-memory session: the uploaded image, the
//! application status and, once inference succeeded, the card editor.
//!
//! Session state sits behind a `std::sync::Mutex` that is never held across
//! an `.await`. External calls (inference, translation) run unlocked; their
//! results are committed under the lock only after checking that the
//! session has not moved on in the meantime:
//!
//! - inference carries the session epoch, bumped by upload and reset
//! - translation carries the editor's ticket (card id and request token)
//!
//! A caller may drop either future mid-call (client gone, request timeout).
//! Drop guards then undo what was started: an abandoned inference returns
//! the session to its prior status with the image kept, and an abandoned
//! translation releases the editor's pending request.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::CardError;
use crate::domain::card::{CardEditor, LanguageRequest, LanguageSwitch, TranslationTicket};
use crate::domain::flow::AppStatus;
use crate::domain::foundation::{CardId, StateMachine, Timestamp};
use crate::domain::profile::{ImageDatum, Language, ProfileEdit, ProfileField, ProfileRecord};
use crate::ports::{
    InferenceRequest, ProfileInference, ProfileTranslator, TranslationRequest,
};

#[derive(Debug, Default)]
struct Session {
    status: AppStatus,
    image: Option<ImageDatum>,
    editor: Option<CardEditor>,
    error: Option<String>,
    epoch: u64,
}

impl Session {
    fn editor_mut(&mut self) -> Result<&mut CardEditor, CardError> {
        self.editor.as_mut().ok_or(CardError::NoProfile)
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            error: self.error.clone(),
            has_image: self.image.is_some(),
            image_fingerprint: self.image.as_ref().map(ImageDatum::fingerprint),
            card: self.editor.as_ref().map(CardSnapshot::from),
        }
    }
}

fn lock_session(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Rolls an inference back to the status it started from unless disarmed.
struct InferenceAttempt<'a> {
    session: &'a Mutex<Session>,
    epoch: u64,
    previous_status: AppStatus,
    previous_error: Option<String>,
    armed: bool,
}

impl InferenceAttempt<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InferenceAttempt<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut session = lock_session(self.session);
        if session.epoch == self.epoch && session.status.is_processing() {
            tracing::info!(status = %self.previous_status, "inference abandoned, restoring status");
            session.status = self.previous_status;
            session.error = self.previous_error.take();
        }
    }
}

/// Releases the editor's pending translation unless disarmed.
struct TranslationAttempt<'a> {
    session: &'a Mutex<Session>,
    ticket: &'a TranslationTicket,
    armed: bool,
}

impl TranslationAttempt<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for TranslationAttempt<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut session = lock_session(self.session);
        if let Some(editor) = session.editor.as_mut() {
            if editor.abandon(self.ticket) {
                tracing::info!(token = %self.ticket.token, "translation abandoned");
            }
        }
    }
}

/// Read-only view of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub status: AppStatus,
    /// User-facing message of the last inference failure.
    pub error: Option<String>,
    pub has_image: bool,
    pub image_fingerprint: Option<String>,
    pub card: Option<CardSnapshot>,
}

/// Read-only view of the card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardSnapshot {
    pub card_id: CardId,
    pub language: Language,
    /// Whether the displayed record is the editable canonical one.
    pub editable: bool,
    pub editing: Option<ProfileField>,
    pub pending_language: Option<Language>,
    /// The displayed record.
    pub record: ProfileRecord,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&CardEditor> for CardSnapshot {
    fn from(editor: &CardEditor) -> Self {
        Self {
            card_id: editor.id(),
            language: editor.language(),
            editable: editor.is_canonical() && editor.pending_language().is_none(),
            editing: editor.editing(),
            pending_language: editor.pending_language(),
            record: editor.displayed().clone(),
            created_at: *editor.created_at(),
            updated_at: *editor.updated_at(),
        }
    }
}

/// What is on screen, for rendering and export.
#[derive(Debug, Clone)]
pub struct DisplayedCard {
    pub card_id: CardId,
    pub record: ProfileRecord,
    pub image: Option<ImageDatum>,
    pub language: Language,
}

/// Result of a language switch.
#[derive(Debug, Clone, Serialize)]
pub struct LanguageChange {
    pub outcome: LanguageSwitch,
    pub snapshot: SessionSnapshot,
}

/// Application flow controller.
pub struct FlowController {
    inference: Arc<dyn ProfileInference>,
    translator: Arc<dyn ProfileTranslator>,
    session: Mutex<Session>,
}

impl FlowController {
    pub fn new(inference: Arc<dyn ProfileInference>, translator: Arc<dyn ProfileTranslator>) -> Self {
        Self {
            inference,
            translator,
            session: Mutex::new(Session::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Session> {
        lock_session(&self.session)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    pub fn status(&self) -> AppStatus {
        self.lock().status
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Image and inference
    // ════════════════════════════════════════════════════════════════════════════

    /// Stores a new image and starts over from `Idle`; any card is dropped.
    ///
    /// # Errors
    ///
    /// `AlreadyProcessing` while inference runs.
    pub fn upload_image(&self, image: ImageDatum) -> Result<SessionSnapshot, CardError> {
        let mut session = self.lock();
        if session.status.is_processing() {
            return Err(CardError::AlreadyProcessing);
        }

        tracing::info!(image_fingerprint = %image.fingerprint(), bytes = image.byte_len(), "image uploaded");
        session.image = Some(image);
        session.editor = None;
        session.error = None;
        session.status = AppStatus::Idle;
        session.epoch += 1;
        Ok(session.snapshot())
    }

    /// Swaps the photo without touching the record or the status.
    pub fn replace_image(&self, image: ImageDatum) -> SessionSnapshot {
        let mut session = self.lock();
        tracing::info!(image_fingerprint = %image.fingerprint(), "image replaced");
        session.image = Some(image);
        session.snapshot()
    }

    /// Runs inference on the stored image.
    ///
    /// On success the card editor starts in the source language. On failure
    /// the session moves to `Error` and keeps the image for a retry. If the
    /// returned future is dropped before inference finishes, the session
    /// goes back to the status it had, image included.
    ///
    /// # Errors
    ///
    /// - `NoImage` without an uploaded image
    /// - `AlreadyProcessing` while another inference runs
    /// - `InvalidState` when a card already exists
    /// - `Inference` when the inference call fails
    pub async fn process_image(&self) -> Result<SessionSnapshot, CardError> {
        let (image, attempt, card_id) = {
            let mut session = self.lock();
            let image = session.image.clone().ok_or(CardError::NoImage)?;
            if session.status.is_processing() {
                return Err(CardError::AlreadyProcessing);
            }
            let current = session.status;
            session.status = current
                .transition_to(AppStatus::Processing)
                .map_err(|_| CardError::InvalidState {
                    status: current,
                    action: "process the image",
                })?;
            let attempt = InferenceAttempt {
                session: &self.session,
                epoch: session.epoch,
                previous_status: current,
                previous_error: session.error.take(),
                armed: true,
            };
            (image, attempt, CardId::new())
        };
        let epoch = attempt.epoch;

        tracing::info!(%card_id, image_fingerprint = %image.fingerprint(), "inference started");
        let result = self
            .inference
            .infer(InferenceRequest::new(&image, card_id))
            .await;

        let mut session = self.lock();
        attempt.disarm();
        if session.epoch != epoch {
            tracing::info!(%card_id, "inference finished after the session changed, discarding");
            return Ok(session.snapshot());
        }

        match result {
            Ok(record) => {
                session.editor = Some(CardEditor::with_id(card_id, record));
                session.status = AppStatus::Success;
                tracing::info!(%card_id, "inference succeeded");
                Ok(session.snapshot())
            }
            Err(err) => {
                tracing::warn!(%card_id, error = %err, "inference failed");
                session.error = Some(err.user_message().to_string());
                session.status = AppStatus::Error;
                Err(err.into())
            }
        }
    }

    /// Returns to `Idle` with no image and no card. Always succeeds.
    pub fn reset(&self) -> SessionSnapshot {
        let mut session = self.lock();
        let epoch = session.epoch + 1;
        *session = Session {
            epoch,
            ..Session::default()
        };
        tracing::info!("session reset");
        session.snapshot()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Card editing
    // ════════════════════════════════════════════════════════════════════════════

    /// Applies an edit to the canonical record.
    pub fn edit(&self, edit: &ProfileEdit) -> Result<SessionSnapshot, CardError> {
        let mut session = self.lock();
        let editor = session.editor_mut()?;
        editor.apply_edit(edit)?;
        tracing::debug!(card_id = %editor.id(), field = %edit.field(), "card edited");
        Ok(session.snapshot())
    }

    /// Opens or closes the editor for one field.
    pub fn toggle_editing(&self, field: ProfileField) -> Result<SessionSnapshot, CardError> {
        let mut session = self.lock();
        session.editor_mut()?.toggle_editing(field)?;
        Ok(session.snapshot())
    }

    /// Shows the card in `target`, translating the canonical record if needed.
    ///
    /// Concurrent switches are safe: only the latest request may change the
    /// view, and results of earlier ones are dropped. Dropping the returned
    /// future mid-translation releases the pending request.
    pub async fn switch_language(&self, target: Language) -> Result<LanguageChange, CardError> {
        let ticket = {
            let mut session = self.lock();
            let request = session.editor_mut()?.request_language(target);
            match request {
                LanguageRequest::Settled(outcome) => {
                    return Ok(LanguageChange {
                        outcome,
                        snapshot: session.snapshot(),
                    })
                }
                LanguageRequest::Translate(ticket) => ticket,
            }
        };

        tracing::info!(card_id = %ticket.card_id, token = %ticket.token, language = %target, "translation requested");
        let attempt = TranslationAttempt {
            session: &self.session,
            ticket: &ticket,
            armed: true,
        };
        let result = self
            .translator
            .translate(TranslationRequest::new(&ticket.source, ticket.target, ticket.card_id))
            .await;

        let mut session = self.lock();
        attempt.disarm();
        let outcome = match session.editor.as_mut() {
            Some(editor) => editor.complete_translation(&ticket, result),
            None => Ok(LanguageSwitch::Superseded),
        };

        match outcome {
            Ok(outcome) => {
                if outcome == LanguageSwitch::Superseded {
                    tracing::debug!(token = %ticket.token, "stale translation discarded");
                }
                Ok(LanguageChange {
                    outcome,
                    snapshot: session.snapshot(),
                })
            }
            Err(err) => {
                tracing::warn!(token = %ticket.token, error = %err, "translation failed");
                Err(err.into())
            }
        }
    }

    /// The record on screen with its photo and language.
    pub fn displayed_card(&self) -> Result<DisplayedCard, CardError> {
        let session = self.lock();
        let editor = session.editor.as_ref().ok_or(CardError::NoProfile)?;
        Ok(DisplayedCard {
            card_id: editor.id(),
            record: editor.displayed().clone(),
            image: session.image.clone(),
            language: editor.language(),
        })
    }
}
