//! CardEditor - Edit/translation state machine for one profile card.
//!
//! The editor owns the canonical snapshot (the record in the source
//! language) and the current view. In `Canonical` the displayed record is
//! the snapshot itself; in `Derived` it is a translated, read-only copy.
//!
//! Translation is split in two steps so the external call can run without
//! holding the editor: `request_language` issues a [`TranslationTicket`]
//! carrying a fresh token and a copy of the snapshot, and
//! `complete_translation` commits the result only if that token is still
//! the one awaited. Anything else is discarded as stale.

use serde::Serialize;

use super::EditorError;
use crate::domain::foundation::{CardId, RequestToken, Timestamp};
use crate::domain::profile::{Language, ProfileEdit, ProfileField, ProfileRecord};
use crate::ports::TranslationError;

/// Which record is on display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardView {
    /// The canonical snapshot, editable.
    Canonical,
    /// A translation of the canonical snapshot, read-only.
    Derived {
        language: Language,
        record: ProfileRecord,
    },
}

impl CardView {
    pub fn language(&self) -> Language {
        match self {
            CardView::Canonical => Language::SOURCE,
            CardView::Derived { language, .. } => *language,
        }
    }
}

/// A translation the caller must perform and hand back.
#[derive(Debug, Clone)]
pub struct TranslationTicket {
    pub card_id: CardId,
    pub token: RequestToken,
    pub target: Language,
    /// Copy of the canonical snapshot at issue time.
    pub source: ProfileRecord,
}

/// Outcome of [`CardEditor::request_language`].
#[derive(Debug, Clone)]
pub enum LanguageRequest {
    /// Settled without a network call.
    Settled(LanguageSwitch),
    /// A translation has to be performed.
    Translate(TranslationTicket),
}

/// What a language request or completion did to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "language", rename_all = "snake_case")]
pub enum LanguageSwitch {
    /// Now showing a translation.
    Switched(Language),
    /// Back to the canonical snapshot.
    Restored,
    /// Already showing the requested language.
    Unchanged,
    /// A translation to this language is already awaited.
    InFlight(Language),
    /// The result arrived for a request that is no longer the latest.
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingTranslation {
    token: RequestToken,
    target: Language,
}

/// Edit/translation state machine for one card.
///
/// # Invariants
///
/// - the canonical snapshot is only changed by `apply_edit`, and only in `Canonical`
/// - at most one translation is awaited; only its token may commit
/// - the field editor is only open in `Canonical`
#[derive(Debug, Clone)]
pub struct CardEditor {
    id: CardId,
    canonical: ProfileRecord,
    view: CardView,
    editing: Option<ProfileField>,
    last_issued: RequestToken,
    pending: Option<PendingTranslation>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl CardEditor {
    /// Starts an editor in `Canonical` with a freshly inferred record.
    pub fn new(record: ProfileRecord) -> Self {
        Self::with_id(CardId::new(), record)
    }

    pub fn with_id(id: CardId, record: ProfileRecord) -> Self {
        let now = Timestamp::now();
        Self {
            id,
            canonical: record,
            view: CardView::Canonical,
            editing: None,
            last_issued: RequestToken::ZERO,
            pending: None,
            created_at: now,
            updated_at: now,
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Accessors
    // ════════════════════════════════════════════════════════════════════════════

    pub fn id(&self) -> CardId {
        self.id
    }

    /// The canonical snapshot.
    pub fn canonical(&self) -> &ProfileRecord {
        &self.canonical
    }

    /// The record currently on display.
    pub fn displayed(&self) -> &ProfileRecord {
        match &self.view {
            CardView::Canonical => &self.canonical,
            CardView::Derived { record, .. } => record,
        }
    }

    pub fn view(&self) -> &CardView {
        &self.view
    }

    /// Language of the displayed record.
    pub fn language(&self) -> Language {
        self.view.language()
    }

    pub fn is_canonical(&self) -> bool {
        matches!(self.view, CardView::Canonical)
    }

    /// Field whose editor is open, if any.
    pub fn editing(&self) -> Option<ProfileField> {
        self.editing
    }

    /// Target of the awaited translation, if any.
    pub fn pending_language(&self) -> Option<Language> {
        self.pending.map(|p| p.target)
    }

    /// Most recently issued translation token.
    pub fn last_issued_token(&self) -> RequestToken {
        self.last_issued
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Editing
    // ════════════════════════════════════════════════════════════════════════════

    /// Applies an edit to the canonical snapshot.
    ///
    /// # Errors
    ///
    /// - `ReadOnlyView` while a translation is displayed
    /// - `TranslationInFlight` while a translation is awaited
    /// - `Validation` if the edit breaks a record rule; nothing changes
    pub fn apply_edit(&mut self, edit: &ProfileEdit) -> Result<(), EditorError> {
        self.ensure_editable()?;
        self.canonical.apply(edit)?;
        self.touch();
        Ok(())
    }

    /// Opens the editor for `field`, or closes it if it is already open.
    ///
    /// Returns the field that is open afterwards.
    pub fn toggle_editing(&mut self, field: ProfileField) -> Result<Option<ProfileField>, EditorError> {
        self.ensure_editable()?;
        self.editing = if self.editing == Some(field) {
            None
        } else {
            Some(field)
        };
        Ok(self.editing)
    }

    fn ensure_editable(&self) -> Result<(), EditorError> {
        if let CardView::Derived { language, .. } = &self.view {
            return Err(EditorError::ReadOnlyView {
                language: *language,
            });
        }
        if let Some(pending) = self.pending {
            return Err(EditorError::TranslationInFlight {
                language: pending.target,
            });
        }
        Ok(())
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Language switching
    // ════════════════════════════════════════════════════════════════════════════

    /// Asks for the card in `target`.
    ///
    /// Switching to the source language is settled locally and supersedes any
    /// awaited translation. Any other language issues a ticket unless the view
    /// already shows it or a translation to it is already awaited.
    pub fn request_language(&mut self, target: Language) -> LanguageRequest {
        if target.is_source() {
            self.pending = None;
            return LanguageRequest::Settled(match self.view {
                CardView::Canonical => LanguageSwitch::Unchanged,
                CardView::Derived { .. } => {
                    self.view = CardView::Canonical;
                    self.touch();
                    LanguageSwitch::Restored
                }
            });
        }

        if let Some(pending) = self.pending {
            if pending.target == target {
                return LanguageRequest::Settled(LanguageSwitch::InFlight(target));
            }
        }

        if self.language() == target {
            self.pending = None;
            return LanguageRequest::Settled(LanguageSwitch::Unchanged);
        }

        let token = self.last_issued.next();
        self.last_issued = token;
        self.pending = Some(PendingTranslation { token, target });

        LanguageRequest::Translate(TranslationTicket {
            card_id: self.id,
            token,
            target,
            source: self.canonical.clone(),
        })
    }

    /// Hands back the outcome of a ticket.
    ///
    /// Results for any ticket other than the awaited one are dropped and
    /// reported as `Superseded`, successes and failures alike.
    ///
    /// # Errors
    ///
    /// `Translation` when the awaited translation failed or does not have the
    /// snapshot's shape. The view is left as it was.
    pub fn complete_translation(
        &mut self,
        ticket: &TranslationTicket,
        result: Result<ProfileRecord, TranslationError>,
    ) -> Result<LanguageSwitch, EditorError> {
        let awaited = self
            .pending
            .map(|p| p.token == ticket.token)
            .unwrap_or(false);
        if ticket.card_id != self.id || !awaited {
            return Ok(LanguageSwitch::Superseded);
        }
        self.pending = None;

        let record = result?;
        let expected = self.canonical.achievements.len();
        if record.achievements.len() != expected {
            return Err(TranslationError::ShapeMismatch {
                expected,
                actual: record.achievements.len(),
            }
            .into());
        }

        self.view = CardView::Derived {
            language: ticket.target,
            record,
        };
        self.editing = None;
        self.touch();
        Ok(LanguageSwitch::Switched(ticket.target))
    }

    /// Withdraws a ticket whose result will never be handed back.
    ///
    /// Clears the awaited translation only if it is still this ticket's, so a
    /// newer request is left alone. Returns whether anything was cleared.
    pub fn abandon(&mut self, ticket: &TranslationTicket) -> bool {
        let awaited = ticket.card_id == self.id
            && self.pending.map(|p| p.token == ticket.token).unwrap_or(false);
        if awaited {
            self.pending = None;
        }
        awaited
    }

    fn touch(&mut self) {
        self.updated_at = Timestamp::now();
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn amina() -> ProfileRecord {
        ProfileRecord {
            name: "Amina Ali".to_string(),
            tagline: "Dhakhtar iyo hoggaamiye".to_string(),
            category: "Caafimaadka (Health)".to_string(),
            summary: "Waxay aasaastay rug caafimaad.".to_string(),
            achievements: vec!["Founded a clinic".to_string(), "Published a paper".to_string()],
            quote: "Caafimaadku waa hanti.".to_string(),
            source_attestation: "Warbixin dadweyne".to_string(),
        }
    }

    fn in_english(record: &ProfileRecord) -> ProfileRecord {
        ProfileRecord {
            tagline: "Doctor and leader".to_string(),
            category: "Health".to_string(),
            summary: "She founded a clinic.".to_string(),
            quote: "Health is wealth.".to_string(),
            source_attestation: "Public report".to_string(),
            ..record.clone()
        }
    }

    fn ticket(request: LanguageRequest) -> TranslationTicket {
        match request {
            LanguageRequest::Translate(ticket) => ticket,
            LanguageRequest::Settled(outcome) => panic!("expected a ticket, got {:?}", outcome),
        }
    }

    fn settled(request: LanguageRequest) -> LanguageSwitch {
        match request {
            LanguageRequest::Settled(outcome) => outcome,
            LanguageRequest::Translate(t) => panic!("expected no ticket, got {:?}", t.token),
        }
    }

    fn switch_to_english(editor: &mut CardEditor) {
        let t = ticket(editor.request_language(Language::En));
        let translated = in_english(&t.source);
        assert_eq!(
            editor.complete_translation(&t, Ok(translated)).unwrap(),
            LanguageSwitch::Switched(Language::En)
        );
    }

    // ───────────────────────────────────────────────────────────────
    // Construction
    // ───────────────────────────────────────────────────────────────

    #[test]
    fn new_editor_starts_canonical() {
        let editor = CardEditor::new(amina());
        assert!(editor.is_canonical());
        assert_eq!(editor.language(), Language::So);
        assert_eq!(editor.displayed(), editor.canonical());
        assert_eq!(editor.editing(), None);
        assert_eq!(editor.pending_language(), None);
        assert_eq!(editor.last_issued_token(), RequestToken::ZERO);
    }

    // ───────────────────────────────────────────────────────────────
    // Editing
    // ───────────────────────────────────────────────────────────────

    #[test]
    fn edit_in_canonical_updates_displayed_record() {
        let mut editor = CardEditor::new(amina());
        editor
            .apply_edit(&ProfileEdit::set(ProfileField::Name, "Amina H. Ali"))
            .unwrap();
        assert_eq!(editor.canonical().name, "Amina H. Ali");
        assert_eq!(editor.displayed().name, "Amina H. Ali");
    }

    #[test]
    fn invalid_edit_leaves_snapshot_untouched() {
        let mut editor = CardEditor::new(amina());
        let err = editor
            .apply_edit(&ProfileEdit::set(ProfileField::Name, "   "))
            .unwrap_err();
        assert!(matches!(err, EditorError::Validation(_)));
        assert_eq!(editor.canonical(), &amina());
    }

    #[test]
    fn edit_in_derived_view_is_refused() {
        let mut editor = CardEditor::new(amina());
        switch_to_english(&mut editor);

        let err = editor
            .apply_edit(&ProfileEdit::set(ProfileField::Quote, "Changed"))
            .unwrap_err();
        assert!(matches!(
            err,
            EditorError::ReadOnlyView {
                language: Language::En
            }
        ));
        assert_eq!(editor.canonical(), &amina());
    }

    #[test]
    fn edit_while_translation_awaited_is_refused() {
        let mut editor = CardEditor::new(amina());
        let _ticket = ticket(editor.request_language(Language::Ar));

        let err = editor
            .apply_edit(&ProfileEdit::set(ProfileField::Tagline, "x"))
            .unwrap_err();
        assert!(matches!(
            err,
            EditorError::TranslationInFlight {
                language: Language::Ar
            }
        ));
    }

    #[test]
    fn toggle_editing_opens_and_closes() {
        let mut editor = CardEditor::new(amina());
        assert_eq!(
            editor.toggle_editing(ProfileField::Summary).unwrap(),
            Some(ProfileField::Summary)
        );
        assert_eq!(
            editor.toggle_editing(ProfileField::Quote).unwrap(),
            Some(ProfileField::Quote)
        );
        assert_eq!(editor.toggle_editing(ProfileField::Quote).unwrap(), None);
    }

    #[test]
    fn entering_derived_view_closes_field_editor() {
        let mut editor = CardEditor::new(amina());
        editor.toggle_editing(ProfileField::Summary).unwrap();
        switch_to_english(&mut editor);

        assert_eq!(editor.editing(), None);
        assert!(editor.toggle_editing(ProfileField::Summary).is_err());
    }

    // ───────────────────────────────────────────────────────────────
    // Language switching
    // ───────────────────────────────────────────────────────────────

    #[test]
    fn ticket_carries_canonical_snapshot() {
        let mut editor = CardEditor::new(amina());
        switch_to_english(&mut editor);

        let t = ticket(editor.request_language(Language::Tr));
        assert_eq!(t.source, amina());
        assert_eq!(t.target, Language::Tr);
        assert_eq!(t.card_id, editor.id());
        assert_eq!(t.token.value(), 2);
    }

    #[test]
    fn switch_back_to_source_restores_snapshot_without_ticket() {
        let mut editor = CardEditor::new(amina());
        switch_to_english(&mut editor);
        assert_eq!(editor.displayed().quote, "Health is wealth.");

        assert_eq!(
            settled(editor.request_language(Language::So)),
            LanguageSwitch::Restored
        );
        assert!(editor.is_canonical());
        assert_eq!(editor.displayed(), &amina());
    }

    #[test]
    fn source_request_in_canonical_is_noop() {
        let mut editor = CardEditor::new(amina());
        assert_eq!(
            settled(editor.request_language(Language::So)),
            LanguageSwitch::Unchanged
        );
        assert_eq!(editor.last_issued_token(), RequestToken::ZERO);
    }

    #[test]
    fn repeated_request_coalesces() {
        let mut editor = CardEditor::new(amina());
        let t = ticket(editor.request_language(Language::En));
        assert_eq!(
            settled(editor.request_language(Language::En)),
            LanguageSwitch::InFlight(Language::En)
        );
        assert_eq!(editor.last_issued_token(), t.token);
    }

    #[test]
    fn request_for_displayed_language_is_noop() {
        let mut editor = CardEditor::new(amina());
        switch_to_english(&mut editor);
        let before = editor.last_issued_token();

        assert_eq!(
            settled(editor.request_language(Language::En)),
            LanguageSwitch::Unchanged
        );
        assert_eq!(editor.last_issued_token(), before);
    }

    #[test]
    fn stale_success_is_discarded() {
        let mut editor = CardEditor::new(amina());
        let first = ticket(editor.request_language(Language::Ar));
        let second = ticket(editor.request_language(Language::Zh));
        assert!(second.token > first.token);

        let mut chinese = amina();
        chinese.tagline = "医生".to_string();
        assert_eq!(
            editor.complete_translation(&second, Ok(chinese.clone())).unwrap(),
            LanguageSwitch::Switched(Language::Zh)
        );

        let mut arabic = amina();
        arabic.tagline = "طبيبة".to_string();
        assert_eq!(
            editor.complete_translation(&first, Ok(arabic)).unwrap(),
            LanguageSwitch::Superseded
        );
        assert_eq!(editor.language(), Language::Zh);
        assert_eq!(editor.displayed(), &chinese);
    }

    #[test]
    fn stale_result_arriving_first_is_discarded() {
        let mut editor = CardEditor::new(amina());
        let first = ticket(editor.request_language(Language::Ar));
        let second = ticket(editor.request_language(Language::Zh));

        assert_eq!(
            editor.complete_translation(&first, Ok(amina())).unwrap(),
            LanguageSwitch::Superseded
        );
        assert!(editor.is_canonical());
        assert_eq!(editor.pending_language(), Some(Language::Zh));

        editor.complete_translation(&second, Ok(amina())).unwrap();
        assert_eq!(editor.language(), Language::Zh);
    }

    #[test]
    fn stale_failure_is_discarded() {
        let mut editor = CardEditor::new(amina());
        let first = ticket(editor.request_language(Language::Ar));
        let _second = ticket(editor.request_language(Language::Tr));

        let outcome = editor
            .complete_translation(&first, Err(TranslationError::EmptyResponse))
            .unwrap();
        assert_eq!(outcome, LanguageSwitch::Superseded);
        assert_eq!(editor.pending_language(), Some(Language::Tr));
    }

    #[test]
    fn return_to_source_supersedes_awaited_translation() {
        let mut editor = CardEditor::new(amina());
        let t = ticket(editor.request_language(Language::En));
        settled(editor.request_language(Language::So));

        assert_eq!(
            editor.complete_translation(&t, Ok(in_english(&t.source))).unwrap(),
            LanguageSwitch::Superseded
        );
        assert!(editor.is_canonical());
    }

    #[test]
    fn request_for_displayed_language_supersedes_other_pending() {
        let mut editor = CardEditor::new(amina());
        switch_to_english(&mut editor);
        let arabic = ticket(editor.request_language(Language::Ar));

        assert_eq!(
            settled(editor.request_language(Language::En)),
            LanguageSwitch::Unchanged
        );
        assert_eq!(
            editor.complete_translation(&arabic, Ok(amina())).unwrap(),
            LanguageSwitch::Superseded
        );
        assert_eq!(editor.language(), Language::En);
    }

    #[test]
    fn failed_translation_keeps_prior_view() {
        let mut editor = CardEditor::new(amina());
        switch_to_english(&mut editor);
        let before = editor.displayed().clone();

        let t = ticket(editor.request_language(Language::Tr));
        let err = editor
            .complete_translation(&t, Err(TranslationError::malformed("not json")))
            .unwrap_err();
        assert!(matches!(err, EditorError::Translation(_)));
        assert_eq!(editor.language(), Language::En);
        assert_eq!(editor.displayed(), &before);
        assert_eq!(editor.pending_language(), None);
    }

    #[test]
    fn translation_with_different_achievement_count_is_rejected() {
        let mut editor = CardEditor::new(amina());
        let t = ticket(editor.request_language(Language::En));
        let mut translated = in_english(&t.source);
        translated.achievements.push("Extra".to_string());

        let err = editor.complete_translation(&t, Ok(translated)).unwrap_err();
        assert!(matches!(
            err,
            EditorError::Translation(TranslationError::ShapeMismatch {
                expected: 2,
                actual: 3
            })
        ));
        assert!(editor.is_canonical());
    }

    #[test]
    fn ticket_from_another_card_is_ignored() {
        let mut editor = CardEditor::new(amina());
        let mut other = CardEditor::new(amina());
        let foreign = ticket(other.request_language(Language::En));
        let _own = ticket(editor.request_language(Language::En));

        assert_eq!(
            editor.complete_translation(&foreign, Ok(amina())).unwrap(),
            LanguageSwitch::Superseded
        );
    }

    #[test]
    fn edit_then_translate_then_return_keeps_edit() {
        let mut editor = CardEditor::new(amina());
        editor
            .apply_edit(&ProfileEdit::set(ProfileField::Name, "Amina H. Ali"))
            .unwrap();

        let t = ticket(editor.request_language(Language::En));
        assert_eq!(t.source.name, "Amina H. Ali");
        let translated = in_english(&t.source);
        editor.complete_translation(&t, Ok(translated)).unwrap();

        settled(editor.request_language(Language::So));
        assert_eq!(editor.displayed().name, "Amina H. Ali");
        assert_eq!(
            editor.displayed().achievements,
            vec!["Founded a clinic", "Published a paper"]
        );
    }

    #[test]
    fn abandoned_ticket_unblocks_editing_and_retranslation() {
        let mut editor = CardEditor::new(amina());
        let t = ticket(editor.request_language(Language::En));

        assert!(editor.abandon(&t));
        assert!(editor.pending_language().is_none());
        assert!(editor
            .apply_edit(&ProfileEdit::set(ProfileField::Quote, "Dadaal."))
            .is_ok());

        let retry = ticket(editor.request_language(Language::En));
        assert!(retry.token > t.token);
        assert_eq!(
            editor.complete_translation(&t, Ok(in_english(&t.source))).unwrap(),
            LanguageSwitch::Superseded
        );
    }

    #[test]
    fn abandoning_superseded_ticket_keeps_newer_request() {
        let mut editor = CardEditor::new(amina());
        let english = ticket(editor.request_language(Language::En));
        let _arabic = ticket(editor.request_language(Language::Ar));

        assert!(!editor.abandon(&english));
        assert_eq!(editor.pending_language(), Some(Language::Ar));
    }

    #[test]
    fn language_switch_serializes_with_tag() {
        let json = serde_json::to_value(LanguageSwitch::Switched(Language::Ar)).unwrap();
        assert_eq!(json, serde_json::json!({"outcome": "switched", "language": "ar"}));
        let json = serde_json::to_value(LanguageSwitch::Restored).unwrap();
        assert_eq!(json, serde_json::json!({"outcome": "restored"}));
    }
}
