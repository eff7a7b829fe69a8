//! Card module - The edit/translation state machine for a profile card.
//!
//! A card is either showing its canonical record (editable) or a derived,
//! translated view of it (read-only). Translations are issued as tickets and
//! committed only while they are still the latest request.

mod editor;
mod errors;

pub use editor::{CardEditor, CardView, LanguageRequest, LanguageSwitch, TranslationTicket};
pub use errors::EditorError;
