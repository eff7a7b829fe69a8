//! Profile domain module.
//!
//! The profile record inferred from a photo, its closed category set, the
//! display languages and the uploaded image.

mod category;
mod image;
mod language;
mod record;

pub use category::Category;
pub use image::{ImageDatum, MAX_IMAGE_BYTES};
pub use language::Language;
pub use record::{slugify, ProfileEdit, ProfileField, ProfileRecord};
