//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, state machine, errors)
//! - `profile` - The profile record, categories, languages and the uploaded image
//! - `card` - Edit/translation state machine over a profile record
//! - `flow` - Application status lifecycle

pub mod card;
pub mod flow;
pub mod foundation;
pub mod profile;
