//! Profile Card - Photo to profile card generator
//!
//! A photo goes through AI inference to produce a structured profile record.
//! The record is edited in place, shown in other languages through
//! translation, and exported as JSON or PDF.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
