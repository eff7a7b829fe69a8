//! Flow module - Application status from upload to a finished card.

mod status;

pub use status::AppStatus;
