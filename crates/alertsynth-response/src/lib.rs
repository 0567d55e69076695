//! alertsynth-response: turning raw model text into candidate alerts.
//!
//! ```text
//! raw text ──► clean_json_response ──► serde_json ──► repair_batch ──► N maps
//! ```
//!
//! Both helpers are total: they return a best-effort value instead of an
//! error, so the caller always has something to normalize.

pub mod batch;
pub mod cleaner;

pub use batch::{parse_batch_response, repair_batch};
pub use cleaner::{clean_json_response, EMPTY_OBJECT};
