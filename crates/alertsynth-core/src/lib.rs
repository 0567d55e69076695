//! alertsynth-core: sanitization and normalization of synthetic alerts.
//!
//! # Pipeline
//!
//! ```text
//! RawValue ──► Sanitizer ──► Overrides ──► ConstraintTable ──► AlertRecord
//!                                               │
//!                                               └──► alertsynth-time (timestamps)
//! ```
//!
//! Every stage is total: hostile, malformed or cyclic input degrades to
//! defaults instead of producing an error. Only [`config::Config`] loading
//! can fail.

pub mod config;
pub mod constraints;
pub mod error;
pub mod normalizer;
pub mod raw;
pub mod sanitizer;
pub mod types;

pub use config::Config;
pub use constraints::{ConstraintTable, Enforced, FieldRule, FieldSource};
pub use error::{Error, Result};
pub use normalizer::{normalize_alert, Normalizer};
pub use raw::{RawObject, RawValue};
pub use sanitizer::{is_forbidden_key, Sanitizer, CIRCULAR_MARKER, DEPTH_MARKER};
pub use types::{fields, AlertRecord, Overrides};

pub use alertsynth_time::{TimestampConfig, TimestampPattern};
