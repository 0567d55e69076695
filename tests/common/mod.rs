//! Shared test utilities for alertsynth integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file. Anything random takes a seeded `StdRng` from
//! [`seeded`] so failures reproduce.

pub mod assertions;
pub mod builders;
pub mod fixtures;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;

use chrono::{DateTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Monday 2024-01-15 10:00:00 UTC, the reference "now" of every harness.
pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()
}

pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
