//! Alert normalizer: turns an untrusted candidate into an [`AlertRecord`].
//!
//! Steps, in order:
//!
//! 1. read the candidate as an object (anything else, or a locked object,
//!    reads as `{}`)
//! 2. sanitize every key and value into a fresh map
//! 3. write the caller's [`Overrides`] (`host.name`, `user.name`,
//!    `kibana.space_ids`)
//! 4. enforce the [`ConstraintTable`]: identifiers, timestamps, severity,
//!    risk score and the rest
//!
//! Normalization never fails and never touches the candidate.

use alertsynth_time::{TimestampConfig, TimestampGenerator};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::constraints::{ConstraintTable, Enforced, FieldSource};
use crate::raw::RawValue;
use crate::sanitizer::Sanitizer;
use crate::types::{AlertRecord, Overrides};

/// Sanitizer, constraint table and timestamp generator bundled together.
#[derive(Debug, Clone)]
pub struct Normalizer {
    sanitizer: Sanitizer,
    constraints: ConstraintTable,
    timestamps: TimestampGenerator,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(&Config::defaults())
    }
}

impl Normalizer {
    pub fn new(config: &Config) -> Self {
        Self {
            sanitizer: Sanitizer::new(&config.sanitizer),
            constraints: ConstraintTable::standard(&config.alert),
            timestamps: TimestampGenerator::new(config.timestamps.clone()),
        }
    }

    /// Swap in a different constraint table.
    pub fn with_constraints(mut self, constraints: ConstraintTable) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn constraints(&self) -> &ConstraintTable {
        &self.constraints
    }

    pub fn sanitizer(&self) -> &Sanitizer {
        &self.sanitizer
    }

    pub fn timestamps(&self) -> &TimestampGenerator {
        &self.timestamps
    }

    /// Normalize against an explicit clock and random source.
    pub fn normalize_at<R: Rng + ?Sized>(
        &self,
        raw: &RawValue,
        overrides: &Overrides,
        timestamps: Option<&TimestampConfig>,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> AlertRecord {
        let mut fields = self.sanitizer.sanitize_object(raw).unwrap_or_else(|| {
            debug!(candidate = ?raw, "candidate is not a readable object, starting empty");
            Default::default()
        });

        overrides.apply(&mut fields);

        let mut source = Generated {
            generator: &self.timestamps,
            config: timestamps,
            now,
            rng,
        };
        for (path, rule) in self.constraints.iter() {
            match rule.enforce(fields.get(path), &mut source) {
                Enforced::Keep => {}
                Enforced::Set(value) => {
                    debug!(field = path, %value, "field filled by constraint");
                    fields.insert(path.to_string(), value);
                }
                Enforced::Remove => {
                    debug!(field = path, "field removed by constraint");
                    fields.shift_remove(path);
                }
            }
        }

        AlertRecord::from_map(fields)
    }

    /// Normalize using the current instant and the thread-local RNG.
    pub fn normalize(
        &self,
        raw: &RawValue,
        overrides: &Overrides,
        timestamps: Option<&TimestampConfig>,
    ) -> AlertRecord {
        self.normalize_at(raw, overrides, timestamps, Utc::now(), &mut rand::thread_rng())
    }

    /// Normalize an already-parsed JSON candidate.
    pub fn normalize_json(
        &self,
        raw: &Value,
        overrides: &Overrides,
        timestamps: Option<&TimestampConfig>,
    ) -> AlertRecord {
        self.normalize(&RawValue::from(raw), overrides, timestamps)
    }
}

/// One-shot normalization with default configuration.
pub fn normalize_alert(
    raw: &RawValue,
    host_name: &str,
    user_name: &str,
    space_id: &str,
    timestamps: Option<&TimestampConfig>,
) -> AlertRecord {
    Normalizer::default().normalize(raw, &Overrides::new(host_name, user_name, space_id), timestamps)
}

/// Identifiers and timestamps for one normalization call.
struct Generated<'a, R: ?Sized> {
    generator: &'a TimestampGenerator,
    config: Option<&'a TimestampConfig>,
    now: DateTime<Utc>,
    rng: &'a mut R,
}

impl<R: Rng + ?Sized> FieldSource for Generated<'_, R> {
    fn fresh_id(&mut self) -> String {
        uuid::Builder::from_random_bytes(self.rng.gen()).into_uuid().to_string()
    }

    fn fresh_timestamp(&mut self) -> String {
        self.generator.generate_timestamp(self.config, self.now, &mut *self.rng)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
