//! In-memory achievement progress, shared by every request task.
//!
//! One record for the whole process. No persistence — the store exists so a
//! multi-page static site has a server-side mirror of its progress state for
//! the duration of a dev session, nothing more. A single mutex guards the
//! record; validation and coercion run *before* the lock is taken, so a
//! rejected replace leaves the stored record untouched and the lock is only
//! ever held across an in-memory copy or swap.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use serde_json::Value;

/// A snapshot of achievement progress.
///
/// `clicks` never goes below zero; `unlocked` holds unique achievement keys
/// in the order they were first reported.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProgressRecord {
    pub clicks: u64,
    pub unlocked: Vec<String>,
}

/// Mutex-protected owner of the one [`ProgressRecord`].
///
/// Create it once at startup and hand an `Arc` to the request handlers —
/// there is deliberately no process-wide singleton.
#[derive(Default)]
pub struct ProgressStore {
    record: Mutex<ProgressRecord>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current record. The live record never leaves
    /// the lock.
    pub fn snapshot(&self) -> ProgressRecord {
        self.lock().clone()
    }

    /// Replaces the whole record from untyped JSON values.
    ///
    /// `clicks` is coerced to a non-negative integer (integers, truncated
    /// floats, booleans, and integer strings are accepted); `unlocked` must
    /// be a JSON array, whose non-string elements and duplicates are
    /// silently dropped. Readers
    /// never observe old clicks paired with new keys or vice versa: the
    /// record is swapped wholesale. Racing replaces are last-write-wins.
    pub fn replace(
        &self,
        clicks: &Value,
        unlocked: &Value,
    ) -> Result<ProgressRecord, ValidationError> {
        let next = ProgressRecord {
            clicks: coerce_clicks(clicks)?,
            unlocked: coerce_unlocked(unlocked)?,
        };
        *self.lock() = next.clone();
        Ok(next)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ProgressRecord> {
        // A panicking holder can only have completed a wholesale swap or a
        // clone, so the record behind a poisoned lock is still valid.
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ── Coercion ─────────────────────────────────────────────────────────────────

/// Interprets a JSON value as a click count, clamped at a zero floor.
///
/// Accepts integers, floats (truncated toward zero), booleans (0 or 1), and
/// strings holding a base-10 integer. Everything else is a
/// [`ValidationError`]. The permissiveness is intentional: it is the
/// contract the site's client script relies on.
fn coerce_clicks(value: &Value) -> Result<u64, ValidationError> {
    let n = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .ok_or_else(|| ValidationError::Clicks(json_type(value)))?,
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::Clicks(json_type(value)))?,
        Value::Bool(b) => i64::from(*b),
        _ => return Err(ValidationError::Clicks(json_type(value))),
    };
    Ok(n.max(0) as u64)
}

/// Filters a JSON array down to its unique string elements, preserving
/// first-occurrence order. Non-arrays are rejected; non-string elements are
/// dropped without comment.
fn coerce_unlocked(value: &Value) -> Result<Vec<String>, ValidationError> {
    let Value::Array(items) = value else {
        return Err(ValidationError::Unlocked(json_type(value)));
    };
    let mut keys: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if let Value::String(key) = item {
            if !keys.iter().any(|k| k == key) {
                keys.push(key.clone());
            }
        }
    }
    Ok(keys)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// ── ValidationError ──────────────────────────────────────────────────────────

/// A POST payload field had the wrong shape.
///
/// Carries what was found so the message names the offending value's type.
#[derive(Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// `clicks` was not interpretable as an integer.
    Clicks(&'static str),
    /// `unlocked` was not an array.
    Unlocked(&'static str),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clicks(found) => {
                write!(f, "'clicks' must be an integer, got {found}")
            }
            Self::Unlocked(found) => {
                write!(f, "'unlocked' must be a list, got {found}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

// ── Tests ────────────────────────────────────────────────────────────────────
