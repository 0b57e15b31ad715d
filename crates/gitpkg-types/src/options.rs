//! Per-call options shared by every git operation.
//!
//! Callers usually hand over whatever configuration blob they already carry.
//! [`GitOptions::normalize`] picks out the fields it understands and ignores
//! the rest, so normalization never fails.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Process credentials applied to every spawned `git` command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GitOptions {
    /// User id to run `git` as (Unix only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<u32>,
    /// Group id to run `git` as (Unix only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gid: Option<u32>,
}

impl GitOptions {
    /// Options that leave the spawned process identity untouched.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_uid(mut self, uid: u32) -> Self {
        self.uid = Some(uid);
        self
    }

    pub fn with_gid(mut self, gid: u32) -> Self {
        self.gid = Some(gid);
        self
    }

    /// Build options from an arbitrary configuration value.
    ///
    /// Only `uid` and `gid` are read. Each is kept when it is an integer (or
    /// an integer-valued string or float) that fits in `u32` and is non-zero;
    /// anything else is ignored. A non-object value yields the defaults.
    pub fn normalize(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };
        Self {
            uid: map.get("uid").and_then(numeric_id),
            gid: map.get("gid").and_then(numeric_id),
        }
    }

    /// Returns `true` if no credential override is set.
    pub fn is_default(&self) -> bool {
        self.uid.is_none() && self.gid.is_none()
    }
}

impl From<&Value> for GitOptions {
    fn from(value: &Value) -> Self {
        Self::normalize(value)
    }
}

/// Coerce a JSON value to a process id. Zero is treated as "unset".
fn numeric_id(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                u
            } else {
                let f = n.as_f64()?;
                if f.fract() != 0.0 || f < 0.0 || f > f64::from(u32::MAX) {
                    return None;
                }
                f as u64
            }
        }
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    u32::try_from(n).ok().filter(|id| *id != 0)
}
