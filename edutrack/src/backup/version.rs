//! Data-format version negotiation.
//!
//! Versions are dot-separated non-negative integers (`"2.1.0"`). Comparison is
//! numeric per segment, and a shorter version is padded with zero segments, so
//! `"2"` equals `"2.0.0"` and `"10.0.0"` is newer than `"9.0.0"`.
//!
//! Compatibility is a floor check only: anything at or above the minimum
//! supported version is accepted.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A parsed data-format version.
#[derive(Debug, Clone, Eq)]
pub struct DataVersion {
    segments: Vec<u64>,
}

impl DataVersion {
    fn segment(&self, index: usize) -> u64 {
        self.segments.get(index).copied().unwrap_or(0)
    }
}

impl FromStr for DataVersion {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let segments = s
            .split('.')
            .map(|part| {
                if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(format!("Invalid version '{}': segment '{}' is not a number", s, part));
                }
                part.parse::<u64>()
                    .map_err(|e| format!("Invalid version '{}': segment '{}': {}", s, part, e))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(DataVersion { segments })
    }
}

impl fmt::Display for DataVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.segments.iter().map(|s| s.to_string()).collect();
        f.write_str(&parts.join("."))
    }
}

impl Ord for DataVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        (0..len)
            .map(|i| self.segment(i).cmp(&other.segment(i)))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for DataVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for DataVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

/// Whether `candidate` meets the `minimum` floor.
///
/// An unparsable version on either side is never compatible.
pub fn is_compatible(candidate: &str, minimum: &str) -> bool {
    match (candidate.parse::<DataVersion>(), minimum.parse::<DataVersion>()) {
        (Ok(candidate), Ok(minimum)) => candidate >= minimum,
        _ => false,
    }
}

/// Gate for inbound snapshot versions.
#[derive(Debug, Clone)]
pub struct VersionNegotiator {
    minimum: String,
}

impl VersionNegotiator {
    pub fn new(minimum_supported: impl Into<String>) -> Self {
        Self {
            minimum: minimum_supported.into(),
        }
    }

    pub fn minimum(&self) -> &str {
        &self.minimum
    }

    /// Reject `candidate` unless it is at or above the minimum supported version.
    pub fn check(&self, candidate: &str) -> Result<()> {
        if is_compatible(candidate, &self.minimum) {
            Ok(())
        } else {
            Err(Error::VersionIncompatible {
                candidate: candidate.to_string(),
                minimum: self.minimum.clone(),
            })
        }
    }
}
