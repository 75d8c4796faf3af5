// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Byte-size values and parsing.
//!
//! A [`SizeValue`] is a plain byte count. Configuration files spell sizes
//! either as raw integers or with a two-letter, 1024-based unit suffix.

use crate::RangeError;
use std::fmt;
use std::str::FromStr;

const KB: u64 = 1 << 10;
const MB: u64 = 1 << 20;
const GB: u64 = 1 << 30;

/// A non-negative byte count.
///
/// # Parsing
/// - `"4096"` → 4096 bytes
/// - `"4kb"` / `"4KB"` → 4 × 1024 bytes
/// - `"10mb"` → 10 × 1024² bytes
/// - `"3gb"` → 3 × 1024³ bytes
///
/// Any other suffix is rejected, including single-letter units like `"10M"`.
///
/// # Examples
/// ```
/// use page_ranges::SizeValue;
///
/// assert_eq!(SizeValue::parse("3gb").unwrap().as_bytes(), 3 << 30);
/// assert_eq!(SizeValue::parse("10").unwrap().as_bytes(), 10);
/// assert!(SizeValue::parse("10tb").is_err());
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct SizeValue {
    bytes: u64,
}

impl SizeValue {
    /// Creates a size from a byte count.
    pub const fn from_bytes(bytes: u64) -> Self {
        Self { bytes }
    }

    /// Returns the size in bytes.
    pub const fn as_bytes(&self) -> u64 {
        self.bytes
    }

    /// Parses a size string.
    ///
    /// Leading and trailing whitespace is ignored. An all-digit string is a
    /// raw byte count; anything else must be `<integer><kb|mb|gb>` with a
    /// case-insensitive unit.
    pub fn parse(s: &str) -> Result<Self, RangeError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(RangeError::InvalidSize { input: s.to_string() });
        }

        if s.bytes().all(|b| b.is_ascii_digit()) {
            let bytes = s.parse::<u64>().map_err(|_| RangeError::SizeOverflow {
                input: s.to_string(),
            })?;
            return Ok(Self { bytes });
        }

        // Everything that is not a plain number must carry a 2-char unit.
        let split = s.len().saturating_sub(2);
        if s.len() < 2 || !s.is_char_boundary(split) {
            return Err(RangeError::InvalidSize { input: s.to_string() });
        }
        let (num_str, unit_str) = s.split_at(split);

        let multiplier = match unit_str.to_ascii_lowercase().as_str() {
            "kb" => KB,
            "mb" => MB,
            "gb" => GB,
            _ => {
                return Err(RangeError::UnknownUnit {
                    input: s.to_string(),
                    unit: unit_str.to_string(),
                })
            }
        };

        let num_str = num_str.trim();
        if num_str.is_empty() || !num_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RangeError::InvalidSize { input: s.to_string() });
        }
        let value: u64 = num_str.parse().map_err(|_| RangeError::SizeOverflow {
            input: s.to_string(),
        })?;

        let bytes = value
            .checked_mul(multiplier)
            .ok_or_else(|| RangeError::SizeOverflow { input: s.to_string() })?;

        Ok(Self { bytes })
    }
}

impl From<u64> for SizeValue {
    fn from(bytes: u64) -> Self {
        Self::from_bytes(bytes)
    }
}

impl From<SizeValue> for u64 {
    fn from(size: SizeValue) -> Self {
        size.bytes
    }
}

impl FromStr for SizeValue {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SizeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bytes >= GB && self.bytes % GB == 0 {
            write!(f, "{} GB", self.bytes / GB)
        } else if self.bytes >= MB && self.bytes % MB == 0 {
            write!(f, "{} MB", self.bytes / MB)
        } else if self.bytes >= KB && self.bytes % KB == 0 {
            write!(f, "{} KB", self.bytes / KB)
        } else {
            write!(f, "{} B", self.bytes)
        }
    }
}
