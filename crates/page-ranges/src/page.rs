// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Page sizes supported by the pool allocator.

use std::fmt;

/// A hardware page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageSize {
    /// 4KB base page. Every offset in a layout must be aligned to this.
    Base4Kb,
    /// 2MB large page.
    Large2Mb,
    /// 1GB huge page.
    Huge1Gb,
}

impl PageSize {
    /// The huge-page sizes a pool can place regions of, smallest first.
    pub const HUGE: [PageSize; 2] = [PageSize::Large2Mb, PageSize::Huge1Gb];

    /// Returns the page size in bytes.
    pub const fn bytes(self) -> u64 {
        match self {
            Self::Base4Kb => 1 << 12,
            Self::Large2Mb => 1 << 21,
            Self::Huge1Gb => 1 << 30,
        }
    }

    /// Looks up a page size by its exact byte count.
    pub fn from_bytes(bytes: u64) -> Option<Self> {
        match bytes {
            b if b == Self::Base4Kb.bytes() => Some(Self::Base4Kb),
            b if b == Self::Large2Mb.bytes() => Some(Self::Large2Mb),
            b if b == Self::Huge1Gb.bytes() => Some(Self::Huge1Gb),
            _ => None,
        }
    }

    /// Returns `true` for the 2MB and 1GB sizes.
    pub fn is_huge(self) -> bool {
        !matches!(self, Self::Base4Kb)
    }

    /// Short label used in diagnostics (`"4KB"`, `"2MB"`, `"1GB"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base4Kb => "4KB",
            Self::Large2Mb => "2MB",
            Self::Huge1Gb => "1GB",
        }
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns `true` if `value` is a multiple of `alignment`.
///
/// Zero is aligned to everything; an alignment of zero is never satisfied.
pub fn is_aligned(value: u64, alignment: u64) -> bool {
    alignment != 0 && value % alignment == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes() {
        assert_eq!(PageSize::Base4Kb.bytes(), 4096);
        assert_eq!(PageSize::Large2Mb.bytes(), 2 * 1024 * 1024);
        assert_eq!(PageSize::Huge1Gb.bytes(), 1024 * 1024 * 1024);
    }

    #[test]
    fn test_from_bytes() {
        assert_eq!(PageSize::from_bytes(4096), Some(PageSize::Base4Kb));
        assert_eq!(PageSize::from_bytes(2097152), Some(PageSize::Large2Mb));
        assert_eq!(PageSize::from_bytes(1073741824), Some(PageSize::Huge1Gb));
        assert_eq!(PageSize::from_bytes(8192), None);
    }

    #[test]
    fn test_is_huge() {
        assert!(!PageSize::Base4Kb.is_huge());
        assert!(PageSize::HUGE.iter().all(|p| p.is_huge()));
    }

    #[test]
    fn test_is_aligned() {
        assert!(is_aligned(0, 4096));
        assert!(is_aligned(8192, 4096));
        assert!(!is_aligned(4095, 4096));
        assert!(!is_aligned(4096, 0));
    }
}
