// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Compact page-index range sets.
//!
//! Pool configurations name the huge-page slots of a pool with a compact
//! list such as `"[0-2,5,7-9]"`: comma-separated singletons or inclusive
//! `a-b` runs. A [`PageRangeSet`] parses that syntax into a canonical set:
//!
//! ```text
//! "5,0-1,2,1"  ──parse──►  {0,1,2,5}  ──encode──►  "0-2,5"
//!                           (duplicate 1 noted, not fatal)
//! ```
//!
//! The set is stored as maximal runs ([`RangeToken`]s) rather than as
//! individual indices, so very large runs cost nothing to hold. Each run
//! expands to exactly one contiguous [`ByteRange`].

use crate::RangeError;
use std::fmt;
use std::str::FromStr;

// ── RangeToken ─────────────────────────────────────────────────────

/// An inclusive run of page indices `[first, last]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct RangeToken {
    pub first: u64,
    pub last: u64,
}

impl RangeToken {
    /// Creates a run, rejecting `first > last`.
    pub fn new(first: u64, last: u64) -> Result<Self, RangeError> {
        if first > last {
            return Err(RangeError::ReversedRange { first, last });
        }
        Ok(Self { first, last })
    }

    /// A run holding a single index.
    pub fn single(index: u64) -> Self {
        Self {
            first: index,
            last: index,
        }
    }

    /// Number of indices in the run (saturating at `u64::MAX`).
    pub fn count(&self) -> u64 {
        (self.last - self.first).saturating_add(1)
    }

    /// Expands the run to `[first·page_size + offset, (last+1)·page_size + offset)`.
    pub fn to_byte_range(&self, page_size: u64, offset: u64) -> Result<ByteRange, RangeError> {
        let address = |index: u64| {
            index
                .checked_mul(page_size)
                .and_then(|b| b.checked_add(offset))
                .ok_or(RangeError::AddressOverflow {
                    index,
                    page_size,
                    offset,
                })
        };
        let start = address(self.first)?;
        let end = self
            .last
            .checked_add(1)
            .ok_or(RangeError::AddressOverflow {
                index: self.last,
                page_size,
                offset,
            })
            .and_then(address)?;
        Ok(ByteRange { start, end })
    }
}

impl FromStr for RangeToken {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        let invalid = || RangeError::InvalidToken {
            token: token.to_string(),
        };
        let parse_index = |part: &str| {
            let part = part.trim();
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            part.parse::<u64>().map_err(|_| invalid())
        };

        match token.split_once('-') {
            Some((first, last)) => Self::new(parse_index(first)?, parse_index(last)?),
            None => Ok(Self::single(parse_index(token)?)),
        }
    }
}

impl fmt::Display for RangeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}-{}", self.first, self.last)
        }
    }
}

// ── ByteRange ──────────────────────────────────────────────────────

/// A half-open byte interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Length in bytes (zero if `end < start`).
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if the range lies within `[0, limit]`.
    pub fn fits_within(&self, limit: u64) -> bool {
        self.start <= limit && self.end <= limit
    }

    /// Returns `true` if the two ranges interleave.
    ///
    /// Two ranges interleave unless one ends at or before the other starts,
    /// so touching ranges (`[0,10)` and `[10,20)`) and empty ranges placed at
    /// a boundary do not interleave.
    pub fn interleaves(&self, other: &ByteRange) -> bool {
        self.end > other.start && other.end > self.start
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}-{})", self.start, self.end)
    }
}

// ── PageRangeSet ───────────────────────────────────────────────────

/// A canonical set of distinct page indices.
///
/// Construction accepts tokens in any order and with any amount of overlap;
/// the stored form is the minimal list of ascending, non-adjacent runs.
/// Whether the input repeated any index is remembered for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRangeSet {
    /// Canonical runs: ascending, non-overlapping, non-adjacent.
    tokens: Vec<RangeToken>,
    /// Whether the input named some index more than once.
    has_duplicates: bool,
}

impl PageRangeSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from range tokens such as `["0-2", "5"]`.
    pub fn from_tokens<I, S>(tokens: I) -> Result<Self, RangeError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = tokens
            .into_iter()
            .map(|t| t.as_ref().parse::<RangeToken>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_runs(parsed))
    }

    /// Builds a set from individual indices.
    pub fn from_indices<I: IntoIterator<Item = u64>>(indices: I) -> Self {
        Self::from_runs(indices.into_iter().map(RangeToken::single).collect())
    }

    /// Parses a comma-separated list, optionally wrapped in `[` `]`.
    ///
    /// The empty string (or `"[]"`) is the empty set.
    pub fn parse(s: &str) -> Result<Self, RangeError> {
        let mut body = s.trim();
        if let Some(inner) = body.strip_prefix('[').and_then(|b| b.strip_suffix(']')) {
            body = inner.trim();
        }
        if body.is_empty() {
            return Ok(Self::new());
        }
        Self::from_tokens(body.split(','))
    }

    /// Sorts and merges runs into canonical form.
    fn from_runs(mut runs: Vec<RangeToken>) -> Self {
        runs.sort_unstable();

        let mut tokens: Vec<RangeToken> = Vec::with_capacity(runs.len());
        let mut has_duplicates = false;

        for run in runs {
            match tokens.last_mut() {
                Some(current) if run.first <= current.last => {
                    has_duplicates = true;
                    current.last = current.last.max(run.last);
                }
                Some(current) if current.last.checked_add(1) == Some(run.first) => {
                    current.last = run.last;
                }
                _ => tokens.push(run),
            }
        }

        Self {
            tokens,
            has_duplicates,
        }
    }

    /// Number of distinct indices in the set.
    pub fn items_count(&self) -> u64 {
        self.tokens
            .iter()
            .fold(0u64, |acc, t| acc.saturating_add(t.count()))
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Whether the source named any index more than once.
    pub fn has_duplicates(&self) -> bool {
        self.has_duplicates
    }

    /// The canonical runs, in ascending order.
    pub fn tokens(&self) -> &[RangeToken] {
        &self.tokens
    }

    /// Iterates over every index in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.tokens.iter().flat_map(|t| t.first..=t.last)
    }

    /// Returns `true` if `index` is in the set.
    pub fn contains(&self, index: u64) -> bool {
        self.tokens
            .binary_search_by(|t| {
                if t.last < index {
                    std::cmp::Ordering::Less
                } else if t.first > index {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .is_ok()
    }

    /// Renders the canonical token list, e.g. `"0-2,5"`.
    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Expands each canonical run to one absolute byte range.
    ///
    /// A run `[a, b]` becomes `[a·page_size + offset, (b+1)·page_size + offset)`.
    /// Ranges are returned in ascending order.
    pub fn expand_to_byte_ranges(
        &self,
        page_size: u64,
        offset: u64,
    ) -> Result<Vec<ByteRange>, RangeError> {
        self.tokens
            .iter()
            .map(|t| t.to_byte_range(page_size, offset))
            .collect()
    }
}

impl FromStr for PageRangeSet {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PageRangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}

impl serde::Serialize for PageRangeSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for PageRangeSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    const MB2: u64 = 2 * 1024 * 1024;

    #[test]
    fn test_canonicalize_tokens() {
        let set = PageRangeSet::from_tokens(["0", "1", "2", "5"]).unwrap();
        let tokens: Vec<String> = set.tokens().iter().map(|t| t.to_string()).collect();
        assert_eq!(tokens, ["0-2", "5"]);
        assert_eq!(set.items_count(), 4);
        assert!(!set.has_duplicates());
    }

    #[test]
    fn test_parse_bracketed() {
        let set = PageRangeSet::parse("[7-9, 0-1,3]").unwrap();
        assert_eq!(set.encode(), "0-1,3,7-9");
        assert_eq!(set.items_count(), 6);
    }

    #[test]
    fn test_parse_empty() {
        assert!(PageRangeSet::parse("").unwrap().is_empty());
        assert!(PageRangeSet::parse("[]").unwrap().is_empty());
        assert!(PageRangeSet::parse("   ").unwrap().is_empty());
        assert_eq!(PageRangeSet::parse("").unwrap().items_count(), 0);
    }

    #[test]
    fn test_duplicates_are_removed_and_flagged() {
        let set = PageRangeSet::parse("0-3,2,3-4,10,10").unwrap();
        assert_eq!(set.encode(), "0-4,10");
        assert_eq!(set.items_count(), 6);
        assert!(set.has_duplicates());
    }

    #[test]
    fn test_adjacent_runs_merge() {
        let set = PageRangeSet::parse("4-5,0-1,2-3").unwrap();
        assert_eq!(set.encode(), "0-5");
        assert!(!set.has_duplicates());
    }

    #[test]
    fn test_invalid_tokens() {
        assert!(matches!(
            PageRangeSet::parse("1,,2"),
            Err(RangeError::InvalidToken { .. })
        ));
        assert!(matches!(
            PageRangeSet::parse("a-3"),
            Err(RangeError::InvalidToken { .. })
        ));
        assert!(matches!(
            PageRangeSet::parse("1-2-3"),
            Err(RangeError::InvalidToken { .. })
        ));
        assert!(matches!(
            PageRangeSet::parse("-4"),
            Err(RangeError::InvalidToken { .. })
        ));
        assert_eq!(
            PageRangeSet::parse("5-2"),
            Err(RangeError::ReversedRange { first: 5, last: 2 })
        );
    }

    #[test]
    fn test_expand_to_byte_ranges() {
        let set = PageRangeSet::from_tokens(["0-2", "5"]).unwrap();
        let ranges = set.expand_to_byte_ranges(MB2, 0).unwrap();
        assert_eq!(
            ranges,
            vec![ByteRange::new(0, 6291456), ByteRange::new(10485760, 12582912)]
        );
    }

    #[test]
    fn test_expand_with_offset() {
        let set = PageRangeSet::parse("1").unwrap();
        let ranges = set.expand_to_byte_ranges(MB2, 4096).unwrap();
        assert_eq!(ranges, vec![ByteRange::new(MB2 + 4096, 2 * MB2 + 4096)]);
    }

    #[test]
    fn test_expand_overflow() {
        let set = PageRangeSet::from_indices([u64::MAX / 2]);
        assert!(matches!(
            set.expand_to_byte_ranges(MB2, 0),
            Err(RangeError::AddressOverflow { .. })
        ));
    }

    #[test]
    fn test_interleave() {
        let a = ByteRange::new(0, 10);
        assert!(!a.interleaves(&ByteRange::new(10, 20)));
        assert!(a.interleaves(&ByteRange::new(5, 15)));
        assert!(!a.interleaves(&ByteRange::new(10, 10)));
        // Containment is interleaving too.
        assert!(a.interleaves(&ByteRange::new(2, 3)));
        assert!(ByteRange::new(2, 3).interleaves(&a));
    }

    #[test]
    fn test_contains_and_iter() {
        let set = PageRangeSet::parse("0-2,5").unwrap();
        assert!(set.contains(1));
        assert!(set.contains(5));
        assert!(!set.contains(3));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![0, 1, 2, 5]);
    }

    #[test]
    fn test_serde_as_string() {
        let set = PageRangeSet::parse("2,0-1").unwrap();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, "\"0-2\"");
        let back: PageRangeSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PageRangeSet::parse("0-2").unwrap());
    }

    proptest! {
        #[test]
        fn encode_decode_preserves_set(indices in proptest::collection::btree_set(0u64..512, 0..64)) {
            let set = PageRangeSet::from_indices(indices.iter().copied());
            let decoded = PageRangeSet::parse(&set.encode()).unwrap();
            let back: BTreeSet<u64> = decoded.iter().collect();
            prop_assert_eq!(back, indices.clone());
            prop_assert_eq!(decoded.items_count(), indices.len() as u64);
        }

        #[test]
        fn canonical_encoding_is_idempotent(indices in proptest::collection::vec(0u64..512, 0..64)) {
            let encoded = PageRangeSet::from_indices(indices).encode();
            let again = PageRangeSet::parse(&encoded).unwrap().encode();
            prop_assert_eq!(again, encoded);
        }
    }
}
