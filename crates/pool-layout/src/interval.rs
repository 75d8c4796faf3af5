// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Contiguous pool intervals, the unit of the legacy format.

use crate::table::LegacyRecord;
use crate::{LayoutError, PoolType};
use page_ranges::{ByteRange, PageSize};
use std::fmt;

/// Page size column of a legacy row.
///
/// The legacy format overloads the page size: `-1` marks the row whose end
/// offset is the size of the whole pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum IntervalPageSize {
    /// The pool-size marker (`pageSize = -1`).
    PoolSize,
    /// An interval backed by pages of this size.
    Page(PageSize),
}

impl IntervalPageSize {
    /// Legacy value of the pool-size marker.
    pub const POOL_SIZE_MARKER: i64 = -1;

    /// The value written to the `pageSize` column.
    pub fn to_legacy(self) -> i64 {
        match self {
            Self::PoolSize => Self::POOL_SIZE_MARKER,
            // Page sizes are at most 1GB.
            Self::Page(p) => p.bytes() as i64,
        }
    }

    /// Parses a `pageSize` column value.
    pub fn from_legacy(value: i64) -> Option<Self> {
        if value == Self::POOL_SIZE_MARKER {
            return Some(Self::PoolSize);
        }
        u64::try_from(value)
            .ok()
            .and_then(PageSize::from_bytes)
            .map(Self::Page)
    }
}

/// One contiguous interval of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Interval {
    pub pool_type: PoolType,
    pub page_size: IntervalPageSize,
    pub start_offset: u64,
    pub end_offset: u64,
}

impl Interval {
    /// The `{type, -1, 0, pool_size}` row announcing a pool's size.
    pub fn pool_size_marker(pool_type: PoolType, pool_size: u64) -> Self {
        Self {
            pool_type,
            page_size: IntervalPageSize::PoolSize,
            start_offset: 0,
            end_offset: pool_size,
        }
    }

    /// An interval backed by pages of `page_size`.
    pub fn huge_page(pool_type: PoolType, page_size: PageSize, range: ByteRange) -> Self {
        Self {
            pool_type,
            page_size: IntervalPageSize::Page(page_size),
            start_offset: range.start,
            end_offset: range.end,
        }
    }

    pub fn is_pool_size_marker(&self) -> bool {
        self.page_size == IntervalPageSize::PoolSize
    }

    /// The interval as a byte range.
    pub fn range(&self) -> ByteRange {
        ByteRange::new(self.start_offset, self.end_offset)
    }

    /// Builds an interval from a legacy row already known to belong to
    /// `pool_type`.
    pub fn from_record(record: &LegacyRecord, pool_type: PoolType) -> Result<Self, LayoutError> {
        let page_size = IntervalPageSize::from_legacy(record.page_size).ok_or(
            LayoutError::UnknownPageSize {
                pool: pool_type,
                page_size: record.page_size,
            },
        )?;
        let negative = || LayoutError::NegativeOffset {
            pool: pool_type,
            start: record.start_offset,
            end: record.end_offset,
        };
        Ok(Self {
            pool_type,
            page_size,
            start_offset: u64::try_from(record.start_offset).map_err(|_| negative())?,
            end_offset: u64::try_from(record.end_offset).map_err(|_| negative())?,
        })
    }

    /// Converts the interval to a legacy row.
    pub fn to_record(&self) -> Result<LegacyRecord, LayoutError> {
        let signed = |value: u64| {
            i64::try_from(value).map_err(|_| LayoutError::OffsetOverflow {
                pool: self.pool_type,
                value,
            })
        };
        Ok(LegacyRecord {
            pool_type: self.pool_type.as_str().to_string(),
            page_size: self.page_size.to_legacy(),
            start_offset: signed(self.start_offset)?,
            end_offset: signed(self.end_offset)?,
        })
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.pool_type,
            self.page_size.to_legacy(),
            self.start_offset,
            self.end_offset
        )
    }
}
