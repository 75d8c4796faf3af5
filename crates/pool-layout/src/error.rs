// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for layout parsing and validation.

use crate::PoolType;
use page_ranges::{ByteRange, PageSize, RangeError};

/// Errors that can occur while loading, validating or emitting a layout.
///
/// Every variant other than [`Io`](Self::Io), [`Csv`](Self::Csv) and
/// [`Config`](Self::Config) describes a malformed configuration: the input
/// cannot be handed to the allocator and must be fixed by hand.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// A size or range-list value failed to parse.
    #[error("invalid value: {0}")]
    Range(#[from] RangeError),

    /// A pool row column failed to parse.
    #[error("{pool} pool: invalid '{field}' value: {source}")]
    InvalidField {
        pool: String,
        field: &'static str,
        #[source]
        source: RangeError,
    },

    /// A row names a pool type other than brk, mmap or file.
    #[error("unknown pool type '{0}' (expected brk, mmap or file)")]
    UnknownPoolType(String),

    /// The pool table has no row for a required pool.
    #[error("configuration has no row for the {0} pool")]
    MissingPool(PoolType),

    /// A legacy configuration lacks the `pageSize = -1` pool-size row.
    #[error("{0} pool: missing pool size (no pageSize=-1 row)")]
    MissingPoolSize(PoolType),

    /// A legacy configuration has more than one pool-size row for a pool.
    #[error("{pool} pool: {count} pool-size rows (pageSize=-1), expected exactly one")]
    DuplicatePoolSize { pool: PoolType, count: usize },

    /// A legacy row carries a page size the allocator does not know.
    #[error("{pool} pool: unsupported page size {page_size}")]
    UnknownPageSize { pool: PoolType, page_size: i64 },

    /// A lookup was made for a page size that carries no regions.
    #[error("page size {0} has no region list (expected 2MB or 1GB)")]
    UnsupportedPageSize(PageSize),

    /// A legacy row has a negative offset.
    #[error("{pool} pool: negative offset in interval {start}-{end}")]
    NegativeOffset { pool: PoolType, start: i64, end: i64 },

    /// A region ends before it starts.
    #[error("{pool} pool: {page_size} region ends before it starts: {start}-{end}")]
    NegativeLength {
        pool: PoolType,
        page_size: PageSize,
        start: u64,
        end: u64,
    },

    /// A huge-page region lies outside `[0, pool_size]`.
    #[error("{pool} pool: {page_size} region {range} exceeds the pool size {pool_size}")]
    OutOfBounds {
        pool: PoolType,
        page_size: PageSize,
        range: ByteRange,
        pool_size: u64,
    },

    /// A region offset is not 4KB-aligned.
    #[error("{pool} pool: {page_size}-region offset {offset} is not aligned to 4KB")]
    MisalignedOffset {
        pool: PoolType,
        page_size: PageSize,
        offset: u64,
    },

    /// Both region offsets are set but do not differ by a multiple of 1GB.
    #[error(
        "{pool} pool: 2MB-region offset {offset_2mb} and 1GB-region offset {offset_1gb} \
         are both set but their difference is not aligned to 1GB"
    )]
    MisalignedOffsetDelta {
        pool: PoolType,
        offset_2mb: u64,
        offset_1gb: u64,
    },

    /// A legacy region's start or length is not aligned.
    #[error("{pool} pool: {page_size} region {start}-{end} is not aligned")]
    MisalignedRegion {
        pool: PoolType,
        page_size: PageSize,
        start: u64,
        end: u64,
    },

    /// The distance between two region starts is not aligned.
    #[error("{pool} pool: invalid delta {delta} between {what} offsets (must be a multiple of {alignment})")]
    MisalignedDelta {
        pool: PoolType,
        what: &'static str,
        delta: u64,
        alignment: PageSize,
    },

    /// A 2MB range and a 1GB range of the same pool interleave.
    #[error("{pool} pool has interleaved hugepage ranges: 2MB{range_2mb} - 1GB{range_1gb}")]
    Interleave {
        pool: PoolType,
        range_2mb: ByteRange,
        range_1gb: ByteRange,
    },

    /// Adjacent legacy intervals overlap.
    #[error("{pool} pool: regions are overlapping: {first} and {second}")]
    Overlap {
        pool: PoolType,
        first: ByteRange,
        second: ByteRange,
    },

    /// An emitted offset does not fit the legacy file's signed columns.
    #[error("{pool} pool: offset {value} does not fit the legacy format")]
    OffsetOverflow { pool: PoolType, value: u64 },

    /// The file's columns match neither the pool nor the legacy schema.
    #[error("'{source_name}' is neither a pool configuration nor a legacy configuration (columns: {columns})")]
    UnrecognizedSchema { source_name: String, columns: String },

    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A CSV record could not be read or written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The conversion settings file is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl LayoutError {
    /// Returns `true` if the error describes a malformed layout
    /// configuration rather than an I/O or settings failure.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, Self::Io(_) | Self::Csv(_) | Self::Config(_))
    }
}
