// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-pool huge-page metadata.
//!
//! A [`PoolConfig`] is built from one row of a pool configuration table:
//!
//! ```text
//! pool_type,pool_size,ragions_list_2mb,offset_2mb,ragions_list_1gb,offset_1gb
//! mmap,10MB,"0-1",0,,0
//! ```
//!
//! It owns the pool's total size and, for each huge-page size, the set of
//! page slots and the byte offset the slots are counted from.

use crate::table::PoolRecord;
use crate::LayoutError;
use page_ranges::{ByteRange, PageRangeSet, PageSize, SizeValue};
use std::fmt;
use std::str::FromStr;

/// One of the three pools carved out by the allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoolType {
    /// Heap grown through `brk`/`sbrk`.
    Brk,
    /// Anonymous `mmap` allocations.
    Mmap,
    /// File-backed `mmap` allocations.
    File,
}

impl PoolType {
    /// All pools, in the order they are emitted.
    pub const ALL: [PoolType; 3] = [PoolType::Brk, PoolType::Mmap, PoolType::File];

    /// The name used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Brk => "brk",
            Self::Mmap => "mmap",
            Self::File => "file",
        }
    }
}

impl FromStr for PoolType {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "brk" => Ok(Self::Brk),
            "mmap" => Ok(Self::Mmap),
            "file" => Ok(Self::File),
            _ => Err(LayoutError::UnknownPoolType(s.to_string())),
        }
    }
}

impl fmt::Display for PoolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Huge-page layout of a single pool.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PoolConfig {
    pool_type: PoolType,
    pool_size: SizeValue,
    regions_2mb: PageRangeSet,
    offset_2mb: SizeValue,
    regions_1gb: PageRangeSet,
    offset_1gb: SizeValue,
}

impl PoolConfig {
    /// Creates a pool from already-parsed parts.
    pub fn new(
        pool_type: PoolType,
        pool_size: SizeValue,
        regions_2mb: PageRangeSet,
        offset_2mb: SizeValue,
        regions_1gb: PageRangeSet,
        offset_1gb: SizeValue,
    ) -> Self {
        Self {
            pool_type,
            pool_size,
            regions_2mb,
            offset_2mb,
            regions_1gb,
            offset_1gb,
        }
    }

    /// A pool of the given size with no huge pages.
    pub fn base_pages_only(pool_type: PoolType, pool_size: SizeValue) -> Self {
        Self::new(
            pool_type,
            pool_size,
            PageRangeSet::new(),
            SizeValue::default(),
            PageRangeSet::new(),
            SizeValue::default(),
        )
    }

    /// Parses a pool from one configuration row.
    ///
    /// Fails if the row names an unknown pool type or if any size or range
    /// column is malformed. Duplicate page indices are only logged.
    pub fn from_record(record: &PoolRecord) -> Result<Self, LayoutError> {
        let pool_type: PoolType = record.pool_type.parse()?;
        let pool = pool_type.as_str();

        let size = |field: &'static str, value: &str| {
            SizeValue::parse(value).map_err(|source| LayoutError::InvalidField {
                pool: pool.to_string(),
                field,
                source,
            })
        };
        let regions = |field: &'static str, value: &str| {
            PageRangeSet::parse(value).map_err(|source| LayoutError::InvalidField {
                pool: pool.to_string(),
                field,
                source,
            })
        };

        let config = Self {
            pool_type,
            pool_size: size("pool_size", &record.pool_size)?,
            regions_2mb: regions("ragions_list_2mb", &record.regions_2mb)?,
            offset_2mb: size("offset_2mb", &record.offset_2mb)?,
            regions_1gb: regions("ragions_list_1gb", &record.regions_1gb)?,
            offset_1gb: size("offset_1gb", &record.offset_1gb)?,
        };

        for page_size in PageSize::HUGE {
            let set = config.regions_unchecked(page_size);
            if set.has_duplicates() {
                tracing::warn!(
                    "{} pool: duplicate {} page indices in '{}', using {}",
                    pool_type,
                    page_size,
                    match page_size {
                        PageSize::Huge1Gb => &record.regions_1gb,
                        _ => &record.regions_2mb,
                    },
                    set,
                );
            }
        }

        tracing::debug!(
            "{} pool: size {}, 2MB pages [{}] @ {}, 1GB pages [{}] @ {}",
            pool_type,
            config.pool_size,
            config.regions_2mb,
            config.offset_2mb.as_bytes(),
            config.regions_1gb,
            config.offset_1gb.as_bytes(),
        );

        Ok(config)
    }

    pub fn pool_type(&self) -> PoolType {
        self.pool_type
    }

    /// Total pool size in bytes.
    pub fn pool_size(&self) -> u64 {
        self.pool_size.as_bytes()
    }

    pub fn regions_2mb(&self) -> &PageRangeSet {
        &self.regions_2mb
    }

    pub fn regions_1gb(&self) -> &PageRangeSet {
        &self.regions_1gb
    }

    /// Byte offset the 2MB page slots are counted from.
    pub fn offset_2mb(&self) -> u64 {
        self.offset_2mb.as_bytes()
    }

    /// Byte offset the 1GB page slots are counted from.
    pub fn offset_1gb(&self) -> u64 {
        self.offset_1gb.as_bytes()
    }

    /// Number of distinct 2MB pages.
    pub fn pages_2mb_count(&self) -> u64 {
        self.regions_2mb.items_count()
    }

    /// Number of distinct 1GB pages.
    pub fn pages_1gb_count(&self) -> u64 {
        self.regions_1gb.items_count()
    }

    /// The region set for a huge-page size. 4KB has none.
    pub fn regions(&self, page_size: PageSize) -> Result<&PageRangeSet, LayoutError> {
        Self::require_huge(page_size)?;
        Ok(self.regions_unchecked(page_size))
    }

    /// The region offset for a huge-page size. 4KB has none.
    pub fn offset(&self, page_size: PageSize) -> Result<u64, LayoutError> {
        Self::require_huge(page_size)?;
        Ok(match page_size {
            PageSize::Huge1Gb => self.offset_1gb(),
            _ => self.offset_2mb(),
        })
    }

    /// The page count for a huge-page size. 4KB has none.
    pub fn pages_count(&self, page_size: PageSize) -> Result<u64, LayoutError> {
        Ok(self.regions(page_size)?.items_count())
    }

    /// Absolute byte ranges covered by the pages of one huge-page size.
    pub fn expanded_ranges(&self, page_size: PageSize) -> Result<Vec<ByteRange>, LayoutError> {
        let regions = self.regions(page_size)?;
        let offset = self.offset(page_size)?;
        regions
            .expand_to_byte_ranges(page_size.bytes(), offset)
            .map_err(|source| LayoutError::InvalidField {
                pool: self.pool_type.to_string(),
                field: match page_size {
                    PageSize::Huge1Gb => "ragions_list_1gb",
                    _ => "ragions_list_2mb",
                },
                source,
            })
    }

    fn regions_unchecked(&self, page_size: PageSize) -> &PageRangeSet {
        match page_size {
            PageSize::Huge1Gb => &self.regions_1gb,
            _ => &self.regions_2mb,
        }
    }

    fn require_huge(page_size: PageSize) -> Result<(), LayoutError> {
        if page_size.is_huge() {
            Ok(())
        } else {
            Err(LayoutError::UnsupportedPageSize(page_size))
        }
    }
}

impl fmt::Display for PoolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<5} size={:<8} 2MB=[{}]@{} ({} pages)  1GB=[{}]@{} ({} pages)",
            self.pool_type.as_str(),
            self.pool_size.to_string(),
            self.regions_2mb,
            self.offset_2mb.as_bytes(),
            self.pages_2mb_count(),
            self.regions_1gb,
            self.offset_1gb.as_bytes(),
            self.pages_1gb_count(),
        )
    }
}
