// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Loading and validating legacy-schema pool regions.
//!
//! A legacy file lists every interval of every pool directly:
//!
//! ```text
//! type,pageSize,startOffset,endOffset
//! mmap,-1,0,10485760          ← pool-size marker
//! mmap,2097152,0,4194304      ← 2MB-backed interval
//! ```
//!
//! [`LegacyPoolRegion`] selects one pool's rows, checks them and answers
//! page-count queries. It does not go through [`LayoutConfig`](crate::LayoutConfig).

use crate::table::{ConfigTable, LegacyRecord};
use crate::{Interval, IntervalPageSize, LayoutError, PoolType};
use page_ranges::{is_aligned, ByteRange, PageSize};
use std::path::Path;

/// The validated intervals of one pool from a legacy file.
#[derive(Debug, Clone)]
pub struct LegacyPoolRegion {
    pool_type: PoolType,
    pool_size: u64,
    /// Sorted by start offset; the pool-size marker is not included.
    intervals: Vec<Interval>,
}

impl LegacyPoolRegion {
    /// Reads a legacy-schema CSV file and loads one pool from it.
    pub fn from_path(path: &Path, pool_type: PoolType) -> Result<Self, LayoutError> {
        match ConfigTable::from_path(path)? {
            ConfigTable::Legacy(rows) => Self::from_records(&rows, pool_type),
            ConfigTable::Pools(_) => Err(LayoutError::UnrecognizedSchema {
                source_name: path.display().to_string(),
                columns: crate::table::POOL_COLUMNS.join(","),
            }),
        }
    }

    /// Loads and validates one pool from legacy rows.
    ///
    /// Rows of other pools are ignored. The rows of this pool must contain
    /// exactly one pool-size marker.
    ///
    /// # Checks (in order)
    /// 1. Pairwise over `zip(1GB, 2MB)`: both ends within the pool size.
    ///    The zip stops at the shorter list.
    /// 2. For each 2MB and 1GB interval: non-negative length, 4KB-aligned
    ///    start, length a multiple of the page size, and a page-aligned
    ///    distance from the previous interval's start.
    /// 3. The first 1GB and first 2MB starts are a multiple of 2MB apart.
    /// 4. No interval ends past the start of the next one.
    pub fn from_records(records: &[LegacyRecord], pool_type: PoolType) -> Result<Self, LayoutError> {
        let mut all = records
            .iter()
            .filter(|r| r.pool_type == pool_type.as_str())
            .map(|r| Interval::from_record(r, pool_type))
            .collect::<Result<Vec<_>, _>>()?;
        all.sort_by_key(|i| i.start_offset);

        let (markers, intervals): (Vec<Interval>, Vec<Interval>) =
            all.into_iter().partition(Interval::is_pool_size_marker);
        let pool_size = match markers.as_slice() {
            [marker] => marker.end_offset,
            [] => return Err(LayoutError::MissingPoolSize(pool_type)),
            _ => {
                return Err(LayoutError::DuplicatePoolSize {
                    pool: pool_type,
                    count: markers.len(),
                })
            }
        };

        let region = Self {
            pool_type,
            pool_size,
            intervals,
        };
        region.validate()?;

        tracing::debug!(
            "{} pool: {} legacy intervals, size {}, {} x 2MB, {} x 1GB",
            pool_type,
            region.intervals.len(),
            pool_size,
            region.num_large_pages(),
            region.num_huge_pages(),
        );
        Ok(region)
    }

    fn group(&self, page_size: PageSize) -> Vec<&Interval> {
        self.intervals
            .iter()
            .filter(|i| i.page_size == IntervalPageSize::Page(page_size))
            .collect()
    }

    fn validate(&self) -> Result<(), LayoutError> {
        let pool = self.pool_type;
        let group_2mb = self.group(PageSize::Large2Mb);
        let group_1gb = self.group(PageSize::Huge1Gb);

        // 1) pairwise bounds; truncates to the shorter group.
        for (i1, i2) in group_1gb.iter().zip(group_2mb.iter()) {
            for (page_size, interval) in [(PageSize::Huge1Gb, i1), (PageSize::Large2Mb, i2)] {
                if interval.end_offset > self.pool_size {
                    return Err(LayoutError::OutOfBounds {
                        pool,
                        page_size,
                        range: interval.range(),
                        pool_size: self.pool_size,
                    });
                }
            }
        }

        // 2) per-interval alignment and same-size deltas.
        let base = PageSize::Base4Kb.bytes();
        for (page_size, what, group) in [
            (PageSize::Large2Mb, "2mb regions", &group_2mb),
            (PageSize::Huge1Gb, "1gb regions", &group_1gb),
        ] {
            let alignment = page_size.bytes();
            for (index, interval) in group.iter().enumerate() {
                let (start, end) = (interval.start_offset, interval.end_offset);
                if end < start {
                    return Err(LayoutError::NegativeLength {
                        pool,
                        page_size,
                        start,
                        end,
                    });
                }
                if !is_aligned(start, base) || !is_aligned(end - start, alignment) {
                    return Err(LayoutError::MisalignedRegion {
                        pool,
                        page_size,
                        start,
                        end,
                    });
                }
                if index == 0 {
                    continue;
                }
                let delta = start.abs_diff(group[index - 1].start_offset);
                if !is_aligned(delta, alignment) {
                    return Err(LayoutError::MisalignedDelta {
                        pool,
                        what,
                        delta,
                        alignment: page_size,
                    });
                }
            }
        }

        // 3) 1GB and 2MB groups start 2MB apart.
        if let (Some(first_1gb), Some(first_2mb)) = (group_1gb.first(), group_2mb.first()) {
            let delta = first_1gb.start_offset.abs_diff(first_2mb.start_offset);
            if !is_aligned(delta, PageSize::Large2Mb.bytes()) {
                return Err(LayoutError::MisalignedDelta {
                    pool,
                    what: "1gb and 2mb",
                    delta,
                    alignment: PageSize::Large2Mb,
                });
            }
        }

        // 4) adjacent intervals must not overlap.
        for pair in self.intervals.windows(2) {
            if pair[0].end_offset > pair[1].start_offset {
                return Err(LayoutError::Overlap {
                    pool,
                    first: pair[0].range(),
                    second: pair[1].range(),
                });
            }
        }

        Ok(())
    }

    pub fn pool_type(&self) -> PoolType {
        self.pool_type
    }

    /// Pool size taken from the pool-size marker.
    pub fn pool_size(&self) -> u64 {
        self.pool_size
    }

    /// Intervals sorted by start offset, marker excluded.
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    /// Total pages of `page_size` across this pool's intervals.
    pub fn get_num_of_page_size(&self, page_size: PageSize) -> u64 {
        self.intervals
            .iter()
            .filter(|i| i.page_size == IntervalPageSize::Page(page_size))
            .map(|i| i.range().len() / page_size.bytes())
            .sum()
    }

    /// Number of 2MB pages.
    pub fn num_large_pages(&self) -> u64 {
        self.get_num_of_page_size(PageSize::Large2Mb)
    }

    /// Number of 1GB pages.
    pub fn num_huge_pages(&self) -> u64 {
        self.get_num_of_page_size(PageSize::Huge1Gb)
    }

    /// Byte ranges of one page size, in start order.
    pub fn ranges(&self, page_size: PageSize) -> Vec<ByteRange> {
        self.group(page_size).into_iter().map(Interval::range).collect()
    }
}
