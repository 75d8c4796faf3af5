// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Whole-process layout: the brk, mmap and file pools together.
//!
//! # Type-State Pattern
//!
//! ```text
//! LayoutConfig<Parsed>    : rows parsed, geometry not yet checked.
//!       │  .validate()
//!       ▼
//! LayoutConfig<Validated> : bounds, alignment and interleave checked;
//!                            legacy rows can be emitted.
//! ```
//!
//! Emission is only defined on a validated layout, so a malformed layout can
//! never reach the legacy file the allocator reads.

use crate::table::{ConfigTable, PoolRecord};
use crate::{Interval, LayoutError, PoolConfig, PoolType};
use page_ranges::{is_aligned, PageSize};
use std::fmt;
use std::path::Path;

// ── Type-state markers ─────────────────────────────────────────────

/// Marker: layout has been parsed but not validated.
#[derive(Debug, Clone)]
pub struct Parsed;

/// Marker: layout passed validation.
#[derive(Debug, Clone)]
pub struct Validated;

/// Sealed trait for layout states.
pub trait LayoutState: fmt::Debug + Clone {}
impl LayoutState for Parsed {}
impl LayoutState for Validated {}

// ── LayoutConfig ───────────────────────────────────────────────────

/// The three pools of a process.
#[derive(Debug, Clone)]
pub struct LayoutConfig<S: LayoutState = Parsed> {
    brk: PoolConfig,
    mmap: PoolConfig,
    file: PoolConfig,
    _state: std::marker::PhantomData<S>,
}

// ── Parsed state ───────────────────────────────────────────────────

impl LayoutConfig<Parsed> {
    /// Creates a layout from three pools.
    pub fn new(brk: PoolConfig, mmap: PoolConfig, file: PoolConfig) -> Self {
        Self {
            brk,
            mmap,
            file,
            _state: std::marker::PhantomData,
        }
    }

    /// Reads a pool-schema CSV file.
    ///
    /// A legacy-schema file is rejected; use
    /// [`LegacyPoolRegion`](crate::LegacyPoolRegion) for those.
    pub fn from_path(path: &Path) -> Result<Self, LayoutError> {
        match ConfigTable::from_path(path)? {
            ConfigTable::Pools(rows) => Self::from_records(&rows),
            ConfigTable::Legacy(_) => Err(LayoutError::UnrecognizedSchema {
                source_name: path.display().to_string(),
                columns: crate::table::LEGACY_COLUMNS.join(","),
            }),
        }
    }

    /// Builds a layout from pool-schema rows.
    ///
    /// Every row is parsed, so an unknown pool type anywhere is an error.
    /// The first row for each pool wins.
    pub fn from_records(records: &[PoolRecord]) -> Result<Self, LayoutError> {
        let pools = records
            .iter()
            .map(PoolConfig::from_record)
            .collect::<Result<Vec<_>, _>>()?;

        let take = |pool_type: PoolType| {
            let mut matching = pools.iter().filter(|p| p.pool_type() == pool_type);
            let first = matching
                .next()
                .cloned()
                .ok_or(LayoutError::MissingPool(pool_type))?;
            let extra = matching.count();
            if extra > 0 {
                tracing::warn!(
                    "{} pool defined {} times, using the first row",
                    pool_type,
                    extra + 1
                );
            }
            Ok::<_, LayoutError>(first)
        };

        Ok(Self::new(
            take(PoolType::Brk)?,
            take(PoolType::Mmap)?,
            take(PoolType::File)?,
        ))
    }

    /// Checks pool geometry and transitions to the `Validated` state.
    ///
    /// Only the brk and mmap pools are checked; the file pool's huge pages
    /// are never emitted. Returns the first violation found.
    ///
    /// # Checks (per pool, in order)
    /// 1. The first and last range of each non-empty page-size group lie
    ///    within `[0, pool_size]`.
    /// 2. The 2MB and 1GB offsets are 4KB-aligned.
    /// 3. If both offsets are positive, their difference is 1GB-aligned.
    /// 4. No 2MB range interleaves a 1GB range.
    ///
    /// Check 1 runs for a group even when the other group is empty, which
    /// is stricter than only bounds-checking pools that use both sizes.
    pub fn validate(self) -> Result<LayoutConfig<Validated>, LayoutError> {
        validate_pool(&self.brk)?;
        validate_pool(&self.mmap)?;

        tracing::info!(
            "layout validated: {} x 2MB, {} x 1GB huge pages",
            self.get_total_hugepages_2mb(),
            self.get_total_hugepages_1gb(),
        );

        Ok(LayoutConfig {
            brk: self.brk,
            mmap: self.mmap,
            file: self.file,
            _state: std::marker::PhantomData,
        })
    }
}

fn validate_pool(pool: &PoolConfig) -> Result<(), LayoutError> {
    let pool_type = pool.pool_type();
    let pool_size = pool.pool_size();
    tracing::debug!("validating {} pool", pool_type);

    let ranges_2mb = pool.expanded_ranges(PageSize::Large2Mb)?;
    let ranges_1gb = pool.expanded_ranges(PageSize::Huge1Gb)?;

    // 1) first and last range of each group within the pool.
    for (page_size, ranges) in [
        (PageSize::Large2Mb, &ranges_2mb),
        (PageSize::Huge1Gb, &ranges_1gb),
    ] {
        for range in ranges.first().into_iter().chain(ranges.last()) {
            if !range.fits_within(pool_size) {
                return Err(LayoutError::OutOfBounds {
                    pool: pool_type,
                    page_size,
                    range: *range,
                    pool_size,
                });
            }
        }
    }

    // 2) offsets on base-page boundaries.
    let base = PageSize::Base4Kb.bytes();
    for page_size in PageSize::HUGE {
        let offset = pool.offset(page_size)?;
        if !is_aligned(offset, base) {
            return Err(LayoutError::MisalignedOffset {
                pool: pool_type,
                page_size,
                offset,
            });
        }
    }

    // 3) both offsets set: 1GB-aligned distance.
    let (offset_2mb, offset_1gb) = (pool.offset_2mb(), pool.offset_1gb());
    if offset_2mb > 0
        && offset_1gb > 0
        && !is_aligned(offset_1gb.abs_diff(offset_2mb), PageSize::Huge1Gb.bytes())
    {
        return Err(LayoutError::MisalignedOffsetDelta {
            pool: pool_type,
            offset_2mb,
            offset_1gb,
        });
    }

    // 4) no 2MB/1GB interleave.
    for range_2mb in &ranges_2mb {
        if let Some(range_1gb) = ranges_1gb.iter().find(|r| range_2mb.interleaves(r)) {
            return Err(LayoutError::Interleave {
                pool: pool_type,
                range_2mb: *range_2mb,
                range_1gb: *range_1gb,
            });
        }
    }

    Ok(())
}

// ── Validated state ────────────────────────────────────────────────

impl LayoutConfig<Validated> {
    /// Emits the layout as legacy intervals.
    ///
    /// Order: pool-size markers for brk, mmap, file; then brk's 2MB and 1GB
    /// ranges; then mmap's. File-pool huge pages are never emitted. Within
    /// one page-size group rows are ascending, but consumers should treat the
    /// group as a set. Fails if a range no longer expands.
    pub fn build_legacy_configuration_layout(&self) -> Result<Vec<Interval>, LayoutError> {
        let mut rows: Vec<Interval> = PoolType::ALL
            .iter()
            .map(|&p| Interval::pool_size_marker(p, self.pool(p).pool_size()))
            .collect();

        for pool in [&self.brk, &self.mmap] {
            for page_size in PageSize::HUGE {
                let ranges = pool.expanded_ranges(page_size)?;
                rows.extend(
                    ranges
                        .into_iter()
                        .map(|r| Interval::huge_page(pool.pool_type(), page_size, r)),
                );
            }
        }

        Ok(rows)
    }

    /// Writes the emitted layout to a legacy-schema CSV file.
    pub fn write_legacy_file(&self, path: &Path) -> Result<(), LayoutError> {
        crate::table::write_legacy_file(path, &self.build_legacy_configuration_layout()?)
    }
}

// ── Shared implementations ─────────────────────────────────────────

impl<S: LayoutState> LayoutConfig<S> {
    pub fn brk(&self) -> &PoolConfig {
        &self.brk
    }

    pub fn mmap(&self) -> &PoolConfig {
        &self.mmap
    }

    pub fn file(&self) -> &PoolConfig {
        &self.file
    }

    pub fn pool(&self, pool_type: PoolType) -> &PoolConfig {
        match pool_type {
            PoolType::Brk => &self.brk,
            PoolType::Mmap => &self.mmap,
            PoolType::File => &self.file,
        }
    }

    /// The pools in emission order.
    pub fn pools(&self) -> [&PoolConfig; 3] {
        [&self.brk, &self.mmap, &self.file]
    }

    /// Distinct 2MB pages across brk and mmap.
    pub fn get_total_hugepages_2mb(&self) -> u64 {
        self.brk.pages_2mb_count().saturating_add(self.mmap.pages_2mb_count())
    }

    /// Distinct 1GB pages across brk and mmap.
    pub fn get_total_hugepages_1gb(&self) -> u64 {
        self.brk.pages_1gb_count().saturating_add(self.mmap.pages_1gb_count())
    }

    pub fn summary(&self) -> String {
        format!(
            "layout: brk {}, mmap {}, file {}; {} x 2MB + {} x 1GB huge pages",
            page_ranges::SizeValue::from_bytes(self.brk.pool_size()),
            page_ranges::SizeValue::from_bytes(self.mmap.pool_size()),
            page_ranges::SizeValue::from_bytes(self.file.pool_size()),
            self.get_total_hugepages_2mb(),
            self.get_total_hugepages_1gb(),
        )
    }
}

impl<S: LayoutState> fmt::Display for LayoutConfig<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for pool in self.pools() {
            writeln!(f, "  {pool}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_ranges::ByteRange;
    use std::collections::HashSet;

    const MB: u64 = 1 << 20;
    const GB: u64 = 1 << 30;

    fn record(pool: &str, size: &str, r2: &str, o2: &str, r1: &str, o1: &str) -> PoolRecord {
        PoolRecord {
            pool_type: pool.into(),
            pool_size: size.into(),
            regions_2mb: r2.into(),
            offset_2mb: o2.into(),
            regions_1gb: r1.into(),
            offset_1gb: o1.into(),
        }
    }

    fn layout_with(pool: &str, size: &str, r2: &str, o2: &str, r1: &str, o1: &str) -> LayoutConfig {
        let mut rows = vec![record(pool, size, r2, o2, r1, o1)];
        for other in ["brk", "mmap", "file"] {
            if other != pool {
                rows.push(record(other, "1MB", "", "0", "", "0"));
            }
        }
        LayoutConfig::from_records(&rows).unwrap()
    }

    fn as_set(rows: &[Interval]) -> HashSet<Interval> {
        rows.iter().copied().collect()
    }

    #[test]
    fn test_from_records_missing_pool() {
        let rows = vec![
            record("brk", "1MB", "", "0", "", "0"),
            record("mmap", "1MB", "", "0", "", "0"),
        ];
        assert!(matches!(
            LayoutConfig::from_records(&rows),
            Err(LayoutError::MissingPool(PoolType::File))
        ));
    }

    #[test]
    fn test_from_records_unknown_pool() {
        let rows = vec![
            record("brk", "1MB", "", "0", "", "0"),
            record("stack", "1MB", "", "0", "", "0"),
        ];
        assert!(matches!(
            LayoutConfig::from_records(&rows),
            Err(LayoutError::UnknownPoolType(_))
        ));
    }

    #[test]
    fn test_first_row_wins() {
        let rows = vec![
            record("brk", "1MB", "", "0", "", "0"),
            record("mmap", "2MB", "", "0", "", "0"),
            record("mmap", "4MB", "", "0", "", "0"),
            record("file", "1MB", "", "0", "", "0"),
        ];
        let layout = LayoutConfig::from_records(&rows).unwrap();
        assert_eq!(layout.mmap().pool_size(), 2 * MB);
    }

    #[test]
    fn test_end_to_end_mmap() {
        let layout = layout_with("mmap", "10MB", "0-1", "0", "", "0");
        let layout = layout.validate().unwrap();
        let rows = layout.build_legacy_configuration_layout().unwrap();

        assert!(as_set(&rows).contains(&Interval::pool_size_marker(PoolType::Mmap, 10 * MB)));

        // The emitted 2MB rows cover exactly pages 0 and 1.
        let covered: Vec<ByteRange> = rows
            .iter()
            .filter(|r| r.pool_type == PoolType::Mmap && !r.is_pool_size_marker())
            .map(|r| r.range())
            .collect();
        assert_eq!(covered, vec![ByteRange::new(0, 4 * MB)]);
        assert_eq!(layout.get_total_hugepages_2mb(), 2);
    }

    #[test]
    fn test_legacy_row_order() {
        let rows = vec![
            record("file", "1GB", "0", "0", "", "0"),
            record("mmap", "4GB", "0-1,5", "0", "2", "0"),
            record("brk", "2GB", "3", "0", "1", "0"),
        ];
        let layout = LayoutConfig::from_records(&rows).unwrap().validate().unwrap();
        let out = layout.build_legacy_configuration_layout().unwrap();

        assert_eq!(
            &out[..3],
            &[
                Interval::pool_size_marker(PoolType::Brk, 2 * GB),
                Interval::pool_size_marker(PoolType::Mmap, 4 * GB),
                Interval::pool_size_marker(PoolType::File, GB),
            ]
        );

        let groups: Vec<(PoolType, i64)> = out[3..]
            .iter()
            .map(|r| (r.pool_type, r.page_size.to_legacy()))
            .collect();
        assert_eq!(
            groups,
            vec![
                (PoolType::Brk, 2097152),
                (PoolType::Brk, 1073741824),
                (PoolType::Mmap, 2097152),
                (PoolType::Mmap, 2097152),
                (PoolType::Mmap, 1073741824),
            ]
        );

        // File-pool huge pages are never emitted.
        assert!(out[3..].iter().all(|r| r.pool_type != PoolType::File));
        // mmap 2MB group, compared as a set.
        let mmap_2mb: HashSet<ByteRange> = out
            .iter()
            .filter(|r| {
                r.pool_type == PoolType::Mmap
                    && r.page_size == crate::IntervalPageSize::Page(PageSize::Large2Mb)
            })
            .map(|r| r.range())
            .collect();
        let expected: HashSet<ByteRange> =
            [ByteRange::new(0, 4 * MB), ByteRange::new(10 * MB, 12 * MB)].into();
        assert_eq!(mmap_2mb, expected);
    }

    #[test]
    fn test_totals_exclude_file_pool() {
        let rows = vec![
            record("brk", "4GB", "0-3", "0", "2", "0"),
            record("mmap", "4GB", "0,2", "0", "2-3", "0"),
            record("file", "4GB", "0-99", "0", "0-1", "0"),
        ];
        let layout = LayoutConfig::from_records(&rows).unwrap();
        assert_eq!(layout.get_total_hugepages_2mb(), 6);
        assert_eq!(layout.get_total_hugepages_1gb(), 3);
    }

    #[test]
    fn test_misaligned_2mb_offset() {
        let layout = layout_with("mmap", "10MB", "0", "100", "", "0");
        match layout.validate() {
            Err(LayoutError::MisalignedOffset {
                pool,
                page_size,
                offset,
            }) => {
                assert_eq!(pool, PoolType::Mmap);
                assert_eq!(page_size, PageSize::Large2Mb);
                assert_eq!(offset, 100);
            }
            other => panic!("expected alignment error, got {other:?}"),
        }
    }

    #[test]
    fn test_misaligned_1gb_offset() {
        let layout = layout_with("brk", "4GB", "", "0", "", "2047");
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::MisalignedOffset {
                page_size: PageSize::Huge1Gb,
                ..
            })
        ));
    }

    #[test]
    fn test_offset_delta_must_be_1gb_aligned() {
        let layout = layout_with("brk", "8GB", "0", "4kb", "1", "2mb");
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::MisalignedOffsetDelta { .. })
        ));

        // Offsets 1GB apart are fine.
        let layout = layout_with("brk", "8GB", "0", "4kb", "2", "1048580kb");
        layout.validate().unwrap();

        // A zero offset disables the delta check.
        let layout = layout_with("brk", "8GB", "0", "0", "1", "2mb");
        layout.validate().unwrap();
    }

    #[test]
    fn test_out_of_bounds() {
        let layout = layout_with("mmap", "10MB", "4-5", "0", "", "0");
        match layout.validate() {
            Err(LayoutError::OutOfBounds {
                pool,
                page_size,
                range,
                pool_size,
            }) => {
                assert_eq!(pool, PoolType::Mmap);
                assert_eq!(page_size, PageSize::Large2Mb);
                assert_eq!(range, ByteRange::new(8 * MB, 12 * MB));
                assert_eq!(pool_size, 10 * MB);
            }
            other => panic!("expected bounds error, got {other:?}"),
        }
    }

    #[test]
    fn test_out_of_bounds_1gb() {
        let layout = layout_with("brk", "2GB", "0", "0", "2", "0");
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::OutOfBounds {
                page_size: PageSize::Huge1Gb,
                ..
            })
        ));
    }

    #[test]
    fn test_range_ending_at_pool_size_is_in_bounds() {
        let layout = layout_with("mmap", "10MB", "4", "0", "", "0");
        layout.validate().unwrap();
    }

    #[test]
    fn test_interleave_detected() {
        // 2MB page 512 sits at 1GB, inside 1GB page 1.
        let layout = layout_with("brk", "4GB", "0,512", "0", "1", "0");
        match layout.validate() {
            Err(LayoutError::Interleave {
                pool,
                range_2mb,
                range_1gb,
            }) => {
                assert_eq!(pool, PoolType::Brk);
                assert_eq!(range_2mb, ByteRange::new(GB, GB + 2 * MB));
                assert_eq!(range_1gb, ByteRange::new(GB, 2 * GB));
            }
            other => panic!("expected interleave error, got {other:?}"),
        }
    }

    #[test]
    fn test_touching_ranges_do_not_interleave() {
        // 2MB pages fill [0, 1GB), the 1GB page starts right after.
        let layout = layout_with("brk", "4GB", "0-511", "0", "1", "0");
        layout.validate().unwrap();
    }

    #[test]
    fn test_file_pool_is_not_validated() {
        let rows = vec![
            record("brk", "1MB", "", "0", "", "0"),
            record("mmap", "1MB", "", "0", "", "0"),
            record("file", "1MB", "0-9", "3", "0", "0"),
        ];
        let layout = LayoutConfig::from_records(&rows).unwrap();
        let layout = layout.validate().unwrap();
        assert_eq!(layout.build_legacy_configuration_layout().unwrap().len(), 3);
    }

    #[test]
    fn test_summary_and_display() {
        let layout = layout_with("mmap", "10MB", "0-1", "0", "", "0");
        assert!(layout.summary().contains("mmap 10 MB"));
        let text = layout.to_string();
        assert!(text.contains("brk"));
        assert!(text.contains("0-1"));
    }

    #[test]
    fn test_unexpandable_ranges_are_reported() {
        // Index u64::MAX overflows the byte address; it must surface as an
        // error instead of dropping rows.
        let layout = layout_with("mmap", "10MB", "18446744073709551615", "0", "", "0");
        match layout.validate() {
            Err(LayoutError::InvalidField { pool, field, source }) => {
                assert_eq!(pool, "mmap");
                assert_eq!(field, "ragions_list_2mb");
                assert!(matches!(source, page_ranges::RangeError::AddressOverflow { .. }));
            }
            other => panic!("expected overflow, got {other:?}"),
        }
    }

    #[test]
    fn test_emission_matches_expanded_ranges() {
        let layout = layout_with("brk", "4GB", "0-1,7", "4096", "2", "0")
            .validate()
            .unwrap();
        let rows = layout.build_legacy_configuration_layout().unwrap();
        let huge: Vec<ByteRange> = rows
            .iter()
            .filter(|r| !r.is_pool_size_marker())
            .map(|r| r.range())
            .collect();
        let mut expected = layout.brk().expanded_ranges(PageSize::Large2Mb).unwrap();
        expected.extend(layout.brk().expanded_ranges(PageSize::Huge1Gb).unwrap());
        assert_eq!(huge, expected);
        assert_eq!(rows.len(), 3 + 3);
    }
}
