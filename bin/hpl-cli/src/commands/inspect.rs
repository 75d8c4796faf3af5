// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `hpl inspect` command: display pools, huge-page ranges and page counts.
//!
//! The layout is validated first, so only layouts the allocator would accept
//! are shown. Pool-schema files list all three pools; legacy files list brk
//! and mmap.

use super::CheckedLayout;
use page_ranges::{ByteRange, PageSize, SizeValue};
use pool_layout::{HugePageReservation, LegacyPoolRegion, PoolConfig, PoolType};
use std::path::PathBuf;

#[derive(serde::Serialize)]
struct LayoutReport {
    source: String,
    schema: &'static str,
    pools: Vec<PoolReport>,
    reservation: HugePageReservation,
}

#[derive(serde::Serialize)]
struct PoolReport {
    pool: PoolType,
    pool_size: u64,
    ranges_2mb: Vec<ByteRange>,
    ranges_1gb: Vec<ByteRange>,
    pages_2mb: u64,
    pages_1gb: u64,
}

impl PoolReport {
    fn from_pool(pool: &PoolConfig) -> anyhow::Result<Self> {
        Ok(Self {
            pool: pool.pool_type(),
            pool_size: pool.pool_size(),
            ranges_2mb: pool.expanded_ranges(PageSize::Large2Mb)?,
            ranges_1gb: pool.expanded_ranges(PageSize::Huge1Gb)?,
            pages_2mb: pool.pages_2mb_count(),
            pages_1gb: pool.pages_1gb_count(),
        })
    }

    fn from_legacy(region: &LegacyPoolRegion) -> Self {
        Self {
            pool: region.pool_type(),
            pool_size: region.pool_size(),
            ranges_2mb: region.ranges(PageSize::Large2Mb),
            ranges_1gb: region.ranges(PageSize::Huge1Gb),
            pages_2mb: region.num_large_pages(),
            pages_1gb: region.num_huge_pages(),
        }
    }
}

pub fn execute(input: PathBuf, json: bool) -> anyhow::Result<()> {
    let checked = super::load_checked(&input)?;

    let pools = match &checked {
        CheckedLayout::Pools(layout) => layout
            .pools()
            .into_iter()
            .map(PoolReport::from_pool)
            .collect::<anyhow::Result<Vec<_>>>()?,
        CheckedLayout::Legacy { brk, mmap } => {
            vec![PoolReport::from_legacy(brk), PoolReport::from_legacy(mmap)]
        }
    };
    let report = LayoutReport {
        source: input.display().to_string(),
        schema: checked.schema_name(),
        pools,
        reservation: checked.reservation(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║               hpl · Pool Layout Inspector            ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
    println!("  Source: {}", report.source);
    println!("  Schema: {}", report.schema);
    println!();

    // ── Per-Pool Detail ────────────────────────────────────────
    for pool in &report.pools {
        println!(
            "  {:<5} size {:>10}   {} x 2MB, {} x 1GB",
            pool.pool.as_str(),
            SizeValue::from_bytes(pool.pool_size).to_string(),
            pool.pages_2mb,
            pool.pages_1gb,
        );
        for (label, ranges) in [("2MB", &pool.ranges_2mb), ("1GB", &pool.ranges_1gb)] {
            for range in ranges {
                println!("        {label} {range}");
            }
        }
    }
    println!();

    // ── Reservation ────────────────────────────────────────────
    println!("  Reservation (brk + mmap)");
    println!("   Exact:   {}", report.reservation);
    println!("   Padded:  {}", report.reservation.padded());
    println!(
        "   Memory:  {}",
        SizeValue::from_bytes(report.reservation.total_bytes())
    );
    println!();

    Ok(())
}
