// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Huge-page reservation counts for a layout.

use crate::{LayoutConfig, LayoutState, LegacyPoolRegion};
use page_ranges::PageSize;
use std::fmt;
use std::path::Path;

/// Environment variable through which the allocator finds its legacy file.
pub const CONFIGURATION_FILE_ENV: &str = "HPC_CONFIGURATION_FILE";

/// Number of huge pages of each size a layout needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct HugePageReservation {
    pub pages_2mb: u64,
    pub pages_1gb: u64,
}

impl HugePageReservation {
    pub fn new(pages_2mb: u64, pages_1gb: u64) -> Self {
        Self {
            pages_2mb,
            pages_1gb,
        }
    }

    /// Distinct huge pages of the brk and mmap pools.
    pub fn from_layout<S: LayoutState>(layout: &LayoutConfig<S>) -> Self {
        Self::new(
            layout.get_total_hugepages_2mb(),
            layout.get_total_hugepages_1gb(),
        )
    }

    /// Sums the page counts of legacy pool regions.
    pub fn from_legacy(regions: &[&LegacyPoolRegion]) -> Self {
        regions.iter().fold(Self::default(), |acc, region| {
            Self::new(
                acc.pages_2mb.saturating_add(region.num_large_pages()),
                acc.pages_1gb.saturating_add(region.num_huge_pages()),
            )
        })
    }

    /// Adds one spare page to every nonzero count.
    pub fn padded(self) -> Self {
        let pad = |n: u64| if n > 0 { n.saturating_add(1) } else { 0 };
        Self::new(pad(self.pages_2mb), pad(self.pages_1gb))
    }

    pub fn pages(&self, page_size: PageSize) -> u64 {
        match page_size {
            PageSize::Large2Mb => self.pages_2mb,
            PageSize::Huge1Gb => self.pages_1gb,
            PageSize::Base4Kb => 0,
        }
    }

    /// Bytes of huge-page memory reserved.
    pub fn total_bytes(&self) -> u64 {
        self.pages_2mb
            .saturating_mul(PageSize::Large2Mb.bytes())
            .saturating_add(self.pages_1gb.saturating_mul(PageSize::Huge1Gb.bytes()))
    }

    pub fn is_empty(&self) -> bool {
        self.pages_2mb == 0 && self.pages_1gb == 0
    }
}

impl fmt::Display for HugePageReservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x 2MB, {} x 1GB", self.pages_2mb, self.pages_1gb)
    }
}

/// Renders a `NAME=path` line for exporting the legacy file location.
pub fn env_assignment(var: &str, path: &Path) -> String {
    format!("{var}={}", path.display())
}
