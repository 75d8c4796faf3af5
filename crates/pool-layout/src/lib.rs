// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # pool-layout
//!
//! Huge-page pool layouts for a process-wide allocator that splits memory into
//! three pools: `brk`, `mmap` and `file`.
//!
//! A layout arrives as a CSV file in one of two schemas:
//!
//! - the **pool schema**, one row per pool with compact range lists such as
//!   `"[0-2,5]"` naming which 2MB / 1GB page slots are huge-page backed;
//! - the **legacy schema**, one row per interval, which is what the
//!   allocator reads at startup.
//!
//! # Key Components
//!
//! - [`PoolConfig`]: one parsed pool row.
//! - [`LayoutConfig`]: the three pools, type-stated from `Parsed` to
//!   `Validated`. Only a validated layout emits legacy [`Interval`]s.
//! - [`LegacyPoolRegion`]: one pool loaded from a legacy file and checked.
//! - [`HugePageReservation`]: how many huge pages to reserve for a layout.
//! - [`ConversionConfig`]: TOML settings for the conversion tool.
//!
//! # Pipeline
//!
//! ```text
//! pool-schema CSV ─► LayoutConfig<Parsed> ─► .validate() ─► LayoutConfig<Validated>
//!                                                                │
//!                                     build_legacy_configuration_layout()
//!                                                                ▼
//!                                     legacy-schema CSV ─► LegacyPoolRegion
//! ```
//!
//! # Example
//! ```
//! use pool_layout::{LayoutConfig, PoolType};
//! use pool_layout::table::PoolRecord;
//!
//! let row = |pool: &str, size: &str, regions: &str| PoolRecord {
//!     pool_type: pool.into(),
//!     pool_size: size.into(),
//!     regions_2mb: regions.into(),
//!     offset_2mb: "0".into(),
//!     regions_1gb: String::new(),
//!     offset_1gb: "0".into(),
//! };
//! let rows = [row("brk", "4MB", ""), row("mmap", "10MB", "0-1"), row("file", "0", "")];
//!
//! let layout = LayoutConfig::from_records(&rows).unwrap().validate().unwrap();
//! assert_eq!(layout.get_total_hugepages_2mb(), 2);
//!
//! let rows = layout.build_legacy_configuration_layout().unwrap();
//! assert!(rows.iter().any(|r| r.pool_type == PoolType::Mmap && !r.is_pool_size_marker()));
//! ```

mod config;
mod error;
mod interval;
pub mod layout;
mod legacy;
mod pool;
mod reservation;
pub mod table;

pub use config::ConversionConfig;
pub use error::LayoutError;
pub use interval::{Interval, IntervalPageSize};
pub use layout::{LayoutConfig, LayoutState, Parsed, Validated};
pub use legacy::LegacyPoolRegion;
pub use pool::{PoolConfig, PoolType};
pub use reservation::{env_assignment, HugePageReservation, CONFIGURATION_FILE_ENV};
