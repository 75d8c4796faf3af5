// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # page-ranges
//!
//! Leaf building blocks for describing where huge pages live inside a
//! memory pool.
//!
//! # Key Components
//!
//! - [`SizeValue`]: a byte count with human-readable parsing (`"10MB"`,
//!   `"3gb"`, `"4096"`).
//! - [`PageSize`]: the three page sizes the allocator understands: 4KB base
//!   pages, 2MB large pages and 1GB huge pages.
//! - [`PageRangeSet`]: a canonical set of huge-page slot indices parsed from
//!   compact range syntax (`"0-2,5"`), with expansion to absolute byte ranges.
//! - [`ByteRange`]: a half-open `[start, end)` byte interval with the
//!   interleave test used by layout validation.
//!
//! # Example
//! ```
//! use page_ranges::{PageRangeSet, PageSize, SizeValue};
//!
//! let set: PageRangeSet = "0,1,2,5".parse().unwrap();
//! assert_eq!(set.encode(), "0-2,5");
//! assert_eq!(set.items_count(), 4);
//!
//! let offset = SizeValue::parse("0").unwrap();
//! let ranges = set
//!     .expand_to_byte_ranges(PageSize::Large2Mb.bytes(), offset.as_bytes())
//!     .unwrap();
//! assert_eq!(ranges[0].start, 0);
//! assert_eq!(ranges[0].end, 3 * PageSize::Large2Mb.bytes());
//! ```

mod error;
mod page;
pub mod range_set;
mod size;

pub use error::RangeError;
pub use page::{is_aligned, PageSize};
pub use range_set::{ByteRange, PageRangeSet, RangeToken};
pub use size::SizeValue;
