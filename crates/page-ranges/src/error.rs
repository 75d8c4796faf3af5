// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for size and range parsing.

/// Errors that can occur while parsing sizes or page-index ranges.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// The size string is neither a plain byte count nor `<int><unit>`.
    #[error("invalid size string: '{input}'")]
    InvalidSize { input: String },

    /// The size string ends in a suffix other than `kb`, `mb` or `gb`.
    #[error("invalid unit '{unit}' in size string '{input}' (expected kb, mb or gb)")]
    UnknownUnit { input: String, unit: String },

    /// The parsed size does not fit in 64 bits.
    #[error("size overflow: '{input}'")]
    SizeOverflow { input: String },

    /// A range token is empty or not a number / `a-b` pair.
    #[error("invalid range token: '{token}'")]
    InvalidToken { token: String },

    /// A range token whose first index is greater than its last.
    #[error("reversed range token: {first}-{last}")]
    ReversedRange { first: u64, last: u64 },

    /// Expanding an index to a byte address overflowed.
    #[error("address overflow expanding index {index} (page size {page_size}, offset {offset})")]
    AddressOverflow {
        index: u64,
        page_size: u64,
        offset: u64,
    },
}
