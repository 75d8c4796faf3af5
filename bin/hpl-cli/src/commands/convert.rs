// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `hpl convert` command: validate a layout and produce the legacy file.
//!
//! Prints the environment assignment that points the allocator at the legacy
//! file, followed by the huge-page counts to reserve. A legacy-schema input
//! is already in the final format and is only validated.

use super::CheckedLayout;
use pool_layout::{env_assignment, ConversionConfig};
use std::path::PathBuf;

pub fn execute(
    config: &ConversionConfig,
    input: PathBuf,
    output: Option<PathBuf>,
    no_padding: bool,
) -> anyhow::Result<()> {
    let checked = super::load_checked(&input)?;

    let legacy_path = match &checked {
        CheckedLayout::Pools(layout) => {
            tracing::info!("{}", layout.summary());
            let output = output.unwrap_or_else(|| config.output_path.clone());
            layout.write_legacy_file(&output).map_err(|e| {
                anyhow::anyhow!("failed to write '{}': {e}", output.display())
            })?;
            output
        }
        CheckedLayout::Legacy { .. } => {
            if output.is_some() {
                tracing::warn!("input is already a legacy layout; --output ignored");
            }
            input
        }
    };

    let mut reservation = checked.reservation();
    if config.pad_reservation && !no_padding {
        reservation = reservation.padded();
    }

    println!("{}", env_assignment(&config.env_var, &legacy_path));
    println!("hugepages-2MB={}", reservation.pages_2mb);
    println!("hugepages-1GB={}", reservation.pages_1gb);
    Ok(())
}
