// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `hpl check` command: validate a layout of either schema.

use std::path::PathBuf;

pub fn execute(input: PathBuf) -> anyhow::Result<()> {
    let checked = super::load_checked(&input)?;
    println!(
        "{}: valid {} layout ({})",
        input.display(),
        checked.schema_name(),
        checked.reservation(),
    );
    Ok(())
}
