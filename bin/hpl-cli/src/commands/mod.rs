// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommands and the helpers they share.

pub mod check;
pub mod convert;
pub mod inspect;

use pool_layout::table::ConfigTable;
use pool_layout::{
    ConversionConfig, HugePageReservation, LayoutConfig, LayoutError, LegacyPoolRegion, PoolType,
    Validated,
};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` takes precedence over `-v`.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads conversion settings, falling back to defaults without `--config`.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<ConversionConfig> {
    match path {
        Some(path) => {
            let config = ConversionConfig::from_file(path)?;
            tracing::debug!("loaded settings from '{}': {:?}", path.display(), config);
            Ok(config)
        }
        None => Ok(ConversionConfig::default()),
    }
}

/// A layout file that passed validation, in whichever schema it was written.
pub enum CheckedLayout {
    Pools(LayoutConfig<Validated>),
    Legacy {
        brk: LegacyPoolRegion,
        mmap: LegacyPoolRegion,
    },
}

impl CheckedLayout {
    pub fn reservation(&self) -> HugePageReservation {
        match self {
            Self::Pools(layout) => HugePageReservation::from_layout(layout),
            Self::Legacy { brk, mmap } => HugePageReservation::from_legacy(&[brk, mmap]),
        }
    }

    pub fn schema_name(&self) -> &'static str {
        match self {
            Self::Pools(_) => "pool",
            Self::Legacy { .. } => "legacy",
        }
    }
}

/// Reads `input`, detects its schema and validates it.
pub fn load_checked(input: &Path) -> anyhow::Result<CheckedLayout> {
    let checked = match ConfigTable::from_path(input).map_err(|e| describe(input, e))? {
        ConfigTable::Pools(rows) => LayoutConfig::from_records(&rows)
            .and_then(|layout| layout.validate())
            .map(CheckedLayout::Pools),
        ConfigTable::Legacy(rows) => LegacyPoolRegion::from_records(&rows, PoolType::Brk)
            .and_then(|brk| {
                let mmap = LegacyPoolRegion::from_records(&rows, PoolType::Mmap)?;
                Ok(CheckedLayout::Legacy { brk, mmap })
            }),
    }
    .map_err(|e| describe(input, e))?;

    tracing::info!(
        "'{}' is a valid {} layout",
        input.display(),
        checked.schema_name()
    );
    Ok(checked)
}

fn describe(input: &Path, err: LayoutError) -> anyhow::Error {
    if err.is_malformed() {
        anyhow::anyhow!("malformed layout '{}': {err}", input.display())
    } else {
        anyhow::anyhow!("cannot read layout '{}': {err}", input.display())
    }
}
