// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! CSV configuration tables and schema detection.
//!
//! Two table layouts are understood:
//!
//! | Schema | Columns | Rows |
//! |---|---|---|
//! | [`Schema::Pools`] | `pool_type, pool_size, ragions_list_2mb, offset_2mb, ragions_list_1gb, offset_1gb` | one per pool |
//! | [`Schema::Legacy`] | `type, pageSize, startOffset, endOffset` | one per interval |
//!
//! The `ragions` spelling is part of the on-disk format. Detection looks at
//! the header only; extra columns are ignored and the pool schema wins when
//! a header happens to satisfy both.

use crate::{Interval, LayoutError};
use std::io;
use std::path::Path;

/// Column names of the pool schema.
pub const POOL_COLUMNS: [&str; 6] = [
    "pool_type",
    "pool_size",
    "ragions_list_2mb",
    "offset_2mb",
    "ragions_list_1gb",
    "offset_1gb",
];

/// Column names of the legacy schema, in output order.
pub const LEGACY_COLUMNS: [&str; 4] = ["type", "pageSize", "startOffset", "endOffset"];

/// One row of a pool-schema table. All cells are kept as text and parsed by
/// [`PoolConfig::from_record`](crate::PoolConfig::from_record).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PoolRecord {
    pub pool_type: String,
    pub pool_size: String,
    #[serde(rename = "ragions_list_2mb", default)]
    pub regions_2mb: String,
    pub offset_2mb: String,
    #[serde(rename = "ragions_list_1gb", default)]
    pub regions_1gb: String,
    pub offset_1gb: String,
}

/// One row of a legacy-schema table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct LegacyRecord {
    #[serde(rename = "type")]
    pub pool_type: String,
    #[serde(rename = "pageSize")]
    pub page_size: i64,
    #[serde(rename = "startOffset")]
    pub start_offset: i64,
    #[serde(rename = "endOffset")]
    pub end_offset: i64,
}

/// The layout of a configuration table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    /// One row per pool with compact huge-page range lists.
    Pools,
    /// One row per interval, as read by the allocator.
    Legacy,
}

impl Schema {
    /// Detects the schema from a header row.
    pub fn detect<'a, I>(columns: I, source_name: &str) -> Result<Self, LayoutError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let columns: Vec<&str> = columns.into_iter().map(str::trim).collect();
        let has_all = |required: &[&str]| required.iter().all(|c| columns.contains(c));

        if has_all(&POOL_COLUMNS) {
            Ok(Self::Pools)
        } else if has_all(&LEGACY_COLUMNS) {
            Ok(Self::Legacy)
        } else {
            Err(LayoutError::UnrecognizedSchema {
                source_name: source_name.to_string(),
                columns: columns.join(","),
            })
        }
    }
}

/// The rows of a configuration file, tagged by schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigTable {
    Pools(Vec<PoolRecord>),
    Legacy(Vec<LegacyRecord>),
}

impl ConfigTable {
    /// Reads and classifies a CSV configuration file.
    pub fn from_path(path: &Path) -> Result<Self, LayoutError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, &path.display().to_string())
    }

    /// Reads and classifies CSV data. `source_name` is only used in errors.
    pub fn from_reader<R: io::Read>(reader: R, source_name: &str) -> Result<Self, LayoutError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let schema = Schema::detect(headers.iter(), source_name)?;
        tracing::debug!("'{}': detected {:?} schema", source_name, schema);

        let table = match schema {
            Schema::Pools => Self::Pools(rdr.deserialize().collect::<Result<_, _>>()?),
            Schema::Legacy => Self::Legacy(rdr.deserialize().collect::<Result<_, _>>()?),
        };
        Ok(table)
    }

    pub fn schema(&self) -> Schema {
        match self {
            Self::Pools(_) => Schema::Pools,
            Self::Legacy(_) => Schema::Legacy,
        }
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        match self {
            Self::Pools(rows) => rows.len(),
            Self::Legacy(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Writes intervals as a legacy-schema CSV table, header first.
///
/// Every interval is converted before anything is written.
pub fn write_legacy_csv<W: io::Write>(writer: W, intervals: &[Interval]) -> Result<(), LayoutError> {
    let records = legacy_records(intervals)?;
    write_records(writer, &records)
}

/// Writes intervals to a legacy-schema CSV file.
///
/// The file is only created once every interval fits the legacy columns.
pub fn write_legacy_file(path: &Path, intervals: &[Interval]) -> Result<(), LayoutError> {
    let records = legacy_records(intervals)?;
    let file = std::fs::File::create(path)?;
    write_records(io::BufWriter::new(file), &records)?;
    tracing::info!(
        "wrote {} legacy rows to '{}'",
        records.len(),
        path.display()
    );
    Ok(())
}

fn legacy_records(intervals: &[Interval]) -> Result<Vec<LegacyRecord>, LayoutError> {
    intervals.iter().map(Interval::to_record).collect()
}

fn write_records<W: io::Write>(writer: W, records: &[LegacyRecord]) -> Result<(), LayoutError> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(LEGACY_COLUMNS)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}
