// SPDX-FileCopyrightText: 2026 Cadence Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CSV rendering of exported views.

use std::io::Write;

use chrono::SecondsFormat;

use cadence_core::CadenceError;

use crate::report::ExportRow;

const HEADER: [&str; 3] = ["profile_id", "occurred_at", "source"];

/// Write `rows` as `profile_id,occurred_at,source` with RFC 3339 timestamps.
/// Returns the number of data rows written.
pub fn write_csv<W: Write>(rows: &[ExportRow], writer: W) -> Result<usize, CadenceError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(HEADER).map_err(csv_err)?;
    for row in rows {
        let source: &'static str = row.source.into();
        csv.write_record([
            row.profile_id.as_str(),
            &row.occurred_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            source,
        ])
        .map_err(csv_err)?;
    }
    csv.flush()
        .map_err(|e| CadenceError::Internal(format!("csv flush failed: {e}")))?;
    Ok(rows.len())
}

fn csv_err(e: csv::Error) -> CadenceError {
    CadenceError::Internal(format!("csv export failed: {e}"))
}
