// =============================================================================
// CSV Export
// =============================================================================
//
// One row per price point:
//   timestamp,price,ma_{fast},ma_{slow},rsi_{window}
// Undefined indicator values are written as empty fields.
// =============================================================================

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::indicators::IndicatorFrame;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Write `frame` as CSV to `writer`.  Returns the number of data rows.
pub fn write_csv<W: Write>(mut writer: W, frame: &IndicatorFrame) -> Result<usize> {
    let params = frame.params;

    writeln!(
        writer,
        "timestamp,price,ma_{},ma_{},rsi_{}",
        params.fast_window, params.slow_window, params.rsi_window
    )?;

    let rows = frame
        .series
        .points()
        .iter()
        .zip(&frame.ma_fast)
        .zip(&frame.ma_slow)
        .zip(&frame.rsi);

    let mut count = 0;
    for (((point, ma_fast), ma_slow), rsi) in rows {
        writeln!(
            writer,
            "{},{},{},{},{}",
            point.timestamp.format(TIMESTAMP_FORMAT),
            point.price,
            field(*ma_fast),
            field(*ma_slow),
            field(*rsi),
        )?;
        count += 1;
    }

    writer.flush()?;
    Ok(count)
}

/// Write `frame` as CSV to the file at `path`, replacing it if present.
pub fn save_csv(path: &Path, frame: &IndicatorFrame) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create CSV file {}", path.display()))?;

    let rows = write_csv(BufWriter::new(file), frame)
        .with_context(|| format!("failed to write CSV file {}", path.display()))?;

    info!(path = %path.display(), rows, "CSV saved");
    Ok(())
}

fn field(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => v.to_string(),
        _ => String::new(),
    }
}
