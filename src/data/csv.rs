//! CSV parsing for generation results.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use gcmc_sampler_core::TimeSeries;

use super::DataError;

/// Parse a results table from any buffered reader.
///
/// Extra columns after the second are ignored. Steps written as floats
/// (`1000.0`) are accepted as long as they are whole numbers.
///
/// # Errors
/// Returns `DataError` on a missing header, malformed rows, or rows that do
/// not form a strictly increasing, finite timeseries.
pub fn parse_timeseries<R: BufRead>(reader: R) -> Result<TimeSeries, DataError> {
    let mut steps = Vec::new();
    let mut values = Vec::new();
    let mut seen_header = false;

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        let line = line.trim();
        let line_no = line_num + 1;

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split(',').map(str::trim).collect();
        if !seen_header {
            if !parts[0].eq_ignore_ascii_case("time") || parts.len() < 2 {
                return Err(DataError::MissingHeader);
            }
            seen_header = true;
            continue;
        }

        if parts.len() < 2 {
            return Err(DataError::Parse {
                line: line_no,
                message: format!("expected 'step,value', got '{}'", line),
            });
        }

        steps.push(parse_step(parts[0], line_no)?);
        let value: f64 = parts[1].parse().map_err(|_| DataError::InvalidValue {
            line: line_no,
            value: parts[1].to_string(),
        })?;
        values.push(value);
    }

    if !seen_header {
        return Err(DataError::MissingHeader);
    }
    Ok(TimeSeries::new(steps, values)?)
}

fn parse_step(raw: &str, line: usize) -> Result<u64, DataError> {
    if let Ok(step) = raw.parse::<u64>() {
        return Ok(step);
    }
    let invalid = || DataError::InvalidValue {
        line,
        value: raw.to_string(),
    };
    let step: f64 = raw.parse().map_err(|_| invalid())?;
    if step.is_finite() && step >= 0.0 && step.fract() == 0.0 && step <= u64::MAX as f64 {
        Ok(step as u64)
    } else {
        Err(invalid())
    }
}

/// Load one results file.
pub fn read_timeseries(path: &Path) -> Result<TimeSeries, DataError> {
    let file = File::open(path)?;
    parse_timeseries(BufReader::new(file))
}

/// Render a timeseries as a results table with header `time,<name>`.
pub fn format_timeseries(series: &TimeSeries, name: &str) -> String {
    let mut out = format!("time,{}\n", name);
    for sample in series.iter() {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{},{}", sample.step, sample.value);
    }
    out
}

/// Write a results table to `path`, replacing any existing file.
pub fn write_timeseries(path: &Path, series: &TimeSeries, name: &str) -> Result<(), DataError> {
    std::fs::write(path, format_timeseries(series, name))?;
    Ok(())
}

/// Load a replica's generation files in order and stitch them together.
pub fn load_generations<P: AsRef<Path>>(paths: &[P]) -> Result<TimeSeries, DataError> {
    let segments = paths
        .iter()
        .map(|p| read_timeseries(p.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TimeSeries::stitch_all(&segments)?)
}
