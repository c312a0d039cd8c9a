//! Loading and saving per-generation timeseries.
//!
//! Every generation of a replica leaves one results file:
//!
//! ```csv
//! # methane in IRMOF-1, 298 K, 10 kPa
//! time,loading
//! 0,0.0
//! 1000,2.31
//! 2000,3.05
//! ```
//!
//! Lines starting with `#` and blank lines are ignored. The header's first
//! column must be `time`; the second column holds the observable.

mod csv;

pub use csv::{
    format_timeseries, load_generations, parse_timeseries, read_timeseries, write_timeseries,
};

use std::fmt;

/// Errors that can occur while loading timeseries files.
#[derive(Debug)]
pub enum DataError {
    /// IO error reading or writing a file.
    Io(std::io::Error),

    /// Malformed line.
    Parse {
        /// Line number where the error occurred (1-indexed).
        line: usize,
        /// Description of the parse error.
        message: String,
    },

    /// No header line before the data.
    MissingHeader,

    /// A value that is not a number.
    InvalidValue {
        /// Line number where the invalid value was found (1-indexed).
        line: usize,
        /// The invalid value string.
        value: String,
    },

    /// Rows parsed, but they do not form a valid timeseries.
    Series(gcmc_sampler_core::Error),
}

impl fmt::Display for DataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataError::Io(e) => write!(f, "IO error: {}", e),
            DataError::Parse { line, message } => {
                write!(f, "Parse error at line {}: {}", line, message)
            }
            DataError::MissingHeader => write!(f, "Missing 'time,<observable>' header"),
            DataError::InvalidValue { line, value } => {
                write!(f, "Invalid value at line {}: '{}'", line, value)
            }
            DataError::Series(e) => write!(f, "Invalid timeseries: {}", e),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Io(e) => Some(e),
            DataError::Series(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DataError {
    fn from(e: std::io::Error) -> Self {
        DataError::Io(e)
    }
}

impl From<gcmc_sampler_core::Error> for DataError {
    fn from(e: gcmc_sampler_core::Error) -> Self {
        DataError::Series(e)
    }
}
