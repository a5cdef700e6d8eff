//! Error types for vcfscore.
//!
//! Every failure is one of three kinds: the file could not be read or
//! written, its contents were not a well-formed variant table, or a
//! metric had a zero denominator.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::score::Metric;

#[derive(Debug, Error)]
pub enum VcfError {
    /// Missing or unreadable path, bad compression, or a failed write.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed header, column count mismatch or a bad field value.
    /// `line` is 1-based, or 0 when the problem is not tied to one line.
    #[error("parse error in '{}' at line {line}: {msg}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        msg: String,
    },

    /// A metric whose denominator is zero.
    #[error("{metric} is undefined: {reason}")]
    Division { metric: Metric, reason: String },
}

pub type Result<T> = std::result::Result<T, VcfError>;

impl VcfError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        VcfError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn parse(path: &Path, line: usize, msg: impl Into<String>) -> Self {
        VcfError::Parse {
            path: path.to_path_buf(),
            line,
            msg: msg.into(),
        }
    }
}
