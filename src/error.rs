use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EdfError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// 缓冲区比所需字段/记录的范围短
    #[error("Truncated file: {what} needs {expected} bytes at offset {offset}, only {available} available")]
    Truncated {
        what: String,
        offset: usize,
        expected: usize,
        available: usize,
    },

    /// 固定宽度字段无法解析为所需的数值类型
    #[error("Field `{field}` at offset {offset} is not a valid {kind}: {text:?}")]
    FieldFormat {
        field: String,
        offset: usize,
        kind: &'static str,
        text: String,
    },

    #[error("Unknown channel: {0:?}")]
    UnknownChannel(String),

    #[error("Signal index {0} out of range")]
    InvalidSignalIndex(usize),

    #[error("Cannot calibrate channel {label:?}: digital min equals digital max ({digital})")]
    Calibration {
        label: String,
        digital: i32,
    },

    #[error("Header declares {declared} bytes, expected {expected} for {signal_count} signals")]
    InvalidHeaderSize {
        declared: usize,
        expected: usize,
        signal_count: usize,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl EdfError {
    pub(crate) fn truncated(what: impl Into<String>, offset: usize, expected: usize, len: usize) -> Self {
        EdfError::Truncated {
            what: what.into(),
            offset,
            expected,
            available: len.saturating_sub(offset),
        }
    }
}

pub type Result<T> = std::result::Result<T, EdfError>;
