//! Global header parsing (first 256 bytes of the file).

use log::debug;

use crate::error::{EdfError, Result};
use crate::field::{read_field, read_int_field};
use crate::types::GlobalHeader;
use crate::EDF_HEADER_SIZE;

pub const VERSION_OFFSET: usize = 0;
pub const PATIENT_ID_OFFSET: usize = 8;
pub const RECORDING_ID_OFFSET: usize = 88;
pub const START_DATE_OFFSET: usize = 168;
pub const START_TIME_OFFSET: usize = 176;
pub const HEADER_BYTE_COUNT_OFFSET: usize = 184;
pub const RESERVED_OFFSET: usize = 192;
pub const RECORD_COUNT_OFFSET: usize = 236;
pub const RECORD_DURATION_OFFSET: usize = 244;
pub const SIGNAL_COUNT_OFFSET: usize = 252;

/// (name, offset, width) of every global header field, in file order
pub const HEADER_FIELDS: [(&str, usize, usize); 10] = [
    ("version", VERSION_OFFSET, 8),
    ("patient_id", PATIENT_ID_OFFSET, 80),
    ("recording_id", RECORDING_ID_OFFSET, 80),
    ("start_date", START_DATE_OFFSET, 8),
    ("start_time", START_TIME_OFFSET, 8),
    ("header_byte_count", HEADER_BYTE_COUNT_OFFSET, 8),
    ("reserved", RESERVED_OFFSET, 44),
    ("record_count", RECORD_COUNT_OFFSET, 8),
    ("record_duration", RECORD_DURATION_OFFSET, 8),
    ("signal_count", SIGNAL_COUNT_OFFSET, 4),
];

/// Parses the 256-byte global header.
///
/// # Errors
///
/// * `EdfError::Truncated` - `file_bytes` is shorter than 256 bytes
/// * `EdfError::FieldFormat` - the signal count is not a non-negative integer
///
/// # Examples
///
/// ```rust
/// use edfread::doctest_utils::{build_edf, SyntheticSignal};
/// use edfread::header::parse_header;
///
/// let bytes = build_edf(&[SyntheticSignal::new("EEG", 4)], &[vec![vec![0; 4]]]);
/// let header = parse_header(&bytes)?;
///
/// assert_eq!(header.signal_count, 1);
/// assert_eq!(header.header_byte_count, "512");
/// assert!(header.has_consistent_size());
/// # Ok::<(), edfread::EdfError>(())
/// ```
pub fn parse_header(file_bytes: &[u8]) -> Result<GlobalHeader> {
    if file_bytes.len() < EDF_HEADER_SIZE {
        return Err(EdfError::truncated("global header", 0, EDF_HEADER_SIZE, file_bytes.len()));
    }

    let text = |index: usize| -> Result<String> {
        let (_, offset, width) = HEADER_FIELDS[index];
        read_field(file_bytes, offset, width)
    };

    // 信号数量是唯一需要立即转换的字段
    let signal_count: usize = read_int_field(file_bytes, SIGNAL_COUNT_OFFSET, 4, "signal_count")?;

    let header = GlobalHeader {
        version: text(0)?,
        patient_id: text(1)?,
        recording_id: text(2)?,
        start_date: text(3)?,
        start_time: text(4)?,
        header_byte_count: text(5)?,
        reserved: text(6)?,
        record_count: text(7)?,
        record_duration: text(8)?,
        signal_count,
    };

    debug!(
        "parsed EDF header: version={:?} signals={} records={:?} header_bytes={:?}",
        header.version, header.signal_count, header.record_count, header.header_byte_count
    );

    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctest_utils::{build_edf, SyntheticSignal};

    #[test]
    fn test_field_table_covers_header() {
        let mut end = 0;
        for (name, offset, width) in HEADER_FIELDS {
            assert_eq!(offset, end, "gap before {}", name);
            end = offset + width;
        }
        assert_eq!(end, EDF_HEADER_SIZE);
    }

    #[test]
    fn test_parse_header_fields() {
        let signals = [SyntheticSignal::new("A", 1), SyntheticSignal::new("B", 2)];
        let records = vec![vec![vec![1], vec![2, 3]]; 3];
        let bytes = build_edf(&signals, &records);

        let header = parse_header(&bytes).unwrap();
        assert_eq!(header.version, "0");
        assert_eq!(header.patient_id, "X X X X");
        assert_eq!(header.start_date, "18.10.26");
        assert_eq!(header.start_time, "10.00.00");
        assert_eq!(header.header_byte_count, "768");
        assert_eq!(header.record_count, "3");
        assert_eq!(header.record_duration, "1");
        assert_eq!(header.signal_count, 2);
        assert_eq!(header.expected_header_bytes(), 768);
    }

    #[test]
    fn test_truncated_header() {
        let bytes = vec![b' '; 255];
        match parse_header(&bytes) {
            Err(EdfError::Truncated { expected, available, .. }) => {
                assert_eq!(expected, 256);
                assert_eq!(available, 255);
            }
            other => panic!("expected truncation, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_signal_count() {
        let mut bytes = build_edf(&[SyntheticSignal::new("A", 1)], &[vec![vec![0]]]);
        bytes[252..256].copy_from_slice(b"ab  ");
        assert!(matches!(
            parse_header(&bytes),
            Err(EdfError::FieldFormat { offset: 252, .. })
        ));
    }

    #[test]
    fn test_header_fields_stay_text() {
        let mut bytes = build_edf(&[SyntheticSignal::new("A", 1)], &[vec![vec![0]]]);
        // 非数字的记录数量不影响头部解析
        bytes[236..244].copy_from_slice(b"unknown ");
        let header = parse_header(&bytes).unwrap();
        assert_eq!(header.record_count, "unknown");
        assert!(header.record_count_value().is_err());
    }
}
