use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::calibration::Calibration;
use crate::error::{EdfError, Result};
use crate::field::{parse_float, parse_int};
use crate::header::{
    HEADER_BYTE_COUNT_OFFSET, RECORD_COUNT_OFFSET, RECORD_DURATION_OFFSET, START_DATE_OFFSET,
    START_TIME_OFFSET,
};
use crate::{EDF_HEADER_SIZE, SIGNAL_HEADER_SIZE};

/// The 256-byte global header of an EDF file.
///
/// Only `signal_count` is converted eagerly. The other numeric fields are kept
/// as the trimmed header text and converted on demand by the accessors below,
/// since several of them are informational only.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalHeader {
    pub version: String,
    pub patient_id: String,
    pub recording_id: String,
    pub start_date: String,
    pub start_time: String,
    pub header_byte_count: String,
    /// 保留字段，EDF+ 文件以 "EDF+C" 或 "EDF+D" 开头
    pub reserved: String,
    pub record_count: String,
    /// Seconds per data record, as text
    pub record_duration: String,
    pub signal_count: usize,
}

impl GlobalHeader {
    /// Total header size declared at offset 184
    pub fn header_byte_count_value(&self) -> Result<usize> {
        parse_int(&self.header_byte_count, "header_byte_count", HEADER_BYTE_COUNT_OFFSET)
    }

    /// Number of data records declared at offset 236.
    ///
    /// EDF uses `-1` while a recording is still being written; that value is
    /// returned as-is and left to the caller to resolve.
    pub fn record_count_value(&self) -> Result<i64> {
        parse_int(&self.record_count, "record_count", RECORD_COUNT_OFFSET)
    }

    pub fn record_duration_secs(&self) -> Result<f64> {
        parse_float(&self.record_duration, "record_duration", RECORD_DURATION_OFFSET)
    }

    /// Header size implied by the signal count: `256 + 256 × signal_count`
    pub fn expected_header_bytes(&self) -> usize {
        EDF_HEADER_SIZE + SIGNAL_HEADER_SIZE * self.signal_count
    }

    /// Cross-checks the declared header size against the signal count.
    ///
    /// An unparsable declaration counts as inconsistent.
    pub fn has_consistent_size(&self) -> bool {
        self.header_byte_count_value()
            .map(|declared| declared == self.expected_header_bytes())
            .unwrap_or(false)
    }

    pub fn is_edf_plus(&self) -> bool {
        self.reserved.starts_with("EDF+")
    }

    /// Parses the `dd.mm.yy` start date and `hh.mm.ss` start time.
    ///
    /// Two-digit years follow the EDF clipping rule: 85-99 map to 19xx, the
    /// rest to 20xx.
    pub fn start_datetime(&self) -> Result<NaiveDateTime> {
        let [day, month, yy] =
            split_triplet(&self.start_date, "start_date", START_DATE_OFFSET)?;
        let year = if yy > 84 { 1900 + yy } else { 2000 + yy };

        let date = NaiveDate::from_ymd_opt(year as i32, month, day)
            .ok_or_else(|| invalid_datetime("start_date", START_DATE_OFFSET, &self.start_date))?;

        let [hour, minute, second] =
            split_triplet(&self.start_time, "start_time", START_TIME_OFFSET)?;
        let time = NaiveTime::from_hms_opt(hour, minute, second)
            .ok_or_else(|| invalid_datetime("start_time", START_TIME_OFFSET, &self.start_time))?;

        Ok(NaiveDateTime::new(date, time))
    }
}

fn split_triplet(text: &str, name: &str, offset: usize) -> Result<[u32; 3]> {
    let parts: Vec<&str> = text.split('.').collect();
    if parts.len() != 3 {
        return Err(invalid_datetime(name, offset, text));
    }

    let mut values = [0u32; 3];
    for (value, part) in values.iter_mut().zip(&parts) {
        *value = parse_int(part, name, offset)?;
    }
    Ok(values)
}

fn invalid_datetime(name: &str, offset: usize, text: &str) -> EdfError {
    EdfError::FieldFormat {
        field: name.to_string(),
        offset,
        kind: "date/time",
        text: text.to_string(),
    }
}

/// Per-channel metadata from the signal header block.
///
/// The position of a descriptor in the table is its channel index.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalDescriptor {
    pub label: String,
    pub transducer_type: String,
    pub physical_dimension: String,
    pub physical_min: f64,
    pub physical_max: f64,
    pub digital_min: i32,
    pub digital_max: i32,
    pub prefiltering: String,
    pub samples_per_record: usize,
    pub reserved: String,
}

impl SignalDescriptor {
    /// Linear digital-to-physical mapping for this channel
    pub fn calibration(&self) -> Result<Calibration> {
        Calibration::for_signal(self)
    }

    /// 采样率 (Hz)，需要数据记录的时长
    pub fn sample_rate(&self, record_duration_secs: f64) -> Option<f64> {
        if record_duration_secs > 0.0 {
            Some(self.samples_per_record as f64 / record_duration_secs)
        } else {
            None
        }
    }

    /// Label as shown in channel listings: `"<label> - <transducer> (<unit>)"`
    pub fn display_label(&self) -> String {
        format!("{} - {} ({})", self.label, self.transducer_type, self.physical_dimension)
    }
}

/// Recovers the bare channel label from a display label.
///
/// Everything after the first `" - "` is dropped; plain labels pass through.
///
/// ```rust
/// use edfread::types::strip_display_label;
///
/// assert_eq!(strip_display_label("EEG Fp1 - AgAgCl (uV)"), "EEG Fp1");
/// assert_eq!(strip_display_label("ECG"), "ECG");
/// ```
pub fn strip_display_label(display: &str) -> &str {
    display.split(" - ").next().unwrap_or(display)
}
