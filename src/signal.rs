//! Signal descriptor table.
//!
//! EDF stores per-signal metadata column-wise: all labels first, then all
//! transducer types, and so on. Each sub-array holds `signal_count` fields of
//! one fixed width, and the sub-arrays follow each other from byte 256.

use log::debug;

use crate::error::{EdfError, Result};
use crate::field::{parse_float, parse_int, read_field};
use crate::types::SignalDescriptor;
use crate::{EDF_HEADER_SIZE, SIGNAL_HEADER_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalField {
    Label,
    Transducer,
    PhysicalDimension,
    PhysicalMin,
    PhysicalMax,
    DigitalMin,
    DigitalMax,
    Prefiltering,
    SamplesPerRecord,
    Reserved,
}

/// Sub-array order and field width, as laid out in the file
pub const SIGNAL_FIELDS: [(SignalField, usize); 10] = [
    (SignalField::Label, 16),
    (SignalField::Transducer, 80),
    (SignalField::PhysicalDimension, 8),
    (SignalField::PhysicalMin, 8),
    (SignalField::PhysicalMax, 8),
    (SignalField::DigitalMin, 8),
    (SignalField::DigitalMax, 8),
    (SignalField::Prefiltering, 80),
    (SignalField::SamplesPerRecord, 8),
    (SignalField::Reserved, 32),
];

impl SignalField {
    pub fn name(self) -> &'static str {
        match self {
            SignalField::Label => "label",
            SignalField::Transducer => "transducer_type",
            SignalField::PhysicalDimension => "physical_dimension",
            SignalField::PhysicalMin => "physical_min",
            SignalField::PhysicalMax => "physical_max",
            SignalField::DigitalMin => "digital_min",
            SignalField::DigitalMax => "digital_max",
            SignalField::Prefiltering => "prefiltering",
            SignalField::SamplesPerRecord => "samples_per_record",
            SignalField::Reserved => "reserved",
        }
    }

    pub fn width(self) -> usize {
        SIGNAL_FIELDS[self as usize].1
    }
}

/// Absolute byte span of one sub-array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpan {
    pub field: SignalField,
    pub start: usize,
    pub width: usize,
    pub count: usize,
}

impl FieldSpan {
    /// Offset of the field belonging to signal `index`
    pub fn entry_offset(&self, index: usize) -> usize {
        self.start + index * self.width
    }

    pub fn end(&self) -> usize {
        self.start + self.width * self.count
    }
}

/// Computes the sub-array spans for `signal_count` signals.
///
/// ```rust
/// use edfread::signal::{field_spans, SignalField};
///
/// let spans = field_spans(2);
/// assert_eq!(spans[0].start, 256);
/// assert_eq!(spans[1].field, SignalField::Transducer);
/// assert_eq!(spans[1].start, 256 + 16 * 2);
/// assert_eq!(spans[9].end(), 256 + 256 * 2);
/// ```
pub fn field_spans(signal_count: usize) -> Vec<FieldSpan> {
    let mut start = EDF_HEADER_SIZE;
    SIGNAL_FIELDS
        .iter()
        .map(|&(field, width)| {
            let span = FieldSpan { field, start, width, count: signal_count };
            start = span.end();
            span
        })
        .collect()
}

/// Parses the per-signal header block into one descriptor per channel.
///
/// # Errors
///
/// * `EdfError::Truncated` - `file_bytes` is shorter than `256 + 256 × signal_count`
/// * `EdfError::FieldFormat` - a numeric entry does not parse
pub fn parse_signal_descriptors(file_bytes: &[u8], signal_count: usize) -> Result<Vec<SignalDescriptor>> {
    let required = signal_count
        .checked_mul(SIGNAL_HEADER_SIZE)
        .and_then(|n| n.checked_add(EDF_HEADER_SIZE))
        .unwrap_or(usize::MAX);
    if file_bytes.len() < required {
        return Err(EdfError::truncated(
            format!("signal header block for {} signals", signal_count),
            EDF_HEADER_SIZE,
            required - EDF_HEADER_SIZE,
            file_bytes.len(),
        ));
    }

    let spans = field_spans(signal_count);
    let mut signals = Vec::with_capacity(signal_count);

    for i in 0..signal_count {
        let entry = Entry { bytes: file_bytes, spans: &spans, index: i };

        signals.push(SignalDescriptor {
            label: entry.text(SignalField::Label)?,
            transducer_type: entry.text(SignalField::Transducer)?,
            physical_dimension: entry.text(SignalField::PhysicalDimension)?,
            physical_min: entry.float(SignalField::PhysicalMin)?,
            physical_max: entry.float(SignalField::PhysicalMax)?,
            digital_min: entry.int(SignalField::DigitalMin)?,
            digital_max: entry.int(SignalField::DigitalMax)?,
            prefiltering: entry.text(SignalField::Prefiltering)?,
            samples_per_record: entry.int(SignalField::SamplesPerRecord)?,
            reserved: entry.text(SignalField::Reserved)?,
        });
    }

    debug!("parsed {} signal descriptors", signals.len());
    Ok(signals)
}

/// 某个信号在各个子数组中的字段
struct Entry<'a> {
    bytes: &'a [u8],
    spans: &'a [FieldSpan],
    index: usize,
}

impl Entry<'_> {
    fn locate(&self, field: SignalField) -> (usize, usize) {
        let span = &self.spans[field as usize];
        (span.entry_offset(self.index), span.width)
    }

    fn text(&self, field: SignalField) -> Result<String> {
        let (offset, width) = self.locate(field);
        read_field(self.bytes, offset, width)
    }

    fn name(&self, field: SignalField) -> String {
        format!("{}[{}]", field.name(), self.index)
    }

    fn int<T: std::str::FromStr>(&self, field: SignalField) -> Result<T> {
        let (offset, _) = self.locate(field);
        parse_int(&self.text(field)?, &self.name(field), offset)
    }

    fn float(&self, field: SignalField) -> Result<f64> {
        let (offset, _) = self.locate(field);
        parse_float(&self.text(field)?, &self.name(field), offset)
    }
}
