//! Data record demultiplexing.
//!
//! The data region starts at `header_byte_count` and holds `record_count`
//! blocks. Each block carries, for every signal in descriptor order,
//! `samples_per_record` consecutive little-endian `i16` samples.

use log::debug;

use crate::error::{EdfError, Result};
use crate::types::{GlobalHeader, SignalDescriptor};
use crate::SAMPLE_BYTES;

/// Byte geometry of the data region, computed once per file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout {
    data_offset: usize,
    record_count: usize,
    block_bytes: usize,
    slots: Vec<ChannelSlot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChannelSlot {
    /// 信号在数据记录中的字节偏移
    buffer_offset: usize,
    samples_per_record: usize,
}

impl RecordLayout {
    pub fn new(data_offset: usize, record_count: usize, signals: &[SignalDescriptor]) -> Self {
        let mut buffer_offset = 0;
        let slots = signals
            .iter()
            .map(|signal| {
                let slot = ChannelSlot {
                    buffer_offset,
                    samples_per_record: signal.samples_per_record,
                };
                buffer_offset += signal.samples_per_record * SAMPLE_BYTES;
                slot
            })
            .collect();

        let layout = RecordLayout {
            data_offset,
            record_count,
            block_bytes: buffer_offset,
            slots,
        };
        debug!(
            "record layout: data_offset={} records={} block_bytes={}",
            layout.data_offset, layout.record_count, layout.block_bytes
        );
        layout
    }

    pub fn data_offset(&self) -> usize {
        self.data_offset
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Size of one data record: `2 × Σ samples_per_record`
    pub fn block_bytes(&self) -> usize {
        self.block_bytes
    }

    pub fn channel_count(&self) -> usize {
        self.slots.len()
    }

    /// Absolute offset of the first sample of `index` in record 0
    pub fn channel_start(&self, index: usize) -> Option<usize> {
        self.slots.get(index).map(|slot| self.data_offset + slot.buffer_offset)
    }

    /// `record_count × samples_per_record` for channel `index`
    pub fn samples_in_channel(&self, index: usize) -> Option<usize> {
        self.slots.get(index).map(|slot| self.record_count * slot.samples_per_record)
    }

    /// Offset one past the last data record, `None` on overflow
    pub fn data_end(&self) -> Option<usize> {
        self.block_bytes
            .checked_mul(self.record_count)?
            .checked_add(self.data_offset)
    }

    /// Extracts every sample of channel `index` across all records.
    ///
    /// Only the channel's own bytes are touched. `label` feeds the error
    /// message.
    ///
    /// # Errors
    ///
    /// * `EdfError::InvalidSignalIndex` - `index` is not a channel of this layout
    /// * `EdfError::Truncated` - a record ends past the end of `bytes`
    pub fn read_channel(&self, bytes: &[u8], index: usize, label: &str) -> Result<Vec<i16>> {
        let slot = self.slots.get(index).ok_or(EdfError::InvalidSignalIndex(index))?;
        let chunk = slot.samples_per_record * SAMPLE_BYTES;
        if chunk == 0 || self.record_count == 0 {
            return Ok(Vec::new());
        }

        let start = self.data_offset + slot.buffer_offset;

        // 先检查最后一个记录是否完整，避免读取到一半才失败
        let last_end = (self.record_count - 1)
            .checked_mul(self.block_bytes)
            .and_then(|n| n.checked_add(start))
            .and_then(|n| n.checked_add(chunk));
        if last_end.map_or(true, |end| end > bytes.len()) {
            let record = self.first_incomplete_record(bytes.len(), start, chunk);
            let offset = start.saturating_add(record.saturating_mul(self.block_bytes));
            return Err(EdfError::truncated(
                format!("channel {:?} record {}", label, record),
                offset,
                chunk,
                bytes.len(),
            ));
        }

        let mut samples = Vec::with_capacity(self.record_count * slot.samples_per_record);
        for record in 0..self.record_count {
            let at = start + record * self.block_bytes;
            samples.extend(
                bytes[at..at + chunk]
                    .chunks_exact(SAMPLE_BYTES)
                    .map(|pair| i16::from_le_bytes([pair[0], pair[1]])),
            );
        }

        Ok(samples)
    }

    fn first_incomplete_record(&self, len: usize, start: usize, chunk: usize) -> usize {
        match len.checked_sub(start + chunk) {
            None => 0,
            Some(spare) => spare / self.block_bytes + 1,
        }
    }
}

/// Index of the first descriptor whose label equals `label` exactly
pub fn channel_index(signals: &[SignalDescriptor], label: &str) -> Result<usize> {
    signals
        .iter()
        .position(|signal| signal.label == label)
        .ok_or_else(|| EdfError::UnknownChannel(label.to_string()))
}

/// Reads one channel's digital samples straight from the file bytes.
///
/// This builds a fresh [`RecordLayout`] on every call; use
/// [`EdfReader`](crate::EdfReader) to read several channels from one file.
///
/// # Errors
///
/// * `EdfError::UnknownChannel` - no descriptor carries `channel_label`
/// * `EdfError::FieldFormat` - the header's byte or record count is not an integer
/// * `EdfError::Truncated` - the data region is shorter than the header promises
pub fn read_channel_digital(
    file_bytes: &[u8],
    header: &GlobalHeader,
    signals: &[SignalDescriptor],
    channel_label: &str,
) -> Result<Vec<i16>> {
    let data_offset = header.header_byte_count_value()?;
    let record_count = header.record_count_value()?;
    let record_count = usize::try_from(record_count).map_err(|_| EdfError::FieldFormat {
        field: "record_count".to_string(),
        offset: crate::header::RECORD_COUNT_OFFSET,
        kind: "non-negative integer",
        text: header.record_count.clone(),
    })?;

    let index = channel_index(signals, channel_label)?;
    let layout = RecordLayout::new(data_offset, record_count, signals);
    layout.read_channel(file_bytes, index, channel_label)
}
