use std::fs;
use std::io;
use std::path::Path;

use log::{debug, warn};

use crate::calibration::Calibration;
use crate::demux::{channel_index, RecordLayout};
use crate::error::{EdfError, Result};
use crate::export::{Column, SampleMode};
use crate::header::{parse_header, RECORD_COUNT_OFFSET};
use crate::repair::repair_header;
use crate::signal::parse_signal_descriptors;
use crate::types::{strip_display_label, GlobalHeader, SignalDescriptor};

/// Options applied while opening a file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Rewrite legacy accented header bytes to ASCII before parsing
    pub repair_legacy_header: bool,
    /// Fail with `InvalidHeaderSize` instead of warning when the declared
    /// header size disagrees with the signal count
    pub strict_header_size: bool,
}

/// Result of reading one channel of a multi-channel request
#[derive(Debug)]
pub struct ChannelRead {
    pub label: String,
    pub column: Result<Column>,
}

/// EDF file decoder.
///
/// The header, the signal table and the record layout are parsed once when
/// the reader is created; every channel read afterwards only touches the
/// bytes of that channel. Reads take `&self`, so one reader can be shared
/// between threads.
///
/// # Examples
///
/// ```rust
/// use edfread::EdfReader;
///
/// # // Generate test file (hidden from docs)
/// # edfread::doctest_utils::create_simple_test_file("recording.edf")?;
/// #
/// let reader = EdfReader::open("recording.edf")?;
///
/// for signal in reader.signals() {
///     println!("{}", signal.display_label());
/// }
///
/// let digital = reader.read_digital("EEG Fp1")?;
/// let physical = reader.read_physical("ECG")?;
/// assert_eq!(digital.len(), 12);
/// assert_eq!(physical.len(), 6);
///
/// # // Cleanup (hidden from docs)
/// # std::fs::remove_file("recording.edf").ok();
/// # Ok::<(), edfread::EdfError>(())
/// ```
#[derive(Debug)]
pub struct EdfReader {
    bytes: Vec<u8>,
    header: GlobalHeader,
    signals: Vec<SignalDescriptor>,
    layout: RecordLayout,
}

impl EdfReader {
    /// Opens and decodes an EDF file with default options.
    ///
    /// The file is read into memory once and the handle is closed before
    /// this returns.
    ///
    /// # Errors
    ///
    /// * `EdfError::FileNotFound` - the file doesn't exist
    /// * `EdfError::Io` - any other I/O failure
    /// * everything [`EdfReader::from_bytes`] can return
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, &ReadOptions::default())
    }

    pub fn open_with<P: AsRef<Path>>(path: P, options: &ReadOptions) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => EdfError::FileNotFound(format!("{}: {}", path.display(), e)),
            _ => EdfError::Io(e),
        })?;

        debug!("read {} bytes from {}", bytes.len(), path.display());
        Self::from_bytes_with(bytes, options)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_bytes_with(bytes, &ReadOptions::default())
    }

    /// Decodes an in-memory EDF buffer.
    ///
    /// # Errors
    ///
    /// * `EdfError::Truncated` - the buffer ends inside the header block
    /// * `EdfError::FieldFormat` - a numeric header field does not parse
    /// * `EdfError::InvalidHeaderSize` - strict mode and inconsistent header size
    pub fn from_bytes_with(mut bytes: Vec<u8>, options: &ReadOptions) -> Result<Self> {
        if options.repair_legacy_header {
            repair_header(&mut bytes);
        }

        let header = parse_header(&bytes)?;
        let signals = parse_signal_descriptors(&bytes, header.signal_count)?;

        let data_offset = header.header_byte_count_value()?;
        if !header.has_consistent_size() {
            let expected = header.expected_header_bytes();
            if options.strict_header_size {
                return Err(EdfError::InvalidHeaderSize {
                    declared: data_offset,
                    expected,
                    signal_count: header.signal_count,
                });
            }
            warn!(
                "header declares {} bytes but {} signals need {}; using the declared size",
                data_offset, header.signal_count, expected
            );
        }

        let block_bytes: usize = signals.iter().map(|s| s.samples_per_record * crate::SAMPLE_BYTES).sum();
        let record_count = resolve_record_count(&header, bytes.len(), data_offset, block_bytes)?;
        let layout = RecordLayout::new(data_offset, record_count, &signals);

        Ok(EdfReader {
            bytes,
            header,
            signals,
            layout,
        })
    }

    pub fn header(&self) -> &GlobalHeader {
        &self.header
    }

    /// Signal descriptors in channel order
    pub fn signals(&self) -> &[SignalDescriptor] {
        &self.signals
    }

    pub fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    /// Number of data records, after resolving an unknown (`-1`) count
    pub fn record_count(&self) -> usize {
        self.layout.record_count()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.signals.iter().map(|s| s.label.as_str())
    }

    /// Index of the channel labelled exactly `label`
    pub fn channel_index(&self, label: &str) -> Result<usize> {
        channel_index(&self.signals, label)
    }

    pub fn signal(&self, label: &str) -> Result<&SignalDescriptor> {
        let index = self.channel_index(label)?;
        Ok(&self.signals[index])
    }

    /// `record_count × samples_per_record` of the channel at `index`
    pub fn samples_in_channel(&self, index: usize) -> Result<usize> {
        self.layout
            .samples_in_channel(index)
            .ok_or(EdfError::InvalidSignalIndex(index))
    }

    /// Reads every raw sample of the channel labelled `label`.
    ///
    /// # Errors
    ///
    /// * `EdfError::UnknownChannel` - no channel has this exact label
    /// * `EdfError::Truncated` - the data region ends early
    pub fn read_digital(&self, label: &str) -> Result<Vec<i16>> {
        let index = self.channel_index(label)?;
        self.layout.read_channel(&self.bytes, index, label)
    }

    pub fn read_digital_by_index(&self, index: usize) -> Result<Vec<i16>> {
        let signal = self.signals.get(index).ok_or(EdfError::InvalidSignalIndex(index))?;
        self.layout.read_channel(&self.bytes, index, &signal.label)
    }

    /// Reads the channel labelled `label` and converts it to physical units.
    ///
    /// The calibration is checked before any sample is read.
    ///
    /// # Errors
    ///
    /// * `EdfError::Calibration` - the channel's digital min equals its digital max
    /// * everything [`EdfReader::read_digital`] can return
    pub fn read_physical(&self, label: &str) -> Result<Vec<f64>> {
        let index = self.channel_index(label)?;
        self.read_physical_by_index(index)
    }

    pub fn read_physical_by_index(&self, index: usize) -> Result<Vec<f64>> {
        let signal = self.signals.get(index).ok_or(EdfError::InvalidSignalIndex(index))?;
        let calibration = Calibration::for_signal(signal)?;
        let digital = self.layout.read_channel(&self.bytes, index, &signal.label)?;

        Ok(digital.into_iter().map(|d| calibration.to_physical(d)).collect())
    }

    /// Reads one column per label; each result is independent of the others.
    ///
    /// ```rust
    /// use edfread::{EdfReader, SampleMode};
    ///
    /// # edfread::doctest_utils::create_simple_test_file("channels.edf")?;
    /// let reader = EdfReader::open("channels.edf")?;
    /// let reads = reader.read_channels(&["ECG", "missing"], SampleMode::Digital);
    ///
    /// assert!(reads[0].column.is_ok());
    /// assert!(reads[1].column.is_err());
    /// # std::fs::remove_file("channels.edf").ok();
    /// # Ok::<(), edfread::EdfError>(())
    /// ```
    pub fn read_channels<S: AsRef<str>>(&self, labels: &[S], mode: SampleMode) -> Vec<ChannelRead> {
        labels
            .iter()
            .map(|label| {
                let label = label.as_ref();
                let column = self.channel_index(label).and_then(|index| self.read_column(index, mode));
                if let Err(e) = &column {
                    debug!("failed to read channel {:?}: {}", label, e);
                }
                ChannelRead {
                    label: label.to_string(),
                    column,
                }
            })
            .collect()
    }

    /// Reads one column per channel index.
    ///
    /// Channels sharing a label are told apart here; each `ChannelRead`
    /// carries the label of the channel actually read.
    pub fn read_channels_by_index(&self, indices: &[usize], mode: SampleMode) -> Vec<ChannelRead> {
        indices
            .iter()
            .map(|&index| {
                let label = match self.signals.get(index) {
                    Some(signal) => signal.label.clone(),
                    None => format!("#{}", index),
                };
                let column = self.read_column(index, mode);
                if let Err(e) = &column {
                    debug!("failed to read channel {} ({:?}): {}", index, label, e);
                }
                ChannelRead { label, column }
            })
            .collect()
    }

    /// Resolves a user-supplied channel name to an index.
    ///
    /// An exact label match wins; otherwise the name is treated as a display
    /// label (`"<label> - <transducer> (<unit>)"`) and matched on its label part.
    pub fn resolve_channel(&self, name: &str) -> Result<usize> {
        if let Ok(index) = self.channel_index(name) {
            return Ok(index);
        }

        // 标签本身可能含有 " - "，先去掉最后一段
        let candidates = [name.rsplit_once(" - ").map(|(label, _)| label), Some(strip_display_label(name))];
        candidates
            .into_iter()
            .flatten()
            .find_map(|label| self.channel_index(label).ok())
            .ok_or_else(|| EdfError::UnknownChannel(name.to_string()))
    }

    fn read_column(&self, index: usize, mode: SampleMode) -> Result<Column> {
        match mode {
            SampleMode::Digital => self.read_digital_by_index(index).map(Column::Digital),
            SampleMode::Physical => self.read_physical_by_index(index).map(Column::Physical),
        }
    }

    /// Gives back the underlying file bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// 解析数据记录数量，-1 表示文件仍在写入，根据文件大小推算
fn resolve_record_count(header: &GlobalHeader, len: usize, data_offset: usize, block_bytes: usize) -> Result<usize> {
    let declared = header.record_count_value()?;
    if declared >= 0 {
        return usize::try_from(declared).map_err(|_| record_count_error(header));
    }
    if declared != -1 {
        return Err(record_count_error(header));
    }

    let available = len.saturating_sub(data_offset);
    let inferred = if block_bytes == 0 { 0 } else { available / block_bytes };
    warn!(
        "record count is -1; inferred {} records from {} data bytes",
        inferred, available
    );
    Ok(inferred)
}

fn record_count_error(header: &GlobalHeader) -> EdfError {
    EdfError::FieldFormat {
        field: "record_count".to_string(),
        offset: RECORD_COUNT_OFFSET,
        kind: "record count",
        text: header.record_count.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctest_utils::{build_edf, SyntheticSignal};

    fn fixture() -> Vec<u8> {
        let mut flat = SyntheticSignal::new("Flat", 1);
        flat.digital_min = 7;
        flat.digital_max = 7;
        let signals = [SyntheticSignal::new("A", 2), flat];
        let records = vec![vec![vec![1, 2], vec![7]], vec![vec![3, 4], vec![7]]];
        build_edf(&signals, &records)
    }

    #[test]
    fn test_reader_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EdfReader>();
    }

    #[test]
    fn test_from_bytes() {
        let reader = EdfReader::from_bytes(fixture()).unwrap();
        assert_eq!(reader.record_count(), 2);
        assert_eq!(reader.labels().collect::<Vec<_>>(), vec!["A", "Flat"]);
        assert_eq!(reader.channel_index("Flat").unwrap(), 1);
        assert_eq!(reader.samples_in_channel(0).unwrap(), 4);
        assert!(matches!(reader.samples_in_channel(5), Err(EdfError::InvalidSignalIndex(5))));
        assert_eq!(reader.read_digital_by_index(0).unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_calibration_failure_is_per_channel() {
        let reader = EdfReader::from_bytes(fixture()).unwrap();
        assert!(matches!(reader.read_physical("Flat"), Err(EdfError::Calibration { .. })));
        assert_eq!(reader.read_digital("Flat").unwrap(), vec![7, 7]);
        assert_eq!(reader.read_physical("A").unwrap().len(), 4);
    }

    #[test]
    fn test_read_channels_partial_success() {
        let reader = EdfReader::from_bytes(fixture()).unwrap();
        let reads = reader.read_channels(&["A", "Flat", "Nope"], SampleMode::Physical);

        assert_eq!(reads.len(), 3);
        assert_eq!(reads[0].label, "A");
        assert!(matches!(&reads[0].column, Ok(Column::Physical(v)) if v.len() == 4));
        assert!(matches!(&reads[1].column, Err(EdfError::Calibration { .. })));
        assert!(matches!(&reads[2].column, Err(EdfError::UnknownChannel(_))));
    }

    #[test]
    fn test_duplicate_labels_read_by_index() {
        let signals = [SyntheticSignal::new("EMG", 2), SyntheticSignal::new("EMG", 2)];
        let bytes = build_edf(&signals, &[vec![vec![1, 2], vec![99, 98]]]);
        let reader = EdfReader::from_bytes(bytes).unwrap();

        let reads = reader.read_channels_by_index(&[0, 1, 2], SampleMode::Digital);
        assert_eq!(reads[0].label, "EMG");
        assert_eq!(reads[1].label, "EMG");
        assert!(matches!(&reads[0].column, Ok(Column::Digital(v)) if v == &vec![1, 2]));
        assert!(matches!(&reads[1].column, Ok(Column::Digital(v)) if v == &vec![99, 98]));
        assert_eq!(reads[2].label, "#2");
        assert!(matches!(&reads[2].column, Err(EdfError::InvalidSignalIndex(2))));
    }

    #[test]
    fn test_resolve_channel_prefers_exact_label() {
        let mut bipolar = SyntheticSignal::new("EEG C3 - M2", 1);
        bipolar.transducer = "AgAgCl".to_string();
        let bytes = build_edf(&[bipolar], &[vec![vec![5]]]);
        let reader = EdfReader::from_bytes(bytes).unwrap();

        assert_eq!(reader.resolve_channel("EEG C3 - M2").unwrap(), 0);
        let display = reader.signals()[0].display_label();
        assert_eq!(display, "EEG C3 - M2 - AgAgCl (uV)");
        assert_eq!(reader.resolve_channel(&display).unwrap(), 0);
        assert!(matches!(
            reader.resolve_channel("EEG C3"),
            Err(EdfError::UnknownChannel(label)) if label == "EEG C3"
        ));

        let plain = EdfReader::from_bytes(fixture()).unwrap();
        assert_eq!(plain.resolve_channel("A - x (uV)").unwrap(), 0);
        assert!(matches!(plain.resolve_channel("Nope"), Err(EdfError::UnknownChannel(_))));
    }

    #[test]
    fn test_unknown_record_count_is_inferred() {
        let mut bytes = fixture();
        bytes[236..244].copy_from_slice(b"-1      ");
        // 半个记录不计入
        bytes.extend_from_slice(&[0, 0]);

        let reader = EdfReader::from_bytes(bytes).unwrap();
        assert_eq!(reader.record_count(), 2);
        assert_eq!(reader.read_digital("A").unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_other_negative_record_count() {
        let mut bytes = fixture();
        bytes[236..244].copy_from_slice(b"-5      ");
        assert!(matches!(
            EdfReader::from_bytes(bytes),
            Err(EdfError::FieldFormat { offset: 236, .. })
        ));
    }

    #[test]
    fn test_header_size_mismatch() {
        let mut bytes = fixture();
        // 声明的头部大小比实际大两个字节
        bytes[184..192].copy_from_slice(b"770     ");

        let lenient = EdfReader::from_bytes(bytes.clone()).unwrap();
        assert!(!lenient.header().has_consistent_size());
        assert_eq!(lenient.layout().data_offset(), 770);
        assert!(matches!(lenient.read_digital("Flat"), Err(EdfError::Truncated { .. })));

        let strict = ReadOptions {
            strict_header_size: true,
            ..ReadOptions::default()
        };
        match EdfReader::from_bytes_with(bytes, &strict) {
            Err(EdfError::InvalidHeaderSize { declared, expected, signal_count }) => {
                assert_eq!(declared, 770);
                assert_eq!(expected, 768);
                assert_eq!(signal_count, 2);
            }
            other => panic!("expected header size error, got {:?}", other),
        }
    }

    #[test]
    fn test_repair_option() {
        let mut signal = SyntheticSignal::new("Gr\u{f6}\u{df}e", 1);
        signal.physical_dimension = "\u{b0}C".to_string();
        let bytes = build_edf(&[signal], &[vec![vec![0]]]);

        let raw = EdfReader::from_bytes(bytes.clone()).unwrap();
        assert_eq!(raw.signals()[0].label, "Gr\u{f6}\u{df}e");

        let options = ReadOptions {
            repair_legacy_header: true,
            ..ReadOptions::default()
        };
        let repaired = EdfReader::from_bytes_with(bytes, &options).unwrap();
        assert_eq!(repaired.signals()[0].label, "Grose");
        assert_eq!(repaired.signals()[0].physical_dimension, "dC");
        assert_eq!(repaired.read_digital("Grose").unwrap(), vec![0]);
    }

    #[test]
    fn test_open_missing_file() {
        assert!(matches!(
            EdfReader::open("definitely/not/here.edf"),
            Err(EdfError::FileNotFound(_))
        ));
    }
}
