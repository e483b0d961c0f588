// Internal utilities for documentation and integration tests
// Builds small, fully specified EDF buffers in memory

use std::fs;
use std::path::Path;

use crate::types::SignalDescriptor;
use crate::Result;

/// Signal parameters for a synthetic test file
#[derive(Debug, Clone)]
pub struct SyntheticSignal {
    pub label: String,
    pub transducer: String,
    pub physical_dimension: String,
    pub physical_min: f64,
    pub physical_max: f64,
    pub digital_min: i32,
    pub digital_max: i32,
    pub prefiltering: String,
    pub samples_per_record: usize,
}

impl SyntheticSignal {
    pub fn new(label: &str, samples_per_record: usize) -> Self {
        SyntheticSignal {
            label: label.to_string(),
            transducer: String::new(),
            physical_dimension: "uV".to_string(),
            physical_min: -200.0,
            physical_max: 200.0,
            digital_min: -32768,
            digital_max: 32767,
            prefiltering: String::new(),
            samples_per_record,
        }
    }

    /// The descriptor a decoder should produce for this signal
    pub fn descriptor(&self) -> SignalDescriptor {
        SignalDescriptor {
            label: self.label.clone(),
            transducer_type: self.transducer.clone(),
            physical_dimension: self.physical_dimension.clone(),
            physical_min: self.physical_min,
            physical_max: self.physical_max,
            digital_min: self.digital_min,
            digital_max: self.digital_max,
            prefiltering: self.prefiltering.clone(),
            samples_per_record: self.samples_per_record,
            reserved: String::new(),
        }
    }
}

/// 左对齐、空格填充的 Latin-1 字段
fn put(out: &mut Vec<u8>, text: &str, width: usize) {
    let mut field: Vec<u8> = text.chars().map(|c| c as u32 as u8).take(width).collect();
    field.resize(width, b' ');
    out.extend_from_slice(&field);
}

/// Builds a complete EDF buffer.
///
/// `records[r][s]` holds the samples of signal `s` in data record `r`; each
/// must contain exactly `samples_per_record` values.
pub fn build_edf(signals: &[SyntheticSignal], records: &[Vec<Vec<i16>>]) -> Vec<u8> {
    let n = signals.len();
    let mut out = Vec::new();

    put(&mut out, "0", 8);
    put(&mut out, "X X X X", 80);
    put(&mut out, "Startdate X X X X", 80);
    put(&mut out, "18.10.26", 8);
    put(&mut out, "10.00.00", 8);
    put(&mut out, &(256 + 256 * n).to_string(), 8);
    put(&mut out, "", 44);
    put(&mut out, &records.len().to_string(), 8);
    put(&mut out, "1", 8);
    put(&mut out, &n.to_string(), 4);

    // 按列写入信号头
    for s in signals {
        put(&mut out, &s.label, 16);
    }
    for s in signals {
        put(&mut out, &s.transducer, 80);
    }
    for s in signals {
        put(&mut out, &s.physical_dimension, 8);
    }
    for s in signals {
        put(&mut out, &s.physical_min.to_string(), 8);
    }
    for s in signals {
        put(&mut out, &s.physical_max.to_string(), 8);
    }
    for s in signals {
        put(&mut out, &s.digital_min.to_string(), 8);
    }
    for s in signals {
        put(&mut out, &s.digital_max.to_string(), 8);
    }
    for s in signals {
        put(&mut out, &s.prefiltering, 80);
    }
    for s in signals {
        put(&mut out, &s.samples_per_record.to_string(), 8);
    }
    for _ in signals {
        put(&mut out, "", 32);
    }

    for record in records {
        for (signal, samples) in signals.iter().zip(record) {
            assert_eq!(samples.len(), signal.samples_per_record, "bad fixture for {}", signal.label);
            for sample in samples {
                out.extend_from_slice(&sample.to_le_bytes());
            }
        }
    }

    out
}

/// Creates a two-channel test file: "EEG Fp1" (4 samples/record) and "ECG"
/// (2 samples/record), 3 records, sample values counting up per channel
pub fn create_simple_test_file<P: AsRef<Path>>(path: P) -> Result<()> {
    let mut eeg = SyntheticSignal::new("EEG Fp1", 4);
    eeg.transducer = "AgAgCl electrode".to_string();
    let mut ecg = SyntheticSignal::new("ECG", 2);
    ecg.physical_dimension = "mV".to_string();
    ecg.physical_min = -5.0;
    ecg.physical_max = 5.0;
    ecg.digital_min = -2048;
    ecg.digital_max = 2047;

    let records: Vec<Vec<Vec<i16>>> = (0..3i16)
        .map(|r| vec![(0..4).map(|i| r * 4 + i).collect(), (0..2).map(|i| -(r * 2 + i)).collect()])
        .collect();

    fs::write(path, build_edf(&[eeg, ecg], &records))?;
    Ok(())
}
