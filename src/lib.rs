//! # EDF decoder for Rust
//!
//! A pure Rust library for decoding EDF (European Data Format) recordings.
//! It parses the global header and the signal table once, then extracts any
//! channel's samples as raw digital values or calibrated physical values.
//!
//! ## Quick Start
//!
//! ```rust
//! use edfread::{EdfReader, Result};
//!
//! fn main() -> Result<()> {
//!     # edfread::doctest_utils::create_simple_test_file("quick_start.edf")?;
//!     let reader = EdfReader::open("quick_start.edf")?;
//!
//!     let header = reader.header();
//!     println!("Signals: {}", header.signal_count);
//!     println!("Records: {} x {} s", reader.record_count(), header.record_duration);
//!
//!     for signal in reader.signals() {
//!         let samples = reader.read_physical(&signal.label)?;
//!         println!("{}: {} samples", signal.display_label(), samples.len());
//!     }
//!     # std::fs::remove_file("quick_start.edf").ok();
//!     Ok(())
//! }
//! ```
//!
//! ## Physical vs Digital Values
//!
//! EDF stores each sample as a 16-bit little-endian integer. The signal
//! header gives the digital range and the physical range it maps onto:
//!
//! ```rust
//! use edfread::calibration::digital_to_physical;
//! use edfread::doctest_utils::SyntheticSignal;
//!
//! let mut signal = SyntheticSignal::new("ECG", 1).descriptor();
//! signal.digital_min = -2048;
//! signal.digital_max = 2047;
//! signal.physical_min = -1.0;
//! signal.physical_max = 1.0;
//!
//! let physical = digital_to_physical(&signal, &[-2048, 2047])?;
//! assert!((physical[0] + 1.0).abs() < 1e-9);
//! assert!((physical[1] - 1.0).abs() < 1e-9);
//! # Ok::<(), edfread::EdfError>(())
//! ```
//!
//! ## Exporting to CSV
//!
//! ```rust
//! use edfread::{EdfReader, SampleMode, SampleTable};
//!
//! # edfread::doctest_utils::create_simple_test_file("export.edf")?;
//! let reader = EdfReader::open("export.edf")?;
//! let labels: Vec<String> = reader.labels().map(str::to_string).collect();
//!
//! let (table, failed) = SampleTable::from_reads(reader.read_channels(&labels, SampleMode::Digital));
//! assert!(failed.is_empty());
//!
//! let mut csv = Vec::new();
//! table.write_csv(&mut csv)?;
//! assert!(csv.starts_with(b"EEG Fp1,ECG\n0,0\n"));
//! # std::fs::remove_file("export.edf").ok();
//! # Ok::<(), edfread::EdfError>(())
//! ```

pub mod error;
pub mod field;
pub mod types;
pub mod header;
pub mod signal;
pub mod demux;
pub mod calibration;
pub mod repair;
pub mod reader;
pub mod export;

#[doc(hidden)]
pub mod doctest_utils; // For doctest and integration test fixtures

// Re-export main types for convenience
pub use calibration::{digital_to_physical, Calibration};
pub use demux::{read_channel_digital, RecordLayout};
pub use error::{EdfError, Result};
pub use export::{Column, SampleMode, SampleTable};
pub use header::parse_header;
pub use reader::{ChannelRead, EdfReader, ReadOptions};
pub use signal::parse_signal_descriptors;
pub use types::{GlobalHeader, SignalDescriptor};

// Important constants
pub const EDF_HEADER_SIZE: usize = 256;
pub const SIGNAL_HEADER_SIZE: usize = 256;
pub const SAMPLE_BYTES: usize = 2;

/// Library version
///
/// ```rust
/// let version = edfread::version();
/// assert!(version.contains('.'));
/// ```
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
