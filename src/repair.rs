//! Legacy header byte repair.
//!
//! Some recorders wrote accented Latin-1 characters into header text. This
//! optional pre-processing step rewrites them to plain ASCII before parsing.
//! Only the header region is touched; sample bytes in the data region are
//! binary and must never be rewritten.

use log::warn;

use crate::field::{latin1_to_string, parse_int};
use crate::header::SIGNAL_COUNT_OFFSET;
use crate::{EDF_HEADER_SIZE, SIGNAL_HEADER_SIZE};

/// (legacy byte, ASCII replacement)
pub const LEGACY_REPLACEMENTS: [(u8, u8); 8] = [
    (0xDF, b's'),
    (0xE4, b'a'),
    (0xC4, b'A'),
    (0xF6, b'o'),
    (0xD6, b'O'),
    (0xFC, b'u'),
    (0xDC, b'U'),
    (0xB0, b'd'), // 度数符号
];

/// Rewrites every legacy byte in `bytes`, returning how many were replaced
pub fn repair_legacy_bytes(bytes: &mut [u8]) -> usize {
    let mut replaced = 0;
    for byte in bytes.iter_mut() {
        if let Some(&(_, ascii)) = LEGACY_REPLACEMENTS.iter().find(|(legacy, _)| *legacy == *byte) {
            *byte = ascii;
            replaced += 1;
        }
    }
    replaced
}

/// Number of leading bytes that belong to the header.
///
/// Falls back to the 256-byte global header when the signal count is
/// unreadable.
pub fn header_region_len(bytes: &[u8]) -> usize {
    let signal_count = bytes
        .get(SIGNAL_COUNT_OFFSET..EDF_HEADER_SIZE)
        .map(latin1_to_string)
        .and_then(|text| parse_int::<usize>(&text, "signal_count", SIGNAL_COUNT_OFFSET).ok())
        .unwrap_or(0);

    let region = signal_count
        .checked_mul(SIGNAL_HEADER_SIZE)
        .and_then(|n| n.checked_add(EDF_HEADER_SIZE))
        .unwrap_or(usize::MAX);
    region.min(bytes.len())
}

/// Repairs the header region of a raw EDF buffer in place.
///
/// ```rust
/// use edfread::doctest_utils::{build_edf, SyntheticSignal};
/// use edfread::repair::repair_header;
///
/// let mut signal = SyntheticSignal::new("Temp", 1);
/// signal.physical_dimension = "\u{b0}C".to_string();
/// let mut bytes = build_edf(&[signal], &[vec![vec![0x00b0]]]);
///
/// assert_eq!(repair_header(&mut bytes), 1);
/// // 数据区的 0xB0 保持不变
/// assert_eq!(bytes[512], 0xB0);
/// ```
pub fn repair_header(bytes: &mut [u8]) -> usize {
    let region = header_region_len(bytes);
    let replaced = repair_legacy_bytes(&mut bytes[..region]);
    if replaced > 0 {
        warn!("replaced {} legacy bytes in the first {} header bytes", replaced, region);
    }
    replaced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctest_utils::{build_edf, SyntheticSignal};
    use crate::header::parse_header;
    use crate::signal::parse_signal_descriptors;

    #[test]
    fn test_repair_table() {
        let mut bytes = vec![0xDF, 0xE4, 0xC4, 0xF6, 0xD6, 0xFC, 0xDC, 0xB0, b'x', 0xE9];
        assert_eq!(repair_legacy_bytes(&mut bytes), 8);
        assert_eq!(&bytes[..9], b"saAoOuUdx");
        // 表外的字节不处理
        assert_eq!(bytes[9], 0xE9);
    }

    #[test]
    fn test_header_region() {
        let signals = [SyntheticSignal::new("A", 1), SyntheticSignal::new("B", 1)];
        let bytes = build_edf(&signals, &[vec![vec![0], vec![0]]]);
        assert_eq!(header_region_len(&bytes), 768);
        assert_eq!(header_region_len(&bytes[..600]), 600);
        assert_eq!(header_region_len(&bytes[..100]), 100);

        let mut garbled = bytes.clone();
        garbled[252..256].copy_from_slice(b"????");
        assert_eq!(header_region_len(&garbled), 256);
    }

    #[test]
    fn test_repair_keeps_samples() {
        let mut signal = SyntheticSignal::new("Stra\u{df}e", 1);
        signal.transducer = "M\u{fc}ller".to_string();
        signal.physical_dimension = "\u{b0}C".to_string();
        let sample = i16::from_le_bytes([0xDF, 0xFC]);
        let mut bytes = build_edf(&[signal], &[vec![vec![sample]]]);

        assert_eq!(repair_header(&mut bytes), 3);
        let header = parse_header(&bytes).unwrap();
        let signals = parse_signal_descriptors(&bytes, header.signal_count).unwrap();
        assert_eq!(signals[0].label, "Strase");
        assert_eq!(signals[0].transducer_type, "Muller");
        assert_eq!(signals[0].physical_dimension, "dC");
        assert_eq!(&bytes[512..514], &[0xDF, 0xFC]);
    }
}
