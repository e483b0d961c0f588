//! Fixed-width ASCII field decoding.
//!
//! Every EDF header value is a left-justified, space-padded text field at a
//! fixed byte position. Bytes are decoded one byte per character (Latin-1), so
//! legacy header bytes above 0x7F never fail to decode.

use std::str::FromStr;

use crate::error::{EdfError, Result};

/// Decodes `bytes` as Latin-1 text, one character per byte
pub fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// 去掉前后的 ASCII 空白
pub fn trim_ascii(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_ascii_whitespace())
}

/// Reads `length` bytes starting at `start` and returns the trimmed text.
///
/// # Errors
///
/// * `EdfError::Truncated` - the field extends past the end of `buffer`
///
/// # Examples
///
/// ```rust
/// use edfread::field::read_field;
///
/// let buffer = b"0       Patient X   ";
/// assert_eq!(read_field(buffer, 0, 8)?, "0");
/// assert_eq!(read_field(buffer, 8, 12)?, "Patient X");
/// # Ok::<(), edfread::EdfError>(())
/// ```
pub fn read_field(buffer: &[u8], start: usize, length: usize) -> Result<String> {
    let end = start
        .checked_add(length)
        .filter(|&end| end <= buffer.len())
        .ok_or_else(|| EdfError::truncated("header field", start, length, buffer.len()))?;

    let text = latin1_to_string(&buffer[start..end]);
    Ok(trim_ascii(&text).to_string())
}

/// Reads a fixed-width field and parses it as an integer.
///
/// `name` only feeds the error message.
pub fn read_int_field<T: FromStr>(buffer: &[u8], start: usize, length: usize, name: &str) -> Result<T> {
    let text = read_field(buffer, start, length)?;
    parse_int(&text, name, start)
}

/// Reads a fixed-width field and parses it as a finite floating point number
pub fn read_float_field(buffer: &[u8], start: usize, length: usize, name: &str) -> Result<f64> {
    let text = read_field(buffer, start, length)?;
    parse_float(&text, name, start)
}

/// 非本地化的整数解析，空字符串视为错误
pub fn parse_int<T: FromStr>(text: &str, name: &str, offset: usize) -> Result<T> {
    let trimmed = trim_ascii(text);
    if trimmed.is_empty() {
        return Err(format_error(name, offset, "integer", text));
    }

    trimmed
        .parse::<T>()
        .map_err(|_| format_error(name, offset, "integer", text))
}

/// 非本地化的浮点数解析
///
/// `inf` and `NaN` spellings are rejected: a header value must be a real
/// calibration bound.
pub fn parse_float(text: &str, name: &str, offset: usize) -> Result<f64> {
    let trimmed = trim_ascii(text);
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(format_error(name, offset, "number", text)),
    }
}

fn format_error(name: &str, offset: usize, kind: &'static str, text: &str) -> EdfError {
    EdfError::FieldFormat {
        field: name.to_string(),
        offset,
        kind,
        text: text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_field_trims_padding() {
        let buffer = b"  EEG Fp1       \tX";
        assert_eq!(read_field(buffer, 0, 16).unwrap(), "EEG Fp1");
        assert_eq!(read_field(buffer, 16, 2).unwrap(), "X");
        assert_eq!(read_field(buffer, 0, 0).unwrap(), "");
    }

    #[test]
    fn test_read_field_latin1() {
        let buffer = [b'M', 0xFC, b'l', b'l', b'e', b'r', b' ', b' '];
        assert_eq!(read_field(&buffer, 0, 8).unwrap(), "Müller");

        let degrees = [0xB0, b'C'];
        assert_eq!(read_field(&degrees, 0, 2).unwrap(), "°C");
    }

    #[test]
    fn test_read_field_out_of_bounds() {
        let buffer = b"12345678";
        match read_field(buffer, 4, 8) {
            Err(EdfError::Truncated { offset, expected, available, .. }) => {
                assert_eq!(offset, 4);
                assert_eq!(expected, 8);
                assert_eq!(available, 4);
            }
            other => panic!("expected truncation, got {:?}", other),
        }
        assert!(read_field(buffer, usize::MAX, 2).is_err());
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int::<i32>("  -2048 ", "digital_min", 0).unwrap(), -2048);
        assert_eq!(parse_int::<i32>("+789", "x", 0).unwrap(), 789);
        assert_eq!(parse_int::<usize>("4", "signal_count", 252).unwrap(), 4);
        assert!(parse_int::<i32>("12.34", "x", 0).is_err());
        assert!(parse_int::<i32>("abc", "x", 0).is_err());
        assert!(parse_int::<usize>("-1", "x", 0).is_err());
    }

    #[test]
    fn test_parse_int_empty_is_error() {
        match parse_int::<i64>("        ", "record_count", 236) {
            Err(EdfError::FieldFormat { field, offset, kind, .. }) => {
                assert_eq!(field, "record_count");
                assert_eq!(offset, 236);
                assert_eq!(kind, "integer");
            }
            other => panic!("expected format error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_float() {
        assert_eq!(parse_float("-1.0    ", "physical_min", 0).unwrap(), -1.0);
        assert_eq!(parse_float("200", "physical_max", 0).unwrap(), 200.0);
        assert_eq!(parse_float("1e3", "physical_max", 0).unwrap(), 1000.0);
        assert!(parse_float("", "x", 0).is_err());
        assert!(parse_float("1,5", "x", 0).is_err());
        assert!(parse_float("inf", "x", 0).is_err());
        assert!(parse_float("NaN", "x", 0).is_err());
    }

    #[test]
    fn test_read_numeric_fields() {
        let buffer = b"3       0.5     ";
        assert_eq!(read_int_field::<u32>(buffer, 0, 8, "n").unwrap(), 3);
        assert_eq!(read_float_field(buffer, 8, 8, "d").unwrap(), 0.5);
        assert!(read_float_field(buffer, 12, 8, "d").is_err());
    }
}
