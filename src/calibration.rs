//! Digital-to-physical calibration.
//!
//! EDF maps the digital range `[digital_min, digital_max]` linearly onto the
//! physical range `[physical_min, physical_max]`:
//!
//! ```text
//! physical = (d - digital_min) / (digital_max - digital_min)
//!            * (physical_max - physical_min) + physical_min
//! ```

use crate::error::{EdfError, Result};
use crate::types::SignalDescriptor;

/// Precomputed affine transform for one channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    digital_min: f64,
    physical_min: f64,
    /// 每个数字单位对应的物理值
    bit_value: f64,
}

impl Calibration {
    /// # Errors
    ///
    /// * `EdfError::Calibration` - `digital_min == digital_max`
    pub fn for_signal(signal: &SignalDescriptor) -> Result<Self> {
        if signal.digital_max == signal.digital_min {
            return Err(EdfError::Calibration {
                label: signal.label.clone(),
                digital: signal.digital_min,
            });
        }

        let digital_span = signal.digital_max as f64 - signal.digital_min as f64;
        Ok(Calibration {
            digital_min: signal.digital_min as f64,
            physical_min: signal.physical_min,
            bit_value: (signal.physical_max - signal.physical_min) / digital_span,
        })
    }

    pub fn bit_value(&self) -> f64 {
        self.bit_value
    }

    /// 将数字值转换为物理值
    pub fn to_physical(&self, digital: i16) -> f64 {
        (digital as f64 - self.digital_min) * self.bit_value + self.physical_min
    }
}

/// Converts raw samples of one channel to physical units.
///
/// No clamping is applied: samples outside the digital range extrapolate.
///
/// # Errors
///
/// * `EdfError::Calibration` - the descriptor has `digital_min == digital_max`
///
/// # Examples
///
/// ```rust
/// use edfread::calibration::digital_to_physical;
/// use edfread::doctest_utils::SyntheticSignal;
///
/// let mut signal = SyntheticSignal::new("EEG", 1).descriptor();
/// signal.digital_min = -100;
/// signal.digital_max = 100;
/// signal.physical_min = -1.0;
/// signal.physical_max = 1.0;
///
/// let physical = digital_to_physical(&signal, &[-100, 0, 50, 100])?;
/// for (got, want) in physical.iter().zip([-1.0, 0.0, 0.5, 1.0]) {
///     assert!((got - want).abs() < 1e-9);
/// }
/// # Ok::<(), edfread::EdfError>(())
/// ```
pub fn digital_to_physical(signal: &SignalDescriptor, digital_samples: &[i16]) -> Result<Vec<f64>> {
    let calibration = Calibration::for_signal(signal)?;
    Ok(digital_samples.iter().map(|&d| calibration.to_physical(d)).collect())
}
