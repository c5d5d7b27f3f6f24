//! Byte-count progress reporting.

use serde::{Deserialize, Serialize};

/// Progress of an in-flight transfer, as reported by the transport.
///
/// `bytes_expected == 0` means the total size is unknown; derived values
/// degrade to a NaN sentinel instead of faulting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferProgress {
    /// Bytes durably written to the destination so far.
    pub bytes_written: u64,
    /// Total bytes expected, or 0 when unknown.
    pub bytes_expected: u64,
}

impl TransferProgress {
    /// Create a progress value.
    pub const fn new(bytes_written: u64, bytes_expected: u64) -> Self {
        Self {
            bytes_written,
            bytes_expected,
        }
    }

    /// Completion ratio in `[0.0, 1.0]`, or NaN when the total is unknown.
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f64 {
        if self.bytes_expected == 0 {
            return f64::NAN;
        }
        (self.bytes_written as f64 / self.bytes_expected as f64).clamp(0.0, 1.0)
    }

    /// Completion percentage, or `None` when the total is unknown.
    pub fn percent(&self) -> Option<f64> {
        let ratio = self.ratio();
        if ratio.is_nan() {
            None
        } else {
            Some(ratio * 100.0)
        }
    }

    /// Percentage rendered to two decimal places ("25.00"), or "NaN" when
    /// the total is unknown.
    pub fn percent_text(&self) -> String {
        format!("{:.2}", self.ratio() * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_two_decimal_places() {
        assert_eq!(TransferProgress::new(50, 200).percent_text(), "25.00");
        assert_eq!(TransferProgress::new(0, 200).percent_text(), "0.00");
        assert_eq!(TransferProgress::new(200, 200).percent_text(), "100.00");
    }

    #[test]
    fn unknown_total_is_nan_not_a_fault() {
        let progress = TransferProgress::new(1024, 0);
        assert!(progress.ratio().is_nan());
        assert_eq!(progress.percent(), None);
        assert_eq!(progress.percent_text(), "NaN");
    }

    #[test]
    fn ratio_is_clamped_when_written_exceeds_expected() {
        let progress = TransferProgress::new(300, 200);
        assert!((progress.ratio() - 1.0).abs() < f64::EPSILON);
        assert_eq!(progress.percent_text(), "100.00");
    }
}
