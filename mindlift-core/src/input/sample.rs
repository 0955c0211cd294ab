//! Biometric sample

/// Highest attention/meditation value the headset reports
pub const MAX_LEVEL: u8 = 100;

/// One attention/meditation reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BiometricSample {
    /// Attention level (0-100)
    pub attention: u8,
    /// Meditation level (0-100)
    pub meditation: u8,
}

impl BiometricSample {
    pub const fn new(attention: u8, meditation: u8) -> Self {
        Self {
            attention,
            meditation,
        }
    }

    /// A sample is valid once the headset has a signal
    ///
    /// The headset reports both levels as zero while it is still searching
    /// for contact or after the contact is lost.
    pub fn is_valid(&self) -> bool {
        u16::from(self.attention) + u16::from(self.meditation) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity() {
        assert!(!BiometricSample::new(0, 0).is_valid());
        assert!(BiometricSample::new(0, 1).is_valid());
        assert!(BiometricSample::new(1, 0).is_valid());
        assert!(BiometricSample::new(MAX_LEVEL, MAX_LEVEL).is_valid());
    }
}
