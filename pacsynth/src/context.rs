//! This module provides objects to reason about the processing context.
//! Currently, the only information wrapped is the output sample rate.

use core::num::NonZeroU32;

/// The rate of the timer driving the PWM target, in Hz: a 16MHz clock with
/// no prescaling, overflowing an 8 bit counter.
pub const PWM_SAMPLE_RATE: u32 = 16_000_000 / 256;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// A processing context.  The sample rate is guaranteed to be non-zero, so
/// any conversion from a frequency to a control word is well defined.
pub struct Context {
    sample_rate: NonZeroU32,
}

impl Context {
    /// Create a new context, or return an error if `sample_rate` is zero
    pub fn new(sample_rate: u32) -> Result<Self, &'static str> {
        Self::try_from(sample_rate)
    }
    /// Create a new context matching the PWM timer overflow rate
    pub const fn new_pwm() -> Self {
        Self {
            sample_rate: match NonZeroU32::new(PWM_SAMPLE_RATE) {
                Some(rate) => rate,
                None => panic!("PWM sample rate must be nonzero"),
            },
        }
    }
    /// Create a new context with a sample rate of 44.1kHz
    pub const fn new_441() -> Self {
        Self {
            sample_rate: match NonZeroU32::new(44100) {
                Some(rate) => rate,
                None => panic!("44.1kHz must be nonzero"),
            },
        }
    }
    /// Returns the sample rate, in Hz.
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate.get()
    }
    /// Returns the sample rate as a [NonZeroU32]
    pub const fn sample_rate_nonzero(&self) -> NonZeroU32 {
        self.sample_rate
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new_441()
    }
}

impl TryFrom<u32> for Context {
    type Error = &'static str;
    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match NonZeroU32::new(value) {
            Some(sample_rate) => Ok(Self { sample_rate }),
            None => Err("Sample rate must be nonzero"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_sample_rate_is_rejected() {
        assert!(Context::new(0).is_err());
        assert_eq!(Context::new(48000).map(|c| c.sample_rate()), Ok(48000));
    }
    #[test]
    fn constant_contexts() {
        assert_eq!(Context::new_pwm().sample_rate(), 62500);
        assert_eq!(Context::default().sample_rate(), 44100);
    }
}
