//! Fixed-point types and helpers used by the synthesizer.

use core::num::NonZeroU32;
pub use fixed::types::*;

/// A 16 bit unsigned fixed point number representing the phase of an
/// oscillator as a fraction of one full cycle.  All arithmetic on this type
/// is wrapping, so the top of the range rolls over to zero at the end of each
/// cycle.
pub type Phase = U0F16;
/// The per-sample phase increment of an oscillator (the frequency control
/// word), as a fraction of the sample rate.  This has the same width as
/// [Phase] so it can be added to it directly.
pub type FreqControl = U0F16;
/// A unsigned 16 bit fixed point number in the interval `[0, 1)`.  Used for
/// "scaling" signals in amplitude.  Note that 0xFFFF is treated as unity gain
/// by the oscillators (see [crate::osc::Oscillator::next]).
pub type Scalar = U0F16;
/// A unsigned 32 bit fixed point number representing a frequency in Hz.
/// This uses 14 integral bits and 18 fractional bits
pub type Frequency = U14F18;

/// Calculate the frequency control word for `freq` at `sample_rate`, that is
/// `round(2^16 * freq / sample_rate)`.
///
/// Frequencies at or above the sample rate saturate to the largest
/// representable control word.
pub fn frequency_control(freq: Frequency, sample_rate: NonZeroU32) -> FreqControl {
    // freq has 18 fractional bits and we want 16, so divide by 4 * sr
    let denom = (sample_rate.get() as u64) << 2;
    let fcw = ((freq.to_bits() as u64) + (denom >> 1)) / denom;
    FreqControl::from_bits(fcw.min(u16::MAX as u64) as u16)
}
