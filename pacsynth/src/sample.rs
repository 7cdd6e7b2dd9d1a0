/// Types must implement this trait to be used as an output sample.  This
/// describes the range of the sink the sample is eventually written to
/// (e.g. a PWM compare register or a PCM buffer slot).  Implementations are
/// provided for `u8` (unsigned, midpoint biased PWM) and `i16` (signed PCM).
///
/// All mixing is done on values widened to `i32` and re-centred on
/// [SampleFormat::CENTER], so every format is treated as a signed signal
/// around its centre.
pub trait SampleFormat: Copy + Default + PartialEq + core::fmt::Debug + Send + Sync {
    /// The smallest value the sink can represent
    const MIN: i32;
    /// The largest value the sink can represent
    const MAX: i32;
    /// The value representing silence
    const CENTER: i32;
    /// The peak deviation from [SampleFormat::CENTER] of a full scale
    /// waveform.  Used when generating tables.
    const AMPLITUDE: i32;
    /// Widen this sample to an `i32`
    fn to_wide(self) -> i32;
    /// Narrow an `i32` to this sample type, clamping it to
    /// `[Self::MIN, Self::MAX]`
    fn from_wide_saturating(wide: i32) -> Self;
    /// Map a uniformly distributed random `u32` uniformly onto the full
    /// range of this format
    fn from_uniform(bits: u32) -> Self;
    /// The sample representing silence
    fn center() -> Self {
        Self::from_wide_saturating(Self::CENTER)
    }
}

impl SampleFormat for u8 {
    const MIN: i32 = u8::MIN as i32;
    const MAX: i32 = u8::MAX as i32;
    const CENTER: i32 = 127;
    const AMPLITUDE: i32 = 127;
    fn to_wide(self) -> i32 {
        self as i32
    }
    fn from_wide_saturating(wide: i32) -> Self {
        wide.clamp(<Self as SampleFormat>::MIN, <Self as SampleFormat>::MAX) as u8
    }
    fn from_uniform(bits: u32) -> Self {
        (bits >> 24) as u8
    }
}

impl SampleFormat for i16 {
    const MIN: i32 = i16::MIN as i32;
    const MAX: i32 = i16::MAX as i32;
    const CENTER: i32 = 0;
    const AMPLITUDE: i32 = i16::MAX as i32;
    fn to_wide(self) -> i32 {
        self as i32
    }
    fn from_wide_saturating(wide: i32) -> Self {
        wide.clamp(<Self as SampleFormat>::MIN, <Self as SampleFormat>::MAX) as i16
    }
    fn from_uniform(bits: u32) -> Self {
        (bits >> 16) as u16 as i16
    }
}
