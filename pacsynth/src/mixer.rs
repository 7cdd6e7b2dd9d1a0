//! Mixing oscillator outputs into one bounded sample.

use crate::osc::Oscillator;
use crate::SampleFormat;

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
/// How the mixer combines its inputs
pub enum MixMode {
    /// Sum all inputs.  Loud enough inputs will clip.
    #[default]
    Sum,
    /// Average all inputs
    Average,
}

/// A signal mixer.  This combines the output of several oscillators into a
/// single sample.
///
/// Inputs are re-centred on the format centre and accumulated in an `i32`,
/// so intermediate sums of 16 bit inputs cannot overflow, and the result is
/// saturated to `[S::MIN, S::MAX]` rather than wrapping.  Overflow clamps to
/// the maximum and underflow to the minimum.
#[derive(Clone, Copy, Debug, Default)]
pub struct Mixer {
    mode: MixMode,
}

impl Mixer {
    /// Constructor
    pub const fn new(mode: MixMode) -> Self {
        Self { mode }
    }
    /// The mix mode in use
    pub fn mode(&self) -> MixMode {
        self.mode
    }
    /// Advance each oscillator by one sample and mix the results
    #[inline]
    pub fn mix<S: SampleFormat>(&self, oscillators: &mut [Oscillator<'_, S>]) -> S {
        let count = oscillators.len() as i32;
        let acc = oscillators
            .iter_mut()
            .fold(0i32, |acc, osc| acc + (osc.next().to_wide() - S::CENTER));
        self.finish(acc, count)
    }
    /// Mix precomputed samples
    pub fn mix_samples<S: SampleFormat>(&self, samples: &[S]) -> S {
        let count = samples.len() as i32;
        let acc = samples
            .iter()
            .fold(0i32, |acc, smp| acc + (smp.to_wide() - S::CENTER));
        self.finish(acc, count)
    }
    #[inline]
    fn finish<S: SampleFormat>(&self, acc: i32, count: i32) -> S {
        let acc = match self.mode {
            MixMode::Average if count > 0 => acc / count,
            _ => acc,
        };
        S::from_wide_saturating(acc.saturating_add(S::CENTER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixedmath::{FreqControl, Scalar};
    use crate::osc::OscControl;
    use crate::wavetable::Wavetable;

    #[test]
    fn sum_clamps_both_ways() {
        let mixer = Mixer::new(MixMode::Sum);
        assert_eq!(mixer.mix_samples(&[i16::MAX, i16::MAX]), i16::MAX);
        assert_eq!(mixer.mix_samples(&[i16::MIN, i16::MIN]), i16::MIN);
        assert_eq!(mixer.mix_samples(&[i16::MIN, i16::MAX]), -1);
        assert_eq!(mixer.mix_samples(&[200u8, 200]), 255);
        assert_eq!(mixer.mix_samples(&[10u8, 20]), 0);
        assert_eq!(mixer.mix_samples(&[127u8, 127]), 127);
    }
    #[test]
    fn average_mode() {
        let mixer = Mixer::new(MixMode::Average);
        assert_eq!(mixer.mix_samples(&[i16::MAX, i16::MAX]), i16::MAX);
        assert_eq!(mixer.mix_samples(&[i16::MIN, i16::MIN]), i16::MIN);
        assert_eq!(mixer.mix_samples(&[1000i16, 3000]), 2000);
        assert_eq!(mixer.mix_samples(&[255u8, 255]), 255);
        assert_eq!(mixer.mix_samples(&[0u8, 254]), 127);
    }
    #[test]
    fn empty_input_is_silence() {
        assert_eq!(Mixer::new(MixMode::Average).mix_samples::<u8>(&[]), 127);
        assert_eq!(Mixer::new(MixMode::Sum).mix_samples::<i16>(&[]), 0);
    }
    #[test]
    fn exhaustive_u8_pairs_stay_in_range() {
        for mode in [MixMode::Sum, MixMode::Average] {
            let mixer = Mixer::new(mode);
            for a in 0..=255u8 {
                for b in 0..=255u8 {
                    let out = mixer.mix_samples(&[a, b]) as i32;
                    let expected = match mode {
                        MixMode::Sum => (a as i32 + b as i32 - 127).clamp(0, 255),
                        MixMode::Average => ((a as i32 - 127 + b as i32 - 127) / 2 + 127).clamp(0, 255),
                    };
                    assert_eq!(out, expected);
                }
            }
        }
    }
    #[test]
    fn full_volume_full_scale_oscillators_clamp() {
        let high = [i16::MAX; 4];
        let low = [i16::MIN; 4];
        let controls = [OscControl::new(), OscControl::new(), OscControl::new()];
        for control in controls.iter() {
            control.set_volume(Scalar::MAX);
            control.set_frequency_control(FreqControl::from_bits(0x1234));
        }
        let mixer = Mixer::new(MixMode::Sum);
        let mut oscs = [
            crate::osc::Oscillator::tone(Wavetable::new(&high).unwrap(), &controls[0]),
            crate::osc::Oscillator::tone(Wavetable::new(&high).unwrap(), &controls[1]),
            crate::osc::Oscillator::overflow_modulated(Wavetable::new(&high).unwrap(), &controls[2]),
        ];
        for _ in 0..100 {
            assert_eq!(mixer.mix(&mut oscs), i16::MAX);
        }
        let mut oscs = [
            crate::osc::Oscillator::tone(Wavetable::new(&low).unwrap(), &controls[0]),
            crate::osc::Oscillator::overflow_modulated(Wavetable::new(&low).unwrap(), &controls[1]),
        ];
        for _ in 0..100 {
            assert_eq!(mixer.mix(&mut oscs), i16::MIN);
        }
    }
}
