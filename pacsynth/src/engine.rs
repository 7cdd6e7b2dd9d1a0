//! The sample generation entry point.
//!
//! A [SynthEngine] is driven at the output sample rate, either from a timer
//! overflow interrupt ([SynthEngine::on_timer]) or from an audio callback
//! filling a buffer ([SynthEngine::render]).  Nothing in this module
//! allocates, locks or blocks.

use arrayvec::ArrayVec;

use crate::hal::SampleSink;
use crate::mixer::Mixer;
use crate::osc::Oscillator;
use crate::SampleFormat;

/// A fixed set of `N` oscillators and the mixer combining them
#[derive(Clone, Debug)]
pub struct SynthEngine<'a, S: SampleFormat, const N: usize> {
    oscillators: [Oscillator<'a, S>; N],
    mixer: Mixer,
    ticks: u32,
}

impl<'a, S: SampleFormat, const N: usize> SynthEngine<'a, S, N> {
    /// Constructor
    pub fn new(oscillators: [Oscillator<'a, S>; N], mixer: Mixer) -> Self {
        Self {
            oscillators,
            mixer,
            ticks: 0,
        }
    }
    /// Build an engine from exactly `N` oscillators, or return an error if
    /// the iterator yields more or fewer
    pub fn try_from_oscillators<I>(oscillators: I, mixer: Mixer) -> Result<Self, &'static str>
    where
        I: IntoIterator<Item = Oscillator<'a, S>>,
    {
        let mut oscs = ArrayVec::<Oscillator<'a, S>, N>::new();
        for osc in oscillators {
            oscs.try_push(osc).map_err(|_| "Too many oscillators")?;
        }
        let oscs = oscs.into_inner().map_err(|_| "Too few oscillators")?;
        Ok(Self::new(oscs, mixer))
    }
    /// Advance every oscillator by one sample and return the mixed output
    #[inline]
    pub fn tick(&mut self) -> S {
        self.ticks = self.ticks.wrapping_add(1);
        self.mixer.mix(&mut self.oscillators)
    }
    /// Generate one sample and write it to `sink`.  Call this from the
    /// timer overflow interrupt.
    #[inline]
    pub fn on_timer<K: SampleSink<S>>(&mut self, sink: &mut K) {
        let smp = self.tick();
        sink.write_sample(smp);
    }
    /// Fill an interleaved buffer of `channels` channels, writing the same
    /// sample to every channel of a frame.  A trailing partial frame is
    /// filled too.
    pub fn render(&mut self, out: &mut [S], channels: usize) {
        for frame in out.chunks_mut(channels.max(1)) {
            let smp = self.tick();
            frame.fill(smp);
        }
    }
    /// The number of samples generated so far (wrapping)
    pub fn ticks(&self) -> u32 {
        self.ticks
    }
    /// The oscillators driven by this engine
    pub fn oscillators(&self) -> &[Oscillator<'a, S>; N] {
        &self.oscillators
    }
    /// Mutable access to the oscillators, e.g. to reset them
    pub fn oscillators_mut(&mut self) -> &mut [Oscillator<'a, S>; N] {
        &mut self.oscillators
    }
}
