//! Phase-accumulator oscillators and their control cells.

use core::sync::atomic::{AtomicU16, Ordering};

use crate::context::Context;
use crate::fixedmath::{frequency_control, FreqControl, Frequency, Phase, Scalar};
use crate::wavetable::Wavetable;
use crate::SampleFormat;

/// The controls of one oscillator: its frequency control word and volume.
///
/// These are written by the control path and read once per sample by the
/// sample path.  Each field is a single atomic, so the two paths may run on
/// different threads (or in and out of an interrupt handler) without
/// locking and without either side ever observing a torn value.
///
/// This needs 16 bit atomics.  On targets that only have 8 bit atomics
/// (e.g. AVR) the control word has to be staged in the control path and
/// published to the sample path with interrupts masked instead.
#[derive(Debug)]
pub struct OscControl {
    frequency_control: AtomicU16,
    volume: AtomicU16,
}

impl OscControl {
    /// Create a new control cell, silent (zero frequency) at full volume
    pub const fn new() -> Self {
        Self::with_volume(Scalar::MAX)
    }
    /// Create a new control cell at zero frequency with the given volume
    pub const fn with_volume(volume: Scalar) -> Self {
        Self {
            frequency_control: AtomicU16::new(0),
            volume: AtomicU16::new(volume.to_bits()),
        }
    }
    /// The current frequency control word
    pub fn frequency_control(&self) -> FreqControl {
        FreqControl::from_bits(self.frequency_control.load(Ordering::Acquire))
    }
    /// Set the frequency control word directly
    pub fn set_frequency_control(&self, fcw: FreqControl) {
        self.frequency_control.store(fcw.to_bits(), Ordering::Release);
    }
    /// Set the oscillator frequency, in Hz.  This stores
    /// `round(2^16 * frequency / sample_rate)` as the control word.
    pub fn set_frequency(&self, frequency: Frequency, context: &Context) {
        let fcw = frequency_control(frequency, context.sample_rate_nonzero());
        if self.frequency_control() != fcw {
            self.set_frequency_control(fcw);
            log::debug!("freq: {}, fcw: {}", frequency, fcw.to_bits());
        }
    }
    /// The current volume.  `Scalar::MAX` is unity gain.
    pub fn volume(&self) -> Scalar {
        Scalar::from_bits(self.volume.load(Ordering::Acquire))
    }
    /// Set the volume
    pub fn set_volume(&self, volume: Scalar) {
        self.volume.store(volume.to_bits(), Ordering::Release);
    }
}

impl Default for OscControl {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default, Clone, Copy, Debug, PartialEq, Eq)]
/// How an oscillator turns its phase into a table index
pub enum OscKind {
    /// Index the table directly with the top bits of the phase
    #[default]
    Tone,
    /// Ignore the phase for indexing and step through the table once per
    /// completed phase cycle.  With a noise table this gives a noise voice
    /// whose rate tracks the frequency control.
    OverflowModulated,
}

/// A phase-accumulator oscillator reading from a borrowed [Wavetable].
///
/// The oscillator owns its running state (phase and overflow count) and
/// borrows its table and its [OscControl].
#[derive(Clone, Debug)]
pub struct Oscillator<'a, S: SampleFormat> {
    phase: Phase,
    overflow_count: u32,
    kind: OscKind,
    table: Wavetable<'a, S>,
    control: &'a OscControl,
}

impl<'a, S: SampleFormat> Oscillator<'a, S> {
    /// Constructor
    pub fn new(kind: OscKind, table: Wavetable<'a, S>, control: &'a OscControl) -> Self {
        Self {
            phase: Phase::ZERO,
            overflow_count: 0,
            kind,
            table,
            control,
        }
    }
    /// Shorthand for a [OscKind::Tone] oscillator
    pub fn tone(table: Wavetable<'a, S>, control: &'a OscControl) -> Self {
        Self::new(OscKind::Tone, table, control)
    }
    /// Shorthand for a [OscKind::OverflowModulated] oscillator
    pub fn overflow_modulated(table: Wavetable<'a, S>, control: &'a OscControl) -> Self {
        Self::new(OscKind::OverflowModulated, table, control)
    }
    /// Advance the oscillator by one sample and return its output, with
    /// volume applied about the centre of the sample format.
    #[inline]
    pub fn next(&mut self) -> S {
        let fcw = self.control.frequency_control();
        let old_phase = self.phase;
        self.phase = self.phase.wrapping_add(fcw);
        if self.phase < old_phase {
            self.overflow_count = self.overflow_count.wrapping_add(1);
        }
        let raw = match self.kind {
            OscKind::Tone => self.table.at_phase(self.phase.to_bits()),
            OscKind::OverflowModulated => self.table.get(self.overflow_count),
        };
        apply_volume(raw, self.control.volume())
    }
    /// The current phase
    pub fn phase(&self) -> Phase {
        self.phase
    }
    /// The number of completed phase cycles (wrapping)
    pub fn overflow_count(&self) -> u32 {
        self.overflow_count
    }
    /// The variant of this oscillator
    pub fn kind(&self) -> OscKind {
        self.kind
    }
    /// The control cell driving this oscillator
    pub fn control(&self) -> &'a OscControl {
        self.control
    }
    /// Reset the phase and overflow count to zero
    pub fn reset(&mut self) {
        self.phase = Phase::ZERO;
        self.overflow_count = 0;
    }
}

/// Scale `smp` about the format centre by `volume`, treating `Scalar::MAX`
/// as unity.  The result cannot leave the range of the format.
#[inline]
fn apply_volume<S: SampleFormat>(smp: S, volume: Scalar) -> S {
    let centered = smp.to_wide() - S::CENTER;
    let scaled = (centered as i64 * volume.to_bits() as i64) / (u16::MAX as i64);
    S::from_wide_saturating(S::CENTER + scaled as i32)
}
