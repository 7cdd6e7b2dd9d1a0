//! This crate contains the synthesis core of a miniature wavetable
//! synthesizer: a fixed set of phase-accumulator oscillators, a saturating
//! mixer, and a step sequencer that records and replays control values.
//!
//! It is `no_std` and allocation-free.  All of the synthesis arithmetic is
//! done in 16 bit fixed point (phase and frequency control words are
//! fractions of a cycle/sample rate), so the same code can drive a timer
//! interrupt writing a PWM compare register or an audio callback filling a
//! PCM buffer.  The two targets differ only in their [SampleFormat]:
//! `u8` for midpoint-biased PWM output and `i16` for signed PCM.
//!
//! The crate is split into two timing domains that never share a writer:
//!
//! - The sample path ([engine::SynthEngine]) runs once per output sample.  It
//!   owns oscillator phase state and only ever *reads* the controls.
//! - The control path ([sequencer::Sequencer]) runs at a much lower rate and
//!   is the sole writer of the per-oscillator [osc::OscControl] cells.
//!
//! Hardware (ADC channels, the output sink, the indicator LED, and delays)
//! is abstracted behind the traits in [hal].

#![no_std]
#![warn(missing_docs)]

#[cfg(test)]
extern crate std;

mod fixedmath;
mod sample;

pub mod context;
pub mod engine;
pub mod hal;
pub mod mixer;
pub mod osc;
pub mod sequencer;
pub mod wavetable;

pub use fixedmath::frequency_control;
pub use fixedmath::FreqControl as FreqControlFxP;
pub use fixedmath::Frequency as FrequencyFxP;
pub use fixedmath::Phase as PhaseFxP;
pub use fixedmath::Scalar as ScalarFxP;
pub use sample::SampleFormat;

/// The number of oscillators in the synthesizer
pub const OSCILLATOR_COUNT: usize = 2;

/// The number of steps in the sequencer loop
pub const LOOP_LENGTH: usize = 64;

/// A raw control value, as sampled from an 8-bit (left adjusted) ADC channel
pub type ControlSample = u8;

/// Table size used on the PWM target.  One entry per value of the high byte
/// of the phase accumulator.
pub const PWM_TABLE_SIZE: usize = 256;

/// Table size used by the PCM simulation.  One entry per phase value.
pub const PCM_TABLE_SIZE: usize = 65536;
