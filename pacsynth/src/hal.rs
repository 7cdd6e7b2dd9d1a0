//! The minimal set of hardware capabilities the synthesizer depends on.
//!
//! Everything target specific (ADC multiplexing, PWM compare registers,
//! audio buffers, GPIO, timers) lives behind these traits, so the core only
//! ever sees sampled control values and writes samples.

use core::time::Duration;

use crate::ControlSample;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// A sampled control input
pub enum ControlChannel {
    /// The pitch knob
    Pitch,
    /// The tempo knob
    Tempo,
}

/// Access to the control inputs of the synthesizer
pub trait ControlInputs {
    /// Sample one control channel
    fn read_control(&mut self, channel: ControlChannel) -> ControlSample;
    /// True while the record-enable line is asserted
    fn record_enabled(&mut self) -> bool;
}

/// A single indicator output (e.g. an LED)
pub trait Indicator {
    /// Drive the indicator on (`true`) or off (`false`)
    fn set_indicator(&mut self, on: bool);
}

/// The destination of generated samples
pub trait SampleSink<S> {
    /// Write one sample.  Values are already clamped to the range of `S`.
    fn write_sample(&mut self, value: S);
}

/// A blocking delay, used by the control loop between sequencer steps
pub trait Delay {
    /// Block for (approximately) `duration`
    fn delay(&mut self, duration: Duration);
}

impl<S, F: FnMut(S)> SampleSink<S> for F {
    fn write_sample(&mut self, value: S) {
        self(value)
    }
}
