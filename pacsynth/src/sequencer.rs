//! The step sequencer control loop.
//!
//! The sequencer holds a fixed-length loop of recorded pitch values.  On each
//! control tick it (optionally) records the pitch input into the current
//! step, pushes the step into every oscillator's frequency control, and
//! derives the time until the next step from the tempo input.

use core::time::Duration;

use crate::fixedmath::FreqControl;
use crate::hal::{ControlChannel, ControlInputs, Delay, Indicator};
use crate::osc::OscControl;
use crate::{ControlSample, LOOP_LENGTH};

/// Timing and scaling parameters for a [Sequencer]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SequencerConfig {
    /// The tempo reading that maps to zero delay.  Readings above this are
    /// treated as equal to it.
    pub max_tempo: ControlSample,
    /// The delay added per unit of `max_tempo - tempo`
    pub delay_unit: Duration,
    /// Left shift applied to a step value to produce a frequency control
    /// word.  At most 16.
    pub pitch_shift: u32,
}

impl SequencerConfig {
    /// Check that every step value and tempo reading has a representable
    /// control word and delay
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.pitch_shift > FreqControl::FRAC_NBITS {
            return Err("Pitch shift is wider than the frequency control word");
        }
        if self.delay_unit.checked_mul(self.max_tempo as u32).is_none() {
            return Err("Maximum step delay overflows");
        }
        Ok(())
    }
}

impl Default for SequencerConfig {
    /// Full scale 8 bit tempo, ~82ms maximum step time, and a step value of
    /// 255 mapping to a control word of 0x0FF0
    fn default() -> Self {
        Self {
            max_tempo: ControlSample::MAX,
            delay_unit: Duration::from_micros(320),
            pitch_shift: 4,
        }
    }
}

/// A step sequencer with `LEN` steps
#[derive(Clone, Debug)]
pub struct Sequencer<const LEN: usize = LOOP_LENGTH> {
    steps: [ControlSample; LEN],
    index: usize,
    config: SequencerConfig,
}

impl<const LEN: usize> Sequencer<LEN> {
    const NONEMPTY: () = assert!(LEN > 0, "A sequencer needs at least one step");

    /// Create a new sequencer at step 0 with all steps zeroed, failing if
    /// `config` is out of range
    pub fn new(config: SequencerConfig) -> Result<Self, &'static str> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }
    fn with_valid_config(config: SequencerConfig) -> Self {
        let () = Self::NONEMPTY;
        Self {
            steps: [0; LEN],
            index: 0,
            config,
        }
    }
    /// Execute one control tick and return the time to wait before the next:
    ///
    /// 1. Drive the indicator on for step 0, off otherwise
    /// 2. If recording is enabled, store the pitch input in the current step
    /// 3. Set every oscillator's frequency control from the current step
    /// 4. Derive the delay from the tempo input
    /// 5. Move to the next step, wrapping at the end of the loop
    pub fn advance<H>(&mut self, io: &mut H, controls: &[OscControl]) -> Duration
    where
        H: ControlInputs + Indicator,
    {
        io.set_indicator(self.index == 0);
        let pitch = io.read_control(ControlChannel::Pitch);
        if io.record_enabled() {
            self.steps[self.index] = pitch;
        }
        let fcw = self.frequency_control(self.steps[self.index]);
        for control in controls {
            control.set_frequency_control(fcw);
        }
        let tempo = io.read_control(ControlChannel::Tempo);
        let delay = self.delay_for_tempo(tempo);
        log::trace!(
            "step {}: value {}, fcw {}, delay {:?}",
            self.index,
            self.steps[self.index],
            fcw.to_bits(),
            delay
        );
        self.index = (self.index + 1) % LEN;
        delay
    }
    /// Execute one control tick (see [Sequencer::advance]) and then wait
    /// for the resulting delay
    pub fn step<H, D>(&mut self, io: &mut H, controls: &[OscControl], delay: &mut D)
    where
        H: ControlInputs + Indicator,
        D: Delay,
    {
        let duration = self.advance(io, controls);
        delay.delay(duration);
    }
    /// Run the sequencer forever.  This is the control loop of a firmware
    /// build, where the sequencer owns the main thread and the sample path
    /// runs from a timer interrupt.  Hosted builds that need to stop call
    /// [Sequencer::step] themselves.
    pub fn run<H, D>(&mut self, io: &mut H, controls: &[OscControl], delay: &mut D) -> !
    where
        H: ControlInputs + Indicator,
        D: Delay,
    {
        loop {
            self.step(io, controls, delay);
        }
    }
    /// The delay following a step for a given tempo reading.  A reading of
    /// zero gives the longest delay and `max_tempo` gives none.
    pub fn delay_for_tempo(&self, tempo: ControlSample) -> Duration {
        let units = self.config.max_tempo - tempo.min(self.config.max_tempo);
        // bounded by the check in SequencerConfig::validate
        self.config.delay_unit.saturating_mul(units as u32)
    }
    /// The frequency control word produced by a step value
    pub fn frequency_control(&self, value: ControlSample) -> FreqControl {
        let shift = self.config.pitch_shift.min(FreqControl::FRAC_NBITS);
        let fcw = ((value as u32) << shift).min(u16::MAX as u32);
        FreqControl::from_bits(fcw as u16)
    }
    /// The step that the next call to [Sequencer::advance] will play
    pub fn index(&self) -> usize {
        self.index
    }
    /// All of the recorded steps, in playback order
    pub fn steps(&self) -> &[ControlSample; LEN] {
        &self.steps
    }
    /// The value of one step, if `index` is in range
    pub fn get(&self, index: usize) -> Option<ControlSample> {
        self.steps.get(index).copied()
    }
    /// Zero all steps and return to the first step
    pub fn clear(&mut self) {
        self.steps = [0; LEN];
        self.index = 0;
    }
    /// The configuration of this sequencer
    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }
}

impl<const LEN: usize> Default for Sequencer<LEN> {
    fn default() -> Self {
        Self::with_valid_config(SequencerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    #[derive(Default)]
    struct MockIo {
        pitch: ControlSample,
        tempo: ControlSample,
        record: bool,
        indicator: Vec<bool>,
    }

    impl ControlInputs for MockIo {
        fn read_control(&mut self, channel: ControlChannel) -> ControlSample {
            match channel {
                ControlChannel::Pitch => self.pitch,
                ControlChannel::Tempo => self.tempo,
            }
        }
        fn record_enabled(&mut self) -> bool {
            self.record
        }
    }

    impl Indicator for MockIo {
        fn set_indicator(&mut self, on: bool) {
            self.indicator.push(on);
        }
    }

    #[derive(Default)]
    struct MockDelay {
        total: Duration,
        calls: usize,
    }

    impl Delay for MockDelay {
        fn delay(&mut self, duration: Duration) {
            self.total += duration;
            self.calls += 1;
        }
    }

    fn record_pass<const LEN: usize>(seq: &mut Sequencer<LEN>, io: &mut MockIo, controls: &[OscControl]) {
        io.record = true;
        for i in 0..LEN {
            io.pitch = (i * 3 + 1) as ControlSample;
            seq.advance(io, controls);
        }
        io.record = false;
    }

    #[test]
    fn starts_zeroed_at_step_zero() {
        let seq = Sequencer::<64>::default();
        assert_eq!(seq.index(), 0);
        assert!(seq.steps().iter().all(|&s| s == 0));
    }
    #[test]
    fn playback_without_record_leaves_steps() {
        let mut seq = Sequencer::<16>::default();
        let mut io = MockIo::default();
        let controls = [OscControl::new(), OscControl::new()];
        record_pass(&mut seq, &mut io, &controls);
        let before = *seq.steps();
        io.pitch = 200;
        for _ in 0..16 {
            seq.advance(&mut io, &controls);
        }
        assert_eq!(*seq.steps(), before);
        assert_eq!(seq.index(), 0);
    }
    #[test]
    fn record_on_one_step_changes_only_that_step() {
        let mut seq = Sequencer::<16>::default();
        let mut io = MockIo::default();
        let controls = [OscControl::new(), OscControl::new()];
        record_pass(&mut seq, &mut io, &controls);
        let before = *seq.steps();
        io.pitch = 250;
        for i in 0..16 {
            io.record = i == 5;
            seq.advance(&mut io, &controls);
        }
        for (i, (a, b)) in before.iter().zip(seq.steps().iter()).enumerate() {
            if i == 5 {
                assert_eq!(*b, 250);
            } else {
                assert_eq!(a, b);
            }
        }
    }
    #[test]
    fn steps_drive_every_oscillator() {
        let mut seq = Sequencer::<4>::default();
        let mut io = MockIo::default();
        let controls = [OscControl::new(), OscControl::new()];
        io.record = true;
        io.pitch = 0xAB;
        seq.advance(&mut io, &controls);
        for control in controls.iter() {
            assert_eq!(control.frequency_control().to_bits(), 0xAB0);
        }
        io.record = false;
        io.pitch = 0x11;
        seq.advance(&mut io, &controls);
        for control in controls.iter() {
            assert_eq!(control.frequency_control().to_bits(), 0);
        }
    }
    #[test]
    fn tempo_maps_inversely_to_delay() {
        let seq = Sequencer::<8>::default();
        let unit = seq.config().delay_unit;
        assert_eq!(seq.delay_for_tempo(0), unit * 255);
        assert_eq!(seq.delay_for_tempo(255), Duration::ZERO);
        assert_eq!(seq.delay_for_tempo(200), unit * 55);
        let seq = Sequencer::<8>::new(SequencerConfig {
            max_tempo: 100,
            delay_unit: Duration::from_millis(1),
            pitch_shift: 4,
        })
        .unwrap();
        assert_eq!(seq.delay_for_tempo(0), Duration::from_millis(100));
        assert_eq!(seq.delay_for_tempo(100), Duration::ZERO);
        assert_eq!(seq.delay_for_tempo(255), Duration::ZERO);
    }
    #[test]
    fn indicator_marks_first_step() {
        let mut seq = Sequencer::<4>::default();
        let mut io = MockIo::default();
        for _ in 0..12 {
            seq.advance(&mut io, &[]);
        }
        let expected: Vec<bool> = (0..12).map(|i| i % 4 == 0).collect();
        assert_eq!(io.indicator, expected);
    }
    #[test]
    fn step_waits_for_tempo_delay() {
        let mut seq = Sequencer::<4>::default();
        let mut io = MockIo {
            tempo: 250,
            ..Default::default()
        };
        let mut delay = MockDelay::default();
        for _ in 0..10 {
            seq.step(&mut io, &[], &mut delay);
        }
        assert_eq!(delay.calls, 10);
        assert_eq!(delay.total, seq.config().delay_unit * 50);
        assert_eq!(seq.index(), 2);
    }
    #[test]
    fn run_keeps_stepping() {
        struct StopAfter(usize);
        impl Delay for StopAfter {
            fn delay(&mut self, _: Duration) {
                self.0 -= 1;
                if self.0 == 0 {
                    panic!("stop");
                }
            }
        }
        let mut seq = Sequencer::<4>::default();
        let mut io = MockIo {
            pitch: 3,
            record: true,
            ..Default::default()
        };
        let controls = [OscControl::new()];
        let stopped = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            seq.run(&mut io, &controls, &mut StopAfter(6))
        }));
        assert!(stopped.is_err());
        assert_eq!(seq.index(), 2);
        assert_eq!(*seq.steps(), [3; 4]);
        assert_eq!(io.indicator.iter().filter(|&&on| on).count(), 2);
    }
    #[test]
    fn pitch_scaling_saturates() {
        let seq = Sequencer::<1>::new(SequencerConfig {
            pitch_shift: 12,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(seq.frequency_control(0xFF), FreqControl::MAX);
        assert_eq!(seq.frequency_control(0x0F), FreqControl::from_bits(0xF000));
        let seq = Sequencer::<1>::new(SequencerConfig {
            pitch_shift: 16,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(seq.frequency_control(0), FreqControl::ZERO);
        assert_eq!(seq.frequency_control(1), FreqControl::MAX);
        assert_eq!(seq.frequency_control(2), FreqControl::MAX);
    }
    #[test]
    fn out_of_range_config_is_rejected() {
        for pitch_shift in [17, 31, 32, u32::MAX] {
            let config = SequencerConfig {
                pitch_shift,
                ..Default::default()
            };
            assert!(config.validate().is_err());
            assert!(Sequencer::<4>::new(config).is_err());
        }
        let config = SequencerConfig {
            delay_unit: Duration::from_secs(u64::MAX / 100),
            ..Default::default()
        };
        assert!(Sequencer::<4>::new(config).is_err());
        // the longest delay itself is fine
        let config = SequencerConfig {
            delay_unit: Duration::from_secs(u64::MAX / 255),
            ..Default::default()
        };
        let seq = Sequencer::<4>::new(config).unwrap();
        assert_eq!(seq.delay_for_tempo(0), Duration::from_secs(u64::MAX / 255 * 255));
        assert!(Sequencer::<4>::new(SequencerConfig::default()).is_ok());
    }
    #[test]
    fn clear_resets() {
        let mut seq = Sequencer::<4>::default();
        let mut io = MockIo {
            pitch: 9,
            record: true,
            ..Default::default()
        };
        seq.advance(&mut io, &[]);
        assert_eq!(seq.get(0), Some(9));
        assert_eq!(seq.get(4), None);
        seq.clear();
        assert_eq!(seq.get(0), Some(0));
        assert_eq!(seq.index(), 0);
    }
}
