//! Simulated control surface: scripted knobs, a record switch that is held
//! down for the first few passes, and an indicator that logs.

use std::time::Duration;

use pacsynth::hal::{ControlChannel, ControlInputs, Delay, Indicator};
use pacsynth::ControlSample;

pub struct ScriptedControls {
    pattern: Vec<ControlSample>,
    position: usize,
    tempo: ControlSample,
    record_passes: u32,
    passes: u32,
    indicator: bool,
}

impl ScriptedControls {
    pub fn new(pattern: Vec<ControlSample>, tempo: ControlSample, record_passes: u32) -> Self {
        Self {
            pattern,
            position: 0,
            tempo,
            record_passes,
            passes: 0,
            indicator: false,
        }
    }
    /// The number of sequencer passes started so far
    pub fn passes(&self) -> u32 {
        self.passes
    }
}

impl ControlInputs for ScriptedControls {
    fn read_control(&mut self, channel: ControlChannel) -> ControlSample {
        match channel {
            ControlChannel::Pitch => {
                let value = self.pattern.get(self.position).copied().unwrap_or(0);
                self.position = (self.position + 1) % self.pattern.len().max(1);
                value
            }
            ControlChannel::Tempo => self.tempo,
        }
    }
    fn record_enabled(&mut self) -> bool {
        // passes are counted from the indicator, so the first pass is 1
        self.passes <= self.record_passes
    }
}

impl Indicator for ScriptedControls {
    fn set_indicator(&mut self, on: bool) {
        if on && !self.indicator {
            self.passes += 1;
            log::info!("pass {}", self.passes);
        }
        self.indicator = on;
    }
}

/// A [Delay] that puts the calling thread to sleep
pub struct ThreadDelay;

impl Delay for ThreadDelay {
    fn delay(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
