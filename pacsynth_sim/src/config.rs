use std::time::Duration;

use anyhow::{anyhow, bail, Context as _, Result};
use pacsynth::wavetable::NoiseKind;
use pacsynth::{ControlSample, ScalarFxP};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Play the step sequencer from the scripted control inputs
    Sequencer,
    /// Sweep the noise voice upwards a semitone at a time
    Sweep,
}

/// Settings for the simulation, overridable with `key=value` arguments
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    pub mode: Mode,
    pub tempo: ControlSample,
    pub pattern: Vec<ControlSample>,
    pub record_passes: u32,
    pub tone_volume: ScalarFxP,
    pub noise_volume: ScalarFxP,
    pub noise: NoiseKind,
    pub seed: u64,
    pub duration: Duration,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Sequencer,
            tempo: 180,
            pattern: vec![40, 0, 48, 0, 54, 60, 54, 48, 40, 40, 30, 0, 36, 45, 54, 72],
            record_passes: 1,
            tone_volume: ScalarFxP::from_num(0.5),
            noise_volume: ScalarFxP::from_num(0.25),
            noise: NoiseKind::Uniform,
            seed: 0,
            duration: Duration::from_secs(30),
        }
    }
}

fn parse_volume(value: &str) -> Result<ScalarFxP> {
    let vol: f32 = value.parse()?;
    if !(0.0..=1.0).contains(&vol) {
        bail!("volume must be between 0 and 1");
    }
    Ok(ScalarFxP::saturating_from_num(vol))
}

impl SimConfig {
    /// Build a configuration from `key=value` arguments, starting from the
    /// defaults
    pub fn from_args<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Self::default();
        for arg in args {
            let arg = arg.as_ref();
            let (key, value) = arg
                .split_once('=')
                .ok_or_else(|| anyhow!("expected key=value, got '{}'", arg))?;
            config
                .set(key, value)
                .with_context(|| format!("invalid value for {}: '{}'", key, value))?;
        }
        Ok(config)
    }
    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "mode" => {
                self.mode = match value {
                    "sequencer" => Mode::Sequencer,
                    "sweep" => Mode::Sweep,
                    _ => bail!("expected 'sequencer' or 'sweep'"),
                }
            }
            "tempo" => self.tempo = value.parse()?,
            "pattern" => {
                self.pattern = value
                    .split(',')
                    .map(|v| v.trim().parse::<ControlSample>())
                    .collect::<Result<_, _>>()?;
                if self.pattern.is_empty() {
                    bail!("pattern must not be empty");
                }
            }
            "record" => self.record_passes = value.parse()?,
            "tone" => self.tone_volume = parse_volume(value)?,
            "noise" => self.noise_volume = parse_volume(value)?,
            "dist" => {
                self.noise = match value {
                    "uniform" => NoiseKind::Uniform,
                    "gaussian" => NoiseKind::Gaussian,
                    _ => bail!("expected 'uniform' or 'gaussian'"),
                }
            }
            "seed" => self.seed = value.parse()?,
            "seconds" => self.duration = Duration::try_from_secs_f32(value.parse()?)?,
            _ => bail!("unknown setting"),
        }
        Ok(())
    }
}
