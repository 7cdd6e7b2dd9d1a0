//! Desktop simulation of the pacsynth step sequencer.
//!
//! Usage: `pacsynth [key=value ...]`, see [config::SimConfig] for the
//! available settings.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use pacsynth::context::Context;
use pacsynth::engine::SynthEngine;
use pacsynth::mixer::{MixMode, Mixer};
use pacsynth::osc::{OscControl, Oscillator};
use pacsynth::sequencer::Sequencer;
use pacsynth::wavetable::{fill_noise, fill_tone, Wavetable};
use pacsynth::{FrequencyFxP, LOOP_LENGTH, OSCILLATOR_COUNT, PCM_TABLE_SIZE};

mod audio;
mod config;
mod controls;

use config::{Mode, SimConfig};
use controls::{ScriptedControls, ThreadDelay};

/// Build the tables and controls for the lifetime of the process
fn build_engine(
    config: &SimConfig,
) -> Result<(audio::Engine, &'static [OscControl; OSCILLATOR_COUNT])> {
    let mut sin = vec![0i16; PCM_TABLE_SIZE];
    fill_tone(&mut sin);
    let mut noise = vec![0i16; PCM_TABLE_SIZE];
    fill_noise(&mut noise, config.noise, &mut SmallRng::seed_from_u64(config.seed));
    let sin: &'static [i16] = sin.leak();
    let noise: &'static [i16] = noise.leak();

    let controls: &'static [OscControl; OSCILLATOR_COUNT] = Box::leak(Box::new([
        OscControl::with_volume(config.tone_volume),
        OscControl::with_volume(config.noise_volume),
    ]));
    let engine = SynthEngine::new(
        [
            Oscillator::tone(Wavetable::new(sin).map_err(anyhow::Error::msg)?, &controls[0]),
            Oscillator::overflow_modulated(
                Wavetable::new(noise).map_err(anyhow::Error::msg)?,
                &controls[1],
            ),
        ],
        Mixer::new(MixMode::Sum),
    );
    Ok((engine, controls))
}

fn run_sequencer(config: &SimConfig, controls: &[OscControl]) {
    let mut sequencer = Sequencer::<LOOP_LENGTH>::default();
    let mut io = ScriptedControls::new(config.pattern.clone(), config.tempo, config.record_passes);
    let start = Instant::now();
    while start.elapsed() < config.duration {
        sequencer.step(&mut io, controls, &mut ThreadDelay);
    }
    log::info!("Played {} passes", io.passes());
}

/// Sweep the noise voice up one semitone every 2^14 samples
fn run_sweep(config: &SimConfig, ctx: &Context, controls: &[OscControl], ticks: &AtomicU32) {
    for control in controls {
        control.set_frequency(FrequencyFxP::from_num(440), ctx);
    }
    let start = Instant::now();
    while start.elapsed() < config.duration {
        let semitones = (ticks.load(Ordering::Relaxed) >> 14) as f32 - 49.0;
        let freq = 440.0 * f32::powf(2.0, semitones / 12.0);
        if let Some(noise) = controls.get(1) {
            noise.set_frequency(FrequencyFxP::saturating_from_num(freq), ctx);
        }
        thread::sleep(Duration::from_millis(10));
    }
}

fn main() -> Result<()> {
    colog::init();
    let config = SimConfig::from_args(std::env::args().skip(1))?;
    log::info!("{:?}", config);

    let output = audio::Output::open_default()?;
    let ctx = Context::new(output.sample_rate()).map_err(anyhow::Error::msg)?;
    let (engine, controls) = build_engine(&config)?;
    let ticks = Arc::new(AtomicU32::new(0));
    let _stream = output.play(engine, ticks.clone())?;

    match config.mode {
        Mode::Sequencer => run_sequencer(&config, controls),
        Mode::Sweep => run_sweep(&config, &ctx, controls, &ticks),
    }
    log::info!("Rendered {} samples", ticks.load(Ordering::Relaxed));
    Ok(())
}
