use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use anyhow::{anyhow, bail, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample, StreamConfig};

use pacsynth::engine::SynthEngine;
use pacsynth::OSCILLATOR_COUNT;

pub type Engine = SynthEngine<'static, i16, OSCILLATOR_COUNT>;

/// The default output device and the configuration it will be driven with
pub struct Output {
    device: cpal::Device,
    config: StreamConfig,
    format: SampleFormat,
}

impl Output {
    pub fn open_default() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("No output device available"))?;
        let supported = device.default_output_config()?;
        let format = supported.sample_format();
        let config: StreamConfig = supported.into();
        log::info!(
            "Output device: {} ({} Hz, {} channels, {})",
            device.name().unwrap_or_else(|_| "unknown".into()),
            config.sample_rate.0,
            config.channels,
            format
        );
        Ok(Self {
            device,
            config,
            format,
        })
    }
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }
    /// Start a stream rendering `engine`.  The engine's tick count is
    /// published to `ticks` after each buffer.
    pub fn play(&self, engine: Engine, ticks: Arc<AtomicU32>) -> Result<cpal::Stream> {
        let stream = match self.format {
            SampleFormat::I16 => self.build_pcm16(engine, ticks)?,
            SampleFormat::F32 => self.build_converting::<f32>(engine, ticks)?,
            SampleFormat::U16 => self.build_converting::<u16>(engine, ticks)?,
            other => bail!("Unsupported sample format: {}", other),
        };
        stream.play()?;
        Ok(stream)
    }
    fn build_pcm16(&self, mut engine: Engine, ticks: Arc<AtomicU32>) -> Result<cpal::Stream> {
        let channels = self.config.channels as usize;
        let stream = self.device.build_output_stream(
            &self.config,
            move |data: &mut [i16], _: &cpal::OutputCallbackInfo| {
                engine.render(data, channels);
                ticks.store(engine.ticks(), Ordering::Relaxed);
            },
            |err| log::error!("Stream error: {}", err),
            None,
        )?;
        Ok(stream)
    }
    fn build_converting<T>(&self, mut engine: Engine, ticks: Arc<AtomicU32>) -> Result<cpal::Stream>
    where
        T: SizedSample + FromSample<i16>,
    {
        let channels = (self.config.channels as usize).max(1);
        let stream = self.device.build_output_stream(
            &self.config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    frame.fill(T::from_sample(engine.tick()));
                }
                ticks.store(engine.ticks(), Ordering::Relaxed);
            },
            |err| log::error!("Stream error: {}", err),
            None,
        )?;
        Ok(stream)
    }
}
