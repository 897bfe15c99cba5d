use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use std::sync::{Arc, Mutex};
use tracing::{debug, error};

/// Click frequency for ordinary steps
pub const CLICK_HZ: f32 = 1000.0;
/// Click frequency for accented steps (first step of a pass)
pub const ACCENT_HZ: f32 = 1600.0;
/// Click length in seconds
pub const CLICK_SECONDS: f32 = 0.03;

const VOLUME: f32 = 0.3;

/// A single decaying sine burst, rendered sample by sample
#[derive(Clone, Debug)]
pub struct ClickVoice {
    sample_rate: f32,
    frequency: f32,
    phase: f32,
    /// Samples left in the current click
    remaining: usize,
    length: usize,
}

impl ClickVoice {
    pub fn new(sample_rate: f32) -> Self {
        let length = (sample_rate * CLICK_SECONDS).round().max(1.0) as usize;
        Self {
            sample_rate,
            frequency: CLICK_HZ,
            phase: 0.0,
            remaining: 0,
            length,
        }
    }

    /// Restart the click, cutting off any click still sounding
    pub fn trigger(&mut self, accent: bool) {
        self.frequency = if accent { ACCENT_HZ } else { CLICK_HZ };
        self.phase = 0.0;
        self.remaining = self.length;
    }

    /// Whether a click is sounding
    pub fn is_active(&self) -> bool {
        self.remaining > 0
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Next mono sample; silence when idle
    pub fn next_sample(&mut self) -> f32 {
        if self.remaining == 0 {
            return 0.0;
        }

        // Linear decay to zero over the click
        let envelope = self.remaining as f32 / self.length as f32;
        let value = VOLUME * envelope * (2.0 * std::f32::consts::PI * self.phase).sin();

        self.phase = (self.phase + self.frequency / self.sample_rate) % 1.0;
        self.remaining -= 1;
        value
    }
}

/// Audible click on the default output device
pub struct ClickPlayer {
    stream: Stream,
    voice: Arc<Mutex<ClickVoice>>,
}

impl ClickPlayer {
    /// Open the default output device and start a silent stream
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("No output device available"))?;
        let config = device.default_output_config()?;

        let sample_format = config.sample_format();
        let config: StreamConfig = config.into();

        let voice = Arc::new(Mutex::new(ClickVoice::new(config.sample_rate.0 as f32)));
        let stream = match sample_format {
            SampleFormat::F32 => Self::build_stream::<f32>(&device, &config, voice.clone())?,
            SampleFormat::I16 => Self::build_stream::<i16>(&device, &config, voice.clone())?,
            SampleFormat::U16 => Self::build_stream::<u16>(&device, &config, voice.clone())?,
            _ => return Err(anyhow!("Unsupported sample format: {:?}", sample_format)),
        };
        stream
            .play()
            .map_err(|e| anyhow!("Failed to play stream: {}", e))?;

        debug!(
            sample_rate = config.sample_rate.0,
            channels = config.channels,
            "click output opened"
        );
        Ok(ClickPlayer { stream, voice })
    }

    fn build_stream<T>(
        device: &cpal::Device,
        config: &StreamConfig,
        voice: Arc<Mutex<ClickVoice>>,
    ) -> Result<Stream>
    where
        T: Sample + SizedSample + Send + 'static + cpal::FromSample<f32>,
    {
        let channels = config.channels as usize;
        let err_fn = |err| error!("an error occurred on the output audio stream: {:?}", err);

        let stream = device
            .build_output_stream(
                config,
                move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                    // A poisoned voice renders silence rather than panicking the audio thread
                    let Ok(mut voice) = voice.lock() else {
                        for sample in data.iter_mut() {
                            *sample = T::EQUILIBRIUM;
                        }
                        return;
                    };
                    for frame in data.chunks_mut(channels) {
                        let value: T = T::from_sample(voice.next_sample());
                        for sample in frame.iter_mut() {
                            *sample = value;
                        }
                    }
                },
                err_fn,
                None,
            )
            .map_err(|e| anyhow!("Failed to build output stream: {}", e))?;

        Ok(stream)
    }

    /// Sound one click
    pub fn trigger(&self, accent: bool) -> Result<()> {
        let mut voice = self
            .voice
            .lock()
            .map_err(|e| anyhow!("Failed to lock click voice: {}", e))?;
        voice.trigger(accent);
        Ok(())
    }

    pub fn pause(&self) -> Result<()> {
        self.stream
            .pause()
            .map_err(|e| anyhow!("Failed to pause stream: {}", e))
    }
}
