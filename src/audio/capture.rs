use anyhow::{anyhow, bail};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::traits::{Consumer, Producer, Split};
use ringbuf::HeapRb;
use rubato::{FftFixedIn, Resampler};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info};

/// Rate speech recognition models expect.
pub const TARGET_RATE: u32 = 16_000;

const RESAMPLE_CHUNK: usize = 1024;

/// Fixed-length microphone recorder. Produces mono 16-bit PCM at the target rate.
#[derive(Debug, Clone)]
pub struct MicRecorder {
    target_rate: u32,
}

impl MicRecorder {
    pub fn new(target_rate: u32) -> Self {
        Self {
            target_rate: target_rate.max(1),
        }
    }

    pub fn target_rate(&self) -> u32 {
        self.target_rate
    }

    /// Blocks for `duration` while the default input device records.
    pub fn record(&self, duration: Duration) -> anyhow::Result<Vec<i16>> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or_else(|| anyhow!("No input device available"))?;

        info!("Audio Input Device: {}", device.name().unwrap_or_default());

        let config = select_config(&device, self.target_rate)?;
        let rate = config.sample_rate().0;
        let channels = usize::from(config.channels()).max(1);
        info!("Audio Config Selected: Rate={}Hz, Channels={}", rate, channels);

        // One extra second of headroom; overflow is dropped.
        let capacity = rate as usize * (duration.as_secs() as usize + 1);
        let (mut producer, mut consumer) = HeapRb::<f32>::new(capacity.max(1)).split();

        let err_fn = |err| error!("an error occurred on stream: {}", err);

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => device.build_input_stream(
                &config.into(),
                move |data: &[f32], _: &_| push_mono(data, channels, |s| s, &mut producer),
                err_fn,
                None,
            )?,
            cpal::SampleFormat::I16 => device.build_input_stream(
                &config.into(),
                move |data: &[i16], _: &_| {
                    push_mono(data, channels, |s| s as f32 / i16::MAX as f32, &mut producer)
                },
                err_fn,
                None,
            )?,
            other => bail!("Unsupported sample format: {other:?}"),
        };

        stream.play()?;
        std::thread::sleep(duration);
        drop(stream);

        let mono: Vec<f32> = consumer.pop_iter().collect();
        debug!(frames = mono.len(), rate, "captured audio");

        let samples = if rate == self.target_rate {
            mono
        } else {
            resample(&mono, rate, self.target_rate)?
        };
        Ok(to_pcm16(&samples))
    }
}

impl Default for MicRecorder {
    fn default() -> Self {
        Self::new(TARGET_RATE)
    }
}

fn select_config(
    device: &cpal::Device,
    target_rate: u32,
) -> anyhow::Result<cpal::SupportedStreamConfig> {
    for range in device.supported_input_configs()? {
        if range.min_sample_rate().0 <= target_rate && range.max_sample_rate().0 >= target_rate {
            return Ok(range.with_sample_rate(cpal::SampleRate(target_rate)));
        }
    }
    Ok(device.default_input_config()?)
}

/// Average each interleaved frame down to one sample.
fn push_mono<T, P>(input: &[T], channels: usize, to_f32: impl Fn(T) -> f32, producer: &mut P)
where
    T: Copy,
    P: Producer<Item = f32>,
{
    for frame in input.chunks(channels) {
        let sum: f32 = frame.iter().map(|&s| to_f32(s)).sum();
        // Full buffer: drop
        let _ = producer.try_push(sum / frame.len() as f32);
    }
}

pub fn resample(input: &[f32], from: u32, to: u32) -> anyhow::Result<Vec<f32>> {
    if input.is_empty() || from == to {
        return Ok(input.to_vec());
    }

    let mut resampler = FftFixedIn::<f32>::new(from as usize, to as usize, RESAMPLE_CHUNK, 2, 1)?;
    let mut output = Vec::with_capacity(input.len() * to as usize / from as usize + RESAMPLE_CHUNK);

    let mut pos = 0;
    while input.len() - pos >= resampler.input_frames_next() {
        let end = pos + resampler.input_frames_next();
        let chunk = [&input[pos..end]];
        let out = resampler.process(&chunk[..], None)?;
        output.extend_from_slice(&out[0]);
        pos = end;
    }

    if pos < input.len() {
        let chunk = [&input[pos..]];
        let out = resampler.process_partial(Some(&chunk[..]), None)?;
        output.extend_from_slice(&out[0]);
    }

    Ok(output)
}

pub fn to_pcm16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
        .collect()
}

/// Mono 16-bit WAV.
pub fn write_wav(path: &Path, samples: &[i16], sample_rate: u32) -> Result<(), hound::Error> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()
}
