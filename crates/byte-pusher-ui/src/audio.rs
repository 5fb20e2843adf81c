use byte_pusher_core::audio_queue::{AudioConsumer, SAMPLE_RATE};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};

/// Pulls the machine's 15.36 kHz signed 8-bit sample stream and repeats each
/// sample for as many device frames as the rate ratio requires (zero-order
/// hold). Queue underruns produce silence.
struct Source {
    queue: AudioConsumer,
    step: f64,
    frac: f64,
    current: f32,
}

impl Source {
    fn new(queue: AudioConsumer, device_rate: u32) -> Self {
        Self {
            queue,
            step: SAMPLE_RATE as f64 / device_rate as f64,
            frac: 0.0,
            current: 0.0,
        }
    }

    fn next_sample(&mut self) -> f32 {
        self.frac += self.step;
        while self.frac >= 1.0 {
            self.frac -= 1.0;
            self.current = match self.queue.pop() {
                // Normalize to [-1, 1]; gain is applied by the caller.
                Some(s) => s as f32 / 127.0,
                None => 0.0,
            };
        }
        self.current
    }
}

/// Start audio playback using `cpal` and stream the samples the machine
/// extracts at each frame boundary. `volume` is shared with the UI's volume
/// slider.
///
/// Returns the active [`cpal::Stream`] if successful; with no output device
/// the emulator simply runs without sound.
pub fn start_stream(queue: AudioConsumer, volume: Arc<Mutex<f32>>) -> Option<cpal::Stream> {
    let host = cpal::default_host();
    let device = host.default_output_device()?;
    let supported = match device.default_output_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("no supported output config: {e}");
            return None;
        }
    };
    let sample_format = supported.sample_format();
    let config: cpal::StreamConfig = supported.into();
    let channels = config.channels as usize;
    let mut source = Source::new(queue, config.sample_rate.0);
    let err_fn = |err| eprintln!("cpal stream error: {err}");

    let stream = match sample_format {
        cpal::SampleFormat::I16 => device
            .build_output_stream(
                &config,
                move |data: &mut [i16], _| {
                    let gain = *volume.lock().unwrap();
                    for frame in data.chunks_mut(channels) {
                        let s = (source.next_sample() * gain * 32767.0) as i16;
                        for out in frame.iter_mut() {
                            *out = s;
                        }
                    }
                },
                err_fn,
                None,
            )
            .unwrap(),
        cpal::SampleFormat::U16 => device
            .build_output_stream(
                &config,
                move |data: &mut [u16], _| {
                    let gain = *volume.lock().unwrap();
                    for frame in data.chunks_mut(channels) {
                        let s = (source.next_sample() * gain * 32767.0) as i16;
                        let s = (s as i32 + 32768) as u16;
                        for out in frame.iter_mut() {
                            *out = s;
                        }
                    }
                },
                err_fn,
                None,
            )
            .unwrap(),
        cpal::SampleFormat::F32 => device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _| {
                    let gain = *volume.lock().unwrap();
                    for frame in data.chunks_mut(channels) {
                        let s = source.next_sample() * gain;
                        for out in frame.iter_mut() {
                            *out = s;
                        }
                    }
                },
                err_fn,
                None,
            )
            .unwrap(),
        _ => panic!("Unsupported sample format"),
    };

    stream.play().expect("failed to play stream");
    Some(stream)
}
