use log::info;

use crate::{
    audio_queue::{AudioConsumer, AudioProducer, SAMPLES_PER_FRAME, audio_queue},
    cpu::Cpu,
    memory::Memory,
    pacer::Pacer,
    video::Video,
};

/// Instructions executed per frame.
pub const INSTRUCTIONS_PER_FRAME: u32 = 65_536;

/// Nominal frame rate of the machine.
pub const FRAMES_PER_SECOND: u32 = 60;

/// Memory address of the latched key bitmask (2 bytes, big-endian).
pub const KEY_STATE_ADDR: u32 = 0;

/// Address whose 2-byte big-endian value selects the 256-byte sample page
/// (`value << 8`).
pub const SAMPLE_PAGE_ADDR: u32 = 6;

/// Default capacity of the audio hand-off queue: four frames of samples.
pub const DEFAULT_AUDIO_CAPACITY: usize = SAMPLES_PER_FRAME * 4;

/// The whole machine: memory, interpreter, frame orchestration and output
/// extraction behind one host-facing control surface.
///
/// The host drives it from a single thread via [`BytePusher::tick`]; the only
/// state that crosses threads is the extracted output (the framebuffer copy
/// and the audio sample queue), never live memory.
pub struct BytePusher {
    pub cpu: Cpu,
    pub memory: Memory,
    pub video: Video,
    pacer: Pacer,
    /// Key bitmask snapshot, latched into memory at each frame boundary.
    keys: u16,
    /// Progress through the current frame's instruction quota. Starts at the
    /// full quota so the first executed instruction triggers a boundary.
    quota: u32,
    frames: u64,
    pending_program: Option<Vec<u8>>,
    audio: Option<AudioProducer>,
}

impl BytePusher {
    pub fn new() -> Self {
        Self {
            cpu: Cpu::new(),
            memory: Memory::new(),
            video: Video::new(),
            pacer: Pacer::new(),
            keys: 0,
            quota: INSTRUCTIONS_PER_FRAME,
            frames: 0,
            pending_program: None,
            audio: None,
        }
    }

    /// Queue a program image for loading. The swap happens at the start of
    /// the next drain, before any instruction executes: memory is
    /// zero-filled, the image copied in (truncated to the address space) and
    /// the quota counter reset so the next boundary phase starts the new
    /// program cleanly. The interpreter never observes a half-applied image.
    pub fn load_program(&mut self, program: Vec<u8>) {
        self.pending_program = Some(program);
    }

    /// Credit elapsed wall-clock time and run the instructions now due.
    pub fn tick(&mut self, elapsed_ms: f64) {
        if self.pacer.is_paused() {
            return;
        }
        let budget = self.pacer.budget(elapsed_ms);
        self.run_instructions(budget);
    }

    pub fn set_speed(&mut self, speed: f64) {
        self.pacer.set_speed(speed);
    }

    pub fn speed(&self) -> f64 {
        self.pacer.speed()
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.pacer.set_paused(paused);
    }

    pub fn is_paused(&self) -> bool {
        self.pacer.is_paused()
    }

    /// Record the current key bitmask. Consumed at the next frame boundary;
    /// mid-frame changes are invisible to the running program.
    pub fn set_keys(&mut self, bits: u16) {
        self.keys = bits;
    }

    /// Attach an audio sink and return the consumer half of the sample
    /// queue. Replaces any previously attached sink. Without a sink the
    /// boundary phase skips audio extraction entirely.
    pub fn enable_audio(&mut self, capacity_samples: usize) -> AudioConsumer {
        info!("audio sink attached, {capacity_samples} sample queue");
        let (producer, consumer) = audio_queue(capacity_samples);
        self.audio = Some(producer);
        consumer
    }

    /// RGBA8 view of the most recently extracted frame.
    pub fn framebuffer(&self) -> &[u8] {
        self.video.framebuffer()
    }

    /// Whether a new frame has been extracted since the last call.
    pub fn take_frame_ready(&mut self) -> bool {
        self.video.take_frame_ready()
    }

    /// Total frame boundaries crossed since power-on.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run exactly `count` instructions, crossing frame boundaries as the
    /// quota dictates. This is the frame-controller loop; [`BytePusher::tick`]
    /// is the paced entry point, tests and headless tools call this directly.
    pub fn run_instructions(&mut self, count: u64) {
        if let Some(program) = self.pending_program.take() {
            self.memory.load_program(&program);
            self.quota = INSTRUCTIONS_PER_FRAME;
        }

        for _ in 0..count {
            if self.quota >= INSTRUCTIONS_PER_FRAME {
                self.frame_boundary();
                self.quota = 1;
            } else {
                self.quota += 1;
            }
            self.cpu.step(&mut self.memory);
        }
    }

    /// Boundary phase. The ordering is load-bearing: outputs are extracted
    /// from the state the *previous* frame's instructions produced, then the
    /// key bitmask is latched and the program counter refetched for the frame
    /// about to run.
    fn frame_boundary(&mut self) {
        self.video.extract(&self.memory);
        if let Some(producer) = &self.audio {
            let base =
                ((self.memory.read(SAMPLE_PAGE_ADDR) as usize) << 8
                    | self.memory.read(SAMPLE_PAGE_ADDR + 1) as usize)
                    << 8;
            for &byte in self.memory.slice(base, SAMPLES_PER_FRAME) {
                let _ = producer.push(byte as i8);
            }
        }

        self.memory.write(KEY_STATE_ADDR, (self.keys >> 8) as u8);
        self.memory.write(KEY_STATE_ADDR + 1, self.keys as u8);
        self.cpu.reload_pc(&self.memory);
        self.frames += 1;
    }
}

impl Default for BytePusher {
    fn default() -> Self {
        Self::new()
    }
}
