//! BytePusher virtual machine emulation core.
//!
//! This crate contains the platform-agnostic emulator logic (memory,
//! interpreter, frame orchestration, pacing, output extraction). Frontends
//! (desktop UI, headless tools) live in separate crates and drive the core
//! via the [`machine`] facade.

/// SPSC sample ring buffer for the frame-boundary audio hand-off.
pub mod audio_queue;

/// ByteByteJump single-instruction interpreter.
pub mod cpu;

/// 16-key keypad bitmask state.
pub mod keypad;

/// High-level facade that wires memory, interpreter and output extraction
/// into a single machine driven by host ticks.
pub mod machine;

/// Flat 24-bit address space.
pub mod memory;

/// Wall-clock time to instruction-budget conversion.
pub mod pacer;

/// Framebuffer extraction and the fixed 216-color palette.
pub mod video;
