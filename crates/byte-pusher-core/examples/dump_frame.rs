use std::env;
use std::fs;
use std::io::Write;

use byte_pusher_core::machine::{BytePusher, INSTRUCTIONS_PER_FRAME};
use byte_pusher_core::video::{SCREEN_HEIGHT, SCREEN_WIDTH};

const DEFAULT_FRAMES: u64 = 60;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let program_path = args
        .next()
        .ok_or("expected <program> <output ppm> [--frames=N]")?;
    let out_path = args
        .next()
        .ok_or("expected <program> <output ppm> [--frames=N]")?;

    let mut frames = DEFAULT_FRAMES;
    for arg in args {
        if let Some(value) = arg.strip_prefix("--frames=") {
            frames = value.parse()?;
        } else {
            return Err(format!("unrecognised flag: {arg}").into());
        }
    }

    if frames == 0 {
        return Err("frames must be positive".into());
    }

    let program = fs::read(&program_path)?;
    let mut machine = BytePusher::new();
    machine.load_program(program);
    machine.run_instructions(frames * INSTRUCTIONS_PER_FRAME as u64);
    // One more boundary so the framebuffer reflects the final frame's memory.
    machine.run_instructions(1);

    let mut out = Vec::with_capacity(SCREEN_WIDTH * SCREEN_HEIGHT * 3 + 32);
    write!(out, "P6\n{SCREEN_WIDTH} {SCREEN_HEIGHT}\n255\n")?;
    for pixel in machine.framebuffer().chunks_exact(4) {
        out.extend_from_slice(&pixel[..3]);
    }
    fs::write(&out_path, out)?;

    println!("wrote frame {frames} of {program_path} to {out_path}");
    Ok(())
}
