mod app;
mod audio;
mod keybinds;
mod ui_config;

use std::fs;
use std::path::PathBuf;

use byte_pusher_core::machine::{BytePusher, INSTRUCTIONS_PER_FRAME};
use byte_pusher_core::video::{SCREEN_HEIGHT, SCREEN_WIDTH};
use clap::Parser;
use eframe::egui;
use log::info;

use app::App;

#[derive(Parser)]
#[command(about = "BytePusher virtual machine")]
struct Args {
    /// Path to a BytePusher program image
    program: Option<PathBuf>,

    /// Start paused
    #[arg(long)]
    paused: bool,

    /// Emulation speed as a percentage of real time
    #[arg(long, default_value_t = 100.0)]
    speed: f64,

    /// Run without opening a window
    #[arg(long)]
    headless: bool,

    /// Number of frames to run in headless mode
    #[arg(long, default_value_t = 60)]
    frames: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut machine = BytePusher::new();
    machine.set_speed(args.speed / 100.0);
    machine.set_paused(args.paused);

    let mut program_name = None;
    if let Some(path) = &args.program {
        machine.load_program(fs::read(path)?);
        program_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
    }

    if args.headless {
        machine.run_instructions(args.frames * INSTRUCTIONS_PER_FRAME as u64);
        info!("ran {} frames headless", machine.frames());
        return Ok(());
    }

    let config_path = ui_config::default_ui_config_path();
    let config = ui_config::load_from_file(&config_path);

    let scale = config.window_size.scale_factor_px() as f32;
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("BytePusher")
            .with_inner_size(egui::Vec2::new(
                SCREEN_WIDTH as f32 * scale,
                SCREEN_HEIGHT as f32 * scale + 64.0,
            ))
            .with_min_inner_size(egui::Vec2::new(SCREEN_WIDTH as f32, SCREEN_HEIGHT as f32)),
        ..Default::default()
    };

    eframe::run_native(
        "BytePusher",
        native_options,
        Box::new(move |cc| Ok(Box::new(App::new(cc, machine, program_name, config, config_path)))),
    )?;
    Ok(())
}
