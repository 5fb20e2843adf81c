use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use byte_pusher_core::keypad::Keypad;
use byte_pusher_core::machine::{BytePusher, DEFAULT_AUDIO_CAPACITY};
use byte_pusher_core::video::{SCREEN_HEIGHT, SCREEN_WIDTH};
use eframe::egui::{self, TextureHandle, TextureOptions, load::SizedTexture};
use log::error;

use crate::audio;
use crate::keybinds::KeyBindings;
use crate::ui_config::{self, UiConfig};

pub struct App {
    machine: BytePusher,
    keypad: Keypad,
    bindings: KeyBindings,
    program_name: Option<String>,

    tex: TextureHandle,
    volume: Arc<Mutex<f32>>,
    volume_slider: f32,
    speed_percent: f32,
    // Held for the lifetime of the app; dropping it stops playback.
    _audio_stream: Option<cpal::Stream>,

    config: UiConfig,
    config_path: PathBuf,

    prev_time: Option<Instant>,
    fps_timer_ms: f64,
    frames_at_mark: u64,
    fps: u64,
}

impl App {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        mut machine: BytePusher,
        program_name: Option<String>,
        config: UiConfig,
        config_path: PathBuf,
    ) -> Self {
        let tex = cc.egui_ctx.load_texture(
            "screen",
            egui::ColorImage::from_rgba_unmultiplied(
                [SCREEN_WIDTH, SCREEN_HEIGHT],
                machine.framebuffer(),
            ),
            nearest_options(),
        );

        let volume = Arc::new(Mutex::new(config.volume));
        let consumer = machine.enable_audio(DEFAULT_AUDIO_CAPACITY);
        let audio_stream = audio::start_stream(consumer, Arc::clone(&volume));

        let speed_percent = (machine.speed() * 100.0) as f32;
        Self {
            machine,
            keypad: Keypad::new(),
            bindings: KeyBindings::load_from_file(&crate::keybinds::default_keybinds_path()),
            program_name,
            tex,
            volume_slider: config.volume,
            volume,
            speed_percent,
            _audio_stream: audio_stream,
            config,
            config_path,
            prev_time: None,
            fps_timer_ms: 1000.0,
            frames_at_mark: 0,
            fps: 0,
        }
    }

    fn open_program_dialog(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("BytePusher program", &["BytePusher", "bp"])
            .add_filter("All files", &["*"])
            .pick_file()
        else {
            return;
        };

        match std::fs::read(&path) {
            Ok(image) => {
                self.machine.load_program(image);
                self.program_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned());
            }
            Err(e) => {
                error!("failed to read {}: {e}", path.display());
                show_error(format!("Failed to read {}: {e}", path.display()));
            }
        }
    }

    fn menu_bar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Open program...").clicked() {
                    self.open_program_dialog();
                }
                if ui.button("Quit").clicked() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            });

            ui.menu_button("Emulation", |ui| {
                let label = if self.machine.is_paused() {
                    "Resume"
                } else {
                    "Pause"
                };
                if ui.button(label).clicked() {
                    let paused = self.machine.is_paused();
                    self.machine.set_paused(!paused);
                }
            });
        });
    }

    fn control_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let label = if self.machine.is_paused() {
                "Resume"
            } else {
                "Pause"
            };
            if ui.button(label).clicked() {
                let paused = self.machine.is_paused();
                self.machine.set_paused(!paused);
            }

            ui.separator();
            ui.label("Speed");
            if ui
                .add(egui::Slider::new(&mut self.speed_percent, 10.0..=300.0).suffix("%"))
                .changed()
            {
                self.machine.set_speed(self.speed_percent as f64 / 100.0);
            }

            ui.separator();
            ui.label("Volume");
            if ui
                .add(egui::Slider::new(&mut self.volume_slider, 0.0..=1.0))
                .changed()
            {
                *self.volume.lock().unwrap() = self.volume_slider;
            }

            ui.separator();
            ui.label(format!("{} FPS", self.fps));

            if let Some(name) = &self.program_name {
                ui.separator();
                ui.label(name);
            }
        });
    }

    fn run_machine(&mut self) {
        let now = Instant::now();
        let elapsed_ms = match self.prev_time {
            Some(prev) => now.duration_since(prev).as_secs_f64() * 1000.0,
            None => 0.0,
        };
        self.prev_time = Some(now);

        self.machine.set_keys(self.keypad.bits());
        self.machine.tick(elapsed_ms);

        self.fps_timer_ms -= elapsed_ms;
        if self.fps_timer_ms <= 0.0 {
            self.fps = self.machine.frames() - self.frames_at_mark;
            self.frames_at_mark = self.machine.frames();
            self.fps_timer_ms += 1000.0;
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.run_machine();

        if self.machine.take_frame_ready() {
            self.tex.set(
                egui::ColorImage::from_rgba_unmultiplied(
                    [SCREEN_WIDTH, SCREEN_HEIGHT],
                    self.machine.framebuffer(),
                ),
                nearest_options(),
            );
        }

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| self.menu_bar(ctx, ui));
        egui::TopBottomPanel::bottom("controls").show(ctx, |ui| self.control_bar(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.centered_and_justified(|ui| {
                let sized: SizedTexture = (&self.tex).into();
                let img = egui::Image::from_texture(sized)
                    .maintain_aspect_ratio(true)
                    .shrink_to_fit();
                ui.add(img);
            });
        });

        // Keep ticking even when no input arrives.
        ctx.request_repaint();
    }

    fn raw_input_hook(&mut self, ctx: &egui::Context, raw_input: &mut egui::RawInput) {
        for ev in &raw_input.events {
            if let egui::Event::Key { key, pressed, .. } = ev {
                if let Some(digit) = self.bindings.keypad_digit_for(*key) {
                    self.keypad.set_key(digit, *pressed);
                } else if *key == self.bindings.pause_key() && *pressed {
                    let paused = self.machine.is_paused();
                    self.machine.set_paused(!paused);
                } else if *key == self.bindings.quit_key() && *pressed {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                }
            }
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.config.volume = self.volume_slider;
        if let Err(e) = ui_config::save_to_file(&self.config_path, &self.config) {
            error!("failed to save UI config: {e}");
        }
    }
}

fn nearest_options() -> TextureOptions {
    TextureOptions {
        magnification: egui::TextureFilter::Nearest,
        ..Default::default()
    }
}

fn show_error(error: impl Into<String>) {
    rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Error)
        .set_title("BytePusher")
        .set_buttons(rfd::MessageButtons::Ok)
        .set_description(error.into())
        .show();
}
