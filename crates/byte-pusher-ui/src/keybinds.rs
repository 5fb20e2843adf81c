use eframe::egui::Key;
use log::warn;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub fn default_keybinds_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata)
                .join("bytepusher")
                .join("keybinds.toml");
        }
    }

    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("bytepusher").join("keybinds.toml");
    }

    if let Some(home) = std::env::var_os("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join("bytepusher")
            .join("keybinds.toml");
    }

    PathBuf::from("keybinds.toml")
}

/// Keyboard bindings for the 16-key hexadecimal keypad plus UI shortcuts.
///
/// The default layout mirrors the classic CHIP-8 mapping onto the left four
/// columns of a QWERTY keyboard:
///
/// ```text
///   1 2 3 C <-> 1 2 3 4
///   4 5 6 D <-> Q W E R
///   7 8 9 E <-> A S D F
///   A 0 B F <-> Z X C V
/// ```
#[derive(Clone)]
pub struct KeyBindings {
    /// Keyboard key to keypad hex digit (bit index in the key bitmask).
    keypad: HashMap<Key, u8>,
    pause: Key,
    quit: Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::defaults()
    }
}

impl KeyBindings {
    pub fn defaults() -> Self {
        let mut keypad = HashMap::new();
        keypad.insert(Key::X, 0x0);
        keypad.insert(Key::Num1, 0x1);
        keypad.insert(Key::Num2, 0x2);
        keypad.insert(Key::Num3, 0x3);
        keypad.insert(Key::Q, 0x4);
        keypad.insert(Key::W, 0x5);
        keypad.insert(Key::E, 0x6);
        keypad.insert(Key::A, 0x7);
        keypad.insert(Key::S, 0x8);
        keypad.insert(Key::D, 0x9);
        keypad.insert(Key::Z, 0xA);
        keypad.insert(Key::C, 0xB);
        keypad.insert(Key::Num4, 0xC);
        keypad.insert(Key::R, 0xD);
        keypad.insert(Key::F, 0xE);
        keypad.insert(Key::V, 0xF);

        Self {
            keypad,
            pause: Key::P,
            quit: Key::Escape,
        }
    }

    /// Load bindings from a plain `name = key` file. Unknown names and keys
    /// are warned about and skipped; missing entries keep their defaults.
    pub fn load_from_file(path: &Path) -> Self {
        let Ok(text) = std::fs::read_to_string(path) else {
            return Self::defaults();
        };

        let mut bindings = Self::defaults();

        for (line_no, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }

            let Some((name, value)) = line.split_once('=') else {
                warn!(
                    "Ignoring invalid keybinds line {}:{} (expected name = value)",
                    path.display(),
                    line_no + 1
                );
                continue;
            };

            let name = name.trim();
            let value = value.trim();
            let Some(code) = parse_key(value) else {
                warn!(
                    "Ignoring keybinds line {}:{} (unknown Key '{value}')",
                    path.display(),
                    line_no + 1
                );
                continue;
            };

            if let Some(digit) = keypad_digit_for_name(name) {
                bindings.keypad.retain(|_, &mut d| d != digit);
                bindings.keypad.insert(code, digit);
            } else {
                match name {
                    "pause" => bindings.pause = code,
                    "quit" => bindings.quit = code,
                    other => warn!(
                        "Ignoring unknown keybind name '{other}' in {}:{}",
                        path.display(),
                        line_no + 1
                    ),
                }
            }
        }

        bindings
    }

    pub fn keypad_digit_for(&self, key: Key) -> Option<u8> {
        self.keypad.get(&key).copied()
    }

    pub fn pause_key(&self) -> Key {
        self.pause
    }

    pub fn quit_key(&self) -> Key {
        self.quit
    }
}

/// `keypad_0` through `keypad_f`.
fn keypad_digit_for_name(name: &str) -> Option<u8> {
    let digit = name.strip_prefix("keypad_")?;
    let mut chars = digit.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    c.to_digit(16).map(|d| d as u8)
}

fn parse_key(raw: &str) -> Option<Key> {
    let s = raw.trim();

    match s {
        "ArrowUp" | "Up" => Some(Key::ArrowUp),
        "ArrowDown" | "Down" => Some(Key::ArrowDown),
        "ArrowLeft" | "Left" => Some(Key::ArrowLeft),
        "ArrowRight" | "Right" => Some(Key::ArrowRight),
        "Enter" => Some(Key::Enter),
        "Escape" => Some(Key::Escape),
        "Space" => Some(Key::Space),
        "Tab" => Some(Key::Tab),
        "Backspace" => Some(Key::Backspace),
        _ => Key::from_name(s),
    }
}
