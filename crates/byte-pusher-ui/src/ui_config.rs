use log::warn;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum WindowSize {
    #[serde(rename = "1x")]
    X1,
    #[serde(rename = "2x")]
    #[default]
    X2,
    #[serde(rename = "3x")]
    X3,
    #[serde(rename = "4x")]
    X4,
}

impl WindowSize {
    pub fn scale_factor_px(&self) -> u32 {
        match self {
            Self::X1 => 1,
            Self::X2 => 2,
            Self::X3 => 3,
            Self::X4 => 4,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub window_size: WindowSize,
    pub volume: f32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            window_size: WindowSize::default(),
            volume: 0.5,
        }
    }
}

pub fn default_ui_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("bytepusher").join("ui.toml");
        }
    }

    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("bytepusher").join("ui.toml");
    }

    if let Some(home) = std::env::var_os("HOME") {
        return PathBuf::from(home)
            .join(".config")
            .join("bytepusher")
            .join("ui.toml");
    }

    PathBuf::from("ui.toml")
}

pub fn load_from_file(path: &PathBuf) -> UiConfig {
    let text = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(_) => return UiConfig::default(),
    };

    match toml::from_str::<UiConfig>(&text) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!(
                "Failed to parse UI config {}: {e}; using defaults",
                path.display()
            );
            UiConfig::default()
        }
    }
}

pub fn save_to_file(path: &PathBuf, cfg: &UiConfig) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let text = toml::to_string_pretty(cfg).unwrap_or_else(|_| String::new());
    std::fs::write(path, text)
}
