use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::ui::Rect;

pub const CONFIG_ENV: &str = "TAPMARK_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "tapmark.ron";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Desktop,
    Android,
    Web,
}

impl Platform {
    pub const fn current() -> Self {
        if cfg!(target_os = "android") {
            Platform::Android
        } else if cfg!(target_arch = "wasm32") {
            Platform::Web
        } else {
            Platform::Desktop
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AssetPaths {
    pub image: Option<PathBuf>,
    pub font: Option<PathBuf>,
    pub audio: Option<PathBuf>,
}

impl AssetPaths {
    /// The configured paths, image then font then audio.
    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        [&self.image, &self.font, &self.audio]
            .into_iter()
            .filter_map(|path| path.as_deref())
    }

    fn for_platform(platform: Platform) -> Self {
        let root = match platform {
            Platform::Android => PathBuf::new(),
            Platform::Desktop | Platform::Web => PathBuf::from("app/src/main/assets"),
        };
        Self {
            image: Some(root.join("sprites/crate.png")),
            font: Some(root.join("fonts/arial.ttf")),
            audio: Some(root.join("audio/picked-coin-echo-2.wav")),
        }
    }
}

impl Default for AssetPaths {
    fn default() -> Self {
        Self::for_platform(Platform::current())
    }
}

/// Screen placement of the optional image and text line, in pixels.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// x, y, width, height
    pub image_rect: [f32; 4],
    /// x, y; the text keeps its rendered size
    pub text_origin: [f32; 2],
}

impl Layout {
    fn for_platform(platform: Platform) -> Self {
        match platform {
            Platform::Android => Self {
                image_rect: [50.0, 50.0, 512.0, 512.0],
                text_origin: [700.0, 100.0],
            },
            Platform::Desktop | Platform::Web => Self {
                image_rect: [50.0, 50.0, 128.0, 128.0],
                text_origin: [200.0, 50.0],
            },
        }
    }

    pub fn image_rect(&self) -> Rect {
        let [x, y, width, height] = self.image_rect;
        Rect::new(x, y, width, height)
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::for_platform(Platform::current())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub app_name: String,
    pub window_title: Option<String>,
    pub window_width: u32,
    pub window_height: u32,
    pub resizable: bool,
    pub fullscreen: bool,
    pub frame_delay_ms: u64,
    pub marker_size: f32,
    pub font_size: f32,
    pub text: String,
    pub assets: AssetPaths,
    pub layout: Layout,
}

impl EngineConfig {
    pub fn for_platform(platform: Platform) -> Self {
        let android = platform == Platform::Android;
        Self {
            app_name: "tapmark".to_string(),
            window_title: None,
            window_width: 640,
            window_height: 480,
            resizable: true,
            fullscreen: android,
            frame_delay_ms: 10,
            marker_size: if android { 250.0 } else { 50.0 },
            font_size: if android { 120.0 } else { 70.0 },
            text: "Hello World!".to_string(),
            assets: AssetPaths::for_platform(platform),
            layout: Layout::for_platform(platform),
        }
    }

    pub fn from_ron_str(source: &str) -> Result<Self> {
        ron::from_str(source).context("invalid engine config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_ron_str(&source).with_context(|| format!("in {}", path.display()))
    }

    /// `$TAPMARK_CONFIG` if set, else `tapmark.ron` when present, else defaults.
    pub fn discover() -> Result<Self> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Self::load(Path::new(&path));
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.is_file() {
            return Self::load(fallback);
        }
        Ok(Self::default())
    }

    pub fn title(&self) -> String {
        self.window_title
            .clone()
            .unwrap_or_else(|| format!("{} {} window", self.app_name, env!("CARGO_PKG_VERSION")))
    }

    pub fn frame_delay(&self) -> Duration {
        Duration::from_millis(self.frame_delay_ms)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::for_platform(Platform::current())
    }
}
