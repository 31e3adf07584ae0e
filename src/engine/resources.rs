use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("asset {0} not found")]
    NotFound(PathBuf),
    #[error("failed to fetch {path}: {message}")]
    Fetch { path: PathBuf, message: String },
    #[cfg(feature = "image")]
    #[error("failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("{path} is not a usable font")]
    Font { path: PathBuf },
    #[error("text {0:?} rendered to an empty bitmap")]
    EmptyText(String),
    #[cfg(feature = "mixer")]
    #[error("failed to decode audio {path}: {source}")]
    Audio {
        path: PathBuf,
        #[source]
        source: rodio::decoder::DecoderError,
    },
}

/// Where asset bytes come from: the filesystem, the APK on Android, or bytes
/// fetched up front in the browser.
pub trait AssetSource {
    fn read(&self, path: &Path) -> Result<Vec<u8>, AssetError>;
}

/// Paths resolve against the working directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsAssets;

impl AssetSource for FsAssets {
    fn read(&self, path: &Path) -> Result<Vec<u8>, AssetError> {
        std::fs::read(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                AssetError::NotFound(path.to_path_buf())
            } else {
                AssetError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })
    }
}

/// Assets resolved before the app starts. The browser has no synchronous
/// file access, so the web build fetches everything here first.
#[derive(Debug, Default)]
pub struct PreloadedAssets {
    files: HashMap<PathBuf, Result<Vec<u8>, String>>,
}

impl PreloadedAssets {
    pub fn insert(&mut self, path: impl Into<PathBuf>, bytes: Vec<u8>) {
        self.files.insert(path.into(), Ok(bytes));
    }

    pub fn insert_failure(&mut self, path: impl Into<PathBuf>, message: impl Into<String>) {
        self.files.insert(path.into(), Err(message.into()));
    }

    /// Fetches each path relative to the page URL.
    #[cfg(target_arch = "wasm32")]
    pub async fn fetch<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Self {
        let paths: Vec<PathBuf> = paths.into_iter().map(Path::to_path_buf).collect();
        let mut assets = Self::default();
        for path in paths {
            match fetch_bytes(&path).await {
                Ok(bytes) => {
                    tracing::debug!(path = %path.display(), len = bytes.len(), "fetched asset");
                    assets.insert(path, bytes);
                }
                Err(message) => assets.insert_failure(path, message),
            }
        }
        assets
    }
}

impl AssetSource for PreloadedAssets {
    fn read(&self, path: &Path) -> Result<Vec<u8>, AssetError> {
        match self.files.get(path) {
            Some(Ok(bytes)) => Ok(bytes.clone()),
            Some(Err(message)) => Err(AssetError::Fetch {
                path: path.to_path_buf(),
                message: message.clone(),
            }),
            None => Err(AssetError::NotFound(path.to_path_buf())),
        }
    }
}

#[cfg(target_arch = "wasm32")]
async fn fetch_bytes(path: &Path) -> Result<Vec<u8>, String> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;

    let describe = |value: wasm_bindgen::JsValue| format!("{value:?}");
    let window = web_sys::window().ok_or("no browser window")?;
    let response = JsFuture::from(window.fetch_with_str(&path.to_string_lossy()))
        .await
        .map_err(describe)?;
    let response: web_sys::Response = response.dyn_into().map_err(describe)?;
    if !response.ok() {
        return Err(format!("HTTP {}", response.status()));
    }
    let buffer = JsFuture::from(response.array_buffer().map_err(describe)?)
        .await
        .map_err(describe)?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

#[cfg(target_os = "android")]
pub struct ApkAssets {
    app: winit::platform::android::activity::AndroidApp,
}

#[cfg(target_os = "android")]
impl ApkAssets {
    pub fn new(app: winit::platform::android::activity::AndroidApp) -> Self {
        Self { app }
    }
}

#[cfg(target_os = "android")]
impl AssetSource for ApkAssets {
    fn read(&self, path: &Path) -> Result<Vec<u8>, AssetError> {
        use std::io::Read;

        let name = std::ffi::CString::new(path.to_string_lossy().as_bytes())
            .map_err(|_| AssetError::NotFound(path.to_path_buf()))?;
        let mut asset = self
            .app
            .asset_manager()
            .open(&name)
            .ok_or_else(|| AssetError::NotFound(path.to_path_buf()))?;
        let mut bytes = Vec::new();
        asset
            .read_to_end(&mut bytes)
            .map_err(|source| AssetError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(bytes)
    }
}

/// Tightly packed RGBA8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Bitmap {
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }
}

pub struct ResourceManager {
    source: Box<dyn AssetSource>,
}

impl ResourceManager {
    pub fn new(source: Box<dyn AssetSource>) -> Self {
        Self { source }
    }

    pub fn read(&self, path: &Path) -> Result<Vec<u8>, AssetError> {
        tracing::debug!(path = %path.display(), "reading asset");
        self.source.read(path)
    }

    #[cfg(feature = "image")]
    pub fn load_image(&self, path: &Path) -> Result<Bitmap, AssetError> {
        let bytes = self.read(path)?;
        let decoded = image::load_from_memory(&bytes).map_err(|source| AssetError::Image {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = decoded.to_rgba8();
        Ok(Bitmap {
            width: rgba.width(),
            height: rgba.height(),
            pixels: rgba.into_raw(),
        })
    }

    #[cfg(feature = "ttf")]
    pub fn render_text(
        &self,
        font_path: &Path,
        size: f32,
        text: &str,
        color: crate::ui::Color,
    ) -> Result<Bitmap, AssetError> {
        let font_data = self.read(font_path)?;
        super::text::render_line(&font_data, size, text, color).map_err(|err| match err {
            super::text::TextError::InvalidFont => AssetError::Font {
                path: font_path.to_path_buf(),
            },
            super::text::TextError::Empty => AssetError::EmptyText(text.to_string()),
        })
    }
}
