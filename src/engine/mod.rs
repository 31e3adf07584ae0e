#[cfg(feature = "mixer")]
pub mod audio;
pub mod config;
#[cfg(feature = "net")]
pub mod net;
pub mod platform;
pub mod renderer;
pub mod resources;
pub mod scene;
#[cfg(feature = "ttf")]
pub mod text;

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use wgpu::SurfaceError;
use winit::{
    dpi::LogicalSize,
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop, EventLoopBuilder, EventLoopWindowTarget},
    window::{Fullscreen, Window, WindowBuilder},
};

use crate::app::{AppState, Effect, Flow, FrameSink, FrameStep, InputEvent};
use crate::ui::Scene;
use self::config::{EngineConfig, Layout, Platform};
use self::platform::EventTranslator;
use self::renderer::Renderer;
use self::resources::{AssetSource, Bitmap, ResourceManager};
use self::scene::{SceneAssets, TextureInfo};

#[cfg(feature = "mixer")]
use self::audio::AudioEngine;

pub enum EngineEvent {
    RendererReady(Renderer),
}

pub fn event_loop() -> Result<EventLoop<EngineEvent>> {
    EventLoopBuilder::<EngineEvent>::with_user_event()
        .build()
        .context("failed to create event loop")
}

#[cfg(target_os = "android")]
pub fn android_event_loop(
    app: winit::platform::android::activity::AndroidApp,
) -> Result<EventLoop<EngineEvent>> {
    use winit::platform::android::EventLoopBuilderExtAndroid;

    let mut builder = EventLoopBuilder::<EngineEvent>::with_user_event();
    builder.with_android_app(app);
    builder.build().context("failed to create event loop")
}

/// Bootstraps and runs the app on `event_loop`.
pub fn launch(
    config: EngineConfig,
    event_loop: EventLoop<EngineEvent>,
    assets: Box<dyn AssetSource>,
) -> Result<()> {
    let app = EngineApp::bootstrap(config, &event_loop, assets)?;
    app.run(event_loop)
}

#[derive(Default)]
struct LoadedBitmaps {
    image: Option<Bitmap>,
    text: Option<Bitmap>,
}

/// Window-side half of a frame: applies effects and draws.
struct Runtime {
    window: Arc<Window>,
    renderer: Option<Renderer>,
    bitmaps: LoadedBitmaps,
    scene_assets: SceneAssets,
    layout: Layout,
    #[cfg(feature = "mixer")]
    audio: AudioEngine,
}

impl Runtime {
    fn attach_renderer(&mut self, mut renderer: Renderer) {
        let mut upload = |asset: &str, bitmap: &Option<Bitmap>| {
            let bitmap = bitmap.as_ref()?;
            match renderer.upload(bitmap) {
                Ok(id) => Some(TextureInfo {
                    id,
                    width: bitmap.width,
                    height: bitmap.height,
                }),
                Err(err) => {
                    tracing::warn!(target: "engine", asset, %err, "skipping texture");
                    None
                }
            }
        };
        self.scene_assets = SceneAssets {
            image: upload("image", &self.bitmaps.image),
            text: upload("text", &self.bitmaps.text),
        };
        tracing::info!(target: "engine", "Renderer created!");
        self.renderer = Some(renderer);
    }

    fn detach_renderer(&mut self) {
        if self.renderer.take().is_some() {
            tracing::info!(target: "engine", "renderer released");
        }
        self.scene_assets = SceneAssets::default();
    }
}

impl FrameSink for Runtime {
    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::PlayClick => {
                #[cfg(feature = "mixer")]
                self.audio.play();
            }
            Effect::SetFullscreen(on) => {
                tracing::info!(target: "engine", fullscreen = on, "toggling fullscreen");
                self.window
                    .set_fullscreen(on.then_some(Fullscreen::Borderless(None)));
            }
            Effect::Notify(message) => platform::notify(message),
        }
    }

    fn present(&mut self, state: &AppState) -> Result<bool> {
        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(false);
        };
        let scene = Scene::compose(state, &self.scene_assets, &self.layout);
        match renderer.render(&scene) {
            Ok(()) => Ok(true),
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                renderer.resize(self.window.inner_size());
                Ok(false)
            }
            Err(SurfaceError::OutOfMemory) => Err(anyhow!("GPU out of memory")),
            Err(SurfaceError::Timeout) => {
                tracing::warn!("surface timeout, retrying next frame");
                Ok(false)
            }
        }
    }
}

pub struct EngineApp {
    config: EngineConfig,
    runtime: Runtime,
    frame: FrameStep,
    translator: EventTranslator,
    pending: Vec<InputEvent>,
    failure: Option<anyhow::Error>,
    #[cfg(target_arch = "wasm32")]
    renderer_requested: bool,
    #[cfg(target_arch = "wasm32")]
    proxy: winit::event_loop::EventLoopProxy<EngineEvent>,
}

impl EngineApp {
    pub fn bootstrap(
        config: EngineConfig,
        event_loop: &EventLoop<EngineEvent>,
        assets: Box<dyn AssetSource>,
    ) -> Result<Self> {
        tracing::info!(
            target: "engine",
            app = %config.app_name,
            version = env!("CARGO_PKG_VERSION"),
            platform = ?Platform::current(),
            "Engine starting"
        );
        tracing::info!(
            target: "engine",
            image = cfg!(feature = "image"),
            mixer = cfg!(feature = "mixer"),
            ttf = cfg!(feature = "ttf"),
            net = cfg!(feature = "net"),
            "modules"
        );

        #[cfg(feature = "mixer")]
        let mut audio = AudioEngine::new()?;

        #[cfg(feature = "net")]
        net::init();

        let builder = WindowBuilder::new()
            .with_title(config.title())
            .with_resizable(config.resizable)
            .with_inner_size(LogicalSize::new(
                f64::from(config.window_width),
                f64::from(config.window_height),
            ))
            .with_fullscreen(config.fullscreen.then_some(Fullscreen::Borderless(None)));
        #[cfg(target_arch = "wasm32")]
        let builder = {
            use winit::platform::web::WindowBuilderExtWebSys;
            builder.with_append(true)
        };
        let window = match builder.build(event_loop) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                platform::notify(&format!("Could not create window {err}"));
                return Err(anyhow!("failed to create window: {err}"));
            }
        };
        tracing::info!(target: "engine", "Window created!");

        let resources = ResourceManager::new(assets);
        let mut bitmaps = LoadedBitmaps::default();

        #[cfg(feature = "image")]
        if let Some(path) = config.assets.image.as_deref() {
            match resources.load_image(path) {
                Ok(bitmap) => {
                    tracing::info!(width = bitmap.width, height = bitmap.height, "Image loaded successfully!");
                    bitmaps.image = Some(bitmap);
                }
                Err(err) => tracing::warn!(%err, "failed to load image"),
            }
        }

        #[cfg(feature = "ttf")]
        if let Some(path) = config.assets.font.as_deref() {
            match resources.render_text(path, config.font_size, &config.text, crate::ui::Color::WHITE) {
                Ok(bitmap) => bitmaps.text = Some(bitmap),
                Err(err) => tracing::warn!(%err, "failed to render text"),
            }
        }

        #[cfg(feature = "mixer")]
        if let Some(path) = config.assets.audio.as_deref() {
            let loaded = resources
                .read(path)
                .and_then(|bytes| audio.load_clip(path, bytes));
            if let Err(err) = loaded {
                tracing::warn!(%err, "failed to load audio");
            }
        }

        let size = window.inner_size();
        let state = AppState::new(size.width, size.height, config.marker_size, config.fullscreen);

        Ok(Self {
            translator: EventTranslator::new(size.width, size.height),
            frame: FrameStep::new(state),
            pending: Vec::new(),
            failure: None,
            runtime: Runtime {
                window,
                renderer: None,
                bitmaps,
                scene_assets: SceneAssets::default(),
                layout: config.layout.clone(),
                #[cfg(feature = "mixer")]
                audio,
            },
            #[cfg(target_arch = "wasm32")]
            renderer_requested: false,
            #[cfg(target_arch = "wasm32")]
            proxy: event_loop.create_proxy(),
            config,
        })
    }

    pub fn run(self, event_loop: EventLoop<EngineEvent>) -> Result<()> {
        platform::notify("Entering the loop");
        self.drive(event_loop)
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn drive(self, event_loop: EventLoop<EngineEvent>) -> Result<()> {
        let mut app = self;
        event_loop
            .run(|event, target| app.handle(event, target))
            .map_err(|err| anyhow!(err))?;

        tracing::info!(
            target: "engine",
            frames = app.frame.frames_presented(),
            "Engine shutdown complete"
        );
        match app.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// The browser owns the loop: the handler is spawned and this returns at once.
    #[cfg(target_arch = "wasm32")]
    fn drive(self, event_loop: EventLoop<EngineEvent>) -> Result<()> {
        use winit::platform::web::EventLoopExtWebSys;

        let mut app = self;
        event_loop.set_control_flow(ControlFlow::Poll);
        event_loop.spawn(move |event, target| app.handle(event, target));
        Ok(())
    }

    fn handle(&mut self, event: Event<EngineEvent>, target: &EventLoopWindowTarget<EngineEvent>) {
        match event {
            Event::Resumed => {
                self.pending.push(InputEvent::DidEnterForeground);
                if self.runtime.renderer.is_none() {
                    self.request_renderer(target);
                }
            }
            Event::Suspended => {
                self.pending.push(InputEvent::WillEnterBackground);
                self.runtime.detach_renderer();
                #[cfg(target_arch = "wasm32")]
                {
                    self.renderer_requested = false;
                }
            }
            Event::UserEvent(EngineEvent::RendererReady(renderer)) => {
                self.runtime.attach_renderer(renderer);
            }
            Event::WindowEvent { window_id, event } if window_id == self.runtime.window.id() => {
                if let WindowEvent::Resized(size) = &event {
                    if let Some(renderer) = self.runtime.renderer.as_mut() {
                        renderer.resize(*size);
                    }
                }
                self.translator.window_event(&event, &mut self.pending);
            }
            Event::AboutToWait => self.step(target),
            Event::LoopExiting => {
                tracing::info!(target: "engine", "event loop exiting");
            }
            _ => {}
        }
    }

    fn step(&mut self, target: &EventLoopWindowTarget<EngineEvent>) {
        match self.frame.run_frame(self.pending.drain(..), &mut self.runtime) {
            Ok(Flow::Continue) => self.schedule_next(target),
            Ok(Flow::Quit) => target.exit(),
            Err(err) => {
                tracing::error!(target: "engine", err = %format!("{err:#}"), "frame failed, shutting down");
                self.failure = Some(err);
                target.exit();
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn schedule_next(&self, target: &EventLoopWindowTarget<EngineEvent>) {
        let deadline = std::time::Instant::now() + self.config.frame_delay();
        target.set_control_flow(ControlFlow::WaitUntil(deadline));
    }

    #[cfg(target_arch = "wasm32")]
    fn schedule_next(&self, _target: &EventLoopWindowTarget<EngineEvent>) {}

    #[cfg(not(target_arch = "wasm32"))]
    fn request_renderer(&mut self, target: &EventLoopWindowTarget<EngineEvent>) {
        match pollster::block_on(Renderer::new(self.runtime.window.clone())) {
            Ok(renderer) => self.runtime.attach_renderer(renderer),
            Err(err) => {
                platform::notify(&format!("Could not create renderer: {err}"));
                self.failure = Some(err.context("failed to create renderer"));
                target.exit();
            }
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn request_renderer(&mut self, _target: &EventLoopWindowTarget<EngineEvent>) {
        if self.renderer_requested {
            return;
        }
        self.renderer_requested = true;
        let window = self.runtime.window.clone();
        let proxy = self.proxy.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match Renderer::new(window).await {
                Ok(renderer) => {
                    if proxy.send_event(EngineEvent::RendererReady(renderer)).is_err() {
                        tracing::warn!(target: "engine", "event loop closed before renderer was ready");
                    }
                }
                Err(err) => {
                    platform::notify(&format!("Could not create renderer: {err}"));
                }
            }
        });
    }
}
