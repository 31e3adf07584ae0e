pub mod app;
pub mod engine;
pub mod ui;

/// Desktop logging: `RUST_LOG` directives, `info` when unset.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(filter)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("tracing subscriber already set");
    }
}

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn start() {
    std::panic::set_hook(Box::new(console_error_panic_hook::hook));
    console_log::init_with_level(log::Level::Info).ok();

    wasm_bindgen_futures::spawn_local(async {
        let config = engine::config::EngineConfig::default();
        let assets = engine::resources::PreloadedAssets::fetch(config.assets.iter()).await;
        let result = engine::event_loop()
            .and_then(|event_loop| engine::launch(config, event_loop, Box::new(assets)));
        if let Err(err) = result {
            tracing::error!(err = %format!("{err:#}"), "startup failed");
        }
    });
}

#[cfg(target_os = "android")]
#[no_mangle]
fn android_main(app: winit::platform::android::activity::AndroidApp) {
    android_logger::init_once(
        android_logger::Config::default().with_max_level(log::LevelFilter::Info),
    );

    let assets = Box::new(engine::resources::ApkAssets::new(app.clone()));
    let result = engine::android_event_loop(app).and_then(|event_loop| {
        engine::launch(engine::config::EngineConfig::default(), event_loop, assets)
    });
    if let Err(err) = result {
        tracing::error!(err = %format!("{err:#}"), "startup failed");
    }
}
