#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use tapmark::engine::{self, config::EngineConfig, resources::FsAssets};

    tapmark::init_tracing();

    let config = EngineConfig::discover()?;
    let event_loop = engine::event_loop()?;
    engine::launch(config, event_loop, Box::new(FsAssets))
}

// The web build starts from the library's `start` hook.
#[cfg(target_arch = "wasm32")]
fn main() {}
