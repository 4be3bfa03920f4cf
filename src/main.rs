use std::path::PathBuf;

use anyhow::Context;
use log::{error, info};
use spinfield::{SceneConfig, SpinfieldApp};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        error!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => SceneConfig::load(&path)
            .with_context(|| format!("reading configuration {}", path.display()))?,
        None => SceneConfig::default(),
    };
    info!(
        "Starting with model {} ({}x{}, pool capacity {})",
        config.model_path.display(),
        config.window.width,
        config.window.height,
        config.pool_capacity
    );

    let app = SpinfieldApp::new(config).context("failed to initialize the scene")?;
    app.run().context("scene stopped with an error")
}
