// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use readtext_server::{
    api::{start_server, AppState},
    config::ServerArgs,
    engine::EnginePool,
    version,
    vision::ocr::{paddle::model_dir_exists, PaddleEngineFactory},
};
use std::{env, sync::Arc};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let args = ServerArgs::parse();

    info!("Starting {}", version::get_version_string());
    info!("Build: {}", version::VERSION);
    info!("Features: {}", version::FEATURES.join(", "));

    let engine_config = args.engine_config();
    if !model_dir_exists(&engine_config.model_dir) {
        // Engines are built per request, so the server still starts
        warn!(
            "No detection model in {}; /readtext will fail until models are installed",
            engine_config.model_dir.display()
        );
    }

    let factory = PaddleEngineFactory::new(engine_config);
    let available = factory.available_languages();
    if available.is_empty() {
        warn!("No recognition models found");
    } else {
        info!("Recognition languages available: {}", available.join(", "));
    }

    let pool = Arc::new(EnginePool::new(Arc::new(factory)));
    let state = AppState::new(pool);

    start_server(&args, state).await?;

    info!("Server stopped");
    Ok(())
}
