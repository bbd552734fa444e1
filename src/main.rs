mod config;
mod error;
mod models;
mod services;
#[cfg(feature = "http-server")]
mod server; // POST /analyze endpoint

use anyhow::Result;
use dotenv::dotenv;
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;

use config::AnalyzerConfig;
use models::{ImageInput, MediaType};
use services::{GeminiService, MealAnalyzer};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables (RUST_LOG may live in .env)
    dotenv().ok();

    // Initialize logger
    env_logger::init();

    log::info!("🚀 Starting meal-lens...");

    // Missing API key stops the process here, not inside the analyzer.
    let config = AnalyzerConfig::from_env()?;
    let gemini = Arc::new(GeminiService::new(config));
    log::info!("✅ Gemini service initialized with model: {}", gemini.model());

    let images = image_paths(env::args_os().skip(1));

    if images.is_empty() {
        return serve(gemini).await;
    }

    let forced_media_type = env::var("MEAL_LENS_MEDIA_TYPE").ok();
    let mut failures = 0;

    for path in images {
        let declared = forced_media_type
            .clone()
            .or_else(|| MediaType::from_extension(&path).map(|m| m.as_mime().to_string()));
        let input = match declared {
            Some(media_type) => ImageInput::with_media_type(&path, media_type),
            None => ImageInput::new(&path),
        };

        match gemini.analyze(&input).await {
            Ok(meal) => println!("{}", serde_json::to_string_pretty(&meal)?),
            Err(e) => {
                failures += 1;
                log::error!("❌ {}: {}", path.display(), e);
                eprintln!("{}: {}", path.display(), e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} image(s) could not be analyzed", failures);
    }

    Ok(())
}

/// Paths may be non-UTF-8, so arguments stay `OsString` until they are paths.
fn image_paths(args: impl Iterator<Item = OsString>) -> Vec<PathBuf> {
    args.map(PathBuf::from).collect()
}

#[cfg(feature = "http-server")]
async fn serve(analyzer: Arc<dyn MealAnalyzer>) -> Result<()> {
    let addr = env::var("MEAL_LENS_ADDR").unwrap_or_else(|_| config::DEFAULT_ADDR.to_string());
    let app = server::create_router(analyzer);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("🌐 HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            log::info!("🛑 Shutting down...");
        })
        .await?;

    Ok(())
}

#[cfg(not(feature = "http-server"))]
async fn serve(_analyzer: Arc<dyn MealAnalyzer>) -> Result<()> {
    anyhow::bail!("usage: meal-lens <image>... (built without the http-server feature)")
}
