use log::{error, info, warn};
use std::process;

use crate::ai::{HttpGenerator, TextGenerator};
use crate::config::{self, Config};

/// Load and check configuration. Call this before Rocket launches.
/// Aborts when the configuration cannot be used at all.
pub fn run() -> (Config, HttpGenerator) {
    info!("Shopscribe boot check starting...");

    let config = match config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("  Failed to load {}: {}", config::CONFIG_FILE, e);
            process::exit(1);
        }
    };

    if let Err(e) = config.check() {
        error!("  Invalid configuration: {}", e);
        process::exit(1);
    }

    let generator = match HttpGenerator::from_config(&config.ai) {
        Ok(g) => g,
        Err(e) => {
            error!("  AI provider setup failed: {}", e);
            process::exit(1);
        }
    };

    if !generator.is_configured() {
        warn!(
            "  No API key for AI provider '{}'; generation requests will fail until one is set",
            generator.provider_name()
        );
    }

    info!(
        "  AI provider: {} ({}), payload contract: {}",
        generator.provider_name(),
        generator.model(),
        config.generation.contract.name()
    );
    info!(
        "  Rate limit: {} generations per {}s per shop",
        config.rate_limit.max_requests, config.rate_limit.window_secs
    );
    info!("Shopscribe boot check passed.");

    (config, generator)
}
