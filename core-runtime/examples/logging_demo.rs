//! Logging system demonstration
//!
//! Run with:
//! ```bash
//! # Pretty format (default in debug)
//! cargo run --example logging_demo
//!
//! # JSON format
//! cargo run --example logging_demo -- json
//!
//! # With custom filter
//! cargo run --example logging_demo -- compact "core_runtime=trace"
//! ```

use core_runtime::logging::{init_logging, strip_path, LogFormat, LogLevel, LoggingConfig};
use std::env;
use tracing::{debug, error, info, warn};

fn main() {
    let args: Vec<String> = env::args().collect();

    let format = match args.get(1).map(String::as_str) {
        Some("json") => LogFormat::Json,
        Some("compact") => LogFormat::Compact,
        _ => LogFormat::Pretty,
    };

    let mut config = LoggingConfig::default()
        .with_format(format)
        .with_level(LogLevel::Trace);

    if let Some(filter) = args.get(2) {
        config = config.with_filter(filter.clone());
    }

    init_logging(config).expect("Failed to initialize logging");

    info!("Application started");
    debug!(track_id = "v1", "Resolving track");
    info!(file = %strip_path("/home/user/Music/song.mp3"), "Caching file");
    warn!("Stream URL expired, re-resolving");
    error!(status = 503, "Catalog service unavailable");
}
