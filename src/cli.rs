use clap::Parser;
use std::path::PathBuf;

// Build version with target info
const VERSION_INFO: &str = const_format::concatcp!(
    env!("CARGO_PKG_VERSION"), "\n",
    "HTTP:   reqwest (rustls), rouille dev server\n",
    "Target: ", std::env::consts::ARCH, "-", std::env::consts::OS
);

/// Interaction timeline editor for webinar videos
#[derive(Parser, Debug, Default)]
#[command(author, version = VERSION_INFO, about, long_about = None)]
pub struct Args {
    /// Backend base URL (overrides cueline.json), e.g. http://localhost:8080/api
    #[arg(short = 'u', long = "api-url", value_name = "URL")]
    pub api_url: Option<String>,

    /// Webinar whose interactions are edited
    #[arg(short = 'w', long = "webinar", value_name = "ID")]
    pub webinar: Option<String>,

    /// Video duration in seconds (stands in for video metadata)
    #[arg(short = 'd', long = "duration", value_name = "SECONDS")]
    pub duration: Option<f64>,

    /// Run the in-memory store server on PORT and edit against it
    #[arg(long = "serve-store", value_name = "PORT")]
    pub serve_store: Option<u16>,

    /// Delay before a dragged marker position is persisted
    #[arg(long = "debounce-ms", value_name = "MS")]
    pub debounce_ms: Option<u64>,

    /// Enable debug logging to file (default: cueline.log)
    #[arg(short = 'l', long = "log", value_name = "LOG_FILE")]
    pub log_file: Option<Option<PathBuf>>,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR")]
    pub config_dir: Option<PathBuf>,
}
