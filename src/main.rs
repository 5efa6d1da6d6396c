use cueline::app::{AppLayout, CuelineApp};
use cueline::cli::Args;
use cueline::config::{self, EditorSettings, PathConfig};
use cueline::core::notifications::Notifications;
use cueline::core::playback::PlaybackState;
use cueline::core::workers::Workers;
use cueline::core::event_bus::EventBus;
use cueline::editor::Editor;
use cueline::server::{StoreRegistry, StoreServer, demo_interactions};
use cueline::sync::{HttpStore, SyncPipeline};

use clap::Parser;
use eframe::egui;
use log::{debug, info, warn};
use std::sync::Arc;

/// Stand-in video length when no duration is given, seconds
const DEFAULT_VIDEO_DURATION: f64 = 1800.0;

fn init_logging(args: &Args, path_config: &PathConfig) -> Result<(), Box<dyn std::error::Error>> {
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let log_level = match args.verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    if let Some(log_path_opt) = &args.log_file {
        let log_path = log_path_opt
            .clone()
            .unwrap_or_else(|| path_config.config_file(config::LOG_FILE));
        let file = std::fs::File::create(&log_path)?;

        env_logger::Builder::new()
            .filter_level(log_level)
            .filter_module("egui", log::LevelFilter::Info) // Suppress egui DEBUG spam
            .filter_module("rouille", log::LevelFilter::Warn)
            .format_timestamp_millis()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();

        info!("Logging to file: {} (level: {:?})", log_path.display(), log_level);
    } else {
        // Console logging (respects RUST_LOG if set)
        let default_level = match args.verbosity {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
            .filter_module("egui", log::LevelFilter::Info)
            .format_timestamp_millis()
            .init();
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let path_config = PathConfig::from_env_and_cli(args.config_dir.clone());
    if let Err(e) = path_config.ensure_dir() {
        eprintln!("Warning: {:#}", e);
    }

    init_logging(&args, &path_config)?;

    info!("Cueline starting...");
    debug!("Command-line args: {:?}", args);

    let settings_path = path_config.config_file(config::SETTINGS_FILE);
    info!("Settings path: {}", settings_path.display());
    let mut settings = match EditorSettings::load(&settings_path) {
        Ok(s) => s,
        Err(e) => {
            warn!("{:#}; using defaults", e);
            EditorSettings::default()
        }
    };
    settings.apply_cli(&args);
    settings.validate()?;

    // Local store server, seeded once so the editor has something to show
    let server = match args.serve_store {
        Some(port) => {
            let registry = Arc::new(StoreRegistry::new());
            registry.seed(&settings.webinar, demo_interactions());
            let server = StoreServer::start(&format!("127.0.0.1:{}", port), registry)?;
            Some(server)
        }
        None => None,
    };

    let store = HttpStore::new(&settings.api_url, &settings.webinar, settings.request_timeout())?;
    let workers = Workers::new(settings.worker_count());
    info!(
        "Editing webinar {} at {} ({} worker(s))",
        settings.webinar,
        settings.api_url,
        workers.num_threads()
    );
    let pipeline = SyncPipeline::new(Arc::new(store), Arc::new(workers)).with_debounce(settings.debounce_ms);

    let duration = args.duration.unwrap_or(DEFAULT_VIDEO_DURATION);
    let video = PlaybackState::with_duration(duration);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!(
                "Cueline v{} • {} • A to add, Space to play",
                env!("CARGO_PKG_VERSION"),
                settings.webinar
            ))
            .with_inner_size([1280.0, 800.0])
            .with_resizable(true),
        persist_window: true,
        persistence_path: Some(path_config.config_file(config::UI_STATE_FILE)),
        ..Default::default()
    };

    eframe::run_native(
        "Cueline",
        native_options,
        Box::new(move |cc| {
            // Load persisted layout if available, otherwise the default one
            let layout: AppLayout = cc
                .storage
                .and_then(|storage| storage.get_string(eframe::APP_KEY))
                .and_then(|json| serde_json::from_str(&json).ok())
                .unwrap_or_else(|| {
                    info!("No persisted layout found, using default");
                    AppLayout::default()
                });

            let editor = Editor::new(pipeline, video, EventBus::new())
                .with_rules(settings.rules())
                .with_notifications(Notifications::new(settings.toast_ttl_ms));

            Ok(Box::new(CuelineApp::new(editor, settings, layout, server)))
        }),
    )?;

    info!("Application exiting");
    Ok(())
}
