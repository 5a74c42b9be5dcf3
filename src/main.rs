mod common;
mod config;
mod headless;
mod network;
mod storage;
mod sync;
mod ui;
mod view;

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use tokio::runtime::Handle;

use common::ConnectForm;
use config::AppConfig;
use network::{ChatTransport, HttpTransport};
use storage::FormCache;
use ui::ChatApp;

#[derive(Parser)]
#[command(
    name = "poll_chat",
    version,
    about = "Chat client that keeps in sync with the server by polling"
)]
struct Cli {
    /// Path to JSON config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH, value_name = "FILE")]
    config: String,
    /// Base URL of the chat server (overrides config and environment)
    #[arg(long, value_name = "URL")]
    server: Option<String>,
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Subcommand)]
enum Mode {
    /// Connect and keep the session in sync without a window
    Headless {
        #[arg(long)]
        nickname: String,
        #[arg(long)]
        secret_key: String,
        /// Address of the chat server the web server should connect to
        #[arg(long)]
        ip_address: String,
        #[arg(long)]
        port: String,
        /// Rewrite this HTML file with the current view after every change
        #[arg(long, value_name = "FILE")]
        snapshot: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    // Khởi tạo Logger để debug
    env_logger::init();

    let cli = Cli::parse();
    let app_config = resolve_config(&cli);
    let transport: Arc<dyn ChatTransport> = Arc::new(HttpTransport::new(&app_config.server_url)?);
    log::info!("Using chat server {}", app_config.server_url);

    match cli.mode {
        Some(Mode::Headless {
            nickname,
            secret_key,
            ip_address,
            port,
            snapshot,
        }) => {
            let form = ConnectForm {
                nickname,
                secret_key,
                ip_address,
                port,
            };
            headless::run(transport, app_config.session_settings(), form, snapshot).await?;
        }
        None => run_gui(transport, &app_config)?,
    }

    Ok(())
}

fn resolve_config(cli: &Cli) -> AppConfig {
    let mut app_config = config::load_config(&cli.config);
    if !Path::new(&cli.config).exists() {
        match config::save_config(&cli.config, &app_config) {
            Ok(()) => log::info!("Wrote default config to {}", cli.config),
            Err(err) => log::warn!("Unable to create {}: {err}", cli.config),
        }
    }

    app_config.apply_env();
    if let Some(server) = &cli.server {
        app_config.server_url = server.clone();
    }
    app_config
}

fn open_form_cache(path: &Path) -> Option<FormCache> {
    if let Err(err) = storage::ensure_parent_dir(path) {
        log::warn!("Unable to create directory for {}: {err}", path.display());
        return None;
    }
    match FormCache::with_path(path) {
        Ok(cache) => Some(cache),
        Err(err) => {
            log::warn!("Form cache unavailable ({}): {err}", path.display());
            None
        }
    }
}

fn run_gui(transport: Arc<dyn ChatTransport>, app_config: &AppConfig) -> Result<(), eframe::Error> {
    let runtime = Handle::current();
    let settings = app_config.session_settings();
    let form_cache = open_form_cache(&app_config.form_cache_path);
    let options = eframe::NativeOptions::default();

    eframe::run_native(
        "Poll Chat",
        options,
        Box::new(move |cc| {
            log::info!("Client window opened");
            Ok(Box::new(ChatApp::new(
                cc, runtime, transport, settings, form_cache,
            )))
        }),
    )
}
