//! Hysteria Panel command line entry point

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use log::{info, warn};

use hysteria_panel::common::{init_logger, listen_on_port, Result};
use hysteria_panel::config::{check_warnings, CliOverrides, ConsoleConfig};
use hysteria_panel::console::{normalize_base_path, start_console_server, ConsoleState};
use hysteria_panel::hysteria::{ApplyController, ConfigWriter};
use hysteria_panel::netinfo::PublicIpResolver;
use hysteria_panel::service::SystemdService;
use hysteria_panel::store::{SettingKey, Store};
use hysteria_panel::{APP_NAME, VERSION};

/// Hysteria Panel: web administration for Hysteria v2 servers
#[derive(Parser, Debug)]
#[clap(author, version = VERSION, about, long_about = None)]
struct Args {
    /// Configuration file (JSON)
    #[clap(long, env = "HYSTERIA_PANEL_CONFIG_FILE")]
    config_file: Option<PathBuf>,

    /// Listen address, overrides the panel_port setting
    #[clap(short, long)]
    listen: Option<String>,

    /// SQLite database path
    #[clap(long)]
    database: Option<PathBuf>,

    /// Where the Hysteria configuration is written
    #[clap(long)]
    hysteria_config: Option<PathBuf>,

    /// systemd unit of the Hysteria server
    #[clap(long)]
    service_unit: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[clap(long)]
    log_level: Option<String>,

    /// Journal lines shown on the logs page
    #[clap(long)]
    log_lines: Option<usize>,
}

impl From<Args> for CliOverrides {
    fn from(args: Args) -> Self {
        CliOverrides {
            config_file: args.config_file,
            listen: args.listen,
            database_path: args.database,
            hysteria_config_path: args.hysteria_config,
            service_unit: args.service_unit,
            log_level: args.log_level,
            log_lines: args.log_lines,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = CliOverrides::from(args);
    let config = ConsoleConfig::load(&overrides)?;

    init_logger(&config.log_level);
    info!("Starting {} v{}", APP_NAME, VERSION);
    if let Some(file) = &config.config_file {
        info!("Configuration loaded from {}", file.display());
    }
    for warning in check_warnings(&config) {
        warn!("{}", warning);
    }

    let store = Store::open(&config.database_path).await?;

    let service = Arc::new(SystemdService::new(config.service_unit.clone()));
    let apply = ApplyController::new(ConfigWriter::new(&config.hysteria_config_path), service);

    // Bring the on-disk configuration in line with the database; the running
    // server is left alone until the first change.
    if !apply.regenerate_on_startup(&store).await? {
        warn!(
            "{} is stale until the next successful apply",
            config.hysteria_config_path.display()
        );
    }

    let settings = store.load_settings().await?;

    let listen_addr = match config.listen_addr()? {
        Some(addr) => addr,
        None => listen_on_port(settings.get(SettingKey::PanelPort))?,
    };

    let panel_path = settings.get(SettingKey::PanelPath);
    let base_path = normalize_base_path(panel_path).unwrap_or_else(|| {
        warn!("Ignoring unusable panel_path {:?}; serving at /", panel_path);
        String::new()
    });

    let resolver = PublicIpResolver::new(config.public_ip_lookup_url.clone(), config.lookup_timeout());
    let state = ConsoleState::new(store, apply, resolver, config.log_lines, &base_path);

    start_console_server(state, listen_addr).await
}
