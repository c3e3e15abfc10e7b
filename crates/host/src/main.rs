use std::net::TcpListener;
use std::sync::Arc;

use anyhow::{bail, Context};
use marquee_host::api::AppState;
use marquee_host::config::Config;
use marquee_host::marquee::{self, Marquee};
use marquee_host::mqtt::{self, MqttSettings};
use marquee_host::panel;
use marquee_host::user_config::UserConfig;
use marquee_protocol::interpolate;
use tokio::signal;
use tokio::sync::RwLock;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_banner() {
    eprintln!();
    eprintln!("  \x1b[1;33m╔══════════════════════════════════╗\x1b[0m");
    eprintln!("  \x1b[1;33m║\x1b[0m  \x1b[1;93mled-marquee\x1b[0m v{VERSION:<20}\x1b[1;33m║\x1b[0m");
    eprintln!("  \x1b[1;33m╚══════════════════════════════════╝\x1b[0m");
    eprintln!();
}

fn print_connection_info(http_port: u16, bind: &str) {
    eprintln!("  \x1b[1;32m[http]\x1b[0m   Control panel on port \x1b[1;93m{http_port}\x1b[0m");
    eprintln!();
    eprintln!("  \x1b[1;37m>\x1b[0m Open: \x1b[4;93mhttp://{bind}:{http_port}\x1b[0m");
    eprintln!();
    eprintln!("  \x1b[2mPress Ctrl+C to stop\x1b[0m");
    eprintln!();
}

fn print_help() {
    println!("led-marquee - LED marquee host and control panel");
    println!();
    println!("USAGE:");
    println!("    marquee-host [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print help information");
    println!("    -v, --version    Print version");
    println!();
    println!("CONFIG:");
    println!("    ~/.config/led-marquee/config.toml");
    println!("    ~/.config/led-marquee/user.json");
    println!();
    println!("ENVIRONMENT:");
    println!("    RUST_LOG         Log filter (default: info)");
}

/// Graceful start: Check if port is available
fn check_port_available(bind: &str, port: u16) -> bool {
    TcpListener::bind(format!("{bind}:{port}")).is_ok()
}

/// Graceful start: Find available port starting from default
fn find_available_port(bind: &str, start: u16) -> Option<u16> {
    (start..start.saturating_add(10)).find(|&port| check_port_available(bind, port))
}

fn select_http_port(config: &Config) -> anyhow::Result<u16> {
    let bind = &config.server.bind;
    let port = config.server.http_port;
    if check_port_available(bind, port) {
        return Ok(port);
    }

    warn!("port {port} in use, finding alternative");
    match find_available_port(bind, port.saturating_add(1)) {
        Some(p) => {
            info!("using HTTP port {p}");
            Ok(p)
        }
        None => bail!("no available HTTP ports in range {}-{}", port, port.saturating_add(10)),
    }
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("graceful shutdown initiated");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if let Some(arg) = args.get(1) {
        match arg.as_str() {
            "--version" | "-v" => {
                println!("led-marquee {VERSION}");
                return Ok(());
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            other => warn!("ignoring unknown argument {other}"),
        }
    }

    print_banner();

    // === LOAD CONFIGURATION ===
    let config_path = Config::default_config_path();
    if let Err(e) = Config::create_default_if_missing(&config_path) {
        warn!("could not write default config: {e:#}");
    }
    let config = Config::load();
    info!(path = %config_path.display(), "config loaded");

    let user_config_path = Config::config_dir().join("user.json");
    let mut user_config = UserConfig::with_defaults();
    if let Err(e) = user_config.load(&user_config_path) {
        warn!("using default user config: {e:#}");
    }
    info!(params = %user_config.redacted(), "user config");

    let http_port = select_http_port(&config)?;

    // === DISPLAY ===
    let mut marquee = Marquee::new(&config);
    marquee.show_text(&interpolate(&config.scroll.startup_message), false);
    info!(
        width = config.display.width,
        height = config.display.height,
        sidebar = ?config.display.sidebar,
        "display ready"
    );
    let marquee = Arc::new(RwLock::new(marquee));

    let animation = tokio::spawn(marquee::run_animation(marquee.clone()));
    let sidebar = tokio::spawn(marquee::run_sidebar(marquee.clone()));

    // === MQTT ===
    let mqtt_task = match MqttSettings::from_user_config(&user_config) {
        Some(settings) => Some(tokio::spawn(mqtt::run(marquee.clone(), settings, config.mqtt.clone()))),
        None => {
            info!("no MQTT host configured");
            None
        }
    };

    // === HTTP SERVER (axum) ===
    let state = AppState::new(marquee, user_config, Some(user_config_path));
    let app = panel::router(state);

    let http_addr = format!("{}:{}", config.server.bind, http_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .with_context(|| format!("failed to bind {http_addr}"))?;

    print_connection_info(http_port, &config.server.bind);

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error");

    animation.abort();
    sidebar.abort();
    if let Some(task) = mqtt_task {
        task.abort();
    }
    info!("stopped");

    result
}
