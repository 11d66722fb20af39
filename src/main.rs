//! Statusboard entry point.

use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use statusboard::api::{create_router, AppState};
use statusboard::config::Config;
use statusboard::dashboard::{ClientHealthState, DashboardView, HealthClient, HealthPoller};
use statusboard::database::{self, TlsPolicy};
use statusboard::health::{self, PgProbe};
use statusboard::metrics;
use statusboard::utils::shutdown_signal;

/// Health-check API and status dashboard.
#[derive(Parser, Debug)]
#[command(name = "statusboard")]
#[command(about = "Health-check API backed by PostgreSQL, with a polling status dashboard")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API (default).
    Serve {
        /// HTTP port, overrides PORT.
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Poll the API and render the status panel until Ctrl-C.
    Watch {
        /// API base URL, overrides API_URL.
        #[arg(long)]
        api_url: Option<String>,

        /// Poll interval in milliseconds, overrides POLL_INTERVAL_MS.
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Disable ANSI colors.
        #[arg(long)]
        no_color: bool,
    },

    /// Probe the database once and print the health report.
    Probe,

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Configuration decides the log format, so load it before logging
    let config = Config::load();
    init_logging(
        args.verbose,
        config.as_ref().map(Config::json_logs).unwrap_or(false),
    );

    let config = config.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    // Handle subcommands
    match args.command {
        Some(Command::Serve { port }) => cmd_serve(config, port).await,
        Some(Command::Watch {
            api_url,
            interval_ms,
            no_color,
        }) => cmd_watch(config, api_url, interval_ms, no_color).await,
        Some(Command::Probe) => cmd_probe(config).await,
        Some(Command::CheckConfig) => cmd_check_config(config),
        None => cmd_serve(config, None).await,
    }
}

/// Install the tracing subscriber. Logs go to stderr so `watch` keeps stdout.
fn init_logging(verbose: bool, json: bool) {
    let filter = if verbose {
        EnvFilter::new("statusboard=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

fn validate(config: &Config) -> anyhow::Result<()> {
    config.validate().map_err(|e| {
        error!("Invalid configuration: {}", e);
        anyhow::anyhow!("Configuration validation failed: {}", e)
    })
}

/// Run the HTTP API.
async fn cmd_serve(mut config: Config, port_override: Option<u16>) -> anyhow::Result<()> {
    if let Some(port) = port_override {
        config.port = port;
    }
    validate(&config)?;

    info!("Configuration loaded successfully");
    info!("Environment: {}", config.environment);

    if config.metrics_enabled {
        metrics::install_exporter(config.metrics_port)?;
    }

    let pool = database::create_pool(&config)?;
    let state = AppState::new(PgProbe::new(pool.clone()), config.welcome_message());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped, closing database pool");
    pool.close().await;

    Ok(())
}

/// Poll the API and redraw the status panel on every state change.
async fn cmd_watch(
    mut config: Config,
    api_url: Option<String>,
    interval_ms: Option<u64>,
    no_color: bool,
) -> anyhow::Result<()> {
    if let Some(api_url) = api_url {
        config.api_url = api_url;
    }
    if let Some(interval_ms) = interval_ms {
        config.poll_interval_ms = interval_ms;
    }
    validate(&config)?;

    let client = HealthClient::from_config(&config)?;
    let view = DashboardView {
        app_name: config.app_name.clone(),
        api_url: config.api_url.clone(),
        environment: config.environment.clone(),
        colored: !no_color,
    };

    let handle = HealthPoller::new(client, config.poll_interval()).spawn();
    let mut updates = handle.subscribe();

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    draw(&view, &handle.state());

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                draw(&view, &state);
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}

fn draw(view: &DashboardView, state: &ClientHealthState) {
    if view.colored {
        // Clear screen, cursor home
        print!("\x1b[2J\x1b[H");
    }
    println!("{}", view.render(state));
}

/// Probe the database once and print the report.
async fn cmd_probe(config: Config) -> anyhow::Result<()> {
    validate(&config)?;

    let pool = database::create_pool(&config)?;
    let probe = PgProbe::new(pool.clone());

    let report = tokio::time::timeout(
        config.acquire_timeout() + Duration::from_secs(5),
        health::check(&probe),
    )
    .await?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    pool.close().await;
    Ok(())
}

/// Check configuration validity.
fn cmd_check_config(config: Config) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("STATUSBOARD - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    print!("Resolving database options... ");
    let tls = match database::connect_options(&config) {
        Ok((_, policy)) => {
            println!("OK");
            policy
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Database configuration invalid"));
        }
    };

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Environment: {}", config.environment);
    println!("  Port: {}", config.port);
    println!(
        "  Database TLS: {}",
        match tls {
            TlsPolicy::FromUrl => "from sslmode in DATABASE_URL",
            TlsPolicy::Relaxed => "required, certificate not verified (managed host)",
            TlsPolicy::Disabled => "disabled",
        }
    );
    println!("  Pool Size: {}", config.database_max_connections);
    println!("  API URL: {}", config.api_url);
    println!("  Poll Interval: {}ms", config.poll_interval_ms);
    match config.poll_timeout() {
        Some(timeout) => println!("  Poll Timeout: {}ms", timeout.as_millis()),
        None => println!("  Poll Timeout: none"),
    }
    println!(
        "  Metrics: {}",
        if config.metrics_enabled {
            format!("Enabled (port {})", config.metrics_port)
        } else {
            "Disabled".to_string()
        }
    );
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}
