//! Sprig demo server.
//!
//! Loads `application.properties` (or the file given with `--config`),
//! applies `SPRIG_*` environment overrides, bootstraps the components under
//! the configured scan package and serves them over HTTP.
//!
//! - `sprig-demo` / `sprig-demo serve` - run the server
//! - `sprig-demo routes` - print the route table and exit

use clap::{Parser, Subcommand};
use sprig_config::ConfigManager;
use sprig_core::logging::{LogConfig, LogFormat, LogLevel};
use sprig_core::{Application, ApplicationContext, ContextConfig, Error, Result};
use std::io::IsTerminal;
use std::net::SocketAddr;
use std::process::ExitCode;

/// Sprig demo - a tiny spring-style dispatcher
#[derive(Parser)]
#[command(name = "sprig-demo")]
#[command(version)]
#[command(about = "Serve the Sprig demo controllers")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Configuration file (.properties, .toml, .json or .env)
    #[arg(short, long, env = "SPRIG_CONFIG", default_value = "application.properties", global = true)]
    config: String,

    /// Port to listen on, overriding the configuration
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Address to bind, overriding the configuration
    #[arg(long, global = true)]
    host: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Print the route table
    Routes,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("sprig-demo: {}", err.diagnostic());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let manager = ConfigManager::new();
    // Files and the environment may point the scan elsewhere
    manager.set("scanPackage", sprig_demo::SCAN_PACKAGE)?;
    manager.load_file_auto(&cli.config)?;
    manager.load_env()?;

    let mut config = manager.context_config()?;
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(host) = cli.host {
        config.host = host;
    }

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&manager, config).await,
        Command::Routes => print_routes(config),
    }
}

async fn serve(manager: &ConfigManager, config: ContextConfig) -> Result<()> {
    let _guard = LogConfig::new()
        .level(manager.get_parsed("log_level").unwrap_or(LogLevel::Info))
        .format(manager.get_parsed("log_format").unwrap_or(LogFormat::Plain))
        .with_colors(std::io::stdout().is_terminal())
        .init()?;

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| Error::Config(format!("invalid listen address: {}", e)))?;

    let context = ApplicationContext::bootstrap(config)?;
    tracing::info!(routes = context.routes().len(), "Starting sprig-demo on http://{}", addr);

    Application::new(context).listen(addr).await
}

fn print_routes(config: ContextConfig) -> Result<()> {
    let context = ApplicationContext::bootstrap(config)?;

    let mut routes: Vec<_> = context
        .routes()
        .routes()
        .into_iter()
        .map(|route| (route.key().to_string(), route.controller().to_string(), route.method()))
        .collect();
    routes.sort();

    println!("{} route(s), {:?} mode", routes.len(), context.routes().mode());
    for (key, controller, method) in routes {
        println!("  {:<24} {}.{}", key, controller, method);
    }
    Ok(())
}
