//! CLI module for statusboard
//!
//! # Commands
//!
//! - `serve` - Run the proxy and dashboard server
//! - `status` - Print the current status of all monitored services
//! - `add` - Ask the backend to monitor a new URL
//! - `watch` - Live terminal dashboard
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Start the server against a local backend
//! statusboard serve --backend-url http://localhost:8080
//!
//! # One-shot status, filtered
//! statusboard status --search api
//!
//! # Generate shell completions
//! statusboard completions bash > ~/.bash_completion.d/statusboard
//! ```

pub mod add;
pub mod completions;
pub mod config;
pub mod output;
pub mod serve;
pub mod status;
pub mod watch;

pub use add::handle_add;
pub use completions::handle_completions;
pub use config::handle_config_init;
pub use status::handle_status;
pub use watch::run_watch;

use crate::config::REFRESH_INTERVAL_RANGE;
use crate::gateway::{GatewayConfig, GatewayError, ProxyGateway};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Default address of a running statusboard server.
pub const DEFAULT_SERVER: &str = "http://localhost:3000";

/// statusboard - uptime dashboard and monitoring proxy
#[derive(Parser, Debug)]
#[command(
    name = "statusboard",
    version,
    about = "Uptime status dashboard with a proxy to a monitoring backend"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the proxy and dashboard server
    Serve(ServeArgs),
    /// Show the status of all monitored services
    Status(StatusArgs),
    /// Add a URL to monitor
    Add(AddArgs),
    /// Live terminal dashboard
    Watch(WatchArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "statusboard.toml")]
    pub config: PathBuf,

    /// Override server port (also STATUSBOARD_PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override server host (also STATUSBOARD_HOST)
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Monitoring backend base URL (also BACKEND_API_URL)
    #[arg(long)]
    pub backend_url: Option<String>,

    /// Set log level: trace, debug, info, warn, error (also STATUSBOARD_LOG_LEVEL)
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Disable the server-side poller; the dashboard fetches per request
    #[arg(long)]
    pub no_dashboard: bool,
}

/// Where a client command finds the statusboard server.
#[derive(Args, Debug, Clone)]
pub struct ServerArgs {
    /// statusboard server URL
    #[arg(short, long, env = "STATUSBOARD_SERVER", default_value = DEFAULT_SERVER)]
    pub server: String,

    /// Request timeout in milliseconds
    #[arg(long, default_value = "5000")]
    pub timeout_ms: u64,
}

impl ServerArgs {
    /// Gateway pointed at the statusboard server, which serves the same
    /// list/add paths as the backend.
    pub fn gateway(&self) -> Result<ProxyGateway, GatewayError> {
        ProxyGateway::new(GatewayConfig::new(self.server.clone(), self.timeout_ms))
    }
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub server: ServerArgs,

    /// Only show services whose URL contains this text
    #[arg(short = 'q', long)]
    pub search: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// URL to start monitoring
    pub url: String,

    #[command(flatten)]
    pub server: ServerArgs,
}

#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub server: ServerArgs,

    /// Only show services whose URL contains this text
    #[arg(short = 'q', long)]
    pub search: Option<String>,

    /// Seconds between refreshes, 5 to 30
    #[arg(short, long, default_value = "5", value_parser = clap::value_parser!(u64).range(REFRESH_INTERVAL_RANGE))]
    pub interval: u64,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "statusboard.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
