use clap::{Parser, Subcommand};
use tracing::info;
use warden_domain::{CliOverrides, Config, RecordType};

mod bootstrap;
mod commands;
mod di;

#[derive(Parser)]
#[command(name = "warden")]
#[command(version)]
#[command(about = "Warden - firewall interception supervisor and DNS-over-HTTPS client")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Directory holding platform driver images
    #[arg(long, value_name = "DIR", global = true)]
    driver_store: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a name over DNS-over-HTTPS and print the cache record
    Resolve {
        /// Domain to look up; a trailing dot is added if missing
        domain: String,

        /// Record type (name or numeric code)
        #[arg(short = 't', long = "type", default_value = "A")]
        record_type: RecordType,

        /// Resolver URL, may be repeated; replaces the configured list
        #[arg(short = 'r', long = "resolver", value_name = "URL")]
        resolvers: Vec<String>,
    },

    /// Run the interception supervisor until Ctrl-C or a worker failure
    Intercept {
        /// Use a capture engine that never touches the kernel
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let resolvers = match &cli.command {
        Command::Resolve { resolvers, .. } => resolvers.clone(),
        Command::Intercept { .. } => Vec::new(),
    };
    let cli_overrides = CliOverrides {
        log_level: cli.log_level.clone(),
        driver_store: cli.driver_store.clone(),
        resolvers,
    };

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config.logging);

    info!("Starting Warden v{}", env!("CARGO_PKG_VERSION"));
    info!(
        source = cli
            .config
            .clone()
            .or_else(Config::get_config_path)
            .as_deref()
            .unwrap_or("defaults"),
        "Configuration loaded"
    );

    match cli.command {
        Command::Resolve {
            domain,
            record_type,
            ..
        } => commands::resolve(&config, &domain, record_type).await,
        Command::Intercept { dry_run } => commands::intercept(&config, dry_run).await,
    }
}
