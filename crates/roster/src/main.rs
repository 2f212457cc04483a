use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use roster::{Roster, RosterConfig, init_logging};
use tracing::{Level, info};

#[derive(Parser)]
#[command(name = "roster", version, about = "Talent profile search and contact routing service")]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the API against the configured database.
    Serve {
        /// TOML file layered over the built-in defaults.
        #[arg(long, short)]
        config: Option<PathBuf>,
        /// Listen address, overriding `server.bind`.
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Serve a built-in sample roster with offline geocoding.
    Demo {
        #[arg(long, default_value = "127.0.0.1:3000")]
        bind: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(if cli.verbose { Level::DEBUG } else { Level::INFO })?;

    match cli.command {
        Command::Serve { config, bind } => {
            let config = RosterConfig::load(config.as_deref())?;
            let bind = match bind {
                Some(bind) => bind,
                None => config
                    .server
                    .bind
                    .parse()
                    .with_context(|| format!("invalid server.bind {:?}", config.server.bind))?,
            };
            let roster = Roster::from_config(&config).await?;
            roster::server::serve(Arc::new(roster), bind).await?;
        }
        Command::Demo { bind } => {
            info!("Serving the demo roster");
            roster::server::serve(Arc::new(roster::demo::demo_roster()), bind).await?;
        }
    }
    Ok(())
}
