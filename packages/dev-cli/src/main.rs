//! Developer CLI for the marketplace stores
//!
//! Runs moderation walkthroughs against the in-memory runtime and prints the
//! effective configuration.

mod walkthrough;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use marketplace_core::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "dev")]
#[command(about = "Requests and Offers developer CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum DomainArg {
    ServiceTypes,
    MediumsOfExchange,
}

#[derive(Subcommand)]
enum Commands {
    /// Suggest, approve, reject and edit entities on an in-memory runtime
    Walkthrough {
        #[arg(long, value_enum, default_value = "service-types")]
        domain: DomainArg,

        /// Hide new records from this many reads, like a slow network
        #[arg(long, default_value_t = 0)]
        lag: u32,

        /// Reject disallowed status transitions locally
        #[arg(long)]
        strict: bool,

        /// Runtime connection failures before it comes up
        #[arg(long, default_value_t = 1)]
        flaky_connects: u32,
    },

    /// Print the configuration loaded from the environment
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,marketplace_core=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = Config::from_env().context("Failed to load configuration")?;

    match cli.command {
        Commands::Walkthrough {
            domain,
            lag,
            strict,
            flaky_connects,
        } => {
            config.strict_transitions |= strict;
            walkthrough::run(domain, config, lag, flaky_connects).await
        }
        Commands::Config => {
            print_config(&config);
            Ok(())
        }
    }
}

fn print_config(config: &Config) {
    println!("{}", "Marketplace configuration".bright_cyan().bold());
    let rows = [
        ("cache ttl", format!("{:?}", config.cache_ttl)),
        ("confirm timeout", format!("{:?}", config.confirm_timeout)),
        ("confirm interval", format!("{:?}", config.confirm_interval)),
        ("connect attempts", config.connect_attempts.to_string()),
        ("connect backoff", format!("{:?}", config.connect_backoff)),
        ("connect max backoff", format!("{:?}", config.connect_max_backoff)),
        ("event capacity", config.event_capacity.to_string()),
        ("strict transitions", config.strict_transitions.to_string()),
    ];
    for (name, value) in rows {
        println!("  {:<20} {}", name.dimmed(), value);
    }
}
