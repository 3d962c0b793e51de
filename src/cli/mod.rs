//! CLI module for upyun
//!
//! One subcommand per storage operation:
//!
//! ```bash
//! # Upload / download
//! upyun put ./sticker.jpg /images/sticker.jpg
//! upyun get /images/sticker.jpg ./download.jpg
//!
//! # Metadata
//! upyun stat /images/sticker.jpg --format json
//!
//! # Folders
//! upyun mkdir /images/2024/
//! upyun ls /images/
//! upyun rmdir /images/2024/
//!
//! # Bucket usage
//! upyun usage
//! ```
//!
//! Credentials come from a YAML profile (`--config`, `--profile`) or from
//! `UPYUN_OPERATOR`, `UPYUN_PASSWORD` and `UPYUN_BUCKET`.

pub mod args;
pub mod commands;

use anyhow::{Context, Result};
use tracing::debug;

use crate::config;
use crate::rest::{Endpoint, HttpTransport, UpyunClient};
use args::{Cli, Commands};

/// Initialize logging; `RUST_LOG` wins over `--log-level`
pub fn init_logging(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

/// Build the client from config plus command-line overrides
pub fn build_client(cli: &Cli) -> Result<UpyunClient> {
    let config = config::load_config(cli.config.as_deref(), cli.profile.as_deref())
        .context("Failed to load configuration")?;

    let profile = config
        .get_profile(cli.profile.as_deref())
        .ok_or_else(|| anyhow::anyhow!("No profile found in configuration"))?;
    debug!(?profile, "Using profile");

    let transport = if cli.insecure {
        HttpTransport::insecure()?
    } else {
        HttpTransport::new()?
    }
    .with_timeout(config.timeout());

    let mut client = UpyunClient::from_profile(profile, transport);
    if let Some(endpoint) = cli.endpoint.as_deref() {
        client.set_endpoint(Endpoint::from_route(Some(endpoint)));
    }

    Ok(client)
}

/// Run one parsed command
pub async fn run(cli: Cli) -> Result<()> {
    let client = build_client(&cli)?;
    debug!(endpoint = %client.endpoint(), bucket = client.bucket(), "Client ready");

    match cli.command {
        Commands::Put { local, remote } => {
            commands::cmd_put(&client, &local, &remote).await?;
        }
        Commands::Get { remote, local } => {
            commands::cmd_get(&client, &remote, local.as_deref()).await?;
        }
        Commands::Stat { remote } => {
            commands::cmd_stat(&client, &remote, cli.format).await?;
        }
        Commands::Rm { remote } => {
            commands::cmd_rm(&client, &remote).await?;
        }
        Commands::Mkdir { remote } => {
            commands::cmd_mkdir(&client, &remote).await?;
        }
        Commands::Rmdir { remote } => {
            commands::cmd_rmdir(&client, &remote).await?;
        }
        Commands::Ls { remote } => {
            commands::cmd_ls(&client, &remote, cli.format).await?;
        }
        Commands::Usage => {
            commands::cmd_usage(&client, cli.format).await?;
        }
    }

    Ok(())
}
