// ABOUTME: Gateway server binary serving authenticated streaming feeds over HTTP
// ABOUTME: Loads configuration from the environment, wires resources, and runs the serve loop
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Eventgate Server Binary
//!
//! Starts the streaming gateway: CORS on every response, API-key
//! authorization when configured, and event feeds on the configured
//! channels.

use anyhow::Result;
use clap::Parser;
use eventgate::config::ServerConfig;
use eventgate::logging;
use eventgate::server::{GatewayServer, ServerResources};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "eventgate-server")]
#[command(about = "Eventgate - authenticated HTTP event-streaming gateway")]
pub struct Args {
    /// Override the bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Containers sometimes pass arguments clap cannot parse; fall back
    // to environment-only configuration rather than refusing to start.
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Argument parsing failed: {e}");
            eprintln!("Using environment configuration only");
            Args {
                host: None,
                http_port: None,
            }
        }
    };

    let mut config = ServerConfig::from_env()?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    logging::init_from_env()?;

    info!("Starting Eventgate streaming gateway");
    info!("{}", config.summary());

    let resources = Arc::new(ServerResources::from_config(config)?);
    info!(
        keys_loaded = resources.keys.len(),
        channels = ?resources.hub.channel_names(),
        "Resources initialized"
    );

    let server = GatewayServer::new(resources);
    if let Err(e) = server.run().await {
        error!("Server error: {e}");
        return Err(e);
    }

    Ok(())
}
