// ABOUTME: API key management utility for minting and inspecting gateway keys
// ABOUTME: Maintains the JSON key file the server loads at startup; tokens print once at mint time
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Eventgate Key Management
//!
//! Usage:
//! ```bash
//! # Mint a key and append it to the key file
//! cargo run --bin eventgate-keygen -- generate --label deploy-bot --file keys.json
//!
//! # Mint a key with explicit permissions
//! cargo run --bin eventgate-keygen -- generate --label ci --permissions publish,subscribe --file keys.json
//!
//! # List keys without revealing tokens
//! cargo run --bin eventgate-keygen -- list --file keys.json
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eventgate::keys::{fingerprint, ApiKey};

#[derive(Parser)]
#[command(
    name = "eventgate-keygen",
    about = "Eventgate API key management",
    long_about = "Mint and inspect the API keys the gateway accepts. Keys live in a JSON file; tokens are shown only when minted."
)]
struct KeygenArgs {
    #[command(subcommand)]
    command: KeygenCommand,
}

#[derive(Subcommand)]
enum KeygenCommand {
    /// Mint a new API key and append it to the key file
    Generate {
        /// Human-readable label for the key
        #[arg(long)]
        label: String,

        /// Permissions granted to the key (comma-separated)
        #[arg(long)]
        permissions: Option<String>,

        /// Key file to append to (created when missing)
        #[arg(long, default_value = "keys.json")]
        file: PathBuf,
    },

    /// List keys in the key file without revealing tokens
    List {
        /// Key file to read
        #[arg(long, default_value = "keys.json")]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = KeygenArgs::parse();
    match args.command {
        KeygenCommand::Generate {
            label,
            permissions,
            file,
        } => generate(&label, permissions.as_deref(), &file),
        KeygenCommand::List { file } => list(&file),
    }
}

fn read_keys(path: &Path) -> Result<Vec<ApiKey>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read key file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Key file {} is not a JSON key array", path.display()))
}

fn generate(label: &str, permissions: Option<&str>, file: &Path) -> Result<()> {
    let permissions: Vec<String> = permissions
        .map(|p| {
            p.split(',')
                .map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let mut keys = read_keys(file)?;
    let key = ApiKey::new(label, permissions);
    let token = key.token.clone();
    keys.push(key);

    let serialized = serde_json::to_string_pretty(&keys).context("Failed to serialize key file")?;
    fs::write(file, serialized)
        .with_context(|| format!("Failed to write key file {}", file.display()))?;

    println!("Minted key '{label}' in {}", file.display());
    println!("Token (shown once, store it now):");
    println!("{token}");
    Ok(())
}

fn list(file: &Path) -> Result<()> {
    let keys = read_keys(file)?;
    if keys.is_empty() {
        println!("No keys in {}", file.display());
        return Ok(());
    }

    println!("Keys in {}:", file.display());
    for key in &keys {
        let permissions = if key.permissions.is_empty() {
            "-".to_owned()
        } else {
            key.permissions.join(",")
        };
        println!(
            "  {}  fingerprint={}  label={}  permissions={}  created={}",
            key.id,
            fingerprint(&key.token),
            key.label,
            permissions,
            key.created_at.to_rfc3339()
        );
    }
    Ok(())
}
