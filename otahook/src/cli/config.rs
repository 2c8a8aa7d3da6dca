// SPDX-FileCopyrightText: 2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use crate::config::{self, DeviceConfig};

#[derive(Debug, Args)]
pub struct DeviceGroup {
    /// Path to device profile TOML.
    ///
    /// If omitted, the built-in profile for raphael is used.
    #[arg(short, long, value_name = "FILE", value_parser)]
    pub config: Option<PathBuf>,
}

impl DeviceGroup {
    pub fn load(&self) -> Result<DeviceConfig> {
        match &self.config {
            Some(path) => config::load_config(path)
                .with_context(|| format!("Failed to load device profile: {path:?}")),
            None => Ok(DeviceConfig::default()),
        }
    }
}

fn dump_subcommand() -> Result<()> {
    let data = DeviceConfig::default()
        .to_toml()
        .context("Failed to serialize default device profile")?;

    print!("{data}");

    Ok(())
}

fn check_subcommand(cli: &CheckCli) -> Result<()> {
    let config = config::load_config(&cli.config)
        .with_context(|| format!("Failed to load device profile: {:?}", cli.config))?;

    info!(
        "Device profile is valid: {} ({} images)",
        config.namespace,
        config.images.len(),
    );

    Ok(())
}

pub fn config_main(cli: &ConfigCli) -> Result<()> {
    match &cli.command {
        ConfigCommand::Dump => dump_subcommand(),
        ConfigCommand::Check(c) => check_subcommand(c),
    }
}

/// Validate a device profile.
#[derive(Debug, Parser)]
pub struct CheckCli {
    /// Path to device profile TOML.
    #[arg(short, long, value_name = "FILE", value_parser)]
    pub config: PathBuf,
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Print the built-in device profile.
    Dump,
    Check(CheckCli),
}

/// Inspect device profiles.
#[derive(Debug, Parser)]
pub struct ConfigCli {
    #[command(subcommand)]
    command: ConfigCommand,
}
