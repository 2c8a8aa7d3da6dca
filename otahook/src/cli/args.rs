// SPDX-FileCopyrightText: 2023-2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

use std::{
    io,
    sync::atomic::{AtomicBool, Ordering},
};

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::level_filters::LevelFilter;

use crate::cli::{completion, config, hook, tz};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Message and level only.
    #[default]
    Short,
    /// Also include timestamps.
    Medium,
    /// Also include timestamps, targets, and source locations.
    Long,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Script(hook::ScriptCli),
    Package(hook::PackageCli),
    Manifest(hook::ManifestCli),
    Tz(tz::TzCli),
    Config(config::ConfigCli),
    Completion(completion::CompletionCli),
}

#[derive(Debug, Parser)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Lowest log message severity to output.
    #[arg(long, global = true, value_name = "LEVEL", default_value_t = LevelFilter::INFO)]
    pub log_level: LevelFilter,

    /// Output format for log messages.
    #[arg(long, global = true, value_name = "FORMAT", default_value = "short")]
    pub log_format: LogFormat,
}

pub fn init_logging(log_level: LevelFilter, log_format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(log_level);

    match log_format {
        LogFormat::Short => builder.without_time().with_target(false).init(),
        LogFormat::Medium => builder.with_target(false).init(),
        LogFormat::Long => builder.with_file(true).with_line_number(true).init(),
    }
}

pub fn main(logging_initialized: &AtomicBool, cancel_signal: &AtomicBool) -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log_level, cli.log_format);
    logging_initialized.store(true, Ordering::SeqCst);

    match cli.command {
        Command::Script(c) => hook::script_subcommand(&c),
        Command::Package(c) => hook::package_subcommand(&c, cancel_signal),
        Command::Manifest(c) => hook::manifest_subcommand(&c),
        Command::Tz(c) => tz::tz_main(&c),
        Command::Config(c) => config::config_main(&c),
        Command::Completion(c) => completion::completion_main(&c),
    }
}
