// SPDX-FileCopyrightText: 2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

use std::{
    fs::{self, File},
    io::BufReader,
    path::PathBuf,
};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser};
use tracing::{info, warn};
use zip::ZipArchive;

use crate::{
    cli::config::DeviceGroup,
    device::DeviceExtension,
    format::{
        manifest::{FirmwareRequirement, KEY_TRUSTZONE},
        tzimage,
    },
};

#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct RequirementGroup {
    /// Accepted trustzone version.
    #[arg(short, long = "version", value_name = "VERSION")]
    pub versions: Vec<String>,

    /// Target-files zip to read the accepted versions from.
    #[arg(short, long, value_name = "FILE", value_parser)]
    pub target: Option<PathBuf>,
}

fn load_requirement(cli: &TzCli) -> Result<FirmwareRequirement> {
    let Some(path) = &cli.requirement.target else {
        return Ok(FirmwareRequirement::OneOf(cli.requirement.versions.clone()));
    };

    let extension = DeviceExtension::new(cli.device.load()?);
    let reader =
        File::open(path).with_context(|| format!("Failed to open for reading: {path:?}"))?;
    let mut zip_reader = ZipArchive::new(BufReader::new(reader))
        .with_context(|| format!("Failed to read zip: {path:?}"))?;
    let manifest = extension
        .read_manifest(&mut zip_reader)
        .with_context(|| format!("Failed to read manifest: {path:?}"))?;

    Ok(manifest.firmware_requirement(KEY_TRUSTZONE)?)
}

pub fn tz_main(cli: &TzCli) -> Result<()> {
    let data = fs::read(&cli.input)
        .with_context(|| format!("Failed to read trustzone image: {:?}", cli.input))?;
    let current = tzimage::find_version(&data)
        .with_context(|| format!("Failed to find trustzone version: {:?}", cli.input))?;
    let current_str = String::from_utf8_lossy(current);

    info!("Current trustzone version: {current_str}");

    match load_requirement(cli)? {
        FirmwareRequirement::Unrestricted => {
            info!("Any trustzone version is accepted");
        }
        FirmwareRequirement::OneOf(versions) => {
            match tzimage::satisfies(current, versions.iter().map(|v| v.as_str())) {
                Some(v) => info!("Satisfies required version: {v}"),
                None => {
                    warn!("Accepted versions: {}", versions.join(", "));
                    bail!("Trustzone version {current_str} does not satisfy any requirement");
                }
            }
        }
    }

    Ok(())
}

/// Check a trustzone image against firmware requirements.
///
/// This performs the same check as the recovery's verify_trustzone() function.
/// A requirement is satisfied if it is less than or equal to the image's
/// version, compared over the length of the requirement.
#[derive(Debug, Parser)]
pub struct TzCli {
    /// Path to trustzone partition image.
    #[arg(short, long, value_name = "FILE", value_parser)]
    pub input: PathBuf,

    #[command(flatten)]
    pub requirement: RequirementGroup,

    #[command(flatten)]
    pub device: DeviceGroup,
}
