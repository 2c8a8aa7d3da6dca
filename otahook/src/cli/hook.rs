// SPDX-FileCopyrightText: 2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

use std::{
    ffi::OsStr,
    fs::{self, File},
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    sync::atomic::AtomicBool,
};

use anyhow::{Context, Result};
use clap::Parser;
use tempfile::NamedTempFile;
use tracing::info;
use zip::{ZipArchive, ZipWriter};

use crate::{
    cli::config::DeviceGroup,
    device::{self, DeviceExtension, Info},
    format::{
        edify::Script,
        manifest::{FirmwareRequirement, KEY_TRUSTZONE},
        zip::EntryReader,
    },
    util,
};

fn open_archive(path: &Path) -> Result<ZipArchive<BufReader<File>>> {
    let reader =
        File::open(path).with_context(|| format!("Failed to open for reading: {path:?}"))?;

    ZipArchive::new(BufReader::new(reader)).with_context(|| format!("Failed to read zip: {path:?}"))
}

fn write_script(script: &Script, path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => fs::write(p, script.to_string())
            .with_context(|| format!("Failed to write script: {p:?}")),
        None => {
            print!("{script}");
            Ok(())
        }
    }
}

pub fn script_subcommand(cli: &ScriptCli) -> Result<()> {
    let extension = DeviceExtension::new(cli.device.load()?);
    // Incremental updates take their requirements from the source build.
    let path = cli.source.as_ref().unwrap_or(&cli.input);
    let mut zip_reader = open_archive(path)?;
    let mut script = Script::new();

    extension
        .add_assertions(&mut zip_reader, &mut script)
        .with_context(|| format!("Failed to generate assertions: {path:?}"))?;

    write_script(&script, cli.output_script.as_deref())
}

pub fn package_subcommand(cli: &PackageCli, cancel_signal: &AtomicBool) -> Result<()> {
    let extension = DeviceExtension::new(cli.device.load()?);
    let mut input_zip = open_archive(&cli.input)?;
    let mut source_zip = cli.source.as_deref().map(open_archive).transpose()?;

    let temp_writer = NamedTempFile::with_prefix_in(
        cli.output
            .file_name()
            .unwrap_or_else(|| OsStr::new("otahook.tmp")),
        util::parent_path(&cli.output),
    )
    .context("Failed to open temporary output file")?;
    let temp_path = temp_writer.path().to_owned();
    let mut zip_writer = ZipWriter::new(BufWriter::new(temp_writer));
    let mut script = Script::new();

    let mut info = Info {
        input_zip: &mut input_zip,
        source_zip: source_zip
            .as_mut()
            .map(|z| z as &mut dyn EntryReader),
        output_zip: &mut zip_writer,
        script: &mut script,
        cancel_signal,
    };

    if info.source_zip.is_some() {
        info!("Running incremental OTA hooks");
    } else {
        info!("Running full OTA hooks");
    }

    device::run_hooks(&extension, &mut info).context("Failed to run device hooks")?;

    let buffered_writer = zip_writer
        .finish()
        .context("Failed to finalize output zip")?;
    let mut temp_writer = buffered_writer
        .into_inner()
        .context("Failed to flush output zip")?;
    temp_writer.flush().context("Failed to flush output zip")?;

    // NamedTempFile forces 600 permissions on temp files because it's the safe
    // option for a shared /tmp. Since we're writing to the output file's
    // directory, just mimic umask.
    #[cfg(unix)]
    {
        use std::{fs::Permissions, os::unix::prelude::PermissionsExt};

        use rustix::{fs::Mode, process::umask};

        let mask = umask(Mode::empty());
        umask(mask);

        // Mac uses a 16-bit value.
        #[allow(clippy::useless_conversion)]
        let mode = u32::from(0o666 & !mask.bits());

        temp_writer
            .as_file()
            .set_permissions(Permissions::from_mode(mode))
            .with_context(|| format!("Failed to set permissions to {mode:o}: {temp_path:?}"))?;
    }

    // The package is only moved into place once its script fragment exists.
    write_script(&script, cli.output_script.as_deref())?;

    temp_writer.persist(&cli.output).with_context(|| {
        format!(
            "Failed to move temporary file to output path: {temp_path:?} -> {:?}",
            cli.output,
        )
    })?;

    info!("Wrote {} script statements", script.len());

    Ok(())
}

pub fn manifest_subcommand(cli: &ManifestCli) -> Result<()> {
    let extension = DeviceExtension::new(cli.device.load()?);
    let mut input_zip = open_archive(&cli.input)?;
    let manifest = extension
        .read_manifest(&mut input_zip)
        .with_context(|| format!("Failed to read manifest: {:?}", cli.input))?;

    match manifest.firmware_requirement(KEY_TRUSTZONE)? {
        FirmwareRequirement::Unrestricted => println!("version-{KEY_TRUSTZONE}: any"),
        FirmwareRequirement::OneOf(versions) => {
            println!("version-{KEY_TRUSTZONE}: {}", versions.join(" | "));
        }
    }

    for variant in &extension.config().vendor.variants {
        let requirement = manifest
            .vendor_requirement(variant)
            .with_context(|| format!("Failed to parse vendor requirement: {variant}"))?;

        println!("version-{variant}: {requirement:#?}");
    }

    Ok(())
}

/// Print the assertions for a target-files zip.
///
/// This only runs the assertion half of the hooks and does not produce a
/// package. If --source is specified, the assertions for an incremental update
/// are printed instead.
#[derive(Debug, Parser)]
pub struct ScriptCli {
    /// Path to target-files zip.
    #[arg(short, long, value_name = "FILE", value_parser)]
    pub input: PathBuf,

    /// Path to source target-files zip for incremental updates.
    #[arg(short, long, value_name = "FILE", value_parser)]
    pub source: Option<PathBuf>,

    /// Path to output script fragment.
    ///
    /// If omitted, the script is written to stdout.
    #[arg(long, value_name = "FILE", value_parser)]
    pub output_script: Option<PathBuf>,

    #[command(flatten)]
    pub device: DeviceGroup,
}

/// Run all device hooks against a target-files zip.
///
/// The output zip receives the firmware images and the script fragment is
/// printed for inclusion into the updater-script. If --source is specified,
/// the incremental hooks are run instead of the full hooks.
#[derive(Debug, Parser)]
pub struct PackageCli {
    /// Path to target-files zip.
    #[arg(short, long, value_name = "FILE", value_parser)]
    pub input: PathBuf,

    /// Path to source target-files zip for incremental updates.
    #[arg(short, long, value_name = "FILE", value_parser)]
    pub source: Option<PathBuf>,

    /// Path to output zip.
    #[arg(short, long, value_name = "FILE", value_parser)]
    pub output: PathBuf,

    /// Path to output script fragment.
    ///
    /// If omitted, the script is written to stdout.
    #[arg(long, value_name = "FILE", value_parser)]
    pub output_script: Option<PathBuf>,

    #[command(flatten)]
    pub device: DeviceGroup,
}

/// Show the version requirements of a target-files zip.
#[derive(Debug, Parser)]
pub struct ManifestCli {
    /// Path to target-files zip.
    #[arg(short, long, value_name = "FILE", value_parser)]
    pub input: PathBuf,

    #[command(flatten)]
    pub device: DeviceGroup,
}
