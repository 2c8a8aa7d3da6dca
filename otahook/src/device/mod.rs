// SPDX-FileCopyrightText: 2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

//! Device-specific extension points of the OTA package build. The host build
//! system calls into a [`DeviceHooks`] implementation at fixed stages and
//! hands it an [`Info`] describing the package being built.

pub mod extension;

use std::{io, sync::atomic::AtomicBool};

use thiserror::Error;

use crate::format::{
    edify::Script,
    manifest,
    zip::{self as archive, EntryReader, EntryWriter},
};

pub use extension::DeviceExtension;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Incremental update requires a source archive")]
    MissingSourceArchive,
    #[error("Manifest error")]
    Manifest(#[from] manifest::Error),
    #[error("Archive error")]
    Archive(#[from] archive::Error),
    #[error("I/O error")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Everything a hook may touch while a package is being built.
pub struct Info<'a> {
    /// The build being packaged. For incremental updates, this is the target
    /// build.
    pub input_zip: &'a mut dyn EntryReader,
    /// The build being updated from. Only present for incremental updates, in
    /// which case the manifest and firmware images are read from it.
    pub source_zip: Option<&'a mut dyn EntryReader>,
    /// The OTA package being produced.
    pub output_zip: &'a mut dyn EntryWriter,
    /// Updater-script statements emitted so far.
    pub script: &'a mut Script,
    /// Checked between iterations when copying images.
    pub cancel_signal: &'a AtomicBool,
}

/// Callbacks invoked by the package builder. Every hook defaults to doing
/// nothing.
pub trait DeviceHooks {
    /// Called before a full package's installation steps are emitted.
    fn full_ota_assertions(&self, _info: &mut Info) -> Result<()> {
        Ok(())
    }

    /// Called before an incremental package's installation steps are emitted.
    fn incremental_ota_assertions(&self, _info: &mut Info) -> Result<()> {
        Ok(())
    }

    /// Called after a full package's installation steps are emitted.
    fn full_ota_install_end(&self, _info: &mut Info) -> Result<()> {
        Ok(())
    }

    /// Called after an incremental package's installation steps are emitted.
    fn incremental_ota_install_end(&self, _info: &mut Info) -> Result<()> {
        Ok(())
    }
}

/// Run the assertion hook, then the install-end hook, in the order the host
/// build system does. Incremental mode is selected by the presence of a source
/// archive.
pub fn run_hooks(hooks: &dyn DeviceHooks, info: &mut Info) -> Result<()> {
    if info.source_zip.is_some() {
        hooks.incremental_ota_assertions(info)?;
        hooks.incremental_ota_install_end(info)?;
    } else {
        hooks.full_ota_assertions(info)?;
        hooks.full_ota_install_end(info)?;
    }

    Ok(())
}
