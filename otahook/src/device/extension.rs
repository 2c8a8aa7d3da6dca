// SPDX-FileCopyrightText: 2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

use tracing::{debug, info};

use crate::{
    config::DeviceConfig,
    device::{DeviceHooks, Error, Info, Result},
    format::{
        edify::{Script, quote},
        manifest::{FirmwareRequirement, KEY_TRUSTZONE, Manifest, VendorRequirement},
        zip::{EntryReader, entry_path},
    },
    stream,
};

/// Hooks for Qualcomm devices whose recovery provides `verify_trustzone()` and
/// `verify_vendor()` edify functions and that flash extra firmware images at
/// the end of the installation.
#[derive(Clone, Debug, Default)]
pub struct DeviceExtension {
    config: DeviceConfig,
}

impl DeviceExtension {
    pub fn new(config: DeviceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn read_manifest(&self, reader: &mut dyn EntryReader) -> Result<Manifest> {
        let data = reader.read_entry_string(&self.config.manifest_path)?;

        Ok(Manifest::new(data))
    }

    /// Build the statement that aborts unless one of `versions` matches the
    /// installed trustzone firmware.
    pub fn trustzone_assertion(&self, versions: &[String]) -> String {
        let args = versions
            .iter()
            .map(|v| quote(v))
            .collect::<Vec<_>>()
            .join(",");

        format!(
            "assert({}.verify_trustzone({args}) == \"1\" || abort({}););",
            self.config.namespace,
            quote(&self.config.trustzone.message),
        )
    }

    /// Build the statement that, on the matching hardware variant only, aborts
    /// unless the installed vendor image is new enough.
    pub fn vendor_assertion(&self, requirement: &VendorRequirement) -> String {
        let vendor = &self.config.vendor;
        let message = format!(
            "{}{}{}",
            vendor.message_prefix, requirement.min_version, vendor.message_suffix,
        );

        format!(
            "assert(getprop({}) == {} && ({}.verify_vendor({}, {}) == \"1\" || abort({});) || true);",
            quote(&vendor.property),
            quote(&requirement.hardware),
            self.config.namespace,
            quote(&requirement.min_version),
            quote(&requirement.argument),
            quote(&message),
        )
    }

    pub fn add_trustzone_assertion(&self, script: &mut Script, manifest: &Manifest) -> Result<()> {
        match manifest.firmware_requirement(KEY_TRUSTZONE)? {
            FirmwareRequirement::Unrestricted => {
                debug!("Trustzone firmware is unrestricted");
            }
            FirmwareRequirement::OneOf(versions) => {
                debug!("Trustzone firmware must be one of: {versions:?}");
                script.append_extra(self.trustzone_assertion(&versions));
            }
        }

        Ok(())
    }

    /// Add one vendor assertion per hardware variant. Every variant must have
    /// a requirement. Nothing is emitted if any of them is missing.
    pub fn add_vendor_assertions(&self, script: &mut Script, manifest: &Manifest) -> Result<()> {
        let requirements = self
            .config
            .vendor
            .variants
            .iter()
            .map(|v| manifest.vendor_requirement(v))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        for requirement in &requirements {
            debug!(
                "Vendor for {} must be at least {}",
                requirement.hardware, requirement.min_version,
            );
            script.append_extra(self.vendor_assertion(requirement));
        }

        Ok(())
    }

    /// Add all assertions for the build in `reader`.
    pub fn add_assertions(&self, reader: &mut dyn EntryReader, script: &mut Script) -> Result<()> {
        let manifest = self.read_manifest(reader)?;

        self.add_trustzone_assertion(script, &manifest)?;
        self.add_vendor_assertions(script, &manifest)?;

        Ok(())
    }

    /// Copy the configured firmware images into the output package and flash
    /// them at the end of the installation. Incremental updates take the
    /// images from the source build.
    pub fn install_images(&self, info: &mut Info, incremental: bool) -> Result<()> {
        info.script.print(&self.config.install_message);

        let reader: &mut dyn EntryReader = if incremental {
            info.source_zip
                .as_deref_mut()
                .ok_or(Error::MissingSourceArchive)?
        } else {
            &mut *info.input_zip
        };

        for image in &self.config.images {
            let path = entry_path(&self.config.images_dir, &image.name);
            let entry_reader = reader.open_entry(&path)?;

            info.output_zip.start_entry(&image.name)?;
            let size = stream::copy(entry_reader, &mut *info.output_zip, info.cancel_signal)?;

            info!("Added {} ({size} bytes) for {}", image.name, image.partition);

            info.script.package_extract_file(&image.name, &image.partition);
        }

        Ok(())
    }
}

impl DeviceHooks for DeviceExtension {
    fn full_ota_assertions(&self, info: &mut Info) -> Result<()> {
        self.add_assertions(&mut *info.input_zip, info.script)
    }

    fn incremental_ota_assertions(&self, info: &mut Info) -> Result<()> {
        let source_zip = info
            .source_zip
            .as_deref_mut()
            .ok_or(Error::MissingSourceArchive)?;

        self.add_assertions(source_zip, info.script)
    }

    fn full_ota_install_end(&self, info: &mut Info) -> Result<()> {
        self.install_images(info, false)
    }

    fn incremental_ota_install_end(&self, info: &mut Info) -> Result<()> {
        self.install_images(info, true)
    }
}
