// SPDX-FileCopyrightText: 2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

//! Device profiles. The built-in default is the Xiaomi Redmi K20 Pro / Mi 9T
//! Pro (`raphael`). Other devices with the same style of firmware checks can
//! supply their own profile as a TOML file.

use std::{fs, io, path::Path};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Field must not be empty: {0}")]
    EmptyField(&'static str),
    #[error("Image name must be a plain file name: {0:?}")]
    InvalidImageName(String),
    #[error("Failed to parse TOML")]
    TomlDe(#[from] toml_edit::de::Error),
    #[error("Failed to serialize TOML")]
    TomlSer(#[from] toml_edit::ser::Error),
    #[error("I/O error")]
    Io(#[from] io::Error),
}

type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrustZone {
    /// Abort message when no listed firmware version matches.
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Vendor {
    /// System property holding the hardware variant.
    pub property: String,
    /// Manifest keys of the hardware variants, in emission order.
    pub variants: Vec<String>,
    /// Abort message text before the minimum vendor version.
    pub message_prefix: String,
    /// Abort message text after the minimum vendor version.
    pub message_suffix: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Image {
    /// File name under the images directory and in the output package.
    pub name: String,
    /// Block device the image is flashed to.
    pub partition: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceConfig {
    /// Prefix of the device-specific edify functions.
    pub namespace: String,
    /// Path of the manifest within the target-files zip.
    pub manifest_path: String,
    /// Directory of the partition images within the target-files zip.
    pub images_dir: String,
    /// Message shown before the images are flashed.
    pub install_message: String,
    pub trustzone: TrustZone,
    pub vendor: Vendor,
    #[serde(default)]
    pub images: Vec<Image>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            namespace: "raphael".to_owned(),
            manifest_path: "OTA/android-info.txt".to_owned(),
            images_dir: "IMAGES".to_owned(),
            install_message: "Patching firmware images...".to_owned(),
            trustzone: TrustZone {
                message: "ERROR: This package requires firmware from an Android 10 based MIUI \
                    build. Please upgrade firmware and retry!"
                    .to_owned(),
            },
            vendor: Vendor {
                property: "ro.boot.hwc".to_owned(),
                variants: vec!["in".to_owned(), "cn".to_owned(), "eea".to_owned()],
                message_prefix: "ERROR: This package requires vendor from atleast ".to_owned(),
                message_suffix: ". Please upgrade firmware and retry!".to_owned(),
            },
            images: vec![Image {
                name: "vbmeta.img".to_owned(),
                partition: "/dev/block/bootdevice/by-name/vbmeta".to_owned(),
            }],
        }
    }
}

impl DeviceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.namespace.is_empty() {
            return Err(Error::EmptyField("namespace"));
        } else if self.manifest_path.is_empty() {
            return Err(Error::EmptyField("manifest_path"));
        } else if self.vendor.property.is_empty() {
            return Err(Error::EmptyField("vendor.property"));
        } else if self.vendor.variants.is_empty() {
            return Err(Error::EmptyField("vendor.variants"));
        }

        for image in &self.images {
            if image.name.is_empty() || image.name.contains('/') {
                return Err(Error::InvalidImageName(image.name.clone()));
            } else if image.partition.is_empty() {
                return Err(Error::EmptyField("images.partition"));
            }
        }

        Ok(())
    }

    pub fn from_toml(data: &str) -> Result<Self> {
        let config: Self = toml_edit::de::from_str(data)?;
        config.validate()?;

        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml_edit::ser::to_string_pretty(self)?)
    }
}

pub fn load_config(path: &Path) -> Result<DeviceConfig> {
    let data = fs::read_to_string(path)?;

    DeviceConfig::from_toml(&data)
}
