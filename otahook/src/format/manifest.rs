// SPDX-FileCopyrightText: 2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

//! Parser for the `android-info.txt` manifest shipped in the `OTA/` directory
//! of target-files zips. Only the `require version-<key> = <values>` lines
//! are of interest. Everything else (`require board=...`, etc.) is ignored.

use regex::Regex;
use thiserror::Error;

pub const KEY_TRUSTZONE: &str = "tz";

/// Separator for alternative firmware versions.
pub const FIRMWARE_SEP: char = '|';
/// Separator for the fields of a vendor requirement.
pub const VENDOR_SEP: char = ',';

/// Firmware version token that accepts anything.
pub const WILDCARD: &str = "*";

#[derive(Debug, Error)]
pub enum Error {
    #[error("Manifest has no requirement for version-{0}")]
    MissingRequirement(String),
    #[error("Requirement version-{key} has {count} values, but at least {min} are needed")]
    TooFewValues {
        key: String,
        count: usize,
        min: usize,
    },
    #[error("Invalid requirement key: {0:?}")]
    InvalidKey(String),
}

type Result<T> = std::result::Result<T, Error>;

/// Which firmware versions an update may be installed on top of.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FirmwareRequirement {
    /// The manifest does not restrict the firmware version.
    Unrestricted,
    /// At least one of the versions must be satisfied.
    OneOf(Vec<String>),
}

/// Minimum vendor version for one hardware variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VendorRequirement {
    /// Value of the hardware variant property (eg. `ro.boot.hwc`).
    pub hardware: String,
    /// Secondary argument passed to the vendor verification function.
    pub argument: String,
    /// Minimum vendor version, shown to the user on failure.
    pub min_version: String,
}

#[derive(Clone, Debug)]
pub struct Manifest {
    data: String,
}

impl Manifest {
    pub fn new(data: impl Into<String>) -> Self {
        Self { data: data.into() }
    }

    /// Find the raw value list of the first `require version-<key>` line.
    pub fn requirement(&self, key: &str) -> Result<Option<&str>> {
        if key.is_empty() || key.chars().any(char::is_whitespace) {
            return Err(Error::InvalidKey(key.to_owned()));
        }

        let pattern = format!(r"require\s+version-{}\s*=\s*(\S+)", regex::escape(key));
        let regex = Regex::new(&pattern).map_err(|_| Error::InvalidKey(key.to_owned()))?;

        Ok(regex
            .captures(&self.data)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str()))
    }

    /// Get the accepted firmware versions for `key`. A missing requirement, or
    /// one that contains [`WILDCARD`], accepts any firmware.
    pub fn firmware_requirement(&self, key: &str) -> Result<FirmwareRequirement> {
        let Some(value) = self.requirement(key)? else {
            return Ok(FirmwareRequirement::Unrestricted);
        };

        let versions = value
            .split(FIRMWARE_SEP)
            .map(|v| v.to_owned())
            .collect::<Vec<_>>();

        if versions.is_empty() || versions.iter().any(|v| v == WILDCARD) {
            Ok(FirmwareRequirement::Unrestricted)
        } else {
            Ok(FirmwareRequirement::OneOf(versions))
        }
    }

    /// Get the vendor requirement for a hardware variant. Unlike firmware
    /// requirements, these are mandatory.
    ///
    /// The value has the form `<hardware>,<argument>[,<min_version>]`. When
    /// the third field is omitted, the argument doubles as the minimum
    /// version.
    pub fn vendor_requirement(&self, variant: &str) -> Result<VendorRequirement> {
        let value = self
            .requirement(variant)?
            .ok_or_else(|| Error::MissingRequirement(variant.to_owned()))?;
        let fields = value.split(VENDOR_SEP).collect::<Vec<_>>();

        match fields.as_slice() {
            [hardware, argument] => Ok(VendorRequirement {
                hardware: (*hardware).to_owned(),
                argument: (*argument).to_owned(),
                min_version: (*argument).to_owned(),
            }),
            [hardware, argument, min_version, ..] => Ok(VendorRequirement {
                hardware: (*hardware).to_owned(),
                argument: (*argument).to_owned(),
                min_version: (*min_version).to_owned(),
            }),
            _ => Err(Error::TooFewValues {
                key: variant.to_owned(),
                count: fields.len(),
                min: 2,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    const SAMPLE: &str = "\
require board=raphael|raphaelin
require version-tz = TZ.XF.5.0.1-00228|TZ.XF.5.0.1-00230
require version-in = HWIN,V11.0.3.0.QFKINXM,2020-05-01
require version-cn = CN,V11.0.5.0.QFKCNXM
require   version-eea=EEA,V11.0.2.0.QFKEUXM,2020-04-01
";

    #[test]
    fn find_requirement() {
        let manifest = Manifest::new(SAMPLE);

        assert_eq!(
            manifest.requirement("tz").unwrap(),
            Some("TZ.XF.5.0.1-00228|TZ.XF.5.0.1-00230"),
        );
        assert_eq!(
            manifest.requirement("eea").unwrap(),
            Some("EEA,V11.0.2.0.QFKEUXM,2020-04-01"),
        );
        assert_eq!(manifest.requirement("global").unwrap(), None);
        assert_matches!(manifest.requirement(""), Err(Error::InvalidKey(_)));
        assert_matches!(manifest.requirement("a b"), Err(Error::InvalidKey(_)));
    }

    #[test]
    fn first_match_wins() {
        let manifest = Manifest::new("require version-tz = 1\nrequire version-tz = 2\n");

        assert_eq!(manifest.requirement("tz").unwrap(), Some("1"));
    }

    #[test]
    fn key_is_literal() {
        let manifest = Manifest::new("require version-tzz = 1\nrequire version-t. = 2\n");

        assert_eq!(manifest.requirement("tz").unwrap(), None);
        assert_eq!(manifest.requirement("t.").unwrap(), Some("2"));
    }

    #[test]
    fn firmware_versions() {
        let manifest = Manifest::new("require version-tz = 1|2\n");

        assert_eq!(
            manifest.firmware_requirement(KEY_TRUSTZONE).unwrap(),
            FirmwareRequirement::OneOf(vec!["1".to_owned(), "2".to_owned()]),
        );
    }

    #[test]
    fn firmware_wildcard() {
        for data in ["require version-tz = *", "require version-tz = 1|*|2"] {
            let manifest = Manifest::new(data);

            assert_eq!(
                manifest.firmware_requirement(KEY_TRUSTZONE).unwrap(),
                FirmwareRequirement::Unrestricted,
            );
        }
    }

    #[test]
    fn firmware_absent() {
        let manifest = Manifest::new("require board=raphael\n");

        assert_eq!(
            manifest.firmware_requirement(KEY_TRUSTZONE).unwrap(),
            FirmwareRequirement::Unrestricted,
        );
    }

    #[test]
    fn vendor_fields() {
        let manifest = Manifest::new(SAMPLE);

        assert_eq!(
            manifest.vendor_requirement("in").unwrap(),
            VendorRequirement {
                hardware: "HWIN".to_owned(),
                argument: "V11.0.3.0.QFKINXM".to_owned(),
                min_version: "2020-05-01".to_owned(),
            },
        );
        assert_eq!(
            manifest.vendor_requirement("cn").unwrap(),
            VendorRequirement {
                hardware: "CN".to_owned(),
                argument: "V11.0.5.0.QFKCNXM".to_owned(),
                min_version: "V11.0.5.0.QFKCNXM".to_owned(),
            },
        );
    }

    #[test]
    fn vendor_missing_or_short() {
        let manifest = Manifest::new("require version-in = HWIN\n");

        assert_matches!(
            manifest.vendor_requirement("in"),
            Err(Error::TooFewValues { count: 1, min: 2, .. })
        );
        assert_matches!(
            manifest.vendor_requirement("cn"),
            Err(Error::MissingRequirement(k)) if k == "cn"
        );
    }
}
