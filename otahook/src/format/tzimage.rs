// SPDX-FileCopyrightText: 2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

//! Version lookup for Qualcomm trustzone images. This mirrors what the
//! device's recovery `verify_trustzone()` edify function does with the raw
//! `tz` partition so that firmware requirements can be checked ahead of time.

use std::cmp::Ordering;

use memchr::memmem;
use thiserror::Error;

pub const VERSION_MARKER: &[u8] = b"QC_IMAGE_VERSION_STRING=";

/// Maximum number of version bytes that recovery looks at.
pub const VERSION_MAX_LEN: usize = 18;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Version string marker not found in image")]
    VersionNotFound,
}

type Result<T> = std::result::Result<T, Error>;

/// Find the version string embedded in a trustzone image. The result is
/// truncated at the first NUL byte or at [`VERSION_MAX_LEN`] bytes, whichever
/// comes first.
pub fn find_version(data: &[u8]) -> Result<&[u8]> {
    let offset = memmem::find(data, VERSION_MARKER).ok_or(Error::VersionNotFound)?;
    let version = &data[offset + VERSION_MARKER.len()..];
    let version = &version[..version.len().min(VERSION_MAX_LEN)];
    let end = memchr::memchr(0, version).unwrap_or(version.len());

    Ok(&version[..end])
}

/// Compare `required` against the first `required.len()` bytes of `current`,
/// with `current` treated as NUL-padded.
fn compare_prefix(required: &[u8], current: &[u8]) -> Ordering {
    let padded = current
        .iter()
        .copied()
        .chain(std::iter::repeat(0))
        .take(required.len());

    required.iter().copied().cmp(padded)
}

/// Check whether `current` satisfies any of the required versions. A required
/// version is satisfied if it sorts before or equal to the current version's
/// prefix of the same length.
pub fn satisfies<'a>(
    current: &[u8],
    required: impl IntoIterator<Item = &'a str>,
) -> Option<&'a str> {
    required
        .into_iter()
        .find(|r| compare_prefix(r.as_bytes(), current) != Ordering::Greater)
}
