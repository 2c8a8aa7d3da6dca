// SPDX-FileCopyrightText: 2023-2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

use std::{
    io::{self, Read, Write},
    sync::atomic::{AtomicBool, Ordering},
};

/// Return an [`io::ErrorKind::Interrupted`] error if `cancel_signal` is true.
/// This should be called frequently in I/O loops for cancellation to be
/// responsive.
#[inline]
pub fn check_cancel(cancel_signal: &AtomicBool) -> io::Result<()> {
    if cancel_signal.load(Ordering::SeqCst) {
        return Err(io::Error::new(
            io::ErrorKind::Interrupted,
            "Received cancel signal",
        ));
    }

    Ok(())
}

/// Copy data from `reader` to `writer` until `reader` reaches EOF. Returns the
/// number of bytes copied. The operation is cancelled on the next loop
/// iteration if `cancel_signal` is set to `true`.
pub fn copy(
    mut reader: impl Read,
    mut writer: impl Write,
    cancel_signal: &AtomicBool,
) -> io::Result<u64> {
    let mut buf = [0u8; 16384];
    let mut copied = 0;

    loop {
        check_cancel(cancel_signal)?;

        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }

        writer.write_all(&buf[..n])?;

        copied += n as u64;
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn copy_all() {
        let cancel_signal = AtomicBool::new(false);
        let data = b"vbmeta".repeat(10000);
        let mut writer = Vec::new();

        let n = copy(Cursor::new(&data), &mut writer, &cancel_signal).unwrap();

        assert_eq!(n, data.len() as u64);
        assert_eq!(writer, data);
    }

    #[test]
    fn copy_cancelled() {
        let cancel_signal = AtomicBool::new(true);
        let mut writer = Vec::new();

        let err = copy(Cursor::new(b"foobar"), &mut writer, &cancel_signal).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::Interrupted);
        assert!(writer.is_empty());
    }
}
