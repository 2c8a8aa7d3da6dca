// SPDX-FileCopyrightText: 2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

pub mod edify;
pub mod manifest;
pub mod tzimage;
pub mod zip;
