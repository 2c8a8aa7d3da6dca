// SPDX-FileCopyrightText: 2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

use std::fmt;

/// Quote a value as an edify string literal.
pub fn quote(value: &str) -> String {
    let mut result = String::with_capacity(value.len() + 2);
    result.push('"');

    for c in value.chars() {
        if c == '"' || c == '\\' {
            result.push('\\');
        }
        result.push(c);
    }

    result.push('"');
    result
}

/// Buffer of updater-script statements. The host build system owns the rest
/// of the script, so this only ever gets appended to.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Script {
    lines: Vec<String>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a raw statement.
    pub fn append_extra(&mut self, statement: impl Into<String>) {
        self.lines.push(statement.into());
    }

    /// Append a statement that shows `message` in the recovery UI.
    pub fn print(&mut self, message: &str) {
        self.append_extra(format!("ui_print({});", quote(message)));
    }

    /// Append a statement that extracts a package entry to a block device.
    pub fn package_extract_file(&mut self, name: &str, dest: &str) {
        self.append_extra(format!(
            "package_extract_file({}, {});",
            quote(name),
            quote(dest),
        ));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }
}

impl fmt::Display for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }

        Ok(())
    }
}
