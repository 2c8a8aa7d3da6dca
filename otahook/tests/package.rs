// SPDX-FileCopyrightText: 2026 Andrew Gunnerson
// SPDX-License-Identifier: GPL-3.0-only

use std::{
    fs::{self, File},
    path::Path,
    sync::atomic::AtomicBool,
};

use otahook::{
    cli::{
        config::DeviceGroup,
        hook::{self, PackageCli, ScriptCli},
    },
    config::DeviceConfig,
    format::zip::{EntryReader, EntryWriter},
};
use tempfile::TempDir;
use zip::{ZipArchive, ZipWriter};

const MANIFEST: &str = "\
require version-tz = *
require version-in = HWIN,1.0
require version-cn = CN,2.0
require version-eea = EEA,3.0
";

fn write_target_files(path: &Path, vbmeta: &[u8]) {
    let file = File::create(path).unwrap();
    let mut writer = ZipWriter::new(file);
    writer
        .write_entry("OTA/android-info.txt", MANIFEST.as_bytes())
        .unwrap();
    writer.write_entry("IMAGES/vbmeta.img", vbmeta).unwrap();
    writer.finish().unwrap();
}

#[test]
fn package_full_and_incremental() {
    let cancel_signal = AtomicBool::new(false);
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("target.zip");
    let source = temp_dir.path().join("source.zip");

    write_target_files(&target, b"target vbmeta");
    write_target_files(&source, b"source vbmeta");

    for (name, source, expected) in [
        ("full", None, b"target vbmeta"),
        ("incremental", Some(source.clone()), b"source vbmeta"),
    ] {
        let output = temp_dir.path().join(format!("{name}.zip"));
        let output_script = temp_dir.path().join(format!("{name}.txt"));

        let cli = PackageCli {
            input: target.clone(),
            source,
            output: output.clone(),
            output_script: Some(output_script.clone()),
            device: DeviceGroup { config: None },
        };
        hook::package_subcommand(&cli, &cancel_signal).unwrap();

        let mut archive = ZipArchive::new(File::open(&output).unwrap()).unwrap();
        assert_eq!(archive.read_entry("vbmeta.img").unwrap(), expected);

        let script = fs::read_to_string(&output_script).unwrap();
        let lines = script.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 5, "{name}: {script}");
        assert!(lines[0].contains(r#"getprop("ro.boot.hwc") == "HWIN""#));
        assert_eq!(lines[3], r#"ui_print("Patching firmware images...");"#);
        assert_eq!(
            lines[4],
            r#"package_extract_file("vbmeta.img", "/dev/block/bootdevice/by-name/vbmeta");"#,
        );
    }
}

#[test]
fn script_with_custom_profile() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("target.zip");
    let profile = temp_dir.path().join("device.toml");
    let output_script = temp_dir.path().join("script.txt");

    write_target_files(&target, b"vbmeta");

    let mut config = DeviceConfig::default();
    config.namespace = "cepheus".to_owned();
    config.vendor.variants = vec!["cn".to_owned()];
    fs::write(&profile, config.to_toml().unwrap()).unwrap();

    let cli = ScriptCli {
        input: target,
        source: None,
        output_script: Some(output_script.clone()),
        device: DeviceGroup {
            config: Some(profile),
        },
    };
    hook::script_subcommand(&cli).unwrap();

    let script = fs::read_to_string(&output_script).unwrap();
    assert_eq!(
        script,
        "assert(getprop(\"ro.boot.hwc\") == \"CN\" && (cepheus.verify_vendor(\"2.0\", \"2.0\") \
         == \"1\" || abort(\"ERROR: This package requires vendor from atleast 2.0. Please \
         upgrade firmware and retry!\");) || true);\n",
    );
}

#[test]
fn package_failure_leaves_no_output() {
    let cancel_signal = AtomicBool::new(false);
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("target.zip");
    let output = temp_dir.path().join("output.zip");

    let file = File::create(&target).unwrap();
    let mut writer = ZipWriter::new(file);
    writer
        .write_entry("OTA/android-info.txt", MANIFEST.as_bytes())
        .unwrap();
    writer.finish().unwrap();

    let cli = PackageCli {
        input: target,
        source: None,
        output: output.clone(),
        output_script: None,
        device: DeviceGroup { config: None },
    };

    assert!(hook::package_subcommand(&cli, &cancel_signal).is_err());
    assert!(!output.exists());
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
}

#[test]
fn script_failure_leaves_no_output() {
    let cancel_signal = AtomicBool::new(false);
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("target.zip");
    let output = temp_dir.path().join("output.zip");

    write_target_files(&target, b"vbmeta");

    let cli = PackageCli {
        input: target,
        source: None,
        output: output.clone(),
        output_script: Some(temp_dir.path().join("missing").join("script.txt")),
        device: DeviceGroup { config: None },
    };

    assert!(hook::package_subcommand(&cli, &cancel_signal).is_err());
    assert!(!output.exists());
    assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 1);
}
