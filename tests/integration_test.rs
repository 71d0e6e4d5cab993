use assert_cmd::Command;
use assert_cmd::cargo;
use flate2::Compression;
use flate2::write::GzEncoder;
use mockito::{Server, ServerGuard};
use predicates::prelude::*;
use std::io::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

const REPOMD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<repomd xmlns="http://linux.duke.edu/metadata/repo" xmlns:rpm="http://linux.duke.edu/metadata/rpm">
  <revision>1736899200</revision>
  <data type="primary">
    <checksum type="sha256">0000</checksum>
    <location href="repodata/0000-primary.xml.gz"/>
  </data>
</repomd>
"#;

const PRIMARY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<metadata xmlns="http://linux.duke.edu/metadata/common" xmlns:rpm="http://linux.duke.edu/metadata/rpm" packages="3">
<package type="rpm">
  <name>dotnet-sdk-9.0</name>
  <arch>x86_64</arch>
  <version epoch="0" ver="9.0.101" rel="1"/>
  <location href="Packages/d/dotnet-sdk-9.0-9.0.101-x64.rpm"/>
  <format>
    <rpm:requires>
      <rpm:entry name="dotnet-runtime-9.0"/>
      <rpm:entry name="/bin/sh"/>
    </rpm:requires>
  </format>
</package>
<package type="rpm">
  <name>dotnet-runtime-9.0</name>
  <arch>x86_64</arch>
  <version epoch="0" ver="9.0.0" rel="1"/>
  <location href="Packages/d/dotnet-runtime-9.0-9.0.0-x64.rpm"/>
</package>
<package type="rpm">
  <name>dotnet-runtime-9.0</name>
  <arch>x86_64</arch>
  <version epoch="0" ver="9.0.1" rel="1"/>
  <location href="Packages/d/dotnet-runtime-9.0-9.0.1-x64.rpm"/>
</package>
</metadata>
"#;

const RPMS: &[&str] = &[
    "dotnet-sdk-9.0-9.0.101-x64.rpm",
    "dotnet-runtime-9.0-9.0.0-x64.rpm",
    "dotnet-runtime-9.0-9.0.1-x64.rpm",
];

fn gzip(content: &str) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content.as_bytes()).unwrap();
    encoder.finish().unwrap()
}

fn repository() -> ServerGuard {
    let mut server = Server::new();
    server
        .mock("GET", "/repodata/repomd.xml")
        .with_body(REPOMD)
        .create();
    server
        .mock("GET", "/repodata/0000-primary.xml.gz")
        .with_body(gzip(PRIMARY))
        .create();
    for rpm in RPMS {
        server
            .mock("GET", format!("/Packages/d/{}", rpm).as_str())
            .with_body(format!("rpm payload {}", rpm))
            .create();
    }
    server
}

/// A stand-in for rpmrebuild writing a recipe named after the artifact.
#[cfg(unix)]
fn fake_rpmrebuild(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("rpmrebuild");
    std::fs::write(
        &path,
        r#"#!/bin/sh
out="${1#--spec-only=}"
name="$(basename "$3" .rpm)"
echo "(GenRpmQf) extracting $name"
cat > "$out" <<EOF
Name: $name
Version: 1
%description
Repackaged
%files
/usr/share/dotnet
%changelog
* Wed Jan 15 2025 Builder <builder@example.com>
- $name
EOF
"#,
    )
    .unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[cfg(unix)]
#[test]
fn test_end_to_end_generate() {
    let server = repository();
    let tools = tempdir().unwrap();
    let out = tempdir().unwrap();
    let rpmrebuild = fake_rpmrebuild(tools.path());

    Command::new(cargo::cargo_bin!("obs-repack"))
        .arg("-r")
        .arg(server.url())
        .arg("-o")
        .arg(out.path())
        .arg("--rpmrebuild")
        .arg(&rpmrebuild)
        .assert()
        .success()
        .stdout(predicates::str::contains("dotnet-runtime-9.0 0:9.0.1-1").not())
        .stdout(predicates::str::contains("dotnet-runtime-9.0 9.0.1-1"))
        .stdout(predicates::str::contains("dotnet-sdk-9.0 9.0.101-1"));

    let mut dirs: Vec<String> = std::fs::read_dir(out.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    dirs.sort();
    assert_eq!(dirs, ["dotnet-runtime-9.0", "dotnet-sdk-9.0"]);

    let runtime_dir = out.path().join("dotnet-runtime-9.0");
    assert!(runtime_dir.join("dotnet-runtime-9.0-9.0.1-x64.rpm").exists());
    assert!(!runtime_dir.join("dotnet-runtime-9.0-9.0.0-x64.rpm").exists());

    let spec = std::fs::read_to_string(runtime_dir.join("dotnet-runtime-9.0.spec")).unwrap();
    assert!(spec.contains("Source: dotnet-runtime-9.0-9.0.1-x64.rpm"), "{}", spec);
    assert!(spec.contains("%install"));
    assert!(spec.ends_with("%changelog"));

    let changes = std::fs::read_to_string(runtime_dir.join("dotnet-runtime-9.0.changes")).unwrap();
    assert!(changes.starts_with("* Wed Jan 15 2025 Builder"));

    let service = std::fs::read_to_string(runtime_dir.join("_service")).unwrap();
    assert!(service.contains("format_spec_file"));
    assert!(service.contains(&format!(
        "{}/Packages/d/dotnet-runtime-9.0-9.0.1-x64.rpm",
        server.url()
    )));

    let lint = std::fs::read_to_string(runtime_dir.join("dotnet-runtime-9.0-rpmlintrc")).unwrap();
    assert!(lint.contains("setBadness("));
}

#[cfg(unix)]
#[test]
fn test_failing_extractor_fails_run() {
    let server = repository();
    let out = tempdir().unwrap();

    Command::new(cargo::cargo_bin!("obs-repack"))
        .arg("-r")
        .arg(server.url())
        .arg("-o")
        .arg(out.path())
        .arg("--rpmrebuild")
        .arg("/bin/false")
        .assert()
        .failure()
        .stderr(predicates::str::contains("Failed to generate recipe"));
}

#[test]
fn test_missing_root_package() {
    let server = repository();
    let out = tempdir().unwrap();

    Command::new(cargo::cargo_bin!("obs-repack"))
        .args(["-p", "dotnet-sdk-7.0", "-r"])
        .arg(server.url())
        .arg("-o")
        .arg(out.path())
        .assert()
        .failure()
        .stderr(predicates::str::contains("Could not find package dotnet-sdk-7.0"));
}

#[test]
fn test_help() {
    Command::new(cargo::cargo_bin!("obs-repack"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicates::str::contains("--repository"))
        .stdout(predicates::str::contains("--pin"))
        .stdout(predicates::str::contains("--download-files"));
}

#[test]
fn test_version_flag() {
    Command::new(cargo::cargo_bin!("obs-repack"))
        .arg("--version")
        .assert()
        .success()
        .stdout(predicates::str::starts_with("obs-repack "));
}
