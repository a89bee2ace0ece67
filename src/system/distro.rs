//! Linux distribution and architecture detection, and the MEGAcmd package
//! that matches them.

use std::path::Path;

use crate::utils::types::errors::{CloudMountError, Result};

const MEGA_REPO: &str = "https://mega.nz/linux/repo";

/// The `ID` and `VERSION_ID` fields of `/etc/os-release`. Empty when the
/// file is missing or the field absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OsRelease {
    pub id: String,
    pub version_id: String,
}

impl OsRelease {
    pub fn parse(content: &str) -> Self {
        let mut release = Self::default();
        for line in content.lines() {
            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            match key {
                "ID" => release.id = value.to_string(),
                "VERSION_ID" => release.version_id = value.to_string(),
                _ => {}
            }
        }
        release
    }

    pub fn read(path: &Path) -> Self {
        std::fs::read_to_string(path)
            .map(|content| Self::parse(&content))
            .unwrap_or_default()
    }

    pub fn is_known(&self) -> bool {
        !self.id.is_empty()
    }
}

/// Architecture in Go/Debian naming (`amd64`, `arm64`, ...).
pub fn get_arch() -> String {
    match std::env::consts::ARCH {
        "x86_64" => "amd64".into(),
        "aarch64" => "arm64".into(),
        "i686" => "386".into(),
        _ => "unknown".into(),
    }
}

/// How a downloaded package gets installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    Deb,
    Rpm,
    Pacman,
}

impl PackageKind {
    /// Package manager command (run through pkexec) for a local file.
    pub fn install_args(self, file: &Path) -> Vec<String> {
        let file = file.display().to_string();
        match self {
            PackageKind::Deb => vec!["apt-get".into(), "install".into(), "-y".into(), file],
            PackageKind::Rpm => vec!["dnf".into(), "install".into(), "-y".into(), file],
            PackageKind::Pacman => vec!["pacman".into(), "-U".into(), "--noconfirm".into(), file],
        }
    }
}

/// A MEGAcmd package in MEGA's Linux repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MegaPackage {
    pub url: String,
    pub filename: String,
    pub kind: PackageKind,
}

/// Pick the MEGAcmd package for distro `id`/`version` on `arch`.
///
/// Unknown distros and architectures are `Unsupported`; callers fall back
/// to the download page.
pub fn megacmd_package(id: &str, version: &str, arch: &str) -> Result<MegaPackage> {
    let rpm_family = matches!(id, "fedora" | "centos" | "opensuse");
    let mut repo_arch = match arch {
        "amd64" if rpm_family => "x86_64",
        "amd64" => "amd64",
        "arm64" if matches!(id, "fedora" | "centos") => "aarch64",
        "arm64" => "arm64",
        other => {
            return Err(CloudMountError::Unsupported(format!(
                "architecture {other}"
            )));
        }
    };

    let (distro, kind) = match id {
        "ubuntu" | "linuxmint" | "pop" | "elementary" => {
            (format!("xUbuntu_{version}"), PackageKind::Deb)
        }
        "debian" | "kali" | "parrot" => (format!("Debian_{version}"), PackageKind::Deb),
        "fedora" => (format!("Fedora_{version}"), PackageKind::Rpm),
        "arch" | "manjaro" => {
            repo_arch = "x86_64";
            ("Arch_Extra".to_string(), PackageKind::Pacman)
        }
        other => {
            let name = if other.is_empty() { "unknown" } else { other };
            return Err(CloudMountError::Unsupported(format!("distribution {name}")));
        }
    };

    let filename = match kind {
        PackageKind::Deb => format!("megacmd-{distro}_{repo_arch}.deb"),
        PackageKind::Rpm => format!("megacmd-{distro}.{repo_arch}.rpm"),
        PackageKind::Pacman => format!("megacmd-{repo_arch}.pkg.tar.zst"),
    };
    let url = format!("{MEGA_REPO}/{distro}/{repo_arch}/{filename}");

    Ok(MegaPackage {
        url,
        filename,
        kind,
    })
}
