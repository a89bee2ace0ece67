use log::{info, warn};
use serde::Serialize;

use crate::core::context::AppContext;

fn on_path(binary: &str) -> bool {
    which::which(binary).is_ok()
}

pub fn check_rclone(ctx: &AppContext) -> bool {
    on_path(&ctx.tools.rclone)
}

/// MEGAcmd counts as installed when `mega-login` is found.
pub fn check_megacmd(ctx: &AppContext) -> bool {
    on_path(&ctx.tools.mega_login)
}

pub fn check_fusermount(ctx: &AppContext) -> bool {
    on_path(&ctx.tools.fusermount)
}

pub fn check_systemctl(ctx: &AppContext) -> bool {
    on_path(&ctx.tools.systemctl)
}

/// Availability of every external tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemReport {
    pub rclone: bool,
    pub megacmd: bool,
    pub fusermount: bool,
    pub systemctl: bool,
}

impl SystemReport {
    pub fn collect(ctx: &AppContext) -> Self {
        let report = Self {
            rclone: check_rclone(ctx),
            megacmd: check_megacmd(ctx),
            fusermount: check_fusermount(ctx),
            systemctl: check_systemctl(ctx),
        };
        let missing = report.missing();
        if missing.is_empty() {
            info!("✅ All external tools found");
        } else {
            warn!("⚠️ Missing tools: {}", missing.join(", "));
        }
        report
    }

    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("rclone", self.rclone),
            ("MEGAcmd", self.megacmd),
            ("fusermount", self.fusermount),
            ("systemctl", self.systemctl),
        ]
        .into_iter()
        .filter(|(_, found)| !found)
        .map(|(name, _)| name)
        .collect()
    }
}
