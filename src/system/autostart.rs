//! Desktop-session autostart entry
//!
//! Autostart is a `.desktop` file in the XDG autostart directory; its
//! presence is the whole state.

use log::info;

use crate::core::context::AppContext;
use crate::utils::types::errors::Result;

pub const MINIMIZED_FLAG: &str = "--minimized";
const ICON: &str = "system-file-manager";

pub fn render_desktop_entry(exec: &str, minimized: bool) -> String {
    let exec_line = if minimized {
        format!("{exec} {MINIMIZED_FLAG}")
    } else {
        exec.to_string()
    };
    format!(
        "[Desktop Entry]
Type=Application
Name=CloudMount
Comment=Mount your cloud storage as local folders
Exec={exec_line}
Icon={ICON}
Terminal=false
Categories=Utility;
X-GNOME-Autostart-enabled=true
"
    )
}

/// Write or remove the autostart entry for the running executable.
pub fn set_autostart(ctx: &AppContext, enabled: bool, minimized: bool) -> Result<()> {
    let path = ctx.paths.autostart_file();

    if !enabled {
        match std::fs::remove_file(&path) {
            Ok(()) => info!("🛑 Autostart disabled"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        return Ok(());
    }

    let exe = std::env::current_exe()?;
    std::fs::create_dir_all(&ctx.paths.autostart_dir)?;
    std::fs::write(&path, render_desktop_entry(&exe.display().to_string(), minimized))?;
    info!("✅ Autostart enabled ({})", path.display());
    Ok(())
}

pub fn is_autostart_enabled(ctx: &AppContext) -> bool {
    ctx.paths.autostart_file().exists()
}
