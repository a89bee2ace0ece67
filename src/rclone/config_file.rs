//! Direct edits to `rclone.conf`
//!
//! rclone has no rename command, so renaming a remote rewrites its
//! `[name]` section header in place.

use std::io::Write;
use std::path::Path;

use log::debug;

use crate::utils::types::errors::{CloudMountError, Result};

fn section_name(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    trimmed.strip_prefix('[')?.strip_suffix(']')
}

/// Names of all sections (remotes) in an rclone config document.
pub fn config_sections(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(section_name)
        .map(str::to_string)
        .collect()
}

/// Replace the first `[old]` header line with `[new]`, keeping everything
/// else byte-for-byte. `None` when no such header exists.
pub fn rename_section(content: &str, old: &str, new: &str) -> Option<String> {
    let mut renamed = false;
    let mut out = String::with_capacity(content.len() + new.len());
    for line in content.split_inclusive('\n') {
        if !renamed && section_name(line) == Some(old) {
            let ending = &line[line.trim_end_matches(['\r', '\n']).len()..];
            out.push('[');
            out.push_str(new);
            out.push(']');
            out.push_str(ending);
            renamed = true;
        } else {
            out.push_str(line);
        }
    }
    renamed.then_some(out)
}

/// Rename a remote's section in the config file at `path`.
///
/// The new content goes to a temp file in the same directory that then
/// replaces the existing file, so a crash never leaves a truncated config.
pub fn rename_remote_in_config(path: &Path, old: &str, new: &str) -> Result<()> {
    let content = std::fs::read_to_string(path)?;

    if config_sections(&content).iter().any(|s| s == new) {
        return Err(CloudMountError::InvalidInput(format!(
            "a remote named '{new}' already exists"
        )));
    }

    let updated = rename_section(&content, old, new).ok_or_else(|| {
        CloudMountError::InvalidInput(format!(
            "remote '{old}' not found in {}",
            path.display()
        ))
    })?;

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(updated.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| CloudMountError::Io(e.error))?;

    debug!("Renamed [{old}] to [{new}] in {}", path.display());
    Ok(())
}
