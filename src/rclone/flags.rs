//! rclone mount flag construction
//!
//! Manual mounts and automount units share the option-derived flags; the
//! fixed flags differ (daemon + log file for manual, checksum/modtime
//! shortcuts for the unit).

use std::path::Path;

use crate::utils::types::settings::RemoteOptions;

pub const VFS_CACHE_MODE: &str = "full";
pub const MOUNT_LOG_LEVEL: &str = "INFO";

/// `name:` as rclone expects it on the command line.
pub fn remote_fs(remote: &str) -> String {
    format!("{remote}:")
}

/// Flags derived from the stored per-remote options.
pub fn option_flags(options: &RemoteOptions) -> Vec<String> {
    let mut flags = Vec::new();
    if options.read_only {
        flags.push("--read-only".to_string());
    }
    let cache_size = options.cache_size.trim();
    if !cache_size.is_empty() {
        flags.push("--vfs-cache-max-size".to_string());
        flags.push(cache_size.to_string());
    }
    let bw_limit = options.bw_limit.trim();
    if !bw_limit.is_empty() {
        flags.push("--bwlimit".to_string());
        flags.push(bw_limit.to_string());
    }
    flags
}

/// Full argument list for `rclone mount` run in daemon mode.
pub fn manual_mount_args(
    remote: &str,
    mount_point: &Path,
    log_file: &Path,
    options: &RemoteOptions,
) -> Vec<String> {
    let mut args = vec![
        "mount".to_string(),
        remote_fs(remote),
        mount_point.display().to_string(),
        "--daemon".to_string(),
        "--vfs-cache-mode".to_string(),
        VFS_CACHE_MODE.to_string(),
        "--volname".to_string(),
        remote.to_string(),
        "--log-level".to_string(),
        MOUNT_LOG_LEVEL.to_string(),
        "--log-file".to_string(),
        log_file.display().to_string(),
    ];
    args.extend(option_flags(options));
    args
}

/// Flags appended to the `ExecStart` line of an automount unit.
pub fn service_mount_flags(remote: &str, options: &RemoteOptions) -> Vec<String> {
    let mut flags = vec![
        "--vfs-cache-mode".to_string(),
        VFS_CACHE_MODE.to_string(),
        "--no-checksum".to_string(),
        "--no-modtime".to_string(),
        "--volname".to_string(),
        remote.to_string(),
    ];
    flags.extend(option_flags(options));
    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_options_no_flags() {
        assert!(option_flags(&RemoteOptions::default()).is_empty());
    }

    #[test]
    fn test_all_options() {
        let opts = RemoteOptions {
            read_only: true,
            cache_size: " 10G ".to_string(),
            bw_limit: "2M".to_string(),
        };
        assert_eq!(
            option_flags(&opts),
            vec!["--read-only", "--vfs-cache-max-size", "10G", "--bwlimit", "2M"]
        );
    }

    #[test]
    fn test_manual_mount_args() {
        let opts = RemoteOptions {
            bw_limit: "1M".to_string(),
            ..Default::default()
        };
        let args = manual_mount_args(
            "gdrive",
            Path::new("/home/ana/Clouds/gdrive"),
            Path::new("/home/ana/.config/rclone/cloudmount.log"),
            &opts,
        );
        assert_eq!(
            args.join(" "),
            "mount gdrive: /home/ana/Clouds/gdrive --daemon --vfs-cache-mode full \
             --volname gdrive --log-level INFO \
             --log-file /home/ana/.config/rclone/cloudmount.log --bwlimit 1M"
        );
    }

    #[test]
    fn test_service_flags() {
        let opts = RemoteOptions {
            read_only: true,
            ..Default::default()
        };
        assert_eq!(
            service_mount_flags("box", &opts).join(" "),
            "--vfs-cache-mode full --no-checksum --no-modtime --volname box --read-only"
        );
    }
}
