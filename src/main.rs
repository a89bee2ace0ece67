use clap::Parser;
use log::{error, info, warn};
use std::sync::Arc;

use cloudmount_lib::core::cli::{CliArgs, Command};
use cloudmount_lib::core::commands::run;
use cloudmount_lib::core::paths::AppPaths;
use cloudmount_lib::system::check_rclone;
use cloudmount_lib::utils::logging::init_logging;
use cloudmount_lib::AppContext;

fn needs_rclone(command: &Command) -> bool {
    !matches!(
        command,
        Command::Check
            | Command::Install { .. }
            | Command::Mega { .. }
            | Command::Autostart { .. }
            | Command::Logs { .. }
    )
}

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    let paths = match AppPaths::resolve(args.config_dir.clone(), args.mount_root.clone()) {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(args.debug, Some(&paths.logs_dir)) {
        eprintln!("Failed to initialize logger: {e}");
    }
    info!("🚀 CloudMount v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = paths.ensure_dirs() {
        warn!("⚠️ Could not create application directories: {e}");
    }

    let ctx = Arc::new(AppContext::system(paths));
    let command = args.command.unwrap_or(Command::Status);

    if needs_rclone(&command) && !check_rclone(&ctx) {
        eprintln!("rclone is not installed. CloudMount needs it to manage remotes.");
        eprintln!("Install it with `cloudmount install rclone`.");
        std::process::exit(1);
    }

    let is_mega = matches!(command, Command::Mega { .. });
    if let Err(e) = run(ctx, command).await {
        error!("❌ {e}");
        if e.is_missing_dependency() {
            let tool = if is_mega { "megacmd" } else { "rclone" };
            eprintln!("Install the missing tool with `cloudmount install {tool}`.");
        }
        std::process::exit(1);
    }
}
