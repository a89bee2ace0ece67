//! Subcommand handlers
//!
//! Long-running operations go through the dispatcher the same way the
//! desktop front-end runs them: spawn, then apply the single outcome event.

use log::debug;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use crate::core::cli::{AutomountAction, AutostartAction, Command, InstallTarget, MegaAction};
use crate::core::context::AppContext;
use crate::core::dashboard::{RemoteCard, apply_options, dashboard_cached};
use crate::core::dispatcher::channel;
use crate::mega;
use crate::rclone::commands::{
    create_from_form, delete_remote, disable_automount, enable_automount, is_automount_enabled,
    mount_remote, open_in_file_manager, rename_remote, unmount_remote,
};
use crate::rclone::queries::{list_remotes, refresh_quota};
use crate::system::{
    InstallOutcome, SystemReport, install_megacmd, install_rclone, is_autostart_enabled,
    set_autostart,
};
use crate::utils::logging::{LogTailer, tail_lines};
use crate::utils::types::errors::{CloudMountError, Result};
use crate::utils::types::events::{Outcome, UiEvent};
use crate::utils::types::quota::QuotaSummary;
use crate::utils::types::settings::RemoteOptions;

pub async fn run(ctx: Arc<AppContext>, command: Command) -> Result<()> {
    match command {
        Command::Status => status(&ctx).await,
        Command::List => {
            for remote in list_remotes(&ctx).await? {
                println!("{remote}");
            }
            Ok(())
        }
        Command::Add {
            provider,
            name,
            params,
            mount,
        } => {
            let fields: HashMap<String, String> = params.into_iter().collect();
            let (c, n) = (ctx.clone(), name.clone());
            run_operation("add", &name, async move {
                create_from_form(&c, &n, provider, &fields).await
            })
            .await?;
            if !mount {
                return Ok(());
            }
            let (c, n) = (ctx.clone(), name.clone());
            run_operation("mount", &name, async move { mount_remote(&c, &n).await }).await?;
            println!("{}", ctx.paths.mount_path(&name).display());
            Ok(())
        }
        Command::Mount { name } => {
            let (c, n) = (ctx.clone(), name.clone());
            run_operation("mount", &name, async move { mount_remote(&c, &n).await }).await?;
            println!("{}", ctx.paths.mount_path(&name).display());
            Ok(())
        }
        Command::Unmount { name } => {
            let (c, n) = (ctx.clone(), name.clone());
            run_operation("unmount", &name, async move { unmount_remote(&c, &n).await }).await
        }
        Command::Rename { old, new } => {
            let (c, o, n) = (ctx.clone(), old.clone(), new.clone());
            run_operation("rename", &old, async move { rename_remote(&c, &o, &n).await }).await
        }
        Command::Delete { name } => {
            let (c, n) = (ctx.clone(), name.clone());
            run_operation("delete", &name, async move { delete_remote(&c, &n).await }).await
        }
        Command::Automount { action } => automount(ctx, action).await,
        Command::Options {
            name,
            read_only,
            cache_size,
            bw_limit,
        } => {
            let current = ctx.settings.get(&name);
            if read_only.is_none() && cache_size.is_none() && bw_limit.is_none() {
                println!("{}", describe_options(&current));
                return Ok(());
            }
            let options = RemoteOptions {
                read_only: read_only.unwrap_or(current.read_only),
                cache_size: cache_size.map(|s| s.trim().to_string()).unwrap_or(current.cache_size),
                bw_limit: bw_limit.map(|s| s.trim().to_string()).unwrap_or(current.bw_limit),
            };
            let (c, n) = (ctx.clone(), name.clone());
            run_operation("options", &name, async move {
                apply_options(&c, &n, options).await
            })
            .await
        }
        Command::Quota { name: Some(name) } => {
            let summary = QuotaSummary::from_cached(Some(refresh_quota(&ctx, &name).await));
            println!("{name}: {summary}");
            Ok(())
        }
        Command::Quota { name: None } => {
            for card in load_cards(&ctx).await? {
                println!("{}: {}", card.name, card.quota);
            }
            Ok(())
        }
        Command::Logs { lines, follow } => logs(&ctx, lines, follow).await,
        Command::Check => {
            let report = SystemReport::collect(&ctx);
            for (name, found) in [
                ("rclone", report.rclone),
                ("MEGAcmd", report.megacmd),
                ("fusermount", report.fusermount),
                ("systemctl", report.systemctl),
            ] {
                println!("{} {name}", if found { "✅" } else { "❌" });
            }
            Ok(())
        }
        Command::Install { tool } => {
            let outcome = match tool {
                InstallTarget::Rclone => install_rclone(&ctx).await?,
                InstallTarget::Megacmd => install_megacmd(&ctx).await?,
            };
            match outcome {
                InstallOutcome::Installed => println!("Installed."),
                InstallOutcome::OpenedBrowser(url) => {
                    println!("No automatic install for this system; opened {url}")
                }
            }
            Ok(())
        }
        Command::Mega { action } => mega_command(&ctx, action).await,
        Command::Autostart { action } => {
            match action {
                AutostartAction::On { minimized } => set_autostart(&ctx, true, minimized)?,
                AutostartAction::Off => set_autostart(&ctx, false, false)?,
                AutostartAction::Status => println!("{}", on_off(is_autostart_enabled(&ctx))),
            }
            Ok(())
        }
        Command::Open { name } => open_in_file_manager(&ctx, &ctx.paths.mount_path(&name)),
    }
}

/// Spawn `work` through the dispatcher and wait for its outcome.
async fn run_operation<F, T>(operation: &str, remote: &str, work: F) -> Result<()>
where
    F: Future<Output = Result<T>> + Send + 'static,
    T: Send + 'static,
{
    let (dispatcher, mut queue) = channel();
    dispatcher.spawn(operation, remote, work);
    drop(dispatcher);

    while let Some(event) = queue.next().await {
        if let UiEvent::Finished { operation, outcome } = event {
            return match outcome {
                Outcome::Success { remote } => {
                    debug!("{operation} {remote} finished");
                    Ok(())
                }
                Outcome::Failure { message } => {
                    Err(CloudMountError::OperationFailed { operation, message })
                }
            };
        }
    }
    Err(CloudMountError::OperationFailed {
        operation: operation.to_string(),
        message: "no result reported".into(),
    })
}

/// Cards for every remote, with quotas fetched concurrently and applied as
/// their events arrive.
async fn load_cards(ctx: &Arc<AppContext>) -> Result<Vec<RemoteCard>> {
    let mut cards = dashboard_cached(ctx).await?;
    let (dispatcher, mut queue) = channel();
    for card in cards.iter().filter(|c| c.quota == QuotaSummary::Pending) {
        dispatcher.spawn_quota(ctx.clone(), card.name.clone());
    }
    drop(dispatcher);

    while let Some(event) = queue.next().await {
        if let UiEvent::QuotaLoaded { remote, quota } = event {
            if let Some(card) = cards.iter_mut().find(|c| c.name == remote) {
                card.quota = QuotaSummary::from_cached(Some(quota));
            }
        }
    }
    Ok(cards)
}

async fn status(ctx: &Arc<AppContext>) -> Result<()> {
    let cards = load_cards(ctx).await?;
    if cards.is_empty() {
        println!("No remotes configured. Add one with `cloudmount add <provider> <name>`.");
    }
    for card in &cards {
        println!("{}", render_card(card));
    }
    Ok(())
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

pub fn describe_options(options: &RemoteOptions) -> String {
    let or_unlimited = |s: &str| {
        if s.is_empty() {
            "unlimited".to_string()
        } else {
            s.to_string()
        }
    };
    format!(
        "read-only: {}, cache: {}, bandwidth: {}",
        on_off(options.read_only),
        or_unlimited(&options.cache_size),
        or_unlimited(&options.bw_limit)
    )
}

pub fn render_card(card: &RemoteCard) -> String {
    format!(
        "{} [{}] automount: {}\n  path: {}\n  options: {}\n  quota: {}",
        card.name,
        if card.mounted { "mounted" } else { "not mounted" },
        on_off(card.automount),
        card.mount_path.display(),
        describe_options(&card.options),
        card.quota
    )
}

async fn automount(ctx: Arc<AppContext>, action: AutomountAction) -> Result<()> {
    match action {
        AutomountAction::Enable { name } => {
            let (c, n) = (ctx.clone(), name.clone());
            run_operation("automount", &name, async move { enable_automount(&c, &n).await }).await
        }
        AutomountAction::Disable { name } => {
            let (c, n) = (ctx.clone(), name.clone());
            run_operation("automount", &name, async move { disable_automount(&c, &n).await })
                .await
        }
        AutomountAction::Status { name } => {
            println!("{}", on_off(is_automount_enabled(&ctx, &name).await));
            Ok(())
        }
    }
}

async fn mega_command(ctx: &AppContext, action: MegaAction) -> Result<()> {
    match action {
        MegaAction::Login {
            user,
            password,
            code,
        } => mega::login(ctx, &user, &password, code.as_deref().unwrap_or_default()).await,
        MegaAction::Logout => mega::logout(ctx).await,
        MegaAction::Status => {
            let state = if mega::is_logged_in(ctx).await {
                "logged in"
            } else {
                "logged out"
            };
            println!("{state}");
            Ok(())
        }
        MegaAction::Space => {
            println!("{}", mega::space_summary(ctx).await);
            Ok(())
        }
        MegaAction::Webdav => {
            println!("{}", mega::webdav_url(ctx).await?);
            Ok(())
        }
    }
}

/// Lines of `next` not already shown at the end of `prev`.
fn unseen_lines<'a>(prev: &[String], next: &'a [String]) -> &'a [String] {
    let max = prev.len().min(next.len());
    let overlap = (0..=max)
        .rev()
        .find(|&k| prev[prev.len() - k..] == next[..k])
        .unwrap_or(0);
    &next[overlap..]
}

async fn logs(ctx: &AppContext, lines: usize, follow: bool) -> Result<()> {
    let path = &ctx.paths.rclone_log_file;
    if !follow {
        for line in tail_lines(path, lines).await {
            println!("{line}");
        }
        return Ok(());
    }

    let (mut rx, handle) = LogTailer::new(path).max_lines(lines).spawn();
    let mut shown: Vec<String> = Vec::new();
    loop {
        tokio::select! {
            snapshot = rx.recv() => {
                let Some(snapshot) = snapshot else { break };
                for line in unseen_lines(&shown, &snapshot) {
                    println!("{line}");
                }
                shown = snapshot;
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    drop(rx);
    handle.abort();
    Ok(())
}
