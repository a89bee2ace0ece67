//! Command execution seam
//!
//! Every external tool CloudMount drives (rclone, fusermount, systemctl,
//! MEGAcmd, package managers) goes through a [`CommandRunner`]. Production
//! code uses [`SystemRunner`]; tests script responses instead.

use futures::future::BoxFuture;
use log::debug;
use std::io;

use super::command::{Command, spawn_detached};
use crate::utils::types::errors::{CloudMountError, Result};

/// A fully described external invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// `program arg1 arg2` for logs
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// stdout followed by stderr, trimmed; what the user sees on failure
    pub fn combined(&self) -> String {
        let mut text = self.stdout.trim().to_string();
        let err = self.stderr.trim();
        if !err.is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(err);
        }
        text
    }
}

impl From<std::process::Output> for CommandOutput {
    fn from(output: std::process::Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

pub trait CommandRunner: Send + Sync {
    /// Run to completion and capture output. No timeout, no cancellation.
    fn output(&self, invocation: Invocation) -> BoxFuture<'_, io::Result<CommandOutput>>;

    /// Start and forget.
    fn spawn_detached(&self, invocation: Invocation) -> io::Result<()>;
}

/// Runs real processes.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn output(&self, invocation: Invocation) -> BoxFuture<'_, io::Result<CommandOutput>> {
        Box::pin(async move {
            debug!("▶️ {}", invocation.command_line());
            let output = Command::new(&invocation.program)
                .args(&invocation.args)
                .envs(invocation.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
                .output()
                .await?;
            Ok(output.into())
        })
    }

    fn spawn_detached(&self, invocation: Invocation) -> io::Result<()> {
        debug!("🚀 {} (detached)", invocation.command_line());
        spawn_detached(&invocation.program, &invocation.args)
    }
}

fn map_spawn_error(program: &str, e: io::Error) -> CloudMountError {
    if e.kind() == io::ErrorKind::NotFound {
        CloudMountError::BinaryNotFound(program.to_string())
    } else {
        CloudMountError::Io(e)
    }
}

/// Run and require a zero exit status.
///
/// A non-zero exit becomes [`CloudMountError::CommandFailed`] carrying the
/// captured output; a missing binary becomes `BinaryNotFound`.
pub async fn run_checked(
    runner: &dyn CommandRunner,
    invocation: Invocation,
) -> Result<CommandOutput> {
    let program = invocation.program.clone();
    let output = runner
        .output(invocation)
        .await
        .map_err(|e| map_spawn_error(&program, e))?;

    if output.success {
        Ok(output)
    } else {
        Err(CloudMountError::command_failed(program, output.combined()))
    }
}

/// Run and report only whether it exited successfully. Spawn errors count
/// as failure.
pub async fn run_status(runner: &dyn CommandRunner, invocation: Invocation) -> bool {
    match runner.output(invocation).await {
        Ok(output) => output.success,
        Err(e) => {
            debug!("Command could not be started: {e}");
            false
        }
    }
}

pub fn spawn(runner: &dyn CommandRunner, invocation: Invocation) -> Result<()> {
    let program = invocation.program.clone();
    runner
        .spawn_detached(invocation)
        .map_err(|e| map_spawn_error(&program, e))
}

#[cfg(test)]
pub(crate) mod testing {
    //! Scripted runner for unit tests.

    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    type Responder = Box<dyn Fn(&Invocation) -> Option<io::Result<CommandOutput>> + Send + Sync>;

    /// Answers invocations from a list of responders (first match wins) and
    /// records every call. Unmatched calls succeed with empty output.
    #[derive(Default)]
    pub struct FakeRunner {
        responders: Mutex<Vec<Responder>>,
        calls: Mutex<Vec<Invocation>>,
        spawned: Mutex<Vec<Invocation>>,
        queued: Mutex<VecDeque<(String, CommandOutput)>>,
    }

    impl FakeRunner {
        pub fn new() -> Self {
            Self::default()
        }

        /// Respond to calls whose command line starts with `prefix`.
        pub fn on(&self, prefix: &str, output: CommandOutput) {
            let prefix = prefix.to_string();
            self.respond(move |inv| {
                inv.command_line()
                    .starts_with(&prefix)
                    .then(|| Ok(output.clone()))
            });
        }

        /// One-shot response consumed by the next matching call.
        pub fn once(&self, prefix: &str, output: CommandOutput) {
            self.queued
                .lock()
                .unwrap()
                .push_back((prefix.to_string(), output));
        }

        pub fn respond<F>(&self, f: F)
        where
            F: Fn(&Invocation) -> Option<io::Result<CommandOutput>> + Send + Sync + 'static,
        {
            self.responders.lock().unwrap().push(Box::new(f));
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(Invocation::command_line)
                .collect()
        }

        pub fn invocations(&self) -> Vec<Invocation> {
            self.calls.lock().unwrap().clone()
        }

        pub fn spawned(&self) -> Vec<String> {
            self.spawned
                .lock()
                .unwrap()
                .iter()
                .map(Invocation::command_line)
                .collect()
        }

        pub fn called_with_prefix(&self, prefix: &str) -> bool {
            self.calls().iter().any(|c| c.starts_with(prefix))
        }

        fn answer(&self, inv: &Invocation) -> io::Result<CommandOutput> {
            let line = inv.command_line();
            {
                let mut queued = self.queued.lock().unwrap();
                if let Some(pos) = queued.iter().position(|(p, _)| line.starts_with(p)) {
                    if let Some((_, output)) = queued.remove(pos) {
                        return Ok(output);
                    }
                }
            }
            for responder in self.responders.lock().unwrap().iter() {
                if let Some(result) = responder(inv) {
                    return result;
                }
            }
            Ok(CommandOutput::ok(""))
        }
    }

    impl CommandRunner for FakeRunner {
        fn output(&self, invocation: Invocation) -> BoxFuture<'_, io::Result<CommandOutput>> {
            self.calls.lock().unwrap().push(invocation.clone());
            let result = self.answer(&invocation);
            Box::pin(async move { result })
        }

        fn spawn_detached(&self, invocation: Invocation) -> io::Result<()> {
            self.spawned.lock().unwrap().push(invocation);
            Ok(())
        }
    }
}
