use std::ffi::OsStr;
use std::process::Stdio;

/// A thin builder over `tokio::process::Command` with the stdio setup every
/// CloudMount invocation wants: captured stdout/stderr and a closed stdin.
#[derive(Debug)]
pub struct Command {
    inner: tokio::process::Command,
}

impl Command {
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        let mut cmd = tokio::process::Command::new(program);

        cmd.stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .stdin(Stdio::null());

        Self { inner: cmd }
    }

    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        self.inner.arg(arg);
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.inner.args(args);
        self
    }

    pub fn envs<I, K, V>(mut self, envs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<OsStr>,
        V: AsRef<OsStr>,
    {
        self.inner.envs(envs);
        self
    }

    pub async fn output(mut self) -> std::io::Result<std::process::Output> {
        self.inner.output().await
    }
}

/// Start `program` detached from this process: new session, no stdio.
///
/// Used for daemons (`mega-cmd-server`) and openers (`xdg-open`) that must
/// outlive the CloudMount process.
pub fn spawn_detached<I, S>(program: &str, args: I) -> std::io::Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = std::process::Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        // SAFETY: setsid is async-signal-safe and touches no parent state.
        unsafe {
            cmd.pre_exec(|| {
                nix::unistd::setsid()
                    .map(|_| ())
                    .map_err(std::io::Error::from)
            });
        }
    }

    cmd.spawn().map(|_| ())
}
