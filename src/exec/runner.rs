// src/exec/runner.rs

//! One child process slot within a group.
//!
//! A [`ProcessRunner`] is bound to one script for the lifetime of its group.
//! Every launch replaces its child: the previous child (if still alive) is
//! killed and a fresh one is spawned in its own Tokio task. Each launch gets a
//! number, and only the newest launch may report an exit, so a child killed
//! during a restart can never be counted as part of the next generation.

use std::io::Write;
use std::process::Stdio;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::errors::WypError;
use crate::exec::group::{Generation, LaunchContext};
use crate::output::{PrefixedWriter, palette};
use crate::script::Script;
use crate::types::StreamKind;

/// Interpreter used when neither the script nor `$SHELL` names one.
pub const DEFAULT_SHELL: &str = "bash";

/// How long to keep draining a child's pipes after it exits.
const PUMP_DRAIN_TIMEOUT: Duration = Duration::from_millis(250);

const READ_BUF_SIZE: usize = 8 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerStatus {
    /// Never started.
    Idle,
    /// Launch issued, child not spawned yet.
    Starting,
    Running,
    Exited,
}

#[derive(Debug)]
struct RunnerState {
    status: RunnerStatus,
    launch: u64,
    pid: Option<u32>,
    exit_code: Option<i32>,
    generation: Option<Arc<Generation>>,
    kill: Option<oneshot::Sender<()>>,
}

#[derive(Debug)]
pub struct ProcessRunner {
    index: usize,
    script: Arc<dyn Script>,
    state: Mutex<RunnerState>,
}

impl ProcessRunner {
    pub fn new(index: usize, script: Arc<dyn Script>) -> Self {
        Self {
            index,
            script,
            state: Mutex::new(RunnerState {
                status: RunnerStatus::Idle,
                launch: 0,
                pid: None,
                exit_code: None,
                generation: None,
                kill: None,
            }),
        }
    }

    /// Position in the group; fixes the runner's colour.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn script(&self) -> &dyn Script {
        self.script.as_ref()
    }

    pub fn status(&self) -> RunnerStatus {
        self.lock().status
    }

    /// OS pid of the current child, once spawned.
    pub fn pid(&self) -> Option<u32> {
        self.lock().pid
    }

    /// Exit code of the current child, once it has exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        self.lock().exit_code
    }

    /// Label shown in front of every output line.
    pub fn label(&self) -> &str {
        let prefix = self.script.prefix();
        if prefix.is_empty() {
            self.script.name()
        } else {
            prefix
        }
    }

    fn lock(&self) -> MutexGuard<'_, RunnerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ask the current child to die. No-op when there is none or it has
    /// already exited.
    pub(crate) fn kill(&self) {
        if let Some(kill) = self.lock().kill.take() {
            if kill.send(()).is_err() {
                debug!(script = %self.script.name(), "child already gone; kill ignored");
            }
        }
    }

    /// Start a fresh child counted towards `generation`.
    ///
    /// A runner that is still `Starting` is not launched again; its
    /// in-flight launch is moved into `generation` instead, so the new
    /// generation still waits for it.
    pub(crate) fn launch(self: &Arc<Self>, generation: Arc<Generation>, ctx: &LaunchContext) {
        let mut state = self.lock();

        if state.status == RunnerStatus::Starting {
            debug!(
                script = %self.script.name(),
                generation = generation.id(),
                "runner still starting; adopting in-flight launch"
            );
            state.generation = Some(generation);
            return;
        }

        if state.status == RunnerStatus::Running {
            if let Some(kill) = state.kill.take() {
                debug!(
                    script = %self.script.name(),
                    pid = ?state.pid,
                    "killing live child before relaunch"
                );
                let _ = kill.send(());
            }
        }

        state.launch += 1;
        state.status = RunnerStatus::Starting;
        state.pid = None;
        state.exit_code = None;
        state.generation = Some(generation);

        let (kill_tx, kill_rx) = oneshot::channel();
        state.kill = Some(kill_tx);
        let launch = state.launch;
        drop(state);

        let cmd = build_command(self.script.as_ref());
        let runner = Arc::clone(self);
        let ctx = ctx.clone();
        tokio::spawn(async move {
            runner.drive(launch, cmd, kill_rx, ctx).await;
        });
    }

    async fn drive(
        self: Arc<Self>,
        launch: u64,
        mut cmd: Command,
        mut kill_rx: oneshot::Receiver<()>,
        ctx: LaunchContext,
    ) {
        let name = self.script.name().to_string();

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(source) => {
                error!(script = %name, error = %source, "failed to spawn process");
                self.fail(launch, WypError::Spawn { name, source });
                return;
            }
        };

        let pid = child.id();
        self.mark_running(launch, pid);
        info!(script = %name, index = self.index, ?pid, "process started");

        let color = Some(palette::color_for(self.index));
        let stdout = PrefixedWriter::new(
            ctx.output.writer(self.index, StreamKind::Stdout),
            self.label(),
            color,
        );
        let stderr = PrefixedWriter::new(
            ctx.output.writer(self.index, StreamKind::Stderr),
            self.label(),
            color,
        );
        let pumps = [
            spawn_pump(child.stdout.take(), stdout),
            spawn_pump(child.stderr.take(), stderr),
        ];

        let exit_code = tokio::select! {
            status = child.wait() => match status {
                Ok(status) => {
                    info!(
                        script = %name,
                        ?pid,
                        exit_code = ?status.code(),
                        success = status.success(),
                        "process exited"
                    );
                    drain(pumps).await;
                    status.code()
                }
                Err(e) => {
                    warn!(script = %name, error = %e, "waiting for process failed");
                    None
                }
            },

            Ok(()) = &mut kill_rx => {
                debug!(script = %name, ?pid, "kill requested");
                if let Err(e) = child.kill().await {
                    debug!(script = %name, error = %e, "kill failed; process already gone");
                }
                None
            }

            _ = ctx.cancel.cancelled() => {
                info!(script = %name, ?pid, "cancelled; killing process");
                if let Err(e) = child.kill().await {
                    debug!(script = %name, error = %e, "kill failed; process already gone");
                }
                None
            }
        };

        if let Some(generation) = self.finish(launch, exit_code) {
            generation.finish(self.index);
        }
    }

    fn mark_running(&self, launch: u64, pid: Option<u32>) {
        let mut state = self.lock();
        if state.launch == launch {
            state.status = RunnerStatus::Running;
            state.pid = pid;
        }
    }

    /// Record the exit of `launch` and return the generation it counts
    /// towards, or `None` if a newer launch has replaced it.
    fn finish(&self, launch: u64, exit_code: Option<i32>) -> Option<Arc<Generation>> {
        let mut state = self.lock();
        if state.launch != launch {
            debug!(
                script = %self.script.name(),
                launch,
                current = state.launch,
                "ignoring exit of superseded launch"
            );
            return None;
        }

        state.status = RunnerStatus::Exited;
        state.exit_code = exit_code;
        state.kill = None;
        state.generation.clone()
    }

    fn fail(&self, launch: u64, err: WypError) {
        let generation = {
            let mut state = self.lock();
            if state.launch != launch {
                return;
            }
            state.status = RunnerStatus::Exited;
            state.kill = None;
            state.generation.clone()
        };

        if let Some(generation) = generation {
            generation.fail(self.index, err);
        }
    }
}

/// Pick the interpreter: script override, then `$SHELL`, then [`DEFAULT_SHELL`].
pub fn resolve_shell(script: &dyn Script) -> String {
    if !script.shell().is_empty() {
        return script.shell().to_string();
    }

    std::env::var("SHELL")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SHELL.to_string())
}

/// Build `<shell> -c <run>` with the script's directory and environment.
///
/// stdin is inherited so interactive scripts keep working; stdout and stderr
/// are piped so they can be labelled.
pub fn build_command(script: &dyn Script) -> Command {
    let mut cmd = Command::new(resolve_shell(script));
    cmd.arg("-c").arg(script.run());

    // Applied in order on top of the inherited environment; last one wins.
    for entry in script.env() {
        if let Some((key, value)) = entry.split_once('=') {
            cmd.env(key, value);
        }
    }

    if !script.dir().is_empty() {
        cmd.current_dir(script.dir());
    }

    cmd.stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    cmd
}

fn spawn_pump<R>(
    reader: Option<R>,
    mut writer: PrefixedWriter<Box<dyn Write + Send>>,
) -> Option<JoinHandle<()>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut reader = reader?;
    Some(tokio::spawn(async move {
        let mut buf = vec![0u8; READ_BUF_SIZE];
        loop {
            match reader.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => {
                    let _ = writer.write(&buf[..n]);
                }
            }
        }
    }))
}

/// Give the pumps a moment to flush what the child wrote before exiting.
/// Grandchildren may hold the pipes open, so this is bounded.
async fn drain(pumps: [Option<JoinHandle<()>>; 2]) {
    for pump in pumps.into_iter().flatten() {
        if tokio::time::timeout(PUMP_DRAIN_TIMEOUT, pump).await.is_err() {
            debug!("output pump still open after exit; leaving it running");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::ScriptSpec;

    #[test]
    fn script_shell_overrides_everything() {
        let spec = ScriptSpec::new("a", "true").with_shell("zsh");
        assert_eq!(resolve_shell(&spec), "zsh");
    }

    #[test]
    fn falls_back_to_env_or_default_shell() {
        let spec = ScriptSpec::new("a", "true");
        let expected = std::env::var("SHELL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SHELL.to_string());
        assert_eq!(resolve_shell(&spec), expected);
    }

    #[test]
    fn command_runs_through_shell_flag() {
        let spec = ScriptSpec::new("a", "echo hi")
            .with_shell("sh")
            .with_dir("/tmp")
            .with_env("A=1")
            .with_env("A=2");
        let cmd = build_command(&spec);
        let std_cmd = cmd.as_std();

        assert_eq!(std_cmd.get_program(), "sh");
        let args: Vec<_> = std_cmd.get_args().collect();
        assert_eq!(args, ["-c", "echo hi"]);
        assert_eq!(std_cmd.get_current_dir(), Some(std::path::Path::new("/tmp")));

        let a: Vec<_> = std_cmd
            .get_envs()
            .filter(|(k, _)| *k == "A")
            .map(|(_, v)| v)
            .collect();
        assert_eq!(a, [Some(std::ffi::OsStr::new("2"))]);
    }

    #[test]
    fn label_prefers_prefix_override() {
        let plain = ProcessRunner::new(0, Arc::new(ScriptSpec::new("api", "true")));
        assert_eq!(plain.label(), "api");

        let labelled = ProcessRunner::new(
            1,
            Arc::new(ScriptSpec::new("api", "true").with_prefix("server")),
        );
        assert_eq!(labelled.label(), "server");
        assert_eq!(labelled.status(), RunnerStatus::Idle);
        assert_eq!(labelled.pid(), None);
    }
}
