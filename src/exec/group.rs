// src/exec/group.rs

//! Supervisor for a cohort of child processes started and restarted together.
//!
//! Each `start()` opens a new *generation*: a fresh completion signal plus a
//! countdown of runners still to exit. Runners report exits to the
//! generation they were launched into, and the runner whose exit brings the
//! countdown to zero publishes the signal. Opening a generation drops the
//! previous one's signal first, so nothing from an older generation can
//! complete a `wait()` that is blocked across a restart.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::errors::{Result, WypError};
use crate::exec::runner::{ProcessRunner, RunnerStatus};
use crate::output::{OutputTarget, Terminal};
use crate::script::Script;

type Outcome = Result<()>;

/// Completion bookkeeping for one `start()`.
#[derive(Debug)]
pub(crate) struct Generation {
    id: u64,
    done: Vec<AtomicBool>,
    remaining: AtomicUsize,
    signal: Mutex<Option<oneshot::Sender<Outcome>>>,
}

impl Generation {
    fn new(id: u64, size: usize) -> (Arc<Self>, oneshot::Receiver<Outcome>) {
        let (tx, rx) = oneshot::channel();
        let generation = Self {
            id,
            done: (0..size).map(|_| AtomicBool::new(false)).collect(),
            remaining: AtomicUsize::new(size),
            signal: Mutex::new(Some(tx)),
        };
        (Arc::new(generation), rx)
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    /// Count the runner at `index` as exited. Each runner counts once; the
    /// call that reaches zero publishes.
    pub(crate) fn finish(&self, index: usize) {
        if self.done[index].swap(true, Ordering::AcqRel) {
            return;
        }

        if self.remaining.fetch_sub(1, Ordering::AcqRel) == 1 {
            debug!(generation = self.id, "all runners exited");
            self.publish(Ok(()));
        }
    }

    /// Publish a fatal error for the whole generation.
    pub(crate) fn fail(&self, index: usize, err: WypError) {
        self.done[index].store(true, Ordering::Release);
        self.publish(Err(err));
    }

    /// Drop the signal without firing it.
    fn supersede(&self) {
        self.lock_signal().take();
    }

    fn publish(&self, outcome: Outcome) {
        if let Some(tx) = self.lock_signal().take() {
            // A closed receiver means nobody waits on this generation.
            let _ = tx.send(outcome);
        }
    }

    fn lock_signal(&self) -> MutexGuard<'_, Option<oneshot::Sender<Outcome>>> {
        self.signal.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// What every runner launch needs from its group.
#[derive(Clone)]
pub(crate) struct LaunchContext {
    pub(crate) cancel: CancellationToken,
    pub(crate) output: Arc<dyn OutputTarget>,
}

#[derive(Debug, Default)]
struct Completion {
    current: Option<Arc<Generation>>,
    receiver: Option<oneshot::Receiver<Outcome>>,
    next_id: u64,
}

/// A fixed set of runners started, restarted and awaited as one unit.
///
/// `start()` and `restart()` spawn Tokio tasks and must be called from
/// within a runtime.
pub struct ProcessGroup {
    runners: Vec<Arc<ProcessRunner>>,
    ctx: LaunchContext,
    completion: Mutex<Completion>,
    start_lock: Mutex<()>,
}

impl std::fmt::Debug for ProcessGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProcessGroup")
            .field("runners", &self.runners)
            .finish_non_exhaustive()
    }
}

impl ProcessGroup {
    /// Build a group over `scripts`, writing to the terminal.
    ///
    /// Cancelling `cancel` kills every child the group has started.
    pub fn new(scripts: Vec<Arc<dyn Script>>, cancel: CancellationToken) -> Result<Self> {
        if scripts.is_empty() {
            return Err(WypError::EmptyGroup);
        }

        let runners = scripts
            .into_iter()
            .enumerate()
            .map(|(index, script)| Arc::new(ProcessRunner::new(index, script)))
            .collect();

        Ok(Self {
            runners,
            ctx: LaunchContext {
                cancel,
                output: Arc::new(Terminal),
            },
            completion: Mutex::new(Completion::default()),
            start_lock: Mutex::new(()),
        })
    }

    /// Send runner output somewhere other than the terminal.
    pub fn with_output(mut self, output: Arc<dyn OutputTarget>) -> Self {
        self.ctx.output = output;
        self
    }

    pub fn runners(&self) -> &[Arc<ProcessRunner>] {
        &self.runners
    }

    /// Number of `start()` calls so far.
    pub fn generation(&self) -> u64 {
        self.lock_completion().next_id
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.ctx.cancel
    }

    /// Launch every runner and arm a fresh completion signal.
    ///
    /// Runners with a live child have it killed first. Returns without
    /// waiting for any child to spawn.
    pub fn start(&self) {
        let _serial = self.start_lock.lock().unwrap_or_else(PoisonError::into_inner);

        let generation = {
            let mut completion = self.lock_completion();
            completion.next_id += 1;
            let (generation, receiver) = Generation::new(completion.next_id, self.runners.len());
            if let Some(previous) = completion.current.replace(Arc::clone(&generation)) {
                previous.supersede();
            }
            completion.receiver = Some(receiver);
            generation
        };

        info!(
            generation = generation.id(),
            runners = self.runners.len(),
            "starting run group"
        );

        for runner in &self.runners {
            runner.launch(Arc::clone(&generation), &self.ctx);
        }
    }

    /// Start a new generation over the same runners.
    ///
    /// Already-exited runners get a (no-op) kill; runners still alive are
    /// killed by `start()` itself before their replacement is launched.
    pub fn restart(&self) {
        for runner in &self.runners {
            if runner.status() == RunnerStatus::Exited {
                runner.kill();
            }
        }

        self.start();
    }

    /// Block until every runner of the current generation has exited.
    ///
    /// A restart while waiting moves the wait onto the new generation. A
    /// child that could not be spawned makes this return its spawn error.
    /// Fails with [`WypError::NotStarted`] when there is no armed generation:
    /// before the first `start()`, or a second time after one completed.
    /// Not meant to be called concurrently on the same group.
    pub async fn wait(&self) -> Result<()> {
        loop {
            let receiver = self
                .lock_completion()
                .receiver
                .take()
                .ok_or(WypError::NotStarted)?;

            match receiver.await {
                Ok(outcome) => return outcome,
                Err(_) => {
                    debug!("generation superseded while waiting; following restart");
                }
            }
        }
    }

    /// Kill every child by cancelling the shared token.
    pub fn shutdown(&self) {
        self.ctx.cancel.cancel();
    }

    fn lock_completion(&self) -> MutexGuard<'_, Completion> {
        self.completion.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::ScriptSpec;

    #[test]
    fn rejects_empty_group() {
        let err = ProcessGroup::new(Vec::new(), CancellationToken::new()).unwrap_err();
        assert!(matches!(err, WypError::EmptyGroup));
    }

    #[tokio::test]
    async fn wait_before_start_fails_immediately() {
        let group = ProcessGroup::new(
            vec![Arc::new(ScriptSpec::new("a", "true")) as Arc<dyn Script>],
            CancellationToken::new(),
        )
        .unwrap();

        assert!(matches!(group.wait().await, Err(WypError::NotStarted)));
        assert_eq!(group.generation(), 0);
    }

    #[tokio::test]
    async fn generation_publishes_once_when_all_finish() {
        let (generation, rx) = Generation::new(1, 3);
        generation.finish(0);
        generation.finish(0);
        generation.finish(2);
        assert_eq!(generation.remaining.load(Ordering::Acquire), 1);

        generation.finish(1);
        assert!(rx.await.unwrap().is_ok());
        assert!(generation.lock_signal().is_none());
    }

    #[tokio::test]
    async fn superseded_generation_never_fires() {
        let (generation, rx) = Generation::new(1, 1);
        generation.supersede();
        generation.finish(0);
        assert!(rx.await.is_err());
    }

    #[tokio::test]
    async fn failure_is_published_before_others_finish() {
        let (generation, rx) = Generation::new(1, 2);
        generation.fail(
            1,
            WypError::Spawn {
                name: "b".into(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            },
        );
        generation.finish(0);
        assert!(matches!(rx.await.unwrap(), Err(WypError::Spawn { .. })));
    }
}
