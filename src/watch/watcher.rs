// src/watch/watcher.rs

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use notify::event::{CreateKind, ModifyKind, RemoveKind};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::errors::{Result, WypError};
use crate::watch::path_utils::display_path;

/// At most one callback is delivered per interval.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Kind of file change reported to the callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Create,
    Write,
    Remove,
    Rename,
    Chmod,
    Other,
}

impl ChangeKind {
    /// Map a notify event kind; reads (`Access`) are not changes.
    pub fn from_event_kind(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Access(_) => None,
            EventKind::Create(_) => Some(ChangeKind::Create),
            EventKind::Remove(_) => Some(ChangeKind::Remove),
            EventKind::Modify(ModifyKind::Name(_)) => Some(ChangeKind::Rename),
            EventKind::Modify(ModifyKind::Metadata(_)) => Some(ChangeKind::Chmod),
            EventKind::Modify(_) => Some(ChangeKind::Write),
            EventKind::Any | EventKind::Other => Some(ChangeKind::Other),
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeKind::Create => "create",
            ChangeKind::Write => "write",
            ChangeKind::Remove => "remove",
            ChangeKind::Rename => "rename",
            ChangeKind::Chmod => "chmod",
            ChangeKind::Other => "change",
        };
        f.write_str(s)
    }
}

/// Handle for a running watch.
///
/// Keeps the underlying `RecommendedWatcher` alive; dropping the handle stops
/// watching and the delivery task.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
    errors: mpsc::UnboundedReceiver<notify::Error>,
    task: JoinHandle<()>,
}

impl fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

impl WatcherHandle {
    /// Resolves with the first error the watcher reports after setup.
    /// Never resolves while watching is healthy.
    pub async fn failed(&mut self) -> WypError {
        match self.errors.recv().await {
            Some(err) => WypError::Watch(err),
            None => std::future::pending().await,
        }
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Recursively watch `root` and call `on_event(kind, path)` for file changes.
///
/// Bursts are coalesced: within each [`POLL_INTERVAL`] only the first file
/// change is delivered and the rest are dropped, so an editor writing a file
/// several times per save causes one callback. Events that only concern
/// directories are ignored. `path` is relative to the current working
/// directory when possible.
///
/// Must be called from within a Tokio runtime; `on_event` runs on the
/// delivery task.
pub fn watch<F>(root: impl Into<PathBuf>, on_event: F) -> Result<WatcherHandle>
where
    F: FnMut(ChangeKind, String) + Send + 'static,
{
    let root = root.into();
    let root = root.canonicalize().unwrap_or(root);
    let base = std::env::current_dir().unwrap_or_else(|_| root.clone());

    // Channels from the blocking notify callback into the async world.
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();
    let (error_tx, error_rx) = mpsc::unbounded_channel::<notify::Error>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                let _ = event_tx.send(event);
            }
            Err(err) => {
                let _ = error_tx.send(err);
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;

    info!("file watcher started on {:?}", root);

    let task = tokio::spawn(deliver(event_rx, base, on_event));

    Ok(WatcherHandle {
        _inner: watcher,
        errors: error_rx,
        task,
    })
}

async fn deliver<F>(mut event_rx: mpsc::UnboundedReceiver<Event>, base: PathBuf, mut on_event: F)
where
    F: FnMut(ChangeKind, String),
{
    let mut ticker = tokio::time::interval(POLL_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut pending: Option<(ChangeKind, PathBuf)> = None;

    loop {
        tokio::select! {
            maybe_event = event_rx.recv() => {
                let Some(event) = maybe_event else {
                    break;
                };
                debug!(?event, "received notify event");
                if pending.is_none() {
                    pending = file_change(&event);
                }
            }

            _ = ticker.tick() => {
                if let Some((kind, path)) = pending.take() {
                    let rel = display_path(&base, &path);
                    debug!(%kind, path = %rel, "delivering file change");
                    on_event(kind, rel);
                }
            }
        }
    }

    debug!("file watcher loop ended");
}

/// The first non-directory path of a change event, with its kind.
///
/// A removed directory no longer exists on disk, so folder events are
/// recognised by kind before falling back to `is_dir`.
fn file_change(event: &Event) -> Option<(ChangeKind, PathBuf)> {
    if matches!(
        event.kind,
        EventKind::Create(CreateKind::Folder) | EventKind::Remove(RemoveKind::Folder)
    ) {
        return None;
    }

    let kind = ChangeKind::from_event_kind(&event.kind)?;
    let path = event.paths.iter().find(|p| !p.is_dir())?;
    Some((kind, path.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::event::{AccessKind, DataChange, MetadataKind, RenameMode};

    #[test]
    fn maps_event_kinds() {
        assert_eq!(
            ChangeKind::from_event_kind(&EventKind::Create(CreateKind::File)),
            Some(ChangeKind::Create)
        );
        assert_eq!(
            ChangeKind::from_event_kind(&EventKind::Modify(ModifyKind::Data(DataChange::Any))),
            Some(ChangeKind::Write)
        );
        assert_eq!(
            ChangeKind::from_event_kind(&EventKind::Modify(ModifyKind::Name(RenameMode::Both))),
            Some(ChangeKind::Rename)
        );
        assert_eq!(
            ChangeKind::from_event_kind(&EventKind::Modify(ModifyKind::Metadata(
                MetadataKind::Permissions
            ))),
            Some(ChangeKind::Chmod)
        );
        assert_eq!(
            ChangeKind::from_event_kind(&EventKind::Access(AccessKind::Any)),
            None
        );
    }

    #[test]
    fn directory_events_are_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();

        let dir_event = Event::new(EventKind::Create(CreateKind::Folder)).add_path(sub.clone());
        assert!(file_change(&dir_event).is_none());

        let file = sub.join("a.txt");
        std::fs::write(&file, "x").unwrap();
        let mixed = Event::new(EventKind::Modify(ModifyKind::Any))
            .add_path(sub)
            .add_path(file.clone());
        assert_eq!(file_change(&mixed), Some((ChangeKind::Write, file)));
    }

    #[test]
    fn removed_directories_are_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("olddir");
        std::fs::create_dir(&gone).unwrap();
        std::fs::remove_dir(&gone).unwrap();

        let removed = Event::new(EventKind::Remove(RemoveKind::Folder)).add_path(gone);
        assert!(file_change(&removed).is_none());

        let removed_file = dir.path().join("old.txt");
        let file_event =
            Event::new(EventKind::Remove(RemoveKind::File)).add_path(removed_file.clone());
        assert_eq!(
            file_change(&file_event),
            Some((ChangeKind::Remove, removed_file))
        );
    }

    #[test]
    fn kinds_render_lowercase() {
        assert_eq!(ChangeKind::Write.to_string(), "write");
        assert_eq!(ChangeKind::Other.to_string(), "change");
    }
}
