use crossbeam_channel::Sender;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};

/// Watches config files on notify's background thread and forwards events to a channel
pub struct FileWatcher {
    watcher: RecommendedWatcher,
    watched: Vec<PathBuf>,
}

impl FileWatcher {
    /// Create a new file watcher that sends events to the provided channel
    pub fn new(tx: Sender<notify::Result<Event>>) -> notify::Result<Self> {
        let watcher = notify::recommended_watcher(move |res| {
            // We ignore send errors because it means the receiver was dropped
            let _ = tx.send(res);
        })?;

        Ok(Self {
            watcher,
            watched: Vec::new(),
        })
    }

    /// Add a path to be watched, replacing any previously watched file
    ///
    /// If the new path cannot be watched the previous file stays watched.
    pub fn watch<P: AsRef<Path>>(&mut self, path: P) -> notify::Result<()> {
        let path = path.as_ref().to_path_buf();
        self.watcher.watch(&path, RecursiveMode::NonRecursive)?;

        for old in std::mem::take(&mut self.watched) {
            if old != path {
                let _ = self.watcher.unwatch(&old);
            }
        }
        self.watched.push(path);
        Ok(())
    }

    /// Currently watched files
    pub fn watched(&self) -> &[PathBuf] {
        &self.watched
    }
}

/// Whether an event should trigger a config reload
pub fn is_reload_event(event: &Event) -> bool {
    matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_))
}
