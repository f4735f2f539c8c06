//! File watching for live recompilation.
//!
//! Uses notify crate for cross-platform file system events. Editors often
//! save by replacing the file, so the parent directory is watched and
//! events are matched back to the document by path or file name.
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

/// Quiet period tracker: a burst of events becomes one change once
/// `delay` has passed since the last event.
#[derive(Debug, Clone, Copy)]
struct Debounce {
    delay: Duration,
    last_event: Option<Instant>,
}

impl Debounce {
    const fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_event: None,
        }
    }

    const fn record(&mut self, at: Instant) {
        self.last_event = Some(at);
    }

    fn take_ready(&mut self, now: Instant) -> bool {
        match self.last_event {
            Some(at) if now.saturating_duration_since(at) >= self.delay => {
                self.last_event = None;
                true
            }
            _ => false,
        }
    }
}

/// Watches the schema document and reports debounced changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    events: Receiver<notify::Result<Event>>,
    directory: PathBuf,
    target: PathBuf,
    file_name: Option<OsString>,
    debounce: Debounce,
}

impl FileWatcher {
    /// Start watching `path`.
    ///
    /// # Errors
    /// Returns an error if the platform watcher cannot be created or the
    /// containing directory cannot be watched.
    pub fn new(path: impl AsRef<Path>, debounce: Duration) -> notify::Result<Self> {
        // Event paths from the OS are canonical, so compare against canonical paths.
        let target = path
            .as_ref()
            .canonicalize()
            .unwrap_or_else(|_| path.as_ref().to_path_buf());
        let file_name = target.file_name().map(std::ffi::OsStr::to_os_string);
        let directory = containing_dir(&target);

        let (tx, events) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })?;
        watcher.watch(&directory, RecursiveMode::NonRecursive)?;
        tracing::debug!(target = %target.display(), directory = %directory.display(), "watching");

        Ok(Self {
            _watcher: watcher,
            events,
            directory,
            target,
            file_name,
            debounce: Debounce::new(debounce),
        })
    }

    /// The canonical path of the watched document.
    pub fn target_path(&self) -> &Path {
        &self.target
    }

    /// Drain pending events; true once a change has settled.
    pub fn take_change_ready(&mut self) -> bool {
        let mut relevant = 0u32;
        let mut ignored = 0u32;
        while let Ok(event) = self.events.try_recv() {
            match event {
                Ok(ev) if self.concerns_target(&ev) => relevant += 1,
                Ok(ev) => {
                    ignored += 1;
                    tracing::trace!(kind = ?ev.kind, paths = ?ev.paths, "ignoring watcher event");
                }
                Err(err) => tracing::warn!(%err, "watcher error"),
            }
        }

        if relevant + ignored > 0 {
            tracing::debug!(relevant, ignored, target = %self.target.display(), "watcher poll");
        }
        let now = Instant::now();
        if relevant > 0 {
            self.debounce.record(now);
        }
        self.debounce.take_ready(now)
    }

    fn concerns_target(&self, event: &Event) -> bool {
        event.paths.iter().any(|path| {
            path == &self.directory
                || path == &self.target
                || self
                    .file_name
                    .as_ref()
                    .is_some_and(|name| path.file_name().is_some_and(|f| f == name))
        })
    }
}

fn containing_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use notify::EventKind;
    use tempfile::tempdir;

    fn event_for(paths: Vec<PathBuf>) -> Event {
        Event {
            kind: EventKind::Any,
            paths,
            attrs: notify::event::EventAttributes::new(),
        }
    }

    #[test]
    fn test_debounce_waits_for_quiet_period() {
        let start = Instant::now();
        let mut debounce = Debounce::new(Duration::from_millis(200));
        assert!(!debounce.take_ready(start));

        debounce.record(start);
        assert!(!debounce.take_ready(start + Duration::from_millis(100)));
        debounce.record(start + Duration::from_millis(150));
        assert!(!debounce.take_ready(start + Duration::from_millis(300)));
        assert!(debounce.take_ready(start + Duration::from_millis(350)));
        assert!(!debounce.take_ready(start + Duration::from_millis(600)));
    }

    #[test]
    fn test_directory_event_concerns_document() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        let path = canonical_dir.join("appwrite.config.json");
        std::fs::write(&path, "{}").expect("write");
        let watcher = FileWatcher::new(&path, Duration::from_millis(10)).expect("watcher");

        assert!(watcher.concerns_target(&event_for(vec![canonical_dir])));
    }

    #[test]
    fn test_sibling_file_event_is_ignored() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        let path = canonical_dir.join("appwrite.config.json");
        std::fs::write(&path, "{}").expect("write");
        let watcher = FileWatcher::new(&path, Duration::from_millis(10)).expect("watcher");

        assert!(!watcher.concerns_target(&event_for(vec![canonical_dir.join("package.json")])));
    }

    #[test]
    fn test_replaced_file_matches_by_name() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("appwrite.config.json");
        std::fs::write(&path, "{}").expect("write");
        let watcher = FileWatcher::new(&path, Duration::from_millis(10)).expect("watcher");

        let renamed_into_place = PathBuf::from("/elsewhere/appwrite.config.json");
        assert!(watcher.concerns_target(&event_for(vec![renamed_into_place])));
    }

    #[test]
    fn test_containing_dir_of_bare_file_is_dot() {
        assert_eq!(containing_dir(Path::new("appwrite.config.json")), PathBuf::from("."));
    }

    #[test]
    fn test_real_file_modification_detected() {
        let dir = tempdir().expect("tempdir");
        let canonical_dir = dir.path().canonicalize().expect("canonicalize");
        let path = canonical_dir.join("appwrite.config.json");
        std::fs::write(&path, r#"{"tables": []}"#).expect("write");

        let mut watcher = FileWatcher::new(&path, Duration::from_millis(50)).expect("watcher");

        // Give the backend time to register the watch
        std::thread::sleep(Duration::from_millis(500));
        std::fs::write(&path, r#"{"tables": [{"$id": "a"}]}"#).expect("write");

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut detected = false;
        while Instant::now() < deadline {
            if watcher.take_change_ready() {
                detected = true;
                break;
            }
            std::thread::sleep(Duration::from_millis(50));
        }

        assert!(detected, "watcher should report the edit within 5 seconds");
    }
}
