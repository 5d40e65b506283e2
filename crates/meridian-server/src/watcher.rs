//! File watching for rebuilds and reloads.

use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc as async_mpsc;

/// Events emitted by the file watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A script or stylesheet source changed; assets must be rebundled
    SourceModified(PathBuf),

    /// An HTML page changed
    PageModified(PathBuf),

    /// Any other file was created, modified or removed
    Changed(PathBuf),
}

/// Which paths under the site root matter, and how.
#[derive(Debug, Clone)]
pub struct WatchScope {
    root: PathBuf,
    sources: PathBuf,
    ignored: Vec<PathBuf>,
}

impl WatchScope {
    /// Watch `root`, treating `root/src` as bundler sources and skipping the
    /// `ignored` folders, which the build itself writes. Relative ignored
    /// paths that do not exist yet are taken relative to `root`.
    pub fn new(root: &Path, ignored: &[PathBuf]) -> std::io::Result<Self> {
        let root = root.canonicalize()?;
        let ignored = ignored
            .iter()
            .map(|dir| dir.canonicalize().unwrap_or_else(|_| root.join(dir)))
            .collect();

        Ok(Self {
            sources: root.join("src"),
            ignored,
            root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Classify a changed path, or `None` if it should not trigger anything.
    pub fn classify(&self, path: &Path) -> Option<WatchEvent> {
        if !path.starts_with(&self.root) || self.ignored.iter().any(|dir| path.starts_with(dir)) {
            return None;
        }

        let hidden = path
            .strip_prefix(&self.root)
            .ok()?
            .components()
            .any(|c| c.as_os_str().to_string_lossy().starts_with('.'));
        if hidden {
            return None;
        }

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        if path.starts_with(&self.sources) && matches!(ext, "js" | "mjs" | "scss" | "css") {
            Some(WatchEvent::SourceModified(path.to_path_buf()))
        } else if ext == "html" {
            Some(WatchEvent::PageModified(path.to_path_buf()))
        } else {
            Some(WatchEvent::Changed(path.to_path_buf()))
        }
    }
}

/// File watcher for detecting changes.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
}

impl FileWatcher {
    /// Watch the scope's root recursively.
    ///
    /// Returns the watcher and a channel to receive events.
    pub fn new(
        scope: WatchScope,
    ) -> Result<(Self, async_mpsc::Receiver<WatchEvent>), std::io::Error> {
        let (sync_tx, sync_rx) = mpsc::channel();
        let (async_tx, async_rx) = async_mpsc::channel(100);

        let mut watcher = notify::recommended_watcher(move |res: Result<notify::Event, _>| {
            if let Ok(event) = res {
                let _ = sync_tx.send(event);
            }
        })
        .map_err(std::io::Error::other)?;

        watcher
            .watch(scope.root(), RecursiveMode::Recursive)
            .map_err(std::io::Error::other)?;

        std::thread::spawn(move || {
            let mut last_event_time: Option<std::time::Instant> = None;
            let debounce_duration = Duration::from_millis(100);

            while let Ok(event) = sync_rx.recv() {
                if !is_content_change(&event.kind) {
                    continue;
                }

                for path in event.paths {
                    let Some(watch_event) = scope.classify(&path) else {
                        continue;
                    };

                    // Debounce bursts, but never drop a source change
                    let now = std::time::Instant::now();
                    let recent = last_event_time
                        .is_some_and(|last| now.duration_since(last) < debounce_duration);
                    if recent && !matches!(watch_event, WatchEvent::SourceModified(_)) {
                        continue;
                    }
                    last_event_time = Some(now);

                    if async_tx.blocking_send(watch_event).is_err() {
                        return;
                    }
                }
            }
        });

        Ok((Self { _watcher: watcher }, async_rx))
    }
}

fn is_content_change(kind: &notify::EventKind) -> bool {
    use notify::EventKind;

    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn classifies_paths() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("Assets")).unwrap();
        let scope =
            WatchScope::new(temp.path(), &[temp.path().join("Assets"), PathBuf::from("dist")])
                .unwrap();
        let root = scope.root().to_path_buf();

        assert_eq!(
            scope.classify(&root.join("src/js/base.js")),
            Some(WatchEvent::SourceModified(root.join("src/js/base.js")))
        );
        assert_eq!(
            scope.classify(&root.join("faq.html")),
            Some(WatchEvent::PageModified(root.join("faq.html")))
        );
        assert_eq!(
            scope.classify(&root.join("img/logo.png")),
            Some(WatchEvent::Changed(root.join("img/logo.png")))
        );
        assert_eq!(scope.classify(&root.join("Assets/base.js")), None);
        assert_eq!(scope.classify(&root.join("dist/us/index.html")), None);
        assert_eq!(scope.classify(&root.join(".git/index")), None);
        assert_eq!(scope.classify(Path::new("/elsewhere/a.js")), None);
    }

    #[tokio::test]
    async fn watches_file_changes() {
        let temp = tempdir().unwrap();
        let scope = WatchScope::new(temp.path(), &[]).unwrap();
        let test_file = scope.root().join("index.html");

        // Create the watcher first (so it catches file creation)
        let (watcher, mut rx) = FileWatcher::new(scope).unwrap();

        // Give inotify time to set up
        tokio::time::sleep(Duration::from_millis(100)).await;

        fs::write(&test_file, "<html></html>").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(3), rx.recv()).await;

        // Keep watcher alive until we're done
        drop(watcher);

        assert!(event.is_ok(), "timeout waiting for file watch event");
        assert!(event.unwrap().is_some(), "channel should not be closed");
    }
}
