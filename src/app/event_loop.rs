use std::time::Duration;

use anyhow::{Context, Result};

use crate::app::{App, Message, Model, update};

/// How often the watch loop polls for file changes.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

impl App {
    /// Compile, export, and keep doing so on file changes when watching.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read, an export cannot be
    /// written, the watcher cannot start, or (without `--watch`) the document
    /// does not compile or render.
    pub fn run(&self) -> Result<()> {
        let model = self.load_model()?;
        let model = self.publish(model)?;

        if !model.watch_enabled {
            if let Some(banner) = &model.error {
                anyhow::bail!("{}", banner.message());
            }
            Self::report(&model);
            return Ok(());
        }
        Self::report(&model);
        self.watch(model)
    }

    fn watch(&self, mut model: Model) -> Result<()> {
        let mut watcher = self
            .make_file_watcher()
            .with_context(|| format!("Failed to watch {}", self.file_path.display()))?;
        eprintln!(
            "Watching {} (Ctrl-C to stop)",
            watcher.target_path().display()
        );

        loop {
            if watcher.take_change_ready() {
                model = update(model, Message::FileChanged);
                model = self.reload_from_disk(model)?;
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}
