use std::io::{Write, stdout};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::app::{App, ErrorBanner, Message, Model, ViewMode, update};
use crate::compiler::DiagramMarkup;
use crate::export::{copy_to_clipboard, write_export};
use crate::watcher::FileWatcher;

impl App {
    pub(super) fn make_file_watcher(&self) -> notify::Result<FileWatcher> {
        FileWatcher::new(&self.file_path, Duration::from_millis(200))
    }

    /// Read the document and build the initial model.
    pub(super) fn load_model(&self) -> Result<Model> {
        let source = std::fs::read_to_string(&self.file_path)
            .with_context(|| format!("Failed to read {}", self.file_path.display()))?;
        let mut model = Model::new(self.file_path.clone(), source, self.options);
        model = update(model, Message::SetViewMode(self.view_mode));
        if model.watch_enabled != self.watch_enabled {
            model = update(model, Message::ToggleWatch);
        }

        if let Some(id) = &self.database {
            model = update(model, Message::SelectDatabase(id.clone()));
            if model.selected_database.as_deref() != Some(id.as_str()) {
                tracing::warn!(requested = %id, selected = ?model.selected_database, "database not listed");
                eprintln!(
                    "[warn] Database {id} is not listed; showing {}",
                    model.selected_database.as_deref().unwrap_or("nothing")
                );
            }
        }

        if self.format_json {
            model = self.format_file(model)?;
        }
        Ok(model)
    }

    /// Pretty-print the document and write it back when it changed.
    pub(super) fn format_file(&self, model: Model) -> Result<Model> {
        let before = model.source.clone();
        let model = update(model, Message::FormatSource);
        if model.source != before {
            std::fs::write(&self.file_path, &model.source)
                .with_context(|| format!("Failed to write {}", self.file_path.display()))?;
            tracing::info!(path = %self.file_path.display(), "formatted document");
        }
        Ok(model)
    }

    /// Reload the document after a change on disk.
    pub(super) fn reload_from_disk(&self, model: Model) -> Result<Model> {
        let source = match std::fs::read_to_string(&self.file_path) {
            Ok(source) => source,
            Err(err) => {
                eprintln!("[warn] Reload failed: {err}");
                tracing::warn!(path = %self.file_path.display(), %err, "reload failed");
                return Ok(model);
            }
        };
        if source == model.source {
            return Ok(model);
        }
        let model = update(model, Message::SourceChanged(source));
        let model = self.publish(model)?;
        Self::report(&model);
        Ok(model)
    }

    /// Render and export the current markup.
    ///
    /// Invalid documents and renderer failures become error banners on the
    /// model; only export I/O failures are returned as errors.
    pub(super) fn publish(&self, mut model: Model) -> Result<Model> {
        if matches!(model.error, Some(ErrorBanner::InvalidDocument(_))) {
            return Ok(model);
        }
        let Some(markup) = model.markup.clone().map(DiagramMarkup::into_string) else {
            return Ok(model);
        };

        if self.copy {
            match copy_to_clipboard(&markup) {
                Ok(()) => tracing::info!("copied markup to clipboard"),
                Err(err) => eprintln!("[warn] Copy failed: {err}"),
            }
        }

        match model.view_mode {
            ViewMode::Source => match &self.output {
                Some(path) => write_export(path, &markup)?,
                None => {
                    let mut out = stdout().lock();
                    out.write_all(markup.as_bytes())?;
                    out.flush()?;
                }
            },
            ViewMode::Diagram => {
                if model.svg.is_none() {
                    model = match self.renderer.render_svg(&markup, self.theme) {
                        Ok(svg) => update(model, Message::Rendered(svg)),
                        Err(err) => update(model, Message::RenderFailed(err.to_string())),
                    };
                }
                if let Some(svg) = &model.svg {
                    let path = self
                        .output
                        .clone()
                        .unwrap_or_else(|| PathBuf::from(model.export_file_name()));
                    write_export(&path, svg)?;
                    eprintln!("Wrote {}", path.display());
                }
            }
        }
        Ok(model)
    }

    /// Surface the model's error banner, or log what was compiled.
    pub(super) fn report(model: &Model) {
        match &model.error {
            Some(banner) => eprintln!("Error: {}", banner.message()),
            None => {
                if let Some(markup) = &model.markup {
                    tracing::info!(
                        database = model.selected_database.as_deref().unwrap_or("<none>"),
                        entities = markup.entity_count(),
                        relationships = markup.relationship_count(),
                        "diagram updated"
                    );
                }
            }
        }
    }
}
