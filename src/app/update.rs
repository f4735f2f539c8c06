use crate::app::Model;
use crate::app::model::{ErrorBanner, ViewMode};
use crate::schema;

/// All possible events and actions in the viewer.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    // Document
    /// Source text replaced (edit or reload)
    SourceChanged(String),
    /// Re-indent the source text
    FormatSource,
    /// Watched file changed on disk; the driver reloads it
    FileChanged,

    // Selection
    /// Draw the tables of another database
    SelectDatabase(String),
    /// Show the picture or the markup
    SetViewMode(ViewMode),
    /// Switch between picture and markup
    ToggleViewMode,

    // Zoom and pan
    /// Zoom in one step inside a viewport of the given size
    ZoomIn { width: f64, height: f64 },
    /// Zoom out one step inside a viewport of the given size
    ZoomOut { width: f64, height: f64 },
    /// Drag the picture
    Pan { dx: f64, dy: f64 },
    /// Back to 100% at the origin
    ResetView,

    // Rendering
    /// Renderer produced a picture for the current markup
    Rendered(String),
    /// Renderer rejected the current markup
    RenderFailed(String),

    /// Toggle file watching
    ToggleWatch,
}

/// Pure state transition.
pub fn update(mut model: Model, msg: Message) -> Model {
    match msg {
        Message::SourceChanged(source) => {
            model.source = source;
            model.recompile();
        }
        Message::FormatSource => match schema::format_source(&model.source) {
            Ok(formatted) => {
                model.source = formatted;
                model.recompile();
            }
            Err(err) => tracing::debug!(%err, "format skipped"),
        },
        Message::FileChanged => {}
        Message::SelectDatabase(id) => {
            model.selected_database = Some(id);
            model.recompile();
        }
        Message::SetViewMode(mode) => model.view_mode = mode,
        Message::ToggleViewMode => model.view_mode = model.view_mode.toggled(),
        Message::ZoomIn { width, height } => model.zoom.zoom_in(width, height),
        Message::ZoomOut { width, height } => model.zoom.zoom_out(width, height),
        Message::Pan { dx, dy } => model.zoom.pan(dx, dy),
        Message::ResetView => model.zoom.reset(),
        Message::Rendered(svg) => {
            model.svg = Some(svg);
            if matches!(model.error, Some(ErrorBanner::RenderFailure(_))) {
                model.error = None;
            }
        }
        Message::RenderFailed(diagnostic) => {
            model.svg = None;
            model.error = Some(ErrorBanner::RenderFailure(diagnostic));
        }
        Message::ToggleWatch => model.watch_enabled = !model.watch_enabled,
    }
    model
}
