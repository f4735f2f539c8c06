use std::path::PathBuf;

use crate::compiler::{CompileOptions, DiagramMarkup, compile_document};
use crate::schema::{self, Database};

/// Zoom limits and step, in percent.
pub const ZOOM_MIN: u16 = 10;
pub const ZOOM_MAX: u16 = 400;
pub const ZOOM_STEP: u16 = 10;

/// Share of the viewport size the picture shifts per zoom step, so zooming
/// stays roughly centered.
const ZOOM_PAN_FACTOR: f64 = 0.05;

/// Which output the viewer shows and exports.
#[derive(clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    /// The rendered picture (exported as `.svg`).
    Diagram,
    /// The diagram markup text (exported as `.mmd`).
    #[default]
    Source,
}

impl ViewMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Diagram => "diagram",
            Self::Source => "source",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "diagram" => Some(Self::Diagram),
            "source" => Some(Self::Source),
            _ => None,
        }
    }

    /// File extension used when exporting this view.
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Diagram => "svg",
            Self::Source => "mmd",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Diagram => Self::Source,
            Self::Source => Self::Diagram,
        }
    }
}

/// The error shown instead of (or over) the last good output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorBanner {
    /// The source text is not valid JSON.
    InvalidDocument(String),
    /// The renderer rejected the markup.
    RenderFailure(String),
}

impl ErrorBanner {
    pub fn message(&self) -> &str {
        match self {
            Self::InvalidDocument(message) | Self::RenderFailure(message) => message,
        }
    }
}

/// Zoom and pan of the rendered picture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Zoom {
    scale_percent: u16,
    x: f64,
    y: f64,
}

impl Default for Zoom {
    fn default() -> Self {
        Self {
            scale_percent: 100,
            x: 0.0,
            y: 0.0,
        }
    }
}

impl Zoom {
    pub const fn scale_percent(&self) -> u16 {
        self.scale_percent
    }

    pub fn scale(&self) -> f64 {
        f64::from(self.scale_percent) / 100.0
    }

    pub const fn offset(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Zoom in one step, shifting so the view stays centered in a
    /// `width` x `height` viewport. No-op at the maximum.
    pub fn zoom_in(&mut self, width: f64, height: f64) {
        if self.scale_percent >= ZOOM_MAX {
            return;
        }
        self.scale_percent = (self.scale_percent + ZOOM_STEP).min(ZOOM_MAX);
        self.x -= width * ZOOM_PAN_FACTOR;
        self.y -= height * ZOOM_PAN_FACTOR;
    }

    /// Zoom out one step. No-op at the minimum.
    pub fn zoom_out(&mut self, width: f64, height: f64) {
        if self.scale_percent <= ZOOM_MIN {
            return;
        }
        self.scale_percent = self.scale_percent.saturating_sub(ZOOM_STEP).max(ZOOM_MIN);
        self.x += width * ZOOM_PAN_FACTOR;
        self.y += height * ZOOM_PAN_FACTOR;
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// CSS transform placing the picture, e.g. `translate(0px, 0px) scale(1)`.
    pub fn transform(&self) -> String {
        format!("translate({}px, {}px) scale({})", self.x, self.y, self.scale())
    }
}

/// The complete viewer state.
///
/// All state lives here; [`super::update`] derives the next state and the
/// [`super::App`] performs the side effects it implies.
#[derive(Debug, Clone)]
pub struct Model {
    /// Path of the schema document on disk
    pub file_path: PathBuf,
    /// Raw document text as last read or formatted
    pub source: String,
    /// Databases listed by the last parseable document
    pub databases: Vec<Database>,
    /// Database whose tables are drawn
    pub selected_database: Option<String>,
    pub view_mode: ViewMode,
    pub options: CompileOptions,
    /// Last successfully compiled markup; kept while the source is invalid
    pub markup: Option<DiagramMarkup>,
    /// Rendered picture of `markup`, if any
    pub svg: Option<String>,
    pub error: Option<ErrorBanner>,
    pub zoom: Zoom,
    pub watch_enabled: bool,
}

impl Model {
    /// Create a model for `source` and compile it.
    pub fn new(file_path: PathBuf, source: String, options: CompileOptions) -> Self {
        let mut model = Self {
            file_path,
            source,
            databases: Vec::new(),
            selected_database: None,
            view_mode: ViewMode::default(),
            options,
            markup: None,
            svg: None,
            error: None,
            zoom: Zoom::default(),
            watch_enabled: false,
        };
        model.recompile();
        model
    }

    /// The selected database, when it is listed in the document.
    pub fn selected(&self) -> Option<&Database> {
        self.selected_database
            .as_deref()
            .and_then(|id| self.databases.iter().find(|db| db.id == id))
    }

    /// Export file name without extension: `<name> (<id>)` for a listed
    /// database, `diagram` otherwise.
    pub fn export_stem(&self) -> String {
        self.selected()
            .map_or_else(|| "diagram".to_string(), |db| format!("{} ({})", db.name, db.id))
    }

    /// Export file name for the current view mode.
    pub fn export_file_name(&self) -> String {
        format!("{}.{}", self.export_stem(), self.view_mode.extension())
    }

    pub fn markup_text(&self) -> Option<&str> {
        self.markup.as_ref().map(DiagramMarkup::as_str)
    }

    /// Re-derive databases, selection and markup from `source`.
    ///
    /// Invalid JSON sets an error banner and leaves the previous markup in place.
    pub(super) fn recompile(&mut self) {
        let document = match schema::parse(&self.source) {
            Ok(document) => document,
            Err(err) => {
                tracing::debug!(%err, "source is not valid JSON");
                self.error = Some(ErrorBanner::InvalidDocument(err.to_string()));
                return;
            }
        };

        self.databases = document.databases.clone();
        self.reconcile_selection();

        let markup = compile_document(&document, self.selected_database.as_deref(), &self.options);
        if self.markup.as_ref() != Some(&markup) {
            self.svg = None;
        }
        self.markup = Some(markup);
        self.error = None;
    }

    /// Select the first database when nothing listed is selected.
    ///
    /// A selection is kept when the document lists no databases at all, so an
    /// explicitly requested id still filters tables.
    fn reconcile_selection(&mut self) {
        let keep = self.selected_database.as_deref().is_some_and(|id| {
            self.databases.is_empty() || self.databases.iter().any(|db| db.id == id)
        });
        if !keep {
            self.selected_database = self.databases.first().map(|db| db.id.clone());
        }
    }
}
