//! Viewer state and driver.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete viewer state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Driver performing exports, rendering and file watching

mod effects;
mod event_loop;
mod model;
mod update;

pub use model::{ErrorBanner, Model, ViewMode, ZOOM_MAX, ZOOM_MIN, ZOOM_STEP, Zoom};
pub use update::{Message, update};

use std::path::PathBuf;

use crate::compiler::CompileOptions;
use crate::render::{DiagramRenderer, DiagramTheme, MermaidCli};

/// Driver that owns the options of one viewer session.
pub struct App {
    file_path: PathBuf,
    watch_enabled: bool,
    database: Option<String>,
    view_mode: ViewMode,
    output: Option<PathBuf>,
    copy: bool,
    format_json: bool,
    theme: DiagramTheme,
    options: CompileOptions,
    renderer: Box<dyn DiagramRenderer>,
}

impl App {
    /// Create a new viewer for the given schema document.
    pub fn new(file_path: PathBuf) -> Self {
        Self {
            file_path,
            watch_enabled: false,
            database: None,
            view_mode: ViewMode::default(),
            output: None,
            copy: false,
            format_json: false,
            theme: DiagramTheme::default(),
            options: CompileOptions::default(),
            renderer: Box::new(MermaidCli::default()),
        }
    }

    /// Enable or disable file watching.
    #[must_use]
    pub fn with_watch(mut self, enabled: bool) -> Self {
        self.watch_enabled = enabled;
        self
    }

    /// Database to draw instead of the first listed one.
    #[must_use]
    pub fn with_database(mut self, database: Option<String>) -> Self {
        self.database = database;
        self
    }

    #[must_use]
    pub const fn with_view_mode(mut self, mode: ViewMode) -> Self {
        self.view_mode = mode;
        self
    }

    /// Export path. Without one, markup goes to stdout and pictures to a
    /// file named after the database in the current directory.
    #[must_use]
    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    /// Copy the markup to the clipboard after each compile.
    #[must_use]
    pub const fn with_copy(mut self, enabled: bool) -> Self {
        self.copy = enabled;
        self
    }

    /// Pretty-print the document file in place before compiling.
    #[must_use]
    pub const fn with_format_json(mut self, enabled: bool) -> Self {
        self.format_json = enabled;
        self
    }

    #[must_use]
    pub const fn with_theme(mut self, theme: DiagramTheme) -> Self {
        self.theme = theme;
        self
    }

    #[must_use]
    pub const fn with_compile_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the Mermaid CLI renderer.
    #[must_use]
    pub fn with_renderer(mut self, renderer: Box<dyn DiagramRenderer>) -> Self {
        self.renderer = renderer;
        self
    }
}
