// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. render::RenderError)
    clippy::module_name_repetitions
)]

//! # Appwrite ERD
//!
//! Entity-relationship diagrams from an Appwrite `appwrite.config.json`.
//!
//! The core is [`compiler::compile`], a pure function turning the JSON
//! document and a selected database id into Mermaid `erDiagram` markup:
//!
//! ```
//! let raw = r#"{
//!     "tablesDB": [{"$id": "todo", "name": "To Do", "enabled": true}],
//!     "tables": [{"$id": "lists", "databaseId": "todo", "name": "Lists",
//!                 "columns": [{"key": "name", "type": "string", "required": true}]}]
//! }"#;
//! let markup = appwrite_erd::compiler::compile(raw, Some("todo")).unwrap();
//! assert!(markup.as_str().starts_with("erDiagram\n    Lists {\n"));
//! ```
//!
//! ## Architecture
//!
//! The viewer uses The Elm Architecture (TEA) pattern:
//! - **Model**: Selected database, view mode, zoom, last good markup
//! - **Message**: Edits, selection changes, render results
//! - **Update**: Pure state transitions
//! - **Effects**: Rendering, exports, clipboard, file watching
//!
//! ## Modules
//!
//! - [`schema`]: Appwrite document model and lenient parsing
//! - [`diagram`]: Mermaid ER diagram model and serialization
//! - [`compiler`]: Schema-to-diagram compilation
//! - [`render`]: External Mermaid renderer
//! - [`app`]: Viewer state and driver
//! - [`export`]: File export and clipboard
//! - [`config`]: Saved CLI defaults
//! - [`watcher`]: File watching

pub mod app;
pub mod compiler;
pub mod config;
pub mod diagram;
pub mod export;
pub mod render;
pub mod schema;
pub mod watcher;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model, ViewMode};
    pub use crate::compiler::{CompileError, CompileOptions, DiagramMarkup, compile};
    pub use crate::schema::SchemaDocument;
}
