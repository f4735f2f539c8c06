//! Diagram rendering through an external Mermaid renderer.
//!
//! Layout and drawing are not done in-process. A [`DiagramRenderer`] takes
//! complete markup and returns SVG text; [`MermaidCli`] implements it by
//! running the Mermaid CLI (`mmdc`).

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Environment variable naming the Mermaid CLI binary.
pub const MMDC_ENV: &str = "APPWRITE_ERD_MMDC";

/// Mermaid theme used for the rendered picture.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DiagramTheme {
    #[default]
    Light,
    Dark,
}

impl DiagramTheme {
    /// Mermaid's name for this theme.
    pub const fn mermaid_name(self) -> &'static str {
        match self {
            Self::Light => "default",
            Self::Dark => "dark",
        }
    }
}

/// Errors from the rendering step.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to render diagram: {diagnostic}")]
    Failed { diagnostic: String },
    #[error("Renderer I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Turns diagram markup into an SVG picture.
pub trait DiagramRenderer {
    /// Render `markup` to SVG text.
    ///
    /// # Errors
    ///
    /// Returns a [`RenderError`] when the renderer cannot run or rejects the markup.
    fn render_svg(&self, markup: &str, theme: DiagramTheme) -> Result<String, RenderError>;
}

/// Renders with the Mermaid CLI (`npm i -g @mermaid-js/mermaid-cli`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MermaidCli {
    program: OsString,
    leading_args: Vec<OsString>,
}

impl Default for MermaidCli {
    fn default() -> Self {
        Self::new(std::env::var_os(MMDC_ENV).unwrap_or_else(|| OsString::from("mmdc")))
    }
}

impl MermaidCli {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
        }
    }

    /// Arguments placed before the renderer options, e.g. for
    /// `npx -y @mermaid-js/mermaid-cli`.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.leading_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Use `program` when given, otherwise the environment or `mmdc` on `PATH`.
    pub fn from_override(program: Option<PathBuf>) -> Self {
        program.map_or_else(Self::default, Self::new)
    }

    pub fn program(&self) -> &OsString {
        &self.program
    }
}

impl DiagramRenderer for MermaidCli {
    fn render_svg(&self, markup: &str, theme: DiagramTheme) -> Result<String, RenderError> {
        let scratch = tempfile::tempdir()?;
        let input = scratch.path().join("diagram.mmd");
        let output = scratch.path().join("diagram.svg");
        std::fs::write(&input, markup)?;

        tracing::debug!(program = ?self.program, theme = theme.mermaid_name(), "running mermaid cli");
        let result = Command::new(&self.program)
            .args(&self.leading_args)
            .arg("--input")
            .arg(&input)
            .arg("--output")
            .arg(&output)
            .args(["--theme", theme.mermaid_name(), "--backgroundColor", "transparent"])
            .arg("--quiet")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| RenderError::Launch {
                program: self.program.to_string_lossy().into_owned(),
                source,
            })?;

        if !result.status.success() {
            return Err(RenderError::Failed {
                diagnostic: diagnostic_from(&result.stderr, &result.stdout, result.status.code()),
            });
        }

        Ok(std::fs::read_to_string(&output)?)
    }
}

/// Pick the most useful text out of a failed renderer run.
fn diagnostic_from(stderr: &[u8], stdout: &[u8], code: Option<i32>) -> String {
    let stderr = String::from_utf8_lossy(stderr);
    let stdout = String::from_utf8_lossy(stdout);
    let text = if stderr.trim().is_empty() {
        stdout.trim()
    } else {
        stderr.trim()
    };
    if text.is_empty() {
        code.map_or_else(
            || "renderer terminated by signal".to_string(),
            |code| format!("renderer exited with status {code}"),
        )
    } else {
        text.to_string()
    }
}
