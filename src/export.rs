//! Exporting diagrams: file output and clipboard copy.

use std::io::{Write, stderr};
use std::path::Path;

use anyhow::{Context, Result};
use base64::Engine;

/// Write exported bytes to `path`, creating parent directories.
///
/// # Errors
///
/// Returns an error if the directory or the file cannot be written.
pub fn write_export(path: &Path, bytes: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}

/// Copy text to the system clipboard.
///
/// Uses `pbcopy` on macOS and falls back to an OSC 52 escape sequence,
/// written to stderr, which most terminal emulators forward to the clipboard.
///
/// # Errors
///
/// Returns an error if neither mechanism could be used.
pub fn copy_to_clipboard(text: &str) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    {
        if copy_to_pbcopy(text).is_ok() {
            return Ok(());
        }
    }
    copy_to_clipboard_osc52(text)
}

#[cfg(target_os = "macos")]
fn copy_to_pbcopy(text: &str) -> std::io::Result<()> {
    use std::process::{Command, Stdio};

    let mut child = Command::new("pbcopy").stdin(Stdio::piped()).spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes())?;
    }
    let status = child.wait()?;
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other("pbcopy failed"))
    }
}

fn copy_to_clipboard_osc52(text: &str) -> std::io::Result<()> {
    // stderr so the sequence never mixes into markup printed on stdout
    let osc = osc52_sequence(text);
    let mut out = stderr();
    out.write_all(osc.as_bytes())?;
    out.flush()
}

/// OSC 52 "set clipboard" sequence for `text`.
pub fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x07")
}
