use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::app::ViewMode;
use crate::render::DiagramTheme;

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    Auto,
    Light,
    Dark,
}

impl ThemeMode {
    /// Mermaid theme for this mode. `Auto` follows `COLORFGBG` when the
    /// terminal sets it and is light otherwise.
    pub fn diagram_theme(self) -> DiagramTheme {
        match self {
            Self::Light => DiagramTheme::Light,
            Self::Dark => DiagramTheme::Dark,
            Self::Auto => std::env::var("COLORFGBG")
                .ok()
                .and_then(|value| theme_from_colorfgbg(&value))
                .unwrap_or_default(),
        }
    }
}

/// `COLORFGBG` is `fg;bg` (sometimes `fg;default;bg`); backgrounds 0-6 and 8 are dark.
fn theme_from_colorfgbg(value: &str) -> Option<DiagramTheme> {
    let bg: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    Some(if bg <= 6 || bg == 8 {
        DiagramTheme::Dark
    } else {
        DiagramTheme::Light
    })
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigFlags {
    pub watch: bool,
    pub optional_ends: bool,
    pub theme: Option<ThemeMode>,
    pub view: Option<ViewMode>,
    pub mmdc: Option<PathBuf>,
}

impl ConfigFlags {
    pub fn union(&self, other: &Self) -> Self {
        Self {
            watch: self.watch || other.watch,
            optional_ends: self.optional_ends || other.optional_ends,
            theme: other.theme.or(self.theme),
            view: other.view.or(self.view),
            mmdc: other.mmdc.clone().or_else(|| self.mmdc.clone()),
        }
    }
}

pub fn global_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("appwrite-erd").join("config");
        }
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("appwrite-erd")
                .join("config");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("appwrite-erd").join("config");
        }
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home)
                .join(".config")
                .join("appwrite-erd")
                .join("config");
        }
    }

    PathBuf::from(".appwrite-erdrc")
}

pub fn local_override_path() -> PathBuf {
    PathBuf::from(".appwrite-erdrc")
}

pub fn load_config_flags(path: &Path) -> Result<ConfigFlags> {
    if !path.exists() {
        return Ok(ConfigFlags::default());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let tokens = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .flat_map(|line| line.split_whitespace().map(ToOwned::to_owned))
        .collect::<Vec<_>>();
    Ok(parse_flag_tokens(&tokens))
}

pub fn save_config_flags(path: &Path, flags: &ConfigFlags) -> Result<()> {
    let mut lines = Vec::new();
    lines.push("# appwrite-erd defaults (saved with --save)".to_string());
    if flags.watch {
        lines.push("--watch".to_string());
    }
    if flags.optional_ends {
        lines.push("--optional-ends".to_string());
    }
    if let Some(theme) = flags.theme {
        let theme_str = match theme {
            ThemeMode::Auto => "auto",
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        };
        lines.push(format!("--theme {theme_str}"));
    }
    if let Some(view) = flags.view {
        lines.push(format!("--view {}", view.as_str()));
    }
    if let Some(path) = &flags.mmdc {
        lines.push(format!("--mmdc {}", path.display()));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, format!("{}\n", lines.join("\n")))
        .with_context(|| format!("Failed to write config {}", path.display()))
}

pub fn clear_config_flags(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
    }
    Ok(())
}

pub fn parse_flag_tokens(tokens: &[String]) -> ConfigFlags {
    let mut flags = ConfigFlags::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if token == "--watch" || token == "-w" {
            flags.watch = true;
        } else if token == "--optional-ends" {
            flags.optional_ends = true;
        } else if token == "--theme" {
            if let Some(next) = tokens.get(i + 1) {
                flags.theme = parse_theme(next);
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--theme=") {
            flags.theme = parse_theme(value);
        } else if token == "--view" {
            if let Some(next) = tokens.get(i + 1) {
                flags.view = ViewMode::parse(next);
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--view=") {
            flags.view = ViewMode::parse(value);
        } else if token == "--mmdc" {
            if let Some(next) = tokens.get(i + 1) {
                flags.mmdc = Some(PathBuf::from(next));
                i += 1;
            }
        } else if let Some(value) = token.strip_prefix("--mmdc=") {
            flags.mmdc = Some(PathBuf::from(value));
        }
        i += 1;
    }
    flags
}

fn parse_theme(s: &str) -> Option<ThemeMode> {
    match s {
        "auto" => Some(ThemeMode::Auto),
        "light" => Some(ThemeMode::Light),
        "dark" => Some(ThemeMode::Dark),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_parse_flag_tokens_extracts_known_flags() {
        let args = vec![
            "appwrite-erd".to_string(),
            "--watch".to_string(),
            "--optional-ends".to_string(),
            "--theme".to_string(),
            "dark".to_string(),
            "--view=diagram".to_string(),
            "--mmdc".to_string(),
            "/usr/local/bin/mmdc".to_string(),
            "appwrite.config.json".to_string(),
        ];
        let flags = parse_flag_tokens(&args);
        assert!(flags.watch);
        assert!(flags.optional_ends);
        assert_eq!(flags.theme, Some(ThemeMode::Dark));
        assert_eq!(flags.view, Some(ViewMode::Diagram));
        assert_eq!(flags.mmdc, Some(PathBuf::from("/usr/local/bin/mmdc")));
    }

    #[test]
    fn test_parse_flag_tokens_ignores_unpersisted_flags() {
        let args = vec![
            "--database".to_string(),
            "todo".to_string(),
            "--copy".to_string(),
        ];
        assert_eq!(parse_flag_tokens(&args), ConfigFlags::default());
    }

    #[test]
    fn test_config_union_merges_cli_over_file_for_options() {
        let file = ConfigFlags {
            watch: true,
            theme: Some(ThemeMode::Light),
            view: Some(ViewMode::Source),
            ..ConfigFlags::default()
        };
        let cli = ConfigFlags {
            optional_ends: true,
            theme: Some(ThemeMode::Dark),
            ..ConfigFlags::default()
        };
        let merged = file.union(&cli);
        assert!(merged.watch);
        assert!(merged.optional_ends);
        assert_eq!(merged.theme, Some(ThemeMode::Dark));
        assert_eq!(merged.view, Some(ViewMode::Source));
    }

    #[test]
    fn test_save_load_and_clear_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".appwrite-erdrc");
        let flags = ConfigFlags {
            watch: true,
            optional_ends: true,
            theme: Some(ThemeMode::Dark),
            view: Some(ViewMode::Diagram),
            mmdc: Some(PathBuf::from("mmdc-local")),
        };

        save_config_flags(&path, &flags).unwrap();
        let loaded = load_config_flags(&path).unwrap();
        assert_eq!(loaded, flags);

        clear_config_flags(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_colorfgbg_background_detection() {
        assert_eq!(theme_from_colorfgbg("15;0"), Some(DiagramTheme::Dark));
        assert_eq!(theme_from_colorfgbg("0;default;15"), Some(DiagramTheme::Light));
        assert_eq!(theme_from_colorfgbg("garbage"), None);
    }

    #[test]
    fn test_explicit_theme_modes() {
        assert_eq!(ThemeMode::Light.diagram_theme(), DiagramTheme::Light);
        assert_eq!(ThemeMode::Dark.diagram_theme(), DiagramTheme::Dark);
    }
}
