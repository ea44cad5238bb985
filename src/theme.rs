//! Persisted dark/light display preference.
//!
//! Constructed once at startup with an injected store; there is no global
//! theme. The renderer receives the resulting [`Palette`] explicitly.

use anyhow::{bail, Context, Result};
use colored::{Color, ColoredString, Colorize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Dark => Palette {
                heading: Color::BrightWhite,
                accent: Color::Cyan,
                muted: Color::BrightBlack,
                ok: Color::Green,
                warn: Color::Yellow,
                fail: Color::Red,
            },
            Theme::Light => Palette {
                heading: Color::Black,
                accent: Color::Blue,
                muted: Color::BrightBlack,
                ok: Color::Green,
                warn: Color::Magenta,
                fail: Color::Red,
            },
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Dark => write!(f, "dark"),
            Theme::Light => write!(f, "light"),
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => bail!("Unknown theme: {other} (expected dark or light)"),
        }
    }
}

/// Colours the renderer uses for each kind of text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub heading: Color,
    pub accent: Color,
    pub muted: Color,
    pub ok: Color,
    pub warn: Color,
    pub fail: Color,
}

impl Palette {
    pub fn heading(&self, s: &str) -> ColoredString {
        s.color(self.heading).bold()
    }

    pub fn accent(&self, s: &str) -> ColoredString {
        s.color(self.accent)
    }

    pub fn muted(&self, s: &str) -> ColoredString {
        s.color(self.muted)
    }
}

impl Default for Palette {
    fn default() -> Self {
        Theme::default().palette()
    }
}

/// Key/value storage for user preferences
pub trait PreferenceStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&self, key: &str, value: &str) -> Result<()>;
}

/// Preferences kept in a small TOML table on disk
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_table(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read preferences: {}", self.path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse preferences: {}", self.path.display()))
    }
}

impl PreferenceStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load_table()?.remove(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        let mut table = self.load_table()?;
        table.insert(key.to_string(), value.to_string());
        let content = toml::to_string_pretty(&table).context("Failed to serialize preferences")?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create preferences directory: {}", parent.display())
            })?;
        }
        std::fs::write(&self.path, content)
            .with_context(|| format!("Failed to write preferences: {}", self.path.display()))
    }
}

#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    values: std::sync::Mutex<BTreeMap<String, String>>,
}

#[cfg(test)]
impl PreferenceStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(crate::controller::lock(&self.values).get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<()> {
        crate::controller::lock(&self.values).insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// The current theme, read once from the store and written back on change.
pub struct ThemePreference {
    store: Box<dyn PreferenceStore>,
    current: Theme,
}

impl ThemePreference {
    /// Read the stored theme. Missing or unrecognised values fall back to dark.
    pub fn load(store: Box<dyn PreferenceStore>) -> Result<Self> {
        let current = match store.read(THEME_KEY)? {
            Some(value) => value.parse().unwrap_or_else(|_| {
                tracing::warn!(%value, "ignoring unknown stored theme");
                Theme::default()
            }),
            None => Theme::default(),
        };
        Ok(Self { store, current })
    }

    pub fn get(&self) -> Theme {
        self.current
    }

    pub fn set(&mut self, theme: Theme) -> Result<()> {
        self.store.write(THEME_KEY, &theme.to_string())?;
        self.current = theme;
        tracing::debug!(%theme, "theme changed");
        Ok(())
    }

    pub fn toggle(&mut self) -> Result<Theme> {
        let next = self.current.toggled();
        self.set(next)?;
        Ok(next)
    }

    pub fn palette(&self) -> Palette {
        self.current.palette()
    }
}
