//! TOML configuration: run options, user patterns and project fallbacks.
//!
//! ```toml
//! auto_show_first_error = true
//! indicator_capacity = 16
//! patterns = ['c:mycc:Error:^(?P<filePath>\S+)\:(?P<lineNumber>\d+)\: (?P<message>.*)$']
//!
//! [project]
//! error = '^(\S+):(\d+):(\d+): E (.*)$'
//! ```

use crate::e_indicator::DEFAULT_INDICATOR_CAPACITY;
use crate::e_pattern::{Pattern, PatternCatalog, PatternKind};
use crate::e_runcontroller::{RunOptions, DEFAULT_ERROR_COLOR, DEFAULT_WARNING_COLOR};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub parse_output: bool,
    pub auto_show_first_error: bool,
    pub auto_show_first_warning: bool,
    pub indicators: bool,
    pub indicator_capacity: usize,
    pub error_color: u32,
    pub warning_color: u32,
    /// User patterns, one `language:group:type:regex` line each.
    pub patterns: Vec<String>,
    pub project: ProjectConfig,
}

/// Project fallback expressions, positional captures only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        let options = RunOptions::default();
        ConsoleConfig {
            parse_output: true,
            auto_show_first_error: options.auto_show_first_error,
            auto_show_first_warning: options.auto_show_first_warning,
            indicators: options.indicators,
            indicator_capacity: DEFAULT_INDICATOR_CAPACITY,
            error_color: DEFAULT_ERROR_COLOR,
            warning_color: DEFAULT_WARNING_COLOR,
            patterns: Vec::new(),
            project: ProjectConfig::default(),
        }
    }
}

impl ConsoleConfig {
    /// Loads `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            auto_show_first_error: self.auto_show_first_error,
            auto_show_first_warning: self.auto_show_first_warning,
            indicators: self.indicators,
            indicator_capacity: self.indicator_capacity,
            error_color: self.error_color,
            warning_color: self.warning_color,
        }
    }

    /// Builtin patterns, then the configured user patterns, then the
    /// project fallbacks.
    pub fn build_catalog(&self) -> PatternCatalog {
        let mut catalog = PatternCatalog::with_builtins();
        add_pattern_lines(&mut catalog, self.patterns.iter().map(String::as_str));
        catalog.set_project_error(self.project.error.as_deref());
        catalog.set_project_warning(self.project.warning.as_deref());
        catalog
    }
}

/// Adds every valid, not yet present pattern line to `catalog`. Blank lines
/// and `#` comments are ignored; bad lines are logged and skipped.
/// Returns how many patterns were added.
pub fn add_pattern_lines<'a>(
    catalog: &mut PatternCatalog,
    lines: impl IntoIterator<Item = &'a str>,
) -> usize {
    let mut added = 0;
    for line in lines {
        let trimmed = line.trim_end_matches('\r');
        if trimmed.trim().is_empty() || trimmed.trim_start().starts_with('#') {
            continue;
        }
        match Pattern::from_line(trimmed) {
            Ok(pattern) if pattern.kind() == PatternKind::None => {
                log::warn!("ignoring pattern without a type: {}", trimmed);
            }
            Ok(pattern) => {
                if catalog.add_unique(pattern) {
                    added += 1;
                }
            }
            Err(e) => log::warn!("ignoring pattern line: {:#}", e),
        }
    }
    added
}

/// Reads a file of pattern lines into `catalog`.
pub fn load_pattern_file(catalog: &mut PatternCatalog, path: &Path) -> Result<usize> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read pattern file {}", path.display()))?;
    Ok(add_pattern_lines(catalog, text.lines()))
}
