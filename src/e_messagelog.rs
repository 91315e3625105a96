//! Append-only log of every raw output line of a run.

use crate::e_diagnostics::DiagnosticRef;
use nu_ansi_term::Color;
use serde::Serialize;

/// Color/category of a log row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RowTag {
    Info,
    RawError,
    RawWarning,
    ExtensionEcho,
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRow {
    pub tag: RowTag,
    pub text: String,
    /// The diagnostic this line produced, if any.
    pub diagnostic: Option<DiagnosticRef>,
}

impl LogRow {
    pub fn render(&self, uses_color: bool) -> String {
        if !uses_color {
            return self.text.clone();
        }
        match self.tag {
            RowTag::Info => Color::LightBlue.paint(&self.text).to_string(),
            RowTag::RawError => Color::Red.paint(&self.text).to_string(),
            RowTag::RawWarning => Color::Yellow.paint(&self.text).to_string(),
            RowTag::ExtensionEcho => Color::Purple.paint(&self.text).to_string(),
            RowTag::Plain => self.text.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    rows: Vec<LogRow>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the next appended row will get.
    pub fn next_row(&self) -> usize {
        self.rows.len()
    }

    pub fn append(
        &mut self,
        tag: RowTag,
        text: impl Into<String>,
        diagnostic: Option<DiagnosticRef>,
    ) -> usize {
        self.rows.push(LogRow {
            tag,
            text: text.into(),
            diagnostic,
        });
        self.rows.len() - 1
    }

    pub fn get(&self, row: usize) -> Option<&LogRow> {
        self.rows.get(row)
    }

    pub fn rows(&self) -> &[LogRow] {
        &self.rows
    }

    pub fn last(&self) -> Option<&LogRow> {
        self.rows.last()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }
}
