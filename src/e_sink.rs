//! Requests the console makes to whatever surrounds it: an editor, a tab
//! bar, a terminal. Every method defaults to doing nothing.

use crate::e_diagnostics::TreeKind;

/// Indicator slot used for error markers.
pub const ERROR_INDICATOR: usize = 0;
/// Indicator slot used for warning markers.
pub const WARNING_INDICATOR: usize = 1;

pub trait ConsoleSink {
    /// Place a gutter marker on `line` of `file_path`.
    fn place_indicator(&mut self, _file_path: &str, _line: u32, _color_rgba: u32, _indicator: usize) {}

    /// Open `file_path` (relative to `directory`) at `line`/`column`.
    fn reveal_source(&mut self, _directory: &str, _file_path: &str, _line: u32, _column: u32) {}

    /// Bring the Errors or Warnings tab to front.
    fn reveal_tab(&mut self, _tree: TreeKind) {}

    /// Scroll the message log to `row`.
    fn scroll_to_row(&mut self, _row: usize) {}

    /// Error/warning counts changed, refresh tab labels.
    fn counts_changed(&mut self, _errors: usize, _warnings: usize) {}
}

/// Sink for a terminal run: there is no editor, so requests are logged.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalSink;

impl ConsoleSink for TerminalSink {
    fn place_indicator(&mut self, file_path: &str, line: u32, color_rgba: u32, indicator: usize) {
        log::info!(
            "indicator {} at {}:{} (#{:08x})",
            indicator,
            file_path,
            line,
            color_rgba
        );
    }

    fn reveal_source(&mut self, directory: &str, file_path: &str, line: u32, column: u32) {
        log::info!("reveal {} in {} at {}:{}", file_path, directory, line, column);
    }

    fn reveal_tab(&mut self, tree: TreeKind) {
        log::debug!("reveal {} tab", tree);
    }

    fn counts_changed(&mut self, errors: usize, warnings: usize) {
        log::trace!("{} error(s), {} warning(s)", errors, warnings);
    }
}

/// Sink that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ConsoleSink for NullSink {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    PlaceIndicator {
        file_path: String,
        line: u32,
        color_rgba: u32,
        indicator: usize,
    },
    RevealSource {
        directory: String,
        file_path: String,
        line: u32,
        column: u32,
    },
    RevealTab(TreeKind),
    ScrollToRow(usize),
    CountsChanged {
        errors: usize,
        warnings: usize,
    },
}

/// Keeps every request, in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub events: Vec<SinkEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn indicator_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, SinkEvent::PlaceIndicator { .. }))
            .count()
    }

    pub fn reveals(&self) -> Vec<&SinkEvent> {
        self.events
            .iter()
            .filter(|e| matches!(e, SinkEvent::RevealSource { .. }))
            .collect()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl ConsoleSink for RecordingSink {
    fn place_indicator(&mut self, file_path: &str, line: u32, color_rgba: u32, indicator: usize) {
        self.events.push(SinkEvent::PlaceIndicator {
            file_path: file_path.to_string(),
            line,
            color_rgba,
            indicator,
        });
    }

    fn reveal_source(&mut self, directory: &str, file_path: &str, line: u32, column: u32) {
        self.events.push(SinkEvent::RevealSource {
            directory: directory.to_string(),
            file_path: file_path.to_string(),
            line,
            column,
        });
    }

    fn reveal_tab(&mut self, tree: TreeKind) {
        self.events.push(SinkEvent::RevealTab(tree));
    }

    fn scroll_to_row(&mut self, row: usize) {
        self.events.push(SinkEvent::ScrollToRow(row));
    }

    fn counts_changed(&mut self, errors: usize, warnings: usize) {
        self.events.push(SinkEvent::CountsChanged { errors, warnings });
    }
}
