//! Drives one build run: reset, feed lines, finalize on exit.
//!
//! The controller owns the catalog, both diagnostic trees, the message log
//! and the per-run [`RunState`]. Lines must be delivered one at a time in
//! the order the process produced them; Extension attribution and the
//! directory stack depend on it.

use crate::e_classifier::{classify, LineClassification};
use crate::e_diagnostics::{DiagnosticRecord, DiagnosticRef, DiagnosticTree, NodeId, TreeKind};
use crate::e_dirstack::{absolute_file, resolve_directory, DirectoryStack};
use crate::e_indicator::{IndicatorBudget, DEFAULT_INDICATOR_CAPACITY};
use crate::e_messagelog::{MessageLog, RowTag};
use crate::e_navigation::NavigationCursor;
use crate::e_pattern::{PatternCatalog, PatternKind};
use crate::e_sink::{ConsoleSink, ERROR_INDICATOR, WARNING_INDICATOR};

pub const DEFAULT_ERROR_COLOR: u32 = 0xFF00_00FF;
pub const DEFAULT_WARNING_COLOR: u32 = 0xFFA5_00FF;

/// Behavior switches for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub auto_show_first_error: bool,
    pub auto_show_first_warning: bool,
    pub indicators: bool,
    pub indicator_capacity: usize,
    pub error_color: u32,
    pub warning_color: u32,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            auto_show_first_error: true,
            auto_show_first_warning: false,
            indicators: true,
            indicator_capacity: DEFAULT_INDICATOR_CAPACITY,
            error_color: DEFAULT_ERROR_COLOR,
            warning_color: DEFAULT_WARNING_COLOR,
        }
    }
}

/// Everything scoped to a single run. Reset by [`RunController::start_run`].
#[derive(Debug, Clone, Default)]
pub struct RunState {
    pub first_diagnostic_shown: bool,
    pub last_insertion_target: Option<DiagnosticRef>,
    pub budget: IndicatorBudget,
    pub error_cursor: NavigationCursor,
    pub warning_cursor: NavigationCursor,
    pub directories: DirectoryStack,
}

impl RunState {
    pub fn new(indicator_capacity: usize) -> Self {
        RunState {
            budget: IndicatorBudget::new(indicator_capacity),
            ..Default::default()
        }
    }

    pub fn cursor(&self, tree: TreeKind) -> &NavigationCursor {
        match tree {
            TreeKind::Errors => &self.error_cursor,
            TreeKind::Warnings => &self.warning_cursor,
        }
    }
}

pub struct RunController<S: ConsoleSink> {
    catalog: PatternCatalog,
    options: RunOptions,
    sink: S,
    errors: DiagnosticTree,
    warnings: DiagnosticTree,
    log: MessageLog,
    state: RunState,
    started: bool,
}

impl<S: ConsoleSink> RunController<S> {
    pub fn new(catalog: PatternCatalog, options: RunOptions, sink: S) -> Self {
        RunController {
            catalog,
            state: RunState::new(options.indicator_capacity),
            options,
            sink,
            errors: DiagnosticTree::new(TreeKind::Errors),
            warnings: DiagnosticTree::new(TreeKind::Warnings),
            log: MessageLog::new(),
            started: false,
        }
    }

    pub fn catalog(&self) -> &PatternCatalog {
        &self.catalog
    }

    /// Catalog edits must not happen while a run is streaming lines.
    pub fn catalog_mut(&mut self) -> &mut PatternCatalog {
        &mut self.catalog
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Takes effect at the next [`RunController::start_run`].
    pub fn set_options(&mut self, options: RunOptions) {
        self.options = options;
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn errors(&self) -> &DiagnosticTree {
        &self.errors
    }

    pub fn warnings(&self) -> &DiagnosticTree {
        &self.warnings
    }

    pub fn tree(&self, kind: TreeKind) -> &DiagnosticTree {
        match kind {
            TreeKind::Errors => &self.errors,
            TreeKind::Warnings => &self.warnings,
        }
    }

    pub fn message_log(&self) -> &MessageLog {
        &self.log
    }

    pub fn run_state(&self) -> &RunState {
        &self.state
    }

    /// Record a diagnostic handle points at, if still valid.
    pub fn record(&self, target: DiagnosticRef) -> Option<&DiagnosticRecord> {
        self.tree(target.tree).get(target.node)
    }

    /// Clears every per-run structure. Must precede the first line of a run.
    pub fn start_run(&mut self) {
        self.errors.clear();
        self.warnings.clear();
        self.log.clear();
        self.state = RunState::new(self.options.indicator_capacity);
        self.started = true;
        log::debug!("run started");
        self.sink.counts_changed(0, 0);
    }

    /// Feeds one output line (without its newline). Returns how the line
    /// was classified; `None` when nothing matched or parsing is off.
    pub fn on_line(&mut self, working_directory: &str, raw_line: &str, parse_output: bool) -> PatternKind {
        if !self.started {
            log::error!("output line received before the run was started: {}", raw_line);
            debug_assert!(self.started, "on_line called before start_run");
            return PatternKind::None;
        }
        if !parse_output {
            self.log.append(RowTag::Plain, raw_line, None);
            return PatternKind::None;
        }

        let found = classify(raw_line, &self.catalog);
        let kind = found.kind;
        match kind {
            PatternKind::None => {
                self.log.append(RowTag::Plain, raw_line, None);
            }
            PatternKind::Enter => {
                let announced = if found.file_path.is_empty() {
                    found.directory
                } else {
                    found.file_path
                };
                log::debug!("entering directory {}", announced);
                self.state.directories.push(announced);
                self.log.append(RowTag::Plain, raw_line, None);
            }
            PatternKind::Leave => {
                self.state.directories.pop();
                self.log.append(RowTag::Plain, raw_line, None);
            }
            PatternKind::Error => {
                self.insert_diagnostic(TreeKind::Errors, working_directory, raw_line, found);
            }
            PatternKind::Warning => {
                self.insert_diagnostic(TreeKind::Warnings, working_directory, raw_line, found);
            }
            PatternKind::Extension => {
                self.append_extension(working_directory, raw_line, found);
            }
        }
        kind
    }

    /// Finalizes the run once the process has terminated.
    pub fn on_exit(&mut self, status_code: i32) {
        self.log.append(
            RowTag::Info,
            format!("Process finished with exit code {}", status_code),
            None,
        );
        self.state.error_cursor.initialize(&self.errors);
        self.state.warning_cursor.initialize(&self.warnings);
        if self.state.first_diagnostic_shown {
            return;
        }
        if self.options.auto_show_first_error && !self.errors.is_empty() {
            self.show_first(TreeKind::Errors);
        } else if self.options.auto_show_first_warning && !self.warnings.is_empty() {
            self.show_first(TreeKind::Warnings);
        }
    }

    /// Jumps to the next problem of `tree`. `false` when already at the end.
    pub fn next(&mut self, tree: TreeKind) -> bool {
        let (nodes, cursor) = self.tree_and_cursor(tree);
        match cursor.next(nodes) {
            Some(node) => {
                self.reveal(tree, node);
                true
            }
            None => false,
        }
    }

    /// Jumps to the previous problem of `tree`. `false` when already at the start.
    pub fn previous(&mut self, tree: TreeKind) -> bool {
        let (nodes, cursor) = self.tree_and_cursor(tree);
        match cursor.previous(nodes) {
            Some(node) => {
                self.reveal(tree, node);
                true
            }
            None => false,
        }
    }

    /// Follows a message log row to its diagnostic: moves that tree's cursor
    /// there and reveals it. `false` for rows without a diagnostic.
    pub fn activate_row(&mut self, row: usize) -> bool {
        let Some(target) = self.log.get(row).and_then(|r| r.diagnostic) else {
            return false;
        };
        let (nodes, cursor) = self.tree_and_cursor(target.tree);
        if !cursor.place(nodes, target.node) {
            return false;
        }
        self.reveal(target.tree, target.node);
        true
    }

    fn insert_diagnostic(
        &mut self,
        tree: TreeKind,
        working_directory: &str,
        raw_line: &str,
        found: LineClassification,
    ) {
        let record = self.build_record(working_directory, found);
        let marker_file = (!record.file_path.is_empty())
            .then(|| absolute_file(&record.directory, &record.file_path));
        let marker_line = record.line;

        let (nodes, _) = self.tree_and_cursor(tree);
        let node = nodes.insert_root(record);
        let target = DiagnosticRef { tree, node };
        let tag = match tree {
            TreeKind::Errors => RowTag::RawError,
            TreeKind::Warnings => RowTag::RawWarning,
        };
        self.log.append(tag, raw_line, Some(target));

        if let Some(file) = marker_file {
            if self.options.indicators && self.state.budget.try_consume() {
                let (color, indicator) = match tree {
                    TreeKind::Errors => (self.options.error_color, ERROR_INDICATOR),
                    TreeKind::Warnings => (self.options.warning_color, WARNING_INDICATOR),
                };
                self.sink
                    .place_indicator(&file.to_string_lossy(), marker_line, color, indicator);
            } else if self.options.indicators {
                log::debug!("indicator budget exhausted, no marker for {}", file.display());
            }
        }

        self.state.last_insertion_target = Some(target);
        let (nodes, cursor) = self.tree_and_cursor(tree);
        cursor.initialize(nodes);
        self.sink.counts_changed(self.errors.count(), self.warnings.count());

        if !self.state.first_diagnostic_shown {
            let wanted = match tree {
                TreeKind::Errors => self.options.auto_show_first_error,
                TreeKind::Warnings => self.options.auto_show_first_warning,
            };
            if wanted {
                self.show_first(tree);
            }
        }
    }

    fn append_extension(&mut self, working_directory: &str, raw_line: &str, found: LineClassification) {
        let Some(parent) = self.state.last_insertion_target else {
            log::debug!("continuation without a preceding diagnostic: {}", raw_line);
            self.log.append(RowTag::Plain, raw_line, None);
            return;
        };
        let record = self.build_record(working_directory, found);
        let (nodes, _) = self.tree_and_cursor(parent.tree);
        match nodes.append_child(parent.node, record) {
            Some(child) => {
                let target = DiagnosticRef {
                    tree: parent.tree,
                    node: child,
                };
                self.log.append(RowTag::ExtensionEcho, raw_line, Some(target));
            }
            None => {
                self.log.append(RowTag::Plain, raw_line, None);
            }
        }
    }

    fn build_record(&self, working_directory: &str, found: LineClassification) -> DiagnosticRecord {
        let announced = if found.directory.is_empty() {
            self.state.directories.top()
        } else {
            Some(found.directory.as_str())
        };
        DiagnosticRecord {
            source_row: Some(self.log.next_row()),
            directory: resolve_directory(working_directory, announced),
            file_path: found.file_path,
            line: found.line_number,
            column: found.column_number,
            message: found.message,
        }
    }

    fn show_first(&mut self, tree: TreeKind) {
        let (nodes, cursor) = self.tree_and_cursor(tree);
        cursor.initialize(nodes);
        if let Some(node) = cursor.current() {
            self.reveal(tree, node);
            self.state.first_diagnostic_shown = true;
        }
    }

    fn reveal(&mut self, tree: TreeKind, node: NodeId) {
        let Some(record) = self.tree(tree).get(node).cloned() else {
            return;
        };
        self.sink.reveal_tab(tree);
        if let Some(row) = record.source_row {
            self.sink.scroll_to_row(row);
        }
        self.sink
            .reveal_source(&record.directory, &record.file_path, record.line, record.column);
    }

    fn tree_and_cursor(&mut self, tree: TreeKind) -> (&mut DiagnosticTree, &mut NavigationCursor) {
        match tree {
            TreeKind::Errors => (&mut self.errors, &mut self.state.error_cursor),
            TreeKind::Warnings => (&mut self.warnings, &mut self.state.warning_cursor),
        }
    }
}
