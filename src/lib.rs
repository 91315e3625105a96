#![doc = include_str!("../README.md")]

pub mod e_pattern;
pub use e_pattern::{Pattern, PatternCatalog, PatternKind};
pub mod e_classifier;
pub use e_classifier::{classify, LineClassification};
pub mod e_dirstack;
pub use e_dirstack::DirectoryStack;
pub mod e_diagnostics;
pub use e_diagnostics::{DiagnosticRecord, DiagnosticRef, DiagnosticTree, TreeKind};
pub mod e_indicator;
pub use e_indicator::IndicatorBudget;
pub mod e_messagelog;
pub use e_messagelog::{MessageLog, RowTag};
pub mod e_navigation;
pub use e_navigation::NavigationCursor;
pub mod e_sink;
pub use e_sink::{ConsoleSink, RecordingSink};
pub mod e_runcontroller;
pub use e_runcontroller::{RunController, RunOptions};
pub mod e_config;
pub use e_config::ConsoleConfig;
pub mod e_process;
pub mod e_cli;
pub use e_cli::Cli;
