// common/test_prelude.rs

// Re-export commonly used items for integration tests.
pub use assert_cmd::Command;
pub use e_buildconsole::e_navigation::CursorState;
pub use e_buildconsole::e_sink::SinkEvent;
pub use e_buildconsole::{
    Pattern, PatternCatalog, PatternKind, RecordingSink, RowTag, RunController, RunOptions,
    TreeKind,
};
pub use predicates::prelude::*;
pub use predicates::str::contains;
