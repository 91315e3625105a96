use e_buildconsole::{
    Pattern, PatternCatalog, PatternKind, RecordingSink, RunController, RunOptions, TreeKind,
};
use std::fs;
use std::io::Result as IoResult;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

pub const ENTER: &str = r"^Entering directory '(?P<filePath>.*)'$";
pub const LEAVE: &str = r"^Leaving directory '(?P<filePath>.*)'$";
pub const ERROR: &str = r"^(?P<filePath>\S+):(?P<lineNumber>\d+): error: (?P<message>.*)$";
pub const WARNING: &str = r"^(?P<filePath>\S+):(?P<lineNumber>\d+): warning: (?P<message>.*)$";
pub const NOTE: &str = r"^\s+note: (?P<message>.*)$";

/// A small make-like catalog with no builtin patterns.
pub fn make_catalog() -> PatternCatalog {
    let mut catalog = PatternCatalog::new();
    catalog.add(Pattern::new("*", "make", PatternKind::Enter, ENTER));
    catalog.add(Pattern::new("*", "make", PatternKind::Leave, LEAVE));
    catalog.add(Pattern::new("c", "cc", PatternKind::Error, ERROR));
    catalog.add(Pattern::new("c", "cc", PatternKind::Warning, WARNING));
    catalog.add(Pattern::new("c", "cc", PatternKind::Extension, NOTE));
    catalog
}

pub fn console(options: RunOptions) -> RunController<RecordingSink> {
    let mut console = RunController::new(make_catalog(), options, RecordingSink::new());
    console.start_run();
    console
}

/// Feeds every line with parsing enabled.
pub fn feed(console: &mut RunController<RecordingSink>, working_directory: &str, lines: &[&str]) {
    for line in lines {
        console.on_line(working_directory, line, true);
    }
}

pub fn cursor_index(console: &RunController<RecordingSink>, tree: TreeKind) -> Option<usize> {
    console.run_state().cursor(tree).index(console.tree(tree))
}

/// A temporary directory holding config and pattern files. Dropped with the test.
pub struct TestProject {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl TestProject {
    pub fn new(name: &str) -> IoResult<Self> {
        let temp_dir = tempdir()?;
        let root = temp_dir.path().join(name);
        fs::create_dir_all(&root)?;
        Ok(TestProject { temp_dir, root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn write(&self, relative: &str, contents: &str) -> IoResult<PathBuf> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }
}
