//! Directory context announced by the build tool (`make -C` style).

use std::path::{Path, PathBuf};

/// LIFO stack of announced directories. Enter pushes, Leave pops.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryStack {
    entries: Vec<String>,
}

impl DirectoryStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, path: impl Into<String>) {
        self.entries.push(path.into());
    }

    /// Pops the current directory. Popping an empty stack is a no-op.
    pub fn pop(&mut self) -> Option<String> {
        let popped = self.entries.pop();
        if popped.is_none() {
            log::debug!("leave directory with an empty directory stack, ignored");
        }
        popped
    }

    pub fn top(&self) -> Option<&str> {
        self.entries.last().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bottom to top.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

/// Directory a diagnostic belongs to: the announced directory made absolute
/// against the run's working directory, or the working directory itself.
pub fn resolve_directory(working_directory: &str, announced: Option<&str>) -> String {
    match announced.filter(|a| !a.is_empty()) {
        Some(dir) if Path::new(dir).is_absolute() => dir.to_string(),
        Some(dir) => Path::new(working_directory)
            .join(dir)
            .to_string_lossy()
            .into_owned(),
        None => working_directory.to_string(),
    }
}

/// Full path of `file_path` as seen from `directory`.
pub fn absolute_file(directory: &str, file_path: &str) -> PathBuf {
    let file = Path::new(file_path);
    if file.is_absolute() || directory.is_empty() {
        file.to_path_buf()
    } else {
        Path::new(directory).join(file)
    }
}
