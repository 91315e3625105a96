//! Classification rules and the ordered catalog they live in.
//!
//! A [`Pattern`] is a `(language, group, kind, expression)` rule. The
//! [`PatternCatalog`] keeps the read-only builtin rules, the user rules and
//! at most one project error and one project warning fallback.

use anyhow::{anyhow, bail, Result};
use once_cell::sync::{Lazy, OnceCell};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What a matching line means for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PatternKind {
    /// Unset. Never an active rule; also the kind of an unmatched line.
    #[default]
    None,
    Enter,
    Leave,
    Error,
    Warning,
    Extension,
}

impl PatternKind {
    pub const ALL: [PatternKind; 6] = [
        PatternKind::None,
        PatternKind::Enter,
        PatternKind::Leave,
        PatternKind::Error,
        PatternKind::Warning,
        PatternKind::Extension,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PatternKind::None => "None",
            PatternKind::Enter => "Enter",
            PatternKind::Leave => "Leave",
            PatternKind::Error => "Error",
            PatternKind::Warning => "Warning",
            PatternKind::Extension => "Extension",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatternKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        PatternKind::ALL
            .iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| anyhow!("unknown pattern type `{}`", wanted))
    }
}

/// The special capture groups a pattern may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureField {
    Directory,
    FilePath,
    LineNumber,
    ColumnNumber,
    Message,
}

impl CaptureField {
    pub const ALL: [CaptureField; 5] = [
        CaptureField::Directory,
        CaptureField::FilePath,
        CaptureField::LineNumber,
        CaptureField::ColumnNumber,
        CaptureField::Message,
    ];

    /// Group name as written in an expression, e.g. `(?P<filePath>...)`.
    pub fn group_name(&self) -> &'static str {
        match self {
            CaptureField::Directory => "directory",
            CaptureField::FilePath => "filePath",
            CaptureField::LineNumber => "lineNumber",
            CaptureField::ColumnNumber => "columnNumber",
            CaptureField::Message => "message",
        }
    }

    /// Group number used when the expression does not name the field.
    /// `directory` is only ever taken from a named group.
    pub fn position(&self) -> Option<usize> {
        match self {
            CaptureField::Directory => None,
            CaptureField::FilePath => Some(1),
            CaptureField::LineNumber => Some(2),
            CaptureField::ColumnNumber => Some(3),
            CaptureField::Message => Some(4),
        }
    }
}

/// A single classification rule.
///
/// The expression is compiled lazily on first use and the result cached.
/// A malformed expression is accepted here and simply never matches.
#[derive(Clone)]
pub struct Pattern {
    language: String,
    group: String,
    kind: PatternKind,
    expression: String,
    compiled: OnceCell<Option<Regex>>,
}

impl Pattern {
    pub fn new(
        language: impl Into<String>,
        group: impl Into<String>,
        kind: PatternKind,
        expression: impl Into<String>,
    ) -> Self {
        Pattern {
            language: language.into(),
            group: group.into(),
            kind,
            expression: expression.into(),
            compiled: OnceCell::new(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// `"*"` and the empty string both mean "any language".
    pub fn is_any_language(&self) -> bool {
        self.language.is_empty() || self.language == "*"
    }

    /// Compiled expression, or `None` if it does not compile.
    pub fn regex(&self) -> Option<&Regex> {
        self.compiled
            .get_or_init(|| match Regex::new(&self.expression) {
                Ok(re) => Some(re),
                Err(e) => {
                    log::debug!(
                        "pattern {}:{}:{} has a malformed expression, it will never match: {}",
                        self.language,
                        self.group,
                        self.kind,
                        e
                    );
                    None
                }
            })
            .as_ref()
    }

    /// Whether the expression declares `field` as a named group.
    pub fn declares(&self, field: CaptureField) -> bool {
        self.regex()
            .map(|re| re.capture_names().flatten().any(|n| n == field.group_name()))
            .unwrap_or(false)
    }

    /// Number of special named groups the expression declares, whether or
    /// not they take part in a given match.
    pub fn specificity(&self) -> usize {
        CaptureField::ALL
            .iter()
            .filter(|field| self.declares(**field))
            .count()
    }

    pub fn same_rule(&self, language: &str, group: &str, kind: PatternKind, expression: &str) -> bool {
        self.language == language
            && self.group == group
            && self.kind == kind
            && self.expression == expression
    }

    /// Encodes the pattern as `language:group:type:regex`.
    pub fn to_line(&self) -> String {
        format!(
            "{}:{}:{}:{}",
            escape_field(&self.language),
            escape_field(&self.group),
            self.kind,
            escape_field(&self.expression)
        )
    }

    /// Decodes a `language:group:type:regex` line.
    ///
    /// ```
    /// use e_buildconsole::e_pattern::{Pattern, PatternKind};
    ///
    /// let p = Pattern::from_line(r"c:gcc:Error:^(?P<filePath>[^\:]+)\:(?P<lineNumber>\d+)").unwrap();
    /// assert_eq!(p.kind(), PatternKind::Error);
    /// assert_eq!(p.expression(), r"^(?P<filePath>[^:]+):(?P<lineNumber>\d+)");
    /// ```
    pub fn from_line(line: &str) -> Result<Pattern> {
        let fields = split_fields(line, 4);
        if fields.len() != 4 {
            bail!(
                "expected `language:group:type:regex`, found {} field(s) in `{}`",
                fields.len(),
                line
            );
        }
        let kind: PatternKind = fields[2].parse()?;
        Ok(Pattern::new(
            fields[0].clone(),
            fields[1].clone(),
            kind,
            fields[3].clone(),
        ))
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.same_rule(&other.language, &other.group, other.kind, &other.expression)
    }
}

impl Eq for Pattern {}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pattern")
            .field("language", &self.language)
            .field("group", &self.group)
            .field("kind", &self.kind)
            .field("expression", &self.expression)
            .finish()
    }
}

fn escape_field(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    for c in field.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            ':' => out.push_str("\\:"),
            _ => out.push(c),
        }
    }
    out
}

/// Splits on unescaped `:` into at most `max` fields. The last field takes
/// the rest of the line. `\:` and `\\` are unescaped; any other backslash
/// sequence is kept verbatim.
fn split_fields(line: &str, max: usize) -> Vec<String> {
    let mut fields = Vec::with_capacity(max);
    let mut current = String::new();
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.peek() {
                Some(&next) if next == ':' || next == '\\' => {
                    current.push(next);
                    chars.next();
                }
                _ => current.push('\\'),
            },
            ':' if fields.len() + 1 < max => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// The project-scoped fallback rules. Both use purely positional captures:
/// 1 = filePath, 2 = lineNumber, 3 = columnNumber, 4 = message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatterns {
    pub error: Option<Pattern>,
    pub warning: Option<Pattern>,
}

impl ProjectPatterns {
    /// Error fallback first, then warning.
    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.error.iter().chain(self.warning.iter())
    }
}

/// Ordered collection of patterns: builtin, then user, then project fallbacks.
#[derive(Debug, Clone, Default)]
pub struct PatternCatalog {
    builtin: Vec<Pattern>,
    user: Vec<Pattern>,
    project: ProjectPatterns,
}

impl PatternCatalog {
    /// An empty catalog with no builtin rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog seeded with the builtin rules.
    pub fn with_builtins() -> Self {
        PatternCatalog {
            builtin: BUILTIN_PATTERNS.clone(),
            ..Default::default()
        }
    }

    pub fn builtin_patterns(&self) -> &[Pattern] {
        &self.builtin
    }

    pub fn user_patterns(&self) -> &[Pattern] {
        &self.user
    }

    /// Builtin and user patterns in store order. Project fallbacks are not
    /// part of this sequence, see [`PatternCatalog::project_fallbacks`].
    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.builtin.iter().chain(self.user.iter())
    }

    pub fn len(&self) -> usize {
        self.builtin.len() + self.user.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn add(&mut self, pattern: Pattern) {
        self.user.push(pattern);
    }

    /// Adds the pattern unless an identical rule is already present.
    /// Returns whether it was added.
    pub fn add_unique(&mut self, pattern: Pattern) -> bool {
        if self.exists(
            pattern.language(),
            pattern.group(),
            pattern.kind(),
            pattern.expression(),
        ) {
            log::debug!("skipping duplicate pattern {}", pattern.to_line());
            return false;
        }
        self.add(pattern);
        true
    }

    /// Removes the first user pattern equal to `pattern`.
    pub fn remove(&mut self, pattern: &Pattern) -> bool {
        match self.user.iter().position(|p| p == pattern) {
            Some(index) => {
                self.user.remove(index);
                true
            }
            None => false,
        }
    }

    /// Replaces the user pattern at `index`, returning the old one.
    pub fn replace(&mut self, index: usize, pattern: Pattern) -> Option<Pattern> {
        let slot = self.user.get_mut(index)?;
        Some(std::mem::replace(slot, pattern))
    }

    /// Clones the user pattern at `index` and inserts the copy right after it.
    pub fn duplicate(&mut self, index: usize) -> bool {
        match self.user.get(index).cloned() {
            Some(copy) => {
                self.user.insert(index + 1, copy);
                true
            }
            None => false,
        }
    }

    /// Exact structural duplicate check over builtin and user patterns.
    pub fn exists(&self, language: &str, group: &str, kind: PatternKind, expression: &str) -> bool {
        self.iter()
            .any(|p| p.same_rule(language, group, kind, expression))
    }

    /// Sets or clears (`None` or empty) the project error fallback.
    pub fn set_project_error(&mut self, expression: Option<&str>) {
        self.project.error = project_pattern(PatternKind::Error, expression);
    }

    /// Sets or clears (`None` or empty) the project warning fallback.
    pub fn set_project_warning(&mut self, expression: Option<&str>) {
        self.project.warning = project_pattern(PatternKind::Warning, expression);
    }

    pub fn project_fallbacks(&self) -> &ProjectPatterns {
        &self.project
    }
}

fn project_pattern(kind: PatternKind, expression: Option<&str>) -> Option<Pattern> {
    expression
        .filter(|e| !e.trim().is_empty())
        .map(|e| Pattern::new("*", "project", kind, e))
}

/// Builtin rules shipped with the console.
///
/// Unnamed positions 1 to 3 are read as file, line and column when those
/// names are missing, and named groups take numbers too. Rules that only
/// name `message` therefore open with empty groups to keep those slots blank.
pub static BUILTIN_PATTERNS: Lazy<Vec<Pattern>> = Lazy::new(|| {
    use PatternKind::*;
    vec![
        Pattern::new(
            "*",
            "make",
            Enter,
            r"^(?:g?make|mingw32-make)(?:\[\d+\])?: Entering directory [`'‘](?P<filePath>[^'’]*)['’]$",
        ),
        Pattern::new(
            "*",
            "make",
            Leave,
            r"^(?:g?make|mingw32-make)(?:\[\d+\])?: Leaving directory [`'‘](?P<filePath>[^'’]*)['’]$",
        ),
        Pattern::new(
            "*",
            "make",
            Error,
            r"^()()()(?:g?make|mingw32-make)(?:\[\d+\])?: \*\*\* (?P<message>.*)$",
        ),
        Pattern::new(
            "c",
            "gcc",
            Error,
            r"^(?P<filePath>[^:\s][^:]*):(?P<lineNumber>\d+):(?:(?P<columnNumber>\d+):)? (?:fatal )?error: (?P<message>.*)$",
        ),
        Pattern::new(
            "c",
            "gcc",
            Warning,
            r"^(?P<filePath>[^:\s][^:]*):(?P<lineNumber>\d+):(?:(?P<columnNumber>\d+):)? warning: (?P<message>.*)$",
        ),
        Pattern::new(
            "c",
            "gcc",
            Extension,
            r"^(?P<filePath>[^:\s][^:]*):(?P<lineNumber>\d+):(?:(?P<columnNumber>\d+):)? note: (?P<message>.*)$",
        ),
        Pattern::new(
            "rust",
            "rustc",
            Error,
            r"^()()()error(?:\[E\d{4}\])?: (?P<message>.*)$",
        ),
        Pattern::new(
            "rust",
            "rustc",
            Warning,
            r"^()()()warning: (?P<message>.*)$",
        ),
        Pattern::new(
            "rust",
            "rustc",
            Extension,
            r"^\s*--> (?P<filePath>[^:]+):(?P<lineNumber>\d+):(?P<columnNumber>\d+)$",
        ),
        Pattern::new(
            "rust",
            "rustc",
            Extension,
            r"^()()()\s*= (?:note|help): (?P<message>.*)$",
        ),
        Pattern::new(
            "python",
            "python",
            Error,
            r"^Traceback \(most recent call last\):$",
        ),
        Pattern::new(
            "python",
            "python",
            Extension,
            r#"^\s*File "(?P<filePath>[^"]+)", line (?P<lineNumber>\d+)()(?:, in (?P<message>.*))?$"#,
        ),
    ]
});
