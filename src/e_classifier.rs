//! Evaluates one raw output line against the pattern catalog.
//!
//! Every builtin and user pattern is tried. Among the matches the one whose
//! expression declares the most special named groups wins, first in catalog
//! order on ties. Project fallbacks are tried only when nothing else matched.

use crate::e_pattern::{CaptureField, Pattern, PatternCatalog, PatternKind};
use regex::Captures;

/// Result of classifying one line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineClassification {
    pub matched: bool,
    pub kind: PatternKind,
    pub directory: String,
    pub file_path: String,
    /// 0 when unknown.
    pub line_number: u32,
    /// 0 when unknown.
    pub column_number: u32,
    pub message: String,
    /// Number of special named groups the winning expression declares.
    pub specificity: usize,
}

impl LineClassification {
    pub fn unmatched() -> Self {
        Self::default()
    }
}

/// Classifies `line` against a catalog and its project fallbacks.
pub fn classify(line: &str, catalog: &PatternCatalog) -> LineClassification {
    classify_patterns(line, catalog.iter(), catalog.project_fallbacks().iter())
}

/// Classifies `line` against an ordered set of patterns, then the fallbacks.
pub fn classify_patterns<'a, 'b, P, F>(line: &str, patterns: P, fallbacks: F) -> LineClassification
where
    P: IntoIterator<Item = &'a Pattern>,
    F: IntoIterator<Item = &'b Pattern>,
{
    if line.is_empty() {
        return LineClassification::unmatched();
    }

    let mut best: Option<LineClassification> = None;
    for pattern in patterns {
        if pattern.kind() == PatternKind::None {
            continue;
        }
        let Some(caps) = pattern.regex().and_then(|re| re.captures(line)) else {
            continue;
        };
        let specificity = pattern.specificity();
        if best.as_ref().map_or(true, |b| specificity > b.specificity) {
            best = Some(extract(pattern, &caps, specificity));
        }
    }
    if let Some(found) = best {
        log::trace!(
            "classified as {} (specificity {}): {}",
            found.kind,
            found.specificity,
            line
        );
        return found;
    }

    for pattern in fallbacks {
        if let Some(caps) = pattern.regex().and_then(|re| re.captures(line)) {
            log::trace!("classified as {} by project fallback: {}", pattern.kind(), line);
            return extract(pattern, &caps, pattern.specificity());
        }
    }

    LineClassification::unmatched()
}

fn extract(pattern: &Pattern, caps: &Captures<'_>, specificity: usize) -> LineClassification {
    let text = |field: CaptureField| capture_text(pattern, caps, field);
    LineClassification {
        matched: true,
        kind: pattern.kind(),
        directory: text(CaptureField::Directory),
        file_path: text(CaptureField::FilePath),
        line_number: parse_number(&text(CaptureField::LineNumber)),
        column_number: parse_number(&text(CaptureField::ColumnNumber)),
        message: text(CaptureField::Message),
        specificity,
    }
}

/// Named group when declared, otherwise the fixed positional group.
fn capture_text(pattern: &Pattern, caps: &Captures<'_>, field: CaptureField) -> String {
    let found = if pattern.declares(field) {
        caps.name(field.group_name())
    } else {
        field.position().and_then(|i| caps.get(i))
    };
    found.map(|m| m.as_str().to_string()).unwrap_or_default()
}

/// Best effort: anything that is not a plain unsigned number is 0.
pub fn parse_number(text: &str) -> u32 {
    text.trim().parse().unwrap_or(0)
}
