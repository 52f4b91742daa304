//! Match discovery over the visible windows of a document

use std::borrow::Cow;
use std::ops::Range;

use super::rule::{CompiledRule, RuleSet};

/// Read access to document text by absolute byte range
pub trait TextSource {
    /// Total document length in bytes
    fn len(&self) -> usize;

    /// Text of `range`; the caller clamps it to `0..len()` and to char
    /// boundaries
    fn slice(&self, range: Range<usize>) -> Cow<'_, str>;

    /// Whether `offset` does not fall inside a multi-byte character
    fn is_char_boundary(&self, offset: usize) -> bool;
}

impl TextSource for str {
    fn len(&self) -> usize {
        str::len(self)
    }

    fn is_char_boundary(&self, offset: usize) -> bool {
        str::is_char_boundary(self, offset)
    }

    fn slice(&self, range: Range<usize>) -> Cow<'_, str> {
        Cow::Borrowed(self.get(range).unwrap_or(""))
    }
}

impl TextSource for String {
    fn len(&self) -> usize {
        String::len(self)
    }

    fn slice(&self, range: Range<usize>) -> Cow<'_, str> {
        self.as_str().slice(range)
    }

    fn is_char_boundary(&self, offset: usize) -> bool {
        self.as_str().is_char_boundary(offset)
    }
}

/// One located marker occurrence, in absolute document offsets
#[derive(Debug, Clone)]
pub struct Match<'r> {
    /// Start of the whole marker, prefix included
    pub match_start: usize,
    /// End of the whole marker, suffix included
    pub match_end: usize,
    pub content_start: usize,
    pub content_end: usize,
    pub rule: &'r CompiledRule,
    /// Offset of the match local to the window it was found in
    pub origin_index: usize,
}

impl Match<'_> {
    pub fn has_suffix(&self) -> bool {
        self.rule.has_suffix()
    }

    /// Empty or inverted content
    pub fn is_degenerate(&self) -> bool {
        self.content_start >= self.content_end
    }
}

/// Scan every visible window with every rule
///
/// Matches come out grouped by window, then by rule in scan order. Nothing
/// is matched across a window boundary.
pub fn collect_matches<'r, T>(text: &T, windows: &[Range<usize>], rules: &'r RuleSet) -> Vec<Match<'r>>
where
    T: TextSource + ?Sized,
{
    let mut matches = Vec::new();
    let doc_len = text.len();

    for window in windows {
        let mut from = window.start.min(doc_len);
        while from > 0 && !text.is_char_boundary(from) {
            from -= 1;
        }
        let mut to = window.end.min(doc_len);
        while to < doc_len && !text.is_char_boundary(to) {
            to += 1;
        }
        if from >= to {
            continue;
        }

        let slice = text.slice(from..to);
        for rule in rules.scan_order() {
            for local in rule.find_iter(&slice) {
                let content = rule.content_range(&local);
                matches.push(Match {
                    match_start: from + local.start,
                    match_end: from + local.end,
                    content_start: from + content.start,
                    content_end: from + content.end,
                    rule,
                    origin_index: local.start,
                });
            }
        }
    }

    tracing::trace!("collected {} matches in {} windows", matches.len(), windows.len());
    matches
}
