//! Marker rules and their compiled matchers
//!
//! A rule is declared as a pattern such as `//text//` or `> text`, where the
//! placeholder token (`text` by default) stands for the styled content. The
//! part before the placeholder is the prefix, the part after it (if any) is
//! the suffix.

use std::ops::Range;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{EditorError, Result};

/// Placeholder token used when the config does not override it
pub const DEFAULT_PLACEHOLDER: &str = "text";

/// A user-declared marker rule
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Rule {
    /// Pattern with one placeholder token, e.g. `==text==`
    pub pattern: String,
    /// Style class applied to matched markers
    #[serde(rename = "class", alias = "css")]
    pub style_class: String,
    /// Continue the prefix onto the next line on Enter (prefix-only rules)
    #[serde(default)]
    pub continues_line: bool,
}

impl Rule {
    /// Create a new rule
    pub fn new(pattern: &str, style_class: &str, continues_line: bool) -> Self {
        Self {
            pattern: pattern.to_string(),
            style_class: style_class.to_string(),
            continues_line,
        }
    }
}

/// A rule split into prefix/suffix with its matcher built
#[derive(Debug, Clone)]
pub struct CompiledRule {
    prefix: String,
    suffix: Option<String>,
    style_class: String,
    continues_line: bool,
    matcher: Regex,
}

impl CompiledRule {
    /// Compile a rule, splitting its pattern at the first placeholder
    pub fn compile(rule: &Rule, placeholder: &str) -> Result<Self> {
        let (prefix, suffix) = rule
            .pattern
            .split_once(placeholder)
            .filter(|_| !placeholder.is_empty())
            .ok_or_else(|| EditorError::MissingPlaceholder {
                pattern: rule.pattern.clone(),
                placeholder: placeholder.to_string(),
            })?;

        if prefix.is_empty() {
            return Err(EditorError::EmptyPrefix(rule.pattern.clone()));
        }

        let suffix = Some(suffix).filter(|s| !s.is_empty());
        let source = match suffix {
            Some(suffix) => {
                // Content stops at whitespace or at the first suffix character
                let stop = suffix.chars().next().map(|c| regex::escape(&c.to_string()));
                format!(
                    r"{}([^{}\r\n\t ]*){}",
                    regex::escape(prefix),
                    stop.unwrap_or_default(),
                    regex::escape(suffix)
                )
            }
            None => format!(r"(?mR){}(.*?)$", regex::escape(prefix)),
        };

        let matcher = Regex::new(&source).map_err(|source| EditorError::Regex {
            pattern: rule.pattern.clone(),
            source,
        })?;

        if rule.continues_line && suffix.is_some() {
            tracing::debug!("ignoring continues-line on suffixed rule {:?}", rule.pattern);
        }

        Ok(Self {
            prefix: prefix.to_string(),
            suffix: suffix.map(str::to_string),
            style_class: rule.style_class.clone(),
            continues_line: rule.continues_line && suffix.is_none(),
            matcher,
        })
    }

    /// Literal text before the placeholder
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Literal text after the placeholder, if the rule has one
    pub fn suffix(&self) -> Option<&str> {
        self.suffix.as_deref()
    }

    pub fn has_suffix(&self) -> bool {
        self.suffix.is_some()
    }

    /// Style class applied to the content
    pub fn style_class(&self) -> &str {
        &self.style_class
    }

    /// Whether Enter repeats the prefix on the next line
    pub fn continues_line(&self) -> bool {
        self.continues_line
    }

    /// Find successive non-overlapping markers in `text`, as local byte ranges
    pub fn find_iter<'a>(&'a self, text: &'a str) -> impl Iterator<Item = Range<usize>> + 'a {
        self.matcher.find_iter(text).map(|m| m.start()..m.end())
    }

    /// The content part of a marker range returned by `find_iter`
    pub fn content_range(&self, marker: &Range<usize>) -> Range<usize> {
        let suffix_len = self.suffix.as_ref().map_or(0, |s| s.len());
        let start = marker.start + self.prefix.len();
        let end = marker.end.saturating_sub(suffix_len).max(start);
        start..end
    }
}

/// Which rule collection is scanned first when two rules match at one offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Precedence {
    /// Prefix-only rules win ties
    #[default]
    UnsuffixedFirst,
    /// Rules with a suffix win ties
    SuffixedFirst,
}

/// All compiled rules of one editor view
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    /// Rules with a suffix, in registration order
    suffixed: Vec<CompiledRule>,
    /// Prefix-only rules, in registration order
    unsuffixed: Vec<CompiledRule>,
    precedence: Precedence,
}

impl RuleSet {
    /// Compile every rule, failing on the first invalid one
    pub fn compile(rules: &[Rule], placeholder: &str, precedence: Precedence) -> Result<Self> {
        let mut set = Self {
            precedence,
            ..Default::default()
        };
        for rule in rules {
            set.push(CompiledRule::compile(rule, placeholder)?);
        }
        Ok(set)
    }

    /// Compile every rule, skipping the invalid ones
    ///
    /// Returns the set together with the errors of the rejected rules.
    pub fn compile_lenient(
        rules: &[Rule],
        placeholder: &str,
        precedence: Precedence,
    ) -> (Self, Vec<EditorError>) {
        let mut set = Self {
            precedence,
            ..Default::default()
        };
        let mut errors = Vec::new();
        for rule in rules {
            match CompiledRule::compile(rule, placeholder) {
                Ok(compiled) => set.push(compiled),
                Err(e) => {
                    tracing::warn!("skipping rule: {}", e);
                    errors.push(e);
                }
            }
        }
        (set, errors)
    }

    fn push(&mut self, rule: CompiledRule) {
        if rule.has_suffix() {
            self.suffixed.push(rule);
        } else {
            self.unsuffixed.push(rule);
        }
    }

    pub fn precedence(&self) -> Precedence {
        self.precedence
    }

    pub fn len(&self) -> usize {
        self.suffixed.len() + self.unsuffixed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rules in the order they are scanned
    pub fn scan_order(&self) -> impl Iterator<Item = &CompiledRule> {
        let (first, second) = match self.precedence {
            Precedence::UnsuffixedFirst => (&self.unsuffixed, &self.suffixed),
            Precedence::SuffixedFirst => (&self.suffixed, &self.unsuffixed),
        };
        first.iter().chain(second.iter())
    }

    /// Prefixes that continue onto a new line, in registration order
    pub fn continuation_prefixes(&self) -> impl Iterator<Item = &str> {
        self.unsuffixed
            .iter()
            .filter(|r| r.continues_line())
            .map(|r| r.prefix())
    }
}
