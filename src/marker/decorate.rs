//! Raw vs. rendered decisions and decoration output

use std::ops::Range;

use super::collect::Match;
use super::snap::CursorSnap;

/// Selection range in document offsets, `from <= to`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub from: usize,
    pub to: usize,
}

impl Selection {
    /// Selection between two offsets, in either order
    pub fn new(anchor: usize, head: usize) -> Self {
        Self {
            from: anchor.min(head),
            to: anchor.max(head),
        }
    }

    /// A collapsed selection at `offset`
    pub fn cursor(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }
}

/// What the host reports about the view before a rebuild
#[derive(Debug, Clone, Default)]
pub struct Observation {
    pub cursor: usize,
    pub selection: Selection,
    pub has_focus: bool,
    /// Visible document windows, `[from, to)`
    pub visible: Vec<Range<usize>>,
    /// Live rendering mode (as opposed to raw source mode)
    pub live: bool,
}

/// Per-view state carried between rebuilds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineState {
    /// Origin index of the last match the cursor was inside
    pub last_raw_match_origin_index: Option<usize>,
    /// Whether any match was shown raw on the previous rebuild
    pub was_inside_any_match: bool,
    /// A pointer release happened since the last rebuild
    pub pending_pointer_release: bool,
}

/// How a decorated range is presented
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecorationKind {
    /// Style the range with a rule class, optionally de-emphasized
    Mark { class: String, dimmed: bool },
    /// Hide the range behind an empty zero-width placeholder
    ReplaceWithEmpty,
}

/// One decoration instruction over the current document snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub start: usize,
    pub end: usize,
    pub kind: DecorationKind,
}

impl Decoration {
    fn mark(range: Range<usize>, class: &str, dimmed: bool) -> Self {
        Self {
            start: range.start,
            end: range.end,
            kind: DecorationKind::Mark {
                class: class.to_string(),
                dimmed,
            },
        }
    }

    fn hidden(range: Range<usize>) -> Self {
        Self {
            start: range.start,
            end: range.end,
            kind: DecorationKind::ReplaceWithEmpty,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.kind == DecorationKind::ReplaceWithEmpty
    }

    pub fn contains(&self, pos: usize) -> bool {
        pos >= self.start && pos < self.end
    }
}

/// Classify every match and emit ordered, non-overlapping decorations
///
/// Matches are stably sorted by start, so at equal starts the match found
/// first (earlier rule in scan order) wins. Any later match that overlaps an
/// accepted one is dropped, including one nested inside it: in `> see //x//`
/// the quote is decorated and `//x//` stays plain text.
///
/// A match the cursor sits inside (or the selection covers) is shown raw
/// while the view has focus; all others are rendered with their delimiters
/// hidden.
pub fn build_decorations(
    mut matches: Vec<Match<'_>>,
    obs: &Observation,
    state: &mut EngineState,
    snap: &mut CursorSnap,
) -> Vec<Decoration> {
    matches.sort_by_key(|m| m.match_start);

    let cursor = obs.cursor;
    let selection = obs.selection;
    let mut decorations = Vec::with_capacity(matches.len() * 3);
    let mut accepted_end = 0;
    let mut any_raw = false;

    for m in &matches {
        if m.is_degenerate() {
            continue;
        }
        if m.match_start < accepted_end {
            tracing::trace!("dropping overlapping match at {}", m.match_start);
            continue;
        }
        accepted_end = m.match_end;

        let class = m.rule.style_class();
        let prefix = m.match_start..m.content_start;
        let content = m.content_start..m.content_end;
        let suffix = m.content_end..m.match_end;

        let cursor_inside = cursor >= m.match_start && cursor <= m.match_end;
        let cursor_in_prefix = cursor > m.match_start && cursor <= m.content_start;
        let cursor_in_suffix = m.has_suffix() && cursor >= m.content_end && cursor < m.match_end;
        let selection_covers = selection.from <= m.match_start && selection.to >= m.match_end;

        if obs.has_focus && (cursor_inside || selection_covers) {
            decorations.push(Decoration::mark(prefix, class, true));
            decorations.push(Decoration::mark(content, class, false));
            if m.has_suffix() {
                decorations.push(Decoration::mark(suffix, class, true));
            }

            let sticky = state.was_inside_any_match
                && state.last_raw_match_origin_index == Some(m.origin_index);
            if !sticky {
                if cursor_in_prefix {
                    snap.schedule(m.match_start);
                } else if cursor_in_suffix {
                    snap.schedule(m.match_end);
                }
                state.last_raw_match_origin_index = Some(m.origin_index);
            }

            any_raw = true;
        } else {
            decorations.push(Decoration::hidden(prefix));
            decorations.push(Decoration::mark(content, class, false));
            if m.has_suffix() {
                decorations.push(Decoration::hidden(suffix));
            }
        }
    }

    state.was_inside_any_match = any_raw;
    decorations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::collect::collect_matches;
    use crate::marker::rule::{Precedence, Rule, RuleSet};

    fn slashes() -> RuleSet {
        RuleSet::compile(&[Rule::new("//text//", "color-yellow", false)], "text", Precedence::default())
            .unwrap()
    }

    fn observe(doc: &str, cursor: usize, has_focus: bool) -> Observation {
        Observation {
            cursor,
            selection: Selection::cursor(cursor),
            has_focus,
            visible: vec![0..doc.len()],
            live: true,
        }
    }

    fn build(rules: &RuleSet, doc: &str, obs: &Observation, state: &mut EngineState, snap: &mut CursorSnap) -> Vec<Decoration> {
        let matches = collect_matches(doc, &obs.visible, rules);
        build_decorations(matches, obs, state, snap)
    }

    #[test]
    fn test_rendered_hides_delimiters() {
        let rules = slashes();
        let doc = "//hello//";
        let obs = observe(doc, doc.len(), false);
        let mut state = EngineState::default();
        let mut snap = CursorSnap::default();

        let decos = build(&rules, doc, &obs, &mut state, &mut snap);
        assert_eq!(
            decos,
            vec![
                Decoration::hidden(0..2),
                Decoration::mark(2..7, "color-yellow", false),
                Decoration::hidden(7..9),
            ]
        );
        assert!(!state.was_inside_any_match);
        assert_eq!(snap.take(), None);
    }

    #[test]
    fn test_nested_marker_is_not_decorated() {
        let rules = RuleSet::compile(
            &[
                Rule::new("//text//", "color-yellow", false),
                Rule::new("> text", "quote", true),
            ],
            "text",
            Precedence::default(),
        )
        .unwrap();
        let doc = "> see //this//";
        let obs = observe(doc, 0, false);
        let mut state = EngineState::default();
        let mut snap = CursorSnap::default();

        let decos = build(&rules, doc, &obs, &mut state, &mut snap);
        assert_eq!(
            decos,
            vec![Decoration::hidden(0..2), Decoration::mark(2..14, "quote", false)]
        );
    }

    #[test]
    fn test_cursor_in_prefix_shows_raw_and_snaps() {
        let rules = slashes();
        let doc = "//hello//";
        let obs = observe(doc, 1, true);
        let mut state = EngineState::default();
        let mut snap = CursorSnap::default();

        let decos = build(&rules, doc, &obs, &mut state, &mut snap);
        assert_eq!(
            decos,
            vec![
                Decoration::mark(0..2, "color-yellow", true),
                Decoration::mark(2..7, "color-yellow", false),
                Decoration::mark(7..9, "color-yellow", true),
            ]
        );
        assert_eq!(snap.take(), Some(0));
        assert!(state.was_inside_any_match);
        assert_eq!(state.last_raw_match_origin_index, Some(0));
    }

    #[test]
    fn test_cursor_in_suffix_snaps_to_end() {
        let rules = slashes();
        let doc = "x //hi// y";
        let obs = observe(doc, 7, true);
        let mut state = EngineState::default();
        let mut snap = CursorSnap::default();

        build(&rules, doc, &obs, &mut state, &mut snap);
        assert_eq!(snap.take(), Some(8));
    }

    #[test]
    fn test_sticky_match_does_not_snap_again() {
        let rules = slashes();
        let doc = "//hello//";
        let mut state = EngineState::default();
        let mut snap = CursorSnap::default();

        build(&rules, doc, &observe(doc, 4, true), &mut state, &mut snap);
        assert_eq!(snap.take(), None);

        // Moving into the prefix of the same match keeps it sticky
        build(&rules, doc, &observe(doc, 1, true), &mut state, &mut snap);
        assert_eq!(snap.take(), None);
    }

    #[test]
    fn test_unfocused_view_renders() {
        let rules = slashes();
        let doc = "//hello//";
        let mut state = EngineState::default();
        let mut snap = CursorSnap::default();

        let decos = build(&rules, doc, &observe(doc, 1, false), &mut state, &mut snap);
        assert!(decos[0].is_hidden());
        assert_eq!(snap.take(), None);
    }

    #[test]
    fn test_selection_covering_match_shows_raw() {
        let rules = slashes();
        let doc = "a //b// c";
        let obs = Observation {
            cursor: 9,
            selection: Selection::new(0, 9),
            has_focus: true,
            visible: vec![0..doc.len()],
            live: true,
        };
        let mut state = EngineState::default();
        let mut snap = CursorSnap::default();

        let decos = build(&rules, doc, &obs, &mut state, &mut snap);
        assert!(decos.iter().all(|d| !d.is_hidden()));
        assert!(state.was_inside_any_match);
    }

    #[test]
    fn test_degenerate_match_skipped() {
        let rules = slashes();
        let doc = "////";
        let mut state = EngineState::default();
        let mut snap = CursorSnap::default();

        let decos = build(&rules, doc, &observe(doc, 0, false), &mut state, &mut snap);
        assert!(decos.is_empty());
    }

    #[test]
    fn test_same_start_keeps_one_match() {
        let rules = vec![Rule::new("//text//", "slash", false), Rule::new("//text", "line", false)];
        let doc = "//a// tail";

        let set = RuleSet::compile(&rules, "text", Precedence::UnsuffixedFirst).unwrap();
        let decos = build(&set, doc, &observe(doc, doc.len(), false), &mut EngineState::default(), &mut CursorSnap::default());
        assert_eq!(decos.len(), 2);
        assert_eq!(decos[1].kind, DecorationKind::Mark { class: "line".into(), dimmed: false });

        let set = RuleSet::compile(&rules, "text", Precedence::SuffixedFirst).unwrap();
        let decos = build(&set, doc, &observe(doc, doc.len(), false), &mut EngineState::default(), &mut CursorSnap::default());
        assert_eq!(decos.len(), 3);
        assert_eq!(decos[1].kind, DecorationKind::Mark { class: "slash".into(), dimmed: false });
    }

    #[test]
    fn test_output_sorted_and_disjoint() {
        let rules = vec![
            Rule::new("//text//", "a", false),
            Rule::new("==text==", "b", false),
            Rule::new("> text", "c", false),
        ];
        let set = RuleSet::compile(&rules, "text", Precedence::default()).unwrap();
        let doc = "==x== //y// > q //z//\n> ==w== //v//\n////";

        for cursor in 0..=doc.len() {
            let decos = build(&set, doc, &observe(doc, cursor, true), &mut EngineState::default(), &mut CursorSnap::default());
            for pair in decos.windows(2) {
                assert!(pair[0].end <= pair[1].start, "overlap at cursor {}: {:?}", cursor, pair);
                assert!(pair[0].start < pair[1].start);
            }
        }
    }
}
