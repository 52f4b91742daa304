//! End-to-end checks of the marker engine through the public API

use std::ops::Range;

use markfold::buffer::Buffer;
use markfold::marker::{
    handle_enter, render_document, Continuation, Decoration, DecorationKind, LineEditor, MarkerEngine,
    Observation, Position, Precedence, RebuildPolicy, Rule, RuleSet, Selection, ViewUpdate,
};
use markfold::window::Window;

/// Lines in memory, with the cursor where the host leaves it after Enter
struct Lines {
    lines: Vec<String>,
    cursor: Position,
}

impl Lines {
    fn after_enter(text: &str) -> Self {
        let mut lines: Vec<String> = text.lines().map(String::from).collect();
        lines.push(String::new());
        let cursor = Position::new(lines.len() - 1, 0);
        Self { lines, cursor }
    }
}

impl LineEditor for Lines {
    fn cursor(&self) -> Position {
        self.cursor
    }

    fn set_cursor(&mut self, pos: Position) {
        self.cursor = pos;
    }

    fn line(&self, line: usize) -> Option<&str> {
        self.lines.get(line).map(String::as_str)
    }

    fn replace_in_line(&mut self, line: usize, range: Range<usize>, text: &str) {
        self.lines[line].replace_range(range, text);
    }
}

fn rules(list: &[(&str, &str, bool)], precedence: Precedence) -> RuleSet {
    let rules: Vec<Rule> = list.iter().map(|(p, c, l)| Rule::new(p, c, *l)).collect();
    RuleSet::compile(&rules, "text", precedence).unwrap()
}

fn default_rules() -> RuleSet {
    rules(&[("//text//", "color-yellow", false), ("# text", "heading", true)], Precedence::default())
}

fn observe(len: usize, cursor: usize) -> Observation {
    Observation {
        cursor,
        selection: Selection::cursor(cursor),
        has_focus: true,
        visible: vec![0..len],
        live: true,
    }
}

fn mark(start: usize, end: usize, class: &str, dimmed: bool) -> Decoration {
    Decoration {
        start,
        end,
        kind: DecorationKind::Mark {
            class: class.to_string(),
            dimmed,
        },
    }
}

fn hidden(start: usize, end: usize) -> Decoration {
    Decoration {
        start,
        end,
        kind: DecorationKind::ReplaceWithEmpty,
    }
}

#[test]
fn marker_away_from_cursor_is_folded() {
    let doc = "//hello// world";
    let mut engine = MarkerEngine::new(default_rules(), RebuildPolicy::default());

    let decorations = engine.rebuild(doc, &observe(doc.len(), 14)).to_vec();
    assert_eq!(
        decorations,
        vec![hidden(0, 2), mark(2, 7, "color-yellow", false), hidden(7, 9)]
    );
    assert_eq!(engine.take_snap(), None);
}

#[test]
fn cursor_in_prefix_shows_raw_and_snaps_to_start() {
    let doc = "//hello//";
    let mut engine = MarkerEngine::new(default_rules(), RebuildPolicy::default());

    let decorations = engine.rebuild(doc, &observe(doc.len(), 1)).to_vec();
    assert_eq!(
        decorations,
        vec![
            mark(0, 2, "color-yellow", true),
            mark(2, 7, "color-yellow", false),
            mark(7, 9, "color-yellow", true),
        ]
    );
    assert_eq!(engine.take_snap(), Some(0));

    // Same match on the next rebuild: no second snap
    engine.rebuild(doc, &observe(doc.len(), 1));
    assert_eq!(engine.take_snap(), None);
}

#[test]
fn cursor_in_suffix_snaps_to_end() {
    let doc = "a //hi// b";
    let mut engine = MarkerEngine::new(default_rules(), RebuildPolicy::default());
    engine.rebuild(doc, &observe(doc.len(), 6));
    assert_eq!(engine.take_snap(), Some(8));
}

#[test]
fn unfocused_view_stays_folded() {
    let doc = "//hello//";
    let mut engine = MarkerEngine::new(default_rules(), RebuildPolicy::default());
    let mut obs = observe(doc.len(), 4);
    obs.has_focus = false;

    let decorations = engine.rebuild(doc, &obs);
    assert!(decorations[0].is_hidden());
    assert_eq!(engine.take_snap(), None);
}

#[test]
fn degenerate_marker_is_left_alone() {
    let doc = "////";
    let mut engine = MarkerEngine::new(default_rules(), RebuildPolicy::default());
    for cursor in 0..=doc.len() {
        assert!(engine.rebuild(doc, &observe(doc.len(), cursor)).is_empty());
    }
}

#[test]
fn decorations_are_ordered_and_disjoint_for_every_cursor() {
    let doc = "# //a// x //bc//\n//d// # e\n# tail";
    let mut engine = MarkerEngine::new(default_rules(), RebuildPolicy::default());

    for cursor in 0..=doc.len() {
        let obs = observe(doc.len(), cursor);
        let first = engine.rebuild(doc, &obs).to_vec();
        for pair in first.windows(2) {
            assert!(pair[0].end <= pair[1].start, "overlap at cursor {}: {:?}", cursor, pair);
        }
        for decoration in &first {
            assert!(decoration.start < decoration.end);
        }
        let second = engine.rebuild(doc, &obs).to_vec();
        assert_eq!(first, second, "rebuild not idempotent at cursor {}", cursor);
    }
}

#[test]
fn same_start_tie_follows_precedence() {
    let doc = "**bold**";
    let list = [("**text**", "strong", false), ("**text", "lead", false)];

    let mut engine = MarkerEngine::new(rules(&list, Precedence::UnsuffixedFirst), RebuildPolicy::default());
    let mut obs = observe(doc.len(), 0);
    obs.has_focus = false;
    assert_eq!(engine.rebuild(doc, &obs).to_vec(), vec![hidden(0, 2), mark(2, 8, "lead", false)]);

    let mut engine = MarkerEngine::new(rules(&list, Precedence::SuffixedFirst), RebuildPolicy::default());
    assert_eq!(
        engine.rebuild(doc, &obs).to_vec(),
        vec![hidden(0, 2), mark(2, 6, "strong", false), hidden(6, 8)]
    );
}

#[test]
fn scanning_stays_inside_the_viewport() {
    let text: Vec<String> = (0..10).map(|i| format!("//m{}//", i)).collect();
    let buffer = Buffer::from_text("notes", &text.join("\n"));
    let mut window = Window::new(0, 2);
    window.set_cursor(5, 0);
    window.ensure_cursor_visible();

    let visible = window.visible_range(&buffer);
    let obs = Observation {
        cursor: buffer.offset_of(window.cursor()),
        selection: window.selection(&buffer),
        has_focus: false,
        visible: vec![visible.clone()],
        live: true,
    };

    let mut engine = MarkerEngine::new(default_rules(), RebuildPolicy::default());
    let decorations = engine.rebuild(&buffer, &obs);
    // Two visible lines, three pieces each
    assert_eq!(decorations.len(), 6);
    assert!(decorations.iter().all(|d| d.start >= visible.start && d.end <= visible.end));
}

#[test]
fn selection_only_changes_wait_for_pointer_release() {
    let doc = "//a// b";
    let mut engine = MarkerEngine::new(default_rules(), RebuildPolicy::default());
    engine.update(doc, &observe(doc.len(), 7), ViewUpdate::all());
    let folded = engine.decorations().to_vec();

    let moved = ViewUpdate {
        selection_set: true,
        ..Default::default()
    };
    assert!(!engine.update(doc, &observe(doc.len(), 3), moved));
    assert_eq!(engine.decorations(), folded.as_slice());

    engine.pointer_released();
    assert!(engine.update(doc, &observe(doc.len(), 3), moved));
    assert!(!engine.decorations()[0].is_hidden());
}

#[test]
fn enter_continues_prefix_marker() {
    let mut lines = Lines::after_enter("# heading");
    let rules = default_rules();

    let result = handle_enter(&mut lines, rules.continuation_prefixes());
    assert_eq!(
        result,
        Continuation::Continued {
            line: 1,
            prefix: "# ".to_string()
        }
    );
    assert_eq!(lines.lines, vec!["# heading", "# "]);
    assert_eq!(lines.cursor, Position::new(1, 2));
}

#[test]
fn enter_on_empty_marker_ends_the_run() {
    let mut lines = Lines::after_enter("# heading\n# ");
    let rules = default_rules();

    let result = handle_enter(&mut lines, rules.continuation_prefixes());
    assert_eq!(result, Continuation::RemovedEmptyMarker { line: 1 });
    assert_eq!(lines.lines, vec!["# heading", "", ""]);
    assert_eq!(lines.cursor, Position::new(2, 0));
}

#[test]
fn enter_elsewhere_is_ignored() {
    let rules = default_rules();

    let mut lines = Lines::after_enter("plain //x//");
    assert_eq!(handle_enter(&mut lines, rules.continuation_prefixes()), Continuation::Ignored);

    let mut first_line = Lines {
        lines: vec![String::new()],
        cursor: Position::new(0, 0),
    };
    assert_eq!(handle_enter(&mut first_line, rules.continuation_prefixes()), Continuation::Ignored);
}

#[test]
fn static_render_wraps_content() {
    let html = render_document("see //this// now\n# title", &default_rules());
    assert_eq!(
        html,
        "<p>see <span class=\"color-yellow\">this</span> now</p>\n<p><span class=\"heading\">title</span></p>\n"
    );
}
