//! Per-view decoration engine
//!
//! This module provides the MarkerEngine that owns the compiled rules, the
//! state carried between rebuilds, the cursor snap slot and the last
//! decoration output of one editor view.

use super::collect::{collect_matches, TextSource};
use super::decorate::{build_decorations, Decoration, EngineState, Observation};
use super::rule::RuleSet;
use super::snap::CursorSnap;

/// What changed in the view since the last update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewUpdate {
    pub doc_changed: bool,
    pub viewport_changed: bool,
    pub geometry_changed: bool,
    pub focus_changed: bool,
    pub selection_set: bool,
}

impl ViewUpdate {
    /// Everything changed (first paint, rule reload)
    pub fn all() -> Self {
        Self {
            doc_changed: true,
            viewport_changed: true,
            geometry_changed: true,
            focus_changed: true,
            selection_set: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// When a selection-only change triggers a rebuild
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildPolicy {
    /// Rebuild on keyboard-driven selection changes too, not only after a
    /// pointer release
    pub rebuild_on_keyboard_selection: bool,
}

/// Decoration engine for one editor view
#[derive(Debug, Default)]
pub struct MarkerEngine {
    rules: RuleSet,
    state: EngineState,
    snap: CursorSnap,
    decorations: Vec<Decoration>,
    policy: RebuildPolicy,
}

impl MarkerEngine {
    pub fn new(rules: RuleSet, policy: RebuildPolicy) -> Self {
        Self {
            rules,
            policy,
            ..Default::default()
        }
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Replace the rule set; sticky state no longer refers to valid matches
    pub fn set_rules(&mut self, rules: RuleSet) {
        self.rules = rules;
        self.state.last_raw_match_origin_index = None;
        self.state.was_inside_any_match = false;
        self.decorations.clear();
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    /// Record a pointer release; the next selection change will rebuild
    pub fn pointer_released(&mut self) {
        self.state.pending_pointer_release = true;
    }

    /// Whether `update` calls for a rebuild
    pub fn should_rebuild(&self, update: ViewUpdate) -> bool {
        update.doc_changed
            || update.viewport_changed
            || update.geometry_changed
            || update.focus_changed
            || (update.selection_set
                && (self.state.pending_pointer_release || self.policy.rebuild_on_keyboard_selection))
    }

    /// Rebuild if `update` calls for it; returns whether it did
    pub fn update<T>(&mut self, text: &T, obs: &Observation, update: ViewUpdate) -> bool
    where
        T: TextSource + ?Sized,
    {
        if !self.should_rebuild(update) {
            return false;
        }
        self.rebuild(text, obs);
        true
    }

    /// Recompute decorations for the current snapshot
    ///
    /// Outside live mode the output is empty and the state is left alone.
    pub fn rebuild<T>(&mut self, text: &T, obs: &Observation) -> &[Decoration]
    where
        T: TextSource + ?Sized,
    {
        let _span = tracing::trace_span!("rebuild_decorations").entered();
        self.state.pending_pointer_release = false;

        if !obs.live {
            self.decorations.clear();
            return &self.decorations;
        }

        let matches = collect_matches(text, &obs.visible, &self.rules);
        self.decorations = build_decorations(matches, obs, &mut self.state, &mut self.snap);
        tracing::debug!(
            "rebuild: {} decorations, inside match: {}",
            self.decorations.len(),
            self.state.was_inside_any_match
        );
        &self.decorations
    }

    /// Decorations from the last rebuild
    pub fn decorations(&self) -> &[Decoration] {
        &self.decorations
    }

    /// Drain the pending cursor relocation; call once per frame
    pub fn take_snap(&mut self) -> Option<usize> {
        self.snap.take()
    }

    pub fn has_pending_snap(&self) -> bool {
        self.snap.is_pending()
    }
}
