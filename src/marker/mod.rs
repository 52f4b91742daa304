//! Inline marker folding
//!
//! This module turns user rules like `//text//` into live decorations:
//! - Markers away from the cursor have their delimiters hidden
//! - The marker under the cursor (or inside the selection) is shown raw
//! - Enter on a prefix-only marker line continues the prefix
//! - A static pass rewrites non-live output

mod collect;
mod continuation;
mod decorate;
mod engine;
mod rule;
mod snap;
mod static_render;

pub use collect::{collect_matches, Match, TextSource};
pub use continuation::{handle_enter, Continuation, LineEditor, Position};
pub use decorate::{build_decorations, Decoration, DecorationKind, EngineState, Observation, Selection};
pub use engine::{MarkerEngine, RebuildPolicy, ViewUpdate};
pub use rule::{CompiledRule, Precedence, Rule, RuleSet, DEFAULT_PLACEHOLDER};
pub use snap::CursorSnap;
pub use static_render::{post_process, render_document, Node};
