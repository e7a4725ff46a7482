//! Edge binders decide how many whitespace and comment tokens around a node
//! boundary belong to the node.
//!
//! At every boundary the materializer collects the run of insignificant
//! tokens touching it and asks the boundary's binder for a position inside
//! that run: `0` puts the boundary before the whole run, `tokens.len()` after
//! it.

use std::fmt;

use rustc_hash::FxHashMap;
use text_size::{TextRange, TextSize};
use weft_tree::{SyntaxKind, TokenSet};

/// The run of insignificant tokens around one node boundary.
#[derive(Debug, Clone, Copy)]
pub struct EdgeTokens<'a> {
    kinds: &'a [SyntaxKind],
    /// `kinds.len() + 1` entries.
    starts: &'a [TextSize],
    text: &'a str,
}

impl<'a> EdgeTokens<'a> {
    pub(crate) fn new(kinds: &'a [SyntaxKind], starts: &'a [TextSize], text: &'a str) -> Self {
        debug_assert_eq!(kinds.len() + 1, starts.len());
        Self { kinds, starts, text }
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn kind(&self, index: usize) -> SyntaxKind {
        self.kinds[index]
    }

    pub fn range(&self, index: usize) -> TextRange {
        TextRange::new(self.starts[index], self.starts[index + 1])
    }

    pub fn text(&self, index: usize) -> &'a str {
        &self.text[self.range(index)]
    }
}

pub trait EdgeBinder: fmt::Debug + Sync {
    /// Position of the boundary inside `tokens`, in `0..=tokens.len()`.
    ///
    /// `at_stream_edge` is set when the run touches the start or the end of
    /// the input.
    fn edge_position(&self, tokens: &EdgeTokens<'_>, at_stream_edge: bool) -> usize;
}

pub type Binder = &'static dyn EdgeBinder;

/// Leaves every token outside the node's left edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLeftBinder;

impl EdgeBinder for DefaultLeftBinder {
    fn edge_position(&self, tokens: &EdgeTokens<'_>, _at_stream_edge: bool) -> usize {
        tokens.len()
    }
}

/// Leaves every token outside the node's right edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRightBinder;

impl EdgeBinder for DefaultRightBinder {
    fn edge_position(&self, _tokens: &EdgeTokens<'_>, _at_stream_edge: bool) -> usize {
        0
    }
}

/// Pulls the whole run into the node's left edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyLeftBinder;

impl EdgeBinder for GreedyLeftBinder {
    fn edge_position(&self, _tokens: &EdgeTokens<'_>, _at_stream_edge: bool) -> usize {
        0
    }
}

/// Pulls the whole run into the node's right edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyRightBinder;

impl EdgeBinder for GreedyRightBinder {
    fn edge_position(&self, tokens: &EdgeTokens<'_>, _at_stream_edge: bool) -> usize {
        tokens.len()
    }
}

/// Left binder that keeps the comments directly above a node inside it.
///
/// Walking back from the node, comments are claimed until a blank line or a
/// significant gap is found.
#[derive(Debug, Clone, Copy)]
pub struct LeadingCommentsBinder {
    comments: TokenSet,
}

impl LeadingCommentsBinder {
    pub const fn new(comments: TokenSet) -> Self {
        Self { comments }
    }
}

impl EdgeBinder for LeadingCommentsBinder {
    fn edge_position(&self, tokens: &EdgeTokens<'_>, _at_stream_edge: bool) -> usize {
        let mut result = tokens.len();
        for index in (0..tokens.len()).rev() {
            if self.comments.contains(tokens.kind(index)) {
                result = index;
            } else if tokens.text(index).matches('\n').count() > 1 {
                break;
            }
        }
        result
    }
}

/// Right binder that claims comments on the same line as the node's end.
#[derive(Debug, Clone, Copy)]
pub struct TrailingCommentsBinder {
    comments: TokenSet,
}

impl TrailingCommentsBinder {
    pub const fn new(comments: TokenSet) -> Self {
        Self { comments }
    }
}

impl EdgeBinder for TrailingCommentsBinder {
    fn edge_position(&self, tokens: &EdgeTokens<'_>, _at_stream_edge: bool) -> usize {
        let mut result = 0;
        for index in 0..tokens.len() {
            if self.comments.contains(tokens.kind(index)) {
                result = index + 1;
            } else if tokens.text(index).contains('\n') {
                break;
            }
        }
        result
    }
}

pub const DEFAULT_LEFT: Binder = &DefaultLeftBinder;
pub const DEFAULT_RIGHT: Binder = &DefaultRightBinder;
pub const GREEDY_LEFT: Binder = &GreedyLeftBinder;
pub const GREEDY_RIGHT: Binder = &GreedyRightBinder;

/// Binders for both edges of one node.
#[derive(Debug, Clone, Copy)]
pub struct EdgeBinders {
    pub left: Binder,
    pub right: Binder,
}

impl EdgeBinders {
    pub const DEFAULT: Self = Self { left: DEFAULT_LEFT, right: DEFAULT_RIGHT };

    pub const fn new(left: Binder, right: Binder) -> Self {
        Self { left, right }
    }
}

impl Default for EdgeBinders {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Per-kind binders; kinds without an entry use [`EdgeBinders::DEFAULT`].
#[derive(Debug, Clone, Default)]
pub struct BinderTable {
    binders: FxHashMap<SyntaxKind, EdgeBinders>,
}

impl BinderTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: SyntaxKind, binders: EdgeBinders) {
        self.binders.insert(kind, binders);
    }

    pub fn with(mut self, kind: SyntaxKind, binders: EdgeBinders) -> Self {
        self.register(kind, binders);
        self
    }

    pub fn get(&self, kind: SyntaxKind) -> EdgeBinders {
        self.binders.get(&kind).copied().unwrap_or_default()
    }
}
