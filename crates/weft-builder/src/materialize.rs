//! Turning a finished production log into trees.
//!
//! Materialization validates the log, resolves every boundary against the
//! whitespace around it and then replays the events into a [`TreeSink`]. The
//! same replay feeds both tree representations, so they agree by
//! construction.

use text_size::{TextRange, TextSize};
use weft_errors::Diagnostic;
use weft_tree::{SyntaxKind, SyntaxTree, TokenSet, TreeBuilder};

use crate::binder::EdgeTokens;
use crate::classifier::Classifier;
use crate::lighter::{LighterNodeData, LighterTree};
use crate::log::{Completion, MarkerState, Production, ProductionLog};
use crate::violation::ProtocolViolation;

/// A materialized tree together with the syntax errors recorded in it.
#[derive(Debug)]
pub struct Parse<T> {
    tree: T,
    errors: Vec<Diagnostic>,
}

impl<T> Parse<T> {
    pub(crate) fn new(tree: T, errors: Vec<Diagnostic>) -> Self {
        Self { tree, errors }
    }

    pub fn tree(&self) -> &T {
        &self.tree
    }

    /// One diagnostic per error node in the tree, ordered by offset.
    pub fn errors(&self) -> &[Diagnostic] {
        &self.errors
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn into_parts(self) -> (T, Vec<Diagnostic>) {
        (self.tree, self.errors)
    }
}

pub(crate) fn validate(
    log: &ProductionLog,
    kinds: &[SyntaxKind],
    starts: &[TextSize],
    insignificant: TokenSet,
) -> Result<(), ProtocolViolation> {
    if let Some(marker) = log.markers().find(|marker| marker.state == MarkerState::Open) {
        return Err(ProtocolViolation::Unterminated { site: marker.site });
    }

    let production = log.production();
    let Some(&Production::Start(root)) = production.first() else {
        return Err(ProtocolViolation::NoRoot);
    };

    let mut open = Vec::new();
    for (index, &event) in production.iter().enumerate() {
        match event {
            Production::Start(id) if open.is_empty() && index != 0 => {
                return Err(ProtocolViolation::MultipleRoots { site: log.marker(id).site });
            }
            Production::Start(id) => open.push(id),
            Production::Finish(id) => {
                let top = open.pop().expect("finish event without a start");
                if top != id {
                    return Err(ProtocolViolation::CrossingMarkers {
                        site: log.marker(top).site,
                        other: log.marker(id).site,
                    });
                }
            }
        }
    }

    let start = log.lexeme(Production::Start(root));
    let end = log.lexeme(Production::Finish(root));
    let outside =
        (0..start).chain(end..kinds.len()).find(|&index| !insignificant.contains(kinds[index]));
    match outside {
        Some(index) => Err(ProtocolViolation::TokensOutsideRoot { offset: starts[index] }),
        None => Ok(()),
    }
}

/// Resolves the token index of every event in the log.
///
/// Boundaries are visited in log order; each one may only move inside the
/// run of insignificant tokens around it and never before the boundary
/// resolved just before it. The root always spans the whole input.
pub(crate) fn bind_edges(
    log: &ProductionLog,
    text: &str,
    kinds: &[SyntaxKind],
    starts: &[TextSize],
    insignificant: TokenSet,
    classifier: &Classifier,
) -> Vec<usize> {
    let production = log.production();
    let mut edges = production.iter().map(|&event| log.lexeme(event)).collect::<Vec<_>>();
    let root_end = edges.len() - 1;
    edges[0] = 0;
    edges[root_end] = kinds.len();

    let mut last = 0;
    for index in 1..root_end {
        let lexeme = edges[index].max(last);

        let mut run_start = lexeme;
        while run_start > last && insignificant.contains(kinds[run_start - 1]) {
            run_start -= 1;
        }
        let mut run_end = lexeme;
        while run_end < kinds.len() && insignificant.contains(kinds[run_end]) {
            run_end += 1;
        }

        edges[index] = if run_start == run_end {
            lexeme
        } else {
            let (id, left) = match production[index] {
                Production::Start(id) => (id, true),
                Production::Finish(id) => (id, false),
            };
            let binders = log
                .marker(id)
                .binders
                .unwrap_or_else(|| classifier.binders(log.completion(id).kind()));
            let binder = if left { binders.left } else { binders.right };
            let tokens =
                EdgeTokens::new(&kinds[run_start..run_end], &starts[run_start..=run_end], text);
            let at_stream_edge = run_start == 0 || run_end == kinds.len();
            run_start + binder.edge_position(&tokens, at_stream_edge).min(run_end - run_start)
        };
        last = edges[index];
    }

    edges
}

/// Receives the replayed events of a validated log.
pub(crate) trait TreeSink {
    fn start_node(&mut self, kind: SyntaxKind, error: Option<&str>, lexeme: usize);

    fn token(&mut self, lexeme: usize);

    /// A collapsed marker covering the tokens `start..end`.
    fn leaf(&mut self, kind: SyntaxKind, start: usize, end: usize);

    fn finish_node(&mut self, lexeme: usize);
}

pub(crate) fn walk(
    log: &ProductionLog,
    edges: &[usize],
    starts: &[TextSize],
    sink: &mut impl TreeSink,
) -> Vec<Diagnostic> {
    let production = log.production();
    let mut errors = Vec::new();
    let mut opened = Vec::new();
    let mut lexeme = 0;
    let mut index = 0;

    while index < production.len() {
        let edge = edges[index];
        while lexeme < edge {
            sink.token(lexeme);
            lexeme += 1;
        }

        match production[index] {
            Production::Start(id) => match log.completion(id) {
                &Completion::Collapse(kind) => {
                    let finish = production[index..]
                        .iter()
                        .position(|&event| event == Production::Finish(id))
                        .map(|offset| index + offset)
                        .expect("completed marker has a finish event");
                    if opened.is_empty() {
                        // A collapsed root keeps its tokens as children.
                        sink.start_node(kind, None, edge);
                        opened.push(edge);
                        index = finish;
                        continue;
                    }
                    lexeme = edges[finish];
                    sink.leaf(kind, edge, lexeme);
                    index = finish;
                }
                &Completion::Done(kind) => {
                    sink.start_node(kind, None, edge);
                    opened.push(edge);
                }
                Completion::Error(message) => {
                    sink.start_node(SyntaxKind::ERROR, Some(&**message), edge);
                    opened.push(edge);
                }
            },
            Production::Finish(id) => {
                let start = opened.pop().expect("unbalanced production log");
                if let Completion::Error(message) = log.completion(id) {
                    let range = TextRange::new(starts[start], starts[edge]);
                    errors.push(Diagnostic::error(message.clone(), range));
                }
                sink.finish_node(edge);
            }
        }
        index += 1;
    }

    errors.sort_by_key(Diagnostic::offset);
    errors
}

pub(crate) struct SyntaxTreeSink<'a, 't> {
    builder: TreeBuilder<'t>,
    kinds: &'a [SyntaxKind],
    starts: &'a [TextSize],
}

impl<'a, 't> SyntaxTreeSink<'a, 't> {
    pub(crate) fn new(
        text: &'t str,
        kinds: &'a [SyntaxKind],
        starts: &'a [TextSize],
        nodes: usize,
    ) -> Self {
        Self { builder: TreeBuilder::with_capacity(text, nodes, kinds.len()), kinds, starts }
    }

    pub(crate) fn finish(self) -> SyntaxTree<'t> {
        self.builder.finish()
    }

    fn range(&self, start: usize, end: usize) -> TextRange {
        TextRange::new(self.starts[start], self.starts[end])
    }
}

impl TreeSink for SyntaxTreeSink<'_, '_> {
    fn start_node(&mut self, kind: SyntaxKind, error: Option<&str>, _lexeme: usize) {
        match error {
            Some(message) => self.builder.start_error_node(message),
            None => self.builder.start_node(kind),
        }
    }

    fn token(&mut self, lexeme: usize) {
        let range = self.range(lexeme, lexeme + 1);
        self.builder.token(self.kinds[lexeme], range);
    }

    fn leaf(&mut self, kind: SyntaxKind, start: usize, end: usize) {
        let range = self.range(start, end);
        self.builder.token(kind, range);
    }

    fn finish_node(&mut self, _lexeme: usize) {
        self.builder.finish_node();
    }
}

#[derive(Default)]
pub(crate) struct LighterSink {
    nodes: Vec<LighterNodeData>,
    messages: Vec<Box<str>>,
    opened: Vec<u32>,
}

impl LighterSink {
    pub(crate) fn with_capacity(nodes: usize) -> Self {
        Self { nodes: Vec::with_capacity(nodes), ..Self::default() }
    }

    pub(crate) fn finish(
        self,
        text: &str,
        kinds: Vec<SyntaxKind>,
        starts: Vec<TextSize>,
    ) -> LighterTree<'_> {
        debug_assert!(self.opened.is_empty());
        LighterTree::new(text, kinds, starts, self.nodes, self.messages)
    }

    fn push(
        &mut self,
        kind: SyntaxKind,
        start: usize,
        end: usize,
        leaf: bool,
        error: Option<u32>,
    ) -> u32 {
        let index = to_u32(self.nodes.len());
        self.nodes.push(LighterNodeData {
            kind,
            start: to_u32(start),
            end: to_u32(end),
            parent: self.opened.last().copied(),
            subtree_end: index + 1,
            leaf,
            error,
        });
        index
    }
}

impl TreeSink for LighterSink {
    fn start_node(&mut self, kind: SyntaxKind, error: Option<&str>, lexeme: usize) {
        let error = error.map(|message| {
            self.messages.push(message.into());
            to_u32(self.messages.len() - 1)
        });
        let index = self.push(kind, lexeme, lexeme, false, error);
        self.opened.push(index);
    }

    fn token(&mut self, _lexeme: usize) {}

    fn leaf(&mut self, kind: SyntaxKind, start: usize, end: usize) {
        self.push(kind, start, end, true, None);
    }

    fn finish_node(&mut self, lexeme: usize) {
        let index = self.opened.pop().expect("no opened nodes?");
        let subtree_end = to_u32(self.nodes.len());
        let node = &mut self.nodes[index as usize];
        node.end = to_u32(lexeme);
        node.subtree_end = subtree_end;
    }
}

#[inline]
fn to_u32(index: usize) -> u32 {
    u32::try_from(index).expect("syntax tree too large")
}
