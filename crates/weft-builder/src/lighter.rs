//! Flyweight tree: composite nodes live in one pre-order array, tokens are
//! never stored and are recovered from the token stream on demand.

use std::fmt;

use text_size::{TextRange, TextSize};
use weft_tree::{SyntaxKind, TreeView};

pub(crate) struct LighterNodeData {
    pub(crate) kind: SyntaxKind,
    /// Token index of the first covered token.
    pub(crate) start: u32,
    /// Token index one past the last covered token.
    pub(crate) end: u32,
    pub(crate) parent: Option<u32>,
    /// Index one past the last descendant of this node.
    pub(crate) subtree_end: u32,
    /// Collapsed markers are leaves that cover several tokens.
    pub(crate) leaf: bool,
    pub(crate) error: Option<u32>,
}

/// A node of a [`LighterTree`]: a plain `(kind, range)` value that knows
/// where it sits in the backing array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LighterNode {
    kind: SyntaxKind,
    range: TextRange,
    repr: Repr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Repr {
    Composite(u32),
    Token { lexeme: u32, parent: u32, next: Option<u32> },
}

impl LighterNode {
    pub fn kind(self) -> SyntaxKind {
        self.kind
    }

    pub fn text_range(self) -> TextRange {
        self.range
    }

    pub fn start(self) -> TextSize {
        self.range.start()
    }

    pub fn end(self) -> TextSize {
        self.range.end()
    }

    pub fn is_token(self) -> bool {
        matches!(self.repr, Repr::Token { .. })
    }
}

pub struct LighterTree<'t> {
    text: &'t str,
    kinds: Box<[SyntaxKind]>,
    starts: Box<[TextSize]>,
    nodes: Box<[LighterNodeData]>,
    messages: Box<[Box<str>]>,
}

impl<'t> LighterTree<'t> {
    pub(crate) fn new(
        text: &'t str,
        kinds: Vec<SyntaxKind>,
        starts: Vec<TextSize>,
        nodes: Vec<LighterNodeData>,
        messages: Vec<Box<str>>,
    ) -> Self {
        assert!(!nodes.is_empty(), "a syntax tree has exactly one root");
        Self {
            text,
            kinds: kinds.into_boxed_slice(),
            starts: starts.into_boxed_slice(),
            nodes: nodes.into_boxed_slice(),
            messages: messages.into_boxed_slice(),
        }
    }

    /// Number of composite nodes, collapsed leaves included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn token_count(&self) -> usize {
        self.kinds.len()
    }

    fn composite(&self, index: u32) -> LighterNode {
        let data = &self.nodes[index as usize];
        let range = TextRange::new(self.starts[data.start as usize], self.starts[data.end as usize]);
        LighterNode { kind: data.kind, range, repr: Repr::Composite(index) }
    }

    /// The child of `parent` at token `lexeme`, given the next composite
    /// child that has not been visited yet.
    fn child_at(&self, parent: u32, next: Option<u32>, lexeme: u32) -> Option<LighterNode> {
        if let Some(next) = next
            && self.nodes[next as usize].start <= lexeme
        {
            return Some(self.composite(next));
        }
        if lexeme >= self.nodes[parent as usize].end {
            return None;
        }
        let index = lexeme as usize;
        Some(LighterNode {
            kind: self.kinds[index],
            range: TextRange::new(self.starts[index], self.starts[index + 1]),
            repr: Repr::Token { lexeme, parent, next },
        })
    }
}

impl TreeView for LighterTree<'_> {
    type Element<'a>
        = LighterNode
    where
        Self: 'a;

    fn text(&self) -> &str {
        self.text
    }

    fn root(&self) -> LighterNode {
        self.composite(0)
    }

    fn kind(&self, element: LighterNode) -> SyntaxKind {
        element.kind
    }

    fn text_range(&self, element: LighterNode) -> TextRange {
        element.range
    }

    fn is_leaf(&self, element: LighterNode) -> bool {
        match element.repr {
            Repr::Composite(index) => self.nodes[index as usize].leaf,
            Repr::Token { .. } => true,
        }
    }

    fn error_message(&self, element: LighterNode) -> Option<&str> {
        let Repr::Composite(index) = element.repr else { return None };
        let message = self.nodes[index as usize].error?;
        Some(&self.messages[message as usize])
    }

    fn parent(&self, element: LighterNode) -> Option<LighterNode> {
        match element.repr {
            Repr::Composite(index) => self.nodes[index as usize].parent.map(|it| self.composite(it)),
            Repr::Token { parent, .. } => Some(self.composite(parent)),
        }
    }

    fn first_child(&self, element: LighterNode) -> Option<LighterNode> {
        let Repr::Composite(index) = element.repr else { return None };
        let data = &self.nodes[index as usize];
        if data.leaf {
            return None;
        }
        let next = (index + 1 < data.subtree_end).then_some(index + 1);
        self.child_at(index, next, data.start)
    }

    fn next_sibling(&self, element: LighterNode) -> Option<LighterNode> {
        match element.repr {
            Repr::Composite(index) => {
                let data = &self.nodes[index as usize];
                let parent = data.parent?;
                let next = (data.subtree_end < self.nodes[parent as usize].subtree_end)
                    .then_some(data.subtree_end);
                self.child_at(parent, next, data.end)
            }
            Repr::Token { lexeme, parent, next } => self.child_at(parent, next, lexeme + 1),
        }
    }
}

impl fmt::Debug for LighterTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries((0..self.nodes.len()).map(|index| {
                let node = self.composite(index as u32);
                (node.kind, node.range)
            }))
            .finish()
    }
}
