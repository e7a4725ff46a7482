//! Incremental builder for the immutable syntax tree.

use text_size::{TextRange, TextSize};

use crate::syntax::{Child, NodeData, TokenData};
use crate::{NodeOrToken, SyntaxKind, SyntaxTree};

struct Opened {
    node: u32,
    children: Vec<Child>,
}

/// Builds a `SyntaxTree` from a well-nested sequence of node and token events.
///
/// Tokens must arrive in source order and cover the text without gaps; the
/// tree borrows the text instead of copying it.
pub struct TreeBuilder<'t> {
    text: &'t str,
    nodes: Vec<NodeData>,
    children: Vec<Child>,
    tokens: Vec<TokenData>,

    children_pool: Vec<Vec<Child>>,
    opened: Vec<Opened>,
    text_len: TextSize,
}

impl Drop for TreeBuilder<'_> {
    fn drop(&mut self) {
        if !std::thread::panicking() && !self.opened.is_empty() {
            panic!("you should call `TreeBuilder::finish()`");
        }
    }
}

const DEFAULT_TREE_DEPTH: usize = 128;
const DEFAULT_CHILDREN_LEN: usize = 10;

impl<'t> TreeBuilder<'t> {
    /// Creates a new builder for `text`, reserving room for `nodes` nodes and
    /// `tokens` tokens.
    pub fn with_capacity(text: &'t str, nodes: usize, tokens: usize) -> Self {
        Self {
            text,
            nodes: Vec::with_capacity(nodes),
            children: Vec::with_capacity(nodes + tokens),
            tokens: Vec::with_capacity(tokens),

            children_pool: Vec::with_capacity(DEFAULT_TREE_DEPTH),
            opened: Vec::with_capacity(DEFAULT_TREE_DEPTH),
            text_len: TextSize::new(0),
        }
    }

    pub fn new(text: &'t str) -> Self {
        Self::with_capacity(text, 0, 0)
    }

    /// Retrieves a recycled children buffer or allocates a new one.
    fn new_children_vec(&mut self) -> Vec<Child> {
        self.children_pool.pop().unwrap_or_else(|| Vec::with_capacity(DEFAULT_CHILDREN_LEN))
    }

    /// Returns a children buffer to the pool.
    fn recycle_children_vec(&mut self, vec: Vec<Child>) {
        self.children_pool.push(vec);
    }

    #[track_caller]
    fn expect_last_opened(&mut self) -> &mut Opened {
        self.opened.last_mut().expect("no opened nodes?")
    }

    /// Starts a new node of the given kind.
    pub fn start_node(&mut self, kind: SyntaxKind) {
        self.start_node_impl(kind, None);
    }

    /// Starts an error node carrying `message`.
    pub fn start_error_node(&mut self, message: impl Into<Box<str>>) {
        self.start_node_impl(SyntaxKind::ERROR, Some(message.into()));
    }

    fn start_node_impl(&mut self, kind: SyntaxKind, error: Option<Box<str>>) {
        let new_node = to_u32(self.nodes.len());
        let (parent, index_in_parent) = match self.opened.last_mut() {
            Some(parent) => {
                let index = to_u32(parent.children.len());
                parent.children.push(NodeOrToken::Node(new_node));
                (Some(parent.node), index)
            }
            None => {
                assert!(self.nodes.is_empty(), "a syntax tree has exactly one root");
                (None, 0)
            }
        };
        self.nodes.push(NodeData {
            kind,
            parent,
            index_in_parent,
            range: TextRange::empty(self.text_len),
            children_start: 0,
            children_len: 0,
            error,
        });
        let children = self.new_children_vec();
        self.opened.push(Opened { node: new_node, children });
    }

    /// Adds a leaf of the given kind covering `range`.
    pub fn token(&mut self, kind: SyntaxKind, range: TextRange) {
        assert_eq!(range.start(), self.text_len, "tokens must be contiguous");
        assert!(self.text.is_char_boundary(usize::from(range.end())));
        self.text_len = range.end();

        let token = to_u32(self.tokens.len());
        let parent = self.expect_last_opened();
        let index_in_parent = to_u32(parent.children.len());
        parent.children.push(NodeOrToken::Token(token));
        let parent = parent.node;
        self.tokens.push(TokenData { kind, range, parent, index_in_parent });
    }

    /// Finishes the most recently started node.
    pub fn finish_node(&mut self) {
        let Opened { node, mut children } = self.opened.pop().expect("no opened nodes?");
        let node = &mut self.nodes[node as usize];
        node.range = TextRange::new(node.range.start(), self.text_len);
        node.children_start = to_u32(self.children.len());
        node.children_len = to_u32(children.len());
        self.children.append(&mut children);
        self.recycle_children_vec(children);
    }

    /// Finishes building and returns the immutable `SyntaxTree`.
    pub fn finish(mut self) -> SyntaxTree<'t> {
        assert!(self.opened.is_empty(), "unfinished nodes");
        assert!(!self.nodes.is_empty(), "a syntax tree has exactly one root");
        assert_eq!(usize::from(self.text_len), self.text.len(), "tokens must cover the text");

        SyntaxTree {
            text: self.text,
            nodes: std::mem::take(&mut self.nodes).into_boxed_slice(),
            children: std::mem::take(&mut self.children).into_boxed_slice(),
            tokens: std::mem::take(&mut self.tokens).into_boxed_slice(),
        }
    }
}

#[inline]
fn to_u32(index: usize) -> u32 {
    u32::try_from(index).expect("syntax tree too large")
}
