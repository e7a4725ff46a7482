//! Public syntax tree API built on immutable, parent-linked nodes.

use std::fmt;
use std::iter::successors;

use text_size::{TextRange, TextSize};

use crate::SyntaxKind;
use crate::view::{Preorder, TreeView, WalkEvent};

/// Child slot: index into the node or token table.
pub(crate) type Child = NodeOrToken<u32, u32>;

pub(crate) struct NodeData {
    pub(crate) kind: SyntaxKind,
    /// Back reference, used for traversal only.
    pub(crate) parent: Option<u32>,
    pub(crate) index_in_parent: u32,
    pub(crate) range: TextRange,
    pub(crate) children_start: u32,
    pub(crate) children_len: u32,
    pub(crate) error: Option<Box<str>>,
}

pub(crate) struct TokenData {
    pub(crate) kind: SyntaxKind,
    pub(crate) range: TextRange,
    pub(crate) parent: u32,
    pub(crate) index_in_parent: u32,
}

/// Owned syntax tree for a single source text.
///
/// Nodes are stored in one table, every node owning a contiguous run of the
/// shared children table; the source text is borrowed, never copied.
pub struct SyntaxTree<'t> {
    pub(crate) text: &'t str,
    pub(crate) nodes: Box<[NodeData]>,
    pub(crate) children: Box<[Child]>,
    /// Every leaf in source order.
    pub(crate) tokens: Box<[TokenData]>,
}

impl<'t> SyntaxTree<'t> {
    /// Returns the root syntax node.
    #[inline]
    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode { tree: self, index: 0 }
    }

    /// Returns the full source text for this tree.
    #[inline]
    pub fn text(&self) -> &'t str {
        self.text
    }

    /// Number of nodes, the root included.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaves.
    #[inline]
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// Iterates over every leaf in source order.
    pub fn tokens(&self) -> impl DoubleEndedIterator<Item = SyntaxToken<'_>> + ExactSizeIterator {
        (0..self.tokens.len() as u32).map(move |index| SyntaxToken { tree: self, index })
    }

    /// Finds the leaves at `offset`.
    pub fn token_at_offset(&self, offset: TextSize) -> TokenAtOffset<SyntaxToken<'_>> {
        self.root().token_at_offset(offset)
    }

    fn child(&self, child: Child) -> SyntaxElement<'_> {
        match child {
            NodeOrToken::Node(index) => NodeOrToken::Node(SyntaxNode { tree: self, index }),
            NodeOrToken::Token(index) => NodeOrToken::Token(SyntaxToken { tree: self, index }),
        }
    }
}

impl fmt::Debug for SyntaxTree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("text_len", &self.text.len())
            .field("nodes", &self.nodes.len())
            .field("tokens", &self.tokens.len())
            .finish_non_exhaustive()
    }
}

/// Token handle tied to the lifetime of the tree.
#[derive(Clone, Copy)]
pub struct SyntaxToken<'a> {
    tree: &'a SyntaxTree<'a>,
    index: u32,
}

impl<'a> SyntaxToken<'a> {
    #[inline]
    fn data(self) -> &'a TokenData {
        &self.tree.tokens[self.index as usize]
    }

    /// Returns this token's kind.
    #[inline]
    pub fn kind(self) -> SyntaxKind {
        self.data().kind
    }

    #[inline]
    pub fn text_range(self) -> TextRange {
        self.data().range
    }

    #[inline]
    pub fn text(self) -> &'a str {
        &self.tree.text[self.text_range()]
    }

    /// Returns the parent node.
    #[inline]
    pub fn parent(self) -> SyntaxNode<'a> {
        SyntaxNode { tree: self.tree, index: self.data().parent }
    }

    /// Returns an iterator of parent nodes, starting from the immediate parent.
    #[inline]
    pub fn parent_ancestors(self) -> impl Iterator<Item = SyntaxNode<'a>> + Clone {
        self.parent().ancestors()
    }

    /// Returns the previous leaf in source order.
    #[inline]
    pub fn prev_token(self) -> Option<Self> {
        let index = self.index.checked_sub(1)?;
        Some(Self { tree: self.tree, index })
    }

    /// Returns the next leaf in source order.
    #[inline]
    pub fn next_token(self) -> Option<Self> {
        let index = self.index + 1;
        ((index as usize) < self.tree.tokens.len()).then_some(Self { tree: self.tree, index })
    }

    #[inline]
    pub fn next_sibling_or_token(self) -> Option<SyntaxElement<'a>> {
        let data = self.data();
        self.parent().child_at(data.index_in_parent as usize + 1)
    }

    #[inline]
    pub fn prev_sibling_or_token(self) -> Option<SyntaxElement<'a>> {
        let index = self.data().index_in_parent.checked_sub(1)?;
        self.parent().child_at(index as usize)
    }
}

impl PartialEq for SyntaxToken<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}

impl Eq for SyntaxToken<'_> {}

impl fmt::Debug for SyntaxToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?} {:?}", self.kind(), self.text_range(), self.text())
    }
}

impl fmt::Display for SyntaxToken<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Node handle tied to the lifetime of the tree.
#[derive(Clone, Copy)]
pub struct SyntaxNode<'a> {
    tree: &'a SyntaxTree<'a>,
    index: u32,
}

impl<'a> SyntaxNode<'a> {
    #[inline]
    fn data(self) -> &'a NodeData {
        &self.tree.nodes[self.index as usize]
    }

    #[inline]
    fn child_slots(self) -> &'a [Child] {
        let data = self.data();
        let start = data.children_start as usize;
        &self.tree.children[start..start + data.children_len as usize]
    }

    fn child_at(self, index: usize) -> Option<SyntaxElement<'a>> {
        let child = *self.child_slots().get(index)?;
        Some(self.tree.child(child))
    }

    /// Returns this node's kind.
    #[inline]
    pub fn kind(self) -> SyntaxKind {
        self.data().kind
    }

    /// Returns the cached absolute range of this node.
    #[inline]
    pub fn text_range(self) -> TextRange {
        self.data().range
    }

    #[inline]
    pub fn text(self) -> &'a str {
        &self.tree.text[self.text_range()]
    }

    /// Returns `true` for nodes closed with an error message.
    #[inline]
    pub fn is_error(self) -> bool {
        self.data().error.is_some()
    }

    #[inline]
    pub fn error_message(self) -> Option<&'a str> {
        self.data().error.as_deref()
    }

    /// Returns the parent node if present.
    #[inline]
    pub fn parent(self) -> Option<Self> {
        Some(Self { tree: self.tree, index: self.data().parent? })
    }

    /// Returns an iterator over this node and its ancestors.
    #[inline]
    pub fn ancestors(self) -> impl Iterator<Item = SyntaxNode<'a>> + Clone {
        successors(Some(self), |node| node.parent())
    }

    /// Iterates over child nodes and tokens.
    #[inline]
    pub fn children_with_tokens(self) -> ChildrenWithTokens<'a> {
        ChildrenWithTokens { tree: self.tree, iter: self.child_slots().iter() }
    }

    /// Iterates over child nodes only.
    #[inline]
    pub fn children(self) -> Children<'a> {
        Children { inner: self.children_with_tokens() }
    }

    #[inline]
    pub fn first_child(self) -> Option<Self> {
        self.children().next()
    }

    #[inline]
    pub fn last_child(self) -> Option<Self> {
        self.children().next_back()
    }

    #[inline]
    pub fn first_child_or_token(self) -> Option<SyntaxElement<'a>> {
        self.child_at(0)
    }

    #[inline]
    pub fn last_child_or_token(self) -> Option<SyntaxElement<'a>> {
        self.children_with_tokens().next_back()
    }

    #[inline]
    pub fn next_sibling_or_token(self) -> Option<SyntaxElement<'a>> {
        let parent = self.parent()?;
        parent.child_at(self.data().index_in_parent as usize + 1)
    }

    #[inline]
    pub fn prev_sibling_or_token(self) -> Option<SyntaxElement<'a>> {
        let parent = self.parent()?;
        let index = self.data().index_in_parent.checked_sub(1)?;
        parent.child_at(index as usize)
    }

    pub fn next_sibling(self) -> Option<Self> {
        successors(self.next_sibling_or_token(), |element| element.next_sibling_or_token())
            .find_map(NodeOrToken::into_node)
    }

    pub fn prev_sibling(self) -> Option<Self> {
        successors(self.prev_sibling_or_token(), |element| element.prev_sibling_or_token())
            .find_map(NodeOrToken::into_node)
    }

    /// Returns the first leaf of this subtree, if the node is not empty.
    pub fn first_token(self) -> Option<SyntaxToken<'a>> {
        let mut element = self.first_child_or_token()?;
        loop {
            match element {
                NodeOrToken::Token(token) => return Some(token),
                NodeOrToken::Node(node) => match node.first_child_or_token() {
                    Some(child) => element = child,
                    None => element = node.next_sibling_or_token()?,
                },
            }
        }
    }

    /// Returns the last leaf of this subtree, if the node is not empty.
    pub fn last_token(self) -> Option<SyntaxToken<'a>> {
        let mut element = self.last_child_or_token()?;
        loop {
            match element {
                NodeOrToken::Token(token) => return Some(token),
                NodeOrToken::Node(node) => match node.last_child_or_token() {
                    Some(child) => element = child,
                    None => element = node.prev_sibling_or_token()?,
                },
            }
        }
    }

    /// Pre-order walk over this subtree, tokens included.
    pub fn preorder_with_tokens(self) -> Preorder<'a, SyntaxTree<'a>> {
        Preorder::new(self.tree, NodeOrToken::Node(self))
    }

    /// Every node of this subtree in pre-order, this node first.
    pub fn descendants(self) -> impl Iterator<Item = SyntaxNode<'a>> {
        self.preorder_with_tokens().filter_map(|event| match event {
            WalkEvent::Enter(NodeOrToken::Node(node)) => Some(node),
            _ => None,
        })
    }

    /// Finds the leaves at `offset` within this node.
    pub fn token_at_offset(self, offset: TextSize) -> TokenAtOffset<SyntaxToken<'a>> {
        let range = self.text_range();
        if !range.contains_inclusive(offset) {
            return TokenAtOffset::None;
        }
        let tokens = &self.tree.tokens;
        let index = tokens.partition_point(|token| token.range.end() <= offset);
        let make = |index: usize| SyntaxToken { tree: self.tree, index: index as u32 };
        let inside = |index: usize| range.contains_range(tokens[index].range);

        let right = (index < tokens.len() && tokens[index].range.start() <= offset && inside(index))
            .then(|| make(index));
        let left = index
            .checked_sub(1)
            .filter(|&prev| tokens[prev].range.end() == offset && inside(prev))
            .map(make);

        match (left, right) {
            (Some(left), Some(right)) if left.text_range().is_empty() => TokenAtOffset::Single(right),
            (Some(left), Some(right)) => TokenAtOffset::Between(left, right),
            (Some(token), None) | (None, Some(token)) => TokenAtOffset::Single(token),
            (None, None) => TokenAtOffset::None,
        }
    }

    /// Returns the smallest element of this subtree covering `range`.
    pub fn covering_element(self, range: TextRange) -> SyntaxElement<'a> {
        let mut node = self;
        'descend: loop {
            for child in node.children_with_tokens() {
                if !child.text_range().contains_range(range) {
                    continue;
                }
                match child {
                    NodeOrToken::Node(child) => {
                        node = child;
                        continue 'descend;
                    }
                    NodeOrToken::Token(token) => return NodeOrToken::Token(token),
                }
            }
            return NodeOrToken::Node(node);
        }
    }
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.index == other.index
    }
}

impl Eq for SyntaxNode<'_> {}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.text_range())
    }
}

impl fmt::Display for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// A node or a token of a `SyntaxTree`.
pub type SyntaxElement<'a> = NodeOrToken<SyntaxNode<'a>, SyntaxToken<'a>>;

impl<'a> SyntaxElement<'a> {
    pub fn kind(self) -> SyntaxKind {
        match self {
            NodeOrToken::Node(node) => node.kind(),
            NodeOrToken::Token(token) => token.kind(),
        }
    }

    pub fn text_range(self) -> TextRange {
        match self {
            NodeOrToken::Node(node) => node.text_range(),
            NodeOrToken::Token(token) => token.text_range(),
        }
    }

    pub fn parent(self) -> Option<SyntaxNode<'a>> {
        match self {
            NodeOrToken::Node(node) => node.parent(),
            NodeOrToken::Token(token) => Some(token.parent()),
        }
    }

    pub fn next_sibling_or_token(self) -> Option<Self> {
        match self {
            NodeOrToken::Node(node) => node.next_sibling_or_token(),
            NodeOrToken::Token(token) => token.next_sibling_or_token(),
        }
    }

    pub fn prev_sibling_or_token(self) -> Option<Self> {
        match self {
            NodeOrToken::Node(node) => node.prev_sibling_or_token(),
            NodeOrToken::Token(token) => token.prev_sibling_or_token(),
        }
    }
}

/// Iterator over child nodes and tokens.
#[derive(Clone)]
pub struct ChildrenWithTokens<'a> {
    tree: &'a SyntaxTree<'a>,
    iter: std::slice::Iter<'a, Child>,
}

impl<'a> Iterator for ChildrenWithTokens<'a> {
    type Item = SyntaxElement<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next().map(|&child| self.tree.child(child))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl DoubleEndedIterator for ChildrenWithTokens<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.iter.next_back().map(|&child| self.tree.child(child))
    }
}

impl ExactSizeIterator for ChildrenWithTokens<'_> {}

/// Iterator over child nodes.
#[derive(Clone)]
pub struct Children<'a> {
    inner: ChildrenWithTokens<'a>,
}

impl<'a> Iterator for Children<'a> {
    type Item = SyntaxNode<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.by_ref().find_map(NodeOrToken::into_node)
    }
}

impl DoubleEndedIterator for Children<'_> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.by_ref().rev().find_map(NodeOrToken::into_node)
    }
}

impl<'t> TreeView for SyntaxTree<'t> {
    type Element<'a>
        = SyntaxElement<'a>
    where
        Self: 'a;

    fn text(&self) -> &str {
        self.text
    }

    fn root(&self) -> SyntaxElement<'_> {
        NodeOrToken::Node(SyntaxTree::root(self))
    }

    fn kind<'a>(&'a self, element: SyntaxElement<'a>) -> SyntaxKind {
        element.kind()
    }

    fn text_range<'a>(&'a self, element: SyntaxElement<'a>) -> TextRange {
        element.text_range()
    }

    fn is_leaf<'a>(&'a self, element: SyntaxElement<'a>) -> bool {
        matches!(element, NodeOrToken::Token(_))
    }

    fn error_message<'a>(&'a self, element: SyntaxElement<'a>) -> Option<&'a str> {
        element.into_node()?.error_message()
    }

    fn parent<'a>(&'a self, element: SyntaxElement<'a>) -> Option<SyntaxElement<'a>> {
        element.parent().map(NodeOrToken::Node)
    }

    fn first_child<'a>(&'a self, element: SyntaxElement<'a>) -> Option<SyntaxElement<'a>> {
        element.into_node()?.first_child_or_token()
    }

    fn next_sibling<'a>(&'a self, element: SyntaxElement<'a>) -> Option<SyntaxElement<'a>> {
        element.next_sibling_or_token()
    }
}

/// Either a node or a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeOrToken<N, T> {
    Node(N),
    Token(T),
}

impl<N, T> NodeOrToken<N, T> {
    /// Converts into the node variant, if any.
    pub fn into_node(self) -> Option<N> {
        match self {
            NodeOrToken::Node(node) => Some(node),
            NodeOrToken::Token(_) => None,
        }
    }

    /// Converts into the token variant, if any.
    pub fn into_token(self) -> Option<T> {
        match self {
            NodeOrToken::Node(_) => None,
            NodeOrToken::Token(token) => Some(token),
        }
    }

    /// Returns a shared reference to the node, if any.
    pub fn as_node(&self) -> Option<&N> {
        match self {
            NodeOrToken::Node(node) => Some(node),
            NodeOrToken::Token(_) => None,
        }
    }

    /// Returns a shared reference to the token, if any.
    pub fn as_token(&self) -> Option<&T> {
        match self {
            NodeOrToken::Node(_) => None,
            NodeOrToken::Token(token) => Some(token),
        }
    }
}

impl<N: fmt::Display, T: fmt::Display> fmt::Display for NodeOrToken<N, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeOrToken::Node(node) => fmt::Display::fmt(node, f),
            NodeOrToken::Token(token) => fmt::Display::fmt(token, f),
        }
    }
}

/// There might be zero, one or two tokens at a given offset.
#[derive(Clone, Debug)]
pub enum TokenAtOffset<T> {
    /// No tokens at offset.
    None,
    /// Only a single token at offset.
    Single(T),
    /// Offset is exactly between two tokens.
    Between(T, T),
}

impl<T> TokenAtOffset<T> {
    /// Maps tokens to a different type.
    pub fn map<F: Fn(T) -> U, U>(self, f: F) -> TokenAtOffset<U> {
        match self {
            TokenAtOffset::None => TokenAtOffset::None,
            TokenAtOffset::Single(it) => TokenAtOffset::Single(f(it)),
            TokenAtOffset::Between(l, r) => TokenAtOffset::Between(f(l), f(r)),
        }
    }

    /// Convert to option, preferring the right token in case of a tie.
    pub fn right_biased(self) -> Option<T> {
        match self {
            Self::None => None,
            Self::Single(node) => Some(node),
            Self::Between(_, right) => Some(right),
        }
    }

    /// Convert to option, preferring the left token in case of a tie.
    pub fn left_biased(self) -> Option<T> {
        match self {
            Self::None => None,
            Self::Single(node) => Some(node),
            Self::Between(left, _) => Some(left),
        }
    }
}

impl<T> Iterator for TokenAtOffset<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        match std::mem::replace(self, Self::None) {
            Self::None => None,
            Self::Single(node) => Some(node),
            Self::Between(left, right) => {
                *self = Self::Single(right);
                Some(left)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::None => (0, Some(0)),
            Self::Single(_) => (1, Some(1)),
            Self::Between(_, _) => (2, Some(2)),
        }
    }
}

impl<T> ExactSizeIterator for TokenAtOffset<T> {}
