//! Untyped, lossless syntax trees produced by the marker builder.
//!
//! The heavyweight [`SyntaxTree`] is built once through [`TreeBuilder`] and then
//! navigated by lifetime-bound, `Copy` handles without refcounting. Both it
//! and the flyweight tree of `weft-builder` implement [`TreeView`], so walks
//! and dumps are written once.

mod builder;
mod syntax;
mod syntax_kind;
mod token_set;
mod view;

/// Incremental builder for constructing a `SyntaxTree`.
pub use builder::TreeBuilder;
/// Primary syntax tree API types.
pub use syntax::{
    Children, ChildrenWithTokens, NodeOrToken, SyntaxElement, SyntaxNode, SyntaxToken, SyntaxTree,
    TokenAtOffset,
};
/// Token and node kinds used throughout the tree.
pub use syntax_kind::{KindNames, SyntaxKind};
pub use text_size::{TextLen, TextRange, TextSize};
/// Compact set for grouping `SyntaxKind` values.
pub use token_set::TokenSet;
/// Shared navigation over heavyweight and flyweight trees.
pub use view::{DebugDump, Preorder, TreeView, ViewChildren, WalkEvent};
