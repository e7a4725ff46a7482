use weft_tree::{SyntaxKind, TokenSet};

use crate::binder::{BinderTable, EdgeBinders};

/// Language configuration consulted by the builder: which tokens are
/// insignificant and how they bind to node edges.
///
/// Built once per language and shared by every parse.
#[derive(Debug, Clone, Default)]
pub struct Classifier {
    whitespace: TokenSet,
    comments: TokenSet,
    binders: BinderTable,
}

impl Classifier {
    pub fn new(whitespace: TokenSet, comments: TokenSet) -> Self {
        Self { whitespace, comments, binders: BinderTable::default() }
    }

    pub fn with_binders(mut self, binders: BinderTable) -> Self {
        self.binders = binders;
        self
    }

    pub fn is_whitespace(&self, kind: SyntaxKind) -> bool {
        self.whitespace.contains(kind)
    }

    pub fn is_comment(&self, kind: SyntaxKind) -> bool {
        self.comments.contains(kind)
    }

    pub fn is_insignificant(&self, kind: SyntaxKind) -> bool {
        self.insignificant().contains(kind)
    }

    pub fn whitespace(&self) -> TokenSet {
        self.whitespace
    }

    pub fn comments(&self) -> TokenSet {
        self.comments
    }

    pub fn insignificant(&self) -> TokenSet {
        self.whitespace.union(&self.comments)
    }

    pub fn binders(&self, kind: SyntaxKind) -> EdgeBinders {
        self.binders.get(kind)
    }
}
