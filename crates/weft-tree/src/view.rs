//! Navigation shared by every tree representation.

use std::fmt;

use text_size::TextRange;

use crate::{KindNames, SyntaxKind};

/// Read-only view of a materialized tree.
///
/// Elements are cheap `Copy` handles; only `first_child`, `next_sibling` and
/// `parent` have to be provided, children and walks are derived from them.
pub trait TreeView {
    type Element<'a>: Copy + PartialEq
    where
        Self: 'a;

    /// The source text the tree was built from.
    fn text(&self) -> &str;

    fn root(&self) -> Self::Element<'_>;

    fn kind<'a>(&'a self, element: Self::Element<'a>) -> SyntaxKind;

    fn text_range<'a>(&'a self, element: Self::Element<'a>) -> TextRange;

    /// `true` for tokens and collapsed nodes.
    fn is_leaf<'a>(&'a self, element: Self::Element<'a>) -> bool;

    fn error_message<'a>(&'a self, element: Self::Element<'a>) -> Option<&'a str>;

    fn parent<'a>(&'a self, element: Self::Element<'a>) -> Option<Self::Element<'a>>;

    fn first_child<'a>(&'a self, element: Self::Element<'a>) -> Option<Self::Element<'a>>;

    fn next_sibling<'a>(&'a self, element: Self::Element<'a>) -> Option<Self::Element<'a>>;

    /// Children in source order, tokens included.
    fn children<'a>(&'a self, element: Self::Element<'a>) -> ViewChildren<'a, Self>
    where
        Self: Sized,
    {
        ViewChildren { view: self, next: self.first_child(element) }
    }

    fn element_text<'a>(&'a self, element: Self::Element<'a>) -> &'a str {
        &self.text()[self.text_range(element)]
    }

    fn preorder(&self) -> Preorder<'_, Self>
    where
        Self: Sized,
    {
        Preorder::new(self, self.root())
    }

    /// Indented dump of the whole tree, one element per line.
    fn debug_dump(&self, names: KindNames) -> DebugDump<'_, Self>
    where
        Self: Sized,
    {
        DebugDump { view: self, names }
    }
}

/// Iterator over the children of a `TreeView` element.
pub struct ViewChildren<'a, V: TreeView + 'a> {
    view: &'a V,
    next: Option<V::Element<'a>>,
}

impl<'a, V: TreeView> Iterator for ViewChildren<'a, V> {
    type Item = V::Element<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.view.next_sibling(current);
        Some(current)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEvent<T> {
    Enter(T),
    Leave(T),
}

pub struct Preorder<'a, V: TreeView + 'a> {
    view: &'a V,
    start: V::Element<'a>,
    next: Option<WalkEvent<V::Element<'a>>>,
    skip_subtree: bool,
}

impl<'a, V: TreeView> Preorder<'a, V> {
    pub fn new(view: &'a V, start: V::Element<'a>) -> Self {
        Self { view, start, next: Some(WalkEvent::Enter(start)), skip_subtree: false }
    }

    /// Skips the children of the element that was entered last.
    pub fn skip_subtree(&mut self) {
        self.skip_subtree = true;
    }
}

impl<'a, V: TreeView> Iterator for Preorder<'a, V> {
    type Item = WalkEvent<V::Element<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if std::mem::take(&mut self.skip_subtree)
            && let Some(WalkEvent::Enter(first_child)) = self.next
            && let Some(parent) = self.view.parent(first_child)
        {
            self.next = Some(WalkEvent::Leave(parent));
        }

        let next = self.next.take()?;

        self.next = match next {
            WalkEvent::Enter(element) => Some(match self.view.first_child(element) {
                Some(child) => WalkEvent::Enter(child),
                None => WalkEvent::Leave(element),
            }),
            WalkEvent::Leave(element) => {
                if element == self.start {
                    None
                } else {
                    match self.view.next_sibling(element) {
                        Some(sibling) => Some(WalkEvent::Enter(sibling)),
                        None => self.view.parent(element).map(WalkEvent::Leave),
                    }
                }
            }
        };

        Some(next)
    }
}

/// `Display` adapter returned by [`TreeView::debug_dump`].
pub struct DebugDump<'a, V> {
    view: &'a V,
    names: KindNames,
}

impl<V: TreeView> fmt::Display for DebugDump<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.view;
        let mut depth = 0usize;
        for event in view.preorder() {
            let element = match event {
                WalkEvent::Enter(element) => element,
                WalkEvent::Leave(_) => {
                    depth -= 1;
                    continue;
                }
            };
            let name = (self.names)(view.kind(element));
            write!(f, "{:indent$}{name}@{:?}", "", view.text_range(element), indent = depth * 2)?;
            if view.is_leaf(element) {
                write!(f, " {:?}", view.element_text(element))?;
            }
            if let Some(message) = view.error_message(element) {
                write!(f, " ({message})")?;
            }
            writeln!(f)?;
            depth += 1;
        }
        Ok(())
    }
}
