use std::fmt;
use std::panic::Location;

use drop_bomb::DropBomb;
use la_arena::Idx;
use weft_tree::SyntaxKind;

use crate::binder::{Binder, EdgeBinders};
use crate::builder::Builder;
use crate::log::{Completion, MarkerData};

/// Stable identity of a marker, valid for the lifetime of its builder.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(pub(crate) Idx<MarkerData>);

impl fmt::Debug for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MarkerId({})", u32::from(self.0.into_raw()))
    }
}

/// An open marker: the start of a node whose kind is not known yet.
///
/// Every marker has to be finished with exactly one of `done`, `collapse`,
/// `error`, the `*_before` variants, `rollback_to` or `drop`; letting it go
/// out of scope panics.
pub struct Marker {
    id: MarkerId,
    bomb: DropBomb,
}

impl Marker {
    pub(crate) fn new(id: MarkerId) -> Self {
        Self { id, bomb: DropBomb::new("Marker must be either completed or abandoned") }
    }

    pub fn id(&self) -> MarkerId {
        self.id
    }

    /// Opens a new marker at exactly this marker's start, which will wrap it.
    #[track_caller]
    pub fn precede(&self, b: &mut Builder<'_>) -> Self {
        b.precede(self.id, Location::caller())
    }

    pub fn done(self, b: &mut Builder<'_>, kind: SyntaxKind) -> CompletedMarker {
        self.finish(b, Completion::Done(kind))
    }

    /// Completes the marker as a single leaf of `kind`; markers inside it are
    /// discarded from the tree.
    pub fn collapse(self, b: &mut Builder<'_>, kind: SyntaxKind) -> CompletedMarker {
        self.finish(b, Completion::Collapse(kind))
    }

    pub fn error(self, b: &mut Builder<'_>, message: impl Into<Box<str>>) -> CompletedMarker {
        self.finish(b, Completion::Error(message.into()))
    }

    /// Completes the marker right where `before` starts.
    pub fn done_before(
        mut self,
        b: &mut Builder<'_>,
        kind: SyntaxKind,
        before: MarkerId,
    ) -> CompletedMarker {
        self.bomb.defuse();
        b.complete_before(self.id, Completion::Done(kind), before, None);
        CompletedMarker { id: self.id, kind }
    }

    /// Like [`Marker::done_before`], and leaves an empty error node as the
    /// last child of the completed node.
    #[track_caller]
    pub fn done_before_with_error(
        mut self,
        b: &mut Builder<'_>,
        kind: SyntaxKind,
        before: MarkerId,
        message: impl Into<Box<str>>,
    ) -> CompletedMarker {
        self.bomb.defuse();
        let error = (message.into(), Location::caller());
        b.complete_before(self.id, Completion::Done(kind), before, Some(error));
        CompletedMarker { id: self.id, kind }
    }

    pub fn error_before(
        mut self,
        b: &mut Builder<'_>,
        message: impl Into<Box<str>>,
        before: MarkerId,
    ) -> CompletedMarker {
        self.bomb.defuse();
        b.complete_before(self.id, Completion::Error(message.into()), before, None);
        CompletedMarker { id: self.id, kind: SyntaxKind::ERROR }
    }

    /// Forgets this marker and everything after it, and moves the cursor
    /// back to where the marker started.
    pub fn rollback_to(mut self, b: &mut Builder<'_>) {
        self.bomb.defuse();
        b.rollback(self.id);
    }

    /// Forgets this marker only; its children move up to the enclosing node.
    pub fn drop(mut self, b: &mut Builder<'_>) {
        self.bomb.defuse();
        b.drop_marker(self.id);
    }

    pub fn set_edge_binders(&self, b: &mut Builder<'_>, left: Binder, right: Binder) {
        b.set_edge_binders(self.id, EdgeBinders::new(left, right));
    }

    fn finish(mut self, b: &mut Builder<'_>, completion: Completion) -> CompletedMarker {
        self.bomb.defuse();
        let kind = completion.kind();
        b.complete(self.id, completion);
        CompletedMarker { id: self.id, kind }
    }
}

impl fmt::Debug for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Marker").field(&self.id).finish()
    }
}

/// A finished marker; `kind` is [`SyntaxKind::ERROR`] for error nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedMarker {
    id: MarkerId,
    kind: SyntaxKind,
}

impl CompletedMarker {
    pub(crate) fn new(id: MarkerId, kind: SyntaxKind) -> Self {
        Self { id, kind }
    }

    pub fn id(self) -> MarkerId {
        self.id
    }

    pub fn kind(self) -> SyntaxKind {
        self.kind
    }

    #[track_caller]
    pub fn precede(self, b: &mut Builder<'_>) -> Marker {
        b.precede(self.id, Location::caller())
    }

    pub fn set_edge_binders(self, b: &mut Builder<'_>, left: Binder, right: Binder) {
        b.set_edge_binders(self.id, EdgeBinders::new(left, right));
    }
}
