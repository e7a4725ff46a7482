//! The production log: every marker ever allocated plus the ordered sequence
//! of start and finish events that survive rollbacks and drops.

use la_arena::Arena;
use weft_tree::SyntaxKind;

use crate::binder::EdgeBinders;
use crate::marker::MarkerId;
use crate::violation::Site;

pub(crate) struct MarkerData {
    /// Token index the marker starts at.
    pub(crate) lexeme: u32,
    pub(crate) state: MarkerState,
    pub(crate) binders: Option<EdgeBinders>,
    pub(crate) site: Site,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MarkerState {
    Open,
    Closed { completion: Completion, lexeme: u32 },
    Dropped,
    RolledBack,
}

impl MarkerState {
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed { .. } => "completed",
            Self::Dropped => "dropped",
            Self::RolledBack => "rolled back",
        }
    }

    pub(crate) fn is_live(&self) -> bool {
        matches!(self, Self::Open | Self::Closed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Completion {
    Done(SyntaxKind),
    Collapse(SyntaxKind),
    Error(Box<str>),
}

impl Completion {
    pub(crate) fn kind(&self) -> SyntaxKind {
        match *self {
            Self::Done(kind) | Self::Collapse(kind) => kind,
            Self::Error(_) => SyntaxKind::ERROR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Production {
    Start(MarkerId),
    Finish(MarkerId),
}

#[derive(Default)]
pub(crate) struct ProductionLog {
    markers: Arena<MarkerData>,
    production: Vec<Production>,
}

impl ProductionLog {
    pub(crate) fn alloc(&mut self, lexeme: usize, site: Site) -> MarkerId {
        let lexeme = u32::try_from(lexeme).expect("token stream too large");
        MarkerId(self.markers.alloc(MarkerData {
            lexeme,
            state: MarkerState::Open,
            binders: None,
            site,
        }))
    }

    pub(crate) fn marker(&self, id: MarkerId) -> &MarkerData {
        &self.markers[id.0]
    }

    pub(crate) fn marker_mut(&mut self, id: MarkerId) -> &mut MarkerData {
        &mut self.markers[id.0]
    }

    pub(crate) fn markers(&self) -> impl Iterator<Item = &MarkerData> {
        self.markers.iter().map(|(_, data)| data)
    }

    pub(crate) fn production(&self) -> &[Production] {
        &self.production
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.production.is_empty()
    }

    pub(crate) fn push(&mut self, event: Production) {
        self.production.push(event);
    }

    pub(crate) fn insert(&mut self, position: usize, event: Production) {
        self.production.insert(position, event);
    }

    pub(crate) fn remove(&mut self, position: usize) -> Production {
        self.production.remove(position)
    }

    /// Removes every event from `position` on; markers started there are
    /// rolled back.
    pub(crate) fn truncate(&mut self, position: usize) {
        for event in self.production.drain(position..) {
            if let Production::Start(id) = event {
                self.markers[id.0].state = MarkerState::RolledBack;
            }
        }
    }

    pub(crate) fn position(&self, event: Production) -> Option<usize> {
        self.production.iter().rposition(|&it| it == event)
    }

    /// Position of `id`'s start event together with the open marker started
    /// closest after it, if any.
    pub(crate) fn find_start(&self, id: MarkerId) -> Option<(usize, Option<MarkerId>)> {
        let mut open = None;
        for (position, &event) in self.production.iter().enumerate().rev() {
            let Production::Start(other) = event else { continue };
            if other == id {
                return Some((position, open));
            }
            if self.markers[other.0].state == MarkerState::Open {
                open = Some(other);
            }
        }
        None
    }

    /// A closed marker started before `start` that finishes after it.
    pub(crate) fn crossed_by(&self, start: usize) -> Option<MarkerId> {
        let mut depth = 0usize;
        for &event in &self.production[start + 1..] {
            match event {
                Production::Start(_) => depth += 1,
                Production::Finish(other) if depth == 0 => return Some(other),
                Production::Finish(_) => depth -= 1,
            }
        }
        None
    }

    /// Checks that every marker started in `range` is completed inside it.
    pub(crate) fn check_span(&self, range: std::ops::Range<usize>) -> Result<(), &'static str> {
        let mut depth = 0usize;
        for &event in &self.production[range] {
            match event {
                Production::Start(id) => {
                    if self.markers[id.0].state == MarkerState::Open {
                        return Err("a marker between them is still open");
                    }
                    depth += 1;
                }
                Production::Finish(_) if depth == 0 => {
                    return Err("a marker started before it ends between them");
                }
                Production::Finish(_) => depth -= 1,
            }
        }
        if depth == 0 { Ok(()) } else { Err("a marker between them ends after `before`") }
    }

    /// The marker whose finish event is the latest one in the log.
    pub(crate) fn latest_finished(&self) -> Option<MarkerId> {
        self.production.iter().rev().find_map(|&event| match event {
            Production::Finish(id) => Some(id),
            Production::Start(_) => None,
        })
    }

    /// Whether the log ends with an empty error node at `lexeme`.
    pub(crate) fn ends_with_empty_error_at(&self, lexeme: usize) -> bool {
        let [.., Production::Start(start), Production::Finish(finish)] = self.production.as_slice()
        else {
            return false;
        };
        let marker = &self.markers[finish.0];
        start == finish
            && marker.lexeme as usize == lexeme
            && matches!(
                marker.state,
                MarkerState::Closed { completion: Completion::Error(_), lexeme: end }
                    if end as usize == lexeme
            )
    }

    pub(crate) fn completion(&self, id: MarkerId) -> &Completion {
        match &self.markers[id.0].state {
            MarkerState::Closed { completion, .. } => completion,
            state => unreachable!("marker in the log is {}", state.describe()),
        }
    }

    /// Token index an event sits at before edge binding.
    pub(crate) fn lexeme(&self, event: Production) -> usize {
        match event {
            Production::Start(id) => self.markers[id.0].lexeme as usize,
            Production::Finish(id) => match self.markers[id.0].state {
                MarkerState::Closed { lexeme, .. } => lexeme as usize,
                ref state => unreachable!("finished marker is {}", state.describe()),
            },
        }
    }
}
