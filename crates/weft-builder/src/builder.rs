use std::panic::Location;

use text_size::{TextRange, TextSize};
use weft_tree::{SyntaxKind, SyntaxTree, TokenSet};

use crate::binder::{DEFAULT_RIGHT, EdgeBinders, GREEDY_LEFT};
use crate::classifier::Classifier;
use crate::cursor::TokenCursor;
use crate::lexer::TokenStream;
use crate::lighter::LighterTree;
use crate::log::{Completion, MarkerState, Production, ProductionLog};
use crate::marker::{CompletedMarker, Marker, MarkerId};
use crate::materialize::{self, Parse};
use crate::violation::{ProtocolViolation, Site};

/// Records the markers a parser opens and closes over a token stream and
/// turns them into a tree.
///
/// Whitespace and comments, as told by the [`Classifier`], are invisible to
/// the parser: token accessors skip them, and they are attached to nodes by
/// edge binders when the tree is built.
pub struct Builder<'t> {
    cursor: TokenCursor<'t>,
    classifier: &'t Classifier,
    log: ProductionLog,
    violation: Option<ProtocolViolation>,
}

impl<'t> Builder<'t> {
    pub fn new(tokens: TokenStream<'t>, classifier: &'t Classifier) -> Self {
        Self {
            cursor: TokenCursor::new(tokens, classifier.insignificant()),
            classifier,
            log: ProductionLog::default(),
            violation: None,
        }
    }

    /// Kind of the current significant token, `None` at the end of input.
    pub fn token_type(&mut self) -> Option<SyntaxKind> {
        self.cursor.current()
    }

    pub fn token_text(&mut self) -> Option<&'t str> {
        self.cursor.current_text()
    }

    pub fn advance(&mut self) {
        self.cursor.advance();
    }

    pub fn look_ahead(&mut self, steps: usize) -> Option<SyntaxKind> {
        self.cursor.look_ahead(steps)
    }

    /// Kind of the raw token `steps` away from the cursor, whitespace
    /// included; negative steps look behind.
    pub fn raw_lookup(&self, steps: isize) -> Option<SyntaxKind> {
        self.cursor.raw_lookup(steps)
    }

    pub fn raw_token_start(&self, steps: isize) -> Option<TextSize> {
        self.cursor.raw_token_start(steps)
    }

    pub fn raw_token_index(&self) -> usize {
        self.cursor.position()
    }

    pub fn raw_advance(&mut self, steps: usize) {
        self.cursor.raw_advance(steps);
    }

    /// Changes the kind of the current token. Events already recorded keep
    /// what they saw.
    pub fn remap_current_token(&mut self, kind: SyntaxKind) {
        self.cursor.remap_current(kind);
    }

    /// Installs a hook that may change the kind of each token when it first
    /// becomes current.
    pub fn set_token_type_remapper(
        &mut self,
        remapper: impl FnMut(SyntaxKind, TextRange, &str) -> SyntaxKind + 't,
    ) {
        self.cursor.set_remapper(Some(Box::new(remapper)));
    }

    /// Installs a hook called with every insignificant token the cursor skips.
    pub fn set_whitespace_skipped_callback(
        &mut self,
        callback: impl FnMut(SyntaxKind, TextRange) + 't,
    ) {
        self.cursor.set_skip_callback(Some(Box::new(callback)));
    }

    /// Treats `kinds` as comments for the rest of the parse.
    pub fn enforce_comment_tokens(&mut self, kinds: TokenSet) {
        self.cursor.extend_insignificant(kinds);
    }

    pub fn current_offset(&mut self) -> TextSize {
        self.cursor.current_offset()
    }

    pub fn eof(&mut self) -> bool {
        self.cursor.eof()
    }

    pub fn original_text(&self) -> &'t str {
        self.cursor.text()
    }

    pub fn classifier(&self) -> &'t Classifier {
        self.classifier
    }

    /// The first protocol violation recorded so far.
    pub fn violation(&self) -> Option<&ProtocolViolation> {
        self.violation.as_ref()
    }

    /// Opens a marker at the current token.
    #[track_caller]
    pub fn mark(&mut self) -> Marker {
        if !self.log.is_empty() {
            self.cursor.skip_insignificant();
        }
        let lexeme = self.cursor.position();
        let id = self.log.alloc(lexeme, Location::caller());
        self.log.push(Production::Start(id));
        tracing::trace!(marker = ?id, lexeme, "mark");
        Marker::new(id)
    }

    /// Adds an empty error node at the current token. A second error at the
    /// same position is ignored.
    #[track_caller]
    pub fn error(&mut self, message: impl Into<Box<str>>) {
        self.cursor.skip_insignificant();
        if self.log.ends_with_empty_error_at(self.cursor.position()) {
            return;
        }
        self.mark().error(self, message);
    }

    /// The marker completed last, unless something was rolled back since.
    pub fn latest_done_marker(&self) -> Option<CompletedMarker> {
        let id = self.log.latest_finished()?;
        Some(CompletedMarker::new(id, self.log.completion(id).kind()))
    }

    /// Builds the heavyweight tree.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn build_tree(self) -> Result<Parse<SyntaxTree<'t>>, ProtocolViolation> {
        let edges = self.prepare()?;
        let mut sink = materialize::SyntaxTreeSink::new(
            self.cursor.text(),
            self.cursor.kinds(),
            self.cursor.starts(),
            self.log.production().len() / 2,
        );
        let errors = materialize::walk(&self.log, &edges, self.cursor.starts(), &mut sink);
        Ok(Parse::new(sink.finish(), errors))
    }

    /// Builds the flyweight tree.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn build_lighter_tree(self) -> Result<Parse<LighterTree<'t>>, ProtocolViolation> {
        let edges = self.prepare()?;
        let text = self.cursor.text();
        let (kinds, starts) = self.cursor.into_parts();
        let mut sink = materialize::LighterSink::with_capacity(self.log.production().len() / 2);
        let errors = materialize::walk(&self.log, &edges, &starts, &mut sink);
        Ok(Parse::new(sink.finish(text, kinds, starts), errors))
    }

    fn prepare(&self) -> Result<Vec<usize>, ProtocolViolation> {
        if let Some(violation) = &self.violation {
            return Err(violation.clone());
        }
        let kinds = self.cursor.kinds();
        let starts = self.cursor.starts();
        let insignificant = self.cursor.insignificant();

        materialize::validate(&self.log, kinds, starts, insignificant).inspect_err(|violation| {
            tracing::error!(%violation, "marker protocol violated");
        })?;
        let edges = materialize::bind_edges(
            &self.log,
            self.cursor.text(),
            kinds,
            starts,
            insignificant,
            self.classifier,
        );
        tracing::debug!(events = edges.len(), tokens = kinds.len(), "materializing");
        Ok(edges)
    }

    fn violate(&mut self, violation: ProtocolViolation) {
        tracing::error!(%violation, "marker protocol violated");
        self.violation.get_or_insert(violation);
    }

    fn site(&self, id: MarkerId) -> Site {
        self.log.marker(id).site
    }

    /// Records a violation unless `id` is still open.
    fn expect_open(&mut self, id: MarkerId) -> bool {
        let marker = self.log.marker(id);
        if marker.state == MarkerState::Open {
            return true;
        }
        let violation =
            ProtocolViolation::StaleMarker { site: marker.site, state: marker.state.describe() };
        self.violate(violation);
        false
    }

    fn expect_live(&mut self, id: MarkerId) -> bool {
        let marker = self.log.marker(id);
        if marker.state.is_live() {
            return true;
        }
        let violation =
            ProtocolViolation::StaleMarker { site: marker.site, state: marker.state.describe() };
        self.violate(violation);
        false
    }

    pub(crate) fn precede(&mut self, id: MarkerId, site: Site) -> Marker {
        let live = self.expect_live(id);
        let lexeme = self.log.marker(id).lexeme as usize;
        let new = self.log.alloc(lexeme, site);
        match self.log.position(Production::Start(id)).filter(|_| live) {
            Some(position) => self.log.insert(position, Production::Start(new)),
            None => self.log.push(Production::Start(new)),
        }
        tracing::trace!(marker = ?new, preceded = ?id, "precede");
        Marker::new(new)
    }

    pub(crate) fn complete(&mut self, id: MarkerId, completion: Completion) {
        if !self.expect_open(id) {
            return;
        }
        match self.log.find_start(id) {
            Some((_, Some(child))) => {
                let action = match completion {
                    Completion::Done(_) => "complete",
                    Completion::Collapse(_) => "collapse",
                    Completion::Error(_) => "close with an error",
                };
                self.violate(ProtocolViolation::OpenChild {
                    site: self.site(id),
                    child: self.site(child),
                    action,
                });
            }
            Some((position, None)) => {
                if let Some(crossed) = self.log.crossed_by(position) {
                    self.violate(ProtocolViolation::CrossingMarkers {
                        site: self.site(id),
                        other: self.site(crossed),
                    });
                }
            }
            None => {}
        }
        let lexeme = self.cursor.position();
        tracing::trace!(marker = ?id, ?completion, lexeme, "complete");
        self.log.marker_mut(id).state = MarkerState::Closed { completion, lexeme: to_u32(lexeme) };
        self.log.push(Production::Finish(id));
    }

    pub(crate) fn complete_before(
        &mut self,
        id: MarkerId,
        completion: Completion,
        before: MarkerId,
        error: Option<(Box<str>, Site)>,
    ) {
        if !self.expect_open(id) {
            return;
        }
        let invalid = |reason| ProtocolViolation::InvalidDoneBefore {
            site: self.site(id),
            before: self.site(before),
            reason,
        };
        if before == id {
            let violation = invalid("a marker cannot end before itself");
            return self.violate(violation);
        }
        if !self.log.marker(before).state.is_live() {
            let violation = invalid("`before` was dropped or rolled back");
            return self.violate(violation);
        }
        let start = self.log.find_start(id).map(|(position, _)| position);
        let Some(before_position) = self.log.position(Production::Start(before)) else {
            let violation = invalid("`before` is not in the log");
            return self.violate(violation);
        };
        let Some(start) = start.filter(|&start| start < before_position) else {
            let violation = invalid("`before` starts before this marker");
            return self.violate(violation);
        };
        if let Err(reason) = self.log.check_span(start + 1..before_position) {
            let violation = invalid(reason);
            return self.violate(violation);
        }

        let lexeme = self.log.marker(before).lexeme;
        tracing::trace!(marker = ?id, ?completion, before = ?before, "complete before");
        self.log.marker_mut(id).state = MarkerState::Closed { completion, lexeme };
        self.log.insert(before_position, Production::Finish(id));

        if let Some((message, site)) = error {
            let error = self.log.alloc(lexeme as usize, site);
            let marker = self.log.marker_mut(error);
            marker.state = MarkerState::Closed { completion: Completion::Error(message), lexeme };
            // Sticks to the end of the completed node rather than to `before`.
            marker.binders = Some(EdgeBinders::new(GREEDY_LEFT, DEFAULT_RIGHT));
            self.log.insert(before_position, Production::Finish(error));
            self.log.insert(before_position, Production::Start(error));
        }
    }

    pub(crate) fn rollback(&mut self, id: MarkerId) {
        if !self.expect_open(id) {
            return;
        }
        let Some((position, open_child)) = self.log.find_start(id) else { return };
        if let Some(child) = open_child {
            self.violate(ProtocolViolation::OpenChild {
                site: self.site(id),
                child: self.site(child),
                action: "roll back",
            });
        }
        let lexeme = self.log.marker(id).lexeme as usize;
        tracing::debug!(marker = ?id, from = self.cursor.position(), to = lexeme, "rollback");
        self.log.truncate(position);
        self.cursor.reset(lexeme);
    }

    pub(crate) fn drop_marker(&mut self, id: MarkerId) {
        if !self.expect_open(id) {
            return;
        }
        if let Some(position) = self.log.position(Production::Start(id)) {
            self.log.remove(position);
        }
        tracing::trace!(marker = ?id, "drop");
        self.log.marker_mut(id).state = MarkerState::Dropped;
    }

    pub(crate) fn set_edge_binders(&mut self, id: MarkerId, binders: EdgeBinders) {
        if self.expect_live(id) {
            self.log.marker_mut(id).binders = Some(binders);
        }
    }
}

#[inline]
fn to_u32(index: usize) -> u32 {
    u32::try_from(index).expect("token stream too large")
}
