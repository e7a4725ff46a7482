use text_size::{TextRange, TextSize};
use weft_tree::{SyntaxKind, TokenSet};

use crate::lexer::TokenStream;

pub(crate) type Remapper<'t> = Box<dyn FnMut(SyntaxKind, TextRange, &str) -> SyntaxKind + 't>;
pub(crate) type SkipCallback<'t> = Box<dyn FnMut(SyntaxKind, TextRange) + 't>;

/// Random-access view over the cached token stream.
///
/// Insignificant tokens are skipped lazily: the position only moves past them
/// when the parser asks for the current token, so a freshly advanced cursor
/// still sits right after the last consumed token.
pub(crate) struct TokenCursor<'t> {
    text: &'t str,
    kinds: Vec<SyntaxKind>,
    starts: Vec<TextSize>,
    position: usize,
    insignificant: TokenSet,

    remapper: Option<Remapper<'t>>,
    /// Tokens below this index have already been offered to the remapper.
    remapped_until: usize,
    on_skip: Option<SkipCallback<'t>>,
}

impl<'t> TokenCursor<'t> {
    pub(crate) fn new(stream: TokenStream<'t>, insignificant: TokenSet) -> Self {
        let TokenStream { text, kinds, starts } = stream;
        Self {
            text,
            kinds,
            starts,
            position: 0,
            insignificant,
            remapper: None,
            remapped_until: 0,
            on_skip: None,
        }
    }

    pub(crate) fn text(&self) -> &'t str {
        self.text
    }

    pub(crate) fn kinds(&self) -> &[SyntaxKind] {
        &self.kinds
    }

    pub(crate) fn starts(&self) -> &[TextSize] {
        &self.starts
    }

    pub(crate) fn insignificant(&self) -> TokenSet {
        self.insignificant
    }

    pub(crate) fn into_parts(self) -> (Vec<SyntaxKind>, Vec<TextSize>) {
        (self.kinds, self.starts)
    }

    pub(crate) fn extend_insignificant(&mut self, kinds: TokenSet) {
        self.insignificant = self.insignificant.union(&kinds);
    }

    pub(crate) fn set_remapper(&mut self, remapper: Option<Remapper<'t>>) {
        self.remapper = remapper;
    }

    pub(crate) fn set_skip_callback(&mut self, callback: Option<SkipCallback<'t>>) {
        self.on_skip = callback;
    }

    fn range(&self, index: usize) -> TextRange {
        TextRange::new(self.starts[index], self.starts[index + 1])
    }

    pub(crate) fn skip_insignificant(&mut self) {
        loop {
            while self.position < self.kinds.len()
                && self.insignificant.contains(self.kinds[self.position])
            {
                let (kind, range) = (self.kinds[self.position], self.range(self.position));
                if let Some(on_skip) = &mut self.on_skip {
                    on_skip(kind, range);
                }
                self.position += 1;
            }

            if self.position >= self.kinds.len() || self.position < self.remapped_until {
                return;
            }
            self.remapped_until = self.position + 1;

            let Some(remapper) = &mut self.remapper else { return };
            let range = TextRange::new(self.starts[self.position], self.starts[self.position + 1]);
            let kind = remapper(self.kinds[self.position], range, &self.text[range]);
            self.kinds[self.position] = kind;
            if !self.insignificant.contains(kind) {
                return;
            }
        }
    }

    pub(crate) fn current(&mut self) -> Option<SyntaxKind> {
        self.skip_insignificant();
        self.kinds.get(self.position).copied()
    }

    pub(crate) fn current_text(&mut self) -> Option<&'t str> {
        self.skip_insignificant();
        let text = self.text;
        (self.position < self.kinds.len()).then(|| &text[self.range(self.position)])
    }

    pub(crate) fn current_offset(&mut self) -> TextSize {
        self.skip_insignificant();
        self.starts[self.position.min(self.kinds.len())]
    }

    pub(crate) fn eof(&mut self) -> bool {
        self.current().is_none()
    }

    pub(crate) fn advance(&mut self) {
        self.skip_insignificant();
        if self.position < self.kinds.len() {
            self.position += 1;
        }
    }

    pub(crate) fn remap_current(&mut self, kind: SyntaxKind) {
        self.skip_insignificant();
        if let Some(slot) = self.kinds.get_mut(self.position) {
            *slot = kind;
        }
    }

    /// Kind of the significant token `steps` positions ahead; `0` is the
    /// current one.
    pub(crate) fn look_ahead(&mut self, steps: usize) -> Option<SyntaxKind> {
        self.skip_insignificant();
        let mut index = self.position;
        for _ in 0..steps {
            index += 1;
            while index < self.kinds.len() && self.insignificant.contains(self.kinds[index]) {
                index += 1;
            }
        }
        self.kinds.get(index).copied()
    }

    fn raw_index(&self, steps: isize) -> Option<usize> {
        self.position.checked_add_signed(steps)
    }

    pub(crate) fn raw_lookup(&self, steps: isize) -> Option<SyntaxKind> {
        self.kinds.get(self.raw_index(steps)?).copied()
    }

    /// Start offset of the raw token `steps` away; one past the last token
    /// yields the text length.
    pub(crate) fn raw_token_start(&self, steps: isize) -> Option<TextSize> {
        self.starts.get(self.raw_index(steps)?).copied()
    }

    pub(crate) fn position(&self) -> usize {
        self.position
    }

    pub(crate) fn raw_advance(&mut self, steps: usize) {
        self.position = self.position.saturating_add(steps).min(self.kinds.len());
    }

    pub(crate) fn reset(&mut self, position: usize) {
        self.position = position;
    }
}
