//! Input side of the builder: the lexer contract and the cached token stream.

use text_size::{TextRange, TextSize};
use thiserror::Error;
use weft_tree::SyntaxKind;

/// One lexeme: its kind and where it is in the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: SyntaxKind,
    pub range: TextRange,
}

impl Token {
    pub fn new(kind: SyntaxKind, range: TextRange) -> Self {
        Self { kind, range }
    }
}

/// A lexer positioned on its current token.
pub trait Lexer {
    /// The current token's kind, or `None` once the input is exhausted.
    fn token_kind(&self) -> Option<SyntaxKind>;

    fn token_range(&self) -> TextRange;

    fn advance(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenStreamError {
    #[error("token #{index} starts at {found:?}, expected {expected:?}")]
    Gap { index: usize, expected: TextSize, found: TextSize },
    #[error("token #{index} ends at {end:?}, past the end of the text ({len:?})")]
    OutOfBounds { index: usize, end: TextSize, len: TextSize },
    #[error("token #{index} ends inside a character at {offset:?}")]
    NotCharBoundary { index: usize, offset: TextSize },
    #[error("tokens cover {covered:?} of a {len:?} byte text")]
    Incomplete { covered: TextSize, len: TextSize },
}

/// Every token of a text, cached up front so the parser can look ahead,
/// look behind and rewind freely.
///
/// Tokens are contiguous and cover the text exactly.
#[derive(Debug, Clone)]
pub struct TokenStream<'t> {
    pub(crate) text: &'t str,
    pub(crate) kinds: Vec<SyntaxKind>,
    /// One entry per token plus the end of the text.
    pub(crate) starts: Vec<TextSize>,
}

impl<'t> TokenStream<'t> {
    pub fn new(
        text: &'t str,
        tokens: impl IntoIterator<Item = Token>,
    ) -> Result<Self, TokenStreamError> {
        let len = TextSize::of(text);
        let tokens = tokens.into_iter();
        let (lower, _) = tokens.size_hint();
        let mut kinds = Vec::with_capacity(lower);
        let mut starts = Vec::with_capacity(lower + 1);
        let mut offset = TextSize::new(0);

        for (index, token) in tokens.enumerate() {
            if token.range.start() != offset {
                return Err(TokenStreamError::Gap {
                    index,
                    expected: offset,
                    found: token.range.start(),
                });
            }
            let end = token.range.end();
            if end > len {
                return Err(TokenStreamError::OutOfBounds { index, end, len });
            }
            if !text.is_char_boundary(end.into()) {
                return Err(TokenStreamError::NotCharBoundary { index, offset: end });
            }
            kinds.push(token.kind);
            starts.push(offset);
            offset = end;
        }

        if offset != len {
            return Err(TokenStreamError::Incomplete { covered: offset, len });
        }
        starts.push(len);

        Ok(Self { text, kinds, starts })
    }

    /// Drains `lexer` until it reports the end of input.
    pub fn lex(text: &'t str, mut lexer: impl Lexer) -> Result<Self, TokenStreamError> {
        let tokens = std::iter::from_fn(|| {
            let kind = lexer.token_kind()?;
            let token = Token::new(kind, lexer.token_range());
            lexer.advance();
            Some(token)
        });
        Self::new(text, tokens)
    }

    pub fn text(&self) -> &'t str {
        self.text
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn kind(&self, index: usize) -> Option<SyntaxKind> {
        self.kinds.get(index).copied()
    }

    pub fn range(&self, index: usize) -> Option<TextRange> {
        (index < self.kinds.len()).then(|| TextRange::new(self.starts[index], self.starts[index + 1]))
    }

    pub fn tokens(&self) -> impl ExactSizeIterator<Item = Token> + '_ {
        self.kinds.iter().zip(self.starts.windows(2)).map(|(&kind, window)| Token {
            kind,
            range: TextRange::new(window[0], window[1]),
        })
    }
}
