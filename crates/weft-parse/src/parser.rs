use std::ops::{Deref, DerefMut};

use weft_builder::{Builder, Marker, TokenStream};
use weft_tokenizer::*;
use weft_tree::{SyntaxKind, TokenSet};

/// Token-level helpers over a [`Builder`] configured for weft.
///
/// Markers are completed directly against the parser: it dereferences to the
/// builder it wraps.
pub(crate) struct Parser<'t> {
    builder: Builder<'t>,
}

impl<'t> Parser<'t> {
    pub(crate) fn new(tokens: TokenStream<'t>) -> Self {
        let mut builder = Builder::new(tokens, crate::classifier());
        builder.set_token_type_remapper(|kind, _, text| match (kind, text) {
            (NAME, "true") => TRUE_KW,
            (NAME, "false") => FALSE_KW,
            _ => kind,
        });
        Self { builder }
    }

    pub(crate) fn finish(self) -> Builder<'t> {
        self.builder
    }

    pub(crate) fn peek_kind(&mut self) -> Option<SyntaxKind> {
        self.builder.token_type()
    }

    pub(crate) fn nth(&mut self, n: usize) -> Option<SyntaxKind> {
        self.builder.look_ahead(n)
    }

    pub(crate) fn at(&mut self, kind: SyntaxKind) -> bool {
        self.peek_kind() == Some(kind)
    }

    pub(crate) fn at_set(&mut self, set: TokenSet) -> bool {
        self.peek_kind().is_some_and(|kind| set.contains(kind))
    }

    pub(crate) fn at_eof(&mut self) -> bool {
        self.builder.eof()
    }

    /// Whether the current token is the identifier `keyword`.
    pub(crate) fn at_contextual_kw(&mut self, keyword: &str) -> bool {
        self.at(NAME) && self.builder.token_text() == Some(keyword)
    }

    pub(crate) fn advance(&mut self) {
        self.builder.advance();
    }

    pub(crate) fn eat(&mut self, kind: SyntaxKind) -> bool {
        if !self.at(kind) {
            return false;
        }
        self.advance();
        true
    }

    pub(crate) fn expect(&mut self, kind: SyntaxKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        self.error(format!("expected {}", describe(kind)));
        false
    }

    #[track_caller]
    pub(crate) fn start(&mut self) -> Marker {
        self.builder.mark()
    }

    #[track_caller]
    pub(crate) fn error(&mut self, message: impl Into<Box<str>>) {
        self.builder.error(message);
    }

    /// Wraps the current token into an error node.
    #[track_caller]
    pub(crate) fn error_and_bump(&mut self, message: &str) {
        let m = self.start();
        self.advance();
        m.error(self, message);
    }

    /// Reports `message`, skipping the current token unless it can start
    /// something in `recovery` or closes a block.
    #[track_caller]
    pub(crate) fn error_recover(&mut self, message: &str, recovery: TokenSet) {
        if self.at_eof() || self.at_set(recovery) || self.at_set(BLOCK_DELIMITERS) {
            self.error(message);
        } else {
            self.error_and_bump(message);
        }
    }
}

const BLOCK_DELIMITERS: TokenSet = TokenSet::new([LEFT_BRACE, RIGHT_BRACE]);

impl<'t> Deref for Parser<'t> {
    type Target = Builder<'t>;

    fn deref(&self) -> &Self::Target {
        &self.builder
    }
}

impl DerefMut for Parser<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.builder
    }
}

fn describe(kind: SyntaxKind) -> &'static str {
    match kind {
        LEFT_PAREN => "`(`",
        RIGHT_PAREN => "`)`",
        RIGHT_BRACKET => "`]`",
        LEFT_BRACE => "`{`",
        RIGHT_BRACE => "`}`",
        COLON => "`:`",
        COMMA => "`,`",
        SEMICOLON => "`;`",
        EQ => "`=`",
        FAT_ARROW => "`=>`",
        _ => kind_name(kind),
    }
}
