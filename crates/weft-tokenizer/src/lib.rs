//! Lexer for the weft language.
//!
//! Every character ends up in exactly one token: whitespace and comments are
//! tokens of their own, left for the builder's classifier to hide from the
//! parser.

mod cursor;
mod kinds;

use cursor::{Cursor, EOF_CHAR};
pub use kinds::*;
use text_size::{TextRange, TextSize};
use weft_builder::{Lexer, TokenStream, TokenStreamError};
use weft_tree::SyntaxKind;

/// Lexes all of `text`.
pub fn tokenize(text: &str) -> Result<TokenStream<'_>, TokenStreamError> {
    TokenStream::lex(text, Tokenizer::new(text))
}

pub struct Tokenizer<'t> {
    text: &'t str,
    cursor: Cursor<'t>,
    current: Option<(SyntaxKind, TextRange)>,
}

impl<'t> Tokenizer<'t> {
    pub fn new(text: &'t str) -> Self {
        let mut tokenizer = Self { text, cursor: Cursor::new(text), current: None };
        tokenizer.next_token();
        tokenizer
    }

    pub fn peek(&self) -> Option<(SyntaxKind, TextRange)> {
        self.current
    }

    fn offset(&self) -> TextSize {
        TextSize::of(self.text) - self.cursor.len()
    }

    fn range(&self) -> TextRange {
        let end = self.offset();
        TextRange::new(end - self.cursor.pos_within_token(), end)
    }

    fn text(&self) -> &'t str {
        &self.text[self.range()]
    }

    /// Moves to the next token and returns the one it replaced.
    pub fn next_token(&mut self) -> Option<(SyntaxKind, TextRange)> {
        let next = if self.cursor.is_eof() {
            None
        } else {
            let kind = self.syntax_kind();
            let range = self.range();
            self.cursor.reset_pos_within_token();
            Some((kind, range))
        };
        std::mem::replace(&mut self.current, next)
    }

    fn syntax_kind(&mut self) -> SyntaxKind {
        let previous = self.cursor.previous();

        match self.cursor.advance() {
            c if c.is_whitespace() => {
                self.cursor.advance_while(char::is_whitespace);
                WHITESPACE
            }
            '/' if self.cursor.matches('/') => {
                let doc = self.cursor.second() == '/' && self.cursor.third() != '/';
                self.cursor.advance_while(|c| c != '\n');
                if doc { DOC_COMMENT } else { LINE_COMMENT }
            }
            '/' if self.cursor.matches('*') => {
                self.cursor.advance();
                self.block_comment();
                BLOCK_COMMENT
            }
            '(' => LEFT_PAREN,
            ')' => RIGHT_PAREN,
            '[' => LEFT_BRACKET,
            ']' => RIGHT_BRACKET,
            '{' => LEFT_BRACE,
            '}' => RIGHT_BRACE,
            ':' => COLON,
            ',' => COMMA,
            ';' => SEMICOLON,
            first_char @ '0'..='9' => self.number(first_char),
            'A'..='Z' | 'a'..='z' | '_' => {
                self.cursor.advance_while(|c| c.is_ascii_alphanumeric() || c == '_');

                match self.text() {
                    "fun" => FUN_KW,
                    "if" => IF_KW,
                    "else" => ELSE_KW,
                    "loop" => LOOP_KW,
                    "val" => VAL_KW,
                    "while" => WHILE_KW,
                    _ => NAME,
                }
            }
            first_char if is_operator(first_char) => {
                self.cursor.advance_while(is_operator);

                let left_bound = match previous {
                    '(' | '[' | '{' | ',' | ':' | ';' => false,
                    EOF_CHAR => false,
                    prev => !prev.is_whitespace(),
                };

                let right_bound = match self.cursor.peek() {
                    ')' | ']' | '}' | ',' | ':' | ';' => false,
                    '.' => !left_bound,
                    EOF_CHAR => false,
                    peeked => !peeked.is_whitespace(),
                };

                match self.text() {
                    "=" => EQ,
                    "." => DOT,
                    "=>" => FAT_ARROW,
                    _ if left_bound == right_bound => BINARY_OPERATOR,
                    _ if left_bound => POSTFIX_OPERATOR,
                    _ => PREFIX_OPERATOR,
                }
            }
            _ => UNKNOWN,
        }
    }

    /// Block comments nest; an unterminated one runs to the end of the text.
    fn block_comment(&mut self) {
        let mut depth = 1usize;
        while depth > 0 && !self.cursor.is_eof() {
            match self.cursor.advance() {
                '/' if self.cursor.matches('*') => {
                    self.cursor.advance();
                    depth += 1;
                }
                '*' if self.cursor.matches('/') => {
                    self.cursor.advance();
                    depth -= 1;
                }
                _ => {}
            }
        }
    }

    fn number(&mut self, c: char) -> SyntaxKind {
        if c == '0' {
            match self.cursor.peek() {
                'b' | 'o' => {
                    self.cursor.advance();
                    self.digits(false);
                }
                'x' => {
                    self.cursor.advance();
                    self.digits(true);
                }
                '0'..='9' | '_' | '.' | 'e' | 'E' => {
                    self.digits(false);
                }
                _ => return INT_NUMBER,
            }
        } else {
            self.digits(false);
        }

        if self.cursor.matches('.') && self.cursor.second().is_ascii_digit() {
            self.cursor.advance();
            self.digits(false);
            self.float_exponent();
            return FLOAT_NUMBER;
        }

        if self.cursor.matches('e') || self.cursor.matches('E') {
            self.float_exponent();
            return FLOAT_NUMBER;
        }

        INT_NUMBER
    }

    fn digits(&mut self, allow_hex: bool) {
        loop {
            match self.cursor.peek() {
                '_' | '0'..='9' => {
                    self.cursor.advance();
                }
                'a'..='f' | 'A'..='F' if allow_hex => {
                    self.cursor.advance();
                }
                _ => return,
            }
        }
    }

    fn float_exponent(&mut self) {
        if self.cursor.matches('e') || self.cursor.matches('E') {
            self.cursor.advance();
            if self.cursor.matches('-') || self.cursor.matches('+') {
                self.cursor.advance();
            }
            self.digits(false);
        }
    }
}

impl Lexer for Tokenizer<'_> {
    fn token_kind(&self) -> Option<SyntaxKind> {
        self.current.map(|(kind, _)| kind)
    }

    fn token_range(&self) -> TextRange {
        self.current.map_or_else(|| TextRange::empty(TextSize::of(self.text)), |(_, range)| range)
    }

    fn advance(&mut self) {
        self.next_token();
    }
}

fn is_operator(c: char) -> bool {
    matches!(
        c,
        '/' | '=' | '-' | '+' | '*' | '%' | '<' | '>' | '!' | '&' | '|' | '^' | '~' | '.' | '?'
    )
}

#[cfg(test)]
mod tests {
    use expect_test::{Expect, expect};

    use super::*;

    fn check(text: &str, expect: Expect) {
        let tokens = tokenize(text).unwrap();
        let actual = tokens
            .tokens()
            .map(|token| format!("{} {:?}\n", kind_name(token.kind), &text[token.range]))
            .collect::<String>();
        expect.assert_eq(&actual);
    }

    fn kinds(text: &str) -> Vec<SyntaxKind> {
        tokenize(text)
            .unwrap()
            .tokens()
            .map(|token| token.kind)
            .filter(|&kind| !TRIVIA.contains(kind))
            .collect()
    }

    #[test]
    fn integer_literals() {
        for input in ["123", "0", "0b1010", "0o755", "0x1f", "123_456"] {
            assert_eq!(kinds(input), [INT_NUMBER], "input: {input:?}");
        }
    }

    #[test]
    fn float_literals() {
        for input in ["123.456", "0.0", "1e10", "1.0e-5", "123_456.789_012"] {
            assert_eq!(kinds(input), [FLOAT_NUMBER], "input: {input:?}");
        }
    }

    #[test]
    fn field_access_on_a_number_is_not_a_float() {
        assert_eq!(kinds("1.max"), [INT_NUMBER, DOT, NAME]);
    }

    #[test]
    fn trivia_are_tokens() {
        check(
            "val x = 1 // one\n/* a /* nested */ block */ /// doc\n",
            expect![[r#"
                VAL_KW "val"
                WHITESPACE " "
                NAME "x"
                WHITESPACE " "
                EQ "="
                WHITESPACE " "
                INT_NUMBER "1"
                WHITESPACE " "
                LINE_COMMENT "// one"
                WHITESPACE "\n"
                BLOCK_COMMENT "/* a /* nested */ block */"
                WHITESPACE " "
                DOC_COMMENT "/// doc"
                WHITESPACE "\n"
            "#]],
        );
    }

    #[test]
    fn unterminated_block_comment() {
        check(
            "a /* b",
            expect![[r#"
                NAME "a"
                WHITESPACE " "
                BLOCK_COMMENT "/* b"
            "#]],
        );
    }

    #[test]
    fn punctuation() {
        assert_eq!(
            kinds("fun f[T](x: T): T { x; }"),
            [
                FUN_KW,
                NAME,
                LEFT_BRACKET,
                NAME,
                RIGHT_BRACKET,
                LEFT_PAREN,
                NAME,
                COLON,
                NAME,
                RIGHT_PAREN,
                COLON,
                NAME,
                LEFT_BRACE,
                NAME,
                SEMICOLON,
                RIGHT_BRACE,
            ]
        );
    }

    #[test]
    fn eq_and_fat_arrow() {
        assert_eq!(kinds("x=y"), [NAME, EQ, NAME]);
        assert_eq!(kinds("x == y"), [NAME, BINARY_OPERATOR, NAME]);
        assert_eq!(kinds("(a) => a"), [LEFT_PAREN, NAME, RIGHT_PAREN, FAT_ARROW, NAME]);
    }

    #[test]
    fn contextual_keywords_are_names() {
        assert_eq!(kinds("return true"), [NAME, NAME]);
    }

    #[test]
    fn operator_fixity() {
        check(
            "-a * b++ / ++c - d--",
            expect![[r#"
                PREFIX_OPERATOR "-"
                NAME "a"
                WHITESPACE " "
                BINARY_OPERATOR "*"
                WHITESPACE " "
                NAME "b"
                POSTFIX_OPERATOR "++"
                WHITESPACE " "
                BINARY_OPERATOR "/"
                WHITESPACE " "
                PREFIX_OPERATOR "++"
                NAME "c"
                WHITESPACE " "
                BINARY_OPERATOR "-"
                WHITESPACE " "
                NAME "d"
                POSTFIX_OPERATOR "--"
            "#]],
        );
    }

    #[test]
    fn operators_next_to_delimiters() {
        assert_eq!(
            kinds("(-a) + (b++)"),
            [
                LEFT_PAREN,
                PREFIX_OPERATOR,
                NAME,
                RIGHT_PAREN,
                BINARY_OPERATOR,
                LEFT_PAREN,
                NAME,
                POSTFIX_OPERATOR,
                RIGHT_PAREN,
            ]
        );
        assert_eq!(kinds("- a"), [BINARY_OPERATOR, NAME]);
        assert_eq!(kinds("a ++"), [NAME, BINARY_OPERATOR]);
    }

    #[test]
    fn unknown_characters() {
        assert_eq!(kinds("a @ b"), [NAME, UNKNOWN, NAME]);
        assert_eq!(kinds("é"), [UNKNOWN]);
    }

    #[test]
    fn lexer_contract() {
        let mut tokenizer = Tokenizer::new("a b");
        assert_eq!(tokenizer.token_kind(), Some(NAME));
        assert_eq!(tokenizer.token_range(), TextRange::new(TextSize::from(0), TextSize::from(1)));
        tokenizer.advance();
        tokenizer.advance();
        tokenizer.advance();
        assert_eq!(tokenizer.token_kind(), None);
        assert_eq!(tokenizer.token_range(), TextRange::empty(TextSize::from(3)));
        assert!(Tokenizer::new("").peek().is_none());
    }
}
