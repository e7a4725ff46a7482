//! Token and node kinds of the weft language.

use weft_tree::{SyntaxKind, TokenSet};

macro_rules! syntax_kinds {
    ($($name:ident),* $(,)?) => {
        #[allow(non_camel_case_types, clippy::upper_case_acronyms, dead_code)]
        #[repr(u16)]
        enum Raw {
            __RESERVED = SyntaxKind::ERROR.into_raw(),
            $($name,)*
        }

        $(pub const $name: SyntaxKind = SyntaxKind::new(Raw::$name as u16);)*

        /// Human-readable name of `kind`, used by tree dumps.
        pub fn kind_name(kind: SyntaxKind) -> &'static str {
            match kind {
                SyntaxKind::ERROR => "ERROR",
                $($name => stringify!($name),)*
                _ => "<foreign kind>",
            }
        }
    };
}

syntax_kinds! {
    WHITESPACE,
    LINE_COMMENT,
    DOC_COMMENT,
    BLOCK_COMMENT,

    LEFT_PAREN,
    RIGHT_PAREN,
    LEFT_BRACKET,
    RIGHT_BRACKET,
    LEFT_BRACE,
    RIGHT_BRACE,
    COLON,
    COMMA,
    SEMICOLON,
    EQ,
    DOT,
    FAT_ARROW,

    FUN_KW,
    IF_KW,
    ELSE_KW,
    LOOP_KW,
    VAL_KW,
    WHILE_KW,
    // Contextual: lexed as `NAME` and remapped by the parser.
    RETURN_KW,
    TRUE_KW,
    FALSE_KW,
    NAME,

    INT_NUMBER,
    FLOAT_NUMBER,
    BINARY_OPERATOR,
    POSTFIX_OPERATOR,
    PREFIX_OPERATOR,

    UNKNOWN,

    MODULE,
    FN,
    IDENT,
    TYPE_PARAMS,
    TYPE_PARAM,
    PARAM_LIST,
    PARAM,
    RETURN_TYPE,
    PATH_TYPE,
    STMT_LIST,
    VAL_STMT,
    EXPR_STMT,
    RETURN_STMT,
    LITERAL,
    PAREN_EXPR,
    BINARY_EXPR,
    PREFIX_EXPR,
    POSTFIX_EXPR,
    CALL_EXPR,
    ARG_LIST,
    FIELD_EXPR,
    IF_EXPR,
    ELSE_BRANCH,
    LOOP_EXPR,
    WHILE_EXPR,
    LAMBDA_EXPR,
    LAMBDA_PARAMS,
}

pub const WHITESPACES: TokenSet = TokenSet::new([WHITESPACE]);
pub const COMMENTS: TokenSet = TokenSet::new([LINE_COMMENT, DOC_COMMENT, BLOCK_COMMENT]);
pub const TRIVIA: TokenSet = WHITESPACES.union(&COMMENTS);
