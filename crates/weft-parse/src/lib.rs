//! Recursive-descent grammar of the weft language, built on top of
//! [`weft_builder::Builder`].

use std::sync::LazyLock;

use thiserror::Error;
use weft_builder::{
    BinderTable, Classifier, EdgeBinders, LeadingCommentsBinder, LighterTree, ProtocolViolation,
    TokenStreamError, TrailingCommentsBinder,
};
use weft_tokenizer::{COMMENTS, EXPR_STMT, FN, RETURN_STMT, VAL_STMT, WHITESPACES};
use weft_tree::SyntaxTree;

pub use weft_builder::Parse;

mod grammar;
mod parser;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid token stream: {0}")]
    Tokens(#[from] TokenStreamError),
    #[error("the grammar broke the marker protocol: {0}")]
    Protocol(#[from] ProtocolViolation),
}

static LEADING_COMMENTS: LeadingCommentsBinder = LeadingCommentsBinder::new(COMMENTS);
static TRAILING_COMMENTS: TrailingCommentsBinder = TrailingCommentsBinder::new(COMMENTS);

/// Whitespace and comments of weft. Items and statements take the comments
/// written right above them and the ones trailing on their last line.
pub fn classifier() -> &'static Classifier {
    static CLASSIFIER: LazyLock<Classifier> = LazyLock::new(|| {
        let commented = EdgeBinders::new(&LEADING_COMMENTS, &TRAILING_COMMENTS);
        let binders = [FN, VAL_STMT, EXPR_STMT, RETURN_STMT]
            .into_iter()
            .fold(BinderTable::new(), |table, kind| table.with(kind, commented));
        Classifier::new(WHITESPACES, COMMENTS).with_binders(binders)
    });
    &CLASSIFIER
}

#[tracing::instrument(level = "debug", skip_all, fields(len = text.len()))]
pub fn module(text: &str) -> Result<Parse<SyntaxTree<'_>>, ParseError> {
    let mut parser = parser::Parser::new(weft_tokenizer::tokenize(text)?);
    grammar::items::module(&mut parser);
    Ok(parser.finish().build_tree()?)
}

#[tracing::instrument(level = "debug", skip_all, fields(len = text.len()))]
pub fn module_lighter(text: &str) -> Result<Parse<LighterTree<'_>>, ParseError> {
    let mut parser = parser::Parser::new(weft_tokenizer::tokenize(text)?);
    grammar::items::module(&mut parser);
    Ok(parser.finish().build_lighter_tree()?)
}
