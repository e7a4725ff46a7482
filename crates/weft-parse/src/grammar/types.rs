use weft_tokenizer::*;

use crate::parser::Parser;

/// A possibly dotted type name, kept as a single leaf.
pub(crate) fn type_(p: &mut Parser<'_>) {
    if !p.at(NAME) {
        p.error("expected a type");
        return;
    }

    let m = p.start();
    p.advance();
    while p.at(DOT) && p.nth(1) == Some(NAME) {
        p.advance();
        p.advance();
    }
    m.collapse(p, PATH_TYPE);
}

pub(crate) fn ascription(p: &mut Parser<'_>) {
    debug_assert!(p.at(COLON));
    p.advance();
    type_(p);
}
