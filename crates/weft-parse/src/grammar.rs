use weft_tokenizer::*;
use weft_tree::{SyntaxKind, TokenSet};

use crate::parser::Parser;

pub(crate) mod exprs;
pub(crate) mod items;
mod types;

pub(crate) fn name(p: &mut Parser<'_>, recovery: TokenSet) {
    if p.at(NAME) {
        let m = p.start();
        p.advance();
        m.done(p, IDENT);
    } else {
        p.error_recover("expected identifier", recovery);
    }
}

pub(crate) fn delimited(
    p: &mut Parser<'_>,
    bra: SyntaxKind,
    ket: SyntaxKind,
    delim: SyntaxKind,
    unexpected_delim_message: &'static str,
    first_set: TokenSet,
    mut parser: impl FnMut(&mut Parser<'_>) -> bool,
) {
    debug_assert!(p.at(bra));
    p.advance();

    while !p.at(ket) && !p.at_eof() {
        if p.at(delim) {
            p.error_and_bump(unexpected_delim_message);
            continue;
        }

        if !parser(p) {
            break;
        }

        if !p.eat(delim) {
            if p.at_set(first_set) {
                p.expect(delim);
            } else {
                break;
            }
        }
    }

    p.expect(ket);
}
