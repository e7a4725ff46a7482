use weft_tokenizer::*;
use weft_tree::TokenSet;

use super::{delimited, exprs, name, types};
use crate::parser::Parser;

const ITEM_RECOVERY: TokenSet = TokenSet::new([FUN_KW, SEMICOLON, LEFT_PAREN, LEFT_BRACKET]);

pub(crate) fn module(p: &mut Parser<'_>) {
    let m = p.start();

    while !p.at_eof() {
        item(p);
    }

    m.done(p, MODULE);
}

fn item(p: &mut Parser<'_>) {
    match p.peek_kind() {
        Some(FUN_KW) => fun(p),
        Some(SEMICOLON) => p.error_and_bump("expected item, found `;`"),
        _ => p.error_and_bump("expected an item"),
    }
}

fn fun(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();

    name(p, ITEM_RECOVERY);
    type_params(p);

    if p.at(LEFT_PAREN) {
        param_list(p);
    } else {
        p.error("expected function parameters");
    }

    if p.at(COLON) {
        let m = p.start();
        types::ascription(p);
        m.done(p, RETURN_TYPE);
    }

    exprs::block(p);

    m.done(p, FN);
}

fn type_params(p: &mut Parser<'_>) {
    if !p.at(LEFT_BRACKET) {
        return;
    }

    let m = p.start();
    delimited(
        p,
        LEFT_BRACKET,
        RIGHT_BRACKET,
        COMMA,
        "expected type parameter",
        TokenSet::new([NAME]),
        type_param,
    );
    m.done(p, TYPE_PARAMS);
}

fn type_param(p: &mut Parser<'_>) -> bool {
    if !p.at(NAME) {
        return false;
    }
    let m = p.start();
    p.advance();
    m.done(p, TYPE_PARAM);
    true
}

fn param_list(p: &mut Parser<'_>) {
    let m = p.start();
    p.advance();

    while !p.at(RIGHT_PAREN) && !p.at_eof() {
        if !p.at(NAME) {
            p.error("expected parameter name");
            if p.eat(COMMA) {
                continue;
            }
            break;
        }

        param(p);

        if !p.eat(COMMA) {
            if p.at(NAME) {
                p.expect(COMMA);
            } else {
                break;
            }
        }
    }

    p.expect(RIGHT_PAREN);
    m.done(p, PARAM_LIST);
}

fn param(p: &mut Parser<'_>) {
    let m = p.start();
    name(p, TokenSet::EMPTY);

    if p.at(COLON) {
        types::ascription(p);
    } else {
        p.error("missing type for function parameter");
    }

    m.done(p, PARAM);
}
