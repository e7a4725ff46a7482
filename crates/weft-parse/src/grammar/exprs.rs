use weft_builder::{CompletedMarker, Marker};
use weft_tokenizer::*;
use weft_tree::{SyntaxKind, TokenSet};

use super::{delimited, name, types};
use crate::parser::Parser;

const EXPR_FIRST: TokenSet = TokenSet::new([
    INT_NUMBER,
    FLOAT_NUMBER,
    TRUE_KW,
    FALSE_KW,
    NAME,
    LEFT_PAREN,
    PREFIX_OPERATOR,
    IF_KW,
    LOOP_KW,
    WHILE_KW,
]);

/// Expressions that end with a block and need no `;` as statements.
const BLOCK_LIKE: TokenSet = TokenSet::new([IF_EXPR, LOOP_EXPR, WHILE_EXPR]);

pub(crate) fn block(p: &mut Parser<'_>) {
    if !p.at(LEFT_BRACE) {
        p.error("expected a block");
        return;
    }

    let m = p.start();
    p.advance();

    // A statement without its `;` stays open until the next one starts, so
    // the error can be placed right after it.
    let mut unterminated: Option<(Marker, SyntaxKind)> = None;
    while !p.at(RIGHT_BRACE) && !p.at_eof() {
        let next = p.start();
        if let Some((previous, kind)) = unterminated.take() {
            previous.done_before_with_error(p, kind, next.id(), "expected `;`");
        }
        unterminated = stmt(p, next);
    }
    // The last one is the value of the block.
    if let Some((tail, kind)) = unterminated {
        tail.done(p, kind);
    }

    p.expect(RIGHT_BRACE);
    m.done(p, STMT_LIST);
}

/// Parses a statement into `m`, handing it back still open when the
/// statement is missing its `;`.
fn stmt(p: &mut Parser<'_>, m: Marker) -> Option<(Marker, SyntaxKind)> {
    if p.at_contextual_kw("return") {
        p.remap_current_token(RETURN_KW);
    }

    let kind = match p.peek_kind() {
        Some(VAL_KW) => {
            p.advance();
            name(p, TokenSet::new([EQ, COLON, SEMICOLON]));
            if p.at(COLON) {
                types::ascription(p);
            }
            if p.expect(EQ) {
                expr(p);
            }
            VAL_STMT
        }
        Some(RETURN_KW) => {
            p.advance();
            if p.at_set(EXPR_FIRST) {
                expr(p);
            }
            RETURN_STMT
        }
        Some(SEMICOLON) => {
            p.advance();
            m.error(p, "expected a statement");
            return None;
        }
        _ => match expr(p) {
            Some(expr) if BLOCK_LIKE.contains(expr.kind()) && !p.at(SEMICOLON) => {
                m.done(p, EXPR_STMT);
                return None;
            }
            _ => EXPR_STMT,
        },
    };

    if p.eat(SEMICOLON) {
        m.done(p, kind);
        None
    } else {
        Some((m, kind))
    }
}

pub(crate) fn expr(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    let mut lhs = unary_expr(p)?;

    while p.at(BINARY_OPERATOR) {
        let m = lhs.precede(p);
        p.advance();
        expr(p);
        lhs = m.done(p, BINARY_EXPR);
    }

    Some(lhs)
}

fn unary_expr(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    match p.peek_kind() {
        Some(LOOP_KW) => {
            let m = p.start();
            p.advance();
            block(p);
            Some(m.done(p, LOOP_EXPR))
        }
        Some(WHILE_KW) => {
            let m = p.start();
            p.advance();
            expr(p);
            block(p);
            Some(m.done(p, WHILE_EXPR))
        }
        Some(IF_KW) => Some(if_(p)),
        Some(PREFIX_OPERATOR) => {
            let m = p.start();
            p.advance();
            unary_expr(p);
            Some(m.done(p, PREFIX_EXPR))
        }
        _ => postfix_expr(p),
    }
}

fn if_(p: &mut Parser<'_>) -> CompletedMarker {
    debug_assert!(p.at(IF_KW));

    let m = p.start();
    p.advance();
    expr(p);
    block(p);

    let else_branch = p.start();
    if p.eat(ELSE_KW) {
        if p.at(IF_KW) {
            if_(p);
        } else {
            block(p);
        }
        else_branch.done(p, ELSE_BRANCH);
    } else {
        else_branch.drop(p);
    }

    m.done(p, IF_EXPR)
}

fn postfix_expr(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    let mut lhs = primary_expr(p)?;

    loop {
        lhs = match p.peek_kind() {
            Some(POSTFIX_OPERATOR) => {
                let m = lhs.precede(p);
                p.advance();
                m.done(p, POSTFIX_EXPR)
            }
            Some(LEFT_PAREN) => {
                let m = lhs.precede(p);
                arg_list(p);
                m.done(p, CALL_EXPR)
            }
            Some(DOT) if p.nth(1) == Some(NAME) => {
                let m = lhs.precede(p);
                p.advance();
                name(p, TokenSet::EMPTY);
                m.done(p, FIELD_EXPR)
            }
            _ => return Some(lhs),
        };
    }
}

fn arg_list(p: &mut Parser<'_>) {
    let m = p.start();
    delimited(p, LEFT_PAREN, RIGHT_PAREN, COMMA, "expected expression", EXPR_FIRST, |p| {
        expr(p).is_some()
    });
    m.done(p, ARG_LIST);
}

fn primary_expr(p: &mut Parser<'_>) -> Option<CompletedMarker> {
    match p.peek_kind() {
        Some(INT_NUMBER | FLOAT_NUMBER | TRUE_KW | FALSE_KW) => {
            let m = p.start();
            p.advance();
            Some(m.done(p, LITERAL))
        }
        Some(NAME) => {
            let m = p.start();
            p.advance();
            Some(m.done(p, IDENT))
        }
        Some(LEFT_PAREN) => Some(lambda_or_paren(p)),
        None | Some(RIGHT_BRACE | SEMICOLON) => {
            p.error("expected expression");
            None
        }
        Some(_) => {
            p.error_and_bump("expected expression");
            None
        }
    }
}

/// `(a, b) => body` can only be told apart from a parenthesized expression
/// at the arrow, so the parameter list is parsed speculatively.
fn lambda_or_paren(p: &mut Parser<'_>) -> CompletedMarker {
    debug_assert!(p.at(LEFT_PAREN));

    let lambda = p.start();
    if lambda_params(p) && p.at(FAT_ARROW) {
        p.advance();
        expr(p);
        return lambda.done(p, LAMBDA_EXPR);
    }
    lambda.rollback_to(p);

    let m = p.start();
    p.advance();
    if !p.at(RIGHT_PAREN) {
        expr(p);
    }
    p.expect(RIGHT_PAREN);
    m.done(p, PAREN_EXPR)
}

fn lambda_params(p: &mut Parser<'_>) -> bool {
    let m = p.start();
    p.advance();
    while p.at(NAME) {
        name(p, TokenSet::EMPTY);
        if !p.eat(COMMA) {
            break;
        }
    }
    let closed = p.eat(RIGHT_PAREN);
    m.done(p, LAMBDA_PARAMS);
    closed
}
