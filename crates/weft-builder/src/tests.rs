use std::cell::RefCell;

use expect_test::{Expect, expect};
use text_size::{TextRange, TextSize};
use weft_tree::{SyntaxKind, TokenSet, TreeView, WalkEvent};

use crate::{
    BinderTable, Builder, Classifier, DEFAULT_LEFT, DEFAULT_RIGHT, EdgeBinders, GREEDY_LEFT,
    GREEDY_RIGHT, LeadingCommentsBinder, Parse, ProtocolViolation, Token, TokenStream,
    TrailingCommentsBinder,
};

const ROOT: SyntaxKind = SyntaxKind::new(1);
const WORD: SyntaxKind = SyntaxKind::new(2);
const WS: SyntaxKind = SyntaxKind::new(3);
const COMMENT: SyntaxKind = SyntaxKind::new(4);
const EQ: SyntaxKind = SyntaxKind::new(5);
const SEMI: SyntaxKind = SyntaxKind::new(6);
const PLUS: SyntaxKind = SyntaxKind::new(7);
const DOT: SyntaxKind = SyntaxKind::new(8);
const UNKNOWN: SyntaxKind = SyntaxKind::new(9);
const NAME: SyntaxKind = SyntaxKind::new(10);
const LIST: SyntaxKind = SyntaxKind::new(11);
const ASSIGN: SyntaxKind = SyntaxKind::new(12);
const BINARY: SyntaxKind = SyntaxKind::new(13);
const PATH: SyntaxKind = SyntaxKind::new(14);
const STMT: SyntaxKind = SyntaxKind::new(15);
const KEYWORD: SyntaxKind = SyntaxKind::new(16);

const COMMENTS: TokenSet = TokenSet::new([COMMENT]);

fn names(kind: SyntaxKind) -> &'static str {
    match kind {
        SyntaxKind::ERROR => "ERROR",
        ROOT => "ROOT",
        WORD => "WORD",
        WS => "WS",
        COMMENT => "COMMENT",
        EQ => "EQ",
        SEMI => "SEMI",
        PLUS => "PLUS",
        DOT => "DOT",
        UNKNOWN => "UNKNOWN",
        NAME => "NAME",
        LIST => "LIST",
        ASSIGN => "ASSIGN",
        BINARY => "BINARY",
        PATH => "PATH",
        STMT => "STMT",
        KEYWORD => "KEYWORD",
        _ => "?",
    }
}

fn lex(text: &str) -> TokenStream<'_> {
    let mut tokens = Vec::new();
    let mut offset = 0;
    while offset < text.len() {
        let rest = &text[offset..];
        let first = rest.chars().next().unwrap();
        let run = |pred: fn(char) -> bool| rest.find(|c| !pred(c)).unwrap_or(rest.len());
        let (kind, len) = if first.is_whitespace() {
            (WS, run(char::is_whitespace))
        } else if rest.starts_with("//") {
            (COMMENT, rest.find('\n').unwrap_or(rest.len()))
        } else if first.is_alphanumeric() {
            (WORD, run(char::is_alphanumeric))
        } else {
            let kind = match first {
                '=' => EQ,
                ';' => SEMI,
                '+' => PLUS,
                '.' => DOT,
                _ => UNKNOWN,
            };
            (kind, first.len_utf8())
        };
        let range = TextRange::at(
            TextSize::try_from(offset).unwrap(),
            TextSize::try_from(len).unwrap(),
        );
        tokens.push(Token::new(kind, range));
        offset += len;
    }
    TokenStream::new(text, tokens).unwrap()
}

fn classifier() -> Classifier {
    Classifier::new(TokenSet::new([WS]), COMMENTS)
}

fn advance_all(b: &mut Builder<'_>) {
    while !b.eof() {
        b.advance();
    }
}

fn name(b: &mut Builder<'_>) {
    let m = b.mark();
    b.advance();
    m.done(b, NAME);
}

fn leaves<V: TreeView>(tree: &V) -> String {
    tree.preorder()
        .filter_map(|event| match event {
            WalkEvent::Enter(element) if tree.is_leaf(element) => Some(tree.element_text(element)),
            _ => None,
        })
        .collect()
}

fn render<V: TreeView>(parse: &Parse<V>) -> String {
    let mut actual = parse.tree().debug_dump(names).to_string();
    for error in parse.errors() {
        actual.push_str(&format!("error@{:?}: {}\n", error.range(), error.message()));
    }
    actual
}

/// Runs `parse` once per tree mode and checks that both trees agree.
fn parse_with(classifier: &Classifier, text: &str, parse: impl Fn(&mut Builder<'_>)) -> String {
    let mut b = Builder::new(lex(text), classifier);
    parse(&mut b);
    let heavy = b.build_tree().unwrap();

    let mut b = Builder::new(lex(text), classifier);
    parse(&mut b);
    let lighter = b.build_lighter_tree().unwrap();

    assert_eq!(leaves(heavy.tree()), text);
    assert_eq!(leaves(lighter.tree()), text);
    let actual = render(&heavy);
    assert_eq!(actual, render(&lighter));
    actual
}

fn check(text: &str, parse: impl Fn(&mut Builder<'_>), expect: Expect) {
    expect.assert_eq(&parse_with(&classifier(), text, parse));
}

fn violation(text: &str, parse: impl Fn(&mut Builder<'_>)) -> ProtocolViolation {
    let classifier = classifier();
    let mut b = Builder::new(lex(text), &classifier);
    parse(&mut b);
    let heavy = b.build_tree().unwrap_err();

    let mut b = Builder::new(lex(text), &classifier);
    parse(&mut b);
    let lighter = b.build_lighter_tree().unwrap_err();

    assert_eq!(heavy, lighter);
    heavy
}

#[test]
fn done_covers_interior_whitespace() {
    check(
        "x = 1;",
        |b| {
            let root = b.mark();
            let m = b.mark();
            advance_all(b);
            m.done(b, ASSIGN);
            root.done(b, ROOT);
        },
        expect![[r#"
            ROOT@0..6
              ASSIGN@0..6
                WORD@0..1 "x"
                WS@1..2 " "
                EQ@2..3 "="
                WS@3..4 " "
                WORD@4..5 "1"
                SEMI@5..6 ";"
        "#]],
    );
}

#[test]
fn whitespace_at_stream_edges_goes_to_root() {
    check(
        "  x = 1;  ",
        |b| {
            let root = b.mark();
            let m = b.mark();
            advance_all(b);
            m.done(b, ASSIGN);
            root.done(b, ROOT);
        },
        expect![[r#"
            ROOT@0..10
              WS@0..2 "  "
              ASSIGN@2..8
                WORD@2..3 "x"
                WS@3..4 " "
                EQ@4..5 "="
                WS@5..6 " "
                WORD@6..7 "1"
                SEMI@7..8 ";"
              WS@8..10 "  "
        "#]],
    );
}

#[test]
fn empty_input() {
    check(
        "",
        |b| {
            let root = b.mark();
            assert_eq!(b.token_type(), None);
            root.done(b, ROOT);
        },
        expect![[r#"
            ROOT@0..0
        "#]],
    );
}

#[test]
fn precede_wraps_a_completed_marker() {
    check(
        "a + b",
        |b| {
            let root = b.mark();
            let lhs = b.mark();
            b.advance();
            let lhs = lhs.done(b, NAME);
            let m = lhs.precede(b);
            b.advance();
            name(b);
            let binary = m.done(b, BINARY);
            assert_eq!(binary.kind(), BINARY);
            root.done(b, ROOT);
        },
        expect![[r#"
            ROOT@0..5
              BINARY@0..5
                NAME@0..1
                  WORD@0..1 "a"
                WS@1..2 " "
                PLUS@2..3 "+"
                WS@3..4 " "
                NAME@4..5
                  WORD@4..5 "b"
        "#]],
    );
}

#[test]
fn precede_wraps_an_open_marker() {
    check(
        "a b",
        |b| {
            let root = b.mark();
            let m = b.mark();
            b.advance();
            let list = m.precede(b);
            m.done(b, NAME);
            b.advance();
            list.done(b, LIST);
            root.done(b, ROOT);
        },
        expect![[r#"
            ROOT@0..3
              LIST@0..3
                NAME@0..1
                  WORD@0..1 "a"
                WS@1..2 " "
                WORD@2..3 "b"
        "#]],
    );
}

#[test]
fn done_before_ends_at_the_start_of_the_other_marker() {
    check(
        "a b c",
        |b| {
            let root = b.mark();
            let m = b.mark();
            name(b);
            let n = b.mark();
            m.done_before(b, LIST, n.id());
            b.advance();
            n.done(b, NAME);
            advance_all(b);
            root.done(b, ROOT);
        },
        expect![[r#"
            ROOT@0..5
              LIST@0..1
                NAME@0..1
                  WORD@0..1 "a"
              WS@1..2 " "
              NAME@2..3
                WORD@2..3 "b"
              WS@3..4 " "
              WORD@4..5 "c"
        "#]],
    );
}

#[test]
fn done_before_with_error_leaves_an_error_at_the_end() {
    check(
        "a b",
        |b| {
            let root = b.mark();
            let m = b.mark();
            b.advance();
            let n = b.mark();
            m.done_before_with_error(b, STMT, n.id(), "expected `;`");
            b.advance();
            n.done(b, NAME);
            root.done(b, ROOT);
        },
        expect![[r#"
            ROOT@0..3
              STMT@0..1
                WORD@0..1 "a"
                ERROR@1..1 (expected `;`)
              WS@1..2 " "
              NAME@2..3
                WORD@2..3 "b"
            error@1..1: expected `;`
        "#]],
    );
}

#[test]
fn error_before_wraps_the_skipped_tokens() {
    check(
        "a b",
        |b| {
            let root = b.mark();
            let m = b.mark();
            b.advance();
            let n = b.mark();
            let error = m.error_before(b, "unexpected token", n.id());
            assert_eq!(error.kind(), SyntaxKind::ERROR);
            b.advance();
            n.done(b, NAME);
            root.done(b, ROOT);
        },
        expect![[r#"
            ROOT@0..3
              ERROR@0..1 (unexpected token)
                WORD@0..1 "a"
              WS@1..2 " "
              NAME@2..3
                WORD@2..3 "b"
            error@0..1: unexpected token
        "#]],
    );
}

#[test]
fn errors_are_nodes_and_diagnostics() {
    check(
        "a = ;",
        |b| {
            let root = b.mark();
            let stmt = b.mark();
            b.advance();
            b.advance();
            b.error("expected expression");
            b.error("expected something else");
            b.advance();
            stmt.done(b, ASSIGN);
            root.done(b, ROOT);
        },
        expect![[r#"
            ROOT@0..5
              ASSIGN@0..5
                WORD@0..1 "a"
                WS@1..2 " "
                EQ@2..3 "="
                WS@3..4 " "
                ERROR@4..4 (expected expression)
                SEMI@4..5 ";"
            error@4..4: expected expression
        "#]],
    );
}

#[test]
fn collapse_makes_a_single_leaf() {
    check(
        "a.b c",
        |b| {
            let root = b.mark();
            let path = b.mark();
            name(b);
            b.advance();
            b.error("discarded with the collapsed marker");
            name(b);
            path.collapse(b, PATH);
            advance_all(b);
            root.done(b, ROOT);
        },
        expect![[r#"
            ROOT@0..5
              PATH@0..3 "a.b"
              WS@3..4 " "
              WORD@4..5 "c"
        "#]],
    );
}

#[test]
fn collapsed_root_keeps_its_tokens() {
    check(
        "a.b",
        |b| {
            let root = b.mark();
            name(b);
            advance_all(b);
            root.collapse(b, PATH);
        },
        expect![[r#"
            PATH@0..3
              WORD@0..1 "a"
              DOT@1..2 "."
              WORD@2..3 "b"
        "#]],
    );
}

#[test]
fn drop_lifts_children_to_the_parent() {
    check(
        "a b",
        |b| {
            let root = b.mark();
            let m = b.mark();
            name(b);
            m.drop(b);
            advance_all(b);
            root.done(b, ROOT);
        },
        expect![[r#"
            ROOT@0..3
              NAME@0..1
                WORD@0..1 "a"
              WS@1..2 " "
              WORD@2..3 "b"
        "#]],
    );
}

#[test]
fn rollback_forgets_everything_after_the_marker() {
    let plain = |b: &mut Builder<'_>| {
        let root = b.mark();
        name(b);
        advance_all(b);
        root.done(b, ROOT);
    };
    let speculative = |b: &mut Builder<'_>| {
        let root = b.mark();
        let attempt = b.mark();
        name(b);
        b.error("not a list");
        b.advance();
        attempt.rollback_to(b);
        assert_eq!(b.raw_token_index(), 0);
        assert_eq!(b.token_text(), Some("a"));
        name(b);
        advance_all(b);
        root.done(b, ROOT);
    };

    let classifier = classifier();
    let expected = parse_with(&classifier, "a = b", plain);
    assert_eq!(parse_with(&classifier, "a = b", speculative), expected);
    assert!(!expected.contains("error"));
}

#[test]
fn latest_done_marker_follows_the_log() {
    let classifier = classifier();
    let mut b = Builder::new(lex("a b"), &classifier);
    let root = b.mark();
    assert_eq!(b.latest_done_marker(), None);
    name(&mut b);
    let first = b.latest_done_marker().unwrap();
    assert_eq!(first.kind(), NAME);

    let attempt = b.mark();
    name(&mut b);
    assert_ne!(b.latest_done_marker(), Some(first));
    attempt.rollback_to(&mut b);
    assert_eq!(b.latest_done_marker(), Some(first));

    advance_all(&mut b);
    root.done(&mut b, ROOT);
    assert_eq!(b.latest_done_marker().map(|it| it.kind()), Some(ROOT));
}

#[test]
fn cursor_operations() {
    let classifier = classifier();
    let mut b = Builder::new(lex("a = b"), &classifier);
    assert_eq!(b.original_text(), "a = b");
    assert_eq!(b.token_type(), Some(WORD));
    assert_eq!(b.look_ahead(1), Some(EQ));
    assert_eq!(b.look_ahead(2), Some(WORD));
    assert_eq!(b.look_ahead(3), None);
    assert_eq!(b.raw_lookup(1), Some(WS));
    assert_eq!(b.raw_token_start(1), Some(TextSize::from(1)));

    b.advance();
    assert_eq!(b.raw_lookup(-1), Some(WORD));
    assert_eq!(b.current_offset(), TextSize::from(2));
    assert_eq!(b.token_text(), Some("="));

    b.raw_advance(2);
    assert_eq!(b.raw_token_index(), 4);
    assert_eq!(b.token_text(), Some("b"));
    b.advance();
    assert!(b.eof());
    assert_eq!(b.current_offset(), TextSize::from(5));
}

#[test]
fn remapped_tokens_keep_their_new_kind() {
    check(
        "return x",
        |b| {
            b.set_token_type_remapper(|kind, _, text| if text == "return" { KEYWORD } else { kind });
            let root = b.mark();
            assert_eq!(b.token_type(), Some(KEYWORD));
            b.advance();
            assert_eq!(b.token_type(), Some(WORD));
            b.remap_current_token(NAME);
            assert_eq!(b.token_type(), Some(NAME));
            b.advance();
            root.done(b, ROOT);
        },
        expect![[r#"
            ROOT@0..8
              KEYWORD@0..6 "return"
              WS@6..7 " "
              NAME@7..8 "x"
        "#]],
    );
}

#[test]
fn skipped_whitespace_is_reported() {
    let classifier = classifier();
    let skipped = RefCell::new(Vec::new());
    let mut b = Builder::new(lex("a // c\nb"), &classifier);
    b.set_whitespace_skipped_callback(|kind, range| skipped.borrow_mut().push((kind, range)));
    let root = b.mark();
    advance_all(&mut b);
    root.done(&mut b, ROOT);
    b.build_tree().unwrap();

    let range = |start: u32, end: u32| TextRange::new(start.into(), end.into());
    assert_eq!(
        skipped.into_inner(),
        [(WS, range(1, 2)), (COMMENT, range(2, 6)), (WS, range(6, 7))]
    );
}

#[test]
fn enforced_comments_are_skipped() {
    check(
        "a ; b",
        |b| {
            b.enforce_comment_tokens(TokenSet::new([SEMI]));
            let root = b.mark();
            name(b);
            assert_eq!(b.token_type(), Some(WORD));
            name(b);
            root.done(b, ROOT);
        },
        expect![[r#"
            ROOT@0..5
              NAME@0..1
                WORD@0..1 "a"
              WS@1..2 " "
              SEMI@2..3 ";"
              WS@3..4 " "
              NAME@4..5
                WORD@4..5 "b"
        "#]],
    );
}

#[test]
fn trailing_comment_binder_claims_same_line_comments() {
    static TRAILING: TrailingCommentsBinder = TrailingCommentsBinder::new(COMMENTS);

    check(
        "a // c\nb",
        |b| {
            let root = b.mark();
            let m = b.mark();
            b.advance();
            let m = m.done(b, NAME);
            m.set_edge_binders(b, DEFAULT_LEFT, &TRAILING);
            name(b);
            root.done(b, ROOT);
        },
        expect![[r#"
            ROOT@0..8
              NAME@0..6
                WORD@0..1 "a"
                WS@1..2 " "
                COMMENT@2..6 "// c"
              WS@6..7 "\n"
              NAME@7..8
                WORD@7..8 "b"
        "#]],
    );
}

#[test]
fn binder_table_applies_per_kind() {
    static LEADING: LeadingCommentsBinder = LeadingCommentsBinder::new(COMMENTS);

    let classifier = classifier()
        .with_binders(BinderTable::new().with(NAME, EdgeBinders::new(&LEADING, DEFAULT_RIGHT)));
    let actual = parse_with(&classifier, "// doc\nfoo", |b| {
        let root = b.mark();
        name(b);
        root.done(b, ROOT);
    });
    expect![[r#"
        ROOT@0..10
          NAME@0..10
            COMMENT@0..6 "// doc"
            WS@6..7 "\n"
            WORD@7..10 "foo"
    "#]]
    .assert_eq(&actual);
}

#[test]
fn earlier_claim_wins() {
    check(
        "a  b",
        |b| {
            let root = b.mark();
            let first = b.mark();
            first.set_edge_binders(b, DEFAULT_LEFT, GREEDY_RIGHT);
            b.advance();
            first.done(b, NAME);
            let second = b.mark();
            second.set_edge_binders(b, GREEDY_LEFT, DEFAULT_RIGHT);
            b.advance();
            second.done(b, NAME);
            root.done(b, ROOT);
        },
        expect![[r#"
            ROOT@0..4
              NAME@0..3
                WORD@0..1 "a"
                WS@1..3 "  "
              NAME@3..4
                WORD@3..4 "b"
        "#]],
    );
}

#[test]
fn binders_set_after_completion() {
    check(
        "a  b",
        |b| {
            let root = b.mark();
            name(b);
            let second = b.mark();
            b.advance();
            let second = second.done(b, NAME);
            second.set_edge_binders(b, GREEDY_LEFT, DEFAULT_RIGHT);
            root.done(b, ROOT);
        },
        expect![[r#"
            ROOT@0..4
              NAME@0..1
                WORD@0..1 "a"
              NAME@1..4
                WS@1..3 "  "
                WORD@3..4 "b"
        "#]],
    );

    let violation = violation("a", |b| {
        let root = b.mark();
        let attempt = b.mark();
        let m = b.mark();
        b.advance();
        let m = m.done(b, NAME);
        attempt.rollback_to(b);
        m.set_edge_binders(b, GREEDY_LEFT, GREEDY_RIGHT);
        advance_all(b);
        root.done(b, ROOT);
    });
    assert!(
        matches!(violation, ProtocolViolation::StaleMarker { state: "rolled back", .. }),
        "{violation}"
    );
}

#[test]
fn lighter_tree_navigation() {
    let classifier = classifier();
    let mut b = Builder::new(lex("a b"), &classifier);
    let root = b.mark();
    name(&mut b);
    let empty = b.mark();
    empty.done(&mut b, LIST);
    b.advance();
    root.done(&mut b, ROOT);
    let parse = b.build_lighter_tree().unwrap();
    let tree = parse.tree();

    let root = tree.root();
    assert_eq!(tree.parent(root), None);
    assert_eq!(tree.node_count(), 3);
    assert_eq!(tree.token_count(), 3);

    let children = tree.children(root).collect::<Vec<_>>();
    let kinds = children.iter().map(|it| it.kind()).collect::<Vec<_>>();
    assert_eq!(kinds, [NAME, WS, LIST, WORD]);
    assert!(children.iter().all(|&child| tree.parent(child) == Some(root)));
    assert!(children[1].is_token());
    assert_eq!(children[2].text_range(), TextRange::empty(TextSize::from(2)));

    let name = tree.first_child(children[0]).unwrap();
    assert_eq!(tree.parent(name), Some(children[0]));
    assert_eq!(tree.element_text(name), "a");
    assert_eq!(tree.next_sibling(name), None);
}

#[test]
fn no_root() {
    assert_eq!(violation("", |_| {}), ProtocolViolation::NoRoot);
}

#[test]
fn multiple_roots() {
    let violation = violation("a b", |b| {
        name(b);
        name(b);
    });
    assert!(matches!(violation, ProtocolViolation::MultipleRoots { .. }), "{violation}");
}

#[test]
fn tokens_outside_the_root() {
    let violation = violation("a b", |b| {
        let root = b.mark();
        b.advance();
        root.done(b, ROOT);
    });
    assert_eq!(violation, ProtocolViolation::TokensOutsideRoot { offset: TextSize::from(2) });
}

#[test]
#[allow(clippy::mem_forget)]
fn unterminated_markers_are_reported_anywhere() {
    for position in 0..=3 {
        let violation = violation("a b c", |b| {
            for _ in 0..position {
                b.advance();
            }
            std::mem::forget(b.mark());
            advance_all(b);
        });
        assert!(
            matches!(violation, ProtocolViolation::Unterminated { site } if site.file().ends_with("tests.rs")),
            "{violation}"
        );
    }
}

#[test]
#[allow(clippy::mem_forget)]
fn unterminated_child_of_a_closed_root() {
    let violation = violation("a", |b| {
        let root = b.mark();
        std::mem::forget(b.mark());
        advance_all(b);
        root.done(b, ROOT);
    });
    assert!(
        matches!(violation, ProtocolViolation::OpenChild { action: "complete", .. }),
        "{violation}"
    );
}

#[test]
fn done_with_an_open_child() {
    let violation = violation("a", |b| {
        let root = b.mark();
        let m = b.mark();
        let child = b.mark();
        b.advance();
        m.done(b, LIST);
        child.done(b, NAME);
        root.done(b, ROOT);
    });
    let ProtocolViolation::OpenChild { site, child, action } = violation else {
        panic!("unexpected violation: {violation}");
    };
    assert_eq!(action, "complete");
    assert_eq!(child.line(), site.line() + 1);
}

#[test]
fn preceding_across_a_closed_marker() {
    let violation = violation("a b c", |b| {
        let root = b.mark();
        let list = b.mark();
        let name = b.mark();
        b.advance();
        let name = name.done(b, NAME);
        b.advance();
        list.done(b, LIST);
        let binary = name.precede(b);
        b.advance();
        binary.done(b, BINARY);
        root.done(b, ROOT);
    });
    let ProtocolViolation::CrossingMarkers { site, other } = violation else {
        panic!("unexpected violation: {violation}");
    };
    assert_eq!(site.line(), other.line() + 6);
}

#[test]
fn crossing_log_is_rejected_before_materializing() {
    use std::panic::Location;

    use crate::log::{Completion, MarkerState, Production, ProductionLog};

    let mut log = ProductionLog::default();
    let root = log.alloc(0, Location::caller());
    let outer = log.alloc(0, Location::caller());
    let inner = log.alloc(0, Location::caller());
    for (id, kind, lexeme) in [(root, ROOT, 2), (outer, LIST, 1), (inner, NAME, 2)] {
        log.marker_mut(id).state = MarkerState::Closed { completion: Completion::Done(kind), lexeme };
    }
    for event in [
        Production::Start(root),
        Production::Start(outer),
        Production::Start(inner),
        Production::Finish(outer),
        Production::Finish(inner),
        Production::Finish(root),
    ] {
        log.push(event);
    }

    let starts = [TextSize::from(0), TextSize::from(1)];
    let violation =
        crate::materialize::validate(&log, &[WORD, WORD], &starts, TokenSet::new([WS])).unwrap_err();
    assert_eq!(
        violation,
        ProtocolViolation::CrossingMarkers {
            site: log.marker(inner).site,
            other: log.marker(outer).site,
        }
    );
}

#[test]
fn rollback_with_an_open_child() {
    let violation = violation("a", |b| {
        let root = b.mark();
        let m = b.mark();
        let child = b.mark();
        b.advance();
        m.rollback_to(b);
        child.done(b, NAME);
        advance_all(b);
        root.done(b, ROOT);
    });
    assert!(
        matches!(violation, ProtocolViolation::OpenChild { action: "roll back", .. }),
        "{violation}"
    );
}

#[test]
fn markers_are_stale_after_rollback() {
    let violation = violation("a", |b| {
        let root = b.mark();
        let attempt = b.mark();
        let m = b.mark();
        b.advance();
        let m = m.done(b, NAME);
        attempt.rollback_to(b);
        m.precede(b).drop(b);
        advance_all(b);
        root.done(b, ROOT);
    });
    assert!(
        matches!(violation, ProtocolViolation::StaleMarker { state: "rolled back", .. }),
        "{violation}"
    );
}

#[test]
fn done_before_legality() {
    let reason = |parse: fn(&mut Builder<'_>)| match violation("a b", parse) {
        ProtocolViolation::InvalidDoneBefore { reason, .. } => reason,
        violation => panic!("unexpected violation: {violation}"),
    };

    let crossing = reason(|b| {
        let root = b.mark();
        let m = b.mark();
        let open = b.mark();
        b.advance();
        let n = b.mark();
        m.done_before(b, LIST, n.id());
        b.advance();
        n.done(b, NAME);
        open.done(b, NAME);
        root.done(b, ROOT);
    });
    assert_eq!(crossing, "a marker between them is still open");

    let earlier = reason(|b| {
        let root = b.mark();
        let n = b.mark();
        let m = b.mark();
        advance_all(b);
        let before = n.id();
        m.done_before(b, NAME, before);
        n.done(b, LIST);
        root.done(b, ROOT);
    });
    assert_eq!(earlier, "`before` starts before this marker");

    let dropped = reason(|b| {
        let root = b.mark();
        let m = b.mark();
        b.advance();
        let n = b.mark();
        let before = n.id();
        n.drop(b);
        m.done_before(b, NAME, before);
        advance_all(b);
        root.done(b, ROOT);
    });
    assert_eq!(dropped, "`before` was dropped or rolled back");

    let itself = reason(|b| {
        let root = b.mark();
        let m = b.mark();
        let before = m.id();
        m.done_before(b, NAME, before);
        advance_all(b);
        root.done(b, ROOT);
    });
    assert_eq!(itself, "a marker cannot end before itself");
}

#[test]
#[should_panic(expected = "Marker must be either completed or abandoned")]
fn forgotten_marker_panics() {
    let classifier = classifier();
    let mut b = Builder::new(lex("a"), &classifier);
    let _marker = b.mark();
}
