use pretty_assertions::assert_eq;

use super::lexer::{SliceBounds, Token, Tokenizer};
use crate::errors::{PathSyntaxError, PathSyntaxErrorKind};

fn tokens(source: &str) -> Vec<Token> {
    Tokenizer::new(source)
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| panic!("tokenizing {:?} should succeed: {}", source, e))
}

fn lex_error(source: &str) -> PathSyntaxError {
    match Tokenizer::new(source).find_map(Result::err) {
        Some(err) => err,
        None => panic!("tokenizing {:?} should fail", source),
    }
}

fn key(text: &str) -> Token {
    Token::Key(text.to_string())
}

#[test]
fn test_descent_index_and_quoted_key() {
    assert_eq!(
        tokens("$..foo[33]['a key']"),
        vec![
            Token::Root,
            Token::RecursiveDescent,
            key("foo"),
            Token::BracketOpen,
            Token::Index(33),
            Token::BracketClose,
            Token::BracketOpen,
            key("a key"),
            Token::BracketClose,
        ]
    );
}

#[test]
fn test_dots_separate_and_runs_collapse() {
    assert_eq!(tokens("$.foo.bar"), vec![Token::Root, key("foo"), key("bar")]);
    assert_eq!(
        tokens("a....b"),
        vec![key("a"), Token::RecursiveDescent, key("b")]
    );
}

#[test]
fn test_wildcard_and_bare_numerals() {
    assert_eq!(
        tokens("$.*.0"),
        vec![Token::Root, Token::Wildcard, Token::Index(0)]
    );
    assert_eq!(tokens("items.-1"), vec![key("items"), Token::Index(-1)]);
}

#[test]
fn test_slices_and_unions() {
    assert_eq!(
        tokens("[1:3]"),
        vec![
            Token::BracketOpen,
            Token::Slice(SliceBounds {
                start: Some(1),
                end: Some(3)
            }),
            Token::BracketClose,
        ]
    );
    assert_eq!(
        tokens("[:-2]")[1],
        Token::Slice(SliceBounds {
            start: None,
            end: Some(-2)
        })
    );
    assert_eq!(tokens("[:]")[1], Token::Slice(SliceBounds::default()));
    assert_eq!(
        tokens("['a', \"b\" ,2]"),
        vec![
            Token::BracketOpen,
            key("a"),
            Token::Comma,
            key("b"),
            Token::Comma,
            Token::Index(2),
            Token::BracketClose,
        ]
    );
}

#[test]
fn test_quoted_key_escapes() {
    assert_eq!(tokens(r"['it\'s']")[1], key("it's"));
    assert_eq!(tokens(r#"["tab\there"]"#)[1], key("tab\there"));
    assert_eq!(tokens(r"['é']")[1], key("é"));
    assert_eq!(tokens("['$.*[]']")[1], key("$.*[]"));
}

#[test]
fn test_tokenizer_is_lazy_and_fused() {
    let mut tokenizer = Tokenizer::new("a ! b");
    assert_eq!(tokenizer.next(), Some(Ok(key("a"))));
    assert!(matches!(tokenizer.next(), Some(Err(_))));
    assert_eq!(tokenizer.next(), None);
}

#[test]
fn test_span_tracks_last_token() {
    let mut tokenizer = Tokenizer::new("$.abc[12]");
    tokenizer.next();
    tokenizer.next();
    assert_eq!(tokenizer.span(), 2..5);
    tokenizer.next();
    tokenizer.next();
    assert_eq!(tokenizer.span(), 6..8);
}

#[test]
fn test_malformed_paths() {
    let err = lex_error("$['abc");
    assert_eq!(err.kind, PathSyntaxErrorKind::UnterminatedQuote);
    assert_eq!(err.offset, 2);
    assert_eq!(err.path, "$['abc");

    let err = lex_error("foo.$");
    assert_eq!(err.kind, PathSyntaxErrorKind::MisplacedRoot);
    assert_eq!(err.offset, 4);

    let err = lex_error("foo#");
    assert_eq!(
        err.kind,
        PathSyntaxErrorKind::UnexpectedCharacter("#".to_string())
    );

    let err = lex_error("[99999999999999999999]");
    assert_eq!(
        err.kind,
        PathSyntaxErrorKind::InvalidNumber("99999999999999999999".to_string())
    );

    let err = lex_error(r"['bad\q']");
    assert!(matches!(err.kind, PathSyntaxErrorKind::InvalidEscape(_)));
}

#[test]
fn test_names_need_a_separator() {
    let err = lex_error("$.2nd");
    assert_eq!(
        err.kind,
        PathSyntaxErrorKind::UnexpectedToken {
            expected: "'.' or '['".to_string(),
            found: "key \"nd\"".to_string(),
        }
    );
    assert_eq!(err.offset, 3);

    assert_eq!(lex_error("$.foo bar").offset, 6);
    assert_eq!(lex_error("$.a'b'").offset, 3);
    assert_eq!(lex_error("$[0]foo").offset, 4);
    assert_eq!(lex_error("$foo").offset, 1);

    assert_eq!(tokens("$. foo .bar").len(), 3);
    assert_eq!(tokens("$[0].foo[1]").len(), 8);
    assert_eq!(tokens("$..foo")[2], key("foo"));
}

#[test]
fn test_error_message_carries_path() {
    let err = lex_error("a.$");
    assert_eq!(
        err.to_string(),
        "'$' is only allowed at the start of a path at offset 2 in path 'a.$'"
    );
}
