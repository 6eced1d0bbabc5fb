//! Path tokenizer.

use std::borrow::Cow;
use std::fmt;
use std::iter::FusedIterator;
use std::ops::Range;

use logos::{Lexer, Logos};

use crate::errors::{PathSyntaxError, PathSyntaxErrorKind};
use crate::syntax::string_literal::unescape_key;

/// Bounds of a `[start:end]` slice. Missing bounds default to the start and
/// end of the array; negative bounds count from the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SliceBounds {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl SliceBounds {
    /// Resolve against an array length into a half-open index range.
    pub fn resolve(&self, len: usize) -> Range<usize> {
        let clamp = |bound: i64| -> usize {
            if bound < 0 {
                (len as i64 + bound).max(0) as usize
            } else {
                (bound as usize).min(len)
            }
        };
        let start = self.start.map_or(0, clamp);
        let end = self.end.map_or(len, clamp);
        start..end.max(start)
    }
}

impl fmt::Display for SliceBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(start) = self.start {
            write!(f, "{}", start)?;
        }
        f.write_str(":")?;
        if let Some(end) = self.end {
            write!(f, "{}", end)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum LexError {
    #[default]
    UnexpectedCharacter,
    InvalidNumber,
    InvalidEscape(String),
}

/// A path token.
///
/// Single dots only separate segments and are skipped, as is whitespace.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexError)]
#[logos(skip r"[ \t\r\n]+|\.")]
pub enum Token {
    #[token("$")]
    Root,

    #[regex(r"\.\.+")]
    RecursiveDescent,

    #[token("*")]
    Wildcard,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,

    #[token(",")]
    Comma,

    #[regex(r"[A-Za-z_][A-Za-z0-9_\-]*", |lex| lex.slice().to_owned())]
    #[regex(r"'(?:[^'\\]|\\.)*'", quoted_key)]
    #[regex(r#""(?:[^"\\]|\\.)*""#, quoted_key)]
    Key(String),

    #[regex(r"-?[0-9]+", parse_index)]
    Index(i64),

    #[regex(r"-?[0-9]*:-?[0-9]*", parse_slice)]
    Slice(SliceBounds),
}

fn quoted_key(lex: &mut Lexer<Token>) -> Result<String, LexError> {
    let slice = lex.slice();
    let body = &slice[1..slice.len() - 1];
    unescape_key(body)
        .map(Cow::into_owned)
        .map_err(|err| LexError::InvalidEscape(err.to_string()))
}

fn parse_index(lex: &mut Lexer<Token>) -> Result<i64, LexError> {
    lex.slice().parse().map_err(|_| LexError::InvalidNumber)
}

fn parse_slice(lex: &mut Lexer<Token>) -> Result<SliceBounds, LexError> {
    let bound = |text: &str| -> Result<Option<i64>, LexError> {
        if text.is_empty() {
            Ok(None)
        } else {
            text.parse().map(Some).map_err(|_| LexError::InvalidNumber)
        }
    };
    let (start, end) = lex
        .slice()
        .split_once(':')
        .ok_or(LexError::UnexpectedCharacter)?;
    Ok(SliceBounds {
        start: bound(start)?,
        end: bound(end)?,
    })
}

impl Token {
    /// Tokens that name a location: keys, indices, slices and `*`.
    pub fn is_name(&self) -> bool {
        matches!(
            self,
            Token::Key(_) | Token::Index(_) | Token::Slice(_) | Token::Wildcard
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Root => f.write_str("'$'"),
            Token::RecursiveDescent => f.write_str("'..'"),
            Token::Wildcard => f.write_str("'*'"),
            Token::BracketOpen => f.write_str("'['"),
            Token::BracketClose => f.write_str("']'"),
            Token::Comma => f.write_str("','"),
            Token::Key(key) => write!(f, "key {:?}", key),
            Token::Index(index) => write!(f, "index {}", index),
            Token::Slice(bounds) => write!(f, "slice '{}'", bounds),
        }
    }
}

/// Lazy token stream over a path string.
///
/// The stream is consumed as it is read; tokenize again with a new
/// `Tokenizer`. After the first error it yields nothing more.
///
/// A name that follows a root, a name or a `]` must be separated from it by
/// a dot, so `$.foo bar` and `$[0]foo` are rejected here.
pub struct Tokenizer<'s> {
    source: &'s str,
    lexer: Lexer<'s, Token>,
    first: bool,
    failed: bool,
    /// End of the previous token.
    end: usize,
    needs_dot: bool,
}

impl<'s> Tokenizer<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            lexer: Token::lexer(source),
            first: true,
            failed: false,
            end: 0,
            needs_dot: false,
        }
    }

    /// Byte range of the most recent token.
    pub fn span(&self) -> Range<usize> {
        self.lexer.span()
    }

    pub fn source(&self) -> &'s str {
        self.source
    }

    /// Whether a dot was skipped between the previous token and `start`.
    fn dotted(&self, start: usize) -> bool {
        self.source[self.end..start].contains('.')
    }

    fn error(&self, kind: PathSyntaxErrorKind, offset: usize) -> PathSyntaxError {
        PathSyntaxError {
            kind,
            path: self.source.to_owned(),
            offset,
        }
    }

    fn describe(&self, err: LexError, span: Range<usize>) -> PathSyntaxErrorKind {
        let text = &self.source[span.clone()];
        match err {
            LexError::InvalidNumber => PathSyntaxErrorKind::InvalidNumber(text.to_owned()),
            LexError::InvalidEscape(message) => PathSyntaxErrorKind::InvalidEscape(message),
            LexError::UnexpectedCharacter => match self.source[span.start..].chars().next() {
                Some('\'' | '"') => PathSyntaxErrorKind::UnterminatedQuote,
                Some(c) => PathSyntaxErrorKind::UnexpectedCharacter(c.to_string()),
                None => PathSyntaxErrorKind::UnexpectedCharacter(text.to_owned()),
            },
        }
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, PathSyntaxError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = self.lexer.next()?;
        let first = std::mem::replace(&mut self.first, false);
        let span = self.lexer.span();
        let kind = match result {
            Ok(Token::Root) if !first => PathSyntaxErrorKind::MisplacedRoot,
            Ok(token) if self.needs_dot && token.is_name() && !self.dotted(span.start) => {
                PathSyntaxErrorKind::UnexpectedToken {
                    expected: "'.' or '['".to_owned(),
                    found: token.to_string(),
                }
            }
            Ok(token) => {
                self.needs_dot = token.is_name() || matches!(token, Token::Root | Token::BracketClose);
                self.end = span.end;
                return Some(Ok(token));
            }
            Err(err) => self.describe(err, span.clone()),
        };
        self.failed = true;
        Some(Err(self.error(kind, span.start)))
    }
}

impl FusedIterator for Tokenizer<'_> {}
