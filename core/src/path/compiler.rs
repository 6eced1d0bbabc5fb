//! Path compiler: tokens to segment descriptors, cached on the path string.

use std::fmt;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::activation::{Activation, Throws};
use crate::errors::{PathSyntaxError, PathSyntaxErrorKind, TraversalError};
use crate::path::PathKey;
use crate::path::lexer::{SliceBounds, Token, Tokenizer};
use crate::syntax::string_literal::{escape_key, is_bare_key};
use crate::values::{Annex, Value};

/// One step of a compiled path.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// `$`: the data root itself.
    Root,
    /// `..`: every node of the subtree, the subtree root included.
    Descent,
    /// A literal hash key.
    Key(String),
    /// A literal array index.
    Index(usize),
    /// `*`: every key of a hash or index of an array.
    Wildcard,
    /// `[start:end]`
    Slice(SliceBounds),
    /// `[a,b,...]`: each member in order.
    Union(Vec<Segment>),
}

impl Segment {
    /// Literal segments match exactly one location and bind no capture.
    pub fn is_literal(&self) -> bool {
        matches!(self, Segment::Root | Segment::Key(_) | Segment::Index(_))
    }

    fn from_key(key: PathKey) -> Segment {
        match key {
            PathKey::Key(key) => Segment::Key(key),
            PathKey::Index(index) => Segment::Index(index),
        }
    }

    fn from_index(index: i64) -> Segment {
        if index >= 0 {
            Segment::Index(index as usize)
        } else {
            Segment::Slice(SliceBounds {
                start: Some(index),
                end: (index < -1).then_some(index + 1),
            })
        }
    }

    fn write_selector(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => escape_key(f, key),
            Segment::Index(index) => write!(f, "{}", index),
            Segment::Wildcard => f.write_str("*"),
            Segment::Slice(bounds) => write!(f, "{}", bounds),
            Segment::Root | Segment::Descent | Segment::Union(_) => write!(f, "{}", self),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Root => f.write_str("$"),
            Segment::Descent => f.write_str(".."),
            Segment::Key(key) if is_bare_key(key) => write!(f, ".{}", key),
            Segment::Wildcard => f.write_str(".*"),
            Segment::Union(members) => {
                f.write_str("[")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    member.write_selector(f)?;
                }
                f.write_str("]")
            }
            other => {
                f.write_str("[")?;
                other.write_selector(f)?;
                f.write_str("]")
            }
        }
    }
}

/// An immutable, ordered list of segments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompiledPath {
    segments: Vec<Segment>,
}

impl CompiledPath {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Build a literal path from a programmatic key list, bypassing the
    /// grammar. Nested arrays are flattened.
    pub fn from_keys(keys: &Value) -> Result<Self, TraversalError> {
        let segments = PathKey::flatten(keys)?
            .into_iter()
            .map(Segment::from_key)
            .collect();
        Ok(Self { segments })
    }
}

/// Normalized path text.
impl fmt::Display for CompiledPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut after_descent = false;
        for segment in &self.segments {
            match segment {
                Segment::Key(key) if after_descent && is_bare_key(key) => f.write_str(key)?,
                Segment::Wildcard if after_descent => f.write_str("*")?,
                other => write!(f, "{}", other)?,
            }
            after_descent = *segment == Segment::Descent;
        }
        Ok(())
    }
}

/// Compile path text without touching any cache.
pub fn compile_str(path: &str) -> Result<CompiledPath, PathSyntaxError> {
    Parser::new(path).parse()
}

/// Compile `path`, reusing the compiled form cached on a path string.
///
/// A string path is compiled once and the result is attached to the string's
/// shared store, so every handle sharing that store hits the cache until the
/// content is overwritten. Arrays of keys and single integers compile to
/// literal paths and are not cached.
pub fn compile(cx: &mut Activation, path: &Value) -> Throws<Rc<CompiledPath>> {
    match path {
        Value::Str(text) => {
            if let Some(compiled) = text.compiled_path() {
                trace!(path = %text.borrow(), "compiled path cache hit");
                return Ok(compiled);
            }
            let source = text.text();
            let compiled = match compile_str(&source) {
                Ok(compiled) => Rc::new(compiled),
                Err(err) => return Err(cx.throw(err.to_string())),
            };
            debug!(path = %source, segments = compiled.len(), "compiled path");
            text.set_annex(Annex::Path(compiled.clone()));
            Ok(compiled)
        }
        Value::Array(_) | Value::Int(_) => match CompiledPath::from_keys(path) {
            Ok(compiled) => Ok(Rc::new(compiled)),
            Err(err) => Err(cx.throw(err.to_string())),
        },
        other => Err(cx.throw(TraversalError::InvalidPath(other.kind()).to_string())),
    }
}

struct Parser<'s> {
    tokens: Tokenizer<'s>,
}

impl<'s> Parser<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            tokens: Tokenizer::new(source),
        }
    }

    fn next(&mut self) -> Result<Option<(Token, usize)>, PathSyntaxError> {
        match self.tokens.next() {
            Some(Ok(token)) => Ok(Some((token, self.tokens.span().start))),
            Some(Err(err)) => Err(err),
            None => Ok(None),
        }
    }

    fn error(&self, kind: PathSyntaxErrorKind, offset: usize) -> PathSyntaxError {
        PathSyntaxError {
            kind,
            path: self.tokens.source().to_owned(),
            offset,
        }
    }

    fn unexpected(&self, expected: &str, found: &Token, offset: usize) -> PathSyntaxError {
        self.error(
            PathSyntaxErrorKind::UnexpectedToken {
                expected: expected.to_owned(),
                found: found.to_string(),
            },
            offset,
        )
    }

    fn parse(mut self) -> Result<CompiledPath, PathSyntaxError> {
        let mut segments = Vec::new();
        while let Some((token, offset)) = self.next()? {
            let segment = match token {
                Token::Root => Segment::Root,
                Token::RecursiveDescent => Segment::Descent,
                Token::Key(key) => Segment::Key(key),
                Token::Index(index) => Segment::from_index(index),
                Token::Wildcard => Segment::Wildcard,
                Token::BracketOpen => self.bracket(offset)?,
                other => return Err(self.unexpected("a path segment", &other, offset)),
            };
            segments.push(segment);
        }
        Ok(CompiledPath { segments })
    }

    /// Parse the selectors of a bracket after its `[`.
    fn bracket(&mut self, open: usize) -> Result<Segment, PathSyntaxError> {
        let mut members = Vec::new();
        loop {
            let Some((token, offset)) = self.next()? else {
                return Err(self.error(PathSyntaxErrorKind::UnclosedBracket, open));
            };
            let member = match token {
                Token::BracketClose if members.is_empty() => {
                    return Err(self.error(PathSyntaxErrorKind::EmptyBracket, open));
                }
                Token::Key(key) => Segment::Key(key),
                Token::Index(index) => Segment::from_index(index),
                Token::Slice(bounds) => Segment::Slice(bounds),
                Token::Wildcard => Segment::Wildcard,
                other => return Err(self.unexpected("a key, index or slice", &other, offset)),
            };
            members.push(member);

            match self.next()? {
                Some((Token::Comma, _)) => continue,
                Some((Token::BracketClose, _)) => break,
                Some((other, offset)) => return Err(self.unexpected("',' or ']'", &other, offset)),
                None => return Err(self.error(PathSyntaxErrorKind::UnclosedBracket, open)),
            }
        }
        Ok(match members.len() {
            1 => members.remove(0),
            _ => Segment::Union(members),
        })
    }
}
