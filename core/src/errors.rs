//! Typed errors of the path engine and the collaborators.
//!
//! These are the internal currency of the crate. Operations that run under an
//! [`Activation`](crate::activation::Activation) raise them as exceptions whose
//! payload is the error's display text.

use thiserror::Error;

use crate::values::Kind;

/// A malformed path string.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind} at offset {offset} in path '{path}'")]
pub struct PathSyntaxError {
    pub kind: PathSyntaxErrorKind,
    pub path: String,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathSyntaxErrorKind {
    #[error("unexpected character '{0}'")]
    UnexpectedCharacter(String),
    #[error("unterminated quoted key")]
    UnterminatedQuote,
    #[error("{0}")]
    InvalidEscape(String),
    #[error("invalid numeral '{0}'")]
    InvalidNumber(String),
    #[error("'$' is only allowed at the start of a path")]
    MisplacedRoot,
    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: String, found: String },
    #[error("unclosed '['")]
    UnclosedBracket,
    #[error("empty '[]'")]
    EmptyBracket,
}

/// A failure while walking or vivifying a data tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TraversalError {
    #[error("cannot use key '{key}' on a value of kind {kind}")]
    TypeConflict { key: String, kind: Kind },
    #[error("invalid path key {0}: expected a string or non-negative integer")]
    InvalidKey(String),
    #[error("cannot compile a path from {0}")]
    InvalidPath(Kind),
}

/// JSON text that could not be decoded, or a value that cannot be encoded.
#[derive(Debug, Error)]
pub enum JsonError {
    #[error("JSON syntax error at line {line}, column {column}: {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },
    #[error("cannot encode value as JSON: {0}")]
    Encode(String),
}

/// A printf-style template that does not match its arguments.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("missing argument {index} for '%{conversion}'")]
    MissingArgument { index: usize, conversion: char },
    #[error("field width or precision too large in the directive at byte {offset}")]
    FieldTooWide { offset: usize },
    #[error(transparent)]
    Json(#[from] JsonErrorText),
}

/// A [`JsonError`] flattened to text so [`FormatError`] stays `Clone`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{0}")]
pub struct JsonErrorText(pub String);

impl From<JsonError> for FormatError {
    fn from(err: JsonError) -> Self {
        FormatError::Json(JsonErrorText(err.to_string()))
    }
}
