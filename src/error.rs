use std::fmt;
use thiserror::Error;

/// What went wrong, without the span bookkeeping.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("Nothing to repeat")]
    NothingToRepeat,
    #[error("Count {0} is over 2^53−1")]
    CountTooLarge(String),
    #[error("Numbers out of order in {{}} quantifier")]
    CountsOutOfOrder,
    #[error("Malformed {{}} quantifier")]
    MalformedCount,
    #[error("Unterminated character class")]
    UnterminatedClass,
    #[error("Unterminated group")]
    UnterminatedGroup,
    #[error("Range out of order")]
    RangeOutOfOrder,
    #[error("Range missing start")]
    RangeMissingStart,
    #[error("Range missing end")]
    RangeMissingEnd,
    #[error("Unexpected {0}")]
    Unexpected(String),
}

/// A syntax error carrying the span of the offending construct.
///
/// Offsets and lengths count characters, not bytes, so they line up with
/// the caret diagram produced by [`annotate`](PatternError::annotate).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternError {
    pub(crate) kind: ErrorKind,
    pub(crate) offset: usize,
    pub(crate) length: usize,
    pub(crate) pattern: String,
    pub(crate) detail: Option<&'static str>,
}

impl PatternError {
    pub(crate) fn new(kind: ErrorKind, offset: usize, length: usize, pattern: &str) -> Self {
        Self {
            kind,
            offset,
            length,
            pattern: pattern.to_string(),
            detail: None,
        }
    }

    pub(crate) fn with_detail(mut self, detail: &'static str) -> Self {
        self.detail = Some(detail);
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Character offset into the pattern where the offending span starts.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length of the offending span, in characters.
    pub fn length(&self) -> usize {
        self.length
    }

    /// The pattern that failed to parse.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn detail(&self) -> Option<&'static str> {
        self.detail
    }

    /// Two-line diagram marking the offending span with carets:
    /// the pattern, then `offset` spaces and `length` carets.
    pub fn annotate(&self) -> String {
        format!(
            "{}\n{}{}",
            self.pattern,
            " ".repeat(self.offset),
            "^".repeat(self.length)
        )
    }
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at offset {} in pattern /{}/",
            self.kind, self.offset, self.pattern
        )?;
        if let Some(detail) = self.detail {
            write!(f, " – {detail}")?;
        }
        Ok(())
    }
}

impl std::error::Error for PatternError {}

/// Hint shared by the top-level and in-class escape diagnostics.
pub(crate) fn escape_detail(unexpected: &str) -> Option<&'static str> {
    match unexpected {
        "\\s" | "\\S" => Some("use an explicit set of whitespace characters instead"),
        "\\c" | "\\0" | "\\f" | "\\v" => Some("use a hex escape instead"),
        _ => None,
    }
}
