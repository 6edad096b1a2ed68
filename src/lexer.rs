use crate::error::escape_detail;
use crate::error::ErrorKind;
use crate::error::PatternError;
use crate::UpperBound;

/// The characters that end a literal run and cannot appear unescaped.
pub(crate) const METACHARACTERS: &str = "^$\\.*+?()[]{}|";

/// Largest count a `{}` quantifier may carry, 2^53 − 1.
const MAX_SAFE_COUNT: u64 = (1 << 53) - 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Token<'s> {
    pub origin: &'s str,
    pub offset: usize,
    pub kind: TokenKind<'s>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind<'s> {
    /// A maximal run of characters with no special meaning.
    Literals(&'s str),
    /// A single code point from a hex, named, or identity escape.
    Char(u32),
    /// `\d` or `\D`.
    Digit { negated: bool },
    /// `\w` or `\W`.
    Word { negated: bool },
    Dot,
    Star,
    Plus,
    QuestionMark,
    Pipe,
    /// `(?:`.
    GroupOpen,
    GroupClose,
    /// A `{m}`, `{m,}`, or `{m,n}` quantifier with validated counts.
    Count { min: u64, max: UpperBound },
    /// A `[...]` or `[^...]` literal; `body` excludes the delimiters
    /// and the negation mark.
    Class { negated: bool, body: &'s str },
}

/// Scans a pattern left to right into [`Token`]s, longest applicable
/// match first. Offsets count characters, matching the error contract.
#[derive(Debug, Clone)]
pub(crate) struct Lexer<'s> {
    whole: &'s str,
    rest: &'s str,
    offset: usize,
}

impl<'s> Lexer<'s> {
    pub fn new(input: &'s str) -> Self {
        Self {
            whole: input,
            rest: input,
            offset: 0,
        }
    }

    fn take(&mut self, length: usize) -> &'s str {
        let (taken, rest) = self.rest.split_at(length);
        self.rest = rest;
        self.offset += taken.chars().count();
        taken
    }

    fn single(&mut self, kind: TokenKind<'s>) -> Token<'s> {
        let offset = self.offset;
        let origin = self.take(1);
        Token {
            origin,
            offset,
            kind,
        }
    }

    fn double(&mut self, kind: TokenKind<'s>) -> Token<'s> {
        let offset = self.offset;
        let origin = self.take(2);
        Token {
            origin,
            offset,
            kind,
        }
    }

    fn literals(&mut self) -> Token<'s> {
        let offset = self.offset;
        let end = self
            .rest
            .find(|c| METACHARACTERS.contains(c))
            .unwrap_or(self.rest.len());
        let origin = self.take(end);
        Token {
            origin,
            offset,
            kind: TokenKind::Literals(origin),
        }
    }

    fn unexpected_single(&mut self, detail: Option<&'static str>) -> PatternError {
        let offset = self.offset;
        let origin = self.take(1);
        let error = PatternError::new(
            ErrorKind::Unexpected(origin.to_string()),
            offset,
            1,
            self.whole,
        );
        match detail {
            Some(detail) => error.with_detail(detail),
            None => error,
        }
    }

    fn group_open(&mut self) -> Result<Token<'s>, PatternError> {
        if self.rest.starts_with("(?:") {
            let offset = self.offset;
            let origin = self.take(3);
            Ok(Token {
                origin,
                offset,
                kind: TokenKind::GroupOpen,
            })
        } else {
            Err(self
                .unexpected_single(None)
                .with_detail("all groups must be non-capturing"))
        }
    }

    fn escape(&mut self) -> Result<Token<'s>, PatternError> {
        let offset = self.offset;
        let Some(c) = self.rest[1..].chars().next() else {
            let origin = self.take(1);
            return Err(PatternError::new(
                ErrorKind::Unexpected(origin.to_string()),
                offset,
                1,
                self.whole,
            ));
        };
        match c {
            'd' | 'D' => Ok(self.double(TokenKind::Digit { negated: c == 'D' })),
            'w' | 'W' => Ok(self.double(TokenKind::Word { negated: c == 'W' })),
            'x' => self.hex_escape(2),
            'u' => self.hex_escape(4),
            'n' => Ok(self.double(TokenKind::Char(10))),
            'r' => Ok(self.double(TokenKind::Char(13))),
            't' => Ok(self.double(TokenKind::Char(9))),
            c if METACHARACTERS.contains(c) || c == '/' => {
                Ok(self.double(TokenKind::Char(c as u32)))
            }
            c => {
                let origin = self.take(1 + c.len_utf8());
                let detail = match origin {
                    "\\b" | "\\B" => Some("assertions are not supported"),
                    _ => escape_detail(origin),
                };
                let error = PatternError::new(
                    ErrorKind::Unexpected(origin.to_string()),
                    offset,
                    2,
                    self.whole,
                );
                Err(match detail {
                    Some(detail) => error.with_detail(detail),
                    None => error,
                })
            }
        }
    }

    fn hex_escape(&mut self, digits: usize) -> Result<Token<'s>, PatternError> {
        let offset = self.offset;
        match self.rest.get(2..2 + digits).and_then(hex_value) {
            Some(code) => {
                let origin = self.take(2 + digits);
                Ok(Token {
                    origin,
                    offset,
                    kind: TokenKind::Char(code),
                })
            }
            None => {
                let origin = self.take(2);
                Err(PatternError::new(
                    ErrorKind::Unexpected(origin.to_string()),
                    offset,
                    2,
                    self.whole,
                ))
            }
        }
    }

    fn count(&mut self) -> Result<Token<'s>, PatternError> {
        let offset = self.offset;
        let bytes = self.rest.as_bytes();
        let mut i = 1;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        let min_end = i;
        let mut max_bounds = None;
        if min_end > 1 && i < bytes.len() && bytes[i] == b',' {
            i += 1;
            let max_start = i;
            while i < bytes.len() && bytes[i].is_ascii_digit() {
                i += 1;
            }
            max_bounds = Some((max_start, i));
        }
        if min_end == 1 || i >= bytes.len() || bytes[i] != b'}' {
            return Err(self.malformed_count());
        }

        let origin = self.take(i + 1);
        let min = count_value(&origin[1..min_end], offset + 1, self.whole)?;
        let max = match max_bounds {
            None => UpperBound::Exactly(min),
            Some((start, end)) if start == end => UpperBound::Unbounded,
            Some((start, end)) => {
                UpperBound::Exactly(count_value(&origin[start..end], offset + start, self.whole)?)
            }
        };
        if let UpperBound::Exactly(max) = max {
            if max < min {
                return Err(PatternError::new(
                    ErrorKind::CountsOutOfOrder,
                    offset,
                    origin.len(),
                    self.whole,
                ));
            }
        }
        Ok(Token {
            origin,
            offset,
            kind: TokenKind::Count { min, max },
        })
    }

    fn malformed_count(&mut self) -> PatternError {
        let offset = self.offset;
        let length = match self.rest[1..].find('}') {
            Some(terminator) => self.rest[..terminator + 2].chars().count(),
            None => 1,
        };
        self.take(1);
        PatternError::new(ErrorKind::MalformedCount, offset, length, self.whole)
    }

    fn class(&mut self) -> Result<Token<'s>, PatternError> {
        let offset = self.offset;
        let rest = self.rest;
        let negated = rest.as_bytes().get(1) == Some(&b'^');
        let body_start = if negated { 2 } else { 1 };
        let mut chars = rest
            .get(body_start..)
            .unwrap_or_default()
            .char_indices();
        let body_end = loop {
            match chars.next() {
                Some((at, ']')) => break body_start + at,
                Some((_, '\\')) => {
                    if chars.next().is_none() {
                        return Err(self.unterminated_class());
                    }
                }
                Some(_) => {}
                None => return Err(self.unterminated_class()),
            }
        };
        let origin = self.take(body_end + 1);
        let body = &origin[body_start..body_end];
        Ok(Token {
            origin,
            offset,
            kind: TokenKind::Class { negated, body },
        })
    }

    fn unterminated_class(&mut self) -> PatternError {
        let offset = self.offset;
        let length = self.rest.chars().count();
        self.take(self.rest.len());
        PatternError::new(ErrorKind::UnterminatedClass, offset, length, self.whole)
    }
}

impl<'s> Iterator for Lexer<'s> {
    type Item = Result<Token<'s>, PatternError>;

    fn next(&mut self) -> Option<Self::Item> {
        let c = self.rest.chars().next()?;
        Some(match c {
            '\\' => self.escape(),
            '(' => self.group_open(),
            '{' => self.count(),
            '[' => self.class(),
            ')' => Ok(self.single(TokenKind::GroupClose)),
            '|' => Ok(self.single(TokenKind::Pipe)),
            '*' => Ok(self.single(TokenKind::Star)),
            '+' => Ok(self.single(TokenKind::Plus)),
            '?' => Ok(self.single(TokenKind::QuestionMark)),
            '.' => Ok(self.single(TokenKind::Dot)),
            '^' | '$' => Err(self.unexpected_single(Some("assertions are not supported"))),
            '}' | ']' => Err(self.unexpected_single(None)),
            _ => Ok(self.literals()),
        })
    }
}

fn count_value(text: &str, offset: usize, pattern: &str) -> Result<u64, PatternError> {
    match text.parse::<u64>() {
        Ok(count) if count <= MAX_SAFE_COUNT => Ok(count),
        _ => Err(PatternError::new(
            ErrorKind::CountTooLarge(text.to_string()),
            offset,
            text.len(),
            pattern,
        )),
    }
}

/// Value of an exact-width hex digit run, `None` if any character is
/// not a hex digit.
pub(crate) fn hex_value(text: &str) -> Option<u32> {
    if !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(text, 16).ok()
}
