use crate::error::escape_detail;
use crate::error::ErrorKind;
use crate::error::PatternError;
use crate::lexer::hex_value;
use crate::ClassRange;

pub(crate) const DIGIT: [ClassRange; 1] = [ClassRange {
    start: 0x30,
    end: 0x39,
}];

pub(crate) const NON_DIGIT: [ClassRange; 2] = [
    ClassRange {
        start: 0x00,
        end: 0x2f,
    },
    ClassRange {
        start: 0x3a,
        end: 0xffff,
    },
];

/// Digits, `A`–`Z`, `_`, `a`–`z`.
pub(crate) const WORD: [ClassRange; 4] = [
    ClassRange {
        start: 0x30,
        end: 0x39,
    },
    ClassRange {
        start: 0x41,
        end: 0x5a,
    },
    ClassRange {
        start: 0x5f,
        end: 0x5f,
    },
    ClassRange {
        start: 0x61,
        end: 0x7a,
    },
];

pub(crate) const NON_WORD: [ClassRange; 5] = [
    ClassRange {
        start: 0x00,
        end: 0x2f,
    },
    ClassRange {
        start: 0x3a,
        end: 0x40,
    },
    ClassRange {
        start: 0x5b,
        end: 0x5e,
    },
    ClassRange {
        start: 0x60,
        end: 0x60,
    },
    ClassRange {
        start: 0x7b,
        end: 0xffff,
    },
];

/// LF, CR, line separator, paragraph separator; `.` is their negation.
pub(crate) const LINE_TERMINATORS: [ClassRange; 4] = [
    ClassRange {
        start: 0x0a,
        end: 0x0a,
    },
    ClassRange {
        start: 0x0d,
        end: 0x0d,
    },
    ClassRange {
        start: 0x2028,
        end: 0x2028,
    },
    ClassRange {
        start: 0x2029,
        end: 0x2029,
    },
];

/// Parses the body of a class literal (the text between `[`/`[^` and `]`)
/// into its ordered ranges. `offset` is the character offset of the body
/// within `pattern`, used to anchor error spans.
pub(crate) fn parse_ranges(
    body: &str,
    offset: usize,
    pattern: &str,
) -> Result<Vec<ClassRange>, PatternError> {
    RangeParser {
        rest: body,
        at: 0,
        offset,
        pattern,
        ranges: Vec::new(),
        open: false,
        expect_end: false,
        range_at: 0,
    }
    .parse()
}

/// Scans a class body left to right, keeping at most one open range: the
/// last pushed range can still grow an end point once a `-` arrives.
struct RangeParser<'s> {
    rest: &'s str,
    at: usize,
    offset: usize,
    pattern: &'s str,
    ranges: Vec<ClassRange>,
    open: bool,
    expect_end: bool,
    range_at: usize,
}

impl RangeParser<'_> {
    fn parse(mut self) -> Result<Vec<ClassRange>, PatternError> {
        while let Some(c) = self.rest.chars().next() {
            match c {
                '-' => self.dash()?,
                '\\' => self.escape()?,
                '^' | ']' => return Err(self.unexpected(1)),
                c => {
                    let at = self.at;
                    self.take(c.len_utf8());
                    self.push_character(c as u32, at, 1)?;
                }
            }
        }
        if self.expect_end {
            return Err(self.missing_end(self.at));
        }
        Ok(self.ranges)
    }

    fn take(&mut self, length: usize) {
        let (taken, rest) = self.rest.split_at(length);
        self.rest = rest;
        self.at += taken.chars().count();
    }

    fn dash(&mut self) -> Result<(), PatternError> {
        let at = self.at;
        self.take(1);
        if self.expect_end {
            return Err(self.missing_end(at));
        }
        if !self.open {
            return Err(PatternError::new(
                ErrorKind::RangeMissingStart,
                self.offset + at,
                1,
                self.pattern,
            ));
        }
        self.expect_end = true;
        Ok(())
    }

    fn escape(&mut self) -> Result<(), PatternError> {
        let at = self.at;
        let Some(c) = self.rest[1..].chars().next() else {
            return Err(self.unexpected(1));
        };
        match c {
            'd' | 'D' | 'w' | 'W' => {
                self.take(2);
                if self.expect_end {
                    return Err(self.missing_end(at));
                }
                // A shorthand contributes whole ranges, never a range
                // endpoint, so it also closes the open range.
                self.open = false;
                self.ranges.extend_from_slice(match c {
                    'd' => &DIGIT[..],
                    'D' => &NON_DIGIT[..],
                    'w' => &WORD[..],
                    _ => &NON_WORD[..],
                });
                Ok(())
            }
            'x' => self.hex(2, at),
            'u' => self.hex(4, at),
            'n' | 'r' | 't' => {
                self.take(2);
                let code = match c {
                    'n' => 10,
                    'r' => 13,
                    _ => 9,
                };
                self.push_character(code, at, 2)
            }
            '^' | '\\' | '-' | ']' | '/' | '[' => {
                self.take(2);
                self.push_character(c as u32, at, 2)
            }
            c => Err(self.unexpected(1 + c.len_utf8())),
        }
    }

    fn hex(&mut self, digits: usize, at: usize) -> Result<(), PatternError> {
        match self.rest.get(2..2 + digits).and_then(hex_value) {
            Some(code) => {
                self.take(2 + digits);
                self.push_character(code, at, 2 + digits)
            }
            None => Err(self.unexpected(2)),
        }
    }

    fn push_character(&mut self, code: u32, at: usize, length: usize) -> Result<(), PatternError> {
        if self.expect_end {
            // A `-` only leaves expect_end set while a range is open.
            if let Some(range) = self.ranges.last_mut() {
                if code < range.start {
                    return Err(PatternError::new(
                        ErrorKind::RangeOutOfOrder,
                        self.offset + self.range_at,
                        at + length - self.range_at,
                        self.pattern,
                    ));
                }
                range.end = code;
            }
            self.expect_end = false;
            self.open = false;
        } else {
            self.ranges.push(ClassRange {
                start: code,
                end: code,
            });
            self.range_at = at;
            self.open = true;
        }
        Ok(())
    }

    fn missing_end(&self, at: usize) -> PatternError {
        PatternError::new(
            ErrorKind::RangeMissingEnd,
            self.offset + self.range_at,
            at - self.range_at,
            self.pattern,
        )
    }

    fn unexpected(&mut self, length: usize) -> PatternError {
        let at = self.at;
        let text = &self.rest[..length];
        let error = PatternError::new(
            ErrorKind::Unexpected(text.to_string()),
            self.offset + at,
            1,
            self.pattern,
        );
        let error = match escape_detail(text) {
            Some(detail) => error.with_detail(detail),
            None => error,
        };
        self.take(length);
        error
    }
}
