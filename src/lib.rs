mod class;
mod error;
mod lexer;
mod parser;

pub use error::ErrorKind;
pub use error::PatternError;

use parser::Parser;
use std::fmt;
use std::str::FromStr;

/// The branches of a pattern or group, in `|` order. Root of every tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disjunction {
    pub alternatives: Vec<Alternative>,
}

/// One branch: an ordered sequence of terms, possibly empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternative {
    pub terms: Vec<Term>,
}

/// An atom plus the quantifier bound to it; `None` means exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub atom: Atom,
    pub quantifier: Option<Quantifier>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Atom {
    /// A single code point. `u32` rather than `char`: `\uHHHH` may name
    /// a lone surrogate.
    Char(u32),
    Class(CharClass),
    /// The body of a `(?:...)` group.
    Group(Disjunction),
}

/// A possibly negated set of code-point ranges, in source order.
/// Overlapping or duplicate ranges are kept as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharClass {
    pub negated: bool,
    pub ranges: Vec<ClassRange>,
}

/// An inclusive code-point range; `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassRange {
    pub start: u32,
    pub end: u32,
}

/// Inclusive repeat bounds; `min <= max` whenever `max` is bounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantifier {
    pub min: u64,
    pub max: UpperBound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpperBound {
    Exactly(u64),
    Unbounded,
}

/// Parses a pattern into its syntax tree, failing on the first construct
/// outside the supported dialect with an error locating it.
pub fn parse(pattern: &str) -> Result<Disjunction, PatternError> {
    Parser::new(pattern).parse()
}

impl FromStr for Disjunction {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl fmt::Display for Disjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut alternatives = self.alternatives.iter();
        if let Some(first) = alternatives.next() {
            write!(f, "{first}")?;
        }
        for alternative in alternatives {
            write!(f, "|{alternative}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Alternative {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for term in &self.terms {
            write!(f, "{term}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.atom {
            Atom::Char(code) => write_pattern_char(f, *code)?,
            Atom::Class(class) => write!(f, "{class}")?,
            Atom::Group(body) => write!(f, "(?:{body})")?,
        }
        if let Some(quantifier) = self.quantifier {
            write!(f, "{quantifier}")?;
        }
        Ok(())
    }
}

impl fmt::Display for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        if self.negated {
            f.write_str("^")?;
        }
        for range in &self.ranges {
            write_class_char(f, range.start)?;
            if range.end != range.start {
                f.write_str("-")?;
                write_class_char(f, range.end)?;
            }
        }
        f.write_str("]")
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (0, UpperBound::Exactly(1)) => f.write_str("?"),
            (0, UpperBound::Unbounded) => f.write_str("*"),
            (1, UpperBound::Unbounded) => f.write_str("+"),
            (min, UpperBound::Unbounded) => write!(f, "{{{min},}}"),
            (min, UpperBound::Exactly(max)) if min == max => write!(f, "{{{min}}}"),
            (min, UpperBound::Exactly(max)) => write!(f, "{{{min},{max}}}"),
        }
    }
}

fn write_pattern_char(f: &mut fmt::Formatter<'_>, code: u32) -> fmt::Result {
    match code {
        0x0a => return f.write_str(r"\n"),
        0x0d => return f.write_str(r"\r"),
        0x09 => return f.write_str(r"\t"),
        _ => {}
    }
    match char::from_u32(code) {
        Some(c) if lexer::METACHARACTERS.contains(c) => write!(f, "\\{c}"),
        Some(c) => write!(f, "{c}"),
        None => write!(f, "\\u{code:04x}"),
    }
}

fn write_class_char(f: &mut fmt::Formatter<'_>, code: u32) -> fmt::Result {
    match code {
        0x0a => return f.write_str(r"\n"),
        0x0d => return f.write_str(r"\r"),
        0x09 => return f.write_str(r"\t"),
        _ => {}
    }
    match char::from_u32(code) {
        Some(c) if matches!(c, '^' | '\\' | '-' | ']') => write!(f, "\\{c}"),
        Some(c) => write!(f, "{c}"),
        None => write!(f, "\\u{code:04x}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_from_str() {
        let tree: Disjunction = "a|b".parse().expect("pattern must parse");
        assert_eq!(tree, parse("a|b").expect("pattern must parse"));

        let error = "(a)".parse::<Disjunction>().expect_err("must fail");
        assert_eq!(error.offset(), 0);
    }

    #[test_case("", ""; "empty")]
    #[test_case("abc", "abc"; "literals")]
    #[test_case("a|", "a|"; "trailing empty alternative")]
    #[test_case("(?:a|b)*", "(?:a|b)*"; "quantified group")]
    #[test_case("[^ba-c]", "[^ba-c]"; "negated class")]
    #[test_case("a{2,15}", "a{2,15}"; "counted repeat")]
    #[test_case("a{2,}", "a{2,}"; "open repeat")]
    #[test_case("a{2}", "a{2}"; "exact repeat")]
    #[test_case(r"\x41", "A"; "hex escape canonicalizes")]
    #[test_case(r"\.", r"\."; "identity escape")]
    #[test_case(r"a\n", r"a\n"; "named escape")]
    #[test_case("[]", "[]"; "empty class")]
    #[test_case("[^]", "[^]"; "negated empty class")]
    #[test_case(r"[\]a-z]", r"[\]a-z]"; "escaped bracket in class")]
    fn test_display(input: &str, expected: &str) {
        let tree = parse(input).expect("pattern must parse");
        assert_eq!(tree.to_string(), expected);
    }

    #[test]
    fn test_display_dot_as_class() {
        let tree = parse(".").expect("pattern must parse");
        assert_eq!(tree.to_string(), "[^\\n\\r\u{2028}\u{2029}]");
    }

    #[test]
    fn test_display_surrogate_uses_hex() {
        let tree = parse(r"\ud800").expect("pattern must parse");
        assert_eq!(tree.to_string(), r"\ud800");
    }

    #[test_case(""; "empty")]
    #[test_case("abc"; "literals")]
    #[test_case("a|b|"; "alternatives")]
    #[test_case("(?:a|b)*c"; "quantified group")]
    #[test_case("(?:(?:x){2})?"; "nested group")]
    #[test_case("[^ba-c]"; "negated class")]
    #[test_case(r"[\n-\r]"; "control range")]
    #[test_case(r"\d\D\w\W."; "shorthands")]
    #[test_case(r"[\d\w]"; "shorthands in class")]
    #[test_case("a{2,15}b{3}c{4,}d?e*f+"; "quantifier forms")]
    #[test_case(r" \ud800\x00"; "escapes")]
    #[test_case("🦀|é"; "multibyte literals")]
    #[test_case(r"\^\$\\\.\*\+\?\(\)\[\]\{\}\|\/"; "identity escapes")]
    fn test_display_round_trips(input: &str) {
        let tree = parse(input).expect("pattern must parse");
        let reparsed = parse(&tree.to_string()).expect("serialized pattern must parse");
        assert_eq!(reparsed, tree);
    }
}
