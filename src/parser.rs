use crate::class;
use crate::class::parse_ranges;
use crate::error::ErrorKind;
use crate::error::PatternError;
use crate::lexer::Lexer;
use crate::lexer::Token;
use crate::lexer::TokenKind;
use crate::Alternative;
use crate::Atom;
use crate::CharClass;
use crate::ClassRange;
use crate::Disjunction;
use crate::Quantifier;
use crate::Term;
use crate::UpperBound;
use std::mem;

#[derive(Debug, Clone)]
pub(crate) struct Parser<'s> {
    lexer: Lexer<'s>,
    input: &'s str,
}

/// One nesting level of `(?:`: the tree built so far outside the group
/// and the group's opening offset.
struct Frame {
    disjunction: Disjunction,
    alternative: Alternative,
    offset: usize,
}

impl Parser<'_> {
    pub fn new(input: &str) -> Parser<'_> {
        Parser {
            lexer: Lexer::new(input),
            input,
        }
    }

    pub fn parse(&mut self) -> Result<Disjunction, PatternError> {
        let mut stack: Vec<Frame> = Vec::new();
        let mut disjunction = Disjunction {
            alternatives: Vec::new(),
        };
        let mut alternative = Alternative { terms: Vec::new() };
        // Whether the current alternative's last term is still the one a
        // quantifier may bind to; `|` and `(?:` reset it.
        let mut has_term = false;

        while let Some(token) = self.lexer.next() {
            let token = token?;
            match token.kind {
                TokenKind::Literals(text) => {
                    for c in text.chars() {
                        alternative.terms.push(char_term(c as u32));
                    }
                    has_term = true;
                }
                TokenKind::Char(code) => {
                    alternative.terms.push(char_term(code));
                    has_term = true;
                }
                TokenKind::Dot => {
                    alternative.terms.push(dot_term());
                    has_term = true;
                }
                TokenKind::Digit { negated } => {
                    alternative.terms.push(class_term(negated, &class::DIGIT));
                    has_term = true;
                }
                TokenKind::Word { negated } => {
                    alternative.terms.push(class_term(negated, &class::WORD));
                    has_term = true;
                }
                TokenKind::Class { negated, body } => {
                    let body_offset = token.offset + 1 + usize::from(negated);
                    let ranges = parse_ranges(body, body_offset, self.input)?;
                    alternative.terms.push(Term {
                        atom: Atom::Class(CharClass { negated, ranges }),
                        quantifier: None,
                    });
                    has_term = true;
                }
                TokenKind::Star => {
                    self.quantify(&mut alternative, has_term, 0, UpperBound::Unbounded, &token)?;
                }
                TokenKind::Plus => {
                    self.quantify(&mut alternative, has_term, 1, UpperBound::Unbounded, &token)?;
                }
                TokenKind::QuestionMark => {
                    self.quantify(&mut alternative, has_term, 0, UpperBound::Exactly(1), &token)?;
                }
                TokenKind::Count { min, max } => {
                    self.quantify(&mut alternative, has_term, min, max, &token)?;
                }
                TokenKind::Pipe => {
                    disjunction
                        .alternatives
                        .push(mem::replace(&mut alternative, Alternative { terms: Vec::new() }));
                    has_term = false;
                }
                TokenKind::GroupOpen => {
                    stack.push(Frame {
                        disjunction: mem::replace(
                            &mut disjunction,
                            Disjunction {
                                alternatives: Vec::new(),
                            },
                        ),
                        alternative: mem::replace(&mut alternative, Alternative { terms: Vec::new() }),
                        offset: token.offset,
                    });
                    has_term = false;
                }
                TokenKind::GroupClose => {
                    let Some(frame) = stack.pop() else {
                        return Err(PatternError::new(
                            ErrorKind::Unexpected(")".to_string()),
                            token.offset,
                            1,
                            self.input,
                        ));
                    };
                    disjunction.alternatives.push(alternative);
                    let body = disjunction;
                    disjunction = frame.disjunction;
                    alternative = frame.alternative;
                    alternative.terms.push(Term {
                        atom: Atom::Group(body),
                        quantifier: None,
                    });
                    has_term = true;
                }
            }
        }

        if let Some(frame) = stack.first() {
            return Err(PatternError::new(
                ErrorKind::UnterminatedGroup,
                frame.offset,
                self.input.chars().count() - frame.offset,
                self.input,
            ));
        }

        disjunction.alternatives.push(alternative);
        Ok(disjunction)
    }

    fn quantify(
        &self,
        alternative: &mut Alternative,
        has_term: bool,
        min: u64,
        max: UpperBound,
        token: &Token<'_>,
    ) -> Result<(), PatternError> {
        let term = if has_term {
            alternative.terms.last_mut()
        } else {
            None
        };
        match term {
            Some(term) if term.quantifier.is_none() => {
                term.quantifier = Some(Quantifier { min, max });
                Ok(())
            }
            _ => Err(PatternError::new(
                ErrorKind::NothingToRepeat,
                token.offset,
                token.origin.chars().count(),
                self.input,
            )),
        }
    }
}

fn char_term(code: u32) -> Term {
    Term {
        atom: Atom::Char(code),
        quantifier: None,
    }
}

fn class_term(negated: bool, ranges: &[ClassRange]) -> Term {
    Term {
        atom: Atom::Class(CharClass {
            negated,
            ranges: ranges.to_vec(),
        }),
        quantifier: None,
    }
}

fn dot_term() -> Term {
    class_term(true, &class::LINE_TERMINATORS)
}
