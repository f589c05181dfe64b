//! CNF predicate parser.
//!
//! ```text
//! predicate := clause ( ws+ "and" ws+ clause )*
//! clause    := ws* "(" ws* literal ( ws+ "or" ws+ literal )* ws* ")"
//! literal   := "-"? [_A-Za-z] [_A-Za-z0-9]*
//! ws        := " " | "\t"
//! ```
//!
//! The predicate ends at the first newline or at the end of the input.
//! Variables are numbered from 1 in order of first appearance.

use std::fmt::Write as _;

use loopsat::{Clause, Table, TruthValue};
use thiserror::Error;

/// Longest accepted variable name.
pub const MAX_VARIABLE_LEN: usize = 255;

const HIGHLIGHT: &str = "\x1b[01;41m";
const NORMAL: &str = "\x1b[00;00m";
const BLINK: &str = "\x1b[00;05m";

/// What went wrong while parsing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// Input ended inside a clause or after a connective.
    #[error("expression terminated prematurely")]
    EarlyEof,
    /// A clause did not open with `(`.
    #[error("a clause must start with a '('")]
    LParen,
    /// Whitespace between `-` and its variable.
    #[error("'-' must be adjacent to the variable")]
    NonAdjacentNegation,
    /// A variable started with a character other than `_` or a letter.
    #[error("variable prefix can be '_', ['a'-'z'] or ['A'-'Z']")]
    VariablePrefix,
    /// A variable contained a character other than `_` or alphanumerics.
    #[error("variables consist of alpha numeric characters only")]
    VariableIllegal,
    /// Two literals without `or` between them.
    #[error("literals in a clause must be separated by an \"or\"")]
    NoOr,
    /// `or` not followed by whitespace.
    #[error("literals are separated by an \"or\" surrounded by whitespaces")]
    OrWs,
    /// Two clauses without `and` between them.
    #[error("clauses are separated by an \"and\"")]
    NoAnd,
    /// `and` not followed by whitespace.
    #[error("clauses are separated by an \"and\" surrounded by whitespaces")]
    AndWs,
    /// Something other than whitespace directly after `)`.
    #[error(
        "')' is either end of predicate or is followed by an \"and\" \
         surrounded by white spaces and followed by another clause"
    )]
    RParen,
    /// `or` or `and` used as a variable.
    #[error("\"or\" and \"and\" are reserved words")]
    ReservedWord,
    /// A variable name longer than [`MAX_VARIABLE_LEN`].
    #[error("variable names are at most 255 characters long")]
    VariableTooLong,
}

/// A parse failure and where it happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("{kind}")]
pub struct ParseError {
    /// What went wrong.
    pub kind: ParseErrorKind,
    /// Character offset of the offending character; `None` at end of input.
    pub position: Option<usize>,
}

impl ParseError {
    const fn at(kind: ParseErrorKind, position: usize) -> Self {
        Self {
            kind,
            position: Some(position),
        }
    }

    const fn early_eof() -> Self {
        Self {
            kind: ParseErrorKind::EarlyEof,
            position: None,
        }
    }

    /// Renders the message and the predicate with the offending character
    /// highlighted. A premature end is marked by a blinking cursor.
    #[must_use]
    pub fn render(&self, input: &str) -> String {
        let mut out = format!("parse error: {}\nCNF expression: ", self.kind);
        for (i, c) in input.chars().take_while(|&c| c != '\n').enumerate() {
            let prefix = if Some(i) == self.position {
                HIGHLIGHT
            } else {
                NORMAL
            };
            let _ = write!(out, "{prefix}{c}{NORMAL}");
        }
        if self.kind == ParseErrorKind::EarlyEof {
            let _ = write!(out, "{BLINK}{HIGHLIGHT}_{NORMAL}");
        }
        out
    }
}

/// Variable names by id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VariableRegistry {
    names: Vec<String>,
}

impl VariableRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of `name`, registering it if new.
    pub fn intern(&mut self, name: &str) -> u32 {
        if let Some(at) = self.names.iter().position(|n| n == name) {
            return at as u32 + 1;
        }
        self.names.push(name.to_owned());
        self.names.len() as u32
    }

    /// Name of variable `id`.
    #[must_use]
    pub fn name(&self, id: u32) -> Option<&str> {
        let at = usize::try_from(id).ok()?.checked_sub(1)?;
        self.names.get(at).map(String::as_str)
    }

    /// Number of registered variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// `(id, name)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> + '_ {
        self.names
            .iter()
            .enumerate()
            .map(|(i, n)| (i as u32 + 1, n.as_str()))
    }
}

/// A parsed predicate.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Predicate {
    clauses: Vec<Clause>,
    variables: VariableRegistry,
}

impl Predicate {
    /// Clauses in input order.
    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Variable names.
    #[must_use]
    pub fn variables(&self) -> &VariableRegistry {
        &self.variables
    }

    /// Compiles the clause table.
    ///
    /// # Errors
    ///
    /// Returns the table compiler's error, e.g. when allocation fails.
    pub fn table(&self) -> loopsat::Result<Table> {
        Table::compile(&self.clauses, self.variables.len())
    }
}

/// Parses one predicate.
///
/// # Errors
///
/// Returns the first syntax error, positioned at the offending character.
pub fn parse(input: &str) -> Result<Predicate, ParseError> {
    let mut parser = Parser {
        chars: input.chars().collect(),
        pos: 0,
        predicate: Predicate::default(),
    };
    parser.predicate()?;
    Ok(parser.predicate)
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    predicate: Predicate,
}

const fn is_ws(c: char) -> bool {
    c == ' ' || c == '\t'
}

const fn is_prefix(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

const fn is_variable_char(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

impl Parser {
    /// Next character, or `None` at the end of the predicate.
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied().filter(|&c| c != '\n')
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn eat_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(is_ws) {
            self.pos += 1;
        }
        self.pos != start
    }

    /// Consumes `word` as far as it matches; returns whether it matched fully.
    fn keyword(&mut self, word: &str) -> bool {
        for expected in word.chars() {
            match self.bump() {
                Some(c) if c == expected => {}
                _ => return false,
            }
        }
        true
    }

    fn predicate(&mut self) -> Result<(), ParseError> {
        loop {
            self.clause()?;

            // After ')': end of input, or ws+ "and" ws.
            let eaten = self.eat_ws();
            if self.peek().is_none() {
                return Ok(());
            }
            let at = self.pos;
            if !eaten {
                return Err(ParseError::at(ParseErrorKind::RParen, at));
            }
            if !self.keyword("and") {
                return Err(ParseError::at(ParseErrorKind::NoAnd, at));
            }
            let at = self.pos;
            match self.bump() {
                Some(c) if is_ws(c) => {}
                None => return Err(ParseError::early_eof()),
                Some('(') => return Err(ParseError::at(ParseErrorKind::AndWs, at)),
                Some(_) => return Err(ParseError::at(ParseErrorKind::NoAnd, at)),
            }
        }
    }

    fn clause(&mut self) -> Result<(), ParseError> {
        self.predicate.clauses.push(Clause::new());
        self.eat_ws();
        let at = self.pos;
        match self.bump() {
            Some('(') => {}
            None => return Err(ParseError::early_eof()),
            Some(_) => return Err(ParseError::at(ParseErrorKind::LParen, at)),
        }

        loop {
            self.literal()?;

            self.eat_ws();
            let at = self.pos;
            match self.bump() {
                None => return Err(ParseError::early_eof()),
                Some(')') => return Ok(()),
                Some(_) => self.pos = at,
            }
            if !self.keyword("or") {
                return Err(ParseError::at(ParseErrorKind::NoOr, at));
            }
            let at = self.pos;
            match self.peek() {
                Some(c) if is_ws(c) => {}
                None => return Err(ParseError::early_eof()),
                Some(_) => return Err(ParseError::at(ParseErrorKind::OrWs, at)),
            }
        }
    }

    fn literal(&mut self) -> Result<(), ParseError> {
        self.eat_ws();
        let sign = self.pos;
        let negated = match self.peek() {
            None => return Err(ParseError::early_eof()),
            Some('-') => {
                self.pos += 1;
                true
            }
            Some(_) => false,
        };

        let start = self.pos;
        match self.peek() {
            Some(c) if is_prefix(c) => {}
            None => return Err(ParseError::early_eof()),
            Some(c) if is_ws(c) => {
                return Err(ParseError::at(ParseErrorKind::NonAdjacentNegation, sign))
            }
            Some(_) => return Err(ParseError::at(ParseErrorKind::VariablePrefix, start)),
        }

        while self.peek().is_some_and(is_variable_char) {
            self.pos += 1;
        }
        let name: String = self.chars[start..self.pos].iter().collect();
        match self.peek() {
            None => return Err(ParseError::early_eof()),
            Some(c) if c == ')' || is_ws(c) => {}
            Some(_) => return Err(ParseError::at(ParseErrorKind::VariableIllegal, self.pos)),
        }
        if name.len() > MAX_VARIABLE_LEN {
            return Err(ParseError::at(ParseErrorKind::VariableTooLong, start));
        }
        if name.eq_ignore_ascii_case("or") || name.eq_ignore_ascii_case("and") {
            return Err(ParseError::at(ParseErrorKind::ReservedWord, start));
        }

        let id = self.predicate.variables.intern(&name);
        let value = if negated {
            TruthValue::False
        } else {
            TruthValue::True
        };
        if let Some(clause) = self.predicate.clauses.last_mut() {
            clause.add(id, value);
        }
        Ok(())
    }
}
