//! Result reporting.

use std::io::{self, Write};

use loopsat::Outcome;
use serde::Serialize;

use crate::parser::VariableRegistry;

/// Machine-readable form of an [`Outcome`].
#[derive(Debug, Serialize)]
pub struct Report {
    /// Whether any assignment was found.
    pub satisfiable: bool,
    /// Every assignment, variable name to value.
    pub assignments: Vec<serde_json::Map<String, serde_json::Value>>,
}

impl Report {
    /// Names the values of `outcome` through `variables`.
    #[must_use]
    pub fn new(outcome: &Outcome, variables: &VariableRegistry) -> Self {
        let assignments = outcome
            .assignments()
            .iter()
            .map(|assignment| {
                assignment
                    .values()
                    .iter()
                    .map(|l| {
                        let name = variables.name(l.variable).unwrap_or("unknown").to_owned();
                        (name, serde_json::Value::Bool(l.value.holds()))
                    })
                    .collect()
            })
            .collect();
        Self {
            satisfiable: outcome.is_satisfiable(),
            assignments,
        }
    }
}

/// Writes the human-readable result.
///
/// ```text
/// expression is satisfyable
/// assignment 1: a=TRUE   b=FALSE
/// ```
///
/// # Errors
///
/// Returns the write failure.
pub fn write_text<W: Write>(
    out: &mut W,
    outcome: &Outcome,
    variables: &VariableRegistry,
) -> io::Result<()> {
    let negation = if outcome.is_satisfiable() { "" } else { "not " };
    writeln!(out, "expression is {negation}satisfyable")?;
    for (i, assignment) in outcome.assignments().iter().enumerate() {
        write!(out, "assignment {}: ", i + 1)?;
        for literal in assignment.values() {
            let name = variables.name(literal.variable).unwrap_or("unknown");
            let value = if literal.value.holds() {
                "TRUE"
            } else {
                "FALSE"
            };
            write!(out, "{name}={value:<7}")?;
        }
        writeln!(out)?;
    }
    out.flush()
}

/// Writes the result as one JSON document.
///
/// # Errors
///
/// Returns the serialization or write failure.
pub fn write_json<W: Write>(
    out: &mut W,
    outcome: &Outcome,
    variables: &VariableRegistry,
) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, &Report::new(outcome, variables))?;
    writeln!(out)?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use loopsat::{solve, EngineConfig};

    fn solved(input: &str) -> (Outcome, VariableRegistry) {
        let predicate = parse(input).unwrap();
        let outcome = solve(predicate.table().unwrap(), EngineConfig::default()).unwrap();
        (outcome, predicate.variables().clone())
    }

    #[test]
    fn test_text_for_single_model() {
        let (outcome, variables) = solved("(a or b) and (-a or b) and (a or -b)");
        let mut out = Vec::new();
        write_text(&mut out, &outcome, &variables).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "expression is satisfyable\nassignment 1: a=TRUE   b=TRUE   \n"
        );
    }

    #[test]
    fn test_text_for_unsatisfiable() {
        let (outcome, variables) = solved("(a) and (-a)");
        let mut out = Vec::new();
        write_text(&mut out, &outcome, &variables).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "expression is not satisfyable\n");
    }

    #[test]
    fn test_json_names_every_variable() {
        let (outcome, variables) = solved("(left or right) and (-left or -right)");
        let mut out = Vec::new();
        write_json(&mut out, &outcome, &variables).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["satisfiable"], serde_json::Value::Bool(true));
        let assignments = value["assignments"].as_array().unwrap();
        assert_eq!(assignments.len(), 2);
        for assignment in assignments {
            assert_ne!(assignment["left"], assignment["right"]);
        }
    }
}
