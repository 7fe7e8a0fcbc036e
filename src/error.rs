//! The error taxonomy: model errors, runtime warnings, unimplemented-
//! feature diagnostics, and fatal errors. Model errors and the
//! unimplemented-feature class are non-fatal — callers log and skip the
//! offending production/condition/action — so they flow through this
//! small domain enum rather than `anyhow`, which is reserved for the
//! CLI/loader boundary where failure really does abort.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    /// A condition or action referenced a buffer the buffer table
    /// doesn't know about.
    UnknownBuffer(String),
    /// A production's shape couldn't be parsed (non-symbol where a
    /// symbol was required, malformed clause, etc).
    MalformedProduction(String),
    /// A condition whose modifier or shape isn't supported by the
    /// matcher (e.g. `BUFFER-QUERY`, an unknown slot modifier).
    UnsupportedCondition(String),
    /// An RHS action the interpreter doesn't implement (`!eval!`).
    UnsupportedAction(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::UnknownBuffer(name) => write!(f, "unknown buffer: {name}"),
            ModelError::MalformedProduction(msg) => write!(f, "malformed production: {msg}"),
            ModelError::UnsupportedCondition(msg) => write!(f, "unsupported condition: {msg}"),
            ModelError::UnsupportedAction(msg) => write!(f, "unsupported action: {msg}"),
        }
    }
}

impl std::error::Error for ModelError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_with_context() {
        let e = ModelError::UnknownBuffer("MANUAL".into());
        assert_eq!(e.to_string(), "unknown buffer: MANUAL");
    }
}
