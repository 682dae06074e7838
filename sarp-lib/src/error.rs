use crate::Dialect;

#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Input does not have the size required by the decode step. This indicates a caller
    /// error rather than bad telemetry.
    #[error("Invalid length: expected {expected}, got {actual}")]
    InvalidLength { actual: usize, expected: usize },

    /// Manchester symbols come in pairs, so an odd count cannot be decoded.
    #[error("Odd number of Manchester symbols: {actual}")]
    OddSymbolCount { actual: usize },

    /// A symbol pair was neither (0,1) nor (1,0).
    #[error("Manchester line code violation at symbol {index}")]
    LineCodeViolation { index: usize },

    /// The field has no decode rule for the dialect.
    #[error("{field} is not supported for {dialect}")]
    UnsupportedDialect {
        dialect: Dialect,
        field: &'static str,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
