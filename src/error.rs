//! Error types for chain construction, evaluation and solving.
//!
//! Everything the core can report is a `ChainError`. Definition builders
//! report `DefinitionError`, which wraps a `ChainError` when a document is
//! well formed but describes an invalid chain.

use thiserror::Error;

/// Why a balance system has no unique solution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsolvableKind {
    /// No assignment satisfies every equation.
    Inconsistent,
    /// Infinitely many assignments satisfy the system.
    Underdetermined {
        /// Number of variables left unconstrained after elimination.
        free_variables: usize,
    },
}

impl std::fmt::Display for UnsolvableKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnsolvableKind::Inconsistent => write!(f, "inconsistent"),
            UnsolvableKind::Underdetermined { free_variables } => {
                write!(f, "underdetermined ({} free variables)", free_variables)
            }
        }
    }
}

/// Errors that can occur while evaluating or solving a Markov chain.
///
/// # Examples
///
/// ```rust
/// use zzmarkov::ChainError;
///
/// let err = ChainError::Evaluation {
///     expression: "2*q".to_string(),
///     reason: "unknown symbol 'q'".to_string(),
/// };
/// assert!(err.to_string().contains("2*q"));
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ChainError {
    /// A weight expression references an undefined symbol or is not
    /// valid arithmetic.
    #[error("Cannot evaluate weight '{expression}': {reason}")]
    Evaluation { expression: String, reason: String },

    /// The balance system has zero or infinitely many solutions.
    #[error("Unsolvable system ({kind}): {detail}")]
    UnsolvableSystem { kind: UnsolvableKind, detail: String },

    /// Two distinct states render to the same pretty label.
    #[error("Ambiguous state label '{label}' shared by {}", .states.join(", "))]
    Configuration { label: String, states: Vec<String> },

    /// A symbol name is not an identifier or its value is not finite.
    #[error("Invalid symbol '{name}' = {value}")]
    InvalidSymbol { name: String, value: f64 },
}

/// Errors raised while building a chain from a definition document.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// The document could not be decoded or violates its schema.
    #[error("Invalid {format} definition: {reason}")]
    Malformed { format: &'static str, reason: String },

    /// No format is registered for the file extension.
    #[error("Unsupported file extension: '{extension}'. Supported: .csv, .dot, .gv, .json, .yaml, .yml")]
    UnsupportedExtension { extension: String },

    /// The format name is not one of the known formats.
    #[error("Unknown format type: '{0}'. Supported: chain, matrix, dot, csv")]
    UnknownFormat(String),

    /// The definition file could not be read.
    #[error("Cannot read definition file: {0}")]
    Io(#[from] std::io::Error),

    /// The document is well formed but describes an invalid chain.
    #[error(transparent)]
    Chain(#[from] ChainError),
}
