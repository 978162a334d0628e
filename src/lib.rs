//! # zzmarkov - Deterministic Stationary Distributions for Symbolic Markov Chains
//!
//! A solver for the long-run (stationary) occupancy of finite-state Markov
//! chains that provides:
//! - **Deterministic** results (same chain → same equations → same answer)
//! - **Symbolic** weights (`"3*mu"`, `"1-p"`) resolved against a symbol table
//! - **Exact** rational arithmetic first, floating point only on overflow
//! - **Fail-fast** solving: inconsistent or underdetermined systems are errors
//!
//! ## Core Concepts
//!
//! ### Solve Pipeline
//!
//! ```text
//! [MarkovChain] → [BalanceEquation]s + normalization → [LinearSystem] → [StationaryDistribution]
//! ```
//!
//! 1. **States** and weighted **links** are registered on a chain
//! 2. One **balance equation** per state equates outgoing and incoming flow
//! 3. A **normalization** row forces the probabilities to sum to 1
//! 4. The **solver** eliminates the system and rejects non-unique solutions
//!
//! ### Key Features
//!
//! - **Canonical Order**: states are ordered by canonical string everywhere
//! - **Composite States**: integer tuples such as `(2, 1)` for queueing models
//! - **Transition Matrix**: a locally normalized view for export and diagnostics
//! - **Definition Formats**: chain and matrix documents (YAML/JSON), DOT, CSV
//!
//! ## Example
//!
//! ```rust
//! use zzmarkov::*;
//!
//! let mut chain = MarkovChain::new();
//! chain.add_symbol("p", 0.9).unwrap();
//!
//! chain.add_transition("Sunny", "Sunny", "p");
//! chain.add_transition("Sunny", "Rainy", "1-p");
//! chain.add_transition("Rainy", "Sunny", 0.5);
//! chain.add_transition("Rainy", "Rainy", 0.5);
//!
//! let distribution = chain.solve().unwrap();
//! assert_eq!(distribution.fraction("Sunny").unwrap().to_string(), "5/6");
//! assert!((distribution.get("Rainy").unwrap() - 1.0 / 6.0).abs() < 1e-9);
//! ```
//!
//! ## Modules
//!
//! - [`state`] - State identifiers
//! - [`link`] - Weighted transitions
//! - [`symbols`] - Symbol table
//! - [`expression`] - Weight expression evaluator
//! - [`numeric`] - Exact and floating scalar backends
//! - [`chain`] - The Markov chain aggregate
//! - [`equations`] - Balance equation generator
//! - [`solver`] - Linear system solver
//! - [`distribution`] - Solve results
//! - [`matrix`] - Transition matrix builder
//! - [`definition`] - Definition document builders
//! - [`config`] - Solver options
//! - [`error`] - Error types

pub mod chain;
pub mod config;
pub mod definition;
pub mod distribution;
pub mod equations;
pub mod error;
pub mod expression;
pub mod link;
pub mod matrix;
pub mod numeric;
pub mod solver;
pub mod state;
pub mod symbols;

// Re-export main types for convenience
pub use chain::MarkovChain;
pub use config::SolveOptions;
pub use distribution::StationaryDistribution;
pub use error::{ChainError, DefinitionError, UnsolvableKind};
pub use state::{State, StateValue};

// Re-export model and evaluation types
pub use equations::{BalanceEquation, LinearSystem};
pub use expression::Evaluator;
pub use link::{Link, Weight};
pub use symbols::SymbolTable;

// Re-export numeric and output types
pub use definition::DefinitionFormat;
pub use matrix::{MatrixCell, TransitionMatrix};
pub use numeric::{Ratio, Scalar};
