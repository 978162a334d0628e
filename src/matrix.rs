//! Transition matrix module.
//!
//! Builds the locally normalized view of a chain: cell `(s1, s2)` is the
//! weight of the link `s1 -> s2` divided by the sum of the weights leaving
//! `s1`. This is a diagnostic and export view; the solver never reads it.

use crate::chain::MarkovChain;
use crate::error::ChainError;
use crate::expression::{Expr, FLOATING_POINT_PRECISION};
use crate::link::Weight;
use crate::numeric::round_f64;
use crate::state::State;
use serde::Serialize;

/// One cell of a transition matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MatrixCell {
    /// Unevaluated factor expression, e.g. `(p)/(p+1-p)`.
    Factor(String),
    /// Evaluated probability, or `0` when no link exists.
    Value(f64),
}

impl MatrixCell {
    /// Numeric value, if the cell has been evaluated.
    pub fn value(&self) -> Option<f64> {
        match self {
            MatrixCell::Value(v) => Some(*v),
            MatrixCell::Factor(_) => None,
        }
    }
}

impl std::fmt::Display for MatrixCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatrixCell::Factor(text) => write!(f, "{}", text),
            MatrixCell::Value(v) => write!(f, "{}", v),
        }
    }
}

/// Square transition matrix, one row and one column per state in
/// canonical order.
///
/// # Examples
///
/// ```rust
/// use zzmarkov::{MarkovChain, MatrixCell};
///
/// let mut chain = MarkovChain::new();
/// chain.add_symbol("p", 0.25).unwrap();
/// chain.add_transition("A", "A", "p");
/// chain.add_transition("A", "B", "1-p");
/// chain.add_transition("B", "A", 2.0);
///
/// let factors = chain.transition_matrix(false).unwrap();
/// assert_eq!(factors.cells[0][1], MatrixCell::Factor("(1-p)/(p+1-p)".to_string()));
///
/// let values = chain.transition_matrix(true).unwrap();
/// assert_eq!(values.cells[0][0], MatrixCell::Value(0.25));
/// assert_eq!(values.cells[1][0], MatrixCell::Value(1.0));
/// assert_eq!(values.cells[1][1], MatrixCell::Value(0.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransitionMatrix {
    /// Row and column order.
    pub states: Vec<State>,

    /// `cells[i][j]` is the normalized weight of `states[i] -> states[j]`.
    pub cells: Vec<Vec<MatrixCell>>,
}

fn is_zero(weight: &Weight) -> bool {
    match weight {
        Weight::Number(n) => *n == 0.0,
        Weight::Expression(text) => {
            matches!(Expr::parse(text), Ok(Expr::Literal(literal)) if literal.parse::<f64>() == Ok(0.0))
        }
    }
}

impl TransitionMatrix {
    /// Build the matrix of `chain`.
    ///
    /// Per ordered pair the earliest link is used. A row's normalizer is
    /// the `+`-joined text of those weights, so with `evaluate = false` the
    /// cells are factor expressions that can be read without symbol values.
    /// With `evaluate = true` every weight is evaluated through the chain's
    /// symbol table and divided by the row total; an unknown symbol or a
    /// zero normalizer is an `Evaluation` error. Weights that are a literal
    /// zero, numeric or textual, are left out of the row.
    pub fn build(chain: &MarkovChain, evaluate: bool) -> Result<Self, ChainError> {
        let states = chain.states();
        let evaluator = chain.evaluator();

        let mut cells = Vec::with_capacity(states.len());
        for tail in &states {
            let weights: Vec<Option<Weight>> = states
                .iter()
                .map(|head| {
                    chain
                        .find_link(tail, head)
                        .map(|link| link.weight)
                        .filter(|w| !is_zero(w))
                })
                .collect();
            let normalizer = weights
                .iter()
                .flatten()
                .map(|w| w.to_string())
                .collect::<Vec<_>>()
                .join("+");

            let row: Vec<MatrixCell> = if evaluate {
                let values = weights
                    .iter()
                    .map(|w| w.as_ref().map(|w| evaluator.evaluate(w)).transpose())
                    .collect::<Result<Vec<_>, _>>()?;
                let total: f64 = values.iter().flatten().sum();
                if total == 0.0 && values.iter().any(Option::is_some) {
                    return Err(ChainError::Evaluation {
                        expression: normalizer,
                        reason: "division by zero".to_string(),
                    });
                }
                values
                    .into_iter()
                    .map(|v| {
                        MatrixCell::Value(v.map_or(0.0, |v| round_f64(v / total, FLOATING_POINT_PRECISION)))
                    })
                    .collect()
            } else {
                weights
                    .iter()
                    .map(|w| match w {
                        None => MatrixCell::Value(0.0),
                        Some(w) => MatrixCell::Factor(format!("({})/({})", w, normalizer)),
                    })
                    .collect()
            };
            cells.push(row);
        }

        Ok(Self { states, cells })
    }

    /// Number of states (rows and columns).
    pub fn size(&self) -> usize {
        self.states.len()
    }

    /// Cell for the pair `(tail, head)`.
    pub fn get(&self, tail: &State, head: &State) -> Option<&MatrixCell> {
        let row = self.states.iter().position(|s| s == tail)?;
        let column = self.states.iter().position(|s| s == head)?;
        Some(&self.cells[row][column])
    }

    /// Sum of row `index`, `None` if the row holds unevaluated factors.
    pub fn row_sum(&self, index: usize) -> Option<f64> {
        self.cells.get(index)?.iter().map(MatrixCell::value).sum()
    }
}

/// CSV rendering: a header of state names, then one row per state.
impl std::fmt::Display for TransitionMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let header: Vec<String> = self.states.iter().map(|s| s.pretty_label()).collect();
        writeln!(f, ",{}", header.join(","))?;
        for (label, row) in header.iter().zip(&self.cells) {
            let row: Vec<String> = row.iter().map(|c| c.to_string()).collect();
            writeln!(f, "{},{}", label, row.join(","))?;
        }
        Ok(())
    }
}
