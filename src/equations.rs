//! Global balance equations.
//!
//! For every state `s`, in canonical order, the generator emits
//!
//! ```text
//! Σ w(L) · π(tail L) over L leaving s  =  Σ w(L) · π(tail L) over L entering s
//! ```
//!
//! and then one normalization row `Σ π = 1`. The balance rows always sum
//! to `0 = 0`, so the system carries one redundant row; removing it is
//! left to the solver.

use crate::chain::MarkovChain;
use crate::error::ChainError;
use crate::expression::Evaluator;
use crate::link::Link;
use crate::numeric::Scalar;
use crate::state::State;
use std::collections::HashMap;

/// Structural balance equation of one state.
///
/// Both sides list links; every term is the link weight times the
/// probability of the link's tail state.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceEquation {
    /// The state this equation balances.
    pub state: State,
    /// Links leaving the state.
    pub outflow: Vec<Link>,
    /// Links entering the state.
    pub inflow: Vec<Link>,
}

fn render_side(links: &[Link]) -> String {
    if links.is_empty() {
        return "0".to_string();
    }
    links
        .iter()
        .map(|link| format!("{}*{}", link.weight, link.tail.pretty_label()))
        .collect::<Vec<_>>()
        .join(" + ")
}

impl std::fmt::Display for BalanceEquation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", render_side(&self.outflow), render_side(&self.inflow))
    }
}

/// Build the balance equation of every state, in canonical order.
///
/// # Examples
///
/// ```rust
/// use zzmarkov::MarkovChain;
///
/// let mut chain = MarkovChain::new();
/// chain.add_transition("A", "B", "lambda");
/// chain.add_transition("B", "A", "mu");
///
/// let equations: Vec<String> = chain.equations().iter().map(|e| e.to_string()).collect();
/// assert_eq!(equations, vec!["lambda*A = mu*B", "mu*B = lambda*A"]);
/// ```
pub fn generate_equations(chain: &MarkovChain) -> Vec<BalanceEquation> {
    chain
        .states()
        .into_iter()
        .map(|state| BalanceEquation {
            outflow: chain.out_links(&state),
            inflow: chain.in_links(&state),
            state,
        })
        .collect()
}

/// Numeric form of the balance system.
///
/// `rows[i] · π = rhs[i]`, with one column per state in canonical order.
/// The last row is the normalization constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearSystem<S> {
    /// Variable names: the pretty label of each state.
    pub variables: Vec<String>,
    /// Coefficient rows.
    pub rows: Vec<Vec<S>>,
    /// Right-hand sides.
    pub rhs: Vec<S>,
}

impl<S: Scalar> LinearSystem<S> {
    /// Evaluate the balance equations of `chain` into a numeric system.
    ///
    /// Returns `Ok(None)` when a weight or a coefficient cannot be
    /// represented in the backend `S`. In an inexact backend a weight that
    /// evaluates to a non-finite value is an `Evaluation` error instead.
    pub fn build(chain: &MarkovChain, evaluator: &Evaluator<'_>) -> Result<Option<Self>, ChainError> {
        let states = chain.states();
        let index: HashMap<&State, usize> = states.iter().enumerate().map(|(i, s)| (s, i)).collect();
        let n = states.len();

        let mut rows = Vec::with_capacity(n + 1);
        for equation in generate_equations(chain) {
            let mut row = vec![S::zero(); n];
            for (links, outgoing) in [(&equation.outflow, true), (&equation.inflow, false)] {
                for link in links {
                    let Some(weight) = evaluator.evaluate_as::<S>(&link.weight)? else {
                        if S::EXACT {
                            return Ok(None);
                        }
                        return Err(ChainError::Evaluation {
                            expression: link.weight.to_string(),
                            reason: "result is not a finite number".to_string(),
                        });
                    };
                    let column = index[&link.tail];
                    let updated = if outgoing {
                        row[column].checked_add(weight)
                    } else {
                        row[column].checked_sub(weight)
                    };
                    let Some(updated) = updated else {
                        return Ok(None);
                    };
                    row[column] = updated;
                }
            }
            rows.push(row);
        }

        rows.push(vec![S::one(); n]);
        let mut rhs = vec![S::zero(); n];
        rhs.push(S::one());

        Ok(Some(Self {
            variables: states.iter().map(|s| s.pretty_label()).collect(),
            rows,
            rhs,
        }))
    }

    /// Number of unknowns.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Number of equations, normalization included.
    pub fn equation_count(&self) -> usize {
        self.rows.len()
    }
}
