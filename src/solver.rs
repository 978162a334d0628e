//! Linear system solver.
//!
//! Solves the balance system produced by `LinearSystem::build` with
//! Gauss-Jordan elimination. The solve pipeline is:
//! 1. Check that pretty labels are unambiguous
//! 2. Build the system in the exact `Ratio` backend, if enabled
//! 3. Eliminate; on overflow fall back to `f64`
//! 4. Classify the system: unique, inconsistent or underdetermined
//! 5. Return per-state probabilities keyed by pretty label

use crate::chain::MarkovChain;
use crate::config::SolveOptions;
use crate::distribution::StationaryDistribution;
use crate::equations::LinearSystem;
use crate::error::{ChainError, UnsolvableKind};
use crate::expression::Evaluator;
use crate::numeric::{Ratio, Scalar};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Outcome of eliminating a system.
#[derive(Debug, Clone, PartialEq)]
pub enum Elimination<S> {
    /// Exactly one solution, one value per variable.
    Unique(Vec<S>),
    /// No solution or infinitely many.
    Unsolvable(UnsolvableKind),
}

/// Eliminate a copy of `system`.
///
/// Returns `None` if an intermediate value cannot be represented in the
/// backend. Inexact backends first scale every row to a largest entry of
/// one, after which entries at or below `pivot_tolerance` count as zero.
/// Exact backends ignore the tolerance.
///
/// # Examples
///
/// ```rust
/// use zzmarkov::equations::LinearSystem;
/// use zzmarkov::solver::{eliminate, Elimination};
///
/// // x + y = 4, x - y = 2, 2x + 2y = 8 (redundant)
/// let system = LinearSystem {
///     variables: vec!["x".to_string(), "y".to_string()],
///     rows: vec![vec![1.0, 1.0], vec![1.0, -1.0], vec![2.0, 2.0]],
///     rhs: vec![4.0, 2.0, 8.0],
/// };
/// assert_eq!(eliminate(&system, 1e-12), Some(Elimination::Unique(vec![3.0, 1.0])));
/// ```
pub fn eliminate<S: Scalar>(system: &LinearSystem<S>, pivot_tolerance: f64) -> Option<Elimination<S>> {
    let n = system.variable_count();
    let mut matrix: Vec<Vec<S>> = Vec::with_capacity(system.equation_count());
    for (row, rhs) in system.rows.iter().zip(&system.rhs) {
        let mut augmented = row.clone();
        augmented.push(*rhs);
        if !S::EXACT {
            let largest = augmented.iter().map(|v| v.magnitude()).fold(0.0_f64, f64::max);
            if largest > 0.0 {
                let factor = S::from_f64(1.0 / largest)?;
                for entry in augmented.iter_mut() {
                    *entry = entry.checked_mul(factor)?;
                }
            }
        }
        matrix.push(augmented);
    }
    let threshold = pivot_tolerance;

    let mut pivot_columns = Vec::new();
    let mut rank = 0;
    for column in 0..n {
        if rank == matrix.len() {
            break;
        }

        // Partial pivoting: largest magnitude in this column
        let pivot = (rank..matrix.len())
            .filter(|&r| !matrix[r][column].is_negligible(threshold))
            .max_by(|&a, &b| {
                matrix[a][column]
                    .magnitude()
                    .total_cmp(&matrix[b][column].magnitude())
            });
        let Some(pivot) = pivot else {
            continue;
        };
        matrix.swap(rank, pivot);

        let pivot_value = matrix[rank][column];
        for entry in matrix[rank].iter_mut() {
            *entry = entry.checked_div(pivot_value)?;
        }

        for r in 0..matrix.len() {
            if r == rank {
                continue;
            }
            let factor = matrix[r][column];
            if factor.is_negligible(0.0) {
                continue;
            }
            for c in 0..=n {
                let delta = factor.checked_mul(matrix[rank][c])?;
                matrix[r][c] = matrix[r][c].checked_sub(delta)?;
            }
        }

        pivot_columns.push(column);
        rank += 1;
    }

    // A remaining row reads 0 = rhs
    if matrix[rank..]
        .iter()
        .any(|row| !row[n].is_negligible(threshold))
    {
        return Some(Elimination::Unsolvable(UnsolvableKind::Inconsistent));
    }
    if rank < n {
        return Some(Elimination::Unsolvable(UnsolvableKind::Underdetermined {
            free_variables: n - rank,
        }));
    }

    let mut solution = vec![S::zero(); n];
    for (row, &column) in pivot_columns.iter().enumerate() {
        solution[column] = matrix[row][n];
    }
    Some(Elimination::Unique(solution))
}

/// Solve `chain` for its stationary distribution.
///
/// Fails fast: an ambiguous label, an unevaluable weight or a system
/// without a unique solution are all errors.
#[tracing::instrument(skip_all, fields(states = chain.state_count(), links = chain.link_count()))]
pub fn solve(chain: &MarkovChain, options: &SolveOptions) -> Result<StationaryDistribution, ChainError> {
    chain.check_labels()?;
    let evaluator = Evaluator::with_precision(chain.symbols(), options.precision);

    if options.exact {
        match solve_in::<Ratio>(chain, &evaluator, options)? {
            Some(distribution) => return Ok(distribution),
            None => warn!("exact arithmetic overflowed, falling back to floating point"),
        }
    }

    solve_in::<f64>(chain, &evaluator, options)?.ok_or_else(|| ChainError::UnsolvableSystem {
        kind: UnsolvableKind::Inconsistent,
        detail: "floating point overflow during elimination".to_string(),
    })
}

fn solve_in<S: Scalar>(
    chain: &MarkovChain,
    evaluator: &Evaluator<'_>,
    options: &SolveOptions,
) -> Result<Option<StationaryDistribution>, ChainError> {
    let Some(system) = LinearSystem::<S>::build(chain, evaluator)? else {
        return Ok(None);
    };
    debug!(
        exact = S::EXACT,
        equations = system.equation_count(),
        unknowns = system.variable_count(),
        "eliminating balance system"
    );

    let values = match eliminate(&system, options.pivot_tolerance) {
        None => return Ok(None),
        Some(Elimination::Unique(values)) => values,
        Some(Elimination::Unsolvable(kind)) => {
            return Err(ChainError::UnsolvableSystem {
                kind,
                detail: format!(
                    "{} equations in {} unknowns; chain has {} weakly connected component(s)",
                    system.equation_count(),
                    system.variable_count(),
                    chain.connected_components()
                ),
            })
        }
    };

    let fractions: Option<BTreeMap<String, Ratio>> = values
        .iter()
        .map(|v| v.to_ratio())
        .collect::<Option<Vec<_>>>()
        .map(|ratios| system.variables.iter().cloned().zip(ratios).collect());
    let probabilities: BTreeMap<String, f64> = system
        .variables
        .into_iter()
        .zip(values)
        .map(|(label, value)| (label, value.to_f64().round_to(options.precision)))
        .collect();

    let distribution = StationaryDistribution::new(probabilities, fractions);
    let total = distribution.total();
    if (total - 1.0).abs() > options.tolerance {
        return Err(ChainError::UnsolvableSystem {
            kind: UnsolvableKind::Inconsistent,
            detail: format!("probabilities sum to {} instead of 1", total),
        });
    }
    debug!(exact = S::EXACT, states = distribution.len(), "solved");
    Ok(Some(distribution))
}
