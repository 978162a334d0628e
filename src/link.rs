//! Directed weighted transitions.
//!
//! A `Link` goes from a tail state to a head state and carries a `Weight`,
//! which is either a numeric literal or a symbolic expression such as
//! `"3*m1"`. Link identity is the whole `(tail, head, weight)` triple, so
//! two links between the same states with different weights are distinct
//! and both contribute to the balance equations.

use crate::state::State;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Weight of a transition.
///
/// # Examples
///
/// ```rust
/// use zzmarkov::Weight;
///
/// let literal: Weight = 0.5.into();
/// let symbolic: Weight = "1-p".into();
///
/// assert_eq!(literal.to_string(), "0.5");
/// assert_eq!(symbolic.to_string(), "1-p");
/// assert!(symbolic.is_symbolic());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Weight {
    /// A finite numeric literal.
    Number(f64),
    /// An arithmetic expression over named symbols.
    Expression(String),
}

impl Weight {
    /// Whether this weight needs the evaluator to become a number.
    pub fn is_symbolic(&self) -> bool {
        matches!(self, Weight::Expression(_))
    }
}

impl PartialEq for Weight {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Weight::Number(a), Weight::Number(b)) => a.to_bits() == b.to_bits(),
            (Weight::Expression(a), Weight::Expression(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Weight {}

impl Hash for Weight {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Weight::Number(n) => {
                0u8.hash(state);
                n.to_bits().hash(state);
            }
            Weight::Expression(e) => {
                1u8.hash(state);
                e.hash(state);
            }
        }
    }
}

impl From<f64> for Weight {
    fn from(n: f64) -> Self {
        Weight::Number(n)
    }
}

impl From<&str> for Weight {
    fn from(s: &str) -> Self {
        Weight::Expression(s.to_string())
    }
}

impl From<String> for Weight {
    fn from(s: String) -> Self {
        Weight::Expression(s)
    }
}

impl std::fmt::Display for Weight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Weight::Number(n) => write!(f, "{}", n),
            Weight::Expression(e) => write!(f, "{}", e),
        }
    }
}

/// A directed, weighted transition between two states.
///
/// # Examples
///
/// ```rust
/// use zzmarkov::{Link, State};
///
/// let link = Link::new(State::new("Sunny"), State::new("Rainy"), 0.1);
/// assert_eq!(link.to_string(), "(Sunny-{0.1}->Rainy)");
/// assert!(!link.is_self_loop());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Link {
    /// Source state.
    pub tail: State,
    /// Destination state.
    pub head: State,
    /// Transition weight.
    pub weight: Weight,
}

impl Link {
    /// Create a new link.
    pub fn new(tail: State, head: State, weight: impl Into<Weight>) -> Self {
        Self {
            tail,
            head,
            weight: weight.into(),
        }
    }

    /// Whether tail and head are the same state.
    pub fn is_self_loop(&self) -> bool {
        self.tail == self.head
    }
}

impl std::fmt::Display for Link {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}-{{{}}}->{})", self.tail, self.weight, self.head)
    }
}
