//! Chain state module.
//!
//! Provides the `State` type, an immutable identifier for a chain state.
//! A state wraps either a string label or a tuple of small integers
//! (composite states such as queue lengths). Equality, hashing and
//! ordering all go through the canonical string, which is computed once
//! and shared through an `Arc<str>`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// The raw value a state was created from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateValue {
    /// A plain string label such as `"Sunny"`.
    Label(String),
    /// A composite state such as `(0, 1)`.
    Tuple(Vec<i64>),
}

impl StateValue {
    /// Canonical string representation.
    ///
    /// Labels render as themselves; tuples render like `(0, 1)`, with a
    /// trailing comma for one-element tuples (`(5,)`).
    pub fn canonical(&self) -> String {
        match self {
            StateValue::Label(label) => label.clone(),
            StateValue::Tuple(items) => match items.as_slice() {
                [single] => format!("({},)", single),
                _ => format!(
                    "({})",
                    items
                        .iter()
                        .map(|i| i.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            },
        }
    }
}

impl From<&str> for StateValue {
    fn from(s: &str) -> Self {
        StateValue::Label(s.to_string())
    }
}

impl From<String> for StateValue {
    fn from(s: String) -> Self {
        StateValue::Label(s)
    }
}

impl From<Vec<i64>> for StateValue {
    fn from(items: Vec<i64>) -> Self {
        StateValue::Tuple(items)
    }
}

impl<const N: usize> From<[i64; N]> for StateValue {
    fn from(items: [i64; N]) -> Self {
        StateValue::Tuple(items.to_vec())
    }
}

/// Immutable identifier of a chain state.
///
/// Two states are equal iff their canonical strings are equal, and states
/// are ordered lexicographically by canonical string. That order is the
/// global state order used by equation generation and every output.
///
/// # Examples
///
/// ```rust
/// use zzmarkov::State;
///
/// let sunny = State::new("Sunny");
/// let queue = State::tuple([0, 1]);
///
/// assert_eq!(sunny.as_str(), "Sunny");
/// assert_eq!(queue.as_str(), "(0, 1)");
/// assert_eq!(queue.pretty_label(), "A0B1");
/// assert!(queue < sunny);
/// ```
#[derive(Debug, Clone)]
pub struct State {
    value: StateValue,
    canonical: Arc<str>,
}

impl State {
    /// Create a state from anything convertible to a `StateValue`.
    pub fn new(value: impl Into<StateValue>) -> Self {
        let value = value.into();
        let canonical = Arc::from(value.canonical());
        Self { value, canonical }
    }

    /// Create a composite state from integer components.
    ///
    /// ```rust
    /// use zzmarkov::State;
    ///
    /// assert_eq!(State::tuple([3, 0]).as_str(), "(3, 0)");
    /// ```
    pub fn tuple(items: impl IntoIterator<Item = i64>) -> Self {
        Self::new(StateValue::Tuple(items.into_iter().collect()))
    }

    /// The raw value this state was created from.
    pub fn value(&self) -> &StateValue {
        &self.value
    }

    /// The canonical string representation.
    pub fn as_str(&self) -> &str {
        &self.canonical
    }

    /// Human-readable label, also used as the solver variable name.
    ///
    /// Tuple components are prefixed by consecutive capital letters:
    /// `(2, 0, 1)` becomes `A2B0C1`.
    ///
    /// ```rust
    /// use zzmarkov::State;
    ///
    /// assert_eq!(State::new("Rainy").pretty_label(), "Rainy");
    /// assert_eq!(State::tuple([2, 0, 1]).pretty_label(), "A2B0C1");
    /// ```
    pub fn pretty_label(&self) -> String {
        match &self.value {
            StateValue::Label(label) => label.clone(),
            StateValue::Tuple(items) => items
                .iter()
                .enumerate()
                .map(|(idx, item)| {
                    let letter = char::from_u32('A' as u32 + idx as u32).unwrap_or('?');
                    format!("{}{}", letter, item)
                })
                .collect(),
        }
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl Serialize for State {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.value.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for State {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = StateValue::deserialize(deserializer)?;
        Ok(State::new(value))
    }
}

impl From<&str> for State {
    fn from(s: &str) -> Self {
        State::new(s)
    }
}

impl From<String> for State {
    fn from(s: String) -> Self {
        State::new(s)
    }
}

impl From<StateValue> for State {
    fn from(value: StateValue) -> Self {
        State::new(value)
    }
}

impl From<Vec<i64>> for State {
    fn from(items: Vec<i64>) -> Self {
        State::new(items)
    }
}

impl<const N: usize> From<[i64; N]> for State {
    fn from(items: [i64; N]) -> Self {
        State::new(items)
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.canonical)
    }
}
