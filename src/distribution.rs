//! Stationary distribution module.
//!
//! Contains the `StationaryDistribution` type, the result of solving a
//! chain: one long-run probability per state, keyed by pretty label.

use crate::numeric::Ratio;
use serde::Serialize;
use std::collections::BTreeMap;

/// Long-run occupancy probabilities of a solved chain.
///
/// Read-only once built. Entries are keyed by the pretty label of each
/// state and iterate in label order. When the exact backend produced the
/// result, the unrounded fractions are kept alongside the floats.
///
/// # Examples
///
/// ```rust
/// use zzmarkov::MarkovChain;
///
/// let mut chain = MarkovChain::new();
/// chain.add_transition("Up", "Down", 1.0);
/// chain.add_transition("Down", "Up", 3.0);
///
/// let distribution = chain.solve().unwrap();
/// assert_eq!(distribution.get("Up"), Some(0.75));
/// assert_eq!(distribution.get("Down"), Some(0.25));
/// assert_eq!(distribution.fraction("Up").unwrap().to_string(), "3/4");
/// assert!(distribution.is_exact());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationaryDistribution {
    /// Probability of each state.
    pub probabilities: BTreeMap<String, f64>,

    /// Exact probability of each state, present only for exact solves.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fractions: Option<BTreeMap<String, Ratio>>,
}

impl StationaryDistribution {
    /// Create a distribution from float probabilities and, optionally,
    /// their exact fractions.
    pub fn new(
        probabilities: BTreeMap<String, f64>,
        fractions: Option<BTreeMap<String, Ratio>>,
    ) -> Self {
        Self {
            probabilities,
            fractions,
        }
    }

    /// Probability of the state with the given pretty label.
    pub fn get(&self, label: &str) -> Option<f64> {
        self.probabilities.get(label).copied()
    }

    /// Exact probability of the state with the given pretty label.
    ///
    /// `None` for float solves and for unknown labels.
    pub fn fraction(&self, label: &str) -> Option<Ratio> {
        self.fractions.as_ref()?.get(label).copied()
    }

    /// Whether the exact backend produced this result.
    pub fn is_exact(&self) -> bool {
        self.fractions.is_some()
    }

    /// Number of states.
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    /// Whether the distribution has no states.
    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// Iterate `(label, probability)` pairs in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.probabilities.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Labels in order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.probabilities.keys().map(|k| k.as_str())
    }

    /// Sum of all probabilities.
    pub fn total(&self) -> f64 {
        self.probabilities.values().sum()
    }

    /// Consume into the label → probability map.
    pub fn into_map(self) -> BTreeMap<String, f64> {
        self.probabilities
    }
}

impl std::fmt::Display for StationaryDistribution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (label, probability) in self.iter() {
            writeln!(f, "{}={}", label, probability)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(exact: bool) -> StationaryDistribution {
        let probabilities = BTreeMap::from([("A".to_string(), 0.25), ("B".to_string(), 0.75)]);
        let fractions = exact.then(|| {
            BTreeMap::from([
                ("A".to_string(), Ratio::new(1, 4).unwrap()),
                ("B".to_string(), Ratio::new(3, 4).unwrap()),
            ])
        });
        StationaryDistribution::new(probabilities, fractions)
    }

    #[test]
    fn test_lookup() {
        let d = sample(true);
        assert_eq!(d.get("A"), Some(0.25));
        assert_eq!(d.get("C"), None);
        assert_eq!(d.fraction("B"), Ratio::new(3, 4));
        assert_eq!(d.len(), 2);
        assert_eq!(d.total(), 1.0);
    }

    #[test]
    fn test_float_result_has_no_fractions() {
        let d = sample(false);
        assert!(!d.is_exact());
        assert_eq!(d.fraction("A"), None);
    }

    #[test]
    fn test_labels_in_order() {
        let dist = sample(false);
        let labels: Vec<&str> = dist.labels().collect();
        assert_eq!(labels, vec!["A", "B"]);
    }

    #[test]
    fn test_display() {
        assert_eq!(sample(false).to_string(), "A=0.25\nB=0.75\n");
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&sample(true)).unwrap();
        assert_eq!(
            json,
            r#"{"probabilities":{"A":0.25,"B":0.75},"fractions":{"A":"1/4","B":"3/4"}}"#
        );

        let json = serde_json::to_string(&sample(false)).unwrap();
        assert_eq!(json, r#"{"probabilities":{"A":0.25,"B":0.75}}"#);
    }
}
