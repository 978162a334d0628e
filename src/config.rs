//! Solver configuration.

use crate::expression::FLOATING_POINT_PRECISION;
use serde::{Deserialize, Serialize};

/// Options controlling how a chain is solved.
///
/// Every field has a default, so a partial document deserializes:
///
/// ```rust
/// use zzmarkov::SolveOptions;
///
/// let options: SolveOptions = serde_json::from_str(r#"{ "exact": false }"#).unwrap();
/// assert!(!options.exact);
/// assert_eq!(options.precision, 12);
/// assert_eq!(options, SolveOptions { exact: false, ..SolveOptions::default() });
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveOptions {
    /// Try exact rational arithmetic before falling back to floats.
    pub exact: bool,

    /// Allowed distance between the sum of probabilities and 1.
    pub tolerance: f64,

    /// Threshold under which a float pivot counts as zero.
    ///
    /// Applied after each row is scaled to a largest entry of one.
    pub pivot_tolerance: f64,

    /// Fractional digits kept when rounding evaluated weights and results.
    pub precision: u32,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            exact: true,
            tolerance: 1e-9,
            pivot_tolerance: 1e-12,
            precision: FLOATING_POINT_PRECISION,
        }
    }
}

impl SolveOptions {
    /// Options that skip the exact backend.
    pub fn floating() -> Self {
        Self {
            exact: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = SolveOptions::default();
        assert!(options.exact);
        assert_eq!(options.tolerance, 1e-9);
        assert_eq!(options.precision, 12);
    }

    #[test]
    fn test_partial_yaml() {
        let options: SolveOptions = serde_yaml::from_str("tolerance: 1.0e-6\n").unwrap();
        assert_eq!(options.tolerance, 1e-6);
        assert!(options.exact);
    }

    #[test]
    fn test_floating() {
        assert!(!SolveOptions::floating().exact);
    }
}
