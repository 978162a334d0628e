//! Symbol table for weight expressions.
//!
//! Symbols are named numeric constants (`lambda = 0.3`, `m1 = 5`) that
//! weight expressions refer to. The table is filled while the chain is
//! built and is only read during evaluation.

use crate::error::ChainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whether `name` is a valid symbol identifier.
///
/// Identifiers start with an ASCII letter or underscore and continue with
/// ASCII letters, digits or underscores.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Named numeric constants substitutable into weight expressions.
///
/// # Examples
///
/// ```rust
/// use zzmarkov::SymbolTable;
///
/// let mut symbols = SymbolTable::new();
/// symbols.set("lambda", 0.3).unwrap();
/// symbols.set("mu", 0.5).unwrap();
///
/// assert_eq!(symbols.get("mu"), Some(0.5));
/// assert_eq!(symbols.get("nu"), None);
/// assert!(symbols.set("2x", 1.0).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolTable {
    values: BTreeMap<String, f64>,
}

impl SymbolTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a symbol, replacing any previous value.
    ///
    /// Fails with `ChainError::InvalidSymbol` when the name is not an
    /// identifier or the value is not finite.
    pub fn set(&mut self, name: impl Into<String>, value: f64) -> Result<(), ChainError> {
        let name = name.into();
        if !is_identifier(&name) || !value.is_finite() {
            return Err(ChainError::InvalidSymbol { name, value });
        }
        self.values.insert(name, value);
        Ok(())
    }

    /// Look up a symbol value.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Check if a symbol is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of defined symbols.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate symbols in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
