//! Chain definition documents.
//!
//! Builds a `MarkovChain` from one of a closed set of text encodings:
//!
//! | Format | Encoding | Shape |
//! |---|---|---|
//! | `chain` | YAML or JSON | `{ chain: [{from, to, value}], symbols }` |
//! | `matrix` | YAML or JSON | `{ states, transitions: {from: {to: value}}, initial, symbols }` |
//! | `dot` | Graphviz text | `A -> B [label=w]` per line |
//! | `csv` | adjacency matrix | header of heads, one row per tail |
//!
//! A format is chosen explicitly or from a file extension. There is no
//! global parser registry; each call owns its state.

use crate::chain::MarkovChain;
use crate::error::DefinitionError;
use crate::link::Weight;
use crate::state::{State, StateValue};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Supported definition formats.
///
/// # Examples
///
/// ```rust
/// use zzmarkov::DefinitionFormat;
///
/// let yaml = "
/// chain:
///   - { from: Sunny, to: Rainy, value: 0.1 }
///   - { from: Sunny, to: Sunny, value: 0.9 }
///   - { from: Rainy, to: Sunny, value: 0.5 }
///   - { from: Rainy, to: Rainy, value: 0.5 }
/// ";
/// let chain = DefinitionFormat::Chain.parse(yaml).unwrap();
/// assert_eq!(chain.state_count(), 2);
/// assert_eq!(chain.link_count(), 4);
///
/// assert_eq!(DefinitionFormat::from_extension("gv").unwrap(), DefinitionFormat::Dot);
/// assert_eq!("matrix".parse::<DefinitionFormat>().unwrap(), DefinitionFormat::Matrix);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionFormat {
    /// Tagged edge list.
    Chain,
    /// Nested transition map with a declared state list.
    Matrix,
    /// DOT edge statements.
    Dot,
    /// CSV adjacency matrix.
    Csv,
}

impl DefinitionFormat {
    /// Every supported format.
    pub const ALL: [DefinitionFormat; 4] = [
        DefinitionFormat::Chain,
        DefinitionFormat::Matrix,
        DefinitionFormat::Dot,
        DefinitionFormat::Csv,
    ];

    /// Format name as accepted by `from_str`.
    pub fn name(self) -> &'static str {
        match self {
            DefinitionFormat::Chain => "chain",
            DefinitionFormat::Matrix => "matrix",
            DefinitionFormat::Dot => "dot",
            DefinitionFormat::Csv => "csv",
        }
    }

    /// Format for a file extension, with or without the leading dot.
    ///
    /// YAML and JSON files map to `Chain`; `Matrix` is never inferred.
    pub fn from_extension(extension: &str) -> Result<Self, DefinitionError> {
        let normalized = extension.trim_start_matches('.').to_ascii_lowercase();
        match normalized.as_str() {
            "yaml" | "yml" | "json" => Ok(DefinitionFormat::Chain),
            "dot" | "gv" => Ok(DefinitionFormat::Dot),
            "csv" => Ok(DefinitionFormat::Csv),
            _ => Err(DefinitionError::UnsupportedExtension {
                extension: format!(".{}", normalized),
            }),
        }
    }

    /// Format for a path, from its extension.
    pub fn from_path(path: &Path) -> Result<Self, DefinitionError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();
        Self::from_extension(extension)
    }

    /// Build a chain from document text.
    pub fn parse(self, content: &str) -> Result<MarkovChain, DefinitionError> {
        let chain = match self {
            DefinitionFormat::Chain => build_chain(decode::<ChainDocument>(content, "chain")?)?,
            DefinitionFormat::Matrix => build_matrix(decode::<MatrixDocument>(content, "matrix")?)?,
            DefinitionFormat::Dot => parse_dot(content)?,
            DefinitionFormat::Csv => parse_csv(content)?,
        };
        debug!(
            format = self.name(),
            states = chain.state_count(),
            links = chain.link_count(),
            "definition loaded"
        );
        Ok(chain)
    }

    /// Read and parse a definition file in this format.
    pub fn load_file(self, path: impl AsRef<Path>) -> Result<MarkovChain, DefinitionError> {
        let content = std::fs::read_to_string(path)?;
        self.parse(&content)
    }
}

impl FromStr for DefinitionFormat {
    type Err = DefinitionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DefinitionError::UnknownFormat(s.to_string()))
    }
}

impl std::fmt::Display for DefinitionFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Load a definition file, picking the format from its extension.
///
/// ```rust,no_run
/// let chain = zzmarkov::definition::load_file("weather.yaml").unwrap();
/// println!("{}", chain.solve().unwrap());
/// ```
pub fn load_file(path: impl AsRef<Path>) -> Result<MarkovChain, DefinitionError> {
    let path = path.as_ref();
    DefinitionFormat::from_path(path)?.load_file(path)
}

fn malformed(format: &'static str, reason: impl Into<String>) -> DefinitionError {
    DefinitionError::Malformed {
        format,
        reason: reason.into(),
    }
}

/// Decode a YAML or JSON document. Text opening with `{` or `[` is JSON.
fn decode<T: DeserializeOwned>(content: &str, format: &'static str) -> Result<T, DefinitionError> {
    let trimmed = content.trim_start();
    if trimmed.is_empty() {
        return Err(malformed(format, "empty definition"));
    }
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        serde_json::from_str(content).map_err(|e| malformed(format, e.to_string()))
    } else {
        serde_yaml::from_str(content).map_err(|e| malformed(format, e.to_string()))
    }
}

/// Symbol value: a number, or a string holding one.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSymbol {
    Number(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct RawEdge {
    from: StateValue,
    to: StateValue,
    value: Weight,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ChainDocument {
    chain: Vec<RawEdge>,
    #[serde(default)]
    symbols: BTreeMap<String, RawSymbol>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MatrixDocument {
    states: Vec<StateValue>,
    transitions: BTreeMap<String, BTreeMap<String, Weight>>,
    #[serde(default)]
    initial: Option<String>,
    #[serde(default)]
    symbols: BTreeMap<String, RawSymbol>,
}

fn add_symbols(
    chain: &mut MarkovChain,
    symbols: BTreeMap<String, RawSymbol>,
    format: &'static str,
) -> Result<(), DefinitionError> {
    for (name, raw) in symbols {
        let value = match raw {
            RawSymbol::Number(n) => n,
            RawSymbol::Text(text) => text.trim().parse::<f64>().map_err(|_| {
                malformed(format, format!("symbol '{}' is not a number: '{}'", name, text))
            })?,
        };
        chain.add_symbol(name, value)?;
    }
    Ok(())
}

fn build_chain(document: ChainDocument) -> Result<MarkovChain, DefinitionError> {
    let mut chain = MarkovChain::new();
    add_symbols(&mut chain, document.symbols, "chain")?;
    for edge in document.chain {
        chain.add_transition(edge.from, edge.to, edge.value);
    }
    Ok(chain)
}

fn build_matrix(document: MatrixDocument) -> Result<MarkovChain, DefinitionError> {
    let mut chain = MarkovChain::new();
    add_symbols(&mut chain, document.symbols, "matrix")?;
    for state in document.states {
        chain.add_state(state);
    }
    if let Some(initial) = &document.initial {
        if !chain.contains_state(&State::new(initial.as_str())) {
            return Err(malformed(
                "matrix",
                format!("initial state '{}' is not a declared state", initial),
            ));
        }
    }
    for (tail, heads) in document.transitions {
        for (head, weight) in heads {
            chain.add_transition(tail.as_str(), head, weight);
        }
    }
    Ok(chain)
}

/// Numeric text becomes a number weight, anything else an expression.
fn weight_from_text(text: &str) -> Weight {
    match text.parse::<f64>() {
        Ok(n) if n.is_finite() => Weight::Number(n),
        _ => Weight::Expression(text.to_string()),
    }
}

fn unquote(text: &str) -> &str {
    let text = text.trim();
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
}

/// Parse one `tail -> head [label=w]` statement.
fn parse_dot_edge(line: &str) -> Option<(String, String, Weight)> {
    let (tail, rest) = line.split_once("->")?;
    let tail = unquote(tail);
    let rest = rest.trim().trim_end_matches(';').trim_end();

    let (head, attributes) = match rest.find('[') {
        Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
        None => (rest, None),
    };
    let head = unquote(head);
    let valid = |name: &str| !name.is_empty() && !name.contains(char::is_whitespace);
    if !valid(tail) || !valid(head) {
        return None;
    }

    let label = attributes.and_then(|attrs| {
        let attrs = attrs.split(']').next()?;
        attrs.split(',').find_map(|attr| {
            let (key, value) = attr.split_once('=')?;
            (key.trim() == "label").then(|| unquote(value).to_string())
        })
    });
    let weight = match label {
        Some(label) if !label.is_empty() => weight_from_text(&label),
        _ => Weight::Number(1.0),
    };
    Some((tail.to_string(), head.to_string(), weight))
}

fn parse_dot(content: &str) -> Result<MarkovChain, DefinitionError> {
    let mut chain = MarkovChain::new();
    let mut edges = 0;
    for line in content.lines() {
        if let Some((tail, head, weight)) = parse_dot_edge(line) {
            chain.add_transition(tail, head, weight);
            edges += 1;
        }
    }
    if edges == 0 {
        return Err(malformed("dot", "no valid edges found"));
    }
    Ok(chain)
}

fn parse_csv(content: &str) -> Result<MarkovChain, DefinitionError> {
    let rows: Vec<Vec<&str>> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split(',').map(str::trim).collect())
        .collect();
    if rows.len() < 2 {
        return Err(malformed("csv", "expected a header row and at least one data row"));
    }

    // Columns stay positional; a blank header cell disables its column
    let heads: Vec<Option<&str>> = rows[0]
        .iter()
        .skip(1)
        .map(|s| Some(*s).filter(|s| !s.is_empty()))
        .collect();
    if heads.iter().all(Option::is_none) {
        return Err(malformed("csv", "no states found in header"));
    }

    let mut chain = MarkovChain::new();
    for head in heads.iter().flatten() {
        chain.add_state(*head);
    }
    for row in &rows[1..] {
        let tail = row[0];
        if tail.is_empty() {
            continue;
        }
        for (head, cell) in heads.iter().zip(&row[1..]) {
            let Some(head) = head else {
                continue;
            };
            if cell.is_empty() || *cell == "0" || *cell == "0.0" {
                continue;
            }
            chain.add_transition(tail, *head, weight_from_text(cell));
        }
    }
    Ok(chain)
}
