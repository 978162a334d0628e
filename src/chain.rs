//! Markov chain aggregate.
//!
//! Provides the `MarkovChain` type, which owns the state registry, the
//! link store and the symbol table. States and links live in a petgraph
//! `DiGraph`: nodes are states, edges are links carrying their weight.
//! Edge indices grow with insertion, which gives links a stable
//! insertion order.

use crate::config::SolveOptions;
use crate::distribution::StationaryDistribution;
use crate::equations::{generate_equations, BalanceEquation};
use crate::error::ChainError;
use crate::expression::Evaluator;
use crate::link::{Link, Weight};
use crate::matrix::TransitionMatrix;
use crate::solver;
use crate::state::State;
use crate::symbols::SymbolTable;
use petgraph::graph::{DiGraph, EdgeReference, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{BTreeMap, HashMap};

/// A finite-state Markov chain with numeric or symbolic weights.
///
/// The chain only grows: states and links can be added but never removed.
///
/// # Examples
///
/// ```rust
/// use zzmarkov::MarkovChain;
///
/// let mut chain = MarkovChain::new();
/// chain.add_transition("Sunny", "Sunny", 0.9);
/// chain.add_transition("Sunny", "Rainy", 0.1);
/// chain.add_transition("Rainy", "Sunny", 0.5);
/// chain.add_transition("Rainy", "Rainy", 0.5);
///
/// let distribution = chain.solve().unwrap();
/// assert!((distribution.get("Sunny").unwrap() - 5.0 / 6.0).abs() < 1e-9);
/// assert!((distribution.get("Rainy").unwrap() - 1.0 / 6.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MarkovChain {
    graph: DiGraph<State, Weight>,
    node_map: HashMap<State, NodeIndex>,
    symbols: SymbolTable,
}

impl MarkovChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a state, returning the canonical `State`.
    ///
    /// Idempotent: adding an equal value again returns the state that is
    /// already registered.
    pub fn add_state(&mut self, value: impl Into<State>) -> State {
        let state = value.into();
        let idx = self.node_index(state);
        self.graph[idx].clone()
    }

    fn node_index(&mut self, state: State) -> NodeIndex {
        if let Some(&idx) = self.node_map.get(&state) {
            idx
        } else {
            let idx = self.graph.add_node(state.clone());
            self.node_map.insert(state, idx);
            idx
        }
    }

    /// Insert a link, registering both endpoints.
    ///
    /// Returns `false` when an identical `(tail, head, weight)` link is
    /// already present. That is not an error.
    pub fn add_link(&mut self, link: Link) -> bool {
        let tail = self.node_index(link.tail);
        let head = self.node_index(link.head);
        let duplicate = self
            .graph
            .edges_connecting(tail, head)
            .any(|edge| edge.weight() == &link.weight);
        if duplicate {
            return false;
        }
        self.graph.add_edge(tail, head, link.weight);
        true
    }

    /// Convenience for `add_link(Link::new(tail, head, weight))`.
    pub fn add_transition(
        &mut self,
        tail: impl Into<State>,
        head: impl Into<State>,
        weight: impl Into<Weight>,
    ) -> bool {
        self.add_link(Link::new(tail.into(), head.into(), weight))
    }

    /// Define or redefine a symbol.
    pub fn add_symbol(&mut self, name: impl Into<String>, value: f64) -> Result<(), ChainError> {
        self.symbols.set(name, value)
    }

    /// Define several symbols; later pairs override earlier ones.
    pub fn add_symbols<I, K>(&mut self, symbols: I) -> Result<(), ChainError>
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        for (name, value) in symbols {
            self.symbols.set(name, value)?;
        }
        Ok(())
    }

    /// The symbol table.
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// An evaluator bound to this chain's symbols.
    pub fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(&self.symbols)
    }

    /// All states in canonical order.
    pub fn states(&self) -> Vec<State> {
        let mut states: Vec<State> = self
            .graph
            .node_indices()
            .map(|idx| self.graph[idx].clone())
            .collect();
        states.sort();
        states
    }

    /// Check if a state is registered.
    pub fn contains_state(&self, state: &State) -> bool {
        self.node_map.contains_key(state)
    }

    /// Number of registered states.
    pub fn state_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of stored links.
    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All links in insertion order.
    pub fn links(&self) -> Vec<Link> {
        self.graph
            .edge_references()
            .map(|edge| self.to_link(edge))
            .collect()
    }

    /// All links leaving `state`, in insertion order.
    pub fn out_links(&self, state: &State) -> Vec<Link> {
        self.directed_links(state, Direction::Outgoing)
    }

    /// All links entering `state`, in insertion order.
    pub fn in_links(&self, state: &State) -> Vec<Link> {
        self.directed_links(state, Direction::Incoming)
    }

    fn directed_links(&self, state: &State, direction: Direction) -> Vec<Link> {
        let Some(&idx) = self.node_map.get(state) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self.graph.edges_directed(idx, direction).collect();
        edges.sort_by_key(|edge| edge.id());
        edges.into_iter().map(|edge| self.to_link(edge)).collect()
    }

    /// The earliest inserted link from `tail` to `head`.
    ///
    /// When several links share the same endpoints with different weights
    /// this is only one of them; `out_links` and `in_links` see them all.
    pub fn find_link(&self, tail: &State, head: &State) -> Option<Link> {
        let (&t, &h) = (self.node_map.get(tail)?, self.node_map.get(head)?);
        self.graph
            .edges_connecting(t, h)
            .min_by_key(|edge| edge.id())
            .map(|edge| self.to_link(edge))
    }

    fn to_link(&self, edge: EdgeReference<'_, Weight>) -> Link {
        Link {
            tail: self.graph[edge.source()].clone(),
            head: self.graph[edge.target()].clone(),
            weight: edge.weight().clone(),
        }
    }

    /// Number of weakly connected components of the chain graph.
    pub fn connected_components(&self) -> usize {
        petgraph::algo::connected_components(&self.graph)
    }

    /// Verify that pretty labels identify states uniquely.
    ///
    /// Fails with `ChainError::Configuration` naming the first ambiguous
    /// label in label order.
    pub fn check_labels(&self) -> Result<(), ChainError> {
        let mut by_label: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for state in self.states() {
            by_label
                .entry(state.pretty_label())
                .or_default()
                .push(state.to_string());
        }
        match by_label.into_iter().find(|(_, states)| states.len() > 1) {
            Some((label, states)) => Err(ChainError::Configuration { label, states }),
            None => Ok(()),
        }
    }

    /// One balance equation per state, in canonical order.
    pub fn equations(&self) -> Vec<BalanceEquation> {
        generate_equations(self)
    }

    /// Solve for the stationary distribution with default options.
    pub fn solve(&self) -> Result<StationaryDistribution, ChainError> {
        self.solve_with(&SolveOptions::default())
    }

    /// Solve for the stationary distribution.
    pub fn solve_with(&self, options: &SolveOptions) -> Result<StationaryDistribution, ChainError> {
        solver::solve(self, options)
    }

    /// Locally normalized transition matrix.
    ///
    /// With `evaluate = false` cells hold factor expressions such as
    /// `(p)/(p+1-p)`; with `evaluate = true` they hold floats.
    pub fn transition_matrix(&self, evaluate: bool) -> Result<TransitionMatrix, ChainError> {
        TransitionMatrix::build(self, evaluate)
    }
}

impl std::fmt::Display for MarkovChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let states: Vec<String> = self.states().iter().map(|s| s.to_string()).collect();
        let mut links: Vec<Link> = self.links();
        links.sort_by(|a, b| (&a.tail, &a.head).cmp(&(&b.tail, &b.head)));
        let links: Vec<String> = links.iter().map(|l| l.to_string()).collect();
        let symbols: Vec<String> = self
            .symbols
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect();
        writeln!(f, "States: [{}]", states.join(", "))?;
        writeln!(f, "Links: [{}]", links.join(", "))?;
        writeln!(f, "Symbols: {{{}}}", symbols.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_state_is_idempotent() {
        let mut chain = MarkovChain::new();
        let s1 = chain.add_state("A");
        let s2 = chain.add_state("A");
        assert_eq!(s1, s2);
        assert_eq!(chain.state_count(), 1);
    }

    #[test]
    fn test_states_sorted_regardless_of_insertion() {
        let mut chain = MarkovChain::new();
        chain.add_state("B");
        chain.add_state("A");
        chain.add_state("C");
        let labels: Vec<String> = chain.states().iter().map(|s| s.to_string()).collect();
        assert_eq!(labels, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_duplicate_link_is_ignored() {
        let mut chain = MarkovChain::new();
        let a = chain.add_state("A");
        let b = chain.add_state("B");

        assert!(chain.add_link(Link::new(a.clone(), b.clone(), "l1")));
        assert!(!chain.add_link(Link::new(a.clone(), b.clone(), "l1")));
        assert_eq!(chain.link_count(), 1);

        // Same endpoints, different weight: a distinct link
        assert!(chain.add_link(Link::new(a.clone(), b.clone(), "l2")));
        assert_eq!(chain.link_count(), 2);
    }

    #[test]
    fn test_add_link_registers_endpoints() {
        let mut chain = MarkovChain::new();
        chain.add_transition("X", "Y", 1.0);
        assert!(chain.contains_state(&State::new("X")));
        assert!(chain.contains_state(&State::new("Y")));
    }

    #[test]
    fn test_in_and_out_links() {
        let mut chain = MarkovChain::new();
        chain.add_transition("A", "B", "l1");
        chain.add_transition("A", "B", "l2");
        chain.add_transition("B", "A", "mu");
        chain.add_transition("A", "A", 0.5);

        let a = State::new("A");
        let b = State::new("B");

        let out_a = chain.out_links(&a);
        assert_eq!(out_a.len(), 3);
        assert_eq!(out_a[0].weight, Weight::from("l1"));
        assert_eq!(out_a[1].weight, Weight::from("l2"));
        assert_eq!(out_a[2].weight, Weight::Number(0.5));

        assert_eq!(chain.in_links(&b).len(), 2);
        assert_eq!(chain.in_links(&a).len(), 2);
        assert!(chain.out_links(&State::new("missing")).is_empty());
    }

    #[test]
    fn test_find_link_returns_earliest() {
        let mut chain = MarkovChain::new();
        chain.add_transition("A", "B", "l1");
        chain.add_transition("A", "B", "l2");

        let link = chain.find_link(&State::new("A"), &State::new("B")).unwrap();
        assert_eq!(link.weight, Weight::from("l1"));
        assert!(chain.find_link(&State::new("B"), &State::new("A")).is_none());
    }

    #[test]
    fn test_connected_components() {
        let mut chain = MarkovChain::new();
        chain.add_transition("A", "B", 1.0);
        chain.add_transition("C", "D", 1.0);
        assert_eq!(chain.connected_components(), 2);
        chain.add_transition("B", "C", 1.0);
        assert_eq!(chain.connected_components(), 1);
    }

    #[test]
    fn test_check_labels_detects_ambiguity() {
        let mut chain = MarkovChain::new();
        chain.add_state(State::tuple([0, 1]));
        chain.add_state("A0B1");
        match chain.check_labels() {
            Err(ChainError::Configuration { label, states }) => {
                assert_eq!(label, "A0B1");
                assert_eq!(states.len(), 2);
            }
            other => panic!("Expected Configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_symbols() {
        let mut chain = MarkovChain::new();
        chain.add_symbols([("p", 0.9), ("q", 0.8)]).unwrap();
        chain.add_symbol("p", 0.7).unwrap();
        assert_eq!(chain.symbols().get("p"), Some(0.7));
        assert!(chain.add_symbol("bad name", 1.0).is_err());
    }

    #[test]
    fn test_display() {
        let mut chain = MarkovChain::new();
        chain.add_transition("B", "A", 0.5);
        chain.add_symbol("p", 0.9).unwrap();
        let text = chain.to_string();
        assert!(text.contains("States: [A, B]"));
        assert!(text.contains("(B-{0.5}->A)"));
        assert!(text.contains("p=0.9"));
    }
}
