//! A network of populations.
//!
//! Nodes are [`Population`]s keyed by their unique name and kept in insertion
//! order, which is also the order in which [`Network::step`] updates them.
//! Edges are ordered `(from, to)` name pairs. In a bidirectional network every
//! edit is mirrored, so an edge and its reverse are always present together.
//! No node is ever connected to itself.
//!
//! Populations do not exchange people along edges; the edge set describes
//! connectivity for reporting and visualisation.

use indexmap::{IndexMap, IndexSet};
use log::{debug, trace};
use rand::Rng;

use crate::disease::Disease;
use crate::error::EpiError;
use crate::population::{Population, Transitions};

#[derive(Debug, Clone)]
pub struct Network {
    nodes: IndexMap<String, Population>,
    edges: IndexSet<(String, String)>,
    bidirectional: bool,
}

impl Default for Network {
    fn default() -> Self {
        Network::new(true)
    }
}

impl Network {
    #[must_use]
    pub fn new(bidirectional: bool) -> Self {
        Network {
            nodes: IndexMap::new(),
            edges: IndexSet::new(),
            bidirectional,
        }
    }

    #[must_use]
    pub fn is_bidirectional(&self) -> bool {
        self.bidirectional
    }

    /// Adds a population as a new node.
    ///
    /// # Errors
    ///
    /// Returns [`EpiError::DuplicateNodeError`] if a node with the same name
    /// exists. The network is unchanged in that case.
    pub fn add_node(&mut self, population: Population) -> Result<(), EpiError> {
        if self.nodes.contains_key(population.name()) {
            return Err(EpiError::DuplicateNodeError(population.name().to_string()));
        }
        trace!("adding node {}", population.name());
        self.nodes.insert(population.name().to_string(), population);
        Ok(())
    }

    #[must_use]
    pub fn contains_node(&self, name: &str) -> bool {
        self.nodes.contains_key(name)
    }

    #[must_use]
    pub fn node(&self, name: &str) -> Option<&Population> {
        self.nodes.get(name)
    }

    #[must_use]
    pub fn node_mut(&mut self, name: &str) -> Option<&mut Population> {
        self.nodes.get_mut(name)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Population> {
        self.nodes.values()
    }

    pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Population> {
        self.nodes.values_mut()
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Replaces the edge set with a random one.
    ///
    /// In a bidirectional network every unordered pair of distinct nodes is
    /// connected (both directions at once) with probability
    /// `connection_probability`. In a directed network every ordered pair is
    /// sampled on its own. Probabilities at or below zero produce no edges and
    /// at or above one produce every edge.
    ///
    /// Returns the number of directed edges in the new set.
    pub fn generate_edges<R: Rng + ?Sized>(
        &mut self,
        connection_probability: f64,
        rng: &mut R,
    ) -> usize {
        self.edges.clear();
        let names: Vec<String> = self.nodes.keys().cloned().collect();
        for (i, from) in names.iter().enumerate() {
            for (j, to) in names.iter().enumerate() {
                if i == j || (self.bidirectional && j < i) {
                    continue;
                }
                if rng.random::<f64>() < connection_probability {
                    self.insert_edge(from, to);
                }
            }
        }
        debug!(
            "generated {} edges over {} nodes (p = {})",
            self.edges.len(),
            names.len(),
            connection_probability
        );
        self.edges.len()
    }

    /// Connects `from` to `to`, and `to` to `from` in a bidirectional network.
    /// Returns `false` if the edge was already present.
    ///
    /// # Errors
    ///
    /// Returns [`EpiError::SelfLoopError`] if `from == to` and
    /// [`EpiError::UnknownNodeError`] if either node does not exist.
    pub fn add_edge(&mut self, from: &str, to: &str) -> Result<bool, EpiError> {
        if from == to {
            return Err(EpiError::SelfLoopError(from.to_string()));
        }
        for name in [from, to] {
            if !self.nodes.contains_key(name) {
                return Err(EpiError::UnknownNodeError(name.to_string()));
            }
        }
        Ok(self.insert_edge(from, to))
    }

    fn insert_edge(&mut self, from: &str, to: &str) -> bool {
        let inserted = self.edges.insert((from.to_string(), to.to_string()));
        if self.bidirectional {
            self.edges.insert((to.to_string(), from.to_string()));
        }
        inserted
    }

    /// Disconnects `from` from `to`, and the reverse in a bidirectional
    /// network. Removing an edge that does not exist does nothing. Returns
    /// whether anything was removed.
    pub fn remove_edge(&mut self, from: &str, to: &str) -> bool {
        let mut removed = self
            .edges
            .shift_remove(&(from.to_string(), to.to_string()));
        if self.bidirectional {
            removed |= self
                .edges
                .shift_remove(&(to.to_string(), from.to_string()));
        }
        removed
    }

    #[must_use]
    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        self.edges.contains(&(from.to_string(), to.to_string()))
    }

    /// Directed edges in the order they were added.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges
            .iter()
            .map(|(from, to)| (from.as_str(), to.as_str()))
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Nodes reachable from `name` over one outgoing edge.
    pub fn neighbors<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.edges
            .iter()
            .filter(move |(from, _)| from == name)
            .map(|(_, to)| to.as_str())
    }

    /// Advances `disease` by one tick on every node and returns the moves
    /// summed over the network.
    ///
    /// Every node uses the disease's rates as they were at the start of the
    /// tick, so the resulting counts do not depend on node order. Research is
    /// added node by node in insertion order; a cure reached during this tick
    /// applies from the next one.
    pub fn step(&mut self, disease: &mut Disease) -> Transitions {
        self.step_with(disease, |_, _| {})
    }

    /// Like [`Network::step`], calling `observer` after each node's update.
    pub fn step_with<F>(&mut self, disease: &mut Disease, mut observer: F) -> Transitions
    where
        F: FnMut(&Population, &Transitions),
    {
        let mut total = Transitions {
            research_progress: disease.research_progress(),
            ..Transitions::default()
        };
        let rates = disease.rates();
        for population in self.nodes.values_mut() {
            let rate_function = population.rate_function();
            let transitions = population.update_status_with_rates(disease, &rates, rate_function);
            observer(population, &transitions);
            total.absorb(&transitions);
        }
        total
    }

    /// `(dead + infected) / total` of one node for `disease`.
    ///
    /// # Errors
    ///
    /// Returns [`EpiError::UnknownNodeError`] for a missing node, and see
    /// [`Population::impact`].
    pub fn impact_of(&self, name: &str, disease: &str) -> Result<f64, EpiError> {
        self.nodes
            .get(name)
            .ok_or_else(|| EpiError::UnknownNodeError(name.to_string()))?
            .impact(disease)
    }

    /// Impact of every node, in insertion order.
    ///
    /// # Errors
    ///
    /// Fails on the first node whose impact is undefined.
    pub fn impacts(&self, disease: &str) -> Result<IndexMap<String, f64>, EpiError> {
        self.nodes
            .iter()
            .map(|(name, population)| Ok((name.clone(), population.impact(disease)?)))
            .collect()
    }
}
