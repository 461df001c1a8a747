// Copyright 2018 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use petgraph::graph::DiGraph;
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::state::StateRecord;

// 2^32 states ought to be more than enough for any single engine run.
pub type StateId = petgraph::graph::NodeIndex<u32>;

type PGraph = DiGraph<StateRecord, (), u32>;

///
/// The append-only directed multigraph over interned states: nodes are states, edges record every
/// move ever made during exploration. Grounded directly on the teacher's
/// `type PGraph<N> = DiGraph<Entry<N>, (), u32>` -- unlike the teacher's graph, this one never
/// removes a node or an edge (§3's Lifecycle), so only the append half of `petgraph`'s API is
/// exposed here.
///
#[derive(Default)]
pub(crate) struct GameGraph {
  pg: PGraph,
}

impl GameGraph {
  pub(crate) fn new() -> GameGraph {
    GameGraph { pg: DiGraph::new() }
  }

  pub(crate) fn add_state(&mut self, record: StateRecord) -> StateId {
    self.pg.add_node(record)
  }

  pub(crate) fn record(&self, id: StateId) -> Option<&StateRecord> {
    self.pg.node_weight(id)
  }

  pub(crate) fn record_mut(&mut self, id: StateId) -> Option<&mut StateRecord> {
    self.pg.node_weight_mut(id)
  }

  pub(crate) fn num_states(&self) -> usize {
    self.pg.node_count()
  }

  /// Appends a game-graph edge `a -> b`. Duplicates are tolerated, per §4.4's edge cases: the
  /// back-induction fixed point groups by neighbor identity, not by edge count.
  pub(crate) fn add_edge(&mut self, a: StateId, b: StateId) {
    self.pg.add_edge(a, b, ());
  }

  pub(crate) fn successors(&self, a: StateId) -> impl Iterator<Item = StateId> + '_ {
    self.pg.neighbors_directed(a, Direction::Outgoing)
  }

  /// All ids in the order they were interned (i.e. `0..num_states()`, but expressed as
  /// `StateId`s for callers that shouldn't assume the underlying representation).
  pub(crate) fn all_ids(&self) -> impl Iterator<Item = StateId> {
    self.pg.node_indices()
  }

  /// The full edge list, for diagnostics (`Engine::game_graph`).
  pub(crate) fn dump(&self) -> Vec<(StateId, StateId)> {
    self
      .pg
      .edge_references()
      .map(|e| (e.source(), e.target()))
      .collect()
  }
}
