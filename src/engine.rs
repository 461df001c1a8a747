// Copyright 2018 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use fnv::FnvHashMap;

use crate::cc::CcPartition;
use crate::error::EngineError;
use crate::game_graph::{GameGraph, StateId};
use crate::graph_view::GraphView;
use crate::state::{Configuration, StateKey, StateRecord, OFF};

/// A single primitive move in a `composite` sequence.
#[derive(Clone, Copy, Debug)]
pub enum Op {
  Restrict { pebble: usize, node: usize },
  Expand { pebble: usize },
}

///
/// The pebble-game state engine: owns the graph being played on, the pebble count, and every
/// state ever interned. Grounded on the teacher's `Graph<N>`, minus the `Arc<Mutex<..>>` and
/// async executor machinery -- this engine is single-threaded and synchronous throughout.
///
pub struct Engine {
  graph: GraphView,
  num_pebbles: usize,
  states: FnvHashMap<StateKey, StateId>,
  game: GameGraph,
  initial: StateId,
}

impl Engine {
  ///
  /// Builds an engine over the given undirected graph with `num_pebbles` pebbles, all initially
  /// off the graph. The all-off configuration with no selected CC is interned as the first state.
  ///
  pub fn new(
    edge_index: &[(usize, usize)],
    num_pebbles: usize,
    num_nodes: Option<usize>,
  ) -> Result<Engine, EngineError> {
    let graph = GraphView::new(edge_index, num_nodes)?;
    let mut engine = Engine {
      graph,
      num_pebbles,
      states: FnvHashMap::default(),
      game: GameGraph::new(),
      initial: StateId::end(),
    };
    let key = StateKey {
      pebbles: Configuration::new(vec![OFF; num_pebbles]),
      selected_cc: None,
      tag: 0,
    };
    engine.initial = engine.intern(key);
    log::debug!(
      "Engine::new: {} nodes, {} pebbles, initial state {:?}",
      engine.graph.num_nodes(),
      num_pebbles,
      engine.initial
    );
    Ok(engine)
  }

  /// The states the game begins from: just the one all-off configuration.
  pub fn initialize(&self) -> Vec<StateId> {
    vec![self.initial]
  }

  fn intern(&mut self, key: StateKey) -> StateId {
    if let Some(&id) = self.states.get(&key) {
      crate::test_trace_log!("Engine::intern: reused existing state {:?}", id);
      return id;
    }
    let id = self.game.add_state(StateRecord::new(key.clone()));
    crate::test_trace_log!("Engine::intern: interned new state {:?}", id);
    self.states.insert(key, id);
    id
  }

  fn check_state(&self, s: StateId) -> Result<&StateRecord, EngineError> {
    self.game.record(s).ok_or(EngineError::InvalidState)
  }

  fn check_pebble(&self, pebble: usize) -> Result<(), EngineError> {
    if pebble >= self.num_pebbles {
      return Err(EngineError::InvalidPebble {
        pebble,
        num_pebbles: self.num_pebbles,
      });
    }
    Ok(())
  }

  fn check_node(&self, node: usize) -> Result<(), EngineError> {
    if node >= self.graph.num_nodes() {
      return Err(EngineError::InvalidNode {
        node: node as i64,
        num_nodes: self.graph.num_nodes(),
      });
    }
    Ok(())
  }

  ///
  /// Places pebble `pebble` on `node`, from state `s`. Computes every CC of the resulting cut
  /// graph that is reachable from `s`'s selected CC (or every CC, if `s` had none selected) and
  /// interns a successor for each, per §4.4's restrict algorithm.
  ///
  pub fn restrict(
    &mut self,
    s: StateId,
    pebble: usize,
    node: usize,
    tag: u32,
    record: bool,
    mark: bool,
  ) -> Result<Vec<StateId>, EngineError> {
    let key = self.check_state(s)?.key.clone();
    self.check_pebble(pebble)?;
    self.check_node(node)?;

    let new_pebbles = key.pebbles.with_placed(pebble, node);
    let new_partition = CcPartition::compute(&self.graph, &new_pebbles.pebbled_nodes());

    let reachable: Vec<usize> = match key.selected_cc {
      None => (0..new_partition.num_ccs()).collect(),
      Some(c) => {
        let old_partition = CcPartition::compute(&self.graph, &key.pebbles.pebbled_nodes());
        let old_edges: std::collections::HashSet<(usize, usize)> =
          old_partition.edges_of(c).iter().copied().collect();
        (0..new_partition.num_ccs())
          .filter(|&c2| {
            new_partition
              .edges_of(c2)
              .iter()
              .any(|e| old_edges.contains(e))
          })
          .collect()
      }
    };

    let mut successors = Vec::with_capacity(reachable.len());
    for c2 in reachable {
      let succ_key = StateKey {
        pebbles: new_pebbles.clone(),
        selected_cc: Some(c2),
        tag,
      };
      successors.push(self.intern(succ_key));
    }
    successors.sort_unstable();
    successors.dedup();

    if record {
      for &succ in &successors {
        self.game.add_edge(s, succ);
      }
    }
    if mark {
      self.mark_visited(s)?;
    }
    Ok(successors)
  }

  ///
  /// Lifts pebble `pebble` off the graph, from state `s`. If `s` had a selected CC, by I3 its
  /// edges land wholly inside exactly one CC of the larger resulting cut graph; that CC is
  /// carried forward.
  ///
  pub fn expand(
    &mut self,
    s: StateId,
    pebble: usize,
    tag: u32,
    record: bool,
    mark: bool,
  ) -> Result<StateId, EngineError> {
    let key = self.check_state(s)?.key.clone();
    self.check_pebble(pebble)?;

    let new_pebbles = key.pebbles.with_lifted(pebble);
    let new_partition = CcPartition::compute(&self.graph, &new_pebbles.pebbled_nodes());

    let new_cc = match key.selected_cc {
      None => None,
      Some(c) => {
        let old_partition = CcPartition::compute(&self.graph, &key.pebbles.pebbled_nodes());
        let &(u, v) = old_partition
          .edges_of(c)
          .first()
          .expect("I3: a selected CC always has at least one edge");
        let idx = self
          .graph
          .edge_position(u, v)
          .expect("edge came from graph.edges(), must have a position");
        Some(new_partition.cc_of_edge_index(idx))
      }
    };

    let succ_key = StateKey {
      pebbles: new_pebbles,
      selected_cc: new_cc,
      tag,
    };
    let succ = self.intern(succ_key);

    if record {
      self.game.add_edge(s, succ);
    }
    if mark {
      self.mark_visited(s)?;
    }
    Ok(succ)
  }

  ///
  /// Folds a sequence of primitive ops left to right, starting from `{s}` and unioning results at
  /// every step (§4.4). Every op's pebble/node is checked against the engine's current limits
  /// before any op runs, so a bad op anywhere in the sequence leaves no partial interning, edge
  /// recording, or visitation mark behind. `record` is threaded through to every primitive call;
  /// `mark` applies only to the original `s`, never to an intermediate state, matching the
  /// reference composite's `mark_as_visited=False` on every recursive sub-call.
  ///
  pub fn composite(
    &mut self,
    s: StateId,
    ops: &[Op],
    tag: u32,
    record: bool,
    mark: bool,
  ) -> Result<Vec<StateId>, EngineError> {
    self.check_state(s)?;
    for op in ops {
      match *op {
        Op::Restrict { pebble, node } => {
          self.check_pebble(pebble)?;
          self.check_node(node)?;
        }
        Op::Expand { pebble } => self.check_pebble(pebble)?,
      }
    }

    if mark {
      self.mark_visited(s)?;
    }
    if ops.is_empty() {
      return Ok(vec![s]);
    }

    let mut frontier = vec![s];
    for op in ops {
      let mut next = Vec::new();
      for &state in &frontier {
        match *op {
          Op::Restrict { pebble, node } => {
            next.extend(self.restrict(state, pebble, node, tag, record, false)?);
          }
          Op::Expand { pebble } => {
            next.push(self.expand(state, pebble, tag, record, false)?);
          }
        }
      }
      next.sort_unstable();
      next.dedup();
      frontier = next;
    }
    Ok(frontier)
  }

  /// Interns `(pebble_nodes, selected_cc, tag)` directly, without going through a move.
  pub fn get_state(
    &mut self,
    pebble_nodes: &[i64],
    selected_cc: Option<usize>,
    tag: u32,
  ) -> Result<StateId, EngineError> {
    let pebbles = Configuration::new(pebble_nodes.to_vec());
    if pebbles.len() != self.num_pebbles {
      return Err(EngineError::InvalidOp);
    }
    for &n in pebbles.as_slice() {
      if n != OFF {
        self.check_node(n as usize)?;
      }
    }
    if let Some(c) = selected_cc {
      let partition = CcPartition::compute(&self.graph, &pebbles.pebbled_nodes());
      if c >= partition.num_ccs() {
        return Err(EngineError::InvalidOp);
      }
    }
    Ok(self.intern(StateKey {
      pebbles,
      selected_cc,
      tag,
    }))
  }

  /// The `(selected_cc, pebble_nodes, edges_in_selected_cc)` a state was interned from.
  pub fn serialize_state(
    &self,
    s: StateId,
  ) -> Result<(Option<usize>, Vec<i64>, Vec<(usize, usize)>), EngineError> {
    let key = &self.check_state(s)?.key;
    let edges_in_cc = match key.selected_cc {
      None => Vec::new(),
      Some(c) => {
        let partition = CcPartition::compute(&self.graph, &key.pebbles.pebbled_nodes());
        partition.edges_of(c).to_vec()
      }
    };
    Ok((key.selected_cc, key.pebbles.as_slice().to_vec(), edges_in_cc))
  }

  /// True iff `s` has a selected CC and that CC has no edge between two unpebbled nodes -- the
  /// Duplicator is locally cornered there (§4.7's per-state half of `can_spoiler_win`).
  pub fn is_spoiler_win_local(&self, s: StateId) -> Result<bool, EngineError> {
    let key = &self.check_state(s)?.key;
    match key.selected_cc {
      None => Ok(false),
      Some(c) => {
        let pebbled = key.pebbles.pebbled_nodes();
        let partition = CcPartition::compute(&self.graph, &pebbled);
        Ok(partition.is_cornered(c, &pebbled))
      }
    }
  }

  pub fn has_visited(&self, s: StateId) -> Result<bool, EngineError> {
    Ok(self.check_state(s)?.visited)
  }

  pub fn mark_visited(&mut self, s: StateId) -> Result<(), EngineError> {
    self
      .game
      .record_mut(s)
      .ok_or(EngineError::InvalidState)?
      .visited = true;
    Ok(())
  }

  /// The full game-state graph's edges, for diagnostics and recipe-level search.
  pub fn game_graph(&self) -> Vec<(StateId, StateId)> {
    self.game.dump()
  }

  pub(crate) fn successors(&self, s: StateId) -> impl Iterator<Item = StateId> + '_ {
    self.game.successors(s)
  }

  pub(crate) fn state_key(&self, s: StateId) -> Option<&StateKey> {
    self.game.record(s).map(|r| &r.key)
  }

  pub fn num_states(&self) -> usize {
    self.game.num_states()
  }

  pub(crate) fn all_states(&self) -> impl Iterator<Item = StateId> {
    self.game.all_ids()
  }

  /// Adds a game-graph edge between two already-interned states, without performing a move.
  pub fn add_game_graph_edge(&mut self, a: StateId, b: StateId) -> Result<(), EngineError> {
    self.check_state(a)?;
    self.check_state(b)?;
    self.game.add_edge(a, b);
    Ok(())
  }

  /// The CC partition of the cut graph induced by `pebbled_nodes`, as an edge -> CC-id map.
  /// `pebbled_nodes` is the set of currently-placed node ids (not a `K`-length configuration).
  pub fn edge_cc(
    &self,
    pebbled_nodes: &[usize],
  ) -> Result<FnvHashMap<(usize, usize), usize>, EngineError> {
    for &n in pebbled_nodes {
      self.check_node(n)?;
    }
    let mut seen = std::collections::HashSet::with_capacity(pebbled_nodes.len());
    for &n in pebbled_nodes {
      if !seen.insert(n) {
        return Err(EngineError::InvalidOp);
      }
    }
    let partition = CcPartition::compute(&self.graph, pebbled_nodes);
    Ok(
      self
        .graph
        .edges()
        .iter()
        .enumerate()
        .map(|(i, &e)| (e, partition.cc_of_edge_index(i)))
        .collect(),
    )
  }

  pub fn graph(&self) -> &GraphView {
    &self.graph
  }

  pub fn num_pebbles(&self) -> usize {
    self.num_pebbles
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn undirected(edges: &[(usize, usize)]) -> Vec<(usize, usize)> {
    edges
      .iter()
      .flat_map(|&(u, v)| [(u, v), (v, u)])
      .collect()
  }

  fn triangle() -> Engine {
    Engine::new(&undirected(&[(0, 1), (1, 2), (2, 0)]), 2, None).unwrap()
  }

  #[test]
  fn new_interns_initial_all_off_state() {
    let _logger = env_logger::try_init();
    let e = triangle();
    let init = e.initialize();
    assert_eq!(init.len(), 1);
    let (cc, pebbles, _) = e.serialize_state(init[0]).unwrap();
    assert_eq!(cc, None);
    assert_eq!(pebbles, vec![OFF, OFF]);
  }

  #[test]
  fn restrict_from_no_cc_fans_out_to_every_cc() {
    let _logger = env_logger::try_init();
    let mut e = triangle();
    let s0 = e.initialize()[0];
    // Pebbling node 0 on a triangle with nothing else placed leaves one CC: edge (1,2).
    let succ = e.restrict(s0, 0, 0, 0, true, false).unwrap();
    assert_eq!(succ.len(), 1);
    let (cc, pebbles, edges) = e.serialize_state(succ[0]).unwrap();
    assert_eq!(cc, Some(0));
    assert_eq!(pebbles, vec![0, OFF]);
    assert!(edges.contains(&(1, 2)));
  }

  #[test]
  fn restrict_then_expand_round_trips_to_same_state() {
    let _logger = env_logger::try_init();
    let mut e = triangle();
    let s0 = e.initialize()[0];
    let after_restrict = e.restrict(s0, 0, 0, 0, true, false).unwrap()[0];
    let after_expand = e.expand(after_restrict, 0, 0, true, false).unwrap();
    // expand undoes the placement: configuration goes back to all-off, and since the restricted
    // state's one CC's edges land wholly back in the single full-graph CC, the CC is preserved
    // as "the" CC (not None) only if a CC was selected going in -- here it was, so it's carried.
    let (cc, pebbles, _) = e.serialize_state(after_expand).unwrap();
    assert_eq!(pebbles, vec![OFF, OFF]);
    assert!(cc.is_some());
  }

  #[test]
  fn restrict_rejects_invalid_pebble() {
    let _logger = env_logger::try_init();
    let mut e = triangle();
    let s0 = e.initialize()[0];
    let err = e.restrict(s0, 5, 0, 0, false, false).unwrap_err();
    assert_eq!(
      err,
      EngineError::InvalidPebble {
        pebble: 5,
        num_pebbles: 2
      }
    );
  }

  #[test]
  fn restrict_rejects_invalid_state_id() {
    let _logger = env_logger::try_init();
    let mut e = triangle();
    let bogus = StateId::new(9999);
    let err = e.restrict(bogus, 0, 0, 0, false, false).unwrap_err();
    assert_eq!(err, EngineError::InvalidState);
  }

  #[test]
  fn composite_of_no_ops_returns_source_and_marks_it() {
    let _logger = env_logger::try_init();
    let mut e = triangle();
    let s0 = e.initialize()[0];
    let out = e.composite(s0, &[], 0, false, true).unwrap();
    assert_eq!(out, vec![s0]);
    assert!(e.has_visited(s0).unwrap());
  }

  #[test]
  fn composite_chains_restrict_then_expand() {
    let _logger = env_logger::try_init();
    let mut e = triangle();
    let s0 = e.initialize()[0];
    let ops = [
      Op::Restrict { pebble: 0, node: 0 },
      Op::Expand { pebble: 0 },
    ];
    let out = e.composite(s0, &ops, 0, true, false).unwrap();
    assert_eq!(out.len(), 1);
    let (_, pebbles, _) = e.serialize_state(out[0]).unwrap();
    assert_eq!(pebbles, vec![OFF, OFF]);
  }

  #[test]
  fn get_state_is_consistent_with_restrict_interning() {
    let _logger = env_logger::try_init();
    let mut e = triangle();
    let s0 = e.initialize()[0];
    let via_restrict = e.restrict(s0, 0, 0, 0, false, false).unwrap()[0];
    let via_get_state = e.get_state(&[0, OFF], Some(0), 0).unwrap();
    assert_eq!(via_restrict, via_get_state);
  }

  #[test]
  fn edge_cc_matches_serialize_state_for_same_pebbling() {
    let _logger = env_logger::try_init();
    let mut e = triangle();
    let s0 = e.initialize()[0];
    let s1 = e.restrict(s0, 0, 0, 0, false, false).unwrap()[0];
    let (cc, _, edges_in_cc) = e.serialize_state(s1).unwrap();
    let map = e.edge_cc(&[0]).unwrap();
    for edge in edges_in_cc {
      assert_eq!(map[&edge], cc.unwrap());
    }
  }

  #[test]
  fn edge_cc_rejects_duplicate_pebbled_node() {
    let _logger = env_logger::try_init();
    let e = triangle();
    let err = e.edge_cc(&[0, 0]).unwrap_err();
    assert_eq!(err, EngineError::InvalidOp);
  }

  #[test]
  fn composite_rejects_bad_op_before_mutating_any_state() {
    let _logger = env_logger::try_init();
    let mut e = triangle();
    let s0 = e.initialize()[0];
    let before = e.num_states();
    let ops = [
      Op::Restrict { pebble: 0, node: 0 },
      Op::Restrict { pebble: 99, node: 0 },
    ];
    let err = e.composite(s0, &ops, 0, true, true).unwrap_err();
    assert_eq!(
      err,
      EngineError::InvalidPebble {
        pebble: 99,
        num_pebbles: 2
      }
    );
    assert_eq!(e.num_states(), before);
    assert!(!e.has_visited(s0).unwrap());
  }

  #[test]
  fn is_spoiler_win_local_false_without_selected_cc() {
    let _logger = env_logger::try_init();
    let e = triangle();
    let s0 = e.initialize()[0];
    assert!(!e.is_spoiler_win_local(s0).unwrap());
  }

  #[test]
  fn is_spoiler_win_local_true_when_cc_fully_pebbled() {
    let _logger = env_logger::try_init();
    let mut e = Engine::new(&undirected(&[(0, 1)]), 2, None).unwrap();
    let s0 = e.initialize()[0];
    let s1 = e.restrict(s0, 0, 0, 0, false, false).unwrap()[0];
    let s2 = e.restrict(s1, 1, 1, 0, false, false).unwrap()[0];
    assert!(e.is_spoiler_win_local(s2).unwrap());
  }
}
