// Copyright 2018 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

/// `-1` sentinel meaning "pebble not placed on the graph".
pub const OFF: i64 = -1;

///
/// The placement of all of an engine's pebbles: a fixed-length sequence of length `K` over
/// `[-1, num_nodes)`. `OFF` (`-1`) means the pebble is not on the graph.
///
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Configuration(Vec<i64>);

impl Configuration {
  pub fn new(slots: Vec<i64>) -> Configuration {
    Configuration(slots)
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn get(&self, pebble: usize) -> i64 {
    self.0[pebble]
  }

  pub fn as_slice(&self) -> &[i64] {
    &self.0
  }

  /// The pebbled (non-`OFF`) node ids, in pebble-index order.
  pub fn pebbled_nodes(&self) -> Vec<usize> {
    self.0.iter().filter(|&&n| n != OFF).map(|&n| n as usize).collect()
  }

  /// Returns a copy of this configuration with pebble `i` moved to `node` (or lifted, if `node`
  /// is `OFF`).
  fn with(&self, i: usize, node: i64) -> Configuration {
    let mut slots = self.0.clone();
    slots[i] = node;
    Configuration(slots)
  }

  pub fn with_placed(&self, i: usize, node: usize) -> Configuration {
    self.with(i, node as i64)
  }

  pub fn with_lifted(&self, i: usize) -> Configuration {
    self.with(i, OFF)
  }
}

///
/// The key a `(P, c, t)` game configuration interns to: the pebble configuration, the selected
/// CC (`None` is the "no CC selected" sentinel), and the client-chosen tag. Two calls that
/// produce equal keys are guaranteed (§3, I1) to resolve to the same state id.
///
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct StateKey {
  pub pebbles: Configuration,
  pub selected_cc: Option<usize>,
  pub tag: u32,
}

///
/// Per-state metadata carried in the game-state graph alongside the interned key: whether the
/// state has been used as a source of a search step, grounded on the teacher's `Entry<N>` holding
/// both node identity and run/visitation bookkeeping in the same graph node weight.
///
#[derive(Clone, Debug)]
pub(crate) struct StateRecord {
  pub(crate) key: StateKey,
  pub(crate) visited: bool,
}

impl StateRecord {
  pub(crate) fn new(key: StateKey) -> StateRecord {
    StateRecord {
      key,
      visited: false,
    }
  }
}
