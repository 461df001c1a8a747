// Copyright 2018 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::collections::HashMap;

use fnv::FnvHashMap;

use crate::graph_view::GraphView;

///
/// A small hand-rolled union-find over `[0, n)`, used only to compute node-components of the cut
/// graph. Path-halving find, union by rank: small and specific enough to this one use that it
/// isn't worth a dependency.
///
struct UnionFind {
  parent: Vec<usize>,
  rank: Vec<u8>,
}

impl UnionFind {
  fn new(n: usize) -> UnionFind {
    UnionFind {
      parent: (0..n).collect(),
      rank: vec![0; n],
    }
  }

  fn find(&mut self, x: usize) -> usize {
    let mut x = x;
    while self.parent[x] != x {
      self.parent[x] = self.parent[self.parent[x]];
      x = self.parent[x];
    }
    x
  }

  fn union(&mut self, a: usize, b: usize) {
    let (ra, rb) = (self.find(a), self.find(b));
    if ra == rb {
      return;
    }
    match self.rank[ra].cmp(&self.rank[rb]) {
      std::cmp::Ordering::Less => self.parent[ra] = rb,
      std::cmp::Ordering::Greater => self.parent[rb] = ra,
      std::cmp::Ordering::Equal => {
        self.parent[rb] = ra;
        self.rank[ra] += 1;
      }
    }
  }
}

/// Identifies a CC before canonical numbering: either "the component rooted here" for an edge
/// with at least one non-pebbled endpoint, or "the degenerate CC of this one undirected edge" for
/// an edge whose both endpoints are pebbled.
#[derive(Clone, Copy, Eq, PartialEq, Hash)]
enum PreKey {
  Component(usize),
  Degenerate(usize, usize),
}

///
/// The partition of G's edges induced by removing a pebbled node set, canonicalized so that two
/// calls with the same pebbled set (independent of the order pebbles were placed in) produce
/// identical CC ids.
///
#[derive(Debug, Default, Clone)]
pub struct CcPartition {
  /// `edge_cc[i]` is the CC id of `graph.edges()[i]`.
  edge_cc: Vec<usize>,
  /// The directed edges belonging to each CC, in discovery order.
  cc_edges: Vec<Vec<(usize, usize)>>,
}

impl CcPartition {
  pub fn num_ccs(&self) -> usize {
    self.cc_edges.len()
  }

  pub fn edges_of(&self, cc: usize) -> &[(usize, usize)] {
    &self.cc_edges[cc]
  }

  pub fn cc_of_edge_index(&self, edge_idx: usize) -> usize {
    self.edge_cc[edge_idx]
  }

  /// True iff the given CC has no edge whose both endpoints are unpebbled, i.e. the Duplicator is
  /// cornered there. `pebbled` is the set this partition was computed against.
  pub fn is_cornered(&self, cc: usize, pebbled: &[usize]) -> bool {
    self
      .edges_of(cc)
      .iter()
      .all(|&(u, v)| pebbled.contains(&u) || pebbled.contains(&v))
  }

  ///
  /// Computes `π(P)` for the pebbled node set `pebbled` (already filtered of the `-1` "off"
  /// sentinel by the caller). Returns an empty partition if `pebbled` contains a duplicate node
  /// or a node outside `graph`'s range -- this is the CC labeler's own error signal, distinct from
  /// the client-facing `EngineError`s raised earlier by `Engine` for the same bad input.
  ///
  pub fn compute(graph: &GraphView, pebbled: &[usize]) -> CcPartition {
    let n = graph.num_nodes();
    if pebbled.iter().any(|&p| p >= n) {
      return CcPartition::default();
    }
    {
      let mut seen = vec![false; n];
      for &p in pebbled {
        if seen[p] {
          return CcPartition::default();
        }
        seen[p] = true;
      }
    }

    let is_pebbled = {
      let mut mask = vec![false; n];
      for &p in pebbled {
        mask[p] = true;
      }
      mask
    };

    let mut uf = UnionFind::new(n);
    for &(u, v) in graph.edges() {
      if !is_pebbled[u] && !is_pebbled[v] {
        uf.union(u, v);
      }
    }

    let mut next_id = 0usize;
    let mut assigned: FnvHashMap<PreKey, usize> = HashMap::default();
    let mut edge_cc = Vec::with_capacity(graph.edges().len());
    let mut cc_edges: Vec<Vec<(usize, usize)>> = Vec::new();

    for &(u, v) in graph.edges() {
      let key = match (is_pebbled[u], is_pebbled[v]) {
        (false, false) => PreKey::Component(uf.find(u)),
        (true, false) => PreKey::Component(uf.find(v)),
        (false, true) => PreKey::Component(uf.find(u)),
        (true, true) => {
          let (a, b) = if u <= v { (u, v) } else { (v, u) };
          PreKey::Degenerate(a, b)
        }
      };
      let cc = *assigned.entry(key).or_insert_with(|| {
        let id = next_id;
        next_id += 1;
        cc_edges.push(Vec::new());
        id
      });
      cc_edges[cc].push((u, v));
      edge_cc.push(cc);
    }

    CcPartition { edge_cc, cc_edges }
  }
}
