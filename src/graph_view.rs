// Copyright 2018 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use fixedbitset::FixedBitSet;
use fnv::FnvHashMap;

use crate::error::EngineError;

///
/// An immutable adjacency view of a simple undirected graph over `[0, num_nodes)`.
///
/// Constructed once from a directed edge list (both orientations of every undirected edge must
/// be present); never mutated afterward. Holds both a dense edge-existence matrix (fast
/// `has_edge` queries) and per-node neighbor lists (fast, ordered traversal), mirroring the way
/// the teacher keeps both a `HashMap` lookup and a `petgraph` adjacency structure for its own
/// Node identities rather than picking one representation for every access pattern.
///
#[derive(Debug)]
pub struct GraphView {
  num_nodes: usize,
  neighbors: Vec<Vec<usize>>,
  matrix: FixedBitSet,
  /// All directed edges, in a stable (by source node, then by neighbor order) enumeration. This
  /// is the "deterministic edge enumeration" that the CC labeler canonicalizes against.
  edges: Vec<(usize, usize)>,
  /// Reverse lookup from a directed edge to its position in `edges`, used by `expand` to find
  /// which new CC a just-lifted pebble's old CC landed in.
  edge_position: FnvHashMap<(usize, usize), usize>,
}

impl GraphView {
  ///
  /// Builds a view from a directed edge list. `num_nodes` defaults to `max(node id) + 1` (0 if
  /// `edge_index` is empty). Duplicate edges are silently deduplicated; if any edge's reverse is
  /// absent, construction fails rather than silently symmetrizing the caller's graph.
  ///
  pub fn new(
    edge_index: &[(usize, usize)],
    num_nodes: Option<usize>,
  ) -> Result<GraphView, EngineError> {
    let num_nodes = num_nodes.unwrap_or_else(|| {
      edge_index
        .iter()
        .flat_map(|&(u, v)| [u, v])
        .max()
        .map_or(0, |m| m + 1)
    });

    let mut present = FixedBitSet::with_capacity(num_nodes * num_nodes);
    for &(u, v) in edge_index {
      if u >= num_nodes {
        return Err(EngineError::InvalidNode {
          node: u as i64,
          num_nodes,
        });
      }
      if v >= num_nodes {
        return Err(EngineError::InvalidNode {
          node: v as i64,
          num_nodes,
        });
      }
      present.insert(u * num_nodes + v);
    }
    for &(u, v) in edge_index {
      if !present.contains(v * num_nodes + u) {
        log::warn!("GraphView::new: edge ({u}, {v}) has no reverse edge ({v}, {u})");
        return Err(EngineError::InvalidOp);
      }
    }

    let mut neighbors = vec![Vec::new(); num_nodes];
    for u in 0..num_nodes {
      for v in 0..num_nodes {
        if present.contains(u * num_nodes + v) {
          neighbors[u].push(v);
        }
      }
    }
    let edges: Vec<(usize, usize)> = neighbors
      .iter()
      .enumerate()
      .flat_map(|(u, vs)| vs.iter().map(move |&v| (u, v)))
      .collect();
    let edge_position = edges
      .iter()
      .enumerate()
      .map(|(i, &e)| (e, i))
      .collect();

    Ok(GraphView {
      num_nodes,
      neighbors,
      matrix: present,
      edges,
      edge_position,
    })
  }

  /// The position of directed edge `(u, v)` in `edges()`, if it exists.
  pub fn edge_position(&self, u: usize, v: usize) -> Option<usize> {
    self.edge_position.get(&(u, v)).copied()
  }

  pub fn num_nodes(&self) -> usize {
    self.num_nodes
  }

  pub fn neighbors(&self, v: usize) -> &[usize] {
    &self.neighbors[v]
  }

  pub fn has_edge(&self, u: usize, v: usize) -> bool {
    u < self.num_nodes && v < self.num_nodes && self.matrix.contains(u * self.num_nodes + v)
  }

  /// Directed edge pairs in the graph's stable enumeration order.
  pub fn edges(&self) -> &[(usize, usize)] {
    &self.edges
  }

  /// Nodes within graph distance `hop` of `source`, via BFS. Used by the DRFWL recipes to
  /// restrict their argument space to a bounded neighborhood.
  pub fn nodes_within(&self, source: usize, hop: usize) -> Vec<usize> {
    let mut dist = vec![usize::MAX; self.num_nodes];
    let mut frontier = vec![source];
    dist[source] = 0;
    let mut out = vec![source];
    for d in 1..=hop {
      let mut next = Vec::new();
      for &u in &frontier {
        for &v in self.neighbors(u) {
          if dist[v] == usize::MAX {
            dist[v] = d;
            next.push(v);
            out.push(v);
          }
        }
      }
      frontier = next;
    }
    out
  }
}
