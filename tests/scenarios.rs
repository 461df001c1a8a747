// Copyright 2018 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

//! End-to-end scenarios for the named colour-refinement recipes, run against small hand-picked
//! graphs whose distinguishing power is known.

use pebble_game::recipes::{
  can_drfwl1_count_colorful, can_drfwl2_count_colorful, can_kfwl_count, can_kfwl_count_colorful,
  can_one_wl_count_colorful,
};
use pebble_game::Engine;

fn undirected(edges: &[(usize, usize)]) -> Vec<(usize, usize)> {
  edges.iter().flat_map(|&(u, v)| [(u, v), (v, u)]).collect()
}

fn cycle(n: usize) -> Vec<(usize, usize)> {
  let edges: Vec<(usize, usize)> = (0..n).map(|i| (i, (i + 1) % n)).collect();
  undirected(&edges)
}

fn path(n: usize) -> Vec<(usize, usize)> {
  let edges: Vec<(usize, usize)> = (0..n - 1).map(|i| (i, i + 1)).collect();
  undirected(&edges)
}

#[test]
fn triangle_is_colorful_under_2fwl() {
  let _logger = env_logger::try_init();
  let c3 = cycle(3);
  assert!(can_kfwl_count_colorful(&c3, 2, None).unwrap());
  // With no external contraction enumerator, a one-graph list degenerates to the single check.
  let graphs = vec![(c3, None)];
  assert!(can_kfwl_count(&graphs, 2).unwrap());
}

#[test]
fn four_cycle_is_not_colorful_under_one_wl() {
  let _logger = env_logger::try_init();
  let c4 = cycle(4);
  assert!(!can_one_wl_count_colorful(&c4, None).unwrap());
}

#[test]
fn four_cycle_is_colorful_under_2fwl() {
  let _logger = env_logger::try_init();
  let c4 = cycle(4);
  assert!(can_kfwl_count_colorful(&c4, 2, None).unwrap());
}

#[test]
fn three_edge_path_is_colorful_under_drfwl1() {
  let _logger = env_logger::try_init();
  let p4 = path(4); // 4 nodes, 3 edges
  assert!(can_drfwl1_count_colorful(&p4, None).unwrap());
}

#[test]
fn five_cycle_distinguished_by_drfwl2_not_drfwl1() {
  let _logger = env_logger::try_init();
  let c5 = cycle(5);
  assert!(can_drfwl2_count_colorful(&c5, None).unwrap());
  assert!(!can_drfwl1_count_colorful(&c5, None).unwrap());
}

#[test]
fn empty_composite_returns_source_and_marks_only_the_root() {
  let _logger = env_logger::try_init();
  let mut engine = Engine::new(&undirected(&[(0, 1)]), 2, None).unwrap();
  let s0 = engine.initialize()[0];

  let marked = engine.composite(s0, &[], 0, false, true).unwrap();
  assert_eq!(marked, vec![s0]);
  assert!(engine.has_visited(s0).unwrap());

  let unmarked_target = engine.restrict(s0, 0, 0, 0, false, false).unwrap()[0];
  let out = engine.composite(unmarked_target, &[], 0, false, false).unwrap();
  assert_eq!(out, vec![unmarked_target]);
  assert!(!engine.has_visited(unmarked_target).unwrap());
}
