// Copyright 2018 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use std::fmt;

///
/// The four ways a caller can misuse the public `Engine` API: every fallible method validates
/// its arguments against the engine's current state before it mutates anything, and returns one
/// of these instead of panicking.
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EngineError {
  /// A node id was `>= num_nodes` or (conceptually) negative.
  InvalidNode { node: i64, num_nodes: usize },
  /// A pebble index was `>= num_pebbles`.
  InvalidPebble { pebble: usize, num_pebbles: usize },
  /// A state id was not issued by this engine.
  InvalidState,
  /// A request was malformed in a way that isn't a single bad pebble/node/state index: a
  /// one-sided edge in a constructor's edge list, a pebble-configuration length mismatch or
  /// out-of-range selected CC in `get_state`, or a duplicate node in a pebbled-node set.
  InvalidOp,
}

impl fmt::Display for EngineError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      EngineError::InvalidNode { node, num_nodes } => {
        write!(f, "node {node} is not in range [0, {num_nodes})")
      }
      EngineError::InvalidPebble {
        pebble,
        num_pebbles,
      } => write!(
        f,
        "pebble index {pebble} is not in range [0, {num_pebbles})"
      ),
      EngineError::InvalidState => write!(f, "state id was not issued by this engine"),
      EngineError::InvalidOp => write!(f, "request was malformed (bad edge list, state shape, or pebbled-node set)"),
    }
  }
}

impl std::error::Error for EngineError {}
