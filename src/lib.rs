// Copyright 2018 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

#![deny(warnings)]
// Enable all clippy lints except for many of the pedantic ones. It's a shame this needs to be copied and pasted across crates, but there doesn't appear to be a way to include inner attributes from a common source.
#![deny(
    clippy::all,
    clippy::default_trait_access,
    clippy::expl_impl_clone_on_copy,
    clippy::if_not_else,
    clippy::needless_continue,
    clippy::unseparated_literal_suffix,
    clippy::used_underscore_binding
)]
// It is often more clear to show that nothing is being moved.
#![allow(clippy::match_ref_pats)]
// Subjective style.
#![allow(
    clippy::len_without_is_empty,
    clippy::redundant_field_names,
    clippy::too_many_arguments
)]
// Default isn't as big a deal as people seem to think it is.
#![allow(clippy::new_without_default, clippy::new_ret_no_self)]

//! A pebble-game state engine: decides whether a Spoiler can always corner a Duplicator on a
//! graph by repeatedly placing and lifting a fixed number of pebbles, which is exactly the game
//! Weisfeiler-Leman-style colour refinement schemes play when they ask whether two graphs are
//! distinguishable. The engine itself knows nothing about WL, FWL, or graph contraction --
//! `recipes` is a thin client built on top of it for a handful of named schemes.

mod cc;
pub mod engine;
pub mod error;
mod game_graph;
mod graph_view;
pub mod recipes;
pub mod search;
mod state;

pub use crate::engine::{Engine, Op};
pub use crate::error::EngineError;
pub use crate::game_graph::StateId;
pub use crate::graph_view::GraphView;
pub use crate::search::{can_spoiler_win, search, ArgSpace};
pub use crate::state::OFF;

///
/// Logs at trace level, but only in `cfg(test)`: the state-interning hot path would otherwise
/// pay for formatting a log line on every call in release builds.
///
#[macro_export]
macro_rules! test_trace_log {
  ($($arg:tt)+) => {
    #[cfg(test)]
    {
      log::trace!($($arg)+)
    }
  };
}
