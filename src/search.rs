// Copyright 2018 Pants project contributors (see CONTRIBUTORS.md).
// Licensed under the Apache License, Version 2.0 (see LICENSE).

use fnv::{FnvHashMap, FnvHashSet};

use crate::engine::{Engine, Op};
use crate::error::EngineError;
use crate::game_graph::StateId;

///
/// The argument space a recipe's move is applied over: either a fixed, precomputed list (most
/// recipes) or one computed fresh per source state (the DRFWL recipes, whose hop-intersection
/// arg-space depends on where the pebbles currently sit).
///
pub enum ArgSpace<A> {
  Fixed(Vec<A>),
  Dynamic(Box<dyn Fn(&Engine, StateId) -> Vec<A>>),
}

impl<A: Clone> ArgSpace<A> {
  fn args_for(&self, engine: &Engine, s: StateId) -> Vec<A> {
    match self {
      ArgSpace::Fixed(args) => args.clone(),
      ArgSpace::Dynamic(f) => f(engine, s),
    }
  }
}

///
/// Runs one search level: applies `op_of(arg)` (turned into a `composite` sequence) to every
/// not-yet-visited state in `frontier`, for every argument in `arg_space`, recording every move
/// taken. Grounded on `game_search.py`'s `GameSearcher.search`, which drives the same fan-out over
/// an explicit argument list, skipping a frontier state with `if not builder.has_visited(state)`.
///
pub fn search<A: Clone>(
  engine: &mut Engine,
  frontier: &[StateId],
  arg_space: &ArgSpace<A>,
  op_of: impl Fn(&A) -> Vec<Op>,
  tag: u32,
) -> Result<Vec<StateId>, EngineError> {
  let mut next = Vec::new();
  for &s in frontier {
    if engine.has_visited(s)? {
      continue;
    }
    let args = arg_space.args_for(engine, s);
    for arg in &args {
      let ops = op_of(arg);
      next.extend(engine.composite(s, &ops, tag, true, true)?);
    }
  }
  next.sort_unstable();
  next.dedup();
  Ok(next)
}

///
/// Back-induction fixed point over the whole game-state graph built so far: a state is a
/// Spoiler-win if it is already locally cornered, or if Spoiler has *some* recorded move (a group
/// of outgoing successors sharing a `(pebbles, selected_cc)`, ignoring `tag` per §4.6 -- distinct
/// tags recorded for the same semantic destination) all of whose members are themselves a
/// Spoiler-win. Grounded verbatim on `game_search.py`'s `can_spoiler_win`: the per-state update is
/// `any(all(if_win[v]) for v in state_dict.values())`, i.e. existential over a state's own
/// outgoing move-groups, not over every interned state sharing that key -- Spoiler gets to choose
/// which move to make.
///
pub fn can_spoiler_win(engine: &Engine) -> Result<FnvHashMap<StateId, bool>, EngineError> {
  let mut win: FnvHashMap<StateId, bool> = FnvHashMap::default();
  for s in engine.all_states() {
    win.insert(s, engine.is_spoiler_win_local(s)?);
  }

  let mut changed = true;
  while changed {
    changed = false;
    for s in engine.all_states() {
      if win[&s] {
        // Per P5, win-ness only grows; already-won states have nothing left to discover.
        continue;
      }
      let mut groups: FnvHashMap<(Vec<i64>, Option<usize>), FnvHashSet<StateId>> =
        FnvHashMap::default();
      for t in engine.successors(s) {
        if let Some(k) = engine.state_key(t) {
          groups
            .entry((k.pebbles.as_slice().to_vec(), k.selected_cc))
            .or_default()
            .insert(t);
        }
      }
      let has_winning_move = groups
        .values()
        .any(|group| group.iter().all(|id| win[id]));
      if has_winning_move {
        win.insert(s, true);
        changed = true;
      }
    }
  }
  log::debug!(
    "can_spoiler_win: fixed point reached, {} of {} states are Spoiler-wins",
    win.values().filter(|&&w| w).count(),
    win.len()
  );
  Ok(win)
}
