//! This module contains the data structures used to record the changes made
//! during the search process. Assignments and plugin undo commands are
//! recorded in the central [`Trail`] structure, and if the search process
//! needs to backtrack, then the recorded changes are undone in reverse order.

use index_vec::IndexVec;
use tracing::trace;

use crate::{
	plugin::PluginRef,
	solver::lit::{BoolVar, Lit},
};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
/// A structure that stores the currently assigned value of a Boolean variable
/// and the position in the trail at which it was assigned.
struct BoolStore {
	/// The current value of the variable, if it is assigned.
	value: Option<bool>,
	/// Position of the assignment event in the trail.
	pos: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Log of the assignments and plugin undo commands made during search.
pub(crate) struct Trail {
	/// The storage of events that have been trailed.
	trail: Vec<TrailEvent>,
	/// The length of the trail when previous decisions were made.
	prev_len: Vec<usize>,
	/// Position of the next event whose consequences have not yet been
	/// propagated.
	qhead: usize,
	/// Stores the current assigned values of Boolean variables.
	sat_store: IndexVec<BoolVar, BoolStore>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// An event that is recorded such that it can be undone.
pub(crate) enum TrailEvent {
	/// The assignment of a Boolean variable.
	SatAssignment(Lit),
	/// A command that has to be replayed to a plugin when the event is undone.
	Undo(PluginRef, u64),
}

impl Trail {
	/// Record the assignment of a literal in the Trail.
	///
	/// Returns the previous value of the literal, in which case nothing is
	/// recorded.
	///
	/// # Warning
	/// This method expects that `self.sat_store` has already been extended to the
	/// correct length (using [`Self::grow_to_boolvar`]).
	pub(crate) fn assign_lit(&mut self, lit: Lit) -> Option<bool> {
		let pos = self.trail.len();
		let store = &mut self.sat_store[lit.var()];
		if let Some(val) = store.value {
			return Some(val != lit.is_negated());
		}
		store.value = Some(!lit.is_negated());
		store.pos = pos;
		self.trail.push(TrailEvent::SatAssignment(lit));
		None
	}

	/// Return the current decision level
	pub(crate) fn decision_level(&self) -> u32 {
		self.prev_len.len() as u32
	}

	/// Get the current assigned value for a literal (if any).
	pub(crate) fn get_sat_value(&self, lit: Lit) -> Option<bool> {
		// Variables created during search might not be registered yet
		self.sat_store
			.get(lit.var())
			.and_then(|store| store.value)
			.map(|x| if lit.is_negated() { !x } else { x })
	}

	/// Grow the storage for the state of Boolean variables to include enough
	/// space for `var`.
	pub(crate) fn grow_to_boolvar(&mut self, var: BoolVar) {
		if var.index() >= self.sat_store.len() {
			self.sat_store.resize(var.index() + 1, BoolStore::default());
		}
	}

	/// Returns the length of the trail.
	pub(crate) fn len(&self) -> usize {
		self.trail.len()
	}

	/// Returns the length of the trail when decision level `level + 1` was
	/// started, i.e., the length to which the trail has to be restored to
	/// return to `level`.
	pub(crate) fn level_len(&self, level: u32) -> usize {
		self.prev_len
			.get(level as usize)
			.copied()
			.unwrap_or(self.trail.len())
	}

	/// Returns the next assigned literal whose consequences have not been
	/// propagated, skipping other events.
	pub(crate) fn next_propagation(&mut self) -> Option<Lit> {
		while self.qhead < self.trail.len() {
			let event = self.trail[self.qhead];
			self.qhead += 1;
			if let TrailEvent::SatAssignment(lit) = event {
				return Some(lit);
			}
		}
		None
	}

	/// Notify the Trail of a new decision level to which the trail can be
	/// restored.
	pub(crate) fn notify_new_decision_level(&mut self) {
		self.prev_len.push(self.trail.len());
	}

	/// Returns the number of Boolean variables known to the trail.
	pub(crate) fn num_vars(&self) -> usize {
		self.sat_store.len()
	}

	/// Returns the position in the trail at which the variable of `lit` was
	/// assigned, or `None` if it is unassigned.
	pub(crate) fn position(&self, lit: Lit) -> Option<usize> {
		self.sat_store
			.get(lit.var())
			.filter(|store| store.value.is_some())
			.map(|store| store.pos)
	}

	/// Record a command that is to be given back to `plugin` when the trail is
	/// undone past the current point.
	pub(crate) fn push_undo(&mut self, plugin: PluginRef, data: u64) {
		self.trail.push(TrailEvent::Undo(plugin, data));
	}

	/// Undo the last event on the trail, and return it so that the caller can
	/// dispatch undo commands.
	///
	/// Decision levels that no longer contain any events are removed.
	pub(crate) fn undo(&mut self) -> Option<TrailEvent> {
		let event = self.trail.pop()?;
		if let TrailEvent::SatAssignment(lit) = event {
			trace!(lit = i32::from(lit), "unassign");
			self.sat_store[lit.var()].value = None;
		}
		let len = self.trail.len();
		while self.prev_len.last().is_some_and(|&l| l >= len) {
			let _ = self.prev_len.pop();
		}
		self.qhead = self.qhead.min(len);
		Some(event)
	}
}

#[cfg(test)]
mod tests {
	use crate::{
		plugin::PluginRef,
		solver::{
			engine::trail::{Trail, TrailEvent},
			lit::{BoolVar, Lit},
		},
	};

	#[test]
	fn test_trail_event() {
		let mut trail = Trail::default();
		let a = Lit::from(BoolVar::new(0));
		let b = Lit::from(BoolVar::new(3));
		trail.grow_to_boolvar(BoolVar::new(3));
		assert_eq!(trail.num_vars(), 4);

		assert_eq!(trail.assign_lit(a), None);
		assert_eq!(trail.assign_lit(a), Some(true));
		assert_eq!(trail.assign_lit(!a), Some(false));
		trail.notify_new_decision_level();
		assert_eq!(trail.decision_level(), 1);
		assert_eq!(trail.assign_lit(!b), None);
		trail.push_undo(PluginRef::new(0), 7);

		assert_eq!(trail.get_sat_value(a), Some(true));
		assert_eq!(trail.get_sat_value(b), Some(false));
		assert_eq!(trail.get_sat_value(Lit::from(BoolVar::new(2))), None);
		assert_eq!(trail.get_sat_value(Lit::from(BoolVar::new(9))), None);
		assert_eq!(trail.position(!b), Some(1));

		assert_eq!(trail.next_propagation(), Some(a));
		assert_eq!(trail.next_propagation(), Some(!b));
		assert_eq!(trail.next_propagation(), None);

		assert_eq!(trail.level_len(0), 1);
		assert_eq!(
			trail.undo(),
			Some(TrailEvent::Undo(PluginRef::new(0), 7))
		);
		assert_eq!(trail.undo(), Some(TrailEvent::SatAssignment(!b)));
		assert_eq!(trail.decision_level(), 0);
		assert_eq!(trail.get_sat_value(b), None);
		assert_eq!(trail.position(b), None);
		assert_eq!(trail.len(), 1);
		assert_eq!(trail.next_propagation(), None);
	}
}
