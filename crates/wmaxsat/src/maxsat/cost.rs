//! Incremental tracking of the cost of the current (partial) assignment.

use num_traits::Zero;
use tracing::trace;

use crate::{actions::TrailingActions, maxsat::registry::Registry, maxsat::Weight, plugin::ThVar};

#[derive(Debug, Clone, Default)]
/// The cost of the soft constraints that are relaxed by the current assignment.
///
/// It is maintained that `cost` is the sum of the weights of the soft
/// constraints in `asserted` whenever control returns to the search engine.
pub(crate) struct CostTracker {
	/// Sum of the weights of the relaxed soft constraints.
	cost: Weight,
	/// The relaxed soft constraints, in the order in which their guards were
	/// assigned.
	asserted: Vec<ThVar>,
}

impl CostTracker {
	/// Returns the relaxed soft constraints.
	pub(crate) fn asserted(&self) -> &[ThVar] {
		&self.asserted
	}

	/// Record that the guard of `v` has become true.
	///
	/// An undo command is recorded on the trail that restores the state from
	/// before the assignment.
	pub(crate) fn assign(&mut self, v: ThVar, weight: &Weight, actions: &mut dyn TrailingActions) {
		actions.push_undo(self.asserted.len() as u64);
		self.cost += weight;
		self.asserted.push(v);
		trace!(soft = v.index(), cost = %self.cost, "relax soft constraint");
	}

	/// Forget all relaxed soft constraints.
	pub(crate) fn clear(&mut self) {
		self.cost = Weight::zero();
		self.asserted.clear();
	}

	/// Returns the current cost.
	pub(crate) fn cost(&self) -> &Weight {
		&self.cost
	}

	/// Restore the state from before the assignment that recorded `data`.
	pub(crate) fn undo(&mut self, data: u64, registry: &Registry) {
		let len = data as usize;
		debug_assert!(len <= self.asserted.len());
		for v in self.asserted.drain(len..) {
			self.cost -= registry.weight(v);
		}
		trace!(cost = %self.cost, "restore cost");
	}
}
