//! The upper bound on the optimal cost, and the clauses that enforce it.

use itertools::Itertools;
use num_traits::{Signed, Zero};
use tracing::debug;

use crate::{
	actions::PluginActions,
	maxsat::{cost::CostTracker, registry::Registry, Weight},
	plugin::ThVar,
};

#[derive(Debug, Clone, Default)]
/// The cost of the best assignment found so far, and the soft constraints that
/// it relaxes.
pub(crate) struct Bound {
	/// Upper bound on the optimal cost. Never increases during a search.
	best_cost: Weight,
	/// The soft constraints relaxed by the best assignment.
	best_guard_set: Vec<ThVar>,
}

impl Bound {
	/// Returns the upper bound on the optimal cost.
	pub(crate) fn best_cost(&self) -> &Weight {
		&self.best_cost
	}

	/// Returns the soft constraints relaxed by the best assignment.
	pub(crate) fn best_guard_set(&self) -> &[ThVar] {
		&self.best_guard_set
	}

	/// Exclude the current (partial) assignment if it can not improve on the
	/// best cost, and record it as the best assignment if it does.
	///
	/// The relaxed soft constraints are ordered by decreasing weight (keeping
	/// the assertion order for equal weights), and the shortest prefix whose
	/// weight reaches the best cost is blocked: at least one of them must be
	/// satisfied. If the current cost is lower than the best cost, then the
	/// current assignment becomes the best, and the best cost becomes the
	/// weight of the blocked prefix.
	///
	/// Returns whether a clause was added.
	pub(crate) fn block(
		&mut self,
		registry: &Registry,
		tracker: &CostTracker,
		actions: &mut dyn PluginActions,
	) -> bool {
		let mut guards = tracker
			.asserted()
			.iter()
			.map(|&v| (registry.weight(v), v))
			.collect_vec();
		guards.sort_by(|(a, _), (b, _)| b.cmp(a));

		let mut sum = Weight::zero();
		let mut k = 0;
		while k < guards.len() && sum < self.best_cost {
			sum += guards[k].0;
			k += 1;
		}
		let blocked = &guards[..k];
		if !blocked.is_empty() {
			let clause = blocked
				.iter()
				.map(|&(_, v)| !registry.guard_lit(v))
				.collect_vec();
			debug!(
				asserted = tracker.asserted().len(),
				blocked = ?blocked.iter().map(|&(_, v)| v.index()).collect_vec(),
				sum = %sum,
				best_cost = %self.best_cost,
				"block relaxed soft constraints"
			);
			actions.add_axiom(clause);
		}
		if tracker.cost() < &self.best_cost {
			debug!(
				cost = %tracker.cost(),
				prev = %self.best_cost,
				bound = %sum,
				"improved solution"
			);
			self.best_guard_set = tracker.asserted().to_vec();
			self.best_cost = sum;
		}
		!blocked.is_empty()
	}

	/// Account for a new soft constraint that is initially assumed to be
	/// relaxed.
	pub(crate) fn extend(&mut self, v: ThVar, weight: &Weight) {
		self.best_cost += weight;
		if weight.is_positive() {
			self.best_guard_set.push(v);
		}
	}
}
