//! Registry of the soft constraints known to the weighted MaxSAT plugin.

use std::collections::HashMap;

use index_vec::IndexVec;
use tracing::debug;

use crate::{
	actions::PluginActions,
	maxsat::Weight,
	plugin::ThVar,
	solver::lit::{BoolVar, Lit},
	term::TermId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
/// A formula that should hold, and the weight that is incurred if it does not.
pub struct SoftConstraint {
	/// The formula of the soft constraint.
	formula: TermId,
	/// The cost of violating the formula.
	weight: Weight,
	/// The atom that relaxes the formula: `guard ∨ formula` is asserted.
	guard: TermId,
	/// The Boolean variable of the guard, once it is known to the search
	/// engine.
	bool_var: Option<BoolVar>,
}

#[derive(Debug, Clone, Default)]
/// Append-only storage of soft constraints, indexed by theory variable.
pub(crate) struct Registry {
	/// The soft constraints in the order in which they were asserted.
	soft: IndexVec<ThVar, SoftConstraint>,
	/// Lookup from the Boolean variable of a guard to its theory variable.
	bool2var: HashMap<BoolVar, ThVar>,
}

impl SoftConstraint {
	/// Returns the Boolean variable of the guard, if the soft constraint has
	/// taken part in a search.
	pub fn bool_var(&self) -> Option<BoolVar> {
		self.bool_var
	}

	/// Returns the formula of the soft constraint.
	pub fn formula(&self) -> TermId {
		self.formula
	}

	/// Returns the atom that relaxes the formula.
	pub fn guard(&self) -> TermId {
		self.guard
	}

	/// Returns the cost of violating the formula.
	pub fn weight(&self) -> &Weight {
		&self.weight
	}
}

impl Registry {
	/// Ensure that the guard of every soft constraint is represented by a
	/// Boolean variable that is attached to the calling plugin.
	///
	/// Guards that have already been bound are skipped. Returns the number of
	/// newly bound guards.
	pub(crate) fn bind_variables(&mut self, actions: &mut dyn PluginActions) -> usize {
		let mut bound = 0;
		for (v, sc) in self.soft.iter_mut_enumerated() {
			if sc.bool_var.is_some() {
				continue;
			}
			let lit = actions.internalize(sc.guard);
			debug_assert!(!lit.is_negated(), "guards are atoms");
			actions.attach(lit.var());
			sc.bool_var = Some(lit.var());
			let _ = self.bool2var.insert(lit.var(), v);
			debug!(
				lit = i32::from(lit),
				soft = v.index(),
				guard = %actions.terms().display(sc.guard),
				"bind guard"
			);
			bound += 1;
		}
		bound
	}

	/// Returns the soft constraint of a theory variable.
	pub(crate) fn get(&self, v: ThVar) -> &SoftConstraint {
		&self.soft[v]
	}

	/// Iterate over the soft constraints in the order in which they were
	/// asserted.
	pub(crate) fn iter_enumerated(&self) -> impl Iterator<Item = (ThVar, &SoftConstraint)> + '_ {
		self.soft.iter_enumerated()
	}

	/// Returns the number of soft constraints.
	pub(crate) fn len(&self) -> usize {
		self.soft.len()
	}

	/// Returns the literal that is true when the soft constraint of `v` is
	/// relaxed.
	///
	/// # Panics
	///
	/// This method panics if the guard of `v` has not been bound.
	pub(crate) fn guard_lit(&self, v: ThVar) -> Lit {
		Lit::from(
			self.soft[v]
				.bool_var
				.expect("guard of an asserted soft constraint must be bound"),
		)
	}

	/// Returns the theory variable whose guard is represented by `var`.
	pub(crate) fn lookup(&self, var: BoolVar) -> Option<ThVar> {
		self.bool2var.get(&var).copied()
	}

	/// Append a soft constraint, returning its theory variable.
	pub(crate) fn push(&mut self, formula: TermId, weight: Weight, guard: TermId) -> ThVar {
		self.soft.push(SoftConstraint {
			formula,
			weight,
			guard,
			bool_var: None,
		})
	}

	/// Returns the weight of the soft constraint of `v`.
	pub(crate) fn weight(&self, v: ThVar) -> &Weight {
		&self.soft[v].weight
	}
}
