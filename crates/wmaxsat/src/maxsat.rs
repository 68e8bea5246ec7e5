//! Weighted MaxSAT through relaxation and blocking.
//!
//! Every soft constraint `formula` with weight `w` is relaxed by a fresh guard
//! atom `g`, asserting the hard clause `g ∨ formula`. During search, the
//! [`WeightedMaxSat`] plugin is notified whenever a guard becomes true and
//! keeps track of the total weight of the relaxed soft constraints. Whenever
//! this cost can not improve on the best cost found so far, the plugin adds a
//! clause that requires at least one of the heaviest relaxed soft constraints
//! to hold. When the search space is exhausted, the best assignment found is
//! optimal.

mod bound;
mod cost;
mod registry;

use itertools::Itertools;
use num_rational::BigRational;
use num_traits::Signed;
use tracing::{debug, trace};

pub use crate::maxsat::registry::SoftConstraint;
use crate::{
	actions::PluginActions,
	maxsat::{bound::Bound, cost::CostTracker, registry::Registry},
	plugin::{BoxedPlugin, FinalCheck, Plugin, PluginKind, PluginRef, PluginStore, ThVar},
	solver::lit::BoolVar,
	term::TermId,
	SolveResult, Solver,
};

/// Exact (rational) weight of a soft constraint.
pub type Weight = BigRational;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Typed handle to the weighted MaxSAT plugin registered with a [`Solver`].
pub struct MaxSatHandle(PluginRef);

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
/// Statistics collected by the weighted MaxSAT plugin.
pub struct MaxSatStatistics {
	/// Number of clauses added to exclude relaxed soft constraints
	blocks: u64,
	/// Number of times a partial assignment exceeded the best cost
	early_prunes: u64,
	/// Number of times a better assignment was found
	improvements: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
/// The phase in the lifecycle of the weighted MaxSAT plugin.
pub enum PluginPhase {
	#[default]
	/// No soft constraints have been registered.
	Idle,
	/// Soft constraints are being registered.
	Collecting,
	/// The plugin takes part in a search.
	Searching,
	/// The search has ended, and its result can be extracted.
	Done,
}

#[derive(Debug, Clone, Default)]
/// A plugin that minimises the total weight of the violated soft constraints.
pub struct WeightedMaxSat {
	/// Soft constraints known to the plugin.
	registry: Registry,
	/// Cost of the current assignment.
	tracker: CostTracker,
	/// Best cost found, and the soft constraints it relaxes.
	bound: Bound,
	/// The current phase of the plugin.
	phase: PluginPhase,
	/// Statistics of the plugin.
	statistics: MaxSatStatistics,
}

impl MaxSatHandle {
	/// Relax `formula` by a fresh guard and assert the relaxed clause, making the
	/// formula a soft constraint with the given weight.
	///
	/// Returns the theory variable of the new soft constraint.
	///
	/// # Panics
	///
	/// This method panics if `weight` is negative.
	pub fn assert_soft(self, slv: &mut Solver, formula: TermId, weight: Weight) -> ThVar {
		assert!(!weight.is_negative(), "soft constraint weights must be non-negative");
		let guard = slv.fresh_const("w");
		let relaxed = slv.or([guard, formula]);
		slv.assert_term(relaxed);
		debug!(
			formula = %slv.terms().display(formula),
			guard = %slv.terms().display(guard),
			weight = %weight,
			"assert soft constraint"
		);
		self.get_mut(slv).register_soft(formula, weight, guard)
	}

	/// Access the plugin.
	pub fn get(self, slv: &Solver) -> &WeightedMaxSat {
		match &slv.engine.plugins[self.0] {
			PluginStore::WeightedMaxSat(p) => p,
			PluginStore::Other(_) => unreachable!("handle must refer to the weighted MaxSAT plugin"),
		}
	}

	/// Mutably access the plugin.
	pub fn get_mut(self, slv: &mut Solver) -> &mut WeightedMaxSat {
		match &mut slv.engine.plugins[self.0] {
			PluginStore::WeightedMaxSat(p) => p,
			PluginStore::Other(_) => unreachable!("handle must refer to the weighted MaxSAT plugin"),
		}
	}

	/// Returns the handle to the weighted MaxSAT plugin of the solver,
	/// registering the plugin if the solver does not have one yet.
	///
	/// A plugin that has already been used in a search is reset, such that no
	/// soft constraints or bounds of an earlier problem remain.
	pub fn install(slv: &mut Solver) -> Self {
		let handle = match slv.plugin_ref(PluginKind::WeightedMaxSat) {
			Some(r) => MaxSatHandle(r),
			None => MaxSatHandle(slv.register(PluginStore::WeightedMaxSat(WeightedMaxSat::default()))),
		};
		if matches!(handle.get(slv).phase, PluginPhase::Searching | PluginPhase::Done) {
			handle.reset(slv);
		}
		handle
	}

	/// Returns the handle to the weighted MaxSAT plugin of the solver, if one
	/// has been registered.
	///
	/// In contrast to [`Self::install`], the plugin is not reset, so the result
	/// of the last search can still be inspected.
	pub fn lookup(slv: &Solver) -> Option<Self> {
		slv.plugin_ref(PluginKind::WeightedMaxSat).map(MaxSatHandle)
	}

	/// Returns the reference of the plugin in the plugin table of the solver.
	pub fn plugin_ref(self) -> PluginRef {
		self.0
	}

	/// Discard all soft constraints, costs and bounds of the plugin.
	pub fn reset(self, slv: &mut Solver) {
		self.get_mut(slv).reset();
	}
}

impl MaxSatStatistics {
	/// Returns the number of clauses added to exclude relaxed soft constraints.
	pub fn blocks(&self) -> u64 {
		self.blocks
	}
	/// Returns the number of times a partial assignment was excluded because
	/// its cost exceeded the best cost.
	pub fn early_prunes(&self) -> u64 {
		self.early_prunes
	}
	/// Returns the number of times a better assignment was found.
	pub fn improvements(&self) -> u64 {
		self.improvements
	}
}

impl WeightedMaxSat {
	/// Returns the best cost found, or the total weight of the soft
	/// constraints if no assignment has been found.
	pub fn best_cost(&self) -> &Weight {
		self.bound.best_cost()
	}

	/// Exclude the current assignment if it can not improve on the best cost.
	fn block(&mut self, actions: &mut dyn PluginActions) -> bool {
		let improving = self.tracker.cost() < self.bound.best_cost();
		let blocked = self.bound.block(&self.registry, &self.tracker, actions);
		if improving {
			self.statistics.improvements += 1;
		}
		if blocked {
			self.statistics.blocks += 1;
		}
		blocked
	}

	/// Returns the cost of the current (partial) assignment.
	pub fn current_cost(&self) -> &Weight {
		self.tracker.cost()
	}

	/// Returns the formulas of the soft constraints that are satisfied by the
	/// best assignment found, in the order in which they were asserted.
	pub fn get_assignment(&self) -> Vec<TermId> {
		let mut excluded = self.bound.best_guard_set().to_vec();
		excluded.sort_unstable();
		let mut excluded = excluded.into_iter().peekable();
		self.registry
			.iter_enumerated()
			.filter_map(|(v, sc)| {
				if excluded.peek() == Some(&v) {
					let _ = excluded.next();
					None
				} else {
					Some(sc.formula())
				}
			})
			.collect()
	}

	/// Returns the number of registered soft constraints.
	pub fn len(&self) -> usize {
		self.registry.len()
	}

	/// Returns whether no soft constraints have been registered.
	pub fn is_empty(&self) -> bool {
		self.registry.len() == 0
	}

	/// Returns the current phase of the plugin.
	pub fn phase(&self) -> PluginPhase {
		self.phase
	}

	/// Append a soft constraint whose relaxed clause has been asserted.
	fn register_soft(&mut self, formula: TermId, weight: Weight, guard: TermId) -> ThVar {
		debug_assert!(matches!(
			self.phase,
			PluginPhase::Idle | PluginPhase::Collecting
		));
		self.phase = PluginPhase::Collecting;
		let v = self.registry.push(formula, weight, guard);
		self.bound.extend(v, self.registry.weight(v));
		v
	}

	/// Access a registered soft constraint.
	pub fn soft_constraint(&self, v: ThVar) -> &SoftConstraint {
		self.registry.get(v)
	}

	/// Access the statistics of the plugin.
	pub fn statistics(&self) -> &MaxSatStatistics {
		&self.statistics
	}
}

impl Plugin for WeightedMaxSat {
	fn kind(&self) -> PluginKind {
		PluginKind::WeightedMaxSat
	}

	fn init_search(&mut self, actions: &mut dyn PluginActions) {
		if self.phase != PluginPhase::Collecting {
			trace!(phase = ?self.phase, "plugin inactive during search");
			return;
		}
		let bound = self.registry.bind_variables(actions);
		debug!(
			num_soft = self.registry.len(),
			bound,
			best_cost = %self.bound.best_cost(),
			"start optimisation"
		);
		self.phase = PluginPhase::Searching;
	}

	fn on_assigned(&mut self, actions: &mut dyn PluginActions, var: BoolVar, value: bool) {
		if self.phase != PluginPhase::Searching || !value {
			return;
		}
		let Some(v) = self.registry.lookup(var) else {
			trace!(var = var.index(), "ignore assignment of unknown guard");
			return;
		};
		self.tracker.assign(v, self.registry.weight(v), actions);
		if self.tracker.cost() > self.bound.best_cost() {
			self.statistics.early_prunes += 1;
			let _ = self.block(actions);
		}
	}

	fn final_check(&mut self, actions: &mut dyn PluginActions) -> FinalCheck {
		if self.phase != PluginPhase::Searching {
			return FinalCheck::Done;
		}
		if self.block(actions) {
			FinalCheck::Continue
		} else {
			FinalCheck::Done
		}
	}

	fn undo(&mut self, data: u64) {
		self.tracker.undo(data, &self.registry);
	}

	fn on_search_end(&mut self) {
		debug_assert!(self.tracker.asserted().is_empty());
		if self.phase == PluginPhase::Searching {
			debug!(best_cost = %self.bound.best_cost(), "end optimisation");
			self.phase = PluginPhase::Done;
		}
	}

	fn reset(&mut self) {
		trace!(phase = ?self.phase, "reset plugin");
		self.registry = Registry::default();
		self.tracker.clear();
		self.bound = Bound::default();
		self.phase = PluginPhase::Idle;
	}

	fn builds_models(&self) -> bool {
		false
	}

	fn uses_diseqs(&self) -> bool {
		false
	}

	fn new_eq(&mut self, _: ThVar, _: ThVar) {
		panic!("the weighted MaxSAT plugin does not support equality propagation")
	}

	fn new_diseq(&mut self, _: ThVar, _: ThVar) {
		panic!("the weighted MaxSAT plugin does not support disequality propagation")
	}

	fn fresh_copy(&self) -> BoxedPlugin {
		panic!("the weighted MaxSAT plugin does not support parallel search")
	}

	fn internalize_atom(&mut self, _: TermId) -> bool {
		panic!("the weighted MaxSAT plugin does not internalize terms")
	}
}

/// Find the subset of the soft formulas with the largest total weight that can
/// hold together with the hard constraints asserted in `slv`.
///
/// Returns the status of the search and the selected formulas, in the order
/// in which they were given. The soft constraints are asserted in a new
/// assertion scope, which is closed before returning, so `slv` can be used for
/// further calls.
///
/// When at least one soft constraint is given, exhausting the search space is
/// the expected way for the search to end, and an unsatisfiable result is
/// reported as [`SolveResult::Satisfied`]. Note that this is also the case if
/// the hard constraints themselves are unsatisfiable.
///
/// # Panics
///
/// This function panics if `soft` and `weights` have different lengths, or if
/// a weight is negative.
pub fn weighted_maxsat(
	slv: &mut Solver,
	soft: &[TermId],
	weights: &[Weight],
) -> (SolveResult, Vec<TermId>) {
	let handle = MaxSatHandle::install(slv);
	slv.push();
	for (&formula, weight) in soft.iter().zip_eq(weights) {
		let _ = handle.assert_soft(slv, formula, weight.clone());
	}
	let mut result = slv.check_sat();
	let selected = handle.get(slv).get_assignment();
	let _ = slv.pop();
	if result == SolveResult::Unsatisfiable && !soft.is_empty() {
		result = SolveResult::Satisfied;
	}
	debug!(
		result = ?result,
		selected = selected.len(),
		num_soft = soft.len(),
		best_cost = %handle.get(slv).best_cost(),
		"weighted MaxSAT finished"
	);
	(result, selected)
}

#[cfg(test)]
mod tests {
	use expect_test::expect;
	use itertools::Itertools;
	use tracing_test::traced_test;

	use crate::{
		actions::{InspectionActions, PluginActions, TrailingActions},
		maxsat::{weighted_maxsat, MaxSatHandle, PluginPhase, Weight, WeightedMaxSat},
		plugin::{FinalCheck, Plugin, ThVar},
		solver::lit::{BoolVar, Lit},
		term::{TermId, TermStore},
		SolveResult, Solver,
	};

	/// Create an integer weight.
	fn w(n: i64) -> Weight {
		Weight::from_integer(n.into())
	}

	/// Render the selected formulas using their names.
	fn names(slv: &Solver, selected: &[TermId]) -> String {
		selected
			.iter()
			.map(|&t| slv.terms().display(t).to_string())
			.join(" ")
	}

	#[derive(Debug, Default)]
	/// Minimal implementation of the plugin actions, recording the clauses and
	/// undo commands of the plugin.
	struct MockActions {
		/// Terms used to create guards.
		terms: TermStore,
		/// Undo commands, in the order in which they were recorded.
		undo: Vec<u64>,
		/// Clauses added by the plugin.
		axioms: Vec<Vec<i32>>,
		/// Variables attached to the plugin.
		attached: Vec<BoolVar>,
		/// Number of variables created.
		vars: usize,
	}

	impl InspectionActions for MockActions {
		fn decision_level(&self) -> u32 {
			0
		}
		fn get_bool_val(&self, _: Lit) -> Option<bool> {
			None
		}
	}

	impl TrailingActions for MockActions {
		fn push_undo(&mut self, data: u64) {
			self.undo.push(data);
		}
	}

	impl PluginActions for MockActions {
		fn add_axiom(&mut self, clause: Vec<Lit>) {
			self.axioms.push(clause.into_iter().map(i32::from).collect());
		}
		fn attach(&mut self, var: BoolVar) {
			self.attached.push(var);
		}
		fn internalize(&mut self, _: TermId) -> Lit {
			self.vars += 1;
			Lit::from(BoolVar::new(self.vars - 1))
		}
		fn is_internalized(&self, _: TermId) -> bool {
			false
		}
		fn terms(&self) -> &TermStore {
			&self.terms
		}
	}

	#[test]
	#[traced_test]
	fn test_weighted_maxsat_scenario() {
		let mut slv = Solver::default();
		let a = slv.atom("a");
		let b = slv.atom("b");
		let c = slv.atom("c");
		let na = slv.not(a);
		let nc = slv.not(c);
		let hard = slv.or([na, nc]);
		slv.assert_term(hard);

		let (res, selected) = weighted_maxsat(&mut slv, &[a, b, c], &[w(3), w(1), w(2)]);
		assert_eq!(res, SolveResult::Satisfied);
		expect!["a b"].assert_eq(&names(&slv, &selected));
		let found = MaxSatHandle::lookup(&slv).expect("plugin is registered");
		assert_eq!(found.get(&slv).phase(), PluginPhase::Done);
		assert_eq!(found.get(&slv).best_cost(), &w(2));

		let handle = MaxSatHandle::install(&mut slv);
		// Reinstalling resets the plugin used for the previous problem
		assert_eq!(handle.get(&slv).phase(), PluginPhase::Idle);
		assert!(handle.get(&slv).is_empty());
	}

	#[test]
	fn test_final_bound() {
		let mut slv = Solver::default();
		let a = slv.atom("a");
		let b = slv.atom("b");
		let c = slv.atom("c");
		let na = slv.not(a);
		let nc = slv.not(c);
		let hard = slv.or([na, nc]);
		slv.assert_term(hard);

		let handle = MaxSatHandle::install(&mut slv);
		slv.push();
		for (f, wt) in [(a, 3), (b, 1), (c, 2)] {
			let _ = handle.assert_soft(&mut slv, f, w(wt));
		}
		assert_eq!(handle.get(&slv).best_cost(), &w(6));
		assert_eq!(handle.get(&slv).phase(), PluginPhase::Collecting);
		assert_eq!(slv.check_sat(), SolveResult::Unsatisfiable);
		let plugin = handle.get(&slv);
		assert_eq!(plugin.phase(), PluginPhase::Done);
		assert_eq!(plugin.best_cost(), &w(2));
		assert_eq!(plugin.current_cost(), &w(0));
		assert_eq!(plugin.get_assignment(), vec![a, b]);
		assert_eq!(plugin.soft_constraint(ThVar::new(2)).weight(), &w(2));
		assert!(plugin.soft_constraint(ThVar::new(0)).bool_var().is_some());
		assert!(plugin.statistics().improvements() >= 1);
		assert!(plugin.statistics().blocks() >= plugin.statistics().improvements());
		assert!(slv.pop());
	}

	#[test]
	fn test_no_soft_constraints() {
		let mut slv = Solver::default();
		let a = slv.atom("a");
		slv.assert_term(a);
		assert_eq!(weighted_maxsat(&mut slv, &[], &[]), (SolveResult::Satisfied, Vec::new()));

		let na = slv.not(a);
		slv.assert_term(na);
		assert_eq!(
			weighted_maxsat(&mut slv, &[], &[]),
			(SolveResult::Unsatisfiable, Vec::new())
		);
	}

	#[test]
	fn test_unsatisfiable_hard_constraints() {
		let mut slv = Solver::default();
		let a = slv.atom("a");
		let b = slv.atom("b");
		let f = slv.constant(false);
		slv.assert_term(f);
		let (res, selected) = weighted_maxsat(&mut slv, &[a, b], &[w(1), w(0)]);
		assert_eq!(res, SolveResult::Satisfied);
		// Only the soft constraint of weight 0 is not part of the initial bound
		assert_eq!(selected, vec![b]);
	}

	#[test]
	fn test_zero_weight() {
		let mut slv = Solver::default();
		let a = slv.atom("a");
		let na = slv.not(a);
		slv.assert_term(na);
		let (res, selected) = weighted_maxsat(&mut slv, &[a], &[w(0)]);
		assert_eq!(res, SolveResult::Satisfied);
		assert_eq!(selected, vec![a]);
	}

	#[test]
	fn test_rational_weights() {
		let mut slv = Solver::default();
		let a = slv.atom("a");
		let b = slv.atom("b");
		let c = slv.atom("c");
		let na = slv.not(a);
		let nb = slv.not(b);
		let nc = slv.not(c);
		// At most one of a, b, c
		for (x, y) in [(na, nb), (na, nc), (nb, nc)] {
			let cl = slv.or([x, y]);
			slv.assert_term(cl);
		}
		let half = Weight::new(1.into(), 2.into());
		let third = Weight::new(1.into(), 3.into());
		let (res, selected) = weighted_maxsat(
			&mut slv,
			&[a, b, c],
			&[third.clone(), half, third],
		);
		assert_eq!(res, SolveResult::Satisfied);
		assert_eq!(selected, vec![b]);
	}

	#[test]
	fn test_repeated_calls() {
		let mut slv = Solver::default();
		let a = slv.atom("a");
		let b = slv.atom("b");
		let x = slv.xor(a, b);
		slv.assert_term(x);
		let (_, first) = weighted_maxsat(&mut slv, &[a, b], &[w(1), w(2)]);
		assert_eq!(first, vec![b]);
		let (_, second) = weighted_maxsat(&mut slv, &[a, b], &[w(2), w(1)]);
		assert_eq!(second, vec![a]);
		// Relaxed clauses and blocking clauses of earlier calls are removed
		assert_eq!(slv.check_sat(), SolveResult::Satisfied);
	}

	#[test]
	fn test_optimality() {
		// Hard: a chain of implications, soft: both polarities of every atom
		let mut slv = Solver::default();
		let vars = (0..4).map(|i| slv.atom(&format!("x{i}"))).collect_vec();
		for (&p, &q) in vars.iter().tuple_windows() {
			let imp = slv.implies(p, q);
			slv.assert_term(imp);
		}
		let mut soft = Vec::new();
		let mut ints = Vec::new();
		for (i, &v) in vars.iter().enumerate() {
			let nv = slv.not(v);
			soft.extend([v, nv]);
			ints.extend([i as i64 + 1, 5 - i as i64]);
		}
		let weights = ints.iter().map(|&i| w(i)).collect_vec();
		let (res, selected) = weighted_maxsat(&mut slv, &soft, &weights);
		assert_eq!(res, SolveResult::Satisfied);

		// Brute force the optimal cost
		let cost_of = |assignment: u32| -> Option<i64> {
			let val = |i: usize| assignment & (1 << i) != 0;
			if (0..3).any(|i| val(i) && !val(i + 1)) {
				return None;
			}
			Some(
				(0..4)
					.map(|i| if val(i) { 5 - i as i64 } else { i as i64 + 1 })
					.sum(),
			)
		};
		let optimum = (0..16).filter_map(cost_of).min().unwrap();
		let violated: i64 = soft
			.iter()
			.zip_eq(&ints)
			.filter(|&(t, _)| !selected.contains(t))
			.map(|(_, &i)| i)
			.sum();
		assert_eq!(violated, optimum);

		// The selected soft constraints are consistent with the hard constraints
		slv.push();
		for &t in &selected {
			slv.assert_term(t);
		}
		assert_eq!(slv.check_sat(), SolveResult::Satisfied);
		assert!(slv.pop());
	}

	#[test]
	#[traced_test]
	fn test_plugin_callbacks() {
		let mut actions = MockActions::default();
		let mut terms = TermStore::default();
		let f = (0..3).map(|i| terms.atom(&format!("f{i}"))).collect_vec();
		let g = (0..3).map(|_| terms.fresh_const("w")).collect_vec();
		actions.terms = terms;

		let mut plugin = WeightedMaxSat::default();
		let _ = plugin.register_soft(f[0], w(3), g[0]);
		let _ = plugin.register_soft(f[1], w(1), g[1]);
		let _ = plugin.register_soft(f[2], w(3), g[2]);
		plugin.init_search(&mut actions);
		assert_eq!(actions.attached.len(), 3);
		// Binding is idempotent
		let _ = plugin.registry.bind_variables(&mut actions);
		assert_eq!(actions.attached.len(), 3);

		let v = |i: usize| BoolVar::new(i);
		plugin.on_assigned(&mut actions, v(0), false);
		plugin.on_assigned(&mut actions, v(1), true);
		plugin.on_assigned(&mut actions, v(42), true);
		plugin.on_assigned(&mut actions, v(2), true);
		plugin.on_assigned(&mut actions, v(0), true);
		assert_eq!(plugin.current_cost(), &w(7));
		assert_eq!(actions.undo, vec![0, 1, 2]);
		// 7 does not exceed the initial bound of 7
		assert!(actions.axioms.is_empty());

		// Complete assignment: cost 7 is not an improvement, the heaviest
		// prefix reaching 7 is blocked (ties in assertion order)
		assert_eq!(plugin.final_check(&mut actions), FinalCheck::Continue);
		assert_eq!(actions.axioms, vec![vec![-3, -1, -2]]);
		assert_eq!(plugin.best_cost(), &w(7));

		plugin.undo(1);
		assert_eq!(plugin.current_cost(), &w(1));
		// Cost 1 improves the bound
		assert_eq!(plugin.final_check(&mut actions), FinalCheck::Continue);
		assert_eq!(actions.axioms[1], vec![-2]);
		assert_eq!(plugin.best_cost(), &w(1));
		assert_eq!(plugin.get_assignment(), vec![f[0], f[2]]);

		// Early pruning when the bound is exceeded
		plugin.on_assigned(&mut actions, v(0), true);
		assert_eq!(plugin.current_cost(), &w(4));
		assert_eq!(actions.axioms[2], vec![-1]);
		assert_eq!(plugin.statistics().early_prunes(), 1);
		assert_eq!(plugin.best_cost(), &w(1));

		plugin.undo(0);
		assert_eq!(plugin.final_check(&mut actions), FinalCheck::Done);
		assert_eq!(plugin.best_cost(), &w(0));
		assert_eq!(plugin.get_assignment(), f);
		plugin.on_search_end();
		assert_eq!(plugin.phase(), PluginPhase::Done);

		plugin.reset();
		plugin.reset();
		assert_eq!(plugin.phase(), PluginPhase::Idle);
		assert!(plugin.is_empty());
		assert_eq!(plugin.best_cost(), &w(0));
		assert_eq!(plugin.current_cost(), &w(0));
		assert!(plugin.get_assignment().is_empty());
		assert!(!plugin.builds_models());
		assert!(!plugin.uses_diseqs());
	}

	#[test]
	#[should_panic(expected = "does not support equality propagation")]
	fn test_new_eq_unsupported() {
		WeightedMaxSat::default().new_eq(ThVar::new(0), ThVar::new(1));
	}

	#[test]
	#[should_panic(expected = "does not support parallel search")]
	fn test_fork_unsupported() {
		let mut slv = Solver::default();
		let _ = MaxSatHandle::install(&mut slv);
		let _ = slv.fork();
	}

	#[test]
	#[should_panic(expected = "does not internalize terms")]
	fn test_internalize_atom_unsupported() {
		let mut store = TermStore::default();
		let a = store.atom("a");
		let _ = WeightedMaxSat::default().internalize_atom(a);
	}
}
