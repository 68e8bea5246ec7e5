//! Module containing the search engine of the solver.

pub(crate) mod clause_db;
pub(crate) mod solving_context;
pub(crate) mod trail;

use std::collections::HashMap;

use index_vec::IndexVec;
use itertools::Itertools;
use tracing::{debug, trace};

use crate::{
	plugin::{FinalCheck, PluginKind, PluginRef, PluginStore},
	solver::{
		engine::{
			clause_db::{normalize_clause, ClauseDb, ClauseKind, ClauseRef, ClauseStatus},
			solving_context::SolvingContext,
			trail::{Trail, TrailEvent},
		},
		lit::{BoolVar, Lit},
		SolveResult, SolverConfiguration, TermSignal,
	},
	term::{TermId, TermStore},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// A search decision that is currently part of the search path.
pub(crate) struct Decision {
	/// The literal that was assigned by the decision.
	lit: Lit,
	/// Whether the decision is the negation of an earlier decision, whose
	/// subtree has been fully explored.
	flipped: bool,
}

#[derive(Debug, Default)]
/// A search engine that explores the assignments of the Boolean variables, and
/// consults its plugins on every assignment it finds.
pub(crate) struct Engine {
	/// Storage of the registered plugins.
	pub(crate) plugins: IndexVec<PluginRef, PluginStore>,
	/// Lookup of registered plugins by their kind.
	pub(crate) plugin_table: HashMap<PluginKind, PluginRef>,
	/// Internal State representation of the search engine.
	pub(crate) state: State,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
/// Statistics collected by the search engine over all searches.
pub struct SearchStatistics {
	/// Number of conflicts encountered
	conflicts: u64,
	/// Number of search decisions
	decisions: u64,
	/// Number of complete assignments offered to the plugins
	final_checks: u64,
	/// Peak search depth
	peak_depth: u32,
	/// Number of assigned literals whose consequences were propagated
	propagations: u64,
	/// Number of searches started
	searches: u64,
}

#[derive(Clone, Debug, Default)]
/// The state of the search engine that is shared with plugins through
/// [`SolvingContext`].
pub(crate) struct State {
	/// Solver configuration
	pub(crate) config: SolverConfiguration,

	// ---- Term Infrastructure ----
	/// Storage of all terms
	pub(crate) terms: TermStore,
	/// Literals that represent internalised terms
	pub(crate) encoding: HashMap<TermId, Lit>,
	/// Literal that is always true, used to represent constants
	pub(crate) true_lit: Option<Lit>,

	// ---- Search Infrastructure ----
	/// The plugin that is notified of assignments to each Boolean variable
	pub(crate) var_plugin: IndexVec<BoolVar, Option<PluginRef>>,
	/// Trailed Storage of assignments and plugin undo commands
	pub(crate) trail: Trail,
	/// Clause storage
	pub(crate) clauses: ClauseDb,
	/// The decisions on the current search path, one per decision level
	pub(crate) decisions: Vec<Decision>,
	/// Clause that was found to be falsified outside of propagation
	pub(crate) conflict: Option<ClauseRef>,
	/// Number of open assertion scopes when the empty clause was added, if it
	/// was added
	pub(crate) inconsistent: Option<usize>,
	/// Whether the engine is currently searching
	pub(crate) searching: bool,
	/// Assignment found by the last successful search
	pub(crate) model: Option<IndexVec<BoolVar, bool>>,
	/// Solving statistics
	pub(crate) statistics: SearchStatistics,
}

impl Engine {
	/// Undo all changes on the trail until it has length `len`, dispatching
	/// the undo commands of plugins.
	fn undo_to(&mut self, len: usize) {
		while self.state.trail.len() > len {
			match self.state.trail.undo() {
				Some(TrailEvent::Undo(plugin, data)) => {
					trace!(plugin = plugin.index(), data, "undo plugin change");
					self.plugins[plugin].as_plugin_mut().undo(data);
				}
				Some(TrailEvent::SatAssignment(_)) => {}
				None => break,
			}
		}
	}

	/// Backtrack to decision level `level`.
	fn backtrack(&mut self, level: u32) {
		let len = self.state.trail.level_len(level);
		self.undo_to(len);
		self.state.decisions.truncate(level as usize);
		debug_assert_eq!(self.state.trail.decision_level(), level);
	}

	/// Call the completion check of the plugins on the current (complete)
	/// assignment.
	///
	/// Returns `true` if all plugins accept the assignment.
	fn final_check(&mut self) -> bool {
		self.state.statistics.final_checks += 1;
		let Self { plugins, state, .. } = self;
		for (r, p) in plugins.iter_mut_enumerated() {
			let mut ctx = SolvingContext::new(state, r);
			if p.as_plugin_mut().final_check(&mut ctx) == FinalCheck::Continue {
				debug_assert!(
					state.conflict.is_some() || state.inconsistent.is_some(),
					"plugin requested continuation without excluding the current assignment"
				);
				return false;
			}
		}
		true
	}

	/// Propagate the consequences of all assignments that have not yet been
	/// processed, notifying plugins of the assignments to their variables.
	///
	/// Returns the falsified clause if a conflict is found.
	fn propagate(&mut self) -> Result<(), ClauseRef> {
		let Self { plugins, state, .. } = self;
		loop {
			if let Some(conflict) = state.conflict.take() {
				return Err(conflict);
			}
			let Some(lit) = state.trail.next_propagation() else {
				return Ok(());
			};
			state.statistics.propagations += 1;
			if let Some(r) = state.var_plugin[lit.var()] {
				let mut ctx = SolvingContext::new(state, r);
				plugins[r]
					.as_plugin_mut()
					.on_assigned(&mut ctx, lit.var(), !lit.is_negated());
				if let Some(conflict) = state.conflict.take() {
					return Err(conflict);
				}
			}
			state.clauses.propagate(&mut state.trail, lit)?;
		}
	}

	/// Resolve a conflict by flipping the most recent decision that has not yet
	/// been flipped.
	///
	/// Decisions are flipped until the conflicting clause is no longer
	/// falsified. Returns `false` if no decision can be flipped, in which case
	/// the problem is unsatisfiable.
	fn resolve_conflict(&mut self, conflict: ClauseRef) -> bool {
		loop {
			let Some(idx) = self.state.decisions.iter().rposition(|d| !d.flipped) else {
				return false;
			};
			let lit = !self.state.decisions[idx].lit;
			self.backtrack(idx as u32);
			self.state.trail.notify_new_decision_level();
			let prev = self.state.trail.assign_lit(lit);
			debug_assert_eq!(prev, None);
			self.state.decisions.push(Decision { lit, flipped: true });
			debug!(
				lit = i32::from(lit),
				level = self.state.trail.decision_level(),
				"flip decision"
			);

			self.state.clauses.detach(conflict);
			match self.state.clauses.attach(conflict, &self.state.trail) {
				ClauseStatus::Conflict => continue,
				ClauseStatus::Unit(l) => {
					let _ = self.state.trail.assign_lit(l);
				}
				ClauseStatus::Open => {}
			}
			return true;
		}
	}

	/// Run the search process until a satisfying assignment accepted by all
	/// plugins is found, the problem is proven unsatisfiable, or `terminate`
	/// requests the search to stop.
	///
	/// All changes made during the search are undone before this method
	/// returns.
	#[tracing::instrument(level = "debug", skip_all, fields(search = self.state.statistics.searches + 1))]
	pub(crate) fn search(&mut self, terminate: &mut dyn FnMut() -> TermSignal) -> SolveResult {
		debug_assert!(!self.state.searching);
		debug_assert_eq!(self.state.trail.len(), 0);
		self.state.statistics.searches += 1;
		self.state.model = None;

		let Self { plugins, state, .. } = self;
		for (r, p) in plugins.iter_mut_enumerated() {
			let mut ctx = SolvingContext::new(state, r);
			p.as_plugin_mut().init_search(&mut ctx);
		}
		self.state.start_search();

		let result = self.search_loop(terminate);

		self.undo_to(0);
		self.state.decisions.clear();
		self.state.conflict = None;
		self.state.searching = false;
		for p in self.plugins.iter_mut() {
			p.as_plugin_mut().on_search_end();
		}
		debug!(result = ?result, "search finished");
		result
	}

	/// Main loop of the search process.
	fn search_loop(&mut self, terminate: &mut dyn FnMut() -> TermSignal) -> SolveResult {
		loop {
			if self.state.inconsistent.is_some() {
				return SolveResult::Unsatisfiable;
			}
			if terminate() == TermSignal::Terminate {
				debug!("search terminated");
				return SolveResult::Unknown;
			}
			if let Err(conflict) = self.propagate() {
				self.state.statistics.conflicts += 1;
				trace!(
					clause = ?self.state.clauses.get(conflict).iter().map(|&l| i32::from(l)).collect_vec(),
					level = self.state.trail.decision_level(),
					"conflict"
				);
				if !self.resolve_conflict(conflict) {
					return SolveResult::Unsatisfiable;
				}
				continue;
			}
			if let Some(var) = self.state.next_decision_var() {
				self.state.decide(var);
				continue;
			}
			if self.final_check() {
				self.state.record_model();
				return SolveResult::Satisfied;
			}
		}
	}
}

impl SearchStatistics {
	/// Returns the number of conflicts encountered during the search.
	pub fn conflicts(&self) -> u64 {
		self.conflicts
	}
	/// Returns the number of search decisions made.
	pub fn decisions(&self) -> u64 {
		self.decisions
	}
	/// Returns the number of complete assignments that were checked by the
	/// plugins.
	pub fn final_checks(&self) -> u64 {
		self.final_checks
	}
	/// Returns the peak depth of the search tree.
	pub fn peak_depth(&self) -> u32 {
		self.peak_depth
	}
	/// Returns the number of assignments whose consequences were propagated.
	pub fn propagations(&self) -> u64 {
		self.propagations
	}
	/// Returns the number of searches that were started.
	pub fn searches(&self) -> u64 {
		self.searches
	}
}

impl State {
	/// Add a clause to the search engine.
	///
	/// During search, the clause is immediately checked against the current
	/// assignment: a falsified clause is recorded as the conflict, and a unit
	/// clause propagates its remaining literal.
	pub(crate) fn add_clause(&mut self, lits: Vec<Lit>, kind: ClauseKind) {
		let Some(lits) = normalize_clause(lits) else {
			return;
		};
		if lits.is_empty() {
			debug!(?kind, "add empty clause");
			if self.inconsistent.is_none() {
				self.inconsistent = Some(self.clauses.scope_depth());
			}
			return;
		}
		trace!(clause = ?lits.iter().map(|&l| i32::from(l)).collect_vec(), ?kind, "add clause");
		let cref = self.clauses.push(lits, kind);
		if self.searching {
			match self.clauses.attach(cref, &self.trail) {
				ClauseStatus::Conflict => {
					if self.conflict.is_none() {
						self.conflict = Some(cref);
					}
				}
				ClauseStatus::Unit(lit) => {
					let _ = self.trail.assign_lit(lit);
				}
				ClauseStatus::Open => {}
			}
		}
	}

	/// Make a search decision on `var`, using the configured default phase.
	fn decide(&mut self, var: BoolVar) {
		let lit = Lit::new(var, !self.config.default_phase());
		self.trail.notify_new_decision_level();
		let prev = self.trail.assign_lit(lit);
		debug_assert_eq!(prev, None);
		self.decisions.push(Decision {
			lit,
			flipped: false,
		});
		self.statistics.decisions += 1;
		self.statistics.peak_depth = self.statistics.peak_depth.max(self.trail.decision_level());
		trace!(
			lit = i32::from(lit),
			level = self.trail.decision_level(),
			"decide"
		);
	}

	/// Returns the number of Boolean variables.
	pub(crate) fn num_vars(&self) -> usize {
		self.var_plugin.len()
	}

	/// Create a new Boolean variable.
	pub(crate) fn new_var(&mut self) -> BoolVar {
		let var = self.var_plugin.push(None);
		self.trail.grow_to_boolvar(var);
		var
	}

	/// Select the next variable to branch on: the unassigned variable with the
	/// lowest index.
	fn next_decision_var(&self) -> Option<BoolVar> {
		self.var_plugin
			.indices()
			.find(|&v| self.trail.get_sat_value(Lit::from(v)).is_none())
	}

	/// Close the innermost assertion scope.
	pub(crate) fn pop(&mut self) -> bool {
		debug_assert!(!self.searching);
		if !self.clauses.pop_scope() {
			return false;
		}
		if self
			.inconsistent
			.is_some_and(|depth| depth > self.clauses.scope_depth())
		{
			self.inconsistent = None;
		}
		true
	}

	/// Open a new assertion scope.
	pub(crate) fn push(&mut self) {
		debug_assert!(!self.searching);
		self.clauses.push_scope();
	}

	/// Store the current (complete) assignment as the model.
	fn record_model(&mut self) {
		let model: IndexVec<BoolVar, bool> = self
			.var_plugin
			.indices()
			.map(|v| self.trail.get_sat_value(Lit::from(v)).unwrap_or(false))
			.collect();
		trace!(
			model = ?model.iter_enumerated().map(|(v, &b)| i32::from(Lit::new(v, !b))).collect_vec(),
			"record model"
		);
		self.model = Some(model);
	}

	/// Set the polarity that is used when making search decisions.
	pub(crate) fn set_default_phase(&mut self, phase: bool) {
		self.config.set_default_phase(phase);
	}

	/// Prepare the clause database and the trail for a new search, and assign
	/// the literals of all unit clauses.
	fn start_search(&mut self) {
		self.searching = true;
		self.conflict = None;
		self.clauses.rebuild_watches(self.num_vars());
		let units = self.clauses.units().collect_vec();
		for (cref, lit) in units {
			if self.trail.assign_lit(lit) == Some(false) {
				trace!(lit = i32::from(lit), "root conflict");
				self.conflict = Some(cref);
				return;
			}
		}
	}
}
