//! Module containing the central solving infrastructure.

pub(crate) mod encode;
pub(crate) mod engine;
pub(crate) mod lit;

use std::fmt;

use delegate::delegate;
use tracing::debug;

use crate::{
	plugin::{BoxedPlugin, Plugin, PluginKind, PluginRef, PluginStore},
	solver::{
		engine::{clause_db::ClauseKind, Engine, SearchStatistics},
		lit::{BoolVar, Lit},
	},
	term::{TermId, TermStore},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Result of a solving attempt
pub enum SolveResult {
	/// The solver has found a solution.
	Satisfied,
	/// The solver has proven that the problem is unsatisfiable.
	Unsatisfiable,
	/// The solver was interrupted before a result could be reached.
	Unknown,
}

#[derive(Default)]
/// The main solver object: a store of terms and clauses, and a search engine
/// that can be extended with plugins.
pub struct Solver {
	/// The search engine, including the registered plugins.
	pub(crate) engine: Engine,
	/// Callback polled during search to determine whether the search should be
	/// interrupted.
	terminate: Option<Box<dyn FnMut() -> TermSignal>>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Structure holding the options used to configure the search.
pub(crate) struct SolverConfiguration {
	/// The value assigned to a variable when the search branches on it.
	default_phase: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Signal returned by the termination callback of the solver.
pub enum TermSignal {
	/// Continue the search.
	Continue,
	/// Stop the search, which will return [`SolveResult::Unknown`].
	Terminate,
}

impl Solver {
	/// Add a clause over the given literals as a hard constraint.
	///
	/// The clause is removed when the assertion scope in which it was added is
	/// closed.
	pub fn add_clause<I: IntoIterator<Item = Lit>>(&mut self, clause: I) {
		self.engine
			.state
			.add_clause(clause.into_iter().collect(), ClauseKind::Asserted);
	}

	/// Register a plugin with the solver.
	///
	/// # Panics
	///
	/// This method panics if a plugin of the same [`PluginKind`] has already
	/// been registered.
	pub fn add_plugin(&mut self, plugin: BoxedPlugin) -> PluginRef {
		self.register(plugin.into())
	}

	/// Run the search engine on the asserted constraints, consulting all
	/// registered plugins.
	///
	/// After [`SolveResult::Satisfied`], the values of terms in the found
	/// assignment can be retrieved using [`Self::value`].
	pub fn check_sat(&mut self) -> SolveResult {
		let mut never = || TermSignal::Continue;
		let terminate: &mut dyn FnMut() -> TermSignal = match self.terminate.as_mut() {
			Some(cb) => cb.as_mut(),
			None => &mut never,
		};
		self.engine.search(terminate)
	}

	/// Create a copy of the solver with the same constraints, in which every
	/// plugin is replaced by a fresh copy of itself.
	///
	/// The termination callback is not copied.
	///
	/// # Panics
	///
	/// This method panics if any of the registered plugins cannot be copied.
	pub fn fork(&self) -> Solver {
		let engine = Engine {
			plugins: self
				.engine
				.plugins
				.iter()
				.map(PluginStore::fresh_copy)
				.collect(),
			plugin_table: self.engine.plugin_table.clone(),
			state: self.engine.state.clone(),
		};
		Solver {
			engine,
			terminate: None,
		}
	}

	/// Returns the value of a literal in the assignment found by the last
	/// successful search.
	pub fn lit_value(&self, lit: Lit) -> Option<bool> {
		let val = *self.engine.state.model.as_ref()?.get(lit.var())?;
		Some(val != lit.is_negated())
	}

	/// Create a new Boolean variable that is not associated with a term.
	pub fn new_var(&mut self) -> BoolVar {
		self.engine.state.new_var()
	}

	/// Access a registered plugin through the [`Plugin`] trait.
	pub fn plugin(&self, r: PluginRef) -> &dyn Plugin {
		self.engine.plugins[r].as_plugin()
	}

	/// Returns the plugin of the given kind, if one has been registered.
	pub fn plugin_ref(&self, kind: PluginKind) -> Option<PluginRef> {
		self.engine.plugin_table.get(&kind).copied()
	}

	/// Close the innermost assertion scope, removing the clauses asserted
	/// within it.
	///
	/// Returns `false` if no scope was open.
	pub fn pop(&mut self) -> bool {
		let popped = self.engine.state.pop();
		debug!(popped, "pop scope");
		popped
	}

	/// Open a new assertion scope.
	pub fn push(&mut self) {
		debug!("push scope");
		self.engine.state.push();
	}

	/// Register a plugin in the plugin table.
	pub(crate) fn register(&mut self, plugin: PluginStore) -> PluginRef {
		let kind = plugin.as_plugin().kind();
		assert!(
			!self.engine.plugin_table.contains_key(&kind),
			"a plugin of kind {kind:?} has already been registered"
		);
		let r = self.engine.plugins.push(plugin);
		let _ = self.engine.plugin_table.insert(kind, r);
		debug!(?kind, plugin = r.index(), "register plugin");
		r
	}

	/// Access the search statistics for the search process up to this point.
	pub fn search_statistics(&self) -> &SearchStatistics {
		&self.engine.state.statistics
	}

	/// Set a callback function used to indicate a termination requirement to the
	/// solver.
	///
	/// The solver will call this function once during every step of the search
	/// and check its return value.
	///
	/// # Warning
	///
	/// Subsequent calls to this method override the previously set
	/// callback function.
	pub fn set_terminate_callback<F: FnMut() -> TermSignal + 'static>(&mut self, cb: Option<F>) {
		self.terminate = cb.map(|f| Box::new(f) as Box<dyn FnMut() -> TermSignal>);
	}

	/// Access the terms known to the solver.
	pub fn terms(&self) -> &TermStore {
		&self.engine.state.terms
	}

	/// Returns the value of a term in the assignment found by the last
	/// successful search.
	///
	/// Returns `None` if the last search was not successful, or if the term
	/// contains atoms that were not part of the search.
	pub fn value(&self, term: TermId) -> Option<bool> {
		self.engine.state.eval_term(term)
	}

	delegate! {
		to self.engine.state.terms {
			/// Create (or retrieve) the conjunction of the given terms.
			pub fn and<I: IntoIterator<Item = TermId>>(&mut self, terms: I) -> TermId;
			/// Create (or retrieve) the atom with the given name.
			pub fn atom(&mut self, name: &str) -> TermId;
			/// Create (or retrieve) a constant term.
			pub fn constant(&mut self, value: bool) -> TermId;
			/// Create (or retrieve) the equivalence of two terms.
			pub fn equiv(&mut self, a: TermId, b: TermId) -> TermId;
			/// Create a new atom that is distinct from all existing terms.
			pub fn fresh_const(&mut self, prefix: &str) -> TermId;
			/// Create (or retrieve) the implication `a → b`.
			pub fn implies(&mut self, a: TermId, b: TermId) -> TermId;
			/// Create (or retrieve) the negation of a term.
			pub fn not(&mut self, term: TermId) -> TermId;
			/// Create (or retrieve) the disjunction of the given terms.
			pub fn or<I: IntoIterator<Item = TermId>>(&mut self, terms: I) -> TermId;
			/// Create (or retrieve) the exclusive disjunction of two terms.
			pub fn xor(&mut self, a: TermId, b: TermId) -> TermId;
		}
		to self.engine.state {
			/// Assert that `term` holds.
			///
			/// Clauses created for the assertion are removed when the assertion scope
			/// in which it was made is closed.
			pub fn assert_term(&mut self, term: TermId);
			/// Returns the literal that represents `term`, creating it if it does not
			/// yet exist.
			pub fn internalize(&mut self, term: TermId) -> Lit;
			/// Returns the number of Boolean variables in the solver.
			pub fn num_vars(&self) -> usize;
			/// Set the value assigned to a variable when the search branches on it.
			pub fn set_default_phase(&mut self, phase: bool);
		}
	}
}

impl fmt::Debug for Solver {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Solver")
			.field("engine", &self.engine)
			.field("terminate", &self.terminate.is_some())
			.finish()
	}
}

impl SolverConfiguration {
	/// Returns the value assigned to a variable when the search branches on it.
	pub(crate) fn default_phase(&self) -> bool {
		self.default_phase
	}

	/// Set the value assigned to a variable when the search branches on it.
	pub(crate) fn set_default_phase(&mut self, phase: bool) {
		self.default_phase = phase;
	}
}
