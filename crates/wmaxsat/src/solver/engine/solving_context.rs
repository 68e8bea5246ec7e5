//! Module containing the context in which plugin callbacks are executed.

use crate::{
	actions::{InspectionActions, PluginActions, TrailingActions},
	plugin::PluginRef,
	solver::{
		engine::{clause_db::ClauseKind, State},
		lit::{BoolVar, Lit},
	},
	term::{TermId, TermStore},
};

#[derive(Debug)]
/// Gives a plugin access to the state of the search engine during one of its
/// callbacks.
pub(crate) struct SolvingContext<'a> {
	/// The plugin that is currently being called.
	pub(crate) plugin: PluginRef,
	/// Internal State representation of the search engine.
	pub(crate) state: &'a mut State,
}

impl<'a> SolvingContext<'a> {
	/// Create a new context for callbacks of `plugin`.
	pub(crate) fn new(state: &'a mut State, plugin: PluginRef) -> Self {
		Self { plugin, state }
	}
}

impl InspectionActions for SolvingContext<'_> {
	fn decision_level(&self) -> u32 {
		self.state.trail.decision_level()
	}

	fn get_bool_val(&self, lit: Lit) -> Option<bool> {
		self.state.trail.get_sat_value(lit)
	}
}

impl PluginActions for SolvingContext<'_> {
	fn add_axiom(&mut self, clause: Vec<Lit>) {
		self.state.add_clause(clause, ClauseKind::Axiom);
	}

	fn attach(&mut self, var: BoolVar) {
		let prev = self.state.var_plugin[var].replace(self.plugin);
		debug_assert!(
			prev.is_none() || prev == Some(self.plugin),
			"variable {var:?} is already attached to another plugin"
		);
	}

	fn internalize(&mut self, term: TermId) -> Lit {
		self.state.internalize(term)
	}

	fn is_internalized(&self, term: TermId) -> bool {
		self.state.encoding.contains_key(&term)
	}

	fn terms(&self) -> &TermStore {
		&self.state.terms
	}
}

impl TrailingActions for SolvingContext<'_> {
	fn push_undo(&mut self, data: u64) {
		self.state.trail.push_undo(self.plugin, data);
	}
}
