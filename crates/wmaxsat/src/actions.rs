//! Traits that encapsulate different sets of actions that can be performed by
//! plugins during the different phases of the search process.

use crate::{
	solver::lit::{BoolVar, Lit},
	term::{TermId, TermStore},
};

/// Actions that can be performed to inspect the current state of the search.
pub trait InspectionActions {
	/// Returns the current decision level of the search.
	fn decision_level(&self) -> u32;

	/// Get the current value of a literal, or `None` if it is unassigned.
	fn get_bool_val(&self, lit: Lit) -> Option<bool>;
}

/// Actions that allow a plugin to record changes that have to be undone when
/// the search backtracks.
pub trait TrailingActions: InspectionActions {
	/// Record an undo command on the trail of the search engine.
	///
	/// When the search backtracks past the current point, the calling plugin's
	/// [`crate::plugin::Plugin::undo`] method is called with `data`. Undo
	/// commands are replayed in the reverse order in which they were recorded.
	fn push_undo(&mut self, data: u64);
}

/// Actions that can be performed by a plugin from within the callbacks of the
/// search engine.
pub trait PluginActions: TrailingActions {
	/// Add a clause that is implied by the problem (and the plugin's
	/// reasoning) to the search engine.
	///
	/// If the clause is falsified by the current assignment, then the search
	/// engine will backtrack.
	fn add_axiom(&mut self, clause: Vec<Lit>);

	/// Ensure that the calling plugin is notified of all assignments to `var`.
	fn attach(&mut self, var: BoolVar);

	/// Returns the literal that represents the truth value of `term`, creating
	/// it if it does not yet exist.
	fn internalize(&mut self, term: TermId) -> Lit;

	/// Returns whether `term` is already represented by a literal.
	fn is_internalized(&self, term: TermId) -> bool;

	/// Access the terms known to the search engine.
	fn terms(&self) -> &TermStore;
}
