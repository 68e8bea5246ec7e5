//! Module containing the interface through which theory plugins take part in
//! the search process of the [`crate::Solver`].

use std::fmt::Debug;

use crate::{
	actions::PluginActions,
	maxsat::WeightedMaxSat,
	solver::lit::BoolVar,
	term::TermId,
};

/// Type alias for a plugin stored as a trait object.
pub type BoxedPlugin = Box<dyn Plugin>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Result of the completion check of a plugin.
pub enum FinalCheck {
	/// The plugin has added clauses that exclude the current assignment, and
	/// the search has to continue.
	Continue,
	/// The plugin accepts the current assignment.
	Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Identifier used to ensure that at most one plugin of each kind is registered
/// with a solver.
pub enum PluginKind {
	/// The weighted MaxSAT plugin.
	WeightedMaxSat,
	/// A user defined plugin.
	Named(&'static str),
}

#[derive(Debug)]
/// Storage of a registered plugin.
///
/// Plugins provided by this crate are stored by value, so that they can be
/// accessed using their concrete type.
pub(crate) enum PluginStore {
	/// The weighted MaxSAT plugin.
	WeightedMaxSat(WeightedMaxSat),
	/// A plugin that is only known through the [`Plugin`] trait.
	Other(BoxedPlugin),
}

/// A trait for a theory plugin that takes part in the search process.
///
/// The search engine notifies the plugin of the assignments to the Boolean
/// variables it has attached itself to (see [`PluginActions::attach`]), and
/// asks the plugin to check every complete assignment. The plugin can add
/// clauses at any time to exclude (partial) assignments.
///
/// Plugins that record undo commands (see
/// [`crate::actions::TrailingActions::push_undo`]) must implement
/// [`Plugin::undo`].
pub trait Plugin: Debug {
	/// Returns the kind of the plugin.
	fn kind(&self) -> PluginKind;

	/// Called by the search engine before the start of each search.
	fn init_search(&mut self, actions: &mut dyn PluginActions) {
		let _ = actions;
	}

	/// Called when a Boolean variable attached to the plugin is assigned.
	fn on_assigned(&mut self, actions: &mut dyn PluginActions, var: BoolVar, value: bool) {
		let _ = actions;
		let _ = var;
		let _ = value;
	}

	/// Called when the search engine has found a complete assignment.
	fn final_check(&mut self, actions: &mut dyn PluginActions) -> FinalCheck {
		let _ = actions;
		FinalCheck::Done
	}

	/// Undo the change recorded with the given `data`.
	fn undo(&mut self, data: u64) {
		let _ = data;
		// Method will only be called if the plugin recorded undo commands.
		panic!("plugin did not provide an undo implementation")
	}

	/// Called when the search process has ended and all its changes have been
	/// undone.
	fn on_search_end(&mut self) {}

	/// Discard all problem specific state of the plugin.
	fn reset(&mut self) {}

	/// Returns whether the plugin contributes values to models.
	fn builds_models(&self) -> bool {
		false
	}

	/// Returns whether the plugin needs to be notified of disequalities
	/// between its theory variables.
	fn uses_diseqs(&self) -> bool {
		false
	}

	/// Notification that two theory variables of the plugin are equal.
	fn new_eq(&mut self, a: ThVar, b: ThVar);

	/// Notification that two theory variables of the plugin are distinct.
	fn new_diseq(&mut self, a: ThVar, b: ThVar);

	/// Create a copy of the plugin without any search state, to be used in a
	/// forked solver.
	fn fresh_copy(&self) -> BoxedPlugin;

	/// Create the internal representation of a term that belongs to the theory
	/// of the plugin.
	///
	/// Returns whether the term was accepted.
	fn internalize_atom(&mut self, term: TermId) -> bool;
}

impl PluginStore {
	/// Access the stored plugin through the [`Plugin`] trait.
	pub(crate) fn as_plugin(&self) -> &dyn Plugin {
		match self {
			PluginStore::WeightedMaxSat(p) => p,
			PluginStore::Other(p) => p.as_ref(),
		}
	}

	/// Mutably access the stored plugin through the [`Plugin`] trait.
	pub(crate) fn as_plugin_mut(&mut self) -> &mut dyn Plugin {
		match self {
			PluginStore::WeightedMaxSat(p) => p,
			PluginStore::Other(p) => p.as_mut(),
		}
	}

	/// Create a copy of the plugin for a forked solver.
	pub(crate) fn fresh_copy(&self) -> PluginStore {
		match self {
			PluginStore::WeightedMaxSat(p) => PluginStore::Other(p.fresh_copy()),
			PluginStore::Other(p) => PluginStore::Other(p.fresh_copy()),
		}
	}
}

impl From<BoxedPlugin> for PluginStore {
	fn from(plugin: BoxedPlugin) -> Self {
		PluginStore::Other(plugin)
	}
}

index_vec::define_index_type! {
	/// Reference type for plugins registered with a solver.
	pub struct PluginRef = u32;
}

index_vec::define_index_type! {
	/// Identifies a variable in the theory of a plugin.
	pub struct ThVar = u32;
}
