//! # wmaxsat - Weighted MaxSAT by Relaxation and Blocking
//!
//! This crate provides a small incremental search engine over propositional
//! terms that can be extended with plugins, together with a plugin that solves
//! weighted MaxSAT problems. Every soft constraint is relaxed by a fresh guard
//! atom. During search the plugin tracks the total weight of the relaxed soft
//! constraints, and adds clauses that exclude any (partial) assignment that
//! cannot improve on the best assignment found so far. When the search space is
//! exhausted, the best assignment is optimal.
//!
//! The [`weighted_maxsat`] function provides the complete procedure for a set
//! of soft formulas, and the [`wcnf`] module reads instances in the weighted
//! DIMACS format.

pub mod actions;
pub mod maxsat;
pub mod plugin;
pub mod solver;
pub mod term;
pub mod wcnf;

pub use crate::{
	maxsat::{
		weighted_maxsat, MaxSatHandle, MaxSatStatistics, PluginPhase, SoftConstraint, Weight,
		WeightedMaxSat,
	},
	plugin::{BoxedPlugin, FinalCheck, Plugin, PluginKind, PluginRef, ThVar},
	solver::{
		engine::SearchStatistics,
		lit::{BoolVar, Lit},
		SolveResult, Solver, TermSignal,
	},
	term::{Term, TermId, TermStore},
	wcnf::{LoadedInstance, WcnfError, WcnfInstance},
};
