//! Module containing the representation of Boolean variables and literals
//! used by the search engine.

use std::{fmt, ops::Not};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// A Boolean variable or its negation.
///
/// The literal is stored as `2 * var + negated`, which allows it to be used
/// directly as an index in watch lists.
pub struct Lit(u32);

impl Lit {
	/// Create a literal for `var`, which is negated when `is_negated` is set.
	pub fn new(var: BoolVar, is_negated: bool) -> Self {
		Self(((var.raw()) << 1) | u32::from(is_negated))
	}

	/// Returns the variable of the literal.
	pub fn var(self) -> BoolVar {
		BoolVar::from_raw(self.0 >> 1)
	}

	/// Returns whether the literal is the negation of its variable.
	pub fn is_negated(self) -> bool {
		self.0 & 1 == 1
	}

	#[inline]
	/// Index of the literal in structures that store information for both
	/// polarities of every variable.
	pub(crate) fn code(self) -> usize {
		self.0 as usize
	}
}

impl From<BoolVar> for Lit {
	fn from(var: BoolVar) -> Self {
		Lit::new(var, false)
	}
}

impl From<Lit> for i32 {
	/// Returns the DIMACS representation of the literal: variables are numbered
	/// from 1, and negation is represented by a negative sign.
	fn from(lit: Lit) -> Self {
		let v = lit.var().index() as i32 + 1;
		if lit.is_negated() {
			-v
		} else {
			v
		}
	}
}

impl fmt::Display for Lit {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", i32::from(*self))
	}
}

impl Not for Lit {
	type Output = Lit;

	fn not(self) -> Self::Output {
		Lit(self.0 ^ 1)
	}
}

index_vec::define_index_type! {
	/// Identifies a Boolean variable in a [`crate::Solver`].
	pub struct BoolVar = u32;
}
