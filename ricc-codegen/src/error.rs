//! Error kinds for the code generator, mirroring `ricc_pp::error::PpError`'s
//! shape: a plain `Display` + `std::error::Error` enum, accumulated against
//! diagnostics rather than unwinding (the codegen analogue of §7's
//! "fails are NEVER raised through the call stack" — register exhaustion
//! and frame-layout violations are genuine invariant breaks, though, and
//! those remain `Result::Err`).

use std::fmt;

use crate::register::Bank;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CgError {
	/// Every temporary in a bank was busy when one was requested. The
	/// caller should have spilled; this is an unrecoverable invariant
	/// violation, not a user-facing diagnostic.
	RegisterBankExhausted(Bank),
	/// A label with this exact kind/number was already declared in this
	/// translation unit (data model: "each label declaration appears at
	/// most once").
	DuplicateLabel(String),
	/// `continue`/`break` outside any enclosing loop.
	LoopControlOutsideLoop,
	/// A member reference named a field the type table doesn't know.
	UnknownMember,
}

impl fmt::Display for CgError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::RegisterBankExhausted(bank) => write!(f, "{bank:?} register bank exhausted"),
			Self::DuplicateLabel(name) => write!(f, "label `{name}` declared more than once"),
			Self::LoopControlOutsideLoop => write!(f, "continue/break outside a loop"),
			Self::UnknownMember => write!(f, "reference to an undeclared struct member"),
		}
	}
}

impl std::error::Error for CgError {}
