//! Component E: register bank allocation.
//!
//! Two disjoint banks of caller-saved temporaries: 8 general-purpose
//! (`$t0..$t7`) and 12 single-precision floating (`$ft0..$ft11`,
//! physically the even-numbered `$f` registers per the ABI's
//! allocate-in-pairs convention, though each is used singly here).
//! Allocation is a linear scan for the lowest-numbered free slot,
//! grounded on `other_examples`'s RISC-V backend's bitmap-style
//! caller-saved bookkeeping.

use crate::{
	error::CgError,
	value::{Rvalue, RvalueKind},
};

pub const GPR_COUNT: usize = 8;
pub const FPR_COUNT: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bank {
	Gpr,
	Fpr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Register {
	pub bank: Bank,
	pub index: u8,
}

impl Register {
	/// The assembler mnemonic for this temporary. FPR temporaries are
	/// allocated by logical index but named by their physical
	/// even-numbered register (`$f0, $f2, $f4, ...`), matching the
	/// allocate-in-pairs/use-singly convention from the data model.
	pub fn asm_name(self) -> String {
		match self.bank {
			Bank::Gpr => format!("$t{}", self.index),
			Bank::Fpr => format!("$f{}", self.index * 2),
		}
	}
}

pub struct RegisterBank {
	gpr_busy: [bool; GPR_COUNT],
	fpr_busy: [bool; FPR_COUNT],
}

impl Default for RegisterBank {
	fn default() -> Self {
		Self::new()
	}
}

impl RegisterBank {
	pub fn new() -> Self {
		Self { gpr_busy: [false; GPR_COUNT], fpr_busy: [false; FPR_COUNT] }
	}

	/// Busy bits are reset between functions (data model lifecycle);
	/// allocation within one function is strictly stack-disciplined.
	pub fn reset(&mut self) {
		*self = Self::new();
	}

	pub fn get_gpr(&mut self) -> Result<Register, CgError> {
		Self::allocate(&mut self.gpr_busy, Bank::Gpr)
	}

	pub fn get_fpr(&mut self) -> Result<Register, CgError> {
		Self::allocate(&mut self.fpr_busy, Bank::Fpr)
	}

	fn allocate(busy: &mut [bool], bank: Bank) -> Result<Register, CgError> {
		for (i, slot) in busy.iter_mut().enumerate() {
			if !*slot {
				*slot = true;
				return Ok(Register { bank, index: u8::try_from(i).expect("bank size fits in u8") });
			}
		}
		Err(CgError::RegisterBankExhausted(bank))
	}

	/// No-ops on an already-free register; there is no notion of a
	/// non-temporary register in this bank (preserved registers are
	/// managed directly by the function emitter's prologue/epilogue).
	pub fn free(&mut self, reg: Register) {
		let slot = match reg.bank {
			Bank::Gpr => &mut self.gpr_busy[reg.index as usize],
			Bank::Fpr => &mut self.fpr_busy[reg.index as usize],
		};
		*slot = false;
	}

	/// Frees `rv`'s register iff it holds one and isn't `from_lvalue` —
	/// freeing a named variable's register out from under it would
	/// clobber live state (I6).
	pub fn free_rvalue(&mut self, rv: &Rvalue) {
		if rv.kind == RvalueKind::Register && !rv.from_lvalue {
			if let Some(reg) = rv.register {
				self.free(reg);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use ricc_ast::TypeId;

	#[test]
	fn lowest_numbered_free_register_is_returned_first() {
		let mut bank = RegisterBank::new();
		let a = bank.get_gpr().unwrap();
		let b = bank.get_gpr().unwrap();
		assert_eq!(a.index, 0);
		assert_eq!(b.index, 1);
		bank.free(a);
		let c = bank.get_gpr().unwrap();
		assert_eq!(c.index, 0);
	}

	#[test]
	fn exhaustion_is_an_error() {
		let mut bank = RegisterBank::new();
		for _ in 0..GPR_COUNT {
			bank.get_gpr().unwrap();
		}
		assert_eq!(bank.get_gpr().unwrap_err(), CgError::RegisterBankExhausted(Bank::Gpr));
	}

	#[test]
	fn from_lvalue_rvalues_are_not_freed() {
		let mut bank = RegisterBank::new();
		let reg = bank.get_gpr().unwrap();
		let rv = Rvalue::from_register(TypeId(0), reg, true);
		bank.free_rvalue(&rv);
		// still busy: a second allocation must skip it
		let next = bank.get_gpr().unwrap();
		assert_ne!(next.index, reg.index);
	}

	#[test]
	fn reset_clears_all_busy_bits() {
		let mut bank = RegisterBank::new();
		bank.get_gpr().unwrap();
		bank.get_fpr().unwrap();
		bank.reset();
		assert_eq!(bank.get_gpr().unwrap().index, 0);
		assert_eq!(bank.get_fpr().unwrap().index, 0);
	}
}
