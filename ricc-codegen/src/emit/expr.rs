//! Component G: the expression emitter. Every node lowers to exactly
//! one of an [`Lvalue`] or an [`Rvalue`]; `emit_expr` always produces
//! the latter, materializing an lvalue through `emit_load_of_lvalue`
//! when a node is naturally addressable (identifier, subscript,
//! member, indirection).

use ricc_ast::{BinOp, Expr, ExprKind, Ident, IncDecOp, Literal, UnOp};

use super::CodeGenerator;
use crate::{
	error::CgError,
	register::{Bank, Register},
	value::{ConstValue, Lvalue, LvalueBase, LvalueKind, Rvalue},
};

impl CodeGenerator<'_> {
	/// Picks the register bank a value of `ty` lives in.
	fn bank_for(&self, ty: ricc_ast::TypeId) -> Bank {
		if self.types.type_is_float(ty) {
			Bank::Fpr
		} else {
			Bank::Gpr
		}
	}

	fn alloc_for(&mut self, ty: ricc_ast::TypeId) -> Result<Register, CgError> {
		match self.bank_for(ty) {
			Bank::Gpr => self.regs.get_gpr(),
			Bank::Fpr => self.regs.get_fpr(),
		}
	}

	fn load_mnemonic(&self, ty: ricc_ast::TypeId) -> &'static str {
		if self.types.type_is_float(ty) {
			"l.s"
		} else {
			"lw"
		}
	}

	fn store_mnemonic(&self, ty: ricc_ast::TypeId) -> &'static str {
		if self.types.type_is_float(ty) {
			"s.s"
		} else {
			"sw"
		}
	}

	fn lvalue_operand(&self, lv: &Lvalue) -> String {
		let base = match lv.base {
			LvalueBase::Fixed(b) => b.asm_name(),
			LvalueBase::Temp(r) => r.asm_name(),
		};
		match lv.kind {
			LvalueKind::Register => base,
			LvalueKind::Stack => format!("{}({base})", lv.offset),
		}
	}

	/// Turns an lvalue into an rvalue in a freshly allocated register,
	/// freeing the lvalue's base register first if it was a computed
	/// temporary (§4.G, "Identifier").
	pub(crate) fn emit_load_of_lvalue(&mut self, lv: &Lvalue) -> Result<Rvalue, CgError> {
		let dest = self.alloc_for(lv.ty)?;
		match lv.kind {
			LvalueKind::Register => {
				let src = self.lvalue_operand(lv);
				self.emit(format!("move {}, {src}", dest.asm_name()));
			}
			LvalueKind::Stack => {
				let operand = self.lvalue_operand(lv);
				self.emit(format!("{} {}, {operand}", self.load_mnemonic(lv.ty), dest.asm_name()));
			}
		}
		if let LvalueBase::Temp(base) = lv.base {
			self.regs.free(base);
		}
		Ok(Rvalue::from_register(lv.ty, dest, false))
	}

	pub(crate) fn emit_store(&mut self, lv: &Lvalue, rv: &Rvalue) -> Result<(), CgError> {
		let src = self.rvalue_to_register(rv)?;
		let operand = self.lvalue_operand(lv);
		match lv.kind {
			LvalueKind::Register => self.emit(format!("move {operand}, {}", src.asm_name())),
			LvalueKind::Stack => self.emit(format!("{} {}, {operand}", self.store_mnemonic(lv.ty), src.asm_name())),
		}
		Ok(())
	}

	/// Materializes any rvalue (constant or register) into a register,
	/// allocating one if the value is currently a `CONST`.
	pub(crate) fn rvalue_to_register(&mut self, rv: &Rvalue) -> Result<Register, CgError> {
		if let Some(reg) = rv.register {
			return Ok(reg);
		}
		let reg = self.alloc_for(rv.ty)?;
		match rv.constant {
			Some(ConstValue::Int(v)) => self.emit(format!("li {}, {v}", reg.asm_name())),
			Some(ConstValue::Float(v)) => self.emit(format!("li.s {}, {v}", reg.asm_name())),
			Some(ConstValue::StringIndex(idx)) => self.load_string_address(reg, idx, 0),
			None => {}
		}
		Ok(reg)
	}

	fn load_string_address(&mut self, dest: Register, string_index: u32, fragment: u32) {
		let label = self.strtab.fragment_label(string_index, fragment).asm_name();
		self.emit(format!("lui {}, %hi({label})", dest.asm_name()));
		self.emit(format!("addiu {}, {}, %lo({label})", dest.asm_name(), dest.asm_name()));
	}

	pub fn emit_expr(&mut self, e: &Expr) -> Result<Rvalue, CgError> {
		match &e.kind {
			ExprKind::Literal(lit) => self.emit_literal(*lit, e.ty),
			ExprKind::Ident(_) => {
				let lv = self.emit_lvalue(e)?;
				self.emit_load_of_lvalue(&lv)
			}
			ExprKind::Unary { op, operand } => self.emit_unary(*op, operand, e.ty),
			ExprKind::IncDec { op, prefix, operand } => self.emit_inc_dec(*op, *prefix, operand),
			ExprKind::Binary { op, lhs, rhs } => self.emit_binary(*op, lhs, rhs, e.ty),
			ExprKind::Assign { compound, lhs, rhs } => self.emit_assign(*compound, lhs, rhs),
			ExprKind::Subscript { .. } | ExprKind::Member { .. } => {
				let lv = self.emit_lvalue(e)?;
				self.emit_load_of_lvalue(&lv)
			}
			ExprKind::Call { callee, args } => self.emit_call(*callee, args, e.ty),
			ExprKind::Printf { format, args } => self.emit_printf(*format, args),
			ExprKind::Cast { to, inner } => self.emit_cast(*to, inner),
			ExprKind::Ternary { cond, then, otherwise } => self.emit_ternary(cond, then, otherwise, e.ty),
		}
	}

	fn emit_literal(&mut self, lit: Literal, ty: ricc_ast::TypeId) -> Result<Rvalue, CgError> {
		Ok(match lit {
			Literal::Int(v) => Rvalue::constant_int(ty, v),
			Literal::Char(c) => Rvalue::constant_int(ty, c as i64),
			Literal::Float(v) => Rvalue::constant_float(ty, v),
			Literal::Str(id) => {
				let idx = self.intern_string(id);
				Rvalue::constant_string(ty, idx)
			}
		})
	}

	/// Computes an expression's address. Only the node kinds that are
	/// naturally addressable reach here.
	pub(crate) fn emit_lvalue(&mut self, e: &Expr) -> Result<Lvalue, CgError> {
		match &e.kind {
			ExprKind::Ident(id) => self.lvalue_of_ident(*id, e.ty),
			ExprKind::Subscript { base, index } => self.emit_subscript_lvalue(base, index, e.ty),
			ExprKind::Member { base, field, arrow } => self.emit_member_lvalue(base, *field, *arrow, e.ty),
			ExprKind::Unary { op: UnOp::Deref, operand } => {
				let rv = self.emit_expr(operand)?;
				let base = self.rvalue_to_register(&rv)?;
				Ok(Lvalue::computed(base, 0, e.ty))
			}
			_ => {
				// Not addressable; callers that need an lvalue here have a
				// malformed AST, which is out of this crate's scope to
				// diagnose (the front end is responsible for that check).
				let rv = self.emit_expr(e)?;
				let reg = self.rvalue_to_register(&rv)?;
				Ok(Lvalue::computed(reg, 0, e.ty))
			}
		}
	}

	fn lvalue_of_ident(&mut self, id: Ident, ty: ricc_ast::TypeId) -> Result<Lvalue, CgError> {
		let entry = self.disp.lookup(id).ok_or(CgError::UnknownMember)?;
		Ok(if entry.on_stack {
			Lvalue::on_stack(entry.base, entry.offset, ty)
		} else {
			Lvalue::register_resident(entry.base, ty)
		})
	}

	fn emit_subscript_lvalue(&mut self, base: &Expr, index: &Expr, ty: ricc_ast::TypeId) -> Result<Lvalue, CgError> {
		let base_lv = self.emit_lvalue(base)?;
		let base_rv = self.emit_load_of_lvalue(&base_lv)?;
		let index_rv = self.emit_expr(index)?;
		let elem_words = self.types.type_size(ty).max(1);
		let addr = self.rvalue_to_register(&base_rv)?;
		match index_rv.as_const_int() {
			Some(k) => {
				let offset = k * i64::from(elem_words) * 4;
				self.emit(format!("addiu {}, {}, {offset}", addr.asm_name(), addr.asm_name()));
			}
			None => {
				let idx_reg = self.rvalue_to_register(&index_rv)?;
				let scale = self.regs.get_gpr()?;
				self.emit(format!("sll {}, {}, {}", scale.asm_name(), idx_reg.asm_name(), (elem_words * 4).trailing_zeros()));
				self.emit(format!("addu {}, {}, {}", addr.asm_name(), addr.asm_name(), scale.asm_name()));
				self.regs.free(scale);
				self.regs.free_rvalue(&index_rv);
			}
		}
		Ok(Lvalue::computed(addr, 0, ty))
	}

	fn emit_member_lvalue(&mut self, base: &Expr, field: Ident, arrow: bool, ty: ricc_ast::TypeId) -> Result<Lvalue, CgError> {
		let struct_ty = base.ty;
		let mut byte_offset = 0u32;
		let mut found = false;
		for member in self.types.members(struct_ty) {
			if member.name == field {
				found = true;
				break;
			}
			byte_offset += self.types.type_size(member.ty) * 4;
		}
		if !found {
			return Err(CgError::UnknownMember);
		}
		let addr = if arrow {
			let base_rv = self.emit_expr(base)?;
			self.rvalue_to_register(&base_rv)?
		} else {
			let base_lv = self.emit_lvalue(base)?;
			match base_lv.base {
				LvalueBase::Temp(r) => r,
				LvalueBase::Fixed(b) => {
					let reg = self.regs.get_gpr()?;
					self.emit(format!("addiu {}, {}, {}", reg.asm_name(), b.asm_name(), base_lv.offset));
					reg
				}
			}
		};
		Ok(Lvalue::computed(addr, byte_offset as i32, ty))
	}

	fn emit_unary(&mut self, op: UnOp, operand: &Expr, ty: ricc_ast::TypeId) -> Result<Rvalue, CgError> {
		match op {
			UnOp::Neg => {
				let zero = Expr { kind: ExprKind::Literal(Literal::Int(0)), ty: operand.ty };
				self.emit_binary(BinOp::Sub, &zero, operand, ty)
			}
			UnOp::BitNot => {
				let minus_one = Expr { kind: ExprKind::Literal(Literal::Int(-1)), ty: operand.ty };
				self.emit_binary(BinOp::BitXor, operand, &minus_one, ty)
			}
			UnOp::LogNot => {
				let rv = self.emit_expr(operand)?;
				let src = self.rvalue_to_register(&rv)?;
				let dest = self.regs.get_gpr()?;
				let end = self.labels.fresh_end();
				self.emit(format!("li {}, 1", dest.asm_name()));
				self.emit(format!("beq {}, $zero, {}", src.asm_name(), end.asm_name()));
				self.emit(format!("li {}, 0", dest.asm_name()));
				self.emit_label(end)?;
				self.regs.free_rvalue(&rv);
				Ok(Rvalue::from_register(ty, dest, false))
			}
			UnOp::Abs => {
				let rv = self.emit_expr(operand)?;
				let src = self.rvalue_to_register(&rv)?;
				let dest = self.regs.get_gpr()?;
				let end = self.labels.fresh_end();
				self.emit(format!("move {}, {}", dest.asm_name(), src.asm_name()));
				self.emit(format!("bgez {}, {}", src.asm_name(), end.asm_name()));
				self.emit(format!("subu {}, $zero, {}", dest.asm_name(), src.asm_name()));
				self.emit_label(end)?;
				self.regs.free_rvalue(&rv);
				Ok(Rvalue::from_register(ty, dest, false))
			}
			UnOp::AddrOf => {
				let lv = self.emit_lvalue(operand)?;
				let dest = self.regs.get_gpr()?;
				match lv.base {
					LvalueBase::Temp(r) if lv.offset == 0 => {
						self.emit(format!("move {}, {}", dest.asm_name(), r.asm_name()));
						self.regs.free(r);
					}
					LvalueBase::Temp(r) => {
						self.emit(format!("addiu {}, {}, {}", dest.asm_name(), r.asm_name(), lv.offset));
						self.regs.free(r);
					}
					LvalueBase::Fixed(b) => {
						self.emit(format!("addiu {}, {}, {}", dest.asm_name(), b.asm_name(), lv.offset));
					}
				}
				Ok(Rvalue::from_register(ty, dest, false))
			}
			UnOp::Deref => {
				let lv = self.emit_lvalue(&Expr { kind: ExprKind::Unary { op: UnOp::Deref, operand: Box::new(operand.clone()) }, ty })?;
				self.emit_load_of_lvalue(&lv)
			}
		}
	}

	fn emit_inc_dec(&mut self, op: IncDecOp, prefix: bool, operand: &Expr) -> Result<Rvalue, CgError> {
		let lv = self.emit_lvalue(operand)?;
		let old = self.emit_load_of_lvalue(&lv)?;
		let old_reg = old.register.expect("load_of_lvalue always yields a register");
		let preserved = if prefix {
			None
		} else {
			let saved = self.regs.get_gpr()?;
			self.emit(format!("move {}, {}", saved.asm_name(), old_reg.asm_name()));
			Some(saved)
		};
		let mnemonic = match op {
			IncDecOp::Inc => "addiu",
			IncDecOp::Dec => "addiu",
		};
		let delta = match op {
			IncDecOp::Inc => 1,
			IncDecOp::Dec => -1,
		};
		self.emit(format!("{mnemonic} {}, {}, {delta}", old_reg.asm_name(), old_reg.asm_name()));
		let updated = Rvalue::from_register(operand.ty, old_reg, false);
		self.emit_store(&lv, &updated)?;
		match preserved {
			Some(reg) => Ok(Rvalue::from_register(operand.ty, reg, false).detached()),
			None => Ok(updated),
		}
	}

	fn emit_binary(&mut self, op: BinOp, lhs: &Expr, rhs: &Expr, ty: ricc_ast::TypeId) -> Result<Rvalue, CgError> {
		if op.is_comparison() {
			return self.emit_comparison(op, lhs, rhs, ty);
		}
		if matches!(op, BinOp::LogAnd | BinOp::LogOr) {
			return self.emit_short_circuit(op, lhs, rhs, ty);
		}
		let left = self.emit_expr(lhs)?;
		let right = self.emit_expr(rhs)?;

		if self.types.type_is_float(ty) {
			let lreg = self.rvalue_to_register(&left)?;
			let rreg = self.rvalue_to_register(&right)?;
			let dest = self.regs.get_fpr()?;
			self.emit(format!("{} {}, {}, {}", float_mnemonic(op), dest.asm_name(), lreg.asm_name(), rreg.asm_name()));
			self.regs.free_rvalue(&left);
			self.regs.free_rvalue(&right);
			return Ok(Rvalue::from_register(ty, dest, false));
		}

		// Exploit commutativity to put a constant on the right; subtraction
		// with a constant left operand has no immediate form and must
		// materialize (§4.G).
		let (left, right) = if left.as_const_int().is_some() && right.as_const_int().is_none() && op.is_commutative() {
			(right, left)
		} else {
			(left, right)
		};

		if let (Some(k), true) = (right.as_const_int(), op.has_immediate_form()) {
			let lreg = self.rvalue_to_register(&left)?;
			let dest = self.regs.get_gpr()?;
			self.emit(format!("{} {}, {}, {k}", immediate_mnemonic(op), dest.asm_name(), lreg.asm_name()));
			self.regs.free_rvalue(&left);
			return Ok(Rvalue::from_register(ty, dest, false));
		}

		let lreg = self.rvalue_to_register(&left)?;
		let rreg = self.rvalue_to_register(&right)?;
		let dest = self.regs.get_gpr()?;
		self.emit(format!("{} {}, {}, {}", register_mnemonic(op), dest.asm_name(), lreg.asm_name(), rreg.asm_name()));
		self.regs.free_rvalue(&left);
		self.regs.free_rvalue(&right);
		Ok(Rvalue::from_register(ty, dest, false))
	}

	fn emit_comparison(&mut self, op: BinOp, lhs: &Expr, rhs: &Expr, ty: ricc_ast::TypeId) -> Result<Rvalue, CgError> {
		let left = self.emit_expr(lhs)?;
		let right = self.emit_expr(rhs)?;
		let lreg = self.rvalue_to_register(&left)?;
		let rreg = self.rvalue_to_register(&right)?;
		let diff = self.regs.get_gpr()?;
		self.emit(format!("subu {}, {}, {}", diff.asm_name(), lreg.asm_name(), rreg.asm_name()));
		self.regs.free_rvalue(&left);
		self.regs.free_rvalue(&right);

		let dest = self.regs.get_gpr()?;
		let end = self.labels.fresh_end();
		let branch = match op {
			BinOp::Eq => "beq",
			BinOp::Ne => "bne",
			BinOp::Lt => "bltz",
			BinOp::Le => "blez",
			BinOp::Gt => "bgtz",
			BinOp::Ge => "bgez",
			_ => unreachable!("is_comparison guards this"),
		};
		self.emit(format!("li {}, 1", dest.asm_name()));
		match op {
			BinOp::Eq | BinOp::Ne => self.emit(format!("{branch} {}, $zero, {}", diff.asm_name(), end.asm_name())),
			_ => self.emit(format!("{branch} {}, {}", diff.asm_name(), end.asm_name())),
		}
		self.emit(format!("li {}, 0", dest.asm_name()));
		self.emit_label(end)?;
		self.regs.free(diff);
		Ok(Rvalue::from_register(ty, dest, false))
	}

	fn emit_short_circuit(&mut self, op: BinOp, lhs: &Expr, rhs: &Expr, ty: ricc_ast::TypeId) -> Result<Rvalue, CgError> {
		let left = self.emit_expr(lhs)?;
		let dest = self.rvalue_to_register(&left)?;
		let end = self.labels.fresh_end();
		let branch = match op {
			BinOp::LogAnd => "beq",
			BinOp::LogOr => "bne",
			_ => unreachable!(),
		};
		self.emit(format!("{branch} {}, $zero, {}", dest.asm_name(), end.asm_name()));
		let right = self.emit_expr(rhs)?;
		let rreg = self.rvalue_to_register(&right)?;
		self.emit(format!("move {}, {}", dest.asm_name(), rreg.asm_name()));
		self.regs.free_rvalue(&right);
		self.emit_label(end)?;
		Ok(Rvalue::from_register(ty, dest, false))
	}

	fn emit_assign(&mut self, compound: Option<BinOp>, lhs: &Expr, rhs: &Expr) -> Result<Rvalue, CgError> {
		let lv = self.emit_lvalue(lhs)?;
		if self.types.type_is_struct(lhs.ty) {
			return self.emit_aggregate_assign(&lv, rhs);
		}
		let rv = self.emit_expr(rhs)?;
		let value = match compound {
			None => rv,
			Some(op) => {
				let current = self.emit_load_of_lvalue(&lv)?;
				let lreg = self.rvalue_to_register(&current)?;
				let rreg = self.rvalue_to_register(&rv)?;
				let dest = self.regs.get_gpr()?;
				self.emit(format!("{} {}, {}, {}", register_mnemonic(op), dest.asm_name(), lreg.asm_name(), rreg.asm_name()));
				self.regs.free_rvalue(&current);
				self.regs.free_rvalue(&rv);
				Rvalue::from_register(lhs.ty, dest, false)
			}
		};
		self.emit_store(&lv, &value)?;
		Ok(value)
	}

	/// Element-wise move for `struct`/`union` assignment: float members
	/// are single-word on this target despite `type_size` reporting 2
	/// (the open-question discrepancy is preserved, not corrected here).
	fn emit_aggregate_assign(&mut self, dest_lv: &Lvalue, rhs: &Expr) -> Result<Rvalue, CgError> {
		let src_lv = self.emit_lvalue(rhs)?;
		let mut byte_offset = 0i32;
		let members: Vec<_> = self.types.members(dest_lv.ty).to_vec();
		for member in &members {
			let elem_lv_dest = Lvalue { offset: dest_lv.offset + byte_offset, ty: member.ty, ..*dest_lv };
			let elem_lv_src = Lvalue { offset: src_lv.offset + byte_offset, ty: member.ty, ..src_lv };
			let rv = self.emit_load_of_lvalue(&elem_lv_src)?;
			self.emit_store(&elem_lv_dest, &rv)?;
			self.regs.free_rvalue(&rv);
			byte_offset += self.types.type_size(member.ty) as i32 * 4;
		}
		Ok(Rvalue::void(dest_lv.ty))
	}

	fn emit_call(&mut self, callee: Ident, args: &[Expr], ret: ricc_ast::TypeId) -> Result<Rvalue, CgError> {
		let argc = args.len() as i32;
		self.emit(format!("addiu $fp, $fp, -{}", argc * 4));
		for (i, arg) in args.iter().enumerate() {
			let rv = self.emit_expr(arg)?;
			let reg = self.rvalue_to_register(&rv)?;
			let is_float = self.types.type_is_float(arg.ty);
			let arg_reg = arg_register_for(i, is_float);
			let store_op = if is_float { "s.s" } else { "sw" };
			self.emit(format!("{store_op} {arg_reg}, {}($fp)", i as i32 * 4));
			let move_op = if is_float { "mov.s" } else { "move" };
			self.emit(format!("{move_op} {arg_reg}, {}", reg.asm_name()));
			self.regs.free_rvalue(&rv);
		}
		self.emit(format!("jal FUNC{}", callee.0));
		for (i, arg) in args.iter().enumerate() {
			let is_float = self.types.type_is_float(arg.ty);
			let arg_reg = arg_register_for(i, is_float);
			let load_op = if is_float { "l.s" } else { "lw" };
			self.emit(format!("{load_op} {arg_reg}, {}($fp)", i as i32 * 4));
		}
		self.emit(format!("addiu $fp, $fp, {}", argc * 4));

		// $v0/$f0 are fixed ABI registers, not slots the bank tracks as
		// busy — copy the result into a freshly allocated temporary right
		// away so a later allocation can't hand out the same physical
		// register while the call's result is still live.
		let is_float = self.types.type_is_float(ret);
		let dest = self.alloc_for(ret)?;
		let (result_reg, mnemonic) = if is_float { ("$f0", "mov.s") } else { ("$v0", "move") };
		self.emit(format!("{mnemonic} {}, {result_reg}", dest.asm_name()));
		Ok(Rvalue::from_register(ret, dest, false))
	}

	/// Splits the format string at registration time: fragment 0 is the
	/// text ahead of the first `%` specifier (printed alone, with no
	/// vararg — it's the only fragment the specifier loop doesn't pair
	/// with an argument), and each subsequent fragment opens with the
	/// specifier that consumes argument `k`. Per argument, loads that
	/// argument's format fragment into `$a0`, marshals the value into
	/// `$a1` (and `$a2` for a float, single→double split via
	/// `mfc1`/`mfhc1`), and calls `printf`.
	fn emit_printf(&mut self, format: ricc_ast::StringId, args: &[Expr]) -> Result<Rvalue, CgError> {
		let string_index = self.intern_string(format);

		self.emit("sw $a0, -4($sp)");
		let a0 = self.regs.get_gpr()?;
		self.load_string_address(a0, string_index, 0);
		self.emit(format!("move $a0, {}", a0.asm_name()));
		self.regs.free(a0);
		self.emit("jal printf");
		self.emit("lw $a0, -4($sp)");

		for (k, arg) in args.iter().enumerate() {
			let fragment = k as u32 + 1;
			self.emit("sw $a0, -4($sp)");
			self.emit("sw $a1, -8($sp)");
			let a0 = self.regs.get_gpr()?;
			self.load_string_address(a0, string_index, fragment);
			self.emit(format!("move $a0, {}", a0.asm_name()));
			self.regs.free(a0);

			let rv = self.emit_expr(arg)?;
			if self.types.type_is_float(arg.ty) {
				self.emit("sw $a2, -12($sp)");
				let f = self.rvalue_to_register(&rv)?;
				self.emit(format!("cvt.d.s $f0, {}", f.asm_name()));
				self.emit("mfc1 $a1, $f0");
				self.emit("mfhc1 $a2, $f0");
				self.regs.free_rvalue(&rv);
				self.emit("jal printf");
				self.emit("lw $a2, -12($sp)");
			} else {
				let reg = self.rvalue_to_register(&rv)?;
				self.emit(format!("move $a1, {}", reg.asm_name()));
				self.regs.free_rvalue(&rv);
				self.emit("jal printf");
			}
			self.emit("lw $a0, -4($sp)");
			self.emit("lw $a1, -8($sp)");
		}
		Ok(Rvalue::void(ricc_ast::TypeId(0)))
	}

	fn emit_cast(&mut self, to: ricc_ast::TypeId, inner: &Expr) -> Result<Rvalue, CgError> {
		let rv = self.emit_expr(inner)?;
		let from_float = self.types.type_is_float(inner.ty);
		let to_float = self.types.type_is_float(to);
		if from_float == to_float {
			// char->int and other same-bank casts are a no-op retype.
			return Ok(Rvalue { ty: to, ..rv });
		}
		let src = self.rvalue_to_register(&rv)?;
		let dest = self.regs.get_fpr()?;
		self.emit(format!("mtc1 {}, {}", src.asm_name(), dest.asm_name()));
		self.emit(format!("cvt.s.w {}, {}", dest.asm_name(), dest.asm_name()));
		self.regs.free_rvalue(&rv);
		Ok(Rvalue::from_register(to, dest, false))
	}

	fn emit_ternary(&mut self, cond: &Expr, then: &Expr, otherwise: &Expr, ty: ricc_ast::TypeId) -> Result<Rvalue, CgError> {
		let cond_rv = self.emit_expr(cond)?;
		let cond_reg = self.rvalue_to_register(&cond_rv)?;
		let else_label = self.labels.fresh_else();
		let end = self.labels.fresh_end();
		self.emit(format!("beq {}, $zero, {}", cond_reg.asm_name(), else_label.asm_name()));
		self.regs.free_rvalue(&cond_rv);

		let dest = self.alloc_for(ty)?;
		let then_rv = self.emit_expr(then)?;
		let then_reg = self.rvalue_to_register(&then_rv)?;
		self.emit(format!("move {}, {}", dest.asm_name(), then_reg.asm_name()));
		self.regs.free_rvalue(&then_rv);
		self.emit(format!("j {}", end.asm_name()));

		self.emit_label(else_label)?;
		let else_rv = self.emit_expr(otherwise)?;
		let else_reg = self.rvalue_to_register(&else_rv)?;
		self.emit(format!("move {}, {}", dest.asm_name(), else_reg.asm_name()));
		self.regs.free_rvalue(&else_rv);
		self.emit_label(end)?;
		Ok(Rvalue::from_register(ty, dest, false))
	}
}

fn immediate_mnemonic(op: BinOp) -> &'static str {
	match op {
		BinOp::Add => "addiu",
		BinOp::BitAnd => "andi",
		BinOp::BitOr => "ori",
		BinOp::BitXor => "xori",
		BinOp::Shl => "sll",
		BinOp::Shr => "srl",
		_ => "addiu",
	}
}

fn float_mnemonic(op: BinOp) -> &'static str {
	match op {
		BinOp::Add => "add.s",
		BinOp::Sub => "sub.s",
		BinOp::Mul => "mul.s",
		BinOp::Div => "div.s",
		_ => "add.s",
	}
}

fn register_mnemonic(op: BinOp) -> &'static str {
	match op {
		BinOp::Add => "addu",
		BinOp::Sub => "subu",
		BinOp::Mul => "mul",
		BinOp::Div => "div",
		BinOp::Mod => "rem",
		BinOp::BitAnd => "and",
		BinOp::BitOr => "or",
		BinOp::BitXor => "xor",
		BinOp::Shl => "sllv",
		BinOp::Shr => "srlv",
		_ => "addu",
	}
}

/// Maps a call argument's position to its ABI register. Floating-point
/// arguments consume two integer slots (`$a2`/`$a3`) even though values
/// are single precision, per the double-precision calling convention.
fn arg_register_for(index: usize, is_float: bool) -> &'static str {
	if is_float {
		match index {
			0 => "$f12",
			_ => "$f14",
		}
	} else {
		match index {
			0 => "$a0",
			1 => "$a1",
			2 => "$a2",
			_ => "$a3",
		}
	}
}

