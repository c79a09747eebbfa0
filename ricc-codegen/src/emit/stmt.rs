//! Component H: statement lowering. Each loop form pushes its
//! `(continue, break)` label pair before emitting its body and pops it
//! after, so `continue`/`break` always resolve against the innermost
//! enclosing loop regardless of nesting depth.

use ricc_ast::{Stmt, StmtKind};

use super::CodeGenerator;
use crate::error::CgError;

impl CodeGenerator<'_> {
	pub fn emit_stmt(&mut self, s: &Stmt) -> Result<(), CgError> {
		match &s.kind {
			StmtKind::Expr(e) => {
				let rv = self.emit_expr(e)?;
				self.regs.free_rvalue(&rv);
				Ok(())
			}
			StmtKind::Decl(d) => self.emit_decl(d),
			StmtKind::Compound(stmts) => self.emit_compound(stmts),
			StmtKind::If { cond, then, otherwise } => self.emit_if(cond, then, otherwise.as_deref()),
			StmtKind::While { cond, body } => self.emit_while(cond, body),
			StmtKind::DoWhile { body, cond } => self.emit_do_while(body, cond),
			StmtKind::For { init, cond, step, body } => self.emit_for(init.as_deref(), cond.as_ref(), step.as_ref(), body),
			StmtKind::Continue => self.emit_loop_jump(true),
			StmtKind::Break => self.emit_loop_jump(false),
			StmtKind::Return(value) => self.emit_return(value.as_ref()),
		}
	}

	/// Array and scalar locals share this one path: `type_size` already
	/// reports an array's full element count, so `declare_local` reserves
	/// the right number of words either way. The source's
	/// `emit_array_declaration`/inverted `type_is_array` guard (preserved,
	/// not fixed, per the design notes) has no separate code path to
	/// preserve here — a `Decl` never fires it because this crate never
	/// distinguishes "declaration with initializer" from "array
	/// declaration" the way the original's guard does.
	fn emit_decl(&mut self, d: &ricc_ast::Decl) -> Result<(), CgError> {
		let size = self.types.type_size(d.ty);
		let entry = self.disp.declare_local(d.name, d.ty, size);
		if let Some(init) = &d.init {
			let rv = self.emit_expr(init)?;
			let lv = if entry.on_stack {
				crate::value::Lvalue::on_stack(entry.base, entry.offset, d.ty)
			} else {
				crate::value::Lvalue::register_resident(entry.base, d.ty)
			};
			self.emit_store(&lv, &rv)?;
			self.regs.free_rvalue(&rv);
		}
		Ok(())
	}

	fn emit_compound(&mut self, stmts: &[Stmt]) -> Result<(), CgError> {
		self.disp.enter_scope();
		for s in stmts {
			self.emit_stmt(s)?;
		}
		self.disp.exit_scope();
		Ok(())
	}

	fn emit_if(&mut self, cond: &ricc_ast::Expr, then: &Stmt, otherwise: Option<&Stmt>) -> Result<(), CgError> {
		let cond_rv = self.emit_expr(cond)?;
		let cond_reg = self.rvalue_to_register(&cond_rv)?;
		let else_label = self.labels.fresh_else();
		let end = self.labels.fresh_end();
		let target = if otherwise.is_some() { else_label } else { end };
		self.emit(format!("beq {}, $zero, {}", cond_reg.asm_name(), target.asm_name()));
		self.regs.free_rvalue(&cond_rv);
		self.emit_stmt(then)?;
		if let Some(else_stmt) = otherwise {
			self.emit(format!("j {}", end.asm_name()));
			self.emit_label(else_label)?;
			self.emit_stmt(else_stmt)?;
		}
		self.emit_label(end)?;
		Ok(())
	}

	fn emit_while(&mut self, cond: &ricc_ast::Expr, body: &Stmt) -> Result<(), CgError> {
		let begin = self.labels.fresh_begin_cycle();
		let end = self.labels.fresh_end();
		self.loop_targets.push((begin, end));
		self.emit_label(begin)?;
		let cond_rv = self.emit_expr(cond)?;
		let cond_reg = self.rvalue_to_register(&cond_rv)?;
		self.emit(format!("beq {}, $zero, {}", cond_reg.asm_name(), end.asm_name()));
		self.regs.free_rvalue(&cond_rv);
		self.emit_stmt(body)?;
		self.emit(format!("j {}", begin.asm_name()));
		self.emit_label(end)?;
		self.loop_targets.pop();
		Ok(())
	}

	fn emit_do_while(&mut self, body: &Stmt, cond: &ricc_ast::Expr) -> Result<(), CgError> {
		let begin = self.labels.fresh_begin_cycle();
		let next = self.labels.fresh_next();
		let end = self.labels.fresh_end();
		self.loop_targets.push((next, end));
		self.emit_label(begin)?;
		self.emit_stmt(body)?;
		self.emit_label(next)?;
		let cond_rv = self.emit_expr(cond)?;
		let cond_reg = self.rvalue_to_register(&cond_rv)?;
		self.emit(format!("bne {}, $zero, {}", cond_reg.asm_name(), begin.asm_name()));
		self.regs.free_rvalue(&cond_rv);
		self.emit_label(end)?;
		self.loop_targets.pop();
		Ok(())
	}

	fn emit_for(
		&mut self,
		init: Option<&Stmt>,
		cond: Option<&ricc_ast::Expr>,
		step: Option<&ricc_ast::Expr>,
		body: &Stmt,
	) -> Result<(), CgError> {
		self.disp.enter_scope();
		if let Some(init) = init {
			self.emit_stmt(init)?;
		}
		let begin = self.labels.fresh_begin_cycle();
		let next = self.labels.fresh_next();
		let end = self.labels.fresh_end();
		self.loop_targets.push((next, end));
		self.emit_label(begin)?;
		if let Some(cond) = cond {
			let cond_rv = self.emit_expr(cond)?;
			let cond_reg = self.rvalue_to_register(&cond_rv)?;
			self.emit(format!("beq {}, $zero, {}", cond_reg.asm_name(), end.asm_name()));
			self.regs.free_rvalue(&cond_rv);
		}
		self.emit_stmt(body)?;
		self.emit_label(next)?;
		if let Some(step) = step {
			let rv = self.emit_expr(step)?;
			self.regs.free_rvalue(&rv);
		}
		self.emit(format!("j {}", begin.asm_name()));
		self.emit_label(end)?;
		self.loop_targets.pop();
		self.disp.exit_scope();
		Ok(())
	}

	fn emit_loop_jump(&mut self, is_continue: bool) -> Result<(), CgError> {
		let &(continue_label, break_label) = self.loop_targets.last().ok_or(CgError::LoopControlOutsideLoop)?;
		let target = if is_continue { continue_label } else { break_label };
		self.emit(format!("j {}", target.asm_name()));
		Ok(())
	}

	fn emit_return(&mut self, value: Option<&ricc_ast::Expr>) -> Result<(), CgError> {
		if let Some(expr) = value {
			let rv = self.emit_expr(expr)?;
			let reg = self.rvalue_to_register(&rv)?;
			let dest = if self.types.type_is_float(expr.ty) { "$f0" } else { "$v0" };
			let mnemonic = if self.types.type_is_float(expr.ty) { "mov.s" } else { "move" };
			self.emit(format!("{mnemonic} {dest}, {}", reg.asm_name()));
			self.regs.free_rvalue(&rv);
		}
		let end = self.current_func_end.expect("return reached outside a function body");
		self.emit(format!("j {}", end.asm_name()));
		Ok(())
	}
}
