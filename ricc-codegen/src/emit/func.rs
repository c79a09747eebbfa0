//! Component I: whole-function emission. The prologue needs
//! `max_displ`, which isn't known until every local in the body has
//! been walked, so the body is emitted into a side buffer first and
//! spliced in after the prologue is written — the same
//! buffer-now-splice-later shape `ricc_io::Stream::set_buffer`/
//! `extract_buffer` gives the preprocessor for nested macro expansion,
//! done here with a plain owned `String` since the emitter never needs
//! character-level pushback.

use ricc_ast::Function;

use super::CodeGenerator;
use crate::{
	error::CgError,
	frame::{preserved_area_words, PRESERVED_FPR, PRESERVED_GPR, SAVED_ARGS},
	label::LabelCounters,
	register::RegisterBank,
};

impl CodeGenerator<'_> {
	pub fn emit_function(&mut self, f: &Function) -> Result<(), CgError> {
		self.regs = RegisterBank::new();
		self.disp.begin_function();
		let func_label = LabelCounters::func(f.id);
		let func_end = LabelCounters::func_end(f.id);
		self.current_func_end = Some(func_end);

		for (i, param) in f.params.iter().enumerate() {
			if i < 4 {
				self.disp.declare_param_in_register(param.name, param.ty, i as u8);
			} else {
				let size = self.types.type_size(param.ty);
				self.disp.declare_param_on_stack(param.name, param.ty, size);
			}
		}

		let saved_out = std::mem::take(&mut self.out);
		for stmt in &f.body {
			self.emit_stmt(stmt)?;
		}
		// Every declared parameter kept register-resident needs its
		// argument register's value spilled to its stack slot up front;
		// since `declare_param_in_register` never allocates a stack slot,
		// this is handled by `declare_param_on_stack` overflow params only
		// — register-resident params are read directly from `$a0..$a3`
		// wherever they're referenced.
		let body = std::mem::replace(&mut self.out, saved_out);
		let max_displ = self.disp.end_function();

		self.emit_label(func_label)?;
		self.emit_prologue(max_displ);
		self.out.push_str(&body);
		self.emit_label(func_end)?;
		self.emit_epilogue(max_displ);
		self.current_func_end = None;
		Ok(())
	}

	fn emit_prologue(&mut self, max_displ: u32) {
		let frame_size = max_displ + preserved_area_words() * 4;
		self.emit("sw $ra, -4($fp)");
		self.emit("sw $sp, -8($fp)");
		let mut offset = 12i32;
		for reg in PRESERVED_GPR {
			self.emit(format!("sw {reg}, -{offset}($fp)"));
			offset += 4;
		}
		for reg in PRESERVED_FPR {
			self.emit(format!("s.s {reg}, -{offset}($fp)"));
			offset += 4;
		}
		for reg in SAVED_ARGS {
			self.emit(format!("sw {reg}, -{offset}($fp)"));
			offset += 4;
		}
		self.emit(format!("addiu $fp, $fp, -{}", frame_size + 4));
		self.emit("move $sp, $fp");
		self.emit("addiu $fp, $fp, -4");
	}

	fn emit_epilogue(&mut self, max_displ: u32) {
		let frame_size = max_displ + preserved_area_words() * 4;
		self.emit("move $fp, $sp");
		self.emit(format!("addiu $fp, $fp, {}", frame_size + 4));
		self.emit("lw $ra, -4($fp)");
		self.emit("lw $sp, -8($fp)");
		let mut offset = 12i32;
		for reg in PRESERVED_GPR {
			self.emit(format!("lw {reg}, -{offset}($fp)"));
			offset += 4;
		}
		for reg in PRESERVED_FPR {
			self.emit(format!("l.s {reg}, -{offset}($fp)"));
			offset += 4;
		}
		for reg in SAVED_ARGS {
			self.emit(format!("lw {reg}, -{offset}($fp)"));
			offset += 4;
		}
		self.emit("jr $ra");
	}
}
