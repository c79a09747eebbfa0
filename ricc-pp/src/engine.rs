//! Component D: the directive engine and macro expander tying together
//! [`crate::scan::Scanner`], [`crate::symtab::SymbolTable`], and
//! [`crate::mask`].
//!
//! `Preprocessor::run` is the single entry point re-entered for every
//! nested scope: the top-level source file, an `#include`d sub-stream,
//! and a macro's substituted body all flow through the same loop, which
//! is what let's the rest of this crate stay unaware of *why* it's
//! scanning a particular buffer.

use ricc_ast::IncludeResolver;
use ricc_io::{FileId, Location, LocationTracker, Stream, EOF};

use crate::{
	body,
	error::{Diagnostic, PpError, PpWarning},
	mask::{self, ArgForm, BodyToken},
	scan::Scanner,
	symtab::{Handle, SymbolTable},
};

/// A single expansion step (substituting and re-preprocessing one macro
/// body or argument) is capped per I10.
const EXPANSION_ITERATION_LIMIT: u32 = 32_768;
const INCLUDE_DEPTH_LIMIT: u32 = 32;
const CALL_DEPTH_LIMIT: u32 = 256;

pub struct Preprocessor<'a> {
	symtab: SymbolTable,
	diagnostics: Vec<Diagnostic<PpError>>,
	warnings: Vec<Diagnostic<PpWarning>>,
	had_error: bool,
	recovery_disabled: bool,
	include_depth: u32,
	call_depth: u32,
	next_file_id: u32,
	resolver: &'a dyn IncludeResolver,
}

impl<'a> Preprocessor<'a> {
	pub fn new(resolver: &'a dyn IncludeResolver) -> Self {
		Self {
			symtab: SymbolTable::new(),
			diagnostics: Vec::new(),
			warnings: Vec::new(),
			had_error: false,
			recovery_disabled: false,
			include_depth: 0,
			call_depth: 0,
			next_file_id: 0,
			resolver,
		}
	}

	/// Suppress cascading diagnostics after the first error, per §7.
	pub fn set_recovery_disabled(&mut self, v: bool) {
		self.recovery_disabled = v;
	}

	pub fn had_error(&self) -> bool {
		self.had_error
	}

	pub fn errors(&self) -> &[Diagnostic<PpError>] {
		&self.diagnostics
	}

	pub fn warnings(&self) -> &[Diagnostic<PpWarning>] {
		&self.warnings
	}

	pub fn preprocess(&mut self, source: &str, file: FileId) -> String {
		let mut stream = Stream::from_memory(source.to_string());
		let tracker = LocationTracker::for_file(file);
		let mut out = String::new();
		self.run(&mut stream, tracker, &mut out, None);
		out
	}

	pub fn preprocess_path(&mut self, path: &std::path::Path) -> std::io::Result<String> {
		let mut stream = Stream::open_file(path)?;
		self.next_file_id += 1;
		let tracker = LocationTracker::for_file(FileId(self.next_file_id));
		let mut out = String::new();
		self.run(&mut stream, tracker, &mut out, None);
		Ok(out)
	}

	fn error(&mut self, sc: &Scanner, kind: PpError) {
		let at = sc.tracker.copy();
		if !(self.recovery_disabled && self.had_error) {
			tracing::error!(location = %at, "{kind}");
			self.diagnostics.push(Diagnostic { at, kind });
		}
		self.had_error = true;
	}

	fn warn(&mut self, sc: &Scanner, kind: PpWarning) {
		let at = sc.tracker.copy();
		tracing::warn!(location = %at, "{kind}");
		self.warnings.push(Diagnostic { at, kind });
	}

	/// The main loop: read logical characters, strip/replace comments,
	/// pass string and character literals through untouched, dispatch
	/// line-leading `#` to the directive engine, and expand macro
	/// identifiers. `limit`, when set, bounds the number of characters
	/// this call may consume before aborting with `ExpansionOverflow`
	/// (I10) — used only for nested macro re-expansion, never for a
	/// top-level file or `#include`.
	fn run(&mut self, input: &mut Stream, tracker: LocationTracker, out: &mut String, limit: Option<u32>) {
		let mut sc = Scanner::new(input, tracker);
		let mut at_bol = true;
		let mut iterations: u32 = 0;
		loop {
			if let Some(max) = limit {
				iterations += 1;
				if iterations > max {
					self.error(&sc, PpError::ExpansionOverflow);
					return;
				}
			}
			let c = sc.next();
			if c == EOF {
				return;
			}
			if c == '\n' {
				out.push('\n');
				at_bol = true;
				continue;
			}
			if c == ' ' || c == '\t' {
				out.push(c);
				continue;
			}
			if c == '#' && at_bol {
				at_bol = false;
				self.handle_directive(&mut sc, out);
				continue;
			}
			at_bol = false;
			match c {
				'/' => self.handle_slash(&mut sc, out),
				'"' | '\'' => {
					out.push(c);
					if let Err(e) = self.copy_literal_chars(&mut sc, out, c) {
						self.error(&sc, e);
					}
				}
				c if c.is_ascii_alphabetic() || c == '_' => self.handle_identifier(&mut sc, out, c),
				_ => out.push(c),
			}
		}
	}

	fn handle_slash(&mut self, sc: &mut Scanner, out: &mut String) {
		let n = sc.next();
		if n == '/' {
			loop {
				let c = sc.next();
				if c == '\n' {
					sc.unread('\n');
					return;
				}
				if c == EOF {
					return;
				}
			}
		}
		if n == '*' {
			loop {
				let c = sc.next();
				if c == EOF {
					self.error(sc, PpError::CommentUnterminated);
					return;
				}
				if c == '*' {
					let c2 = sc.next();
					if c2 == '/' {
						return;
					}
					sc.unread(c2);
					out.push(' ');
					continue;
				}
				out.push(if c == '\n' { '\n' } else { ' ' });
			}
		}
		sc.unread(n);
		out.push('/');
	}

	fn copy_literal_chars(&mut self, sc: &mut Scanner, buf: &mut String, quote: char) -> Result<(), PpError> {
		loop {
			let c = sc.next();
			if c == EOF {
				return Err(PpError::StringUnterminated);
			}
			if c == '\\' {
				buf.push(c);
				let n = sc.next();
				if n == EOF {
					return Err(PpError::StringUnterminated);
				}
				buf.push(n);
				continue;
			}
			if c == '\n' {
				return Err(PpError::StringUnterminated);
			}
			buf.push(c);
			if c == quote {
				return Ok(());
			}
		}
	}

	fn handle_identifier(&mut self, sc: &mut Scanner, out: &mut String, first: char) {
		let mut name = String::from(first);
		loop {
			let c = sc.next();
			if c.is_ascii_alphanumeric() || c == '_' {
				name.push(c);
			} else {
				sc.unread(c);
				break;
			}
		}
		if let Some(handle) = self.symtab.lookup_macro(&name) {
			self.invoke_macro(sc, out, name, handle);
		} else {
			out.push_str(&name);
		}
	}

	fn skip_spaces(&mut self, sc: &mut Scanner) {
		loop {
			let c = sc.next();
			if c == ' ' || c == '\t' {
				continue;
			}
			sc.unread(c);
			return;
		}
	}

	fn skip_to_eol(&mut self, sc: &mut Scanner) {
		loop {
			let c = sc.next();
			if c == EOF {
				return;
			}
			if c == '\n' {
				sc.unread('\n');
				return;
			}
		}
	}

	fn scan_ident(&mut self, sc: &mut Scanner) -> String {
		let mut s = String::new();
		let c = sc.next();
		if c.is_ascii_alphabetic() || c == '_' {
			s.push(c);
			loop {
				let c2 = sc.next();
				if c2.is_ascii_alphanumeric() || c2 == '_' {
					s.push(c2);
				} else {
					sc.unread(c2);
					break;
				}
			}
		} else if c != EOF {
			sc.unread(c);
		}
		s
	}

	fn check_extra_tokens(&mut self, sc: &mut Scanner) {
		self.skip_spaces(sc);
		let c = sc.next();
		sc.unread(c);
		if c != '\n' && c != EOF {
			self.warn(sc, PpWarning::DirectiveExtraTokens);
		}
	}

	fn handle_directive(&mut self, sc: &mut Scanner, out: &mut String) {
		self.skip_spaces(sc);
		let name = self.scan_ident(sc);
		if name.is_empty() {
			self.error(sc, PpError::DirectiveNameNon);
			self.skip_to_eol(sc);
			return;
		}
		match name.as_str() {
			"include" => self.handle_include(sc, out),
			"define" => self.handle_define(sc, false),
			"set" => self.handle_define(sc, true),
			"undef" => self.handle_undef(sc),
			"line" => {
				self.warn(sc, PpWarning::DirectiveLineSkipped);
				self.skip_to_eol(sc);
			}
			// Conditional compilation and user-macro blocks are recognized
			// but not implemented (§9: "recognized at directive scan but
			// not processed").
			"eval" | "if" | "ifdef" | "ifndef" | "elif" | "else" | "endif" | "macro" | "endm" | "while" | "endw" => {
				self.error(sc, PpError::DirectiveInvalid(name));
				self.skip_to_eol(sc);
			}
			_ => {
				self.error(sc, PpError::DirectiveInvalid(name));
				self.skip_to_eol(sc);
			}
		}
	}

	fn handle_undef(&mut self, sc: &mut Scanner) {
		self.skip_spaces(sc);
		let name = self.scan_ident(sc);
		if name.is_empty() {
			self.error(sc, PpError::MacroNameFirstCharacter);
			self.skip_to_eol(sc);
			return;
		}
		self.symtab.undef_macro(&name);
		self.check_extra_tokens(sc);
		self.skip_to_eol(sc);
	}

	fn scan_delimited(&mut self, sc: &mut Scanner, close: char) -> Result<String, ()> {
		let mut s = String::new();
		loop {
			let c = sc.next();
			if c == EOF || c == '\n' {
				return Err(());
			}
			if c == close {
				return Ok(s);
			}
			s.push(c);
		}
	}

	fn handle_include(&mut self, sc: &mut Scanner, out: &mut String) {
		self.skip_spaces(sc);
		let c = sc.next();
		let (path, internal) = match c {
			'"' => match self.scan_delimited(sc, '"') {
				Ok(p) => (p, true),
				Err(()) => {
					self.error(sc, PpError::IncludeExpectsFilename);
					self.skip_to_eol(sc);
					return;
				}
			},
			'<' => match self.scan_delimited(sc, '>') {
				Ok(p) => (p, false),
				Err(()) => {
					self.error(sc, PpError::IncludeExpectsFilename);
					self.skip_to_eol(sc);
					return;
				}
			},
			_ => {
				sc.unread(c);
				self.error(sc, PpError::IncludeExpectsFilename);
				self.skip_to_eol(sc);
				return;
			}
		};
		self.check_extra_tokens(sc);
		self.skip_to_eol(sc);

		if self.include_depth >= INCLUDE_DEPTH_LIMIT {
			self.error(sc, PpError::IncludeDepth);
			return;
		}
		let resolved =
			if internal { self.resolver.resolve_internal(&path) } else { self.resolver.resolve_external(&path) };
		let Some(resolved) = resolved else {
			self.error(sc, PpError::IncludeNoSuchFile(path));
			return;
		};
		let mut sub = match Stream::open_file(&resolved) {
			Ok(s) => s,
			Err(_) => {
				self.error(sc, PpError::IncludeNoSuchFile(path));
				return;
			}
		};

		self.include_depth += 1;
		self.next_file_id += 1;
		let tracker = LocationTracker::for_file(FileId(self.next_file_id));
		if !out.is_empty() && !out.ends_with('\n') {
			out.push('\n');
		}
		self.run(&mut sub, tracker, out, None);
		if !out.ends_with('\n') {
			out.push('\n');
		}
		self.include_depth -= 1;
	}

	fn handle_define(&mut self, sc: &mut Scanner, is_set: bool) {
		self.skip_spaces(sc);
		let name = self.scan_ident(sc);
		if name.is_empty() {
			self.error(sc, PpError::MacroNameFirstCharacter);
			self.skip_to_eol(sc);
			return;
		}

		// No space is allowed between the name and a parenthesized
		// parameter list; anything else (including a space) means arity
		// zero and the character is part of the body.
		let next_c = sc.next();
		let mut params: Vec<String> = Vec::new();
		if next_c == '(' {
			loop {
				self.skip_spaces(sc);
				let c = sc.next();
				if c == ')' {
					break;
				}
				sc.unread(c);
				let p = self.scan_ident(sc);
				if p.is_empty() {
					self.error(sc, PpError::ArgsExpectedName);
					self.skip_to_eol(sc);
					return;
				}
				if params.contains(&p) {
					self.error(sc, PpError::ArgsDuplicate(p));
					self.skip_to_eol(sc);
					return;
				}
				params.push(p);
				self.skip_spaces(sc);
				let c2 = sc.next();
				if c2 == ',' {
					continue;
				}
				if c2 == ')' {
					break;
				}
				sc.unread(c2);
				self.error(sc, PpError::ArgsExpectedBracket);
				self.skip_to_eol(sc);
				return;
			}
		} else {
			sc.unread(next_c);
		}

		self.skip_spaces(sc);
		let raw_body = self.scan_body_line(sc);
		let arity = params.len() as i32;
		let encoded = match body::encode_body(&params, &raw_body) {
			Ok(b) => b,
			Err(e) => {
				self.error(sc, e);
				return;
			}
		};

		if is_set {
			if !self.symtab.set_macro(&name, arity, encoded) {
				self.warn(sc, PpWarning::MacroSetUndefined(name));
			}
		} else if !self.symtab.define_macro(&name, arity, encoded) {
			self.error(sc, PpError::MacroNameRedefine(name));
		}
	}

	/// Reads the remainder of a `#define`/`#set` line, applying the same
	/// comment-stripping rule as the main loop (§6, supplemented by
	/// `original_source`'s byte-replacement rule) while keeping string
	/// and character literals verbatim so a stray `#`/`##` inside one
	/// isn't mistaken for an operator by `body::encode_body`.
	fn scan_body_line(&mut self, sc: &mut Scanner) -> String {
		let mut body = String::new();
		loop {
			let c = sc.next();
			if c == EOF {
				break;
			}
			if c == '\n' {
				sc.unread('\n');
				break;
			}
			if c == '"' || c == '\'' {
				body.push(c);
				if let Err(e) = self.copy_literal_chars(sc, &mut body, c) {
					self.error(sc, e);
				}
				continue;
			}
			if c == '/' {
				let n = sc.next();
				if n == '/' {
					loop {
						let cc = sc.next();
						if cc == '\n' {
							sc.unread('\n');
							break;
						}
						if cc == EOF {
							break;
						}
					}
					continue;
				}
				if n == '*' {
					loop {
						let cc = sc.next();
						if cc == EOF {
							self.error(sc, PpError::CommentUnterminated);
							break;
						}
						if cc == '*' {
							let cc2 = sc.next();
							if cc2 == '/' {
								break;
							}
							sc.unread(cc2);
							body.push(' ');
							continue;
						}
						body.push(if cc == '\n' { '\n' } else { ' ' });
					}
					continue;
				}
				sc.unread(n);
				body.push('/');
				continue;
			}
			body.push(c);
		}
		body
	}

	fn invoke_macro(&mut self, sc: &mut Scanner, out: &mut String, name: String, handle: Handle) {
		if self.call_depth >= CALL_DEPTH_LIMIT {
			self.error(sc, PpError::CallDepth);
			out.push_str(&name);
			return;
		}

		let arity = self.symtab.arity(handle);
		if arity == 0 {
			self.try_consume_empty_parens(sc, &name);
			self.substitute_and_expand(sc, out, handle, &[]);
			return;
		}

		self.skip_spaces(sc);
		let c = sc.next();
		if c != '(' {
			sc.unread(c);
			self.error(sc, PpError::ArgsNon);
			out.push_str(&name);
			return;
		}
		let args = match self.parse_arguments(sc) {
			Ok(a) => a,
			Err(e) => {
				self.error(sc, e);
				out.push_str(&name);
				return;
			}
		};
		let expected = arity as usize;
		if args.len() != expected {
			if args.len() < expected {
				self.error(sc, PpError::ArgsRequires { name: name.clone(), expected: arity as u8, got: args.len() });
			} else {
				self.error(sc, PpError::ArgsPassed { name: name.clone(), expected: arity as u8, got: args.len() });
			}
			out.push_str(&name);
			return;
		}
		self.substitute_and_expand(sc, out, handle, &args);
	}

	/// Arity-0 macros may optionally be invoked with an empty `()` pair
	/// (I2). Anything non-whitespace found inside it is an over-supply
	/// error; anything that isn't an opening paren at all is pushed back
	/// untouched, since a bare `F` is just as valid.
	fn try_consume_empty_parens(&mut self, sc: &mut Scanner, name: &str) {
		let mut skipped = Vec::new();
		let open = loop {
			let c = sc.next();
			if c == ' ' || c == '\t' || c == '\n' {
				skipped.push(c);
				continue;
			}
			break c;
		};
		if open != '(' {
			sc.unread(open);
			for s in skipped.iter().rev() {
				sc.unread(*s);
			}
			return;
		}
		let mut depth = 1;
		let mut interior = String::new();
		loop {
			let c = sc.next();
			if c == EOF {
				self.error(sc, PpError::ArgsUnterminated);
				return;
			}
			if c == '(' {
				depth += 1;
				interior.push(c);
				continue;
			}
			if c == ')' {
				depth -= 1;
				if depth == 0 {
					break;
				}
				interior.push(c);
				continue;
			}
			interior.push(c);
		}
		if !interior.trim().is_empty() {
			self.error(sc, PpError::ArgsPassed { name: name.to_string(), expected: 0, got: 1 });
		}
	}

	/// Bracket-balanced argument scanning: top-level commas separate
	/// arguments, nested parens don't, and string/character literals are
	/// transparent (their contents never split an argument).
	fn parse_arguments(&mut self, sc: &mut Scanner) -> Result<Vec<String>, PpError> {
		let mut args = Vec::new();
		let mut current = String::new();
		let mut depth: u32 = 0;
		loop {
			let c = sc.next();
			if c == EOF {
				return Err(PpError::ArgsUnterminated);
			}
			if c == '"' || c == '\'' {
				current.push(c);
				self.copy_literal_chars(sc, &mut current, c)?;
				continue;
			}
			if c == '(' {
				depth += 1;
				current.push(c);
				continue;
			}
			if c == ')' {
				if depth == 0 {
					args.push(current.trim().to_string());
					return Ok(args);
				}
				depth -= 1;
				current.push(c);
				continue;
			}
			if c == ',' && depth == 0 {
				args.push(current.trim().to_string());
				current = String::new();
				continue;
			}
			current.push(c);
		}
	}

	/// Component D steps 4–6: build the three argument forms, substitute
	/// them into the (already mask-encoded) body, and re-preprocess the
	/// result in a fresh nested frame, bracketed by `begin`/`end` markers
	/// on the caller's tracker.
	fn substitute_and_expand(&mut self, sc: &mut Scanner, out: &mut String, handle: Handle, args: &[String]) {
		let saved = self.symtab.save_args(handle);
		let caller_loc = sc.tracker.copy();
		for (i, raw) in args.iter().enumerate() {
			let expanded = self.expand_text(raw, caller_loc);
			let stringized = body::stringize(&expanded);
			let raw_slot = self.symtab.arg_slot(i, ArgForm::Raw);
			let expanded_slot = self.symtab.arg_slot(i, ArgForm::Expanded);
			let stringized_slot = self.symtab.arg_slot(i, ArgForm::Stringized);
			self.symtab.set_args_by_index(handle, raw_slot, raw.clone());
			self.symtab.set_args_by_index(handle, expanded_slot, expanded);
			self.symtab.set_args_by_index(handle, stringized_slot, stringized);
		}

		let body_text = self.symtab.macro_body(handle).to_string();
		let mut substituted = String::new();
		for tok in mask::tokens(&body_text) {
			match tok {
				BodyToken::Literal(s) => substituted.push_str(s),
				BodyToken::Placeholder { index, form } => {
					let slot = self.symtab.arg_slot(index, form);
					if let Some(v) = self.symtab.get_args_by_index(handle, slot) {
						substituted.push_str(v);
					}
				}
			}
		}
		self.symtab.restore_args(handle, saved);

		self.call_depth += 1;
		sc.tracker.update_begin();
		let expanded = self.expand_text(&substituted, caller_loc);
		out.push_str(&expanded);
		sc.tracker.update_end();
		self.call_depth -= 1;
	}

	fn expand_text(&mut self, text: &str, caller_loc: Location) -> String {
		let mut stream = Stream::from_memory(text.to_string());
		let tracker = LocationTracker::for_macro_body(caller_loc);
		let mut out = String::new();
		self.run(&mut stream, tracker, &mut out, Some(EXPANSION_ITERATION_LIMIT));
		out
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	struct NoIncludes;
	impl IncludeResolver for NoIncludes {
		fn resolve_internal(&self, _path: &str) -> Option<std::path::PathBuf> {
			None
		}
		fn resolve_external(&self, _path: &str) -> Option<std::path::PathBuf> {
			None
		}
	}

	fn expand(src: &str) -> String {
		let resolver = NoIncludes;
		let mut pp = Preprocessor::new(&resolver);
		pp.preprocess(src, FileId(0))
	}

	#[test]
	fn scenario_1_parenthesized_square_macro() {
		let out = expand("#define SQ(x) ((x)*(x))\nSQ(1+2)\n");
		assert!(out.contains("((1+2)*(1+2))"), "{out:?}");
	}

	#[test]
	fn scenario_2_stringize_of_a_multi_token_argument() {
		let out = expand("#define S(x) #x\nS(a b)\n");
		assert!(out.contains("\"a b\""), "{out:?}");
	}

	#[test]
	fn scenario_3_paste_concatenates_raw_text() {
		let out = expand("#define CAT(a,b) a##b\nCAT(foo,1)\n");
		assert!(out.contains("foo1"), "{out:?}");
	}

	#[test]
	fn i2_zero_arity_macro_expands_with_or_without_parens() {
		let out = expand("#define F() body\nF F()\n");
		let expanded: Vec<&str> = out.split_whitespace().collect();
		assert_eq!(expanded, vec!["body", "body"]);
	}

	#[test]
	fn i4_paste_operates_on_raw_text_not_expanded_text() {
		let out = expand("#define A B\n#define F(x) x##_\nF(A)\n");
		assert!(out.contains("A_"), "{out:?}");
		assert!(!out.contains("B_"), "{out:?}");
	}

	#[test]
	fn i5_undef_restores_literal_passthrough() {
		let out = expand("#define X 1\n#undef X\nX\n");
		assert!(out.trim_end().ends_with('X'), "{out:?}");
	}

	#[test]
	fn redefinition_without_undef_is_an_error() {
		let resolver = NoIncludes;
		let mut pp = Preprocessor::new(&resolver);
		pp.preprocess("#define X 1\n#define X 2\n", FileId(0));
		assert!(pp.had_error());
		assert!(pp.errors().iter().any(|d| matches!(d.kind, PpError::MacroNameRedefine(_))));
	}

	#[test]
	fn line_comments_collapse_to_an_empty_line() {
		let out = expand("a // comment\nb\n");
		assert_eq!(out, "a \nb\n");
	}

	#[test]
	fn block_comments_preserve_embedded_newlines() {
		let out = expand("a /* x\ny */ b\n");
		let lines: Vec<&str> = out.lines().collect();
		assert_eq!(lines.len(), 2, "{out:?}");
		assert!(lines[0].trim_end().starts_with('a'), "{out:?}");
		assert!(lines[1].trim().ends_with('b'), "{out:?}");
	}

	#[test]
	fn under_and_over_supplied_arguments_are_errors() {
		let resolver = NoIncludes;
		let mut pp = Preprocessor::new(&resolver);
		pp.preprocess("#define F(a,b) a b\nF(1)\n", FileId(0));
		assert!(pp.had_error());
		assert!(pp.errors().iter().any(|d| matches!(d.kind, PpError::ArgsRequires { .. })));
	}

	#[test]
	fn nested_macro_expansion_reexpands_substituted_body() {
		let out = expand("#define A 1\n#define WRAP(x) [x]\nWRAP(A)\n");
		assert!(out.contains("[1]"), "{out:?}");
	}
}
