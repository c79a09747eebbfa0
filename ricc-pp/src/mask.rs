//! Mask tokens: opaque, ASCII-safe placeholders embedded into an encoded
//! macro body to stand in for parameter references and the `#`/`##`
//! operators, so that substitution never risks colliding with identifiers
//! that happen to appear in the macro's own body text.
//!
//! Encoding uses C0 control characters that can never appear in a
//! well-formed source program (`\x01`..`\x04`), so no escaping of the
//! surrounding literal text is needed.

use std::fmt::Write as _;

const TAG_ARG: char = '\u{1}';
const TAG_ARG_RAW: char = '\u{2}';
const TAG_STRINGIZE: char = '\u{3}';
const TAG_END: char = '\u{4}';

/// What a placeholder resolves to when substituting into an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgForm {
	/// Bytes exactly as read from the call site (used for `##` operands).
	Raw = 0,
	/// Fully re-preprocessed (the default, non-`#`/`##` substitution).
	Expanded = 1,
	/// The expanded form, quoted and escaped (the `#` stringize result).
	Stringized = 2,
}

impl ArgForm {
	pub const COUNT: usize = 3;
}

/// Append the argument placeholder for parameter `idx`, in expanded form
/// (the ordinary, non-`#`/`##` substitution).
pub fn push_arg(out: &mut String, idx: usize) {
	push_tagged(out, TAG_ARG, idx);
}

/// Append the argument placeholder for parameter `idx` in *raw* form — used
/// on either side of a `##` paste, where substitution must use call-site
/// text verbatim rather than the re-expanded argument.
pub fn push_arg_raw(out: &mut String, idx: usize) {
	push_tagged(out, TAG_ARG_RAW, idx);
}

/// Append the stringize placeholder for parameter `idx` (a `#param` use).
pub fn push_stringize(out: &mut String, idx: usize) {
	push_tagged(out, TAG_STRINGIZE, idx);
}

fn push_tagged(out: &mut String, tag: char, idx: usize) {
	out.push(tag);
	let _ = write!(out, "{idx}");
	out.push(TAG_END);
}

/// A single decoded token from an encoded macro body: either a run of
/// literal text, or a placeholder naming a parameter index and the form
/// it should be substituted with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyToken<'a> {
	Literal(&'a str),
	Placeholder { index: usize, form: ArgForm },
}

/// Iterates the literal/placeholder tokens of an encoded body in order.
pub fn tokens(body: &str) -> impl Iterator<Item = BodyToken<'_>> {
	BodyTokens { rest: body }
}

struct BodyTokens<'a> {
	rest: &'a str,
}

impl<'a> Iterator for BodyTokens<'a> {
	type Item = BodyToken<'a>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.rest.is_empty() {
			return None;
		}
		let tag = self.rest.chars().next().unwrap();
		let form = match tag {
			TAG_ARG => Some(ArgForm::Expanded),
			TAG_ARG_RAW => Some(ArgForm::Raw),
			TAG_STRINGIZE => Some(ArgForm::Stringized),
			_ => None,
		};
		if let Some(form) = form {
			let body_after_tag = &self.rest[tag.len_utf8()..];
			let end = body_after_tag.find(TAG_END).expect("mask token missing terminator");
			let index: usize = body_after_tag[..end].parse().expect("mask token index malformed");
			self.rest = &body_after_tag[end + TAG_END.len_utf8()..];
			return Some(BodyToken::Placeholder { index, form });
		}
		// Literal run: up to the next tag byte (or end of string).
		let next_tag = self.rest.find([TAG_ARG, TAG_ARG_RAW, TAG_STRINGIZE]).unwrap_or(self.rest.len());
		let (literal, rest) = self.rest.split_at(next_tag);
		self.rest = rest;
		Some(BodyToken::Literal(literal))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn roundtrips_mixed_literal_and_placeholders() {
		let mut body = String::from("((");
		push_arg(&mut body, 0);
		body.push_str(")*(");
		push_arg(&mut body, 0);
		body.push_str("))");

		let decoded: Vec<_> = tokens(&body).collect();
		assert_eq!(
			decoded,
			vec![
				BodyToken::Literal("(("),
				BodyToken::Placeholder { index: 0, form: ArgForm::Expanded },
				BodyToken::Literal(")*("),
				BodyToken::Placeholder { index: 0, form: ArgForm::Expanded },
				BodyToken::Literal("))"),
			]
		);
	}

	#[test]
	fn distinguishes_raw_and_stringized_forms() {
		let mut body = String::new();
		push_stringize(&mut body, 0);
		push_arg_raw(&mut body, 1);
		let decoded: Vec<_> = tokens(&body).collect();
		assert_eq!(
			decoded,
			vec![
				BodyToken::Placeholder { index: 0, form: ArgForm::Stringized },
				BodyToken::Placeholder { index: 1, form: ArgForm::Raw },
			]
		);
	}
}
