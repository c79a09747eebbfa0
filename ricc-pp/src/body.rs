//! Macro body encoding (component D.3): turn the raw text between
//! `#define NAME(...)` and end-of-line into the mask-token form stored in
//! the symbol table, resolving `#param` (stringize) and `a##param##b`
//! (paste) against the macro's own parameter list.
//!
//! Per the data model's invariant: "a macro's body, after the first call,
//! contains only expanded/encoded forms of its parameters; raw parameter
//! identifiers appear only during this one-time encoding pass." Once this
//! function returns, nothing downstream ever re-scans for parameter
//! names — only for [`crate::mask`] tokens.

use crate::{error::PpError, mask};

/// Encode `raw` (already comment-stripped and backslash-newline-spliced)
/// against `params`. `params` is empty for a zero-arity macro, in which
/// case every `#`/`##`/identifier is passed through literally — there is
/// nothing to substitute.
pub fn encode_body(params: &[String], raw: &str) -> Result<String, PpError> {
	let trimmed = raw.trim();
	if trimmed.starts_with("##") || trimmed.ends_with("##") {
		return Err(PpError::HashOnEdge);
	}

	let pass1 = resolve_stringize(params, raw)?;
	let pass2 = resolve_paste(params, &pass1);
	let pass3 = resolve_plain_args(params, &pass2);
	Ok(pass3)
}

/// Pass 1: replace `#param` with a stringize placeholder. Everything else
/// — including bare parameter names and `##` — is left as literal text
/// for later passes.
fn resolve_stringize(params: &[String], raw: &str) -> Result<String, PpError> {
	let chars: Vec<char> = raw.chars().collect();
	let n = chars.len();
	let mut out = String::with_capacity(raw.len());
	let mut i = 0;
	while i < n {
		let c = chars[i];
		if c == '#' && !(i + 1 < n && chars[i + 1] == '#') {
			let mut j = i + 1;
			while j < n && (chars[j] == ' ' || chars[j] == '\t') {
				j += 1;
			}
			let start = j;
			while j < n && (chars[j].is_ascii_alphanumeric() || chars[j] == '_') {
				j += 1;
			}
			let ident: String = chars[start..j].iter().collect();
			if let Some(idx) = params.iter().position(|p| p == &ident) {
				mask::push_stringize(&mut out, idx);
				i = j;
				continue;
			}
			if !params.is_empty() && !ident.is_empty() {
				return Err(PpError::HashNotFollowed);
			}
			out.push('#');
			i += 1;
			continue;
		}
		out.push(c);
		i += 1;
	}
	Ok(out)
}

/// Pass 2: split on literal `##` and mark the parameter reference on
/// either side of a cut (if any) for raw substitution instead of the
/// default expanded form.
fn resolve_paste(params: &[String], text: &str) -> String {
	if params.is_empty() || !text.contains("##") {
		return text.to_string();
	}
	let segments: Vec<&str> = text.split("##").collect();
	let mut out = String::with_capacity(text.len());
	let last = segments.len() - 1;
	for (idx, seg) in segments.into_iter().enumerate() {
		let mut seg = seg.to_string();
		if idx > 0 {
			mark_leading_raw(&mut seg, params);
		}
		if idx < last {
			mark_trailing_raw(&mut seg, params);
		}
		out.push_str(&seg);
	}
	out
}

fn mark_leading_raw(seg: &mut String, params: &[String]) {
	let ident_end = seg.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_')).unwrap_or(seg.len());
	let ident = &seg[..ident_end];
	if ident.is_empty() {
		return;
	}
	if let Some(idx) = params.iter().position(|p| p == ident) {
		let mut replaced = String::new();
		mask::push_arg_raw(&mut replaced, idx);
		replaced.push_str(&seg[ident_end..]);
		*seg = replaced;
	}
}

fn mark_trailing_raw(seg: &mut String, params: &[String]) {
	let ident_start = seg.rfind(|c: char| !(c.is_ascii_alphanumeric() || c == '_')).map_or(0, |p| p + 1);
	let ident = &seg[ident_start..];
	if ident.is_empty() {
		return;
	}
	if let Some(idx) = params.iter().position(|p| p == ident) {
		let mut replaced = seg[..ident_start].to_string();
		mask::push_arg_raw(&mut replaced, idx);
		*seg = replaced;
	}
}

/// Pass 3: every remaining bare identifier matching a parameter name
/// becomes an expanded-argument placeholder. Already-inserted mask
/// tokens (from passes 1 and 2) are copied through verbatim.
fn resolve_plain_args(params: &[String], text: &str) -> String {
	if params.is_empty() {
		return text.to_string();
	}
	let chars: Vec<char> = text.chars().collect();
	let n = chars.len();
	let mut out = String::with_capacity(text.len());
	let mut i = 0;
	while i < n {
		let c = chars[i];
		if matches!(c, '\u{1}' | '\u{2}' | '\u{3}') {
			out.push(c);
			i += 1;
			while i < n && chars[i] != '\u{4}' {
				out.push(chars[i]);
				i += 1;
			}
			if i < n {
				out.push(chars[i]);
				i += 1;
			}
			continue;
		}
		if c.is_ascii_alphabetic() || c == '_' {
			let start = i;
			let mut j = i;
			while j < n && (chars[j].is_ascii_alphanumeric() || chars[j] == '_') {
				j += 1;
			}
			let ident: String = chars[start..j].iter().collect();
			if let Some(idx) = params.iter().position(|p| p == &ident) {
				mask::push_arg(&mut out, idx);
			} else {
				out.push_str(&ident);
			}
			i = j;
			continue;
		}
		out.push(c);
		i += 1;
	}
	out
}

/// Escape `"` and `\` for the `#` stringize operator (I3): wraps the
/// already-expanded argument text in quotes.
pub fn stringize(expanded: &str) -> String {
	let mut out = String::with_capacity(expanded.len() + 2);
	out.push('"');
	for c in expanded.chars() {
		if c == '"' || c == '\\' {
			out.push('\\');
		}
		out.push(c);
	}
	out.push('"');
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::mask::{tokens, ArgForm, BodyToken};

	fn params(names: &[&str]) -> Vec<String> {
		names.iter().map(|s| (*s).to_string()).collect()
	}

	#[test]
	fn sq_macro_encodes_double_expanded_reference() {
		let encoded = encode_body(&params(&["x"]), "((x)*(x))").unwrap();
		let decoded: Vec<_> = tokens(&encoded).collect();
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
	fn stringize_operator_encodes_as_stringized_form() {
		let encoded = encode_body(&params(&["x"]), "#x").unwrap();
		let decoded: Vec<_> = tokens(&encoded).collect();
		assert_eq!(decoded, vec![BodyToken::Placeholder { index: 0, form: ArgForm::Stringized }]);
	}

	#[test]
	fn paste_operator_encodes_both_sides_as_raw() {
		let encoded = encode_body(&params(&["a", "b"]), "a##b").unwrap();
		let decoded: Vec<_> = tokens(&encoded).collect();
		assert_eq!(
			decoded,
			vec![
				BodyToken::Placeholder { index: 0, form: ArgForm::Raw },
				BodyToken::Placeholder { index: 1, form: ArgForm::Raw },
			]
		);
	}

	#[test]
	fn paste_with_literal_suffix_keeps_suffix_literal() {
		let encoded = encode_body(&params(&["x"]), "x##_").unwrap();
		let decoded: Vec<_> = tokens(&encoded).collect();
		assert_eq!(
			decoded,
			vec![BodyToken::Placeholder { index: 0, form: ArgForm::Raw }, BodyToken::Literal("_"),]
		);
	}

	#[test]
	fn hash_on_edge_is_rejected() {
		assert_eq!(encode_body(&params(&["x"]), "##x").unwrap_err(), PpError::HashOnEdge);
		assert_eq!(encode_body(&params(&["x"]), "x##").unwrap_err(), PpError::HashOnEdge);
	}

	#[test]
	fn hash_not_followed_by_a_parameter_is_an_error() {
		assert_eq!(encode_body(&params(&["x"]), "#y").unwrap_err(), PpError::HashNotFollowed);
	}

	#[test]
	fn hash_is_literal_in_a_zero_arity_macro() {
		let encoded = encode_body(&[], "this # is fine").unwrap();
		assert_eq!(encoded, "this # is fine");
	}

	#[test]
	fn stringize_escapes_quotes_and_backslashes() {
		assert_eq!(stringize(r#"a\b"c"#), r#""a\\b\"c""#);
	}
}
