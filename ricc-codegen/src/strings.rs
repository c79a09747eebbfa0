//! The string table (component I / §4.I): every literal is registered
//! once, in source order, and split at `%` conversion specifiers into
//! fragments. A fragment's label is `STRING<i + k*amount>`, where `i`
//! is the literal's registration index, `k` its fragment index, and
//! `amount` the total number of registered literals — striping
//! fragments this way keeps each literal's pieces a fixed distance
//! apart no matter how many other literals share the table (I9).

use crate::label::{Label, LabelCounters};

/// Splits a format string into fragments at each `%` specifier. The
/// specifier character is kept at the front of the fragment it
/// introduces; the text before the first specifier (possibly empty)
/// is always its own leading fragment, so `"%d %f\n"` becomes
/// `["", "%d ", "%f\n"]` — three pieces for two conversions.
fn split_format(s: &str) -> Vec<String> {
	let mut pieces = Vec::new();
	let mut current = String::new();
	let mut chars = s.chars().peekable();
	while let Some(c) = chars.next() {
		if c == '%' {
			pieces.push(std::mem::take(&mut current));
			current.push('%');
			if let Some(&spec) = chars.peek() {
				current.push(spec);
				chars.next();
			}
		} else {
			current.push(c);
		}
	}
	pieces.push(current);
	pieces
}

pub struct StringTable {
	/// `entries[i]` holds literal `i`'s fragments, in order.
	entries: Vec<Vec<String>>,
}

impl Default for StringTable {
	fn default() -> Self {
		Self::new()
	}
}

impl StringTable {
	pub fn new() -> Self {
		Self { entries: Vec::new() }
	}

	/// Registers a literal and returns its index. Call this for every
	/// string literal in the translation unit (plain and `printf`
	/// format strings alike) before reading back any fragment labels —
	/// `amount` is the final registered count, so it isn't stable until
	/// registration is done.
	pub fn register(&mut self, text: &str) -> u32 {
		let index = self.entries.len() as u32;
		self.entries.push(split_format(text));
		index
	}

	pub fn amount(&self) -> u32 {
		self.entries.len() as u32
	}

	pub fn fragments(&self, string_index: u32) -> &[String] {
		&self.entries[string_index as usize]
	}

	pub fn fragment_label(&self, string_index: u32, fragment: u32) -> Label {
		LabelCounters::string(string_index + fragment * self.amount())
	}

	/// Every `(label, text)` pair to emit into `.rdata`, in registration
	/// order. Each piece gets a trailing NUL per the target's `.ascii
	/// "...\0"` convention.
	pub fn rdata_entries(&self) -> Vec<(Label, String)> {
		let mut out = Vec::new();
		for (i, fragments) in self.entries.iter().enumerate() {
			for (k, text) in fragments.iter().enumerate() {
				let label = self.fragment_label(i as u32, k as u32);
				out.push((label, format!("{text}\0")));
			}
		}
		out
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn printf_format_splits_into_three_pieces() {
		let pieces = split_format("%d %f\n");
		assert_eq!(pieces, vec!["".to_string(), "%d ".to_string(), "%f\n".to_string()]);
	}

	#[test]
	fn concatenating_fragments_reproduces_the_original() {
		let mut t = StringTable::new();
		let i = t.register("%d %f\n");
		let joined: String = t.fragments(i).concat();
		assert_eq!(joined, "%d %f\n");
	}

	#[test]
	fn fragment_labels_are_striped_by_amount() {
		let mut t = StringTable::new();
		let a = t.register("hello %d");
		let b = t.register("%s!");
		assert_eq!(t.amount(), 2);
		assert_eq!(t.fragment_label(a, 0).number, a);
		assert_eq!(t.fragment_label(a, 1).number, a + 2);
		assert_eq!(t.fragment_label(b, 1).number, b + 2);
	}

	#[test]
	fn plain_literal_with_no_specifiers_is_a_single_fragment() {
		let mut t = StringTable::new();
		let i = t.register("no specifiers here");
		assert_eq!(t.fragments(i).len(), 1);
	}
}
