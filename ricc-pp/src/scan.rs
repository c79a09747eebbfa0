//! Logical character scanning on top of [`ricc_io::Stream`]: normalizes
//! `\n` / `\r\n` / `\r` line endings to a single `\n`, and splices a
//! trailing `\` immediately before a line break away entirely, advancing
//! [`LocationTracker`] as it goes. Every other component in this crate
//! reads through a [`Scanner`] rather than touching `Stream` directly, so
//! line splicing and EOL normalization happen exactly once.

use ricc_io::{LocationTracker, Stream, EOF};

pub struct Scanner<'s> {
	pub input: &'s mut Stream,
	pub tracker: LocationTracker,
	/// One `(line, column)` snapshot per logical character returned by
	/// `next()` and not yet unread, in read order. `unread` pops its
	/// matching entry so the tracker lands back exactly where it was
	/// before that character was consumed — a splice or CRLF pair
	/// collapses several raw reads into one logical `next()`, but still
	/// contributes exactly one entry here, so it undoes as a unit.
	loc_stack: Vec<(u32, u32)>,
}

impl<'s> Scanner<'s> {
	pub fn new(input: &'s mut Stream, tracker: LocationTracker) -> Self {
		Self { input, tracker, loc_stack: Vec::new() }
	}

	/// Next logical character: EOL-normalized, with backslash-newline
	/// splices consumed silently. Advances `self.tracker`.
	pub fn next(&mut self) -> char {
		let saved = self.tracker.snapshot_pos();
		loop {
			let c = self.input.read_char();
			if c == EOF {
				return EOF;
			}
			if c == '\\' {
				let n = self.input.read_char();
				if n == '\n' {
					self.tracker.line_break();
					continue;
				}
				if n == '\r' {
					let n2 = self.input.read_char();
					if n2 != '\n' {
						self.input.unread_char(n2);
					}
					self.tracker.line_break();
					continue;
				}
				self.input.unread_char(n);
				self.tracker.advance('\\');
				self.loc_stack.push(saved);
				return '\\';
			}
			if c == '\r' {
				let n = self.input.read_char();
				if n != '\n' {
					self.input.unread_char(n);
				}
				self.tracker.line_break();
				self.loc_stack.push(saved);
				return '\n';
			}
			if c == '\n' {
				self.tracker.line_break();
				self.loc_stack.push(saved);
				return '\n';
			}
			self.tracker.advance(c);
			self.loc_stack.push(saved);
			return c;
		}
	}

	/// Push `c` back so the next `next()` call yields it again, and undo
	/// the `LocationTracker` advance that reading `c` caused — otherwise
	/// the same physical character would be counted twice when it's read
	/// again. Only valid for the character most recently returned by
	/// `next()` and not yet unread (the only pattern this crate uses:
	/// single-character lookahead, never an arbitrary rewind).
	pub fn unread(&mut self, c: char) {
		if c != EOF {
			self.input.unread_char(c);
			if let Some(pos) = self.loc_stack.pop() {
				self.tracker.restore_pos(pos);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use ricc_io::{FileId, LocationTracker};

	fn scan_all(src: &str) -> String {
		let mut stream = Stream::from_memory(src);
		let mut sc = Scanner::new(&mut stream, LocationTracker::for_file(FileId(0)));
		let mut out = String::new();
		loop {
			let c = sc.next();
			if c == EOF {
				break;
			}
			out.push(c);
		}
		out
	}

	#[test]
	fn crlf_and_cr_normalize_to_lf() {
		assert_eq!(scan_all("a\r\nb\rc\n"), "a\nb\nc\n");
	}

	#[test]
	fn backslash_newline_splices_away() {
		assert_eq!(scan_all("ab\\\ncd"), "abcd");
	}

	#[test]
	fn unread_replays_exact_character() {
		let mut stream = Stream::from_memory("xy");
		let mut sc = Scanner::new(&mut stream, LocationTracker::for_file(FileId(0)));
		let c = sc.next();
		assert_eq!(c, 'x');
		sc.unread(c);
		assert_eq!(sc.next(), 'x');
		assert_eq!(sc.next(), 'y');
	}

	#[test]
	fn unreading_a_newline_does_not_double_count_the_line() {
		let mut stream = Stream::from_memory("a\nb");
		let mut sc = Scanner::new(&mut stream, LocationTracker::for_file(FileId(0)));
		assert_eq!(sc.next(), 'a');
		let nl = sc.next();
		assert_eq!(nl, '\n');
		sc.unread(nl);
		assert_eq!(sc.next(), '\n');
		assert_eq!(sc.next(), 'b');
		let loc = sc.tracker.copy();
		assert_eq!(loc.line, 2);
		assert_eq!(loc.column, 2);
	}

	#[test]
	fn unreading_several_characters_restores_each_position_in_order() {
		let mut stream = Stream::from_memory("ab\ncd");
		let mut sc = Scanner::new(&mut stream, LocationTracker::for_file(FileId(0)));
		let mut collected = Vec::new();
		for _ in 0..4 {
			collected.push(sc.next());
		}
		assert_eq!(collected, vec!['a', 'b', '\n', 'c']);
		for c in collected.iter().rev() {
			sc.unread(*c);
		}
		let mut replayed = String::new();
		for _ in 0..4 {
			replayed.push(sc.next());
		}
		assert_eq!(replayed, "ab\nc");
		let loc = sc.tracker.copy();
		assert_eq!(loc.line, 2);
		assert_eq!(loc.column, 2);
	}
}
